use cadenza_core::ArgsMap;

/// Expand `{key}` placeholders in a template from the compile context.
///
/// String values are inserted verbatim; other values are inserted as JSON.
/// A placeholder whose key is absent from the context is left untouched.
pub fn fill_template(template: &str, args: &ArgsMap) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            result.push(c);
            continue;
        }

        let mut key = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            key.push(c);
        }

        if !closed {
            // Unterminated brace, keep the raw text
            result.push('{');
            result.push_str(&key);
            continue;
        }

        match args.get(&key) {
            Some(serde_json::Value::String(s)) => result.push_str(s),
            Some(other) => result.push_str(&other.to_string()),
            None => {
                result.push('{');
                result.push_str(&key);
                result.push('}');
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_string_value() {
        let mut args = ArgsMap::new();
        args.set_str("topic", "Rust async patterns");

        assert_eq!(
            fill_template("Write about {topic}.", &args),
            "Write about Rust async patterns."
        );
    }

    #[test]
    fn test_fills_non_string_as_json() {
        let mut args = ArgsMap::new();
        args.set("docs", serde_json::json!(["a", "b"]));

        assert_eq!(fill_template("docs: {docs}", &args), r#"docs: ["a","b"]"#);
    }

    #[test]
    fn test_unknown_placeholder_left_untouched() {
        let args = ArgsMap::new();
        assert_eq!(fill_template("hello {missing}", &args), "hello {missing}");
    }

    #[test]
    fn test_unterminated_brace_kept() {
        let args = ArgsMap::new();
        assert_eq!(fill_template("broken {tail", &args), "broken {tail");
    }

    #[test]
    fn test_no_placeholders() {
        let args = ArgsMap::new();
        assert_eq!(fill_template("plain text", &args), "plain text");
    }
}
