use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cadenza_components::{Catalog, ComponentRegistry};
use cadenza_core::ArgsMap;
use cadenza_sop::Sop;

#[derive(Parser)]
#[command(name = "cadenza", version, about = "Declarative SOP workflows for LLM agents")]
struct Cli {
    /// Catalog file backing the lookup tools (defaults to an empty catalog)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a description builds into a graph
    Validate {
        /// Path to the SOP description (JSON)
        description: PathBuf,
    },
    /// Print the graph structure
    Show {
        /// Path to the SOP description (JSON)
        description: PathBuf,
    },
    /// Compile one node for one role and print the result
    Compile {
        /// Path to the SOP description (JSON)
        description: PathBuf,

        /// Node name
        #[arg(long)]
        node: String,

        /// Role name
        #[arg(long)]
        role: String,

        /// Seed compile args as KEY=VALUE (VALUE parsed as JSON when it is)
        #[arg(long = "arg")]
        args: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cadenza=info,warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let registry = build_registry(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Validate { description } => {
            let sop = Sop::load(&description, &registry)?;
            let transitions: usize = sop
                .node_names()
                .iter()
                .filter_map(|name| sop.node(name))
                .map(|node| node.next_nodes().len())
                .sum();
            println!(
                "ok: {} nodes, {} transitions, root = {}",
                sop.len(),
                transitions,
                sop.root().map(|n| n.name()).unwrap_or("<none>")
            );
        }
        Commands::Show { description } => {
            let sop = Sop::load(&description, &registry)?;
            show(&sop);
        }
        Commands::Compile {
            description,
            node,
            role,
            args,
        } => {
            let sop = Sop::load(&description, &registry)?;
            let node = sop
                .node(&node)
                .ok_or_else(|| anyhow::anyhow!("node '{}' not found", node))?;

            let mut compile_args = ArgsMap::new();
            for pair in &args {
                let (key, value) = parse_arg(pair)?;
                compile_args.set(key, value);
            }

            let compiled = node.compile(&role, &mut compile_args)?;
            println!("── system prompt ──{}", compiled.system_prompt);
            println!("── last prompt ──{}", compiled.last_prompt);
            println!(
                "── tool results ──\n{}",
                serde_json::to_string_pretty(&compiled.tool_results)?
            );
        }
    }

    Ok(())
}

fn build_registry(catalog_path: Option<&Path>) -> anyhow::Result<ComponentRegistry> {
    let catalog = match catalog_path {
        Some(path) => {
            let catalog = Catalog::load(path)?;
            info!(path = %path.display(), items = catalog.items.len(), "Loaded catalog");
            catalog
        }
        None => Catalog::default(),
    };
    Ok(ComponentRegistry::with_builtins(Arc::new(catalog)))
}

fn show(sop: &Sop) {
    println!(
        "root: {}",
        sop.root().map(|n| n.name()).unwrap_or("<none>")
    );
    println!(
        "temperature: {}  active_mode: {}  log_path: {}",
        sop.temperature(),
        sop.active_mode(),
        sop.log_path()
    );

    for name in sop.node_names() {
        let Some(node) = sop.node(name) else { continue };
        let mut roles: Vec<&str> = node.roles().collect();
        roles.sort_unstable();

        println!(
            "\n{} {}",
            node.name(),
            if node.is_interactive() {
                "(interactive)"
            } else {
                ""
            }
        );
        println!("  roles: {}", roles.join(", "));
        println!("  config: {}", node.config().join(" -> "));

        let mut transitions: Vec<(&String, &String)> = node.next_nodes().iter().collect();
        transitions.sort();
        for (keyword, target) in transitions {
            println!("  --[{}]--> {}", keyword, target);
        }
    }
}

/// Parse a `KEY=VALUE` seed argument; the value is taken as JSON when it
/// parses as JSON, as a plain string otherwise.
fn parse_arg(pair: &str) -> anyhow::Result<(String, serde_json::Value)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got '{}'", pair))?;
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg_plain_string() {
        let (key, value) = parse_arg("query=reset my password").unwrap();
        assert_eq!(key, "query");
        assert_eq!(value, serde_json::json!("reset my password"));
    }

    #[test]
    fn test_parse_arg_json_value() {
        let (_, value) = parse_arg(r#"docs=["a","b"]"#).unwrap();
        assert_eq!(value, serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_parse_arg_rejects_missing_equals() {
        assert!(parse_arg("nope").is_err());
    }
}
