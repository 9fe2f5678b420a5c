pub mod args;
pub mod error;

pub use args::{ArgsMap, CompiledPrompt};
pub use error::{CadenzaError, RelationEnd, Result};
