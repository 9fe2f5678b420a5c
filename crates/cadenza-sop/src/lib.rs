//! SOP graph engine — declarative agent workflows.
//!
//! A workflow is described as a JSON document of nodes, per-role component
//! configurations, and keyword transitions. `Sop::from_description` turns
//! that document into an owned graph in two passes (nodes, then relations);
//! `Node::compile` then renders the system/last prompt pair and tool
//! outputs for one role, walking the node's config ordering.
//!
//! Construction and compilation are synchronous and single-threaded; a
//! built graph is read-only and shareable, while each compile call owns its
//! mutable `ArgsMap`.

pub mod description;
pub mod node;
pub mod sop;

pub use description::{NodeSpec, SopDescription};
pub use node::{AgentState, Node};
pub use sop::Sop;
