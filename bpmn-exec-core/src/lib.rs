//! Compiles parsed BPMN process definitions into directly-executable
//! workflow graphs.
//!
//! The input is a read-only source element tree (the external parser's
//! output); the output is one `CompiledWorkflow` per process — a graph of
//! compiled nodes and sequence flows where every node carries a table
//! binding its lifecycle states to named processing steps. The runtime
//! stream processor drives those states and dispatches the bound steps; it
//! never sees a definition that did not compile completely.
//!
//! Compilation is synchronous, single-threaded, and deterministic. Separate
//! deployments compile with separate `TransformContext` instances and share
//! nothing.

pub mod compiled;
pub mod context;
pub mod encoding;
pub mod error;
pub mod expr;
pub mod factory;
pub mod lifecycle;
pub mod model;
pub mod timer;
pub mod transform;
pub mod yaml;

pub use compiled::{CompiledDefinitions, CompiledNode, CompiledWorkflow};
pub use error::TransformError;
pub use lifecycle::{BindingTable, Lifecycle, Step};
pub use model::Definitions;
pub use transform::compile_definitions;
