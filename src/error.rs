//! Error types for compilation and evaluation.
//!
//! `CompileError` is the only error `compile` can return: a failure here
//! yields no partial plan at all. `EvalError` never crosses the `evaluate`
//! boundary — a node that produces one contributes an empty partial result
//! instead (see the node compilers in [`crate::node`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("document has no inputNode")]
    MissingInputNode,

    #[error("node {node_id} of kind {kind} is not compilable")]
    NodeNotCompilable { node_id: String, kind: &'static str },

    /// Reserved for a stricter compilation mode. The default scheduler
    /// mirrors the prototype and silently drops nodes that never reach
    /// indegree zero rather than rejecting the whole document.
    #[error("graph contains a cycle reachable from the input node")]
    CyclicGraph,

    /// Reserved for a stricter compilation mode. The default condition
    /// compiler degrades an uncompilable cell to an always-false condition
    /// (logged at `warn`) instead of failing the document.
    #[error("failed to parse condition for rule {rule_id} cell {cell_id}")]
    ConditionParse { rule_id: String, cell_id: String },
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
}
