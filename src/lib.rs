//! Compiles and evaluates JSON Decision Model (JDM) rule graphs.
//!
//! A JDM document declares a directed acyclic graph of typed decision
//! nodes through which an input record flows to produce an output
//! record. [`compile`] turns a [`Document`] into an immutable [`Plan`];
//! [`evaluate`] runs that plan against an input record. The HTTP surface,
//! rule-version store, and reference cross-checker that would sit around
//! this in a full service are out of scope — see spec.md §1.

pub mod cli;
pub mod condition;
pub mod document;
pub mod error;
pub mod expr;
pub mod graph;
pub mod merge;
pub mod node;
pub mod path;
pub mod plan;
pub mod runner;

use std::collections::HashMap;

use serde_json::Value;
use slotmap::SlotMap;

pub use document::Document;
pub use error::{CompileError, EvalError};
pub use plan::Plan;

/// Compiles a JDM document into an executable [`Plan`].
///
/// Returns [`CompileError::MissingInputNode`] if the document has no
/// `inputNode`, or [`CompileError::NodeNotCompilable`] if any node
/// reachable from the input node can't be turned into an evaluator (an
/// unrecognized function-node body, or a malformed node `content`).
/// Compilation never produces a partial plan: on error, no plan exists.
pub fn compile(doc: &Document) -> Result<Plan, CompileError> {
    let input_node = doc
        .nodes
        .iter()
        .find(|n| n.kind == document::NodeKind::InputNode)
        .ok_or(CompileError::MissingInputNode)?;

    let schedule = graph::schedule(doc, &input_node.id);
    let nodes_by_id: HashMap<&str, &document::Node> = doc.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut arena = SlotMap::with_key();
    let mut scheduled = Vec::with_capacity(schedule.order.len());
    for node_id in &schedule.order {
        let node = nodes_by_id
            .get(node_id.as_str())
            .expect("scheduler only emits ids present in the document");
        let compiled = node::compile_node(node, &schedule.switch_outputs)?;
        let key = arena.insert(compiled);
        let guard = schedule.guards.get(node_id).cloned().unwrap_or_default();
        scheduled.push((node_id.clone(), guard, key));
    }

    Ok(Plan {
        input_node_id: input_node.id.clone(),
        nodes: arena,
        scheduled,
        output_sources: schedule.output_sources,
    })
}

/// Evaluates `plan` against `input`. See [`runner::evaluate`].
pub fn evaluate(plan: &Plan, input: &Value) -> Value {
    runner::evaluate(plan, input)
}
