//! Node Compilers (C3): one compiler per node kind, each turning a node's
//! declared `content` into a pure `ctx -> partial-result` evaluator. The
//! dispatcher here mirrors `build_py_handler`'s per-node-kind `if/elif`
//! chain in `original_source/python/jdm_parser.py`; the four submodules
//! mirror its four nested `compile_*_node` closures.

pub mod decision_table;
pub mod expression;
pub mod function;
pub mod switch;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::document::{Node, NodeKind};
use crate::error::CompileError;

/// A compiled node: a pure function of the current context to a partial
/// result, with the single exception of [`switch::SwitchNode`], which also
/// records its chosen branch into `ctx` under the reserved
/// `__switch_<nodeId>` key as described in spec.md §4.3.
pub trait CompiledNode: Send + Sync {
    fn evaluate(&self, ctx: &mut Value) -> Value;
}

/// Compiles one node. `switch_outputs` is the scheduler's
/// `nodeId -> {handle}` map (spec.md §3 "Compiled plan"), needed only by
/// switch nodes to decide whether their chosen branch feeds the output
/// sink.
pub fn compile_node(
    node: &Node,
    switch_outputs: &HashMap<String, HashSet<String>>,
) -> Result<Box<dyn CompiledNode>, CompileError> {
    let compiled = match node.kind {
        NodeKind::ExpressionNode => {
            expression::compile(&node.content).ok().map(|n| Box::new(n) as Box<dyn CompiledNode>)
        }
        NodeKind::DecisionTableNode => {
            decision_table::compile(&node.content).ok().map(|n| Box::new(n) as Box<dyn CompiledNode>)
        }
        NodeKind::SwitchNode => {
            let handles = switch_outputs.get(&node.id).cloned().unwrap_or_default();
            switch::compile(&node.id, &node.content, handles)
                .ok()
                .map(|n| Box::new(n) as Box<dyn CompiledNode>)
        }
        NodeKind::FunctionNode => {
            function::compile(&node.content).ok().map(|n| Box::new(n) as Box<dyn CompiledNode>)
        }
        NodeKind::InputNode | NodeKind::OutputNode => {
            unreachable!("the scheduler never schedules input/output nodes for compilation")
        }
    };
    compiled.ok_or_else(|| CompileError::NodeNotCompilable {
        node_id: node.id.clone(),
        kind: node.kind.as_str(),
    })
}
