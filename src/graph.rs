//! Graph Scheduler (C4): parses the node/edge adjacency, computes a
//! topological execution order via Kahn's algorithm seeded at the input
//! node, and derives per-node switch guards via a first-discovered-path
//! depth-first walk. Ported from the graph-building section of
//! `build_py_handler` in `original_source/python/jdm_parser.py`.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;

use crate::document::{Document, NodeKind};

/// The set of `(switchNodeId, requiredHandle)` pairs a node needs
/// satisfied in the context before it may run (spec.md §3 "Guard set").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guard(Vec<(String, String)>);

impl Guard {
    pub fn is_satisfied(&self, ctx: &Value) -> bool {
        self.0.iter().all(|(switch_id, handle)| {
            let key = format!("__switch_{switch_id}");
            ctx.as_object().and_then(|o| o.get(&key)).and_then(Value::as_str) == Some(handle.as_str())
        })
    }

    fn extended(&self, switch_id: &str, handle: &str) -> Guard {
        let mut pairs = self.0.clone();
        pairs.push((switch_id.to_string(), handle.to_string()));
        Guard(pairs)
    }
}

/// Everything the scheduler derives from a [`Document`], ahead of node
/// compilation: the node ids in topological order (input/output nodes
/// excluded per spec.md §4.4), each scheduled node's guard, and the
/// output-sink metadata needed by both node compilation (switch output
/// handles) and the runner (which nodes feed `output`).
pub struct Schedule {
    pub order: Vec<String>,
    pub guards: HashMap<String, Guard>,
    pub output_sources: HashSet<String>,
    pub switch_outputs: HashMap<String, HashSet<String>>,
}

pub fn schedule(doc: &Document, input_node_id: &str) -> Schedule {
    let nodes_by_id: HashMap<&str, NodeKind> = doc.nodes.iter().map(|n| (n.id.as_str(), n.kind)).collect();
    let output_ids: HashSet<&str> =
        doc.nodes.iter().filter(|n| n.kind == NodeKind::OutputNode).map(|n| n.id.as_str()).collect();

    let mut outgoing: HashMap<&str, Vec<&str>> = doc.nodes.iter().map(|n| (n.id.as_str(), Vec::new())).collect();
    let mut indegree: HashMap<&str, usize> = doc.nodes.iter().map(|n| (n.id.as_str(), 0usize)).collect();
    let mut edges_by_source: HashMap<&str, Vec<&crate::document::Edge>> = HashMap::new();

    for e in &doc.edges {
        outgoing.entry(e.source_id.as_str()).or_default().push(e.target_id.as_str());
        *indegree.entry(e.target_id.as_str()).or_insert(0) += 1;
        edges_by_source.entry(e.source_id.as_str()).or_default().push(e);
    }

    let mut order = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(input_node_id);
    while let Some(nid) = queue.pop_front() {
        let Some(nexts) = outgoing.get(nid).cloned() else { continue };
        for nxt in nexts {
            if let Some(d) = indegree.get_mut(nxt) {
                *d -= 1;
                if *d == 0 {
                    if nodes_by_id.get(nxt).is_some_and(|k| *k != NodeKind::OutputNode) {
                        order.push(nxt.to_string());
                    }
                    queue.push_back(nxt);
                }
            }
        }
    }

    let mut guards: HashMap<&str, Guard> = HashMap::new();
    guards.insert(input_node_id, Guard::default());
    let mut stack = vec![input_node_id];
    while let Some(nid) = stack.pop() {
        let base = guards.get(nid).cloned().unwrap_or_default();
        let is_switch = nodes_by_id.get(nid) == Some(&NodeKind::SwitchNode);
        if let Some(edges) = edges_by_source.get(nid) {
            for e in edges {
                let target = e.target_id.as_str();
                let next_guard = match (is_switch, &e.source_handle) {
                    (true, Some(h)) if !h.is_empty() => base.extended(nid, h),
                    _ => base.clone(),
                };
                if !guards.contains_key(target) {
                    guards.insert(target, next_guard);
                    stack.push(target);
                }
            }
        }
    }

    let output_sources: HashSet<String> =
        doc.edges.iter().filter(|e| output_ids.contains(e.target_id.as_str())).map(|e| e.source_id.clone()).collect();

    let mut switch_outputs: HashMap<String, HashSet<String>> = HashMap::new();
    for e in &doc.edges {
        if !output_ids.contains(e.target_id.as_str()) {
            continue;
        }
        if let Some(h) = e.source_handle.as_deref().filter(|h| !h.is_empty()) {
            switch_outputs.entry(e.source_id.clone()).or_default().insert(h.to_string());
        }
    }

    let guards = guards.into_iter().map(|(k, v)| (k.to_string(), v)).collect();

    Schedule { order, guards, output_sources, switch_outputs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn doc(raw: Value) -> Document {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn orders_nodes_breadth_first_from_input() {
        let d = doc(json!({
            "nodes": [
                {"id": "in", "type": "inputNode"},
                {"id": "e1", "type": "expressionNode"},
                {"id": "out", "type": "outputNode"},
            ],
            "edges": [
                {"sourceId": "in", "targetId": "e1"},
                {"sourceId": "e1", "targetId": "out"},
            ],
        }));
        let sched = schedule(&d, "in");
        assert_eq!(sched.order, vec!["e1".to_string()]);
        assert!(sched.output_sources.contains("e1"));
    }

    #[test]
    fn switch_branch_guards_only_gate_their_own_branch() {
        let d = doc(json!({
            "nodes": [
                {"id": "in", "type": "inputNode"},
                {"id": "sw", "type": "switchNode"},
                {"id": "ea", "type": "expressionNode"},
                {"id": "eb", "type": "expressionNode"},
                {"id": "out", "type": "outputNode"},
            ],
            "edges": [
                {"sourceId": "in", "targetId": "sw"},
                {"sourceId": "sw", "targetId": "ea", "sourceHandle": "A"},
                {"sourceId": "sw", "targetId": "eb", "sourceHandle": "B"},
                {"sourceId": "ea", "targetId": "out"},
                {"sourceId": "eb", "targetId": "out"},
            ],
        }));
        let sched = schedule(&d, "in");
        let ctx_a = json!({"__switch_sw": "A"});
        let ctx_b = json!({"__switch_sw": "B"});
        assert!(sched.guards["ea"].is_satisfied(&ctx_a));
        assert!(!sched.guards["ea"].is_satisfied(&ctx_b));
        assert!(sched.guards["eb"].is_satisfied(&ctx_b));
        assert!(!sched.guards["eb"].is_satisfied(&ctx_a));
    }
}
