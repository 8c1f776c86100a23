//! Deserialization of the JDM document wire format (§3): a graph of typed
//! nodes and edges. Node `content` stays an untyped [`serde_json::Value`]
//! here — its shape depends on [`NodeKind`] and is only interpreted by the
//! matching compiler in [`crate::node`], which is also where a malformed
//! shape turns into `node-not-compilable` rather than a document-wide parse
//! error.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub content: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    InputNode,
    OutputNode,
    ExpressionNode,
    DecisionTableNode,
    SwitchNode,
    FunctionNode,
}

impl NodeKind {
    /// The wire-format name, used in compile diagnostics and logging.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::InputNode => "inputNode",
            NodeKind::OutputNode => "outputNode",
            NodeKind::ExpressionNode => "expressionNode",
            NodeKind::DecisionTableNode => "decisionTableNode",
            NodeKind::SwitchNode => "switchNode",
            NodeKind::FunctionNode => "functionNode",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub source_handle: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nodes_and_edges() {
        let raw = serde_json::json!({
            "nodes": [
                {"id": "in", "type": "inputNode"},
                {"id": "e1", "type": "expressionNode", "content": {"expressions": []}},
            ],
            "edges": [
                {"sourceId": "in", "targetId": "e1"},
                {"sourceId": "e1", "targetId": "out", "sourceHandle": "A"},
            ],
        });
        let doc: Document = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[1].kind, NodeKind::ExpressionNode);
        assert_eq!(doc.edges[1].source_handle.as_deref(), Some("A"));
    }
}
