//! Switch node compiler: statements are tried top-to-bottom, the first
//! true one's `id` is recorded into the context under the reserved
//! `__switch_<nodeId>` key, and the partial result is either the whole
//! context (stripped of switch keys) when that branch feeds the output
//! sink, or empty otherwise — downstream nodes gate on the recorded key
//! via their [`crate::graph::Guard`] instead.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::expr::{self, Expr, Locals};
use crate::merge::strip_switch_keys;
use crate::node::CompiledNode;

pub struct SwitchNode {
    node_id: String,
    statements: Vec<(String, Option<Expr>)>,
    output_handles: HashSet<String>,
}

impl CompiledNode for SwitchNode {
    fn evaluate(&self, ctx: &mut Value) -> Value {
        let mut chosen: Option<&str> = None;
        for (id, cond) in &self.statements {
            let truthy = match cond {
                None => true,
                Some(e) => match expr::evaluate(e, ctx, &Locals::default()).and_then(|v| v.as_bool()) {
                    Ok(b) => b,
                    Err(err) => {
                        tracing::debug!(node = %self.node_id, statement = %id, error = %err, "switch condition failed, falling through");
                        false
                    }
                },
            };
            if truthy {
                chosen = Some(id);
                break;
            }
        }

        let Some(chosen) = chosen else {
            return Value::Object(Map::new());
        };
        let chosen = chosen.to_string();

        if let Value::Object(map) = ctx {
            map.insert(format!("__switch_{}", self.node_id), Value::String(chosen.clone()));
        }

        if self.output_handles.contains(&chosen) {
            let mut out = ctx.clone();
            strip_switch_keys(&mut out);
            out
        } else {
            Value::Object(Map::new())
        }
    }
}

#[derive(Deserialize)]
struct Statement {
    id: String,
    #[serde(default)]
    condition: String,
}

#[derive(Deserialize, Default)]
struct Content {
    #[serde(default)]
    statements: Vec<Statement>,
}

pub fn compile(node_id: &str, content: &Value, output_handles: HashSet<String>) -> Result<SwitchNode, ()> {
    let content: Content = serde_json::from_value(content.clone()).map_err(|_| ())?;
    let mut statements = Vec::with_capacity(content.statements.len());
    for stmt in content.statements {
        let cond = if stmt.condition.trim().is_empty() {
            None
        } else {
            Some(expr::parser::parse(&stmt.condition).map_err(|_| ())?)
        };
        statements.push((stmt.id, cond));
    }
    Ok(SwitchNode { node_id: node_id.to_string(), statements, output_handles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routes_to_first_true_branch_and_records_handle() {
        let content = json!({"statements": [
            {"id": "A", "condition": "color == 'red'"},
            {"id": "B", "condition": ""},
        ]});
        let node = compile("s1", &content, HashSet::new()).unwrap();
        let mut ctx = json!({"color": "red"});
        node.evaluate(&mut ctx);
        assert_eq!(ctx["__switch_s1"], json!("A"));
    }

    #[test]
    fn default_statement_fires_when_nothing_else_matches() {
        let content = json!({"statements": [
            {"id": "A", "condition": "color == 'red'"},
            {"id": "B", "condition": ""},
        ]});
        let node = compile("s1", &content, HashSet::new()).unwrap();
        let mut ctx = json!({"color": "green"});
        node.evaluate(&mut ctx);
        assert_eq!(ctx["__switch_s1"], json!("B"));
    }

    #[test]
    fn output_connected_branch_returns_stripped_context() {
        let content = json!({"statements": [{"id": "A", "condition": ""}]});
        let mut handles = HashSet::new();
        handles.insert("A".to_string());
        let node = compile("s1", &content, handles).unwrap();
        let mut ctx = json!({"x": 1});
        let res = node.evaluate(&mut ctx);
        assert_eq!(res, json!({"x": 1}));
    }
}
