//! Decision-table node compiler: rules are matched top-to-bottom, the
//! first rule whose non-wildcard input conditions all hold fires, and its
//! output cells (also evaluated top-to-bottom, later assignments winning
//! at identical paths) become the partial result.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::condition;
use crate::expr::{self, Expr, ExprValue, Locals};
use crate::node::CompiledNode;
use crate::path::Path;

/// An input column's condition for one rule row. A cell that fails to
/// parse degrades to `AlwaysFalse` rather than failing the whole document
/// (spec.md §7's "condition parse failures" policy) — logged at `warn`
/// once, at compile time.
enum Condition {
    Wildcard,
    Expr(Expr),
    AlwaysFalse,
}

struct Rule {
    conditions: Vec<Condition>,
    outputs: Vec<(Path, Expr)>,
}

pub struct DecisionTableNode {
    rules: Vec<Rule>,
}

impl CompiledNode for DecisionTableNode {
    fn evaluate(&self, ctx: &mut Value) -> Value {
        'rules: for rule in &self.rules {
            for cond in &rule.conditions {
                let holds = match cond {
                    Condition::Wildcard => true,
                    Condition::AlwaysFalse => false,
                    Condition::Expr(e) => {
                        match expr::evaluate(e, ctx, &Locals::default()).and_then(|v| v.as_bool()) {
                            Ok(b) => b,
                            Err(err) => {
                                tracing::debug!(error = %err, "decision table condition failed, treating as false");
                                false
                            }
                        }
                    }
                };
                if !holds {
                    continue 'rules;
                }
            }
            let mut res = Value::Object(Map::new());
            for (path, value_expr) in &rule.outputs {
                match expr::evaluate(value_expr, ctx, &Locals::default()).and_then(ExprValue::into_json) {
                    Ok(v) => path.set(&mut res, v),
                    Err(err) => {
                        tracing::debug!(path = path.raw(), error = %err, "decision table output failed");
                        return Value::Object(Map::new());
                    }
                }
            }
            return res;
        }
        Value::Object(Map::new())
    }
}

#[derive(Deserialize)]
struct IoSpec {
    id: String,
    #[serde(default)]
    field: String,
}

#[derive(Deserialize, Default)]
struct Content {
    #[serde(default)]
    inputs: Vec<IoSpec>,
    #[serde(default)]
    outputs: Vec<IoSpec>,
    #[serde(default)]
    rules: Vec<Map<String, Value>>,
}

pub fn compile(content: &Value) -> Result<DecisionTableNode, ()> {
    let content: Content = serde_json::from_value(content.clone()).map_err(|_| ())?;
    let mut rules = Vec::with_capacity(content.rules.len());
    for (rule_idx, row) in content.rules.iter().enumerate() {
        let rule_id = row.get("id").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| rule_idx.to_string());

        let mut conditions = Vec::with_capacity(content.inputs.len());
        for input in &content.inputs {
            let raw = row.get(&input.id);
            conditions.push(match condition::compile_condition(raw, &input.field) {
                None => Condition::Wildcard,
                Some(text) => match expr::parser::parse(&text) {
                    Ok(e) => Condition::Expr(e),
                    Err(_) => {
                        tracing::warn!(rule = %rule_id, cell = %input.id, "condition cell degraded to always-false");
                        Condition::AlwaysFalse
                    }
                },
            });
        }

        let mut outputs = Vec::with_capacity(content.outputs.len());
        for output in &content.outputs {
            let Some(raw) = row.get(&output.id) else { continue };
            if raw.is_null() {
                continue;
            }
            let Some(text) = raw.as_str() else { continue };
            match expr::parser::parse(text) {
                Ok(e) => outputs.push((Path::parse(&output.field), e)),
                Err(_) => {
                    tracing::warn!(rule = %rule_id, cell = %output.id, "output cell failed to compile, skipped");
                }
            }
        }

        rules.push(Rule { conditions, outputs });
    }
    Ok(DecisionTableNode { rules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> DecisionTableNode {
        let content = json!({
            "inputs": [{"id": "i1", "field": "age"}],
            "outputs": [{"id": "o1", "field": "tier"}],
            "rules": [
                {"i1": "[0..17]", "o1": "'minor'"},
                {"i1": "[18..64]", "o1": "'adult'"},
                {"i1": "", "o1": "'senior'"},
            ],
        });
        compile(&content).unwrap()
    }

    #[test]
    fn first_matching_rule_fires() {
        let node = table();
        let mut ctx = json!({"age": 30});
        assert_eq!(node.evaluate(&mut ctx), json!({"tier": "adult"}));
        let mut ctx = json!({"age": 80});
        assert_eq!(node.evaluate(&mut ctx), json!({"tier": "senior"}));
    }

    #[test]
    fn all_wildcard_row_fires_unconditionally() {
        let content = json!({
            "inputs": [{"id": "i1", "field": "age"}],
            "outputs": [{"id": "o1", "field": "ok"}],
            "rules": [{"i1": "", "o1": "true"}],
        });
        let node = compile(&content).unwrap();
        let mut ctx = json!({"age": 1});
        assert_eq!(node.evaluate(&mut ctx), json!({"ok": true}));
    }

    #[test]
    fn no_rule_fires_yields_empty_object() {
        let content = json!({
            "inputs": [{"id": "i1", "field": "age"}],
            "outputs": [{"id": "o1", "field": "tier"}],
            "rules": [{"i1": "[0..17]", "o1": "'minor'"}],
        });
        let node = compile(&content).unwrap();
        let mut ctx = json!({"age": 99});
        assert_eq!(node.evaluate(&mut ctx), json!({}));
    }

    #[test]
    fn condition_eval_failure_skips_only_that_rule() {
        // `region` is absent from ctx, so the first row's condition fails
        // to evaluate; that should make the row not fire, not abort the
        // whole table, so the wildcard row below still gets a chance.
        let content = json!({
            "inputs": [{"id": "i1", "field": "region"}],
            "outputs": [{"id": "o1", "field": "tier"}],
            "rules": [
                {"i1": "'eu'", "o1": "'restricted'"},
                {"i1": "", "o1": "'default'"},
            ],
        });
        let node = compile(&content).unwrap();
        let mut ctx = json!({"age": 30});
        assert_eq!(node.evaluate(&mut ctx), json!({"tier": "default"}));
    }
}
