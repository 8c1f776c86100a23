//! Expression node compiler: an ordered list of `{key, value}` pairs,
//! each compiled to `(Path, Expr)` and assigned into the partial result
//! at evaluation time.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::expr::{self, ExprValue, Locals};
use crate::node::CompiledNode;
use crate::path::Path;

pub struct ExpressionNode {
    entries: Vec<(Path, expr::Expr)>,
}

impl CompiledNode for ExpressionNode {
    fn evaluate(&self, ctx: &mut Value) -> Value {
        let mut res = Value::Object(Map::new());
        for (path, expr) in &self.entries {
            match expr::evaluate(expr, ctx, &Locals::default()).and_then(ExprValue::into_json) {
                Ok(v) => path.set(&mut res, v),
                Err(err) => {
                    tracing::debug!(path = path.raw(), error = %err, "expression node assignment failed");
                    return Value::Object(Map::new());
                }
            }
        }
        res
    }
}

#[derive(Deserialize)]
struct Entry {
    key: String,
    value: String,
}

#[derive(Deserialize, Default)]
struct Content {
    #[serde(default)]
    expressions: Vec<Entry>,
}

pub fn compile(content: &Value) -> Result<ExpressionNode, ()> {
    let content: Content = serde_json::from_value(content.clone()).map_err(|_| ())?;
    let mut entries = Vec::with_capacity(content.expressions.len());
    for entry in content.expressions {
        let expr = expr::parser::parse(&entry.value).map_err(|_| ())?;
        entries.push((Path::parse(&entry.key), expr));
    }
    Ok(ExpressionNode { entries })
}
