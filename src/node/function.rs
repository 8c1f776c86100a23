//! Function node compiler. Per spec.md §4.3, a port "MAY decline all
//! function nodes and signal 'not compilable'"; this implementation takes
//! option (a) from the §9 design note for every shape except the single
//! one the source hard-codes (`Object.values(input?.flag ...)`, a
//! distinct-value tally over `input.flag`), which it reproduces so that
//! documents carried over from the prototype keep compiling.

use serde_json::{json, Value};

use crate::node::CompiledNode;

const RECOGNIZED_SHAPE: &str = "Object.values(input?.flag";

pub struct FlagTallyNode;

impl CompiledNode for FlagTallyNode {
    fn evaluate(&self, ctx: &mut Value) -> Value {
        let flags = ctx.get("flag").and_then(Value::as_object);
        let mut counts = [0i64; 4];
        const NAMES: [&str; 4] = ["critical", "red", "amber", "green"];
        if let Some(flags) = flags {
            for v in flags.values() {
                if let Some(s) = v.as_str() {
                    if let Some(i) = NAMES.iter().position(|n| *n == s) {
                        counts[i] += 1;
                    }
                }
            }
        }
        json!({
            "critical": counts[0],
            "red": counts[1],
            "amber": counts[2],
            "green": counts[3],
        })
    }
}

pub fn compile(content: &Value) -> Result<FlagTallyNode, ()> {
    let src = content.as_str().unwrap_or("");
    if src.contains(RECOGNIZED_SHAPE) {
        Ok(FlagTallyNode)
    } else {
        tracing::info!("function node body not recognized, declining to compile");
        Err(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tallies_distinct_flag_values() {
        let node = compile(&json!("return Object.values(input?.flag ?? {})")).unwrap();
        let mut ctx = json!({"flag": {"a": "red", "b": "red", "c": "green"}});
        assert_eq!(node.evaluate(&mut ctx), json!({"critical": 0, "red": 2, "amber": 0, "green": 1}));
    }

    #[test]
    fn unrecognized_body_declines() {
        assert!(compile(&json!("return 42")).is_err());
    }
}
