//! Runner (C5): evaluates a compiled [`Plan`] against an input record.
//! Ported from the `handler` closure in
//! `original_source/python/jdm_parser.py::build_py_handler`.

use serde_json::{Map, Value};

use crate::merge::{deep_merge, strip_switch_keys};
use crate::plan::Plan;

/// Evaluates `plan` against `input`, returning the assembled output.
/// Never panics and never fails: a node whose expression errors at
/// evaluation time contributes an empty partial result instead of
/// propagating (spec.md §7).
pub fn evaluate(plan: &Plan, input: &Value) -> Value {
    let mut ctx = input.clone();
    let mut output = Value::Object(Map::new());

    if plan.output_sources.contains(plan.input_node_id.as_str()) {
        deep_merge(&mut output, &ctx);
    }

    for (node_id, guard, key) in &plan.scheduled {
        if !guard.is_satisfied(&ctx) {
            continue;
        }
        let Some(node) = plan.nodes.get(*key) else { continue };
        let res = node.evaluate(&mut ctx);
        if res.is_object() {
            deep_merge(&mut ctx, &res);
            if plan.output_sources.contains(node_id.as_str()) {
                deep_merge(&mut output, &res);
            }
        }
    }

    strip_switch_keys(&mut output);
    output
}
