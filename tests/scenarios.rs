//! End-to-end scenarios from spec.md §8, each building a `Document` from
//! a JSON literal and asserting the evaluated output.

use jdm::document::Document;
use serde_json::{json, Value};

fn doc(raw: Value) -> Document {
    serde_json::from_value(raw).unwrap()
}

#[test]
fn scenario_a_passthrough() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "out", "type": "outputNode"},
        ],
        "edges": [{"sourceId": "in", "targetId": "out"}],
    }));
    let plan = jdm::compile(&d).unwrap();
    let input = json!({"x": 1, "y": {"z": 2}});
    assert_eq!(jdm::evaluate(&plan, &input), json!({"x": 1, "y": {"z": 2}}));
}

#[test]
fn scenario_b_expression_node_sum_of_map() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "e", "type": "expressionNode", "content": {
                "expressions": [{"key": "total", "value": "sum(map(items, #.price))"}]
            }},
            {"id": "out", "type": "outputNode"},
        ],
        "edges": [
            {"sourceId": "in", "targetId": "e"},
            {"sourceId": "e", "targetId": "out"},
        ],
    }));
    let plan = jdm::compile(&d).unwrap();
    let input = json!({"items": [{"price": 10}, {"price": 5}]});
    assert_eq!(jdm::evaluate(&plan, &input), json!({"total": 15}));
}

#[test]
fn scenario_c_decision_table_age_tier() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "t", "type": "decisionTableNode", "content": {
                "inputs": [{"id": "i1", "field": "age"}],
                "outputs": [{"id": "o1", "field": "tier"}],
                "rules": [
                    {"i1": "[0..17]", "o1": "'minor'"},
                    {"i1": "[18..64]", "o1": "'adult'"},
                    {"i1": "", "o1": "'senior'"},
                ],
            }},
            {"id": "out", "type": "outputNode"},
        ],
        "edges": [
            {"sourceId": "in", "targetId": "t"},
            {"sourceId": "t", "targetId": "out"},
        ],
    }));
    let plan = jdm::compile(&d).unwrap();
    assert_eq!(jdm::evaluate(&plan, &json!({"age": 30})), json!({"tier": "adult"}));
    assert_eq!(jdm::evaluate(&plan, &json!({"age": 80})), json!({"tier": "senior"}));
}

#[test]
fn scenario_d_switch_routing() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "sw", "type": "switchNode", "content": {
                "statements": [
                    {"id": "A", "condition": "color == 'red'"},
                    {"id": "B", "condition": ""},
                ]
            }},
            {"id": "ea", "type": "expressionNode", "content": {"expressions": [{"key": "label", "value": "'danger'"}]}},
            {"id": "eb", "type": "expressionNode", "content": {"expressions": [{"key": "label", "value": "'safe'"}]}},
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
    let plan = jdm::compile(&d).unwrap();
    assert_eq!(jdm::evaluate(&plan, &json!({"color": "red"})), json!({"label": "danger"}));
    assert_eq!(jdm::evaluate(&plan, &json!({"color": "green"})), json!({"label": "safe"}));
}

#[test]
fn scenario_e_membership() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "t", "type": "decisionTableNode", "content": {
                "inputs": [{"id": "i1", "field": "country"}],
                "outputs": [{"id": "o1", "field": "matched"}],
                "rules": [{"i1": "'US','CA','UK'", "o1": "true"}],
            }},
            {"id": "out", "type": "outputNode"},
        ],
        "edges": [
            {"sourceId": "in", "targetId": "t"},
            {"sourceId": "t", "targetId": "out"},
        ],
    }));
    let plan = jdm::compile(&d).unwrap();
    assert_eq!(jdm::evaluate(&plan, &json!({"country": "CA"})), json!({"matched": true}));
    assert_eq!(jdm::evaluate(&plan, &json!({"country": "DE"})), json!({}));
}

#[test]
fn scenario_f_ends_with() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "t", "type": "decisionTableNode", "content": {
                "inputs": [{"id": "i1", "field": "host"}],
                "outputs": [{"id": "o1", "field": "gov"}],
                "rules": [{"i1": "endsWith($, '.gov')", "o1": "true"}],
            }},
            {"id": "out", "type": "outputNode"},
        ],
        "edges": [
            {"sourceId": "in", "targetId": "t"},
            {"sourceId": "t", "targetId": "out"},
        ],
    }));
    let plan = jdm::compile(&d).unwrap();
    assert_eq!(jdm::evaluate(&plan, &json!({"host": "irs.gov"})), json!({"gov": true}));
    assert_eq!(jdm::evaluate(&plan, &json!({"host": "example.com"})), json!({}));
}

#[test]
fn missing_input_node_fails_compilation() {
    let d = doc(json!({"nodes": [{"id": "out", "type": "outputNode"}], "edges": []}));
    assert!(matches!(jdm::compile(&d), Err(jdm::CompileError::MissingInputNode)));
}

#[test]
fn unrecognized_function_node_fails_compilation() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "f", "type": "functionNode", "content": "return 1"},
        ],
        "edges": [{"sourceId": "in", "targetId": "f"}],
    }));
    assert!(matches!(jdm::compile(&d), Err(jdm::CompileError::NodeNotCompilable { .. })));
}

#[test]
fn reevaluation_is_idempotent() {
    let d = doc(json!({
        "nodes": [
            {"id": "in", "type": "inputNode"},
            {"id": "e", "type": "expressionNode", "content": {"expressions": [{"key": "total", "value": "sum(items)"}]}},
            {"id": "out", "type": "outputNode"},
        ],
        "edges": [
            {"sourceId": "in", "targetId": "e"},
            {"sourceId": "e", "targetId": "out"},
        ],
    }));
    let plan = jdm::compile(&d).unwrap();
    let input = json!({"items": [1, 2, 3]});
    let first = jdm::evaluate(&plan, &input);
    let second = jdm::evaluate(&plan, &input);
    assert_eq!(first, second);
}
