//! Deep-merge of JSON-shaped values: objects merge key by key, any other
//! pairing (including list-into-list) is a full overwrite.

use serde_json::Value;

pub fn deep_merge(target: &mut Value, src: &Value) {
    match (target, src) {
        (Value::Object(t), Value::Object(s)) => {
            for (k, v) in s {
                deep_merge(t.entry(k.clone()).or_insert(Value::Null), v);
            }
        }
        (t, s) => {
            *t = s.clone();
        }
    }
}

/// Strips every reserved `__switch_<nodeId>` guard key. Applied once, to
/// the assembled output, as the closing guarantee that no internal routing
/// key ever leaks into a result regardless of which node contributed it.
pub fn strip_switch_keys(value: &mut Value) {
    if let Value::Object(map) = value {
        map.retain(|k, _| !k.starts_with("__switch_"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merges_nested_objects_recursively() {
        let mut target = json!({"a": {"x": 1}, "b": 2});
        deep_merge(&mut target, &json!({"a": {"y": 2}, "c": 3}));
        assert_eq!(target, json!({"a": {"x": 1, "y": 2}, "b": 2, "c": 3}));
    }

    #[test]
    fn lists_replace_rather_than_concatenate() {
        let mut target = json!({"items": [1, 2, 3]});
        deep_merge(&mut target, &json!({"items": [4]}));
        assert_eq!(target, json!({"items": [4]}));
    }

    #[test]
    fn strips_only_switch_keys() {
        let mut value = json!({"__switch_s1": "a", "label": "danger"});
        strip_switch_keys(&mut value);
        assert_eq!(value, json!({"label": "danger"}));
    }
}
