//! Dotted-path navigation and assignment over JSON-shaped values, shared by
//! the expression evaluator's field access and every node compiler's output
//! assignment.

use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct Path {
    raw: String,
    segments: Vec<String>,
}

impl Path {
    pub fn parse(raw: &str) -> Self {
        Path {
            raw: raw.to_string(),
            segments: raw.split('.').map(str::to_owned).collect(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Assigns `value` at this path within `target`. Missing intermediate
    /// objects are created; an existing non-object found at an intermediate
    /// segment is overwritten with a fresh one.
    pub fn set(&self, target: &mut Value, value: Value) {
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        let mut cur = target;
        let (last, init) = self
            .segments
            .split_last()
            .expect("a parsed path always has at least one segment");
        for seg in init {
            let obj = cur.as_object_mut().expect("cur is kept an object by construction");
            let entry = obj.entry(seg.clone()).or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            cur = entry;
        }
        cur.as_object_mut()
            .expect("cur is kept an object by construction")
            .insert(last.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn creates_missing_intermediates() {
        let mut target = Value::Object(Map::new());
        Path::parse("a.b.c").set(&mut target, json!(42));
        assert_eq!(target, json!({"a": {"b": {"c": 42}}}));
    }

    #[test]
    fn overwrites_non_object_intermediate() {
        let mut target = json!({"a": 1});
        Path::parse("a.b").set(&mut target, json!(2));
        assert_eq!(target, json!({"a": {"b": 2}}));
    }
}
