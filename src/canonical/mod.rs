use serde_json::{Map, Value};

/// Canonicalize a record: drop structurally empty members and padding.
///
/// Maps lose members that trim to `null`, `{}` or `[]`; falsy scalars such as
/// `0` and `false` stay. Arrays keep interior `null`s, since positions carry
/// meaning, but lose trailing ones, and an array of nothing but `null`s becomes
/// `[]`. Scalars are returned unchanged.
pub fn trim(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(trim_object(map)),
        Value::Array(items) => Value::Array(trim_array(items)),
        other => other,
    }
}

/// [`trim`] for a value already known to be a map.
pub fn trim_object(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| {
            let value = trim(value);
            (!is_structurally_empty(&value)).then_some((key, value))
        })
        .collect()
}

fn trim_array(items: Vec<Value>) -> Vec<Value> {
    let mut items: Vec<Value> = items.into_iter().map(trim).collect();
    while items.last().is_some_and(Value::is_null) {
        items.pop();
    }
    items
}

fn is_structurally_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!({"a": null, "b": {}, "c": [], "d": 1}), json!({"d": 1}))]
    #[case(json!({"zero": 0, "no": false, "empty": ""}), json!({"zero": 0, "no": false, "empty": ""}))]
    #[case(json!({"a": {"b": {"c": null}}}), json!({}))]
    #[case(json!({"pos": [1, null, 3, null, null]}), json!({"pos": [1, null, 3]}))]
    #[case(json!({"pos": [null, null, 3]}), json!({"pos": [null, null, 3]}))]
    #[case(json!({"pos": [null, null]}), json!({}))]
    #[case(json!([null, null]), json!([]))]
    #[case(json!([{"a": null}]), json!([{}]))]
    #[case(json!([[null], 1]), json!([[], 1]))]
    #[case(json!("text"), json!("text"))]
    #[case(json!(0), json!(0))]
    #[case(Value::Null, Value::Null)]
    fn test_trim(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(trim(input), expected);
    }

    #[rstest]
    #[case(json!({"a": [null, {"b": [null]}], "c": {"d": [1, null]}}))]
    #[case(json!([null, [null, null], {"x": {}}]))]
    #[case(json!({"keep": [0, false, null, ""], "nested": [[], {}]}))]
    fn test_trim_is_idempotent(#[case] input: Value) {
        let once = trim(input);
        let twice = trim(once.clone());
        assert_eq!(once, twice);
    }
}
