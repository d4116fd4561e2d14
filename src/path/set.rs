use serde_json::{Map, Value};

use super::{Path, Step};

/// Write `value` at `path`, creating intermediate maps and arrays on the way.
///
/// The shape of every container comes from the path syntax alone: a step that
/// is followed by another step needs a map to hold the next key, and an indexed
/// step needs an array under its own key, padded with `null` up to the index.
/// Whatever non-matching value sits in the way is replaced; a repeated path
/// overwrites the earlier value. A path with an empty step name writes nothing.
pub fn set_path(root: &mut Map<String, Value>, path: &Path, value: Value) {
    if path.is_degenerate() {
        return;
    }
    insert_steps(root, path.steps(), value);
}

fn insert_steps(map: &mut Map<String, Value>, steps: &[Step], value: Value) {
    let Some((step, rest)) = steps.split_first() else {
        return;
    };

    let slot = match step.index {
        None => {
            if rest.is_empty() {
                map.insert(step.name.to_string(), value);
                return;
            }
            map.entry(step.name.as_str()).or_insert(Value::Null)
        }
        Some(index) => {
            let entry = map.entry(step.name.as_str()).or_insert(Value::Null);
            if !entry.is_array() {
                *entry = Value::Array(Vec::new());
            }
            let Value::Array(items) = entry else {
                return;
            };
            let Some(len) = index.checked_add(1) else {
                return;
            };
            if items.len() < len {
                items.resize(len, Value::Null);
            }
            if rest.is_empty() {
                items[index] = value;
                return;
            }
            &mut items[index]
        }
    };

    // The next step names a key, so whatever holds it has to be a map.
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(child) = slot {
        insert_steps(child, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn write_all(pairs: &[(&str, Value)]) -> Value {
        let mut root = Map::new();
        for (path, value) in pairs {
            set_path(&mut root, &Path::parse(path), value.clone());
        }
        Value::Object(root)
    }

    #[rstest]
    fn test_nested_fields() {
        let out = write_all(&[("meta.uuid", json!("u-1")), ("meta.name", json!("p"))]);
        assert_eq!(out, json!({"meta": {"uuid": "u-1", "name": "p"}}));
    }

    #[rstest]
    fn test_index_pads_with_null() {
        let out = write_all(&[("a[2]", json!(7))]);
        assert_eq!(out, json!({"a": [null, null, 7]}));
    }

    #[rstest]
    fn test_array_under_field() {
        let out = write_all(&[("x.y[0]", json!(1)), ("x.y[1]", json!(2))]);
        assert_eq!(out, json!({"x": {"y": [1, 2]}}));
    }

    #[rstest]
    fn test_map_inside_array() {
        let out = write_all(&[("x[0].y", json!(1))]);
        assert_eq!(out, json!({"x": [{"y": 1}]}));

        let out = write_all(&[("x[1].y", json!(1)), ("x[1].z", json!(2))]);
        assert_eq!(out, json!({"x": [null, {"y": 1, "z": 2}]}));
    }

    #[rstest]
    fn test_nested_arrays_through_maps() {
        let out = write_all(&[("a[0].b[1]", json!(true))]);
        assert_eq!(out, json!({"a": [{"b": [null, true]}]}));
    }

    #[rstest]
    fn test_last_write_wins() {
        let out = write_all(&[("a", json!(1)), ("a", json!(2))]);
        assert_eq!(out, json!({"a": 2}));
    }

    #[rstest]
    #[case(vec![("a", json!(1)), ("a.b", json!(2))], json!({"a": {"b": 2}}))]
    #[case(vec![("a", json!("s")), ("a[1]", json!(2))], json!({"a": [null, 2]}))]
    #[case(vec![("a[0]", json!(1)), ("a.b", json!(2))], json!({"a": {"b": 2}}))]
    #[case(vec![("a[0]", json!(1)), ("a[0].b", json!(2))], json!({"a": [{"b": 2}]}))]
    fn test_conflicting_value_is_replaced(
        #[case] pairs: Vec<(&'static str, Value)>,
        #[case] expected: Value,
    ) {
        assert_eq!(write_all(&pairs), expected);
    }

    #[rstest]
    #[case(".a")]
    #[case("a.")]
    #[case("a..b")]
    #[case("")]
    fn test_empty_step_name_is_noop(#[case] path: &str) {
        let out = write_all(&[(path, json!(1))]);
        assert_eq!(out, json!({}));
    }

    #[rstest]
    #[case("a[18446744073709551615]")]
    #[case("a[4000000000].b")]
    fn test_oversized_index_is_a_plain_key(#[case] path: &str) {
        let out = write_all(&[(path, json!(1))]);
        let Value::Object(map) = out else {
            panic!("expected object");
        };
        assert_eq!(map.len(), 1);
        assert!(map.keys().all(|key| key.starts_with("a[")));
    }

    #[rstest]
    fn test_max_index_step_never_overflows() {
        let mut root = Map::new();
        let step = [Step::indexed("a", usize::MAX)];
        insert_steps(&mut root, &step, json!(1));
        assert_eq!(Value::Object(root), json!({"a": []}));
    }

    #[rstest]
    fn test_opaque_segment_is_a_plain_key() {
        let out = write_all(&[("a[x].b", json!(1))]);
        assert_eq!(out, json!({"a[x]": {"b": 1}}));
    }
}
