use serde_json::Value;

use super::Path;

/// Read the value at `path`, or `None` when any step misses.
pub fn get_path<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = root;
    for step in path.steps() {
        if step.name.is_empty() {
            return None;
        }
        current = current.as_object()?.get(step.name.as_str())?;
        if let Some(index) = step.index {
            current = current.as_array()?.get(index)?;
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn sample() -> Value {
        json!({
            "meta": {"uuid": "u-1"},
            "appearance": {"pos": [1.5, null, 3]},
            "points": [{"name": "a"}],
            "flag": false,
            "count": 0
        })
    }

    #[rstest]
    #[case("meta.uuid", Some(json!("u-1")))]
    #[case("appearance.pos[0]", Some(json!(1.5)))]
    #[case("appearance.pos[1]", Some(Value::Null))]
    #[case("appearance.pos[2]", Some(json!(3)))]
    #[case("points[0].name", Some(json!("a")))]
    #[case("flag", Some(json!(false)))]
    #[case("count", Some(json!(0)))]
    #[case("appearance", Some(json!({"pos": [1.5, null, 3]})))]
    fn test_get_present(#[case] path: &str, #[case] expected: Option<Value>) {
        let doc = sample();
        assert_eq!(get_path(&doc, &Path::parse(path)).cloned(), expected);
    }

    #[rstest]
    #[case("appearance.pos[3]")]
    #[case("meta.uuid.x")]
    #[case("meta[0]")]
    #[case("points.name")]
    #[case("missing")]
    #[case("meta.")]
    #[case("")]
    fn test_get_absent(#[case] path: &str) {
        let doc = sample();
        assert_eq!(get_path(&doc, &Path::parse(path)), None);
    }

    #[rstest]
    fn test_get_on_scalar_root() {
        assert_eq!(get_path(&json!(3), &Path::parse("a")), None);
    }
}
