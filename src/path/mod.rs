//! Dotted, array-indexed paths into nested JSON values.
//!
//! A path such as `appearance.pos[0]` is a sequence of steps. Every step names a
//! key of a map; an indexed step additionally addresses a slot of the array held
//! under that key:
//!
//! ```
//! use dss_tabular::path::{Path, Step};
//!
//! let path = Path::parse("appearance.pos[2]");
//! assert_eq!(path.steps(), &[Step::field("appearance"), Step::indexed("pos", 2)]);
//! ```
//!
//! Parsing is total: a segment that does not match `name` or `name[index]` is kept
//! verbatim as a plain field name.

pub mod get;
pub mod set;

use std::fmt;

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::constants::{is_json_key, MAX_PATH_INDEX};

pub use get::get_path;
pub use set::set_path;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub name: SmolStr,
    pub index: Option<usize>,
}

impl Step {
    pub fn field(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            index: None,
        }
    }

    pub fn indexed(name: &str, index: usize) -> Self {
        Self {
            name: SmolStr::new(name),
            index: Some(index),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    raw: SmolStr,
    steps: SmallVec<[Step; 4]>,
}

impl Path {
    pub fn parse(raw: &str) -> Self {
        let bytes = raw.as_bytes();
        let mut steps = SmallVec::new();
        let mut start = 0;
        for dot in memchr::memchr_iter(b'.', bytes) {
            steps.push(parse_segment(&raw[start..dot]));
            start = dot + 1;
        }
        steps.push(parse_segment(&raw[start..]));
        Self {
            raw: SmolStr::new(raw),
            steps,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn leaf(&self) -> &Step {
        // `parse` always yields at least one step.
        &self.steps[self.steps.len() - 1]
    }

    /// True when the final field name carries the `_json` suffix.
    pub fn is_json(&self) -> bool {
        is_json_key(&self.leaf().name)
    }

    /// True when some step has an empty name; such a path addresses nothing.
    pub fn is_degenerate(&self) -> bool {
        self.steps.iter().any(|step| step.name.is_empty())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Path::parse(raw)
    }
}

// `name` or `name[digits]`, where `name` holds no brackets and the index is
// at most `MAX_PATH_INDEX`.
fn parse_segment(segment: &str) -> Step {
    match split_indexed(segment) {
        Some((name, index)) => Step::indexed(name, index),
        None => Step::field(segment),
    }
}

fn split_indexed(segment: &str) -> Option<(&str, usize)> {
    let body = segment.strip_suffix(']')?;
    let open = memchr::memchr(b'[', body.as_bytes())?;
    let (name, digits) = (&body[..open], &body[open + 1..]);
    if !is_plain_name(name) || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let index = digits.parse().ok().filter(|index| *index <= MAX_PATH_INDEX)?;
    Some((name, index))
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && memchr::memchr2(b'[', b']', name.as_bytes()).is_none()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("meta.uuid", vec![Step::field("meta"), Step::field("uuid")])]
    #[case("appearance.pos[0]", vec![Step::field("appearance"), Step::indexed("pos", 0)])]
    #[case("a.b[2].c", vec![Step::field("a"), Step::indexed("b", 2), Step::field("c")])]
    #[case("x[10]", vec![Step::indexed("x", 10)])]
    #[case("x[65535]", vec![Step::indexed("x", MAX_PATH_INDEX)])]
    #[case("0", vec![Step::field("0")])]
    fn test_parse_well_formed(#[case] raw: &str, #[case] expected: Vec<Step>) {
        assert_eq!(Path::parse(raw).steps(), expected.as_slice());
    }

    #[rstest]
    #[case("a[x]", vec![Step::field("a[x]")])]
    #[case("a[1][2]", vec![Step::field("a[1][2]")])]
    #[case("[0]", vec![Step::field("[0]")])]
    #[case("a[-1]", vec![Step::field("a[-1]")])]
    #[case("a[]", vec![Step::field("a[]")])]
    #[case("a[65536]", vec![Step::field("a[65536]")])]
    #[case("a[18446744073709551615]", vec![Step::field("a[18446744073709551615]")])]
    #[case("a[99999999999999999999999]", vec![Step::field("a[99999999999999999999999]")])]
    fn test_parse_malformed_segment_is_opaque(#[case] raw: &str, #[case] expected: Vec<Step>) {
        assert_eq!(Path::parse(raw).steps(), expected.as_slice());
    }

    #[rstest]
    fn test_parse_stray_dots_yield_empty_names() {
        let path = Path::parse(".a.");
        assert_eq!(
            path.steps(),
            &[Step::field(""), Step::field("a"), Step::field("")]
        );
        assert!(path.is_degenerate());
        assert!(Path::parse("").is_degenerate());
        assert!(!Path::parse("a.b").is_degenerate());
    }

    #[rstest]
    fn test_json_suffix_checks_leaf_name() {
        assert!(Path::parse("extra.tags_json").is_json());
        assert!(Path::parse("tags_json[1]").is_json());
        assert!(!Path::parse("tags_json.x").is_json());
    }

    #[rstest]
    fn test_display_round_trips_raw_text() {
        let path = Path::parse("a.b[3]");
        assert_eq!(path.to_string(), "a.b[3]");
        assert_eq!(path.leaf().to_string(), "b[3]");
    }
}
