pub const POINTS_SHEET: &str = "points";

pub const LINES_SHEET: &str = "lines";

pub const META_SHEET: &str = "document_meta";

pub const DEFAULT_SCHEMA_URI: &str =
    "https://q2t-project.github.io/3dsl/schemas/3DSS.schema.json#v1.1.3";

pub const DEFAULT_TITLE: &str = "Untitled";

pub const DEFAULT_AUTHOR: &str = "unknown";

pub const DEFAULT_VERSION: &str = "1.0.0";

/// Marker left in `document_uuid` by the authoring template.
pub const UUID_PLACEHOLDER: &str = "PUT_UUID";

pub const JSON_SUFFIX: &str = "_json";

pub const DEFAULT_MAX_ROWS: usize = 5000;

pub const DEFAULT_INDENT: usize = 2;

/// Largest array index a column key may address; longer digit runs stay part
/// of the field name.
pub const MAX_PATH_INDEX: usize = 65_535;

#[inline]
pub fn is_json_key(name: &str) -> bool {
    name.ends_with(JSON_SUFFIX)
}

#[inline]
pub fn is_placeholder_uuid(value: &str) -> bool {
    value.contains(UUID_PLACEHOLDER)
}
