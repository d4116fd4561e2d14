use std::fmt;

use serde_json::Value;

use crate::{Error, Result};

/// One schema violation: where in the document, and what is wrong.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    /// JSON pointer into the document, `""` for the root.
    pub location: String,
    pub message: String,
}

impl Violation {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.location.is_empty() {
            "/"
        } else {
            self.location.as_str()
        };
        write!(f, "{location}: {}", self.message)
    }
}

/// A JSON-Schema checker. Implementations report every violation they find;
/// `Err` is reserved for a schema they cannot use.
pub trait SchemaValidator {
    fn violations(&self, document: &Value, schema: &Value) -> Result<Vec<Violation>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Passed,
    /// No validator is available in this build.
    Skipped,
}

/// Run `validator` and turn violations into an [`Error`] of kind `Validation`,
/// sorted by location then message.
pub fn validate_with(
    validator: &dyn SchemaValidator,
    document: &Value,
    schema: &Value,
) -> Result<Validation> {
    let mut violations = validator.violations(document, schema)?;
    if violations.is_empty() {
        return Ok(Validation::Passed);
    }
    violations.sort();
    Err(Error::validation(violations))
}

pub fn validate(document: &Value, schema: &Value) -> Result<Validation> {
    match default_validator() {
        Some(validator) => validate_with(validator.as_ref(), document, schema),
        None => {
            tracing::warn!("no schema validator in this build; validation skipped");
            Ok(Validation::Skipped)
        }
    }
}

pub fn default_validator() -> Option<Box<dyn SchemaValidator>> {
    #[cfg(feature = "jsonschema")]
    {
        Some(Box::new(JsonSchemaValidator))
    }
    #[cfg(not(feature = "jsonschema"))]
    {
        None
    }
}

#[cfg(feature = "jsonschema")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

#[cfg(feature = "jsonschema")]
impl SchemaValidator for JsonSchemaValidator {
    fn violations(&self, document: &Value, schema: &Value) -> Result<Vec<Violation>> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|err| Error::schema(format!("invalid schema: {err}")))?;
        Ok(validator
            .iter_errors(document)
            .map(|err| Violation::new(err.instance_path.to_string(), err.to_string()))
            .collect())
    }
}
