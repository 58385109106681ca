use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by converter resolution and marshalling.
///
/// All variants propagate synchronously to the caller. The single documented
/// leniency, an unparseable formatted date, never reaches this type: it
/// degrades to a null value with a logged warning instead.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// A raw JSON value could not be coerced into the field's local type.
    #[error("cannot convert field `{field}` (remote type `{tag}`) from value {raw}")]
    Conversion {
        /// Remote name of the offending field.
        field: String,
        /// The remote type tag the converter was resolved for.
        tag: String,
        /// The raw value that failed to convert.
        raw: Value,
    },

    /// A converted value did not fit the field's declared local type.
    ///
    /// This is a configuration error in the entity declaration or the
    /// converter registration, not a data error.
    #[error("field `{field}` expected {expected}, got {found}")]
    Mismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// An entity type transitively embeds itself.
    ///
    /// Cyclic entity graphs are not supported; the cycle is detected when the
    /// field mapping for the root type is first populated.
    #[error("entity `{entity}` cyclically embeds `{embedded}`")]
    CyclicEntity {
        entity: &'static str,
        embedded: &'static str,
    },
}

impl MarshalError {
    pub(crate) fn conversion(field: &str, tag: &str, raw: &Value) -> Self {
        MarshalError::Conversion {
            field: field.to_string(),
            tag: tag.to_string(),
            raw: raw.clone(),
        }
    }

    pub(crate) fn mismatch(field: &str, expected: &'static str, found: impl Into<String>) -> Self {
        MarshalError::Mismatch {
            field: field.to_string(),
            expected,
            found: found.into(),
        }
    }
}

/// Returns a human-readable type name for a JSON value.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
