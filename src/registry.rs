//! The type converter registry and the built-in converters.
//!
//! Two independent tables drive conversion: one keyed by the remote type tag
//! announced by the server, one keyed by the field's declared local type.
//! [`TypeRegistry::resolve`] applies the exact fallback order described on
//! [`TypeRegistry`]; registration is start-up configuration and the registry
//! is shared immutably while marshalling is in flight.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};
use log::warn;
use serde_json::Value;

use crate::entity::{Converted, LocalType, LocalTypeKey};
use crate::error::MarshalError;

/// Remote type tag used when a payload carries no type announcement, such as
/// the fields of an embedded entity object.
///
/// Resolving this tag falls through to entity- or local-type-based
/// resolution, since no converter is registered for it.
pub const UNKNOWN_TYPE: &str = "__unknown_type__";

/// A conversion from a raw JSON value into a typed [`Converted`] value.
///
/// Converters receive the registry so structured conversions can recurse,
/// and the field name and tag so failures identify the offending field.
pub trait Converter: Send + Sync {
    fn convert(
        &self,
        registry: &TypeRegistry,
        field: &str,
        tag: &str,
        local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError>;
}

/// Maps remote type tags and local value types to converters.
///
/// Resolution order, exactly:
///
/// 1. Exact match on the remote type tag.
/// 2. If the field's local type is an entity type, the embedded-entity
///    converter. This check deliberately precedes the local-type table, so
///    an entity type with a coincidentally registered local converter still
///    marshals structurally.
/// 3. Exact match on the local type.
/// 4. Identity passthrough of the raw value.
pub struct TypeRegistry {
    by_tag: HashMap<String, Arc<dyn Converter>>,
    by_local: HashMap<LocalTypeKey, Arc<dyn Converter>>,
    embedded: Arc<dyn Converter>,
    identity: Arc<dyn Converter>,
}

impl TypeRegistry {
    /// A registry populated with the stock tag and local-type tables.
    pub fn new() -> TypeRegistry {
        let integer: Arc<dyn Converter> = Arc::new(IntegerConverter);
        let double: Arc<dyn Converter> = Arc::new(DoubleConverter);
        let boolean: Arc<dyn Converter> = Arc::new(BooleanConverter);
        let string: Arc<dyn Converter> = Arc::new(StringConverter);
        let timestamp: Arc<dyn Converter> = Arc::new(TimestampConverter);
        let embedded: Arc<dyn Converter> = Arc::new(EmbeddedEntityConverter);

        let mut by_tag: HashMap<String, Arc<dyn Converter>> = HashMap::new();
        by_tag.insert("percent".to_string(), integer.clone());
        by_tag.insert("stars".to_string(), integer.clone());
        by_tag.insert("date".to_string(), timestamp.clone());
        by_tag.insert(
            "calendar_date".to_string(),
            Arc::new(FormattedDateConverter::new("%Y-%m-%dT%H:%M:%S")),
        );
        by_tag.insert("money".to_string(), double.clone());
        for text_tag in ["text", "dataset_link", "html", "photo", "drop_down_list", "flag"] {
            by_tag.insert(text_tag.to_string(), string.clone());
        }
        for entity_tag in ["phone", "location", "url", "document"] {
            by_tag.insert(entity_tag.to_string(), embedded.clone());
        }

        let mut by_local: HashMap<LocalTypeKey, Arc<dyn Converter>> = HashMap::new();
        by_local.insert(LocalTypeKey::Int, integer.clone());
        by_local.insert(LocalTypeKey::Long, integer);
        by_local.insert(LocalTypeKey::Double, double);
        by_local.insert(LocalTypeKey::Bool, boolean);
        by_local.insert(LocalTypeKey::Text, string);
        by_local.insert(LocalTypeKey::Timestamp, timestamp);

        TypeRegistry {
            by_tag,
            by_local,
            embedded,
            identity: Arc::new(IdentityConverter),
        }
    }

    /// Installs or replaces the converter for a remote type tag.
    pub fn register(&mut self, tag: impl Into<String>, converter: Arc<dyn Converter>) {
        self.by_tag.insert(tag.into(), converter);
    }

    /// Installs or replaces the converter for a local value type.
    pub fn register_local(&mut self, key: LocalTypeKey, converter: Arc<dyn Converter>) {
        self.by_local.insert(key, converter);
    }

    /// Resolves the converter for a `(tag, local type)` pair.
    pub fn resolve(&self, tag: &str, local_type: LocalType) -> Arc<dyn Converter> {
        if let Some(converter) = self.by_tag.get(tag) {
            return converter.clone();
        }
        if local_type.is_entity() {
            return self.embedded.clone();
        }
        if let Some(converter) = self.by_local.get(&local_type.key()) {
            return converter.clone();
        }
        self.identity.clone()
    }
}

impl Default for TypeRegistry {
    fn default() -> TypeRegistry {
        TypeRegistry::new()
    }
}

/// Parses decimal strings or JSON numbers into integers.
pub struct IntegerConverter;

impl Converter for IntegerConverter {
    fn convert(
        &self,
        _registry: &TypeRegistry,
        field: &str,
        tag: &str,
        _local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        let parsed = match raw {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(Converted::Int)
            .ok_or_else(|| MarshalError::conversion(field, tag, raw))
    }
}

/// Parses decimal strings or JSON numbers into doubles.
pub struct DoubleConverter;

impl Converter for DoubleConverter {
    fn convert(
        &self,
        _registry: &TypeRegistry,
        field: &str,
        tag: &str,
        _local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        let parsed = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .map(Converted::Double)
            .ok_or_else(|| MarshalError::conversion(field, tag, raw))
    }
}

/// Accepts JSON booleans and case-insensitive `true`/`false` strings.
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn convert(
        &self,
        _registry: &TypeRegistry,
        field: &str,
        tag: &str,
        _local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        let parsed = match raw {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        };
        parsed
            .map(Converted::Bool)
            .ok_or_else(|| MarshalError::conversion(field, tag, raw))
    }
}

/// Passes strings through and stringifies other scalars.
pub struct StringConverter;

impl Converter for StringConverter {
    fn convert(
        &self,
        _registry: &TypeRegistry,
        field: &str,
        tag: &str,
        _local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        match raw {
            Value::String(s) => Ok(Converted::Text(s.clone())),
            Value::Number(n) => Ok(Converted::Text(n.to_string())),
            Value::Bool(b) => Ok(Converted::Text(b.to_string())),
            _ => Err(MarshalError::conversion(field, tag, raw)),
        }
    }
}

/// The generic date/timestamp converter.
///
/// Accepts epoch seconds (as a number or numeric string) and bare ISO-8601
/// date-times like `2012-09-17T00:00:00`.
pub struct TimestampConverter;

impl Converter for TimestampConverter {
    fn convert(
        &self,
        _registry: &TypeRegistry,
        field: &str,
        tag: &str,
        _local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        let parsed = match raw {
            Value::Number(n) => n.as_i64().and_then(epoch_seconds),
            Value::String(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(secs) => epoch_seconds(secs),
                    Err(_) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok(),
                }
            }
            _ => None,
        };
        parsed
            .map(Converted::Timestamp)
            .ok_or_else(|| MarshalError::conversion(field, tag, raw))
    }
}

fn epoch_seconds(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Parses date strings against an explicit `chrono` format pattern.
///
/// This converter is deliberately lenient: an unparseable value degrades to
/// [`Converted::Null`] with a logged warning, leaving the target field at
/// its default. Callers must tolerate the missing value in that one case.
pub struct FormattedDateConverter {
    format: String,
}

impl FormattedDateConverter {
    pub fn new(format: impl Into<String>) -> FormattedDateConverter {
        FormattedDateConverter {
            format: format.into(),
        }
    }
}

impl Converter for FormattedDateConverter {
    fn convert(
        &self,
        _registry: &TypeRegistry,
        field: &str,
        _tag: &str,
        _local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        let text = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match NaiveDateTime::parse_from_str(text.trim(), &self.format) {
            Ok(parsed) => Ok(Converted::Timestamp(parsed)),
            Err(_) => {
                warn!("unparseable formatted date for field `{field}`: {raw}");
                Ok(Converted::Null)
            }
        }
    }
}

/// Marshals embedded entity objects and arrays through the field's declared
/// entity type.
///
/// Nested payloads carry no remote type tags, so the nested marshaller tags
/// every declared field with [`UNKNOWN_TYPE`].
pub struct EmbeddedEntityConverter;

impl Converter for EmbeddedEntityConverter {
    fn convert(
        &self,
        registry: &TypeRegistry,
        field: &str,
        tag: &str,
        local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        let LocalType::Entity(descriptor) = local_type else {
            return Err(MarshalError::mismatch(
                field,
                "an entity-typed field",
                format!("{:?} (remote type `{}`)", local_type, tag),
            ));
        };
        match raw {
            Value::Object(json) => Ok(Converted::Entity(descriptor.marshal_object(registry, json)?)),
            Value::Array(items) => Ok(Converted::Entity(descriptor.marshal_array(registry, items)?)),
            other => Err(MarshalError::conversion(field, tag, other)),
        }
    }
}

/// Hands the raw JSON value through unconverted.
pub struct IdentityConverter;

impl Converter for IdentityConverter {
    fn convert(
        &self,
        _registry: &TypeRegistry,
        _field: &str,
        _tag: &str,
        _local_type: LocalType,
        raw: &Value,
    ) -> Result<Converted, MarshalError> {
        Ok(Converted::Raw(raw.clone()))
    }
}
