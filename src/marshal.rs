//! The marshaller driving JSON traversal into typed entities.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::entity::{Converted, Entity};
use crate::error::{value_kind, MarshalError};
use crate::mapping::{mapping_for, FieldMapping};
use crate::registry::{TypeRegistry, UNKNOWN_TYPE};

/// Marshals raw JSON payloads into typed entities.
///
/// A marshaller combines the converter registry, the cached field mapping for
/// the target type, and the `field → remote type tag` table announced by the
/// transport layer. The target being a recognized entity type is enforced by
/// the `T: Entity` bound rather than checked at runtime.
///
/// ```
/// use serde_json::json;
/// use sodaq::{Marshaller, TypeRegistry};
///
/// sodaq::entity! {
///     pub struct Inspection {
///         score: Option<i32>,
///         grade: Option<String>,
///     }
/// }
///
/// let registry = TypeRegistry::new();
/// let mut marshaller = Marshaller::<Inspection>::new(&registry).unwrap();
/// marshaller.add_field_type("score", "number");
/// marshaller.add_field_type("grade", "text");
///
/// let row = json!({"score": "87", "grade": "A"});
/// let inspection = marshaller.from_object(row.as_object().unwrap()).unwrap();
/// assert_eq!(inspection.score, Some(87));
/// ```
pub struct Marshaller<'r, T: Entity> {
    registry: &'r TypeRegistry,
    mapping: Arc<FieldMapping<T>>,
    field_types: HashMap<String, String>,
}

impl<'r, T: Entity> Marshaller<'r, T> {
    /// A marshaller for `T` with an empty field-type table.
    ///
    /// Fails if `T`'s entity graph is cyclic.
    pub fn new(registry: &'r TypeRegistry) -> Result<Marshaller<'r, T>, MarshalError> {
        Ok(Marshaller {
            registry,
            mapping: mapping_for::<T>()?,
            field_types: HashMap::new(),
        })
    }

    /// A marshaller for an embedded entity.
    ///
    /// Responses carry no remote type tags for nested object fields, so every
    /// declared field of `T` is tagged [`UNKNOWN_TYPE`], forcing resolution
    /// through the entity check and the local-type table.
    pub(crate) fn embedded(registry: &'r TypeRegistry) -> Result<Marshaller<'r, T>, MarshalError> {
        let mut marshaller = Marshaller::new(registry)?;
        let declared: Vec<&'static str> = marshaller.mapping.keys().copied().collect();
        for remote_name in declared {
            marshaller.add_field_type(remote_name, UNKNOWN_TYPE);
        }
        Ok(marshaller)
    }

    /// Declares the remote type tag for a field.
    pub fn add_field_type(&mut self, field: impl Into<String>, tag: impl Into<String>) {
        self.field_types.insert(field.into(), tag.into());
    }

    /// Declares remote type tags from an iterator of `(field, tag)` pairs.
    pub fn with_field_types<F, G>(mut self, pairs: impl IntoIterator<Item = (F, G)>) -> Self
    where
        F: Into<String>,
        G: Into<String>,
    {
        for (field, tag) in pairs {
            self.add_field_type(field, tag);
        }
        self
    }

    /// Marshals a JSON object into a `T`.
    ///
    /// For each declared `(field, tag)` pair with a matching field spec and a
    /// present, non-null payload value, resolves a converter and assigns the
    /// converted value. Absent keys, explicit nulls, and the lenient
    /// formatted-date failure all leave the target field at its default.
    pub fn from_object(&self, json: &Map<String, Value>) -> Result<T, MarshalError> {
        let mut model = T::default();
        for (field, tag) in &self.field_types {
            let Some(spec) = self.mapping.get(field.as_str()) else {
                continue;
            };
            let Some(raw) = json.get(field) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }
            let converter = self.registry.resolve(tag, spec.local_type);
            let converted =
                converter.convert(self.registry, spec.remote_name, tag, spec.local_type, raw)?;
            if matches!(converted, Converted::Null) {
                continue;
            }
            (spec.assign)(&mut model, converted)?;
        }
        Ok(model)
    }

    /// Marshals a JSON array into a `Vec<T>`, preserving order.
    ///
    /// Every element must be an object; nothing is dropped silently, so the
    /// result length always equals the input length.
    pub fn from_array(&self, items: &[Value]) -> Result<Vec<T>, MarshalError> {
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(json) => result.push(self.from_object(json)?),
                other => {
                    return Err(MarshalError::mismatch(
                        T::NAME,
                        "an object element",
                        value_kind(other),
                    ));
                }
            }
        }
        Ok(result)
    }
}

/// Pairs the parallel field and type announcement arrays by index into a
/// `field → remote type tag` table.
///
/// Transports announce row types as two parallel lists, one of field names
/// and one of type tags. Extra entries in the longer list are ignored.
pub fn field_types_from_headers<F, G>(fields: &[F], types: &[G]) -> HashMap<String, String>
where
    F: AsRef<str>,
    G: AsRef<str>,
{
    fields
        .iter()
        .zip(types)
        .map(|(field, tag)| (field.as_ref().to_string(), tag.as_ref().to_string()))
        .collect()
}
