//! Statically declared entity types and their field-mapping tables.
//!
//! A remote row marshals into a local type through a per-type table of
//! [`FieldSpec`]s: one entry per declared field, keyed by the remote field
//! name, carrying the field's [`LocalType`] and an assignment function.
//! The [`entity!`] macro declares the struct and generates the table, which
//! replaces annotation scanning with code the compiler can check.
//!
//! Only fields declared directly in the macro body are mapped; there is no
//! base-type or composition walk.

use std::any::{Any, TypeId};
use std::fmt;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::error::MarshalError;
use crate::marshal::Marshaller;
use crate::registry::TypeRegistry;

/// A value produced by a converter, ready for field assignment.
#[derive(Debug)]
pub enum Converted {
    /// Explicit absence; the target field keeps its default value.
    Null,
    /// An integer of any local width.
    Int(i64),
    /// A double-precision float.
    Double(f64),
    /// A boolean.
    Bool(bool),
    /// A string.
    Text(String),
    /// A parsed date or timestamp.
    Timestamp(NaiveDateTime),
    /// A marshalled embedded entity: a boxed `T` or boxed `Vec<T>`.
    Entity(Box<dyn Any>),
    /// Unconverted raw JSON from the identity fallback.
    Raw(Value),
}

impl Converted {
    /// A short name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Converted::Null => "null",
            Converted::Int(_) => "integer",
            Converted::Double(_) => "double",
            Converted::Bool(_) => "boolean",
            Converted::Text(_) => "text",
            Converted::Timestamp(_) => "timestamp",
            Converted::Entity(_) => "entity",
            Converted::Raw(_) => "raw value",
        }
    }
}

/// The declared local type of an entity field.
///
/// Converter resolution uses this as the tiebreaker when a remote type tag
/// has no registered converter.
#[derive(Clone, Copy)]
pub enum LocalType {
    /// 32-bit integer (`i32`)
    Int,
    /// 64-bit integer (`i64`)
    Long,
    /// `f64`
    Double,
    /// `bool`
    Bool,
    /// `String`
    Text,
    /// `chrono::NaiveDateTime`
    Timestamp,
    /// An embedded entity type.
    Entity(EntityDescriptor),
}

impl LocalType {
    /// The hashable registry key for this local type.
    pub fn key(&self) -> LocalTypeKey {
        match self {
            LocalType::Int => LocalTypeKey::Int,
            LocalType::Long => LocalTypeKey::Long,
            LocalType::Double => LocalTypeKey::Double,
            LocalType::Bool => LocalTypeKey::Bool,
            LocalType::Text => LocalTypeKey::Text,
            LocalType::Timestamp => LocalTypeKey::Timestamp,
            LocalType::Entity(descriptor) => LocalTypeKey::Entity(descriptor.type_id()),
        }
    }

    /// Whether this is a structured entity type.
    pub fn is_entity(&self) -> bool {
        matches!(self, LocalType::Entity(_))
    }
}

impl fmt::Debug for LocalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalType::Int => write!(f, "Int"),
            LocalType::Long => write!(f, "Long"),
            LocalType::Double => write!(f, "Double"),
            LocalType::Bool => write!(f, "Bool"),
            LocalType::Text => write!(f, "Text"),
            LocalType::Timestamp => write!(f, "Timestamp"),
            LocalType::Entity(descriptor) => write!(f, "Entity({})", descriptor.name()),
        }
    }
}

/// Identity key for local-type-keyed converter registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalTypeKey {
    Int,
    Long,
    Double,
    Bool,
    Text,
    Timestamp,
    Entity(TypeId),
}

/// A type-erased handle to an entity type.
///
/// Embedded-entity fields carry one of these so the marshaller can recurse
/// into the nested type without knowing it statically.
#[derive(Clone, Copy)]
pub struct EntityDescriptor {
    type_id: TypeId,
    name: &'static str,
    marshal_object: fn(&TypeRegistry, &Map<String, Value>) -> Result<Box<dyn Any>, MarshalError>,
    marshal_array: fn(&TypeRegistry, &[Value]) -> Result<Box<dyn Any>, MarshalError>,
    embedded: fn() -> Vec<EntityDescriptor>,
}

impl EntityDescriptor {
    /// The descriptor for a concrete entity type.
    pub fn of<T: Entity>() -> EntityDescriptor {
        EntityDescriptor {
            type_id: TypeId::of::<T>(),
            name: T::NAME,
            marshal_object: marshal_object_erased::<T>,
            marshal_array: marshal_array_erased::<T>,
            embedded: embedded_of::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Marshals a JSON object into a boxed instance of the described type.
    pub(crate) fn marshal_object(
        &self,
        registry: &TypeRegistry,
        json: &Map<String, Value>,
    ) -> Result<Box<dyn Any>, MarshalError> {
        (self.marshal_object)(registry, json)
    }

    /// Marshals a JSON array into a boxed `Vec` of the described type.
    pub(crate) fn marshal_array(
        &self,
        registry: &TypeRegistry,
        items: &[Value],
    ) -> Result<Box<dyn Any>, MarshalError> {
        (self.marshal_array)(registry, items)
    }

    /// Descriptors of the entity types embedded in the described type's
    /// declared fields.
    pub(crate) fn embedded(&self) -> Vec<EntityDescriptor> {
        (self.embedded)()
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

fn marshal_object_erased<T: Entity>(
    registry: &TypeRegistry,
    json: &Map<String, Value>,
) -> Result<Box<dyn Any>, MarshalError> {
    let marshaller = Marshaller::<T>::embedded(registry)?;
    Ok(Box::new(marshaller.from_object(json)?))
}

fn marshal_array_erased<T: Entity>(
    registry: &TypeRegistry,
    items: &[Value],
) -> Result<Box<dyn Any>, MarshalError> {
    let marshaller = Marshaller::<T>::embedded(registry)?;
    Ok(Box::new(marshaller.from_array(items)?))
}

fn embedded_of<T: Entity>() -> Vec<EntityDescriptor> {
    T::fields()
        .into_iter()
        .filter_map(|spec| match spec.local_type {
            LocalType::Entity(descriptor) => Some(descriptor),
            _ => None,
        })
        .collect()
}

/// The statically declared mapping for one field of an entity type.
pub struct FieldSpec<T> {
    /// The remote field name this spec is keyed by.
    pub remote_name: &'static str,
    /// The local field name, for diagnostics.
    pub local_name: &'static str,
    /// The field's declared local type.
    pub local_type: LocalType,
    /// Assigns a converted value into the target field.
    pub assign: fn(&mut T, Converted) -> Result<(), MarshalError>,
}

impl<T> Clone for FieldSpec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldSpec<T> {}

impl<T> fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("remote_name", &self.remote_name)
            .field("local_name", &self.local_name)
            .field("local_type", &self.local_type)
            .finish()
    }
}

/// A marshalling target with a statically declared field-mapping table.
///
/// Implement through the [`entity!`](crate::entity!) macro rather than by
/// hand; the macro keeps the struct, the specs, and the [`FieldValue`] impls
/// in sync.
pub trait Entity: Default + Send + Sync + 'static {
    /// Type name used in diagnostics.
    const NAME: &'static str;

    /// The declared field specs, in declaration order.
    fn fields() -> Vec<FieldSpec<Self>>;

    /// Type-erased handle used by embedded-entity fields.
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::of::<Self>()
    }
}

/// Extraction of a concrete field type from a [`Converted`] value.
pub trait FieldValue: Sized {
    /// The local type this field resolves converters against.
    fn local_type() -> LocalType;

    /// Extracts the field value, reporting a mismatch for foreign shapes.
    fn from_converted(value: Converted, field: &'static str) -> Result<Self, MarshalError>;
}

impl FieldValue for i32 {
    fn local_type() -> LocalType {
        LocalType::Int
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<i32, MarshalError> {
        match value {
            Converted::Int(n) => i32::try_from(n)
                .map_err(|_| MarshalError::mismatch(field, "a 32-bit integer", n.to_string())),
            other => Err(MarshalError::mismatch(field, "an integer", other.kind())),
        }
    }
}

impl FieldValue for i64 {
    fn local_type() -> LocalType {
        LocalType::Long
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<i64, MarshalError> {
        match value {
            Converted::Int(n) => Ok(n),
            other => Err(MarshalError::mismatch(field, "an integer", other.kind())),
        }
    }
}

impl FieldValue for f64 {
    fn local_type() -> LocalType {
        LocalType::Double
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<f64, MarshalError> {
        match value {
            Converted::Double(n) => Ok(n),
            Converted::Int(n) => Ok(n as f64),
            other => Err(MarshalError::mismatch(field, "a double", other.kind())),
        }
    }
}

impl FieldValue for bool {
    fn local_type() -> LocalType {
        LocalType::Bool
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<bool, MarshalError> {
        match value {
            Converted::Bool(b) => Ok(b),
            other => Err(MarshalError::mismatch(field, "a boolean", other.kind())),
        }
    }
}

impl FieldValue for String {
    fn local_type() -> LocalType {
        LocalType::Text
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<String, MarshalError> {
        match value {
            Converted::Text(s) => Ok(s),
            Converted::Raw(Value::String(s)) => Ok(s),
            other => Err(MarshalError::mismatch(field, "a string", other.kind())),
        }
    }
}

impl FieldValue for NaiveDateTime {
    fn local_type() -> LocalType {
        LocalType::Timestamp
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<NaiveDateTime, MarshalError> {
        match value {
            Converted::Timestamp(t) => Ok(t),
            other => Err(MarshalError::mismatch(field, "a timestamp", other.kind())),
        }
    }
}

impl<V: FieldValue> FieldValue for Option<V> {
    fn local_type() -> LocalType {
        V::local_type()
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<Option<V>, MarshalError> {
        match value {
            Converted::Null => Ok(None),
            other => V::from_converted(other, field).map(Some),
        }
    }
}

impl<E: Entity> FieldValue for Vec<E> {
    fn local_type() -> LocalType {
        LocalType::Entity(E::descriptor())
    }

    fn from_converted(value: Converted, field: &'static str) -> Result<Vec<E>, MarshalError> {
        match value {
            Converted::Entity(boxed) => boxed
                .downcast::<Vec<E>>()
                .map(|entities| *entities)
                .map_err(|_| MarshalError::Mismatch {
                    field: field.to_string(),
                    expected: "a sequence of entities",
                    found: "a single entity".to_string(),
                }),
            other => Err(MarshalError::Mismatch {
                field: field.to_string(),
                expected: "a sequence of entities",
                found: other.kind().to_string(),
            }),
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __entity_remote_name {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident $remote:literal) => {
        $remote
    };
}

/// Declares an entity struct together with its field-mapping table.
///
/// Each field maps to the remote field of the same name; prefix a field with
/// `"remote_name" =>` to override the key. Supported field types are `i32`,
/// `i64`, `f64`, `bool`, `String`, `chrono::NaiveDateTime`, other `entity!`
/// types, `Vec`s of those entity types, and `Option`s of any of the above.
///
/// ```
/// sodaq::entity! {
///     /// A civic dataset row.
///     pub struct Permit {
///         "permit_no" => number: Option<String>,
///         status: Option<String>,
///         fee: Option<f64>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $($remote:literal =>)? $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $crate::entity::Entity for $name {
            const NAME: &'static str = stringify!($name);

            fn fields() -> Vec<$crate::entity::FieldSpec<Self>> {
                vec![
                    $(
                        $crate::entity::FieldSpec {
                            remote_name: $crate::__entity_remote_name!($field $($remote)?),
                            local_name: stringify!($field),
                            local_type: <$ty as $crate::entity::FieldValue>::local_type(),
                            assign: |model: &mut Self, value: $crate::entity::Converted| {
                                model.$field = <$ty as $crate::entity::FieldValue>::from_converted(
                                    value,
                                    $crate::__entity_remote_name!($field $($remote)?),
                                )?;
                                Ok(())
                            },
                        },
                    )*
                ]
            }
        }

        impl $crate::entity::FieldValue for $name {
            fn local_type() -> $crate::entity::LocalType {
                $crate::entity::LocalType::Entity(<Self as $crate::entity::Entity>::descriptor())
            }

            fn from_converted(
                value: $crate::entity::Converted,
                field: &'static str,
            ) -> Result<Self, $crate::MarshalError> {
                match value {
                    $crate::entity::Converted::Entity(boxed) => boxed
                        .downcast::<Self>()
                        .map(|entity| *entity)
                        .map_err(|_| $crate::MarshalError::Mismatch {
                            field: field.to_string(),
                            expected: stringify!($name),
                            found: "a different entity type".to_string(),
                        }),
                    other => Err($crate::MarshalError::Mismatch {
                        field: field.to_string(),
                        expected: stringify!($name),
                        found: other.kind().to_string(),
                    }),
                }
            }
        }
    };
}
