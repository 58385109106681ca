pub mod datatypes;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod marshal;
pub mod registry;
pub mod soql;

pub use datatypes::{Document, GeoBox, Location, Phone, Url};
pub use entity::{Converted, Entity, EntityDescriptor, FieldSpec, FieldValue, LocalType, LocalTypeKey};
pub use error::MarshalError;
pub use mapping::{mapping_for, FieldMapping};
pub use marshal::{field_types_from_headers, Marshaller};
pub use registry::{Converter, TypeRegistry, UNKNOWN_TYPE};
pub use soql::{Build, Clause, ClauseKind, Expression, OrderDirection, Query};
