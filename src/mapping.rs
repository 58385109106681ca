//! The field mapping resolver and its process-wide cache.
//!
//! Building a type's mapping walks its declared field specs, which is cheap
//! here but mirrors a contract where field discovery is expensive: the table
//! is computed once per type, cached for the process lifetime keyed by type
//! identity, and never invalidated. Concurrent first-population attempts for
//! the same type each compute an equivalent table; the first stored one wins
//! and the others discard their redundant computation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::entity::{Entity, EntityDescriptor, FieldSpec};
use crate::error::MarshalError;

/// The per-type table from remote field name to field spec.
pub type FieldMapping<T> = HashMap<&'static str, FieldSpec<T>>;

type CacheMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static MAPPINGS: OnceLock<RwLock<CacheMap>> = OnceLock::new();

fn cache() -> &'static RwLock<CacheMap> {
    MAPPINGS.get_or_init(RwLock::default)
}

/// Returns the process-wide field mapping for `T`, computing and caching it
/// on first use.
///
/// Fails with [`MarshalError::CyclicEntity`] if `T` transitively embeds
/// itself; the check runs before the mapping is stored, so a cyclic type
/// never populates the cache.
pub fn mapping_for<T: Entity>() -> Result<Arc<FieldMapping<T>>, MarshalError> {
    let id = TypeId::of::<T>();
    if let Some(stored) = cache().read().expect("mapping cache poisoned").get(&id) {
        return Ok(downcast::<T>(stored));
    }

    verify_acyclic::<T>()?;
    let table: FieldMapping<T> = T::fields()
        .into_iter()
        .map(|spec| (spec.remote_name, spec))
        .collect();
    let computed: Arc<dyn Any + Send + Sync> = Arc::new(table);

    let mut guard = cache().write().expect("mapping cache poisoned");
    let stored = guard.entry(id).or_insert(computed);
    Ok(downcast::<T>(stored))
}

fn downcast<T: Entity>(stored: &Arc<dyn Any + Send + Sync>) -> Arc<FieldMapping<T>> {
    stored
        .clone()
        .downcast::<FieldMapping<T>>()
        .expect("mapping cache holds a foreign type for this type id")
}

/// Rejects entity graphs where a type transitively embeds itself.
fn verify_acyclic<T: Entity>() -> Result<(), MarshalError> {
    let root = T::descriptor();
    let mut path = vec![root.type_id()];
    walk(root.name(), root.embedded(), &mut path)
}

fn walk(
    owner: &'static str,
    children: Vec<EntityDescriptor>,
    path: &mut Vec<TypeId>,
) -> Result<(), MarshalError> {
    for child in children {
        if path.contains(&child.type_id()) {
            return Err(MarshalError::CyclicEntity {
                entity: owner,
                embedded: child.name(),
            });
        }
        path.push(child.type_id());
        walk(child.name(), child.embedded(), path)?;
        path.pop();
    }
    Ok(())
}
