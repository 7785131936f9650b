//! Process-wide cache of derived schemas keyed by type identity

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use arri_protocol::{IndexMap, KeyCasing, TypeDef};
use parking_lot::RwLock;

use crate::context::TypeDefContext;
use crate::error::TypeDefError;
use crate::model::ArriModel;
use crate::shape::Shape;

/// Everything derived once for a model type
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSchema {
    pub type_def: TypeDef,
    /// Full definitions of types closed with a `ref` inside `type_def`
    pub definitions: IndexMap<String, TypeDef>,
    pub shape: Shape,
}

impl DerivedSchema {
    /// Derive without consulting the cache
    pub fn derive<T: ArriModel>(key_casing: KeyCasing) -> Result<Self, TypeDefError> {
        let mut ctx = TypeDefContext::new(key_casing);
        let type_def = T::type_def(&mut ctx)?;
        Ok(Self {
            type_def,
            definitions: ctx.into_definitions(),
            shape: T::shape(),
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.type_def.id()
    }
}

/// A concurrent map whose entries are computed outside the lock.
///
/// Concurrent misses for one key each compute a value; the first one
/// inserted is kept and returned to every caller.
#[derive(Debug)]
pub struct TypeCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> TypeCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let computed = compute()?;
        let mut entries = self.entries.write();
        Ok(entries.entry(key).or_insert(computed).clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K: Eq + Hash, V: Clone> Default for TypeCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

type SchemaKey = (TypeId, KeyCasing);

fn schemas() -> &'static TypeCache<SchemaKey, Arc<DerivedSchema>> {
    static SCHEMAS: OnceLock<TypeCache<SchemaKey, Arc<DerivedSchema>>> = OnceLock::new();
    SCHEMAS.get_or_init(TypeCache::new)
}

/// The schema of `T` under `key_casing`, derived on first use.
///
/// Derivation errors are not cached; every call for a broken type reports
/// the error again.
pub fn derived_schema<T: ArriModel + 'static>(
    key_casing: KeyCasing,
) -> Result<Arc<DerivedSchema>, TypeDefError> {
    schemas().get_or_try_insert_with((TypeId::of::<T>(), key_casing), || {
        tracing::debug!(
            type_name = type_name::<T>(),
            key_casing = %key_casing,
            "deriving schema"
        );
        DerivedSchema::derive::<T>(key_casing).map(Arc::new)
    })
}

/// Number of cached schemas
pub fn cached_schema_count() -> usize {
    schemas().len()
}
