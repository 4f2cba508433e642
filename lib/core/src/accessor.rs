//! Named member access over records and string-keyed maps
//!
//! [`Record`] is the one read/write surface every feature encoder goes
//! through. Maps resolve names through their own indexer; structured records
//! resolve a name to a member slot once per type and reuse it afterwards via
//! the process-wide [`resolve_member`] cache.

use crate::{Error, Result, Value};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::OnceLock;

/// Anything a descriptor can read features from and write predictions to
pub trait Record {
    fn get(&self, name: &str) -> Result<Value>;
    fn set(&mut self, name: &str, value: Value) -> Result<()>;
}

fn missing(name: &str) -> Error {
    Error::MissingMember {
        member: name.to_string(),
    }
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn get(&self, name: &str) -> Result<Value> {
        HashMap::get(self, name).cloned().ok_or_else(|| missing(name))
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}

impl Record for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Result<Value> {
        BTreeMap::get(self, name).cloned().ok_or_else(|| missing(name))
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn get(&self, name: &str) -> Result<Value> {
        serde_json::Map::get(self, name)
            .cloned()
            .map(Value::from)
            .ok_or_else(|| missing(name))
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name.to_string(), value.to_json());
        Ok(())
    }
}

impl Record for serde_json::Value {
    fn get(&self, name: &str) -> Result<Value> {
        match self {
            serde_json::Value::Object(map) => Record::get(map, name),
            _ => Err(missing(name)),
        }
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match self {
            serde_json::Value::Object(map) => Record::set(map, name, value),
            _ => Err(missing(name)),
        }
    }
}

type MemberCache = RwLock<AHashMap<TypeId, AHashMap<String, Option<usize>>>>;

static MEMBER_CACHE: OnceLock<MemberCache> = OnceLock::new();

fn member_cache() -> &'static MemberCache {
    MEMBER_CACHE.get_or_init(|| RwLock::new(AHashMap::new()))
}

/// Resolve `name` to a member slot of `T`, memoized per (type, name)
///
/// `find` runs at most once per pair for the life of the process; misses are
/// cached too. Safe to call from any number of threads.
pub fn resolve_member<T: 'static>(name: &str, find: impl FnOnce() -> Option<usize>) -> Option<usize> {
    let type_id = TypeId::of::<T>();
    if let Some(slot) = member_cache()
        .read()
        .get(&type_id)
        .and_then(|members| members.get(name))
    {
        return *slot;
    }

    let mut cache = member_cache().write();
    let members = cache.entry(type_id).or_default();
    *members.entry(name.to_string()).or_insert_with(find)
}
