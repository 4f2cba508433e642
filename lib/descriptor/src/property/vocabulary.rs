//! Ordered, duplicate-free vocabularies learned from a corpus pass

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::hash::Hash;

/// Entries in first-occurrence order with O(1) reverse lookup
///
/// Serializes as a plain list; the index is rebuilt on load.
#[derive(Debug, Clone)]
pub struct Vocabulary<T> {
    entries: Vec<T>,
    index: AHashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> Vocabulary<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Build from entries, keeping the first occurrence of duplicates
    pub fn from_entries(entries: impl IntoIterator<Item = T>) -> Self {
        let mut vocabulary = Self::new();
        for entry in entries {
            vocabulary.insert(entry);
        }
        vocabulary
    }

    /// Insert if absent, returning the entry's position either way
    pub fn insert(&mut self, entry: T) -> usize {
        if let Some(&position) = self.index.get(&entry) {
            return position;
        }
        let position = self.entries.len();
        self.index.insert(entry.clone(), position);
        self.entries.push(entry);
        position
    }

    pub fn position<Q>(&self, entry: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(entry).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl<T> Vocabulary<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.entries.get(position)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

impl<T: Eq + Hash + Clone> Default for Vocabulary<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for Vocabulary<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T: Serialize> Serialize for Vocabulary<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Vocabulary<T>
where
    T: Deserialize<'de> + Eq + Hash + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from_entries)
    }
}
