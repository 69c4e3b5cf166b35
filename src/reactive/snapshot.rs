//! Concurrently readable mirror of view-model property values
//!
//! View-models are mutated from a single thread. A background worker that
//! wants to list properties for display reads this mirror instead, which is
//! backed by a [`DashMap`] and can be cloned across threads freely.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;

use super::PropertyKey;

/// Text rendering of a property value for display and diagnostics
pub trait Describe {
    fn describe(&self) -> String;
}

macro_rules! describe_with_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

describe_with_display!(String, bool, char, u8, u16, u32, u64, usize, i32, i64, f64);

impl Describe for &'static str {
    fn describe(&self) -> String {
        (*self).to_string()
    }
}

impl Describe for PathBuf {
    fn describe(&self) -> String {
        self.display().to_string()
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe(&self) -> String {
        match self {
            Some(value) => value.describe(),
            None => "null".to_string(),
        }
    }
}

impl<T> Describe for Vec<T> {
    fn describe(&self) -> String {
        format!("[{} items]", self.len())
    }
}

/// Shared handle to the rendered value of every written property
#[derive(Debug)]
pub struct PropertySnapshot<K: PropertyKey> {
    entries: Arc<DashMap<K, String>>,
}

impl<K: PropertyKey> Clone for PropertySnapshot<K> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: PropertyKey> Default for PropertySnapshot<K> {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl<K: PropertyKey> PropertySnapshot<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, key: K, rendered: String) {
        self.entries.insert(key, rendered);
    }

    /// Rendered value of `key`, if it has been written
    pub fn get(&self, key: K) -> Option<String> {
        self.entries.get(&key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// All recorded properties, ordered by property name
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.key().name(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
