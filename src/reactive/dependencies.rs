//! Declared dependencies between view-model members
//!
//! The graph is an adjacency list in declaration order. It is deliberately
//! not transitive: a change to `S` refreshes the members registered against
//! `S` and nothing further, even if one of them is itself a source of another
//! entry.

use std::fmt;

use super::{PropertyKey, ViewModel};

/// Zero-argument recomputation run when one of its sources changes
pub type RecomputeFn<V> = fn(&mut V) -> anyhow::Result<()>;

/// Member that is refreshed when a source changes
pub enum Dependent<V: ViewModel> {
    /// Derived property: consumers get a change notification and re-read it
    Property(V::Key),
    /// Recomputation method, invoked immediately
    Method {
        name: &'static str,
        recompute: RecomputeFn<V>,
    },
}

impl<V: ViewModel> Clone for Dependent<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: ViewModel> Copy for Dependent<V> {}

impl<V: ViewModel> Dependent<V> {
    pub fn name(&self) -> &'static str {
        match self {
            Dependent::Property(key) => key.name(),
            Dependent::Method { name, .. } => *name,
        }
    }
}

impl<V: ViewModel> fmt::Debug for Dependent<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependent::Property(key) => f.debug_tuple("Property").field(key).finish(),
            Dependent::Method { name, .. } => f.debug_tuple("Method").field(name).finish(),
        }
    }
}

pub(crate) struct DependencyEntry<V: ViewModel> {
    pub(crate) dependent: Dependent<V>,
    pub(crate) sources: Vec<V::Key>,
}

/// Immutable dependency graph built from a view-model type's declarations
pub struct DependencyGraph<V: ViewModel> {
    entries: Vec<DependencyEntry<V>>,
}

impl<V: ViewModel> DependencyGraph<V> {
    pub(crate) fn from_entries(entries: Vec<DependencyEntry<V>>) -> Self {
        Self { entries }
    }

    /// Members to refresh when `changed` changes, in declaration order
    pub fn dependents_of(&self, changed: V::Key) -> impl Iterator<Item = Dependent<V>> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.sources.contains(&changed))
            .map(|entry| entry.dependent)
    }

    /// Sources declared for the dependent named `name`
    pub fn sources_of(&self, name: &str) -> Option<&[V::Key]> {
        self.entries
            .iter()
            .find(|entry| entry.dependent.name() == name)
            .map(|entry| entry.sources.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: ViewModel> fmt::Debug for DependencyGraph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (entry.dependent.name(), &entry.sources)),
            )
            .finish()
    }
}
