//! Per-type registration of dependencies and commands

use thiserror::Error;

use super::{PropertyKey, ViewModel};
use super::commands::{Action, CommandRegistry, Predicate};
use super::dependencies::{DependencyEntry, DependencyGraph, Dependent, RecomputeFn};

/// Invalid static declarations on a view-model type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("'{0}' is declared as depending on itself")]
    SelfDependency(&'static str),
    #[error("dependent '{0}' declares no sources")]
    NoSources(&'static str),
    #[error("command '{0}' is registered more than once")]
    DuplicateCommand(&'static str),
}

/// Collects a view-model type's declarations.
///
/// Passed to [`ViewModel::declare`] once per constructed instance; the
/// resulting tables are immutable afterwards.
pub struct Declarations<V: ViewModel> {
    dependencies: Vec<DependencyEntry<V>>,
    commands: Vec<(&'static str, Action<V>)>,
    predicates: Vec<(&'static str, Predicate<V>)>,
}

impl<V: ViewModel> Default for Declarations<V> {
    fn default() -> Self {
        Self {
            dependencies: Vec::new(),
            commands: Vec::new(),
            predicates: Vec::new(),
        }
    }
}

impl<V: ViewModel> Declarations<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that the derived property `dependent` must be re-read whenever
    /// any of `sources` changes.
    pub fn depends_on(
        &mut self,
        dependent: V::Key,
        sources: impl IntoIterator<Item = V::Key>,
    ) -> &mut Self {
        self.push_dependency(Dependent::Property(dependent), sources);
        self
    }

    /// Declare that `recompute` must run whenever any of `sources` changes.
    pub fn method_depends_on(
        &mut self,
        name: &'static str,
        recompute: RecomputeFn<V>,
        sources: impl IntoIterator<Item = V::Key>,
    ) -> &mut Self {
        self.push_dependency(Dependent::Method { name, recompute }, sources);
        self
    }

    pub fn command(&mut self, name: &'static str, action: Action<V>) -> &mut Self {
        self.commands.push((name, action));
        self
    }

    /// Attach an enablement predicate to the command `name`
    pub fn can_execute(&mut self, name: &'static str, predicate: Predicate<V>) -> &mut Self {
        self.predicates.push((name, predicate));
        self
    }

    fn push_dependency(&mut self, dependent: Dependent<V>, sources: impl IntoIterator<Item = V::Key>) {
        let mut unique = Vec::new();
        for source in sources {
            if !unique.contains(&source) {
                unique.push(source);
            }
        }
        self.dependencies.push(DependencyEntry {
            dependent,
            sources: unique,
        });
    }

    pub(crate) fn build(self) -> Result<(DependencyGraph<V>, CommandRegistry<V>), DeclarationError> {
        for entry in &self.dependencies {
            if entry.sources.is_empty() {
                return Err(DeclarationError::NoSources(entry.dependent.name()));
            }
            if let Dependent::Property(key) = entry.dependent
                && entry.sources.contains(&key)
            {
                return Err(DeclarationError::SelfDependency(key.name()));
            }
        }

        let mut commands = CommandRegistry::new();
        for (name, action) in self.commands {
            if !commands.insert(name, action) {
                return Err(DeclarationError::DuplicateCommand(name));
            }
        }
        for (name, predicate) in self.predicates {
            if !commands.attach_predicate(name, predicate) {
                tracing::debug!("Ignoring can-execute predicate for unknown command '{name}'");
            }
        }

        Ok((DependencyGraph::from_entries(self.dependencies), commands))
    }
}
