//! Command registry
//!
//! Each view-model type registers its commands once, by name, as a pair of
//! function pointers: the action and an optional can-execute predicate. The
//! pointers receive the view-model at invocation time, so they always act on
//! current state.

use std::fmt;

use hashbrown::HashMap;

use super::ViewModel;

/// The work a command performs
pub enum Action<V: ViewModel> {
    /// Action that ignores the command parameter
    Plain(fn(&mut V) -> anyhow::Result<()>),
    /// Action that receives the command parameter
    WithParameter(fn(&mut V, Option<&V::Param>) -> anyhow::Result<()>),
}

impl<V: ViewModel> Clone for Action<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: ViewModel> Copy for Action<V> {}

impl<V: ViewModel> Action<V> {
    pub(crate) fn run(self, view_model: &mut V, parameter: Option<&V::Param>) -> anyhow::Result<()> {
        match self {
            Action::Plain(action) => action(view_model),
            Action::WithParameter(action) => action(view_model, parameter),
        }
    }
}

/// Enablement check for a command
pub enum Predicate<V: ViewModel> {
    Plain(fn(&V) -> anyhow::Result<bool>),
    WithParameter(fn(&V, Option<&V::Param>) -> anyhow::Result<bool>),
}

impl<V: ViewModel> Clone for Predicate<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: ViewModel> Copy for Predicate<V> {}

impl<V: ViewModel> Predicate<V> {
    fn evaluate(self, view_model: &V, parameter: Option<&V::Param>) -> anyhow::Result<bool> {
        match self {
            Predicate::Plain(predicate) => predicate(view_model),
            Predicate::WithParameter(predicate) => predicate(view_model, parameter),
        }
    }
}

/// A registered command
pub struct CommandDescriptor<V: ViewModel> {
    name: &'static str,
    action: Action<V>,
    can_execute: Option<Predicate<V>>,
}

impl<V: ViewModel> CommandDescriptor<V> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn action(&self) -> Action<V> {
        self.action
    }

    pub fn has_predicate(&self) -> bool {
        self.can_execute.is_some()
    }

    /// Evaluate the predicate. Missing predicates and failing predicates both
    /// report the command as enabled.
    pub fn can_execute(&self, view_model: &V, parameter: Option<&V::Param>) -> bool {
        let Some(predicate) = self.can_execute else {
            return true;
        };
        match predicate.evaluate(view_model, parameter) {
            Ok(enabled) => enabled,
            Err(e) => {
                tracing::debug!(
                    "can-execute check for '{}' failed, treating as enabled: {:#}",
                    self.name,
                    e
                );
                true
            }
        }
    }
}

impl<V: ViewModel> fmt::Debug for CommandDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("has_predicate", &self.has_predicate())
            .finish()
    }
}

/// All commands of one view-model type, in registration order
pub struct CommandRegistry<V: ViewModel> {
    descriptors: Vec<CommandDescriptor<V>>,
    by_name: HashMap<&'static str, usize>,
}

impl<V: ViewModel> CommandRegistry<V> {
    pub(crate) fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Add a command. Returns `false` if the name is already taken.
    pub(crate) fn insert(&mut self, name: &'static str, action: Action<V>) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(name, self.descriptors.len());
        self.descriptors.push(CommandDescriptor {
            name,
            action,
            can_execute: None,
        });
        true
    }

    /// Attach a predicate to an existing command. Returns `false` if there is
    /// no command of that name.
    pub(crate) fn attach_predicate(&mut self, name: &str, predicate: Predicate<V>) -> bool {
        match self.by_name.get(name) {
            Some(&index) => {
                self.descriptors[index].can_execute = Some(predicate);
                true
            }
            None => false,
        }
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor<V>> {
        self.by_name.get(name).map(|&index| &self.descriptors[index])
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|descriptor| descriptor.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor<V>> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<V: ViewModel> fmt::Debug for CommandRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.descriptors.iter()).finish()
    }
}
