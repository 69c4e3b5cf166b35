//! Per-instance reactive state and the change pipeline

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::commands::CommandRegistry;
use super::declare::{DeclarationError, Declarations};
use super::dependencies::{DependencyGraph, Dependent};
use super::notify::{Notification, NotificationBus, SubscriptionId};
use super::property::Property;
use super::snapshot::{Describe, PropertySnapshot};
use super::{PropertyKey, ViewModel};

/// Maximum nesting of dependency refreshes triggered from inside other refreshes
pub const MAX_REFRESH_DEPTH: usize = 32;

/// Reactive machinery embedded in every view-model
pub struct Reactor<V: ViewModel> {
    bus: NotificationBus<V::Key>,
    snapshot: PropertySnapshot<V::Key>,
    dependencies: DependencyGraph<V>,
    commands: CommandRegistry<V>,
    pub(crate) has_changes: Property<bool>,
    suspended: usize,
    refresh_depth: usize,
}

impl<V: ViewModel> Reactor<V> {
    /// Build the dependency graph and command registry from `V::declare`
    pub fn new() -> Result<Self, DeclarationError> {
        let mut declarations = Declarations::new();
        V::declare(&mut declarations);
        let (dependencies, commands) = declarations.build()?;

        tracing::trace!(
            "Reactor ready: {} dependency entries, {} commands",
            dependencies.len(),
            commands.len()
        );

        Ok(Self {
            bus: NotificationBus::new(),
            snapshot: PropertySnapshot::new(),
            dependencies,
            commands,
            has_changes: Property::new(),
            suspended: 0,
            refresh_depth: 0,
        })
    }

    pub fn subscribe(
        &mut self,
        observer: impl Fn(&Notification<V::Key>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn bus_mut(&mut self) -> &mut NotificationBus<V::Key> {
        &mut self.bus
    }

    /// Handle for concurrent readers of property values
    pub fn snapshot(&self) -> PropertySnapshot<V::Key> {
        self.snapshot.clone()
    }

    pub fn dependencies(&self) -> &DependencyGraph<V> {
        &self.dependencies
    }

    pub fn commands(&self) -> &CommandRegistry<V> {
        &self.commands
    }

    /// Whether dependency refresh is currently suspended
    pub fn is_suspended(&self) -> bool {
        self.suspended > 0
    }

    fn emit(&self, notification: Notification<V::Key>) {
        self.bus.emit(&notification);
    }

    fn signal_commands(&self) {
        for name in self.commands.names() {
            self.emit(Notification::CanExecuteChanged(name));
        }
    }
}

impl<V: ViewModel> fmt::Debug for Reactor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("dependencies", &self.dependencies)
            .field("commands", &self.commands)
            .field("suspended", &self.suspended)
            .finish_non_exhaustive()
    }
}

/// Guard that keeps dependency refresh suspended for as long as it lives.
///
/// Dereferences to the view-model, so writes go through the guard. Dropping
/// it (including during unwinding) lifts the suspension.
pub struct Suspended<'a, V: ViewModel> {
    view_model: &'a mut V,
}

impl<'a, V: ViewModel> Suspended<'a, V> {
    fn new(view_model: &'a mut V) -> Self {
        view_model.reactor_mut().suspended += 1;
        Self { view_model }
    }
}

impl<V: ViewModel> Deref for Suspended<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view_model
    }
}

impl<V: ViewModel> DerefMut for Suspended<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view_model
    }
}

impl<V: ViewModel> Drop for Suspended<'_, V> {
    fn drop(&mut self) {
        let reactor = self.view_model.reactor_mut();
        reactor.suspended = reactor.suspended.saturating_sub(1);
    }
}

/// One level of dependency refresh nesting, counted for as long as it lives
struct RefreshScope<'a, V: ViewModel> {
    view_model: &'a mut V,
}

impl<'a, V: ViewModel> RefreshScope<'a, V> {
    fn enter(view_model: &'a mut V) -> Self {
        view_model.reactor_mut().refresh_depth += 1;
        Self { view_model }
    }
}

impl<V: ViewModel> Deref for RefreshScope<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view_model
    }
}

impl<V: ViewModel> DerefMut for RefreshScope<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view_model
    }
}

impl<V: ViewModel> Drop for RefreshScope<'_, V> {
    fn drop(&mut self) {
        let reactor = self.view_model.reactor_mut();
        reactor.refresh_depth = reactor.refresh_depth.saturating_sub(1);
    }
}

/// Property store, dependency refresh and command operations for every
/// [`ViewModel`].
pub trait ViewModelExt: ViewModel {
    /// Change-aware write.
    ///
    /// Writing a value equal to the stored one does nothing. Otherwise the
    /// value is stored, observers are told, dependents are refreshed (unless
    /// suspended), every command's enablement is re-signaled and the
    /// has-changes flag is raised. Returns whether the value changed.
    fn set<T, F>(&mut self, key: Self::Key, field: F, value: T) -> bool
    where
        T: PartialEq + Describe,
        F: FnOnce(&mut Self) -> &mut Property<T>,
    {
        let slot = field(self);
        if !slot.replace(value) {
            tracing::trace!("Suppressed unchanged write to '{}'", key.name());
            return false;
        }
        let rendered = slot.get().map(Describe::describe).unwrap_or_default();
        self.reactor().snapshot.record(key, rendered);
        self.property_changed(key);
        true
    }

    /// Mutate a stored value in place, then run the change pipeline.
    fn modify<T, F, M>(&mut self, key: Self::Key, field: F, update: M)
    where
        T: Default + Describe,
        F: FnOnce(&mut Self) -> &mut Property<T>,
        M: FnOnce(&mut T),
    {
        let slot = field(self);
        let value = slot.get_or_insert_default();
        update(value);
        let rendered = value.describe();
        self.reactor().snapshot.record(key, rendered);
        self.property_changed(key);
    }

    /// Run the change pipeline for `key` without storing anything.
    fn property_changed(&mut self, key: Self::Key) {
        self.reactor().emit(Notification::PropertyChanged(key));
        if self.reactor().is_suspended() {
            tracing::trace!("Dependency refresh for '{}' suspended", key.name());
        } else {
            self.refresh_dependents(key);
        }
        self.reactor().signal_commands();
        if key != <Self::Key as PropertyKey>::HAS_CHANGES {
            self.set_has_changes(true);
        }
    }

    /// Refresh every member declared as depending on `changed`.
    ///
    /// Derived properties are re-signaled; recomputation methods run at once
    /// and their errors are logged and dropped.
    fn refresh_dependents(&mut self, changed: Self::Key) {
        let dependents: Vec<Dependent<Self>> =
            self.reactor().dependencies.dependents_of(changed).collect();
        if dependents.is_empty() {
            return;
        }

        if self.reactor().refresh_depth >= MAX_REFRESH_DEPTH {
            tracing::warn!(
                "Dependency refresh for '{}' skipped: nesting exceeds {}",
                changed.name(),
                MAX_REFRESH_DEPTH
            );
            return;
        }

        let mut scope = RefreshScope::enter(self);
        for dependent in dependents {
            match dependent {
                Dependent::Property(key) => {
                    scope.reactor().emit(Notification::PropertyChanged(key));
                }
                Dependent::Method { name, recompute } => {
                    if let Err(e) = recompute(&mut *scope) {
                        tracing::warn!(
                            "Recomputing '{}' after '{}' changed failed: {:#}",
                            name,
                            changed.name(),
                            e
                        );
                    }
                }
            }
        }
    }

    /// Suspend dependency refresh until the returned guard is dropped.
    fn suspend_dependencies(&mut self) -> Suspended<'_, Self> {
        Suspended::new(self)
    }

    /// Run `f` with dependency refresh suspended.
    fn without_dependency_refresh<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = self.suspend_dependencies();
        f(&mut guard)
    }

    /// Run the command `name`. Unknown names are ignored.
    fn invoke(&mut self, name: &str, parameter: Option<&Self::Param>) -> anyhow::Result<()> {
        let Some(action) = self.reactor().commands.get(name).map(|c| c.action()) else {
            tracing::debug!("Ignoring unknown command '{name}'");
            return Ok(());
        };
        action.run(self, parameter)
    }

    /// Whether the command `name` may run. Unknown names report `true`.
    fn can_invoke(&self, name: &str, parameter: Option<&Self::Param>) -> bool {
        match self.reactor().commands.get(name) {
            Some(command) => command.can_execute(self, parameter),
            None => true,
        }
    }

    /// Run the command only if it is enabled. Returns whether it ran.
    fn execute(&mut self, name: &str, parameter: Option<&Self::Param>) -> anyhow::Result<bool> {
        if !self.can_invoke(name, parameter) {
            tracing::debug!("Command '{name}' is disabled");
            return Ok(false);
        }
        self.invoke(name, parameter)?;
        Ok(true)
    }

    fn command_names(&self) -> Vec<&'static str> {
        self.reactor().commands.names().collect()
    }

    fn has_changes(&self) -> bool {
        self.reactor().has_changes.get_or_default()
    }

    fn set_has_changes(&mut self, value: bool) -> bool {
        self.set(
            <Self::Key as PropertyKey>::HAS_CHANGES,
            |vm| &mut vm.reactor_mut().has_changes,
            value,
        )
    }

    /// Clear the has-changes flag after the state was persisted
    fn mark_saved(&mut self) {
        self.set_has_changes(false);
    }

    fn subscribe(
        &mut self,
        observer: impl Fn(&Notification<Self::Key>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.reactor_mut().subscribe(observer)
    }
}

impl<V: ViewModel> ViewModelExt for V {}
