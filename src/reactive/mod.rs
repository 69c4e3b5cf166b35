//! Dependency-tracked view-model core
//!
//! A view-model is a plain struct with one [`Property<T>`] field per stored
//! property and a [`Reactor`] that carries the rest of the machinery:
//!
//! - **Notification bus**: observers receive [`Notification`]s keyed by the
//!   view-model's property enumeration
//! - **Dependency graph**: derived properties and recomputation methods
//!   declared against the properties they read
//! - **Command registry**: named actions with optional can-execute predicates
//! - **Snapshot**: a [`PropertySnapshot`] other threads can read
//!
//! Every table is built once per instance from [`ViewModel::declare`]. Writes
//! go through [`ViewModelExt::set`], which suppresses unchanged values and
//! drives the rest of the pipeline.

use std::fmt;
use std::hash::Hash;

pub mod commands;
pub mod declare;
pub mod dependencies;
pub mod notify;
pub mod property;
pub mod reactor;
pub mod snapshot;

pub use commands::{Action, CommandDescriptor, CommandRegistry, Predicate};
pub use declare::{DeclarationError, Declarations};
pub use dependencies::{Dependent, DependencyGraph, RecomputeFn};
pub use notify::{Notification, NotificationBus, NotificationLog, SubscriptionId};
pub use property::Property;
pub use reactor::{MAX_REFRESH_DEPTH, Reactor, Suspended, ViewModelExt};
pub use snapshot::{Describe, PropertySnapshot};

/// Closed enumeration of a view-model's properties
pub trait PropertyKey: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// The key of the built-in has-unsaved-changes flag
    const HAS_CHANGES: Self;

    /// Display name, used in logs and snapshots
    fn name(self) -> &'static str;
}

/// A stateful object exposing observable, derived and actionable state
pub trait ViewModel: Sized + 'static {
    type Key: PropertyKey;
    /// Parameter type accepted by this view-model's commands
    type Param: ?Sized;

    /// Register dependencies and commands for this type
    fn declare(declarations: &mut Declarations<Self>);

    fn reactor(&self) -> &Reactor<Self>;

    fn reactor_mut(&mut self) -> &mut Reactor<Self>;
}
