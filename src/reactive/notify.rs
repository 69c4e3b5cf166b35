//! Change notifications delivered to the presentation layer

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::PropertyKey;

/// A single change signal emitted by a view-model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification<K> {
    /// The property (stored or derived) should be re-read
    PropertyChanged(K),
    /// The named command's enablement should be re-queried
    CanExecuteChanged(&'static str),
}

/// Handle returned by [`NotificationBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<K> = Box<dyn Fn(&Notification<K>) + Send + Sync>;

/// Observer list keyed by a view-model's property enumeration
pub struct NotificationBus<K> {
    observers: Vec<(SubscriptionId, Observer<K>)>,
    next_id: u64,
}

impl<K> Default for NotificationBus<K> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K> fmt::Debug for NotificationBus<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<K: PropertyKey> NotificationBus<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Observers run synchronously, in subscription order.
    pub fn subscribe(
        &mut self,
        observer: impl Fn(&Notification<K>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn emit(&self, notification: &Notification<K>) {
        for (_, observer) in &self.observers {
            observer(notification);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

/// Observer that records every notification it receives.
///
/// Handy for hosts that batch UI updates and for tests that count signals.
#[derive(Debug, Clone)]
pub struct NotificationLog<K> {
    entries: Arc<Mutex<Vec<Notification<K>>>>,
}

impl<K> Default for NotificationLog<K> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<K: PropertyKey> NotificationLog<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a recorder to `bus` and return the log it writes into
    pub fn attach(bus: &mut NotificationBus<K>) -> Self {
        let log = Self::new();
        let entries = Arc::clone(&log.entries);
        bus.subscribe(move |notification| {
            entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(*notification);
        });
        log
    }

    /// All notifications received so far, oldest first
    pub fn entries(&self) -> Vec<Notification<K>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<Notification<K>> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of `PropertyChanged` notifications for `key`
    pub fn property_changes(&self, key: K) -> usize {
        self.count(&Notification::PropertyChanged(key))
    }

    /// Number of `CanExecuteChanged` notifications for `command`
    pub fn command_signals(&self, command: &str) -> usize {
        self.entries()
            .iter()
            .filter(|n| matches!(n, Notification::CanExecuteChanged(name) if *name == command))
            .count()
    }

    pub fn count(&self, notification: &Notification<K>) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| *n == notification)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        HasChanges,
        Title,
    }

    impl PropertyKey for Key {
        const HAS_CHANGES: Self = Key::HasChanges;

        fn name(self) -> &'static str {
            match self {
                Key::HasChanges => "HasChanges",
                Key::Title => "Title",
            }
        }
    }

    #[test]
    fn test_observers_run_in_subscription_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = NotificationBus::<Key>::new();

        let first = Arc::clone(&order);
        bus.subscribe(move |_| first.lock().unwrap().push(1));
        let second = Arc::clone(&order);
        bus.subscribe(move |_| second.lock().unwrap().push(2));

        bus.emit(&Notification::PropertyChanged(Key::Title));
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = NotificationBus::<Key>::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.observer_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.observer_count(), 0);
    }

    #[test]
    fn test_log_counts() {
        let mut bus = NotificationBus::<Key>::new();
        let log = NotificationLog::attach(&mut bus);

        bus.emit(&Notification::PropertyChanged(Key::Title));
        bus.emit(&Notification::PropertyChanged(Key::Title));
        bus.emit(&Notification::PropertyChanged(Key::HasChanges));
        bus.emit(&Notification::CanExecuteChanged("Save"));

        assert_eq!(log.property_changes(Key::Title), 2);
        assert_eq!(log.property_changes(Key::HasChanges), 1);
        assert_eq!(log.command_signals("Save"), 1);
        assert_eq!(log.command_signals("Close"), 0);

        assert_eq!(log.take().len(), 4);
        assert!(log.is_empty());
    }
}
