//! Type-keyed event bus with weakly held receivers
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Registration system (only notify interested receivers)
//! - The bus never keeps a receiver alive; dead receivers are purged lazily

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::foundation::math::Vec2;
use crate::scene::EntityId;

/// Variant for type-safe event arguments
/// Uses key-value pairs to avoid order dependency problems
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Entity reference
    Entity(EntityId),
    /// Position coordinates
    Position(Vec2),
    /// Numeric value
    Number(f64),
    /// Free-form text
    Text(String),
    /// Boolean flag
    Flag(bool),
}

/// Event with a string type tag and key-value arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Entity that raised the event, if any
    pub sender: Option<EntityId>,
    /// Type tag receivers register for
    pub event_type: String,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given type
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            sender: None,
            event_type: event_type.into(),
            args: HashMap::new(),
        }
    }

    /// Set the sender (builder pattern)
    pub fn from_entity(mut self, sender: EntityId) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get an entity argument if present
    pub fn get_entity(&self, key: &str) -> Option<EntityId> {
        if let Some(EventArg::Entity(id)) = self.get_arg(key) {
            Some(*id)
        } else {
            None
        }
    }

    /// Get a position argument if present
    pub fn get_position(&self, key: &str) -> Option<Vec2> {
        if let Some(EventArg::Position(p)) = self.get_arg(key) {
            Some(*p)
        } else {
            None
        }
    }

    /// Get a numeric argument if present
    pub fn get_number(&self, key: &str) -> Option<f64> {
        if let Some(EventArg::Number(n)) = self.get_arg(key) {
            Some(*n)
        } else {
            None
        }
    }
}

/// Something that reacts to broadcast events
pub trait EventReceiver {
    /// Handle a delivered event
    fn receive_event(&mut self, event: &Event);
}

/// Strong handle owned by whoever keeps a receiver alive
pub type SharedReceiver = Rc<RefCell<dyn EventReceiver>>;

type WeakReceiver = Weak<RefCell<dyn EventReceiver>>;

/// Broadcast hub mapping event types to weakly held receivers
#[derive(Default)]
pub struct EventBus {
    receivers: HashMap<String, Vec<WeakReceiver>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `receiver` for `event_type`
    ///
    /// Returns `false` when the pair is already registered. Dead entries in
    /// the bucket are purged on the way.
    pub fn register(&mut self, receiver: &SharedReceiver, event_type: &str) -> bool {
        let target = Rc::downgrade(receiver);
        let bucket = self.receivers.entry(event_type.to_owned()).or_default();

        let before = bucket.len();
        bucket.retain(|weak| weak.strong_count() > 0);
        if bucket.len() != before {
            log::debug!("Purged {} dead receivers for '{event_type}'", before - bucket.len());
        }

        if bucket.iter().any(|weak| weak.ptr_eq(&target)) {
            return false;
        }
        bucket.push(target);
        true
    }

    /// Remove `receiver` from `event_type`; returns whether it was registered
    pub fn unregister(&mut self, receiver: &SharedReceiver, event_type: &str) -> bool {
        let target = Rc::downgrade(receiver);
        let Some(bucket) = self.receivers.get_mut(event_type) else {
            return false;
        };

        let before = bucket.len();
        bucket.retain(|weak| weak.strong_count() > 0 && !weak.ptr_eq(&target));
        let removed = bucket.len() != before;

        if bucket.is_empty() {
            self.receivers.remove(event_type);
        }
        removed
    }

    /// Remove `receiver` from every event type; returns the number of
    /// registrations dropped
    pub fn unregister_all(&mut self, receiver: &SharedReceiver) -> usize {
        let target = Rc::downgrade(receiver);
        let mut removed = 0;

        for bucket in self.receivers.values_mut() {
            let before = bucket.len();
            bucket.retain(|weak| !weak.ptr_eq(&target));
            removed += before - bucket.len();
        }
        self.receivers.retain(|_, bucket| !bucket.is_empty());
        removed
    }

    /// Deliver `event` to every live receiver registered for its type
    ///
    /// Receivers are snapshotted before delivery, so the count returned is
    /// stable for this call. Dead references and empty buckets are cleaned
    /// up after the delivery loop.
    pub fn broadcast(&mut self, event: &Event) -> usize {
        let Some(bucket) = self.receivers.get(&event.event_type) else {
            return 0;
        };

        let live: Vec<SharedReceiver> = bucket.iter().filter_map(Weak::upgrade).collect();
        let found_dead = live.len() != bucket.len();

        let mut delivered = 0;
        for receiver in &live {
            match receiver.try_borrow_mut() {
                Ok(mut receiver) => {
                    receiver.receive_event(event);
                    delivered += 1;
                }
                Err(_) => log::warn!("Receiver busy, skipping '{}'", event.event_type),
            }
        }

        if found_dead {
            self.purge(&event.event_type);
        }
        delivered
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.receivers.clear();
    }

    /// Number of entries (live or not) registered for a type
    pub fn bucket_len(&self, event_type: &str) -> Option<usize> {
        self.receivers.get(event_type).map(Vec::len)
    }

    /// Number of event types with at least one registration
    pub fn event_type_count(&self) -> usize {
        self.receivers.len()
    }

    fn purge(&mut self, event_type: &str) {
        let Some(bucket) = self.receivers.get_mut(event_type) else {
            return;
        };

        let before = bucket.len();
        bucket.retain(|weak| weak.strong_count() > 0);
        log::debug!("Purged {} dead receivers for '{event_type}'", before - bucket.len());

        if bucket.is_empty() {
            self.receivers.remove(event_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestReceiver {
        events_received: Vec<String>,
    }

    impl EventReceiver for TestReceiver {
        fn receive_event(&mut self, event: &Event) {
            self.events_received.push(event.event_type.clone());
        }
    }

    fn receiver() -> (Rc<RefCell<TestReceiver>>, SharedReceiver) {
        let concrete = Rc::new(RefCell::new(TestReceiver::default()));
        let shared: SharedReceiver = concrete.clone();
        (concrete, shared)
    }

    #[test]
    fn test_delivery_to_registered_type_only() {
        let mut bus = EventBus::new();
        let (concrete, shared) = receiver();
        bus.register(&shared, "hit");

        assert_eq!(bus.broadcast(&Event::new("hit")), 1);
        assert_eq!(bus.broadcast(&Event::new("other")), 0);
        assert_eq!(concrete.borrow().events_received, vec!["hit".to_owned()]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut bus = EventBus::new();
        let (concrete, shared) = receiver();

        assert!(bus.register(&shared, "hit"));
        assert!(!bus.register(&shared, "hit"));
        bus.broadcast(&Event::new("hit"));

        assert_eq!(concrete.borrow().events_received.len(), 1);
        assert_eq!(bus.bucket_len("hit"), Some(1));
    }

    #[test]
    fn test_dead_receiver_is_purged() {
        let mut bus = EventBus::new();
        let (concrete, shared) = receiver();
        bus.register(&shared, "X");

        assert_eq!(bus.broadcast(&Event::new("X")), 1);
        assert_eq!(concrete.borrow().events_received.len(), 1);

        drop(shared);
        drop(concrete);

        assert_eq!(bus.broadcast(&Event::new("X")), 0);
        assert_eq!(bus.bucket_len("X"), None);
    }

    #[test]
    fn test_unregister() {
        let mut bus = EventBus::new();
        let (concrete, shared) = receiver();
        let (_other, other_shared) = receiver();
        bus.register(&shared, "a");
        bus.register(&shared, "b");
        bus.register(&other_shared, "b");

        assert!(bus.unregister(&shared, "a"));
        assert!(!bus.unregister(&shared, "a"));
        assert_eq!(bus.bucket_len("a"), None);

        assert_eq!(bus.unregister_all(&shared), 1);
        assert_eq!(bus.broadcast(&Event::new("b")), 1);
        assert!(concrete.borrow().events_received.is_empty());
    }

    #[test]
    fn test_event_arguments() {
        let mut scene = crate::scene::SceneGraph::new();
        let id = scene.spawn(crate::scene::EntityBuilder::new());
        let event = Event::new("collide")
            .from_entity(id)
            .with_arg("other", EventArg::Entity(id))
            .with_arg("at", EventArg::Position(Vec2::new(1.0, 2.0)))
            .with_arg("damage", EventArg::Number(3.5));

        assert_eq!(event.sender, Some(id));
        assert_eq!(event.get_entity("other"), Some(id));
        assert_eq!(event.get_position("at"), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(event.get_number("damage"), Some(3.5));
        assert_eq!(event.get_number("missing"), None);
    }
}
