//! Column event subscriptions and the pending-event outbox.
//!
//! Columns announce renames and length changes to whoever registered an
//! interest. Delivery is pull-based: emission enqueues one pending event per
//! matching subscription, and each subscriber drains its own queue when it is
//! next able to react. Copied columns start with a fresh, empty hub.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity handle for a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// A fresh process-unique id.
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Renamed,
    Resized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnEvent {
    Renamed { from: String, to: String },
    Resized(usize),
}

impl ColumnEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ColumnEvent::Renamed { .. } => EventKind::Renamed,
            ColumnEvent::Resized(_) => EventKind::Resized,
        }
    }
}

/// A delivered event together with the context string the subscription was
/// registered under, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub context: Option<String>,
    pub event: ColumnEvent,
}

#[derive(Debug, Clone, PartialEq)]
struct Subscription {
    kind: EventKind,
    subscriber: SubscriberId,
    context: Option<String>,
}

/// Per-column subscription registry plus pending deliveries.
#[derive(Debug, Clone, Default)]
pub struct SignalHub {
    subscriptions: Vec<Subscription>,
    pending: Vec<(SubscriberId, Delivery)>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interest. Registering the identical
    /// (kind, subscriber, context) triple twice is a no-op.
    pub fn connect(&mut self, kind: EventKind, subscriber: SubscriberId, context: Option<String>) {
        let sub = Subscription {
            kind,
            subscriber,
            context,
        };
        if !self.subscriptions.contains(&sub) {
            self.subscriptions.push(sub);
        }
    }

    /// Remove every subscription this subscriber holds for `kind`,
    /// discarding any of its undelivered events of that kind.
    pub fn disconnect(&mut self, kind: EventKind, subscriber: SubscriberId) {
        self.subscriptions
            .retain(|s| !(s.kind == kind && s.subscriber == subscriber));
        self.pending
            .retain(|(id, d)| !(*id == subscriber && d.event.kind() == kind));
    }

    /// Enqueue one delivery per matching subscription.
    pub fn emit(&mut self, event: ColumnEvent) {
        let kind = event.kind();
        for sub in &self.subscriptions {
            if sub.kind == kind {
                self.pending.push((
                    sub.subscriber,
                    Delivery {
                        context: sub.context.clone(),
                        event: event.clone(),
                    },
                ));
            }
        }
    }

    /// Take every pending delivery addressed to `subscriber`, in emission
    /// order.
    pub fn drain(&mut self, subscriber: SubscriberId) -> Vec<Delivery> {
        let mut taken = Vec::new();
        let mut kept = Vec::new();
        for (id, delivery) in self.pending.drain(..) {
            if id == subscriber {
                taken.push(delivery);
            } else {
                kept.push((id, delivery));
            }
        }
        self.pending = kept;
        taken
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_ids_are_unique() {
        let a = SubscriberId::next();
        let b = SubscriberId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn emit_reaches_matching_subscribers_only() {
        let mut hub = SignalHub::new();
        let renames = SubscriberId::next();
        let resizes = SubscriberId::next();
        hub.connect(EventKind::Renamed, renames, None);
        hub.connect(EventKind::Resized, resizes, None);

        hub.emit(ColumnEvent::Renamed {
            from: "Close".into(),
            to: "AdjClose".into(),
        });

        assert_eq!(hub.drain(renames).len(), 1);
        assert!(hub.drain(resizes).is_empty());
    }

    #[test]
    fn duplicate_connect_is_a_no_op() {
        let mut hub = SignalHub::new();
        let id = SubscriberId::next();
        hub.connect(EventKind::Resized, id, None);
        hub.connect(EventKind::Resized, id, None);

        hub.emit(ColumnEvent::Resized(3));
        assert_eq!(hub.drain(id).len(), 1);
    }

    #[test]
    fn distinct_contexts_each_get_a_delivery() {
        let mut hub = SignalHub::new();
        let id = SubscriberId::next();
        hub.connect(EventKind::Resized, id, Some("left".into()));
        hub.connect(EventKind::Resized, id, Some("right".into()));

        hub.emit(ColumnEvent::Resized(10));
        let deliveries = hub.drain(id);
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].context.as_deref(), Some("left"));
        assert_eq!(deliveries[1].context.as_deref(), Some("right"));
    }

    #[test]
    fn disconnect_stops_delivery_and_drops_pending() {
        let mut hub = SignalHub::new();
        let id = SubscriberId::next();
        hub.connect(EventKind::Resized, id, None);
        hub.emit(ColumnEvent::Resized(1));

        hub.disconnect(EventKind::Resized, id);
        hub.emit(ColumnEvent::Resized(2));
        assert!(hub.drain(id).is_empty());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn drain_preserves_emission_order() {
        let mut hub = SignalHub::new();
        let id = SubscriberId::next();
        hub.connect(EventKind::Resized, id, None);
        hub.emit(ColumnEvent::Resized(1));
        hub.emit(ColumnEvent::Resized(2));

        let deliveries = hub.drain(id);
        assert_eq!(deliveries[0].event, ColumnEvent::Resized(1));
        assert_eq!(deliveries[1].event, ColumnEvent::Resized(2));
    }

    #[test]
    fn drain_leaves_other_subscribers_pending() {
        let mut hub = SignalHub::new();
        let a = SubscriberId::next();
        let b = SubscriberId::next();
        hub.connect(EventKind::Resized, a, None);
        hub.connect(EventKind::Resized, b, None);
        hub.emit(ColumnEvent::Resized(4));

        assert_eq!(hub.drain(a).len(), 1);
        assert_eq!(hub.drain(b).len(), 1);
    }
}
