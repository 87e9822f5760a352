//! Outstanding effect requests.

use futures::channel::oneshot;
use serde_json::Value;

use crate::effect::Effect;

struct PendingEffect {
    effect: Effect,
    resolve: oneshot::Sender<Value>,
}

/// What happened when a pending effect was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// The waiting storyline received the value.
    Delivered,
    /// The entry matched, but its waiter was already gone.
    Orphaned,
}

/// Pending effects in insertion order.
pub(crate) struct EffectQueue {
    pending: Vec<PendingEffect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, effect: Effect) -> oneshot::Receiver<Value> {
        let (resolve, rx) = oneshot::channel();
        self.pending.push(PendingEffect { effect, resolve });
        rx
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.pending.iter().map(|p| p.effect.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether any pending effect still has a storyline awaiting it.
    pub fn has_waiters(&self) -> bool {
        self.pending.iter().any(|p| !p.resolve.is_canceled())
    }

    /// Drop every pending effect, failing whoever still awaits one.
    /// Returns how many were dropped.
    pub fn abandon_all(&mut self) -> usize {
        let abandoned = self.pending.len();
        self.pending.clear();
        abandoned
    }

    /// Resolve the first pending effect structurally equal to `effect`.
    ///
    /// Returns `None`, leaving the queue untouched, when nothing matches.
    pub fn resolve(&mut self, effect: &Effect, value: Value) -> Option<Delivery> {
        let index = self.pending.iter().position(|p| &p.effect == effect)?;
        let entry = self.pending.remove(index);
        Some(match entry.resolve.send(value) {
            Ok(()) => Delivery::Delivered,
            Err(_) => Delivery::Orphaned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Handle;
    use serde_json::json;

    #[test]
    fn preserves_insertion_order() {
        let ask = Handle::new("ask");
        let tell = Handle::new("tell");
        let mut queue = EffectQueue::new();
        let _a = queue.push(Effect::io(&tell).arg(1));
        let _b = queue.push(Effect::io(&ask));

        assert_eq!(queue.effects(), vec![Effect::io(&tell).arg(1), Effect::io(&ask)]);
    }

    #[test]
    fn resolves_structural_match() {
        let ask = Handle::new("ask");
        let mut queue = EffectQueue::new();
        let mut rx = queue.push(Effect::io(&ask).arg("x"));

        let delivery = queue.resolve(&Effect::io(&ask).arg("x"), json!(10));
        assert_eq!(delivery, Some(Delivery::Delivered));
        assert!(queue.is_empty());
        assert_eq!(rx.try_recv().unwrap(), Some(json!(10)));
    }

    #[test]
    fn no_match_leaves_queue_unchanged() {
        let ask = Handle::new("ask");
        let mut queue = EffectQueue::new();
        let _rx = queue.push(Effect::io(&ask).arg("x"));

        assert_eq!(queue.resolve(&Effect::io(&ask).arg("y"), json!(1)), None);
        assert_eq!(queue.resolve(&Effect::io(&Handle::new("ask")).arg("x"), json!(1)), None);
        assert_eq!(queue.effects(), vec![Effect::io(&ask).arg("x")]);
    }

    #[test]
    fn duplicates_resolve_first_in_first() {
        let ask = Handle::new("ask");
        let mut queue = EffectQueue::new();
        let mut first = queue.push(Effect::io(&ask));
        let mut second = queue.push(Effect::io(&ask));

        queue.resolve(&Effect::io(&ask), json!("one"));
        assert_eq!(queue.len(), 1);
        assert_eq!(first.try_recv().unwrap(), Some(json!("one")));
        assert_eq!(second.try_recv().unwrap(), None);

        queue.resolve(&Effect::io(&ask), json!("two"));
        assert!(queue.is_empty());
        assert_eq!(second.try_recv().unwrap(), Some(json!("two")));
    }

    #[test]
    fn dropped_waiters_do_not_count_as_waiting() {
        let ask = Handle::new("ask");
        let mut queue = EffectQueue::new();
        assert!(!queue.has_waiters());

        drop(queue.push(Effect::io(&ask)));
        assert!(!queue.is_empty());
        assert!(!queue.has_waiters());

        let _live = queue.push(Effect::io(&ask).arg(1));
        assert!(queue.has_waiters());
    }

    #[test]
    fn abandoning_fails_the_waiters() {
        let ask = Handle::new("ask");
        let mut queue = EffectQueue::new();
        let mut rx = queue.push(Effect::io(&ask));

        assert_eq!(queue.abandon_all(), 1);
        assert!(queue.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_waiter_is_orphaned_but_removed() {
        let ask = Handle::new("ask");
        let mut queue = EffectQueue::new();
        drop(queue.push(Effect::io(&ask)));

        assert_eq!(queue.resolve(&Effect::io(&ask), json!(1)), Some(Delivery::Orphaned));
        assert!(queue.is_empty());
    }
}
