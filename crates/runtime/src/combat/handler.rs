//! Registry mapping trigger types to subscribed combat events.

use std::collections::HashMap;
use std::sync::Arc;

use game_core::{CombatEventTriggerType, PriorityOrder};
use tracing::{debug, trace};

use super::{CombatEvent, CombatEventId};

/// Priority-ordered subscriptions of combat events, scoped to one session.
///
/// An event appears at most once per trigger type. Fire-once events are
/// removed as part of dispatch, before their sequence starts running.
#[derive(Debug, Default)]
pub struct CombatEventHandler {
    order: PriorityOrder,
    subscriptions: HashMap<CombatEventTriggerType, Vec<Arc<CombatEvent>>>,
}

impl CombatEventHandler {
    pub fn new(order: PriorityOrder) -> Self {
        Self {
            order,
            subscriptions: HashMap::new(),
        }
    }

    pub fn priority_order(&self) -> PriorityOrder {
        self.order
    }

    /// Subscribes `event` to `trigger`.
    ///
    /// The event is placed after every subscriber it does not precede, so
    /// equal priorities keep subscription order. Returns false if the event
    /// was already subscribed to this trigger.
    pub fn subscribe(&mut self, event: Arc<CombatEvent>, trigger: CombatEventTriggerType) -> bool {
        let order = self.order;
        let subscribers = self.subscriptions.entry(trigger).or_default();
        if subscribers.iter().any(|existing| existing.id == event.id) {
            trace!(target: "runtime::combat", event = %event.id, %trigger, "Already subscribed");
            return false;
        }

        let position = subscribers
            .iter()
            .position(|existing| order.precedes(event.priority, existing.priority))
            .unwrap_or(subscribers.len());
        debug!(
            target: "runtime::combat",
            event = %event.id,
            %trigger,
            priority = event.priority,
            position,
            "Combat event subscribed"
        );
        subscribers.insert(position, event);
        true
    }

    /// Subscribes `event` to its own trigger type.
    pub fn subscribe_event(&mut self, event: Arc<CombatEvent>) -> bool {
        let trigger = event.trigger;
        self.subscribe(event, trigger)
    }

    /// Removes `id` from `trigger`. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: CombatEventId, trigger: CombatEventTriggerType) -> bool {
        let Some(subscribers) = self.subscriptions.get_mut(&trigger) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|event| event.id != id);
        let removed = subscribers.len() < before;
        if subscribers.is_empty() {
            self.subscriptions.remove(&trigger);
        }
        if removed {
            debug!(target: "runtime::combat", event = %id, %trigger, "Combat event unsubscribed");
        }
        removed
    }

    /// Returns the events to fire for `trigger`, in priority order.
    ///
    /// The result is a snapshot; fire-once events in it have already been
    /// unsubscribed.
    pub fn dispatch(&mut self, trigger: CombatEventTriggerType) -> Vec<Arc<CombatEvent>> {
        let snapshot = self.subscribers(trigger);
        for event in snapshot.iter().filter(|event| event.triggers_once) {
            self.unsubscribe(event.id, trigger);
        }
        debug!(
            target: "runtime::combat",
            %trigger,
            fired = snapshot.len(),
            "Combat trigger dispatched"
        );
        snapshot
    }

    /// Current subscribers of `trigger`, in firing order.
    pub fn subscribers(&self, trigger: CombatEventTriggerType) -> Vec<Arc<CombatEvent>> {
        self.subscriptions
            .get(&trigger)
            .map(|subscribers| subscribers.to_vec())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, id: CombatEventId, trigger: CombatEventTriggerType) -> bool {
        self.subscriptions
            .get(&trigger)
            .is_some_and(|subscribers| subscribers.iter().any(|event| event.id == id))
    }

    /// Total number of subscriptions across all triggers.
    pub fn len(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::EventSequence;
    use CombatEventTriggerType::*;

    fn event(id: u32, priority: i32) -> Arc<CombatEvent> {
        Arc::new(
            CombatEvent::new(CombatEventId(id), UnitDefeated, EventSequence::new(format!("e{id}")))
                .with_priority(priority),
        )
    }

    fn ids(events: &[Arc<CombatEvent>]) -> Vec<u32> {
        events.iter().map(|event| event.id.0).collect()
    }

    #[test]
    fn dispatch_orders_by_ascending_priority() {
        let mut handler = CombatEventHandler::default();
        handler.subscribe(event(3, 3), UnitDefeated);
        handler.subscribe(event(1, 1), UnitDefeated);
        handler.subscribe(event(2, 2), UnitDefeated);

        assert_eq!(ids(&handler.dispatch(UnitDefeated)), vec![1, 2, 3]);
    }

    #[test]
    fn equal_priorities_keep_subscription_order() {
        let mut handler = CombatEventHandler::default();
        handler.subscribe(event(10, 0), TurnStart);
        handler.subscribe(event(11, 0), TurnStart);
        handler.subscribe(event(12, -1), TurnStart);
        handler.subscribe(event(13, 0), TurnStart);

        assert_eq!(ids(&handler.dispatch(TurnStart)), vec![12, 10, 11, 13]);
    }

    #[test]
    fn highest_first_reverses_priorities_but_not_ties() {
        let mut handler = CombatEventHandler::new(PriorityOrder::HighestFirst);
        handler.subscribe(event(1, 1), RoundEnd);
        handler.subscribe(event(2, 5), RoundEnd);
        handler.subscribe(event(3, 1), RoundEnd);

        assert_eq!(ids(&handler.dispatch(RoundEnd)), vec![2, 1, 3]);
    }

    #[test]
    fn duplicate_subscription_is_ignored() {
        let mut handler = CombatEventHandler::default();
        let first = event(1, 0);
        assert!(handler.subscribe(Arc::clone(&first), UnitDefeated));
        assert!(!handler.subscribe(first, UnitDefeated));
        assert_eq!(handler.len(), 1);
    }

    #[test]
    fn same_event_may_listen_to_several_triggers() {
        let mut handler = CombatEventHandler::default();
        let shared = event(1, 0);
        handler.subscribe(Arc::clone(&shared), UnitDefeated);
        handler.subscribe(shared, RoundEnd);

        assert!(handler.unsubscribe(CombatEventId(1), UnitDefeated));
        assert!(handler.is_subscribed(CombatEventId(1), RoundEnd));
    }

    #[test]
    fn fire_once_events_fire_a_single_time() {
        let mut handler = CombatEventHandler::default();
        handler.subscribe(
            Arc::new(
                CombatEvent::new(CombatEventId(1), UnitDefeated, EventSequence::new("once")).once(),
            ),
            UnitDefeated,
        );
        handler.subscribe(event(2, 0), UnitDefeated);

        assert_eq!(ids(&handler.dispatch(UnitDefeated)), vec![1, 2]);
        assert_eq!(ids(&handler.dispatch(UnitDefeated)), vec![2]);
    }

    #[test]
    fn unsubscribed_before_dispatch_never_fires() {
        let mut handler = CombatEventHandler::default();
        handler.subscribe(event(1, 0), UnitDefeated);
        handler.subscribe(event(2, 0), UnitDefeated);
        assert!(handler.unsubscribe(CombatEventId(1), UnitDefeated));
        assert!(!handler.unsubscribe(CombatEventId(1), UnitDefeated));

        assert_eq!(ids(&handler.dispatch(UnitDefeated)), vec![2]);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let mut handler = CombatEventHandler::default();
        handler.subscribe(event(1, 0), UnitDefeated);
        handler.subscribe(event(2, 1), UnitDefeated);

        let fired = handler.dispatch(UnitDefeated);
        handler.unsubscribe(CombatEventId(2), UnitDefeated);
        handler.subscribe(event(3, -5), UnitDefeated);

        assert_eq!(ids(&fired), vec![1, 2]);
        assert_eq!(ids(&handler.dispatch(UnitDefeated)), vec![3, 1]);
    }

    #[test]
    fn empty_trigger_dispatches_nothing() {
        let mut handler = CombatEventHandler::default();
        assert!(handler.dispatch(CombatEnd).is_empty());
        assert!(handler.is_empty());
    }
}
