//! Typed publish/subscribe channel between the session and the front end.
//!
//! Emission is synchronous: every current listener for the event's kind runs,
//! in subscription order, before `emit` returns.

use std::fmt;

use crate::progress::QuestResults;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ShowDialog {
        npc_id: String,
        name: String,
        text: String,
    },
    ShowQuest {
        quest_id: String,
    },
    QuestCompleted {
        quest_id: String,
        score: u8,
        results: QuestResults,
    },
    LevelCompleted {
        level: u32,
    },
    LevelTransitionReady {
        level: u32,
    },
    TransitionToLevel {
        target_level: u32,
    },
    GamePaused,
    GameResumed,
    InputDisabled,
    InputEnabled,
    ProgressUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ShowDialog,
    ShowQuest,
    QuestCompleted,
    LevelCompleted,
    LevelTransitionReady,
    TransitionToLevel,
    GamePaused,
    GameResumed,
    InputDisabled,
    InputEnabled,
    ProgressUpdated,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ShowDialog { .. } => EventKind::ShowDialog,
            GameEvent::ShowQuest { .. } => EventKind::ShowQuest,
            GameEvent::QuestCompleted { .. } => EventKind::QuestCompleted,
            GameEvent::LevelCompleted { .. } => EventKind::LevelCompleted,
            GameEvent::LevelTransitionReady { .. } => EventKind::LevelTransitionReady,
            GameEvent::TransitionToLevel { .. } => EventKind::TransitionToLevel,
            GameEvent::GamePaused => EventKind::GamePaused,
            GameEvent::GameResumed => EventKind::GameResumed,
            GameEvent::InputDisabled => EventKind::InputDisabled,
            GameEvent::InputEnabled => EventKind::InputEnabled,
            GameEvent::ProgressUpdated => EventKind::ProgressUpdated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameEvent)>;

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    once: bool,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> SubscriptionId {
        self.add(kind, false, Box::new(listener))
    }

    /// The listener is dropped after its first delivery.
    pub fn subscribe_once(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + 'static,
    ) -> SubscriptionId {
        self.add(kind, true, Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Drops listeners for one kind, or all of them.
    pub fn clear(&mut self, kind: Option<EventKind>) {
        match kind {
            Some(kind) => self.subscribers.retain(|s| s.kind != kind),
            None => self.subscribers.clear(),
        }
    }

    /// Returns how many listeners received the event.
    pub fn emit(&mut self, event: &GameEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for sub in self.subscribers.iter_mut().filter(|s| s.kind == kind) {
            (sub.listener)(event);
            delivered += 1;
        }
        self.subscribers.retain(|s| !(s.once && s.kind == kind));
        delivered
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.subscribers.iter().filter(|s| s.kind == kind).count()
    }

    fn add(&mut self, kind: EventKind, once: bool, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            kind,
            once,
            listener,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(bus: &mut EventBus, kind: EventKind) -> (SubscriptionId, Rc<RefCell<Vec<GameEvent>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = bus.subscribe(kind, move |e| sink.borrow_mut().push(e.clone()));
        (id, seen)
    }

    #[test]
    fn fans_out_to_matching_listeners_only() {
        let mut bus = EventBus::new();
        let (_, paused_a) = recorder(&mut bus, EventKind::GamePaused);
        let (_, paused_b) = recorder(&mut bus, EventKind::GamePaused);
        let (_, resumed) = recorder(&mut bus, EventKind::GameResumed);

        assert_eq!(bus.emit(&GameEvent::GamePaused), 2);
        assert_eq!(paused_a.borrow().len(), 1);
        assert_eq!(paused_b.borrow().len(), 1);
        assert!(resumed.borrow().is_empty());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let (id, seen) = recorder(&mut bus, EventKind::ProgressUpdated);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.emit(&GameEvent::ProgressUpdated), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn once_listener_fires_a_single_time() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        bus.subscribe_once(EventKind::LevelCompleted, move |_| *c.borrow_mut() += 1);

        bus.emit(&GameEvent::LevelCompleted { level: 1 });
        bus.emit(&GameEvent::LevelCompleted { level: 2 });
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(EventKind::LevelCompleted), 0);
    }

    #[test]
    fn clear_by_kind_and_all() {
        let mut bus = EventBus::new();
        recorder(&mut bus, EventKind::InputEnabled);
        recorder(&mut bus, EventKind::InputDisabled);
        bus.clear(Some(EventKind::InputEnabled));
        assert_eq!(bus.listener_count(EventKind::InputEnabled), 0);
        assert_eq!(bus.listener_count(EventKind::InputDisabled), 1);
        bus.clear(None);
        assert_eq!(bus.listener_count(EventKind::InputDisabled), 0);
    }
}
