//! The World's bounded event log (§3, §4.7): operator-injected events that
//! reach agents as `world_event`/`user_event` perceptions within a short
//! freshness window.

use std::collections::VecDeque;

use bdi_core::{AgentId, Tick};

/// `user_event` if targeted at specific agents, `world_event` if broadcast
/// (§6 `inject_event`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    UserEvent,
    WorldEvent,
}

/// One entry in the event log.
#[derive(Clone, Debug)]
pub struct WorldEvent {
    pub id: u64,
    pub kind: EventKind,
    pub description: String,
    /// Empty means broadcast to every registered agent.
    pub audience: Vec<AgentId>,
    pub created_at: Tick,
}

impl WorldEvent {
    pub fn targets(&self, agent: AgentId) -> bool {
        self.audience.is_empty() || self.audience.contains(&agent)
    }
}

/// Bounded ring buffer of events (§3: "a bounded ring of at most
/// `event_log_capacity` operator-injected events").
pub struct EventLog {
    entries: VecDeque<WorldEvent>,
    capacity: usize,
    next_id: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            next_id: 0,
        }
    }

    /// `inject_event` (§6). Appends an entry, evicting the oldest if at
    /// capacity. Returns the assigned id.
    pub fn push(&mut self, description: impl Into<String>, audience: Vec<AgentId>, now: Tick) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let kind = if audience.is_empty() {
            EventKind::WorldEvent
        } else {
            EventKind::UserEvent
        };
        if self.entries.len() >= self.capacity.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(WorldEvent {
            id,
            kind,
            description: description.into(),
            audience,
            created_at: now,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries younger than `window_ticks`, scanning from the tail — the
    /// most recently appended event first — matching §4.7's "scan from
    /// tail" perception rule. The scan stops at the first entry that falls
    /// outside the window since entries are stored in creation order.
    pub fn recent(&self, now: Tick, window_ticks: u64) -> impl Iterator<Item = &WorldEvent> {
        self.entries
            .iter()
            .rev()
            .take_while(move |e| now.since(e.created_at) < window_ticks)
    }
}
