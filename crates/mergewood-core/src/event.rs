//! Typed event system with pre-allocated ring buffers.
//!
//! Gameplay operations emit events; presentation layers (renderer, audio,
//! dialogue) poll and drain them after each host call. The core never calls
//! out into UI code, so it stays headless and testable.
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any allocation or recording for that kind. Suppressed events have zero
//! cost.

use crate::fixed::Millis;
use crate::id::{AreaId, ChainId, ProducerId, SpecialKind};
use crate::item::Item;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A gameplay event. All events carry the host time at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Production --
    Produced {
        producer: ProducerId,
        index: usize,
        chain: ChainId,
        level: u8,
        at: Millis,
    },

    // -- Board --
    Merged {
        index: usize,
        chain: ChainId,
        level: u8,
        at: Millis,
    },
    Moved {
        from: usize,
        to: usize,
        at: Millis,
    },
    Sold {
        item: Item,
        coins: u64,
        at: Millis,
    },
    CobwebUnlocked {
        row: usize,
        col: usize,
        at: Millis,
    },
    BubbleSpawned {
        index: usize,
        chain: ChainId,
        at: Millis,
    },
    BubblePopped {
        index: usize,
        coins: u64,
        at: Millis,
    },

    // -- Progression --
    OrderCompleted {
        slot: usize,
        coins: u64,
        stars: u64,
        at: Millis,
    },
    HighTierBonus {
        level: u8,
        coins: u64,
        at: Millis,
    },
    SpecialUsed {
        kind: SpecialKind,
        at: Millis,
    },
    AreaUnlocked {
        area: AreaId,
        at: Millis,
    },
    ProducerUnlocked {
        producer: ProducerId,
        at: Millis,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Produced,
    Merged,
    Moved,
    Sold,
    CobwebUnlocked,
    BubbleSpawned,
    BubblePopped,
    OrderCompleted,
    HighTierBonus,
    SpecialUsed,
    AreaUnlocked,
    ProducerUnlocked,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 12;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Produced { .. } => EventKind::Produced,
            Event::Merged { .. } => EventKind::Merged,
            Event::Moved { .. } => EventKind::Moved,
            Event::Sold { .. } => EventKind::Sold,
            Event::CobwebUnlocked { .. } => EventKind::CobwebUnlocked,
            Event::BubbleSpawned { .. } => EventKind::BubbleSpawned,
            Event::BubblePopped { .. } => EventKind::BubblePopped,
            Event::OrderCompleted { .. } => EventKind::OrderCompleted,
            Event::HighTierBonus { .. } => EventKind::HighTierBonus,
            Event::SpecialUsed { .. } => EventKind::SpecialUsed,
            Event::AreaUnlocked { .. } => EventKind::AreaUnlocked,
            Event::ProducerUnlocked { .. } => EventKind::ProducerUnlocked,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer — pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events written since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over events in order from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let capacity = self.capacity();
        let start = if self.len < capacity {
            0
        } else {
            // head is the next write position, i.e. the oldest entry.
            self.head
        };
        (0..self.len).filter_map(move |i| self.events[(start + i) % capacity].as_ref())
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// One ring buffer per event kind, plus suppression flags.
///
/// The host drains after each call; anything left over simply ages out of
/// the ring.
#[derive(Debug)]
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    default_capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity per kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            default_capacity,
        }
    }

    /// Suppress an event kind. Suppressed events are never buffered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    /// Re-enable a suppressed event kind.
    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event into its kind's ring buffer.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Events of one kind, oldest first.
    pub fn iter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.buffers[kind.index()]
            .as_ref()
            .into_iter()
            .flat_map(|b| b.iter())
    }

    /// Remove and return all buffered events of one kind, oldest first.
    pub fn drain_kind(&mut self, kind: EventKind) -> Vec<Event> {
        match self.buffers[kind.index()].as_mut() {
            Some(buffer) => {
                let events: Vec<Event> = buffer.iter().cloned().collect();
                buffer.clear();
                events
            }
            None => Vec::new(),
        }
    }

    /// Remove and return every buffered event, grouped by kind in
    /// declaration order, oldest first within a kind.
    pub fn drain_all(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        for buffer in self.buffers.iter_mut().flatten() {
            out.extend(buffer.iter().cloned());
            buffer.clear();
        }
        out
    }

    /// Total events ever written for a kind (including dropped).
    pub fn total_written(&self, kind: EventKind) -> u64 {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.total_written())
            .unwrap_or(0)
    }

    /// Drop every buffered event.
    pub fn clear(&mut self) {
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.clear();
        }
    }
}
