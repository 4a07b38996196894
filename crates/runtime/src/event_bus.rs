use std::collections::VecDeque;

use foundation::time::Time;

use crate::frame::Frame;

/// A single trace record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub time: Time,
    pub kind: &'static str,
    pub message: String,
}

/// Ordered trace of what happened on the timeline.
///
/// With a capacity limit the bus keeps only the newest events and counts the
/// ones it had to drop, so a long-running session cannot grow it unbounded.
#[derive(Debug, Default)]
pub struct EventBus {
    events: VecDeque<Event>,
    capacity: Option<usize>,
    dropped: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity: Some(capacity.max(1)),
            dropped: 0,
        }
    }

    pub fn emit(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        if let Some(cap) = self.capacity {
            while self.events.len() >= cap {
                self.events.pop_front();
                self.dropped += 1;
            }
        }
        self.events.push_back(Event {
            frame_index: frame.index,
            time: frame.time,
            kind,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.back()
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Number of events evicted by the capacity limit.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
