use foundation::handles::Handle;
use foundation::time::Time;

use crate::frame::Frame;

/// Opaque, revocable handle to a pending timer or tick.
///
/// Slots are recycled, but every reuse bumps the handle generation, so a
/// handle kept after its entry fired or was cancelled never matches a newer
/// entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(Handle);

impl TimerId {
    pub fn handle(&self) -> Handle {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Due {
    /// One-shot timer, fires on the first frame whose time reaches it.
    At(Time),
    /// Next-frame tick, fires on exactly this frame index.
    Frame(u64),
}

#[derive(Debug)]
struct Entry<T> {
    due: Due,
    order: u64,
    payload: T,
}

impl<T> Entry<T> {
    fn is_due(&self, frame: Frame) -> bool {
        match self.due {
            Due::At(t) => t <= frame.time,
            Due::Frame(index) => index <= frame.index,
        }
    }

    fn due_ms(&self, frame: Frame) -> u64 {
        match self.due {
            Due::At(t) => t.as_ms(),
            Due::Frame(_) => frame.time.as_ms(),
        }
    }
}

#[derive(Debug)]
struct Slot<T> {
    handle: Handle,
    entry: Option<Entry<T>>,
}

/// An entry removed from the scheduler because it came due.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub frame: Frame,
    pub payload: T,
}

/// Deterministic timer and tick scheduler for a single cooperative timeline.
///
/// Nothing runs on its own: the owner calls [`Scheduler::advance_frame`] once
/// per frame and dispatches the returned entries. Key properties:
/// - Fired entries come back ordered by `(due time, insertion order)`.
/// - An entry is removed before it is returned, so it fires at most once.
/// - Cancelling is O(1) and never disturbs the order of other entries.
#[derive(Debug)]
pub struct Scheduler<T> {
    frame: Frame,
    next_order: u64,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Scheduler<T> {
    pub fn new(frame_ms: u64) -> Self {
        Self {
            frame: Frame::new(0, frame_ms.max(1)),
            next_order: 0,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// The most recently started frame.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn now(&self) -> Time {
        self.frame.time
    }

    /// Schedules `payload` to fire once `delay_ms` has elapsed on the timeline.
    pub fn schedule_after(&mut self, delay_ms: u64, payload: T) -> TimerId {
        let due = Due::At(self.frame.time.after(delay_ms));
        self.insert(due, payload)
    }

    /// Schedules `payload` for the next frame only. Callers that want a loop
    /// re-schedule from their handler.
    pub fn schedule_tick(&mut self, payload: T) -> TimerId {
        let due = Due::Frame(self.frame.index + 1);
        self.insert(due, payload)
    }

    /// Revokes a pending entry. Returns `false` if it already fired, was
    /// already cancelled, or the handle is stale.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let index = id.0.index();
        let Some(slot) = self.slots.get_mut(index as usize) else {
            return false;
        };
        if slot.handle != id.0 || slot.entry.take().is_none() {
            return false;
        }
        self.free.push(index);
        true
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots
            .get(id.0.index() as usize)
            .is_some_and(|slot| slot.handle == id.0 && slot.entry.is_some())
    }

    pub fn pending_len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Starts the next frame and returns every entry that came due.
    pub fn advance_frame(&mut self) -> Vec<Fired<T>> {
        self.frame = self.frame.next();
        let frame = self.frame;

        let mut due: Vec<(u64, u64, usize)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                let entry = slot.entry.as_ref()?;
                entry
                    .is_due(frame)
                    .then(|| (entry.due_ms(frame), entry.order, idx))
            })
            .collect();
        due.sort_unstable_by_key(|&(due_ms, order, _)| (due_ms, order));

        let mut fired = Vec::with_capacity(due.len());
        for (_, _, idx) in due {
            let slot = &mut self.slots[idx];
            if let Some(entry) = slot.entry.take() {
                self.free.push(idx as u32);
                fired.push(Fired {
                    id: TimerId(slot.handle),
                    frame,
                    payload: entry.payload,
                });
            }
        }
        fired
    }

    fn insert(&mut self, due: Due, payload: T) -> TimerId {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        let entry = Entry {
            due,
            order,
            payload,
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.handle = slot.handle.next_generation();
            slot.entry = Some(entry);
            return TimerId(slot.handle);
        }

        let handle = Handle::new(self.slots.len() as u32, 0);
        self.slots.push(Slot {
            handle,
            entry: Some(entry),
        });
        TimerId(handle)
    }
}
