//! Camera choreography while a trip plan is being generated.
//!
//! The controller is an explicit state machine:
//!
//! ```text
//!  Idle --start--> ZoomingOut --zoom_out_ms--> Rotating
//!   ^                  |                          |
//!   |                 stop                       stop
//!   |                  v                          v
//!   +--return_ms-- ReturningToIdle <--------------+
//! ```
//!
//! It never runs on its own. Generation changes come in through
//! [`ViewAnimationController::on_generation_changed`], scheduler entries
//! through [`ViewAnimationController::on_signal`]. At most one scheduler entry
//! is pending at any time, and every transition cancels it before scheduling
//! the next, so a late entry can never restart a loop that was stopped.

use foundation::geo::normalize_bearing;
use map_view::{CameraView, MapSurface};
use runtime::{EventBus, Fired, Frame, Scheduler, TimerId};
use tracing::{debug, info, trace};

use crate::config::AnimationConfig;

const TRACE_CAPACITY: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum AnimationPhase {
    #[default]
    Idle,
    ZoomingOut,
    Rotating,
    ReturningToIdle,
}

/// Payload of the scheduler entries the controller owns.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AnimationSignal {
    ZoomOutComplete,
    RotationTick,
    ReturnComplete,
}

/// Camera snapshot taken when a sequence leaves Idle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SavedViewState {
    pub view: CameraView,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Pending {
    None,
    ZoomOut(TimerId),
    Rotation(TimerId),
    Return(TimerId),
}

impl Pending {
    fn id(self) -> Option<TimerId> {
        match self {
            Pending::None => None,
            Pending::ZoomOut(id) | Pending::Rotation(id) | Pending::Return(id) => Some(id),
        }
    }

    fn expects(self, id: TimerId, signal: AnimationSignal) -> bool {
        match (self, signal) {
            (Pending::ZoomOut(p), AnimationSignal::ZoomOutComplete)
            | (Pending::Rotation(p), AnimationSignal::RotationTick)
            | (Pending::Return(p), AnimationSignal::ReturnComplete) => p == id,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct ViewAnimationController<M> {
    config: AnimationConfig,
    phase: AnimationPhase,
    saved: Option<SavedViewState>,
    bearing: f64,
    rotation_ticks: u64,
    pending: Pending,
    map: Option<M>,
    trace: EventBus,
}

impl<M: MapSurface> ViewAnimationController<M> {
    /// A controller with no map attached. It still tracks phases and timers.
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            phase: AnimationPhase::Idle,
            saved: None,
            bearing: 0.0,
            rotation_ticks: 0,
            pending: Pending::None,
            map: None,
            trace: EventBus::with_capacity_limit(TRACE_CAPACITY),
        }
    }

    pub fn with_map(config: AnimationConfig, map: M) -> Self {
        let mut controller = Self::new(config);
        controller.map = Some(map);
        controller
    }

    /// Attaches a map, returning the previously attached one.
    pub fn attach_map(&mut self, map: M) -> Option<M> {
        self.map.replace(map)
    }

    pub fn detach_map(&mut self) -> Option<M> {
        self.map.take()
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut M> {
        self.map.as_mut()
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn saved_view(&self) -> Option<&SavedViewState> {
        self.saved.as_ref()
    }

    /// Bearing applied by the rotation, in `[0, 360)`. Zero outside Rotating
    /// until the first tick.
    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    /// Rotation ticks applied in the current (or last) cycle.
    pub fn rotation_ticks(&self) -> u64 {
        self.rotation_ticks
    }

    /// The one scheduler entry the controller is waiting on, if any.
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending.id()
    }

    pub fn trace(&self) -> &EventBus {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut EventBus {
        &mut self.trace
    }

    /// Reacts to the generation flag. Calls that do not change anything for
    /// the current phase are ignored, which makes repeated starts idempotent.
    pub fn on_generation_changed(
        &mut self,
        generating: bool,
        sched: &mut Scheduler<AnimationSignal>,
    ) {
        match (generating, self.phase) {
            (true, AnimationPhase::Idle) => {
                self.saved = self.map.as_ref().map(|m| SavedViewState { view: m.camera() });
                self.begin_zoom_out(sched);
            }
            // The cycle never reached Idle, so the original snapshot stays.
            (true, AnimationPhase::ReturningToIdle) => self.begin_zoom_out(sched),
            (false, AnimationPhase::ZoomingOut) | (false, AnimationPhase::Rotating) => {
                self.begin_return(sched)
            }
            _ => {
                trace!(generating, phase = ?self.phase, "generation change ignored");
            }
        }
    }

    /// Applies a fired scheduler entry. Entries the controller is no longer
    /// waiting on are dropped; returns whether the entry was applied.
    pub fn on_signal(
        &mut self,
        fired: &Fired<AnimationSignal>,
        sched: &mut Scheduler<AnimationSignal>,
    ) -> bool {
        if !self.pending.expects(fired.id, fired.payload) {
            debug!(signal = ?fired.payload, phase = ?self.phase, "dropping stale animation signal");
            self.trace.emit(
                fired.frame,
                "stale_signal",
                format!("{:?} dropped in {:?}", fired.payload, self.phase),
            );
            return false;
        }
        self.pending = Pending::None;

        match fired.payload {
            AnimationSignal::ZoomOutComplete => self.begin_rotation(sched),
            AnimationSignal::RotationTick => self.rotate_step(sched),
            AnimationSignal::ReturnComplete => self.enter_idle(fired.frame),
        }
        true
    }

    /// Ends any sequence immediately: cancels what is pending, snaps the
    /// camera back with zero bearing and shows markers.
    pub fn reset(&mut self, sched: &mut Scheduler<AnimationSignal>) {
        self.cancel_pending(sched);
        if self.phase != AnimationPhase::Idle {
            self.enter_idle(sched.frame());
        }
    }

    fn begin_zoom_out(&mut self, sched: &mut Scheduler<AnimationSignal>) {
        self.cancel_pending(sched);
        self.bearing = 0.0;
        self.rotation_ticks = 0;

        let global = CameraView::new(self.config.global_center, self.config.global_zoom, 0.0);
        if let Some(map) = self.map.as_mut() {
            map.set_camera(global, self.config.zoom_out_ms);
        }
        let id = sched.schedule_after(self.config.zoom_out_ms, AnimationSignal::ZoomOutComplete);
        self.pending = Pending::ZoomOut(id);
        self.set_phase(AnimationPhase::ZoomingOut, sched.frame());
    }

    fn begin_rotation(&mut self, sched: &mut Scheduler<AnimationSignal>) {
        if let Some(map) = self.map.as_mut() {
            map.set_markers_visible(false);
        }
        self.pending = Pending::Rotation(sched.schedule_tick(AnimationSignal::RotationTick));
        self.set_phase(AnimationPhase::Rotating, sched.frame());
    }

    fn rotate_step(&mut self, sched: &mut Scheduler<AnimationSignal>) {
        self.rotation_ticks += 1;
        // Derived from the tick count so long rotations do not accumulate drift.
        self.bearing = normalize_bearing(self.rotation_ticks as f64 * self.config.rotation_step_deg);
        if let Some(map) = self.map.as_mut() {
            let view = map.camera().with_bearing(self.bearing);
            map.set_camera(view, 0);
        }
        self.pending = Pending::Rotation(sched.schedule_tick(AnimationSignal::RotationTick));
    }

    fn begin_return(&mut self, sched: &mut Scheduler<AnimationSignal>) {
        self.cancel_pending(sched);
        if let (Some(map), Some(saved)) = (self.map.as_mut(), self.saved) {
            map.set_camera(saved.view.with_bearing(0.0), self.config.return_ms);
        }
        let id = sched.schedule_after(self.config.return_ms, AnimationSignal::ReturnComplete);
        self.pending = Pending::Return(id);
        self.set_phase(AnimationPhase::ReturningToIdle, sched.frame());
    }

    fn enter_idle(&mut self, frame: Frame) {
        if let Some(map) = self.map.as_mut() {
            let target = match self.saved {
                Some(saved) => saved.view.with_bearing(0.0),
                None => map.camera().with_bearing(0.0),
            };
            if map.camera() != target {
                map.set_camera(target, 0);
            }
            map.set_markers_visible(true);
        }
        self.saved = None;
        self.bearing = 0.0;
        self.set_phase(AnimationPhase::Idle, frame);
    }

    fn cancel_pending(&mut self, sched: &mut Scheduler<AnimationSignal>) {
        if let Some(id) = self.pending.id() {
            sched.cancel(id);
        }
        self.pending = Pending::None;
    }

    fn set_phase(&mut self, to: AnimationPhase, frame: Frame) {
        let from = self.phase;
        self.phase = to;
        info!(?from, ?to, frame = frame.index, "animation phase changed");
        self.trace.emit(frame, "phase", format!("{from:?} -> {to:?}"));
    }
}
