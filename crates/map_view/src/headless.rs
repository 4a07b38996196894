//! In-process map used when no renderer is attached.
//!
//! `HeadlessMap` keeps a camera, a marker set, and at most one fly-to flight.
//! Flights ease in and out, move the center along the short way around the
//! antimeridian and turn the bearing along the shorter arc. Every command is
//! appended to a bounded log so callers can inspect what the map was asked to
//! do; once full, the oldest entries are evicted and counted.

use std::collections::VecDeque;

use foundation::geo::{LngLat, normalize_bearing, shortest_bearing_delta};
use tracing::trace;

use crate::camera::CameraView;
use crate::marker::{Marker, Visibility};
use crate::surface::MapSurface;

/// Default number of commands kept in the log.
pub const DEFAULT_COMMAND_CAPACITY: usize = 1024;

/// A command received through [`MapSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    FlyTo { view: CameraView, duration_ms: u64 },
    JumpTo(CameraView),
    SetMarkersVisible(bool),
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    from: CameraView,
    to: CameraView,
    duration_ms: u64,
    elapsed_ms: u64,
}

impl Flight {
    fn sample(&self) -> CameraView {
        let t = if self.duration_ms == 0 {
            1.0
        } else {
            (self.elapsed_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        };
        let e = ease_in_out(t);
        let turn = shortest_bearing_delta(self.from.bearing, self.to.bearing);
        let bearing = self.from.bearing + turn * e;
        CameraView::new(
            self.from.center.lerp(self.to.center, e),
            self.from.zoom + (self.to.zoom - self.from.zoom) * e,
            normalize_bearing(bearing),
        )
    }
}

fn ease_in_out(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone)]
pub struct HeadlessMap {
    camera: CameraView,
    flight: Option<Flight>,
    markers: Vec<Marker>,
    commands: VecDeque<MapCommand>,
    command_capacity: usize,
    dropped_commands: u64,
}

impl HeadlessMap {
    pub fn new(initial: CameraView) -> Self {
        Self {
            camera: initial,
            flight: None,
            markers: Vec::new(),
            commands: VecDeque::new(),
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            dropped_commands: 0,
        }
    }

    /// Keeps at most `capacity` commands (minimum 1).
    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self.trim_commands();
        self
    }

    pub fn with_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.markers.extend(markers);
        self
    }

    pub fn add_marker(&mut self, name: impl Into<String>, position: LngLat) -> usize {
        self.markers.push(Marker::new(name, position));
        self.markers.len() - 1
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn all_markers_visible(&self) -> bool {
        self.markers.iter().all(Marker::is_visible)
    }

    pub fn any_marker_visible(&self) -> bool {
        self.markers.iter().any(Marker::is_visible)
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Where the current flight ends, if one is in progress.
    pub fn flight_target(&self) -> Option<CameraView> {
        self.flight.map(|f| f.to)
    }

    /// Most recent commands, oldest first.
    pub fn commands(&self) -> &VecDeque<MapCommand> {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        self.commands.drain(..).collect()
    }

    /// Number of commands evicted from the log.
    pub fn dropped_commands(&self) -> u64 {
        self.dropped_commands
    }

    /// User-driven camera change (pan/zoom gesture). Not logged as a command.
    pub fn user_move(&mut self, view: CameraView) {
        self.flight = None;
        self.camera = view;
    }

    /// Advances the current flight. Returns the final view on the frame the
    /// flight settles.
    pub fn advance(&mut self, dt_ms: u64) -> Option<CameraView> {
        let flight = self.flight.as_mut()?;
        flight.elapsed_ms = flight.elapsed_ms.saturating_add(dt_ms);
        if flight.elapsed_ms >= flight.duration_ms {
            let settled = flight.to;
            self.flight = None;
            self.camera = settled;
            trace!(?settled, "camera flight settled");
            return Some(settled);
        }
        self.camera = flight.sample();
        None
    }

    fn record(&mut self, command: MapCommand) {
        self.commands.push_back(command);
        self.trim_commands();
    }

    fn trim_commands(&mut self) {
        while self.commands.len() > self.command_capacity {
            self.commands.pop_front();
            self.dropped_commands += 1;
        }
    }
}

impl MapSurface for HeadlessMap {
    fn camera(&self) -> CameraView {
        self.camera
    }

    fn set_camera(&mut self, view: CameraView, duration_ms: u64) {
        if duration_ms == 0 {
            self.flight = None;
            self.camera = view;
            self.record(MapCommand::JumpTo(view));
            return;
        }
        // A new flight starts from wherever the previous one got to.
        self.flight = Some(Flight {
            from: self.camera,
            to: view,
            duration_ms,
            elapsed_ms: 0,
        });
        self.record(MapCommand::FlyTo { view, duration_ms });
    }

    fn set_markers_visible(&mut self, visible: bool) {
        let visibility = if visible {
            Visibility::visible()
        } else {
            Visibility::hidden()
        };
        for marker in &mut self.markers {
            marker.visibility = visibility;
        }
        self.record(MapCommand::SetMarkersVisible(visible));
    }

    fn update(&mut self, dt_ms: u64) {
        self.advance(dt_ms);
    }
}
