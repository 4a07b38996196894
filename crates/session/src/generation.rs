//! Session-scoped "a plan is being generated" flag with a progress value.
//!
//! Writers and readers share one `watch` channel. Every write is visible to
//! every reader as soon as the writing call returns.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Value published on every change.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GenerationSnapshot {
    pub is_generating: bool,
    /// Percentage in `[0, 100]`. Only meaningful while generating.
    pub progress: f64,
    /// Number of times generation has been started in this session.
    pub run: u64,
}

/// Cloneable handle to the generation flag. All clones write to the same state.
#[derive(Debug, Clone)]
pub struct GenerationState {
    tx: Arc<watch::Sender<GenerationSnapshot>>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(GenerationSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> GenerationSnapshot {
        *self.tx.borrow()
    }

    pub fn is_generating(&self) -> bool {
        self.tx.borrow().is_generating
    }

    pub fn progress(&self) -> f64 {
        self.tx.borrow().progress
    }

    /// Marks generation as running. Idempotent: a second call does not notify.
    pub fn start(&self) {
        let changed = self.tx.send_if_modified(|s| {
            if s.is_generating {
                return false;
            }
            s.is_generating = true;
            s.progress = 0.0;
            s.run += 1;
            true
        });
        if changed {
            debug!(run = self.snapshot().run, "generation started");
        }
    }

    /// Marks generation as finished and clears the progress.
    pub fn stop(&self) {
        let changed = self.tx.send_if_modified(|s| {
            if !s.is_generating && s.progress == 0.0 {
                return false;
            }
            s.is_generating = false;
            s.progress = 0.0;
            true
        });
        if changed {
            debug!("generation stopped");
        }
    }

    /// Stores `progress` clamped into `[0, 100]`. Non-finite values store 0.
    pub fn set_progress(&self, progress: f64) {
        let clamped = clamp_progress(progress);
        self.tx.send_if_modified(|s| {
            if s.progress == clamped {
                return false;
            }
            s.progress = clamped;
            true
        });
    }

    /// Back to `{ is_generating: false, progress: 0 }`. The run counter keeps
    /// counting so watchers can still tell runs apart.
    pub fn reset(&self) {
        self.stop();
    }

    pub fn subscribe(&self) -> GenerationWatcher {
        GenerationWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

fn clamp_progress(progress: f64) -> f64 {
    if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Read side of [`GenerationState`].
#[derive(Debug, Clone)]
pub struct GenerationWatcher {
    rx: watch::Receiver<GenerationSnapshot>,
}

impl GenerationWatcher {
    /// Latest published value, whether or not it was already seen.
    pub fn current(&self) -> GenerationSnapshot {
        *self.rx.borrow()
    }

    /// Returns the latest value once per change, `None` if nothing changed
    /// since the last call.
    pub fn poll_change(&mut self) -> Option<GenerationSnapshot> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }

    /// Waits for the next change. `None` once every writer is gone.
    pub async fn changed(&mut self) -> Option<GenerationSnapshot> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
