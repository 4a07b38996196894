//! Wires the generation flag, the animation controller, the scheduler and the
//! trip form into one per-user session.
//!
//! The session owns the timeline. Each [`Session::advance_frame`] first
//! forwards generation changes to the controller, then dispatches the
//! scheduler entries that came due, then lets the map advance its flight.

use animation::{AnimationConfig, AnimationPhase, AnimationSignal, ViewAnimationController};
use formats::extract::extract_summary;
use formats::trip_summary::TripSummary;
use map_view::MapSurface;
use runtime::{Frame, Scheduler};
use tracing::{debug, info, warn};

use crate::chat_history::ChatHistorySource;
use crate::error::ImportError;
use crate::form::TripForm;
use crate::generation::{GenerationSnapshot, GenerationState, GenerationWatcher};

pub const DEFAULT_FRAME_MS: u64 = 16;

#[derive(Debug)]
pub struct Session<M> {
    generation: GenerationState,
    watcher: GenerationWatcher,
    last_seen: GenerationSnapshot,
    controller: ViewAnimationController<M>,
    scheduler: Scheduler<AnimationSignal>,
    form: TripForm,
}

impl<M: MapSurface> Session<M> {
    pub fn new(config: AnimationConfig, frame_ms: u64) -> Self {
        Self::from_controller(ViewAnimationController::new(config), frame_ms)
    }

    pub fn with_map(config: AnimationConfig, frame_ms: u64, map: M) -> Self {
        Self::from_controller(ViewAnimationController::with_map(config, map), frame_ms)
    }

    fn from_controller(controller: ViewAnimationController<M>, frame_ms: u64) -> Self {
        let generation = GenerationState::new();
        let watcher = generation.subscribe();
        let last_seen = watcher.current();
        Self {
            generation,
            watcher,
            last_seen,
            controller,
            scheduler: Scheduler::new(frame_ms),
            form: TripForm::default(),
        }
    }

    /// Shared generation flag. Clones handed to progress reporters write to
    /// the same state; the session notices their writes on the next frame.
    pub fn generation(&self) -> &GenerationState {
        &self.generation
    }

    pub fn controller(&self) -> &ViewAnimationController<M> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ViewAnimationController<M> {
        &mut self.controller
    }

    pub fn phase(&self) -> AnimationPhase {
        self.controller.phase()
    }

    pub fn map(&self) -> Option<&M> {
        self.controller.map()
    }

    pub fn map_mut(&mut self) -> Option<&mut M> {
        self.controller.map_mut()
    }

    pub fn frame(&self) -> Frame {
        self.scheduler.frame()
    }

    pub fn form(&self) -> &TripForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TripForm {
        &mut self.form
    }

    pub fn start_generation(&mut self) {
        self.generation.start();
        self.sync_generation();
    }

    pub fn stop_generation(&mut self) {
        self.generation.stop();
        self.sync_generation();
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.generation.set_progress(progress);
    }

    /// Forwards an unseen generation change to the controller.
    pub fn sync_generation(&mut self) {
        let Some(snapshot) = self.watcher.poll_change() else {
            return;
        };
        let previous = self.last_seen;
        self.last_seen = snapshot;

        if snapshot.run != previous.run && !snapshot.is_generating {
            debug!(
                run = snapshot.run,
                "generation started and stopped between frames"
            );
        }
        if snapshot.is_generating != previous.is_generating {
            self.controller
                .on_generation_changed(snapshot.is_generating, &mut self.scheduler);
        }
    }

    /// Runs one frame of the timeline and returns it.
    pub fn advance_frame(&mut self) -> Frame {
        self.sync_generation();
        for fired in self.scheduler.advance_frame() {
            self.controller.on_signal(&fired, &mut self.scheduler);
        }
        let frame = self.scheduler.frame();
        if let Some(map) = self.controller.map_mut() {
            map.update(frame.dt_ms);
        }
        frame
    }

    /// Runs as many frames as it takes to cover `duration_ms`.
    pub fn run_for(&mut self, duration_ms: u64) {
        let dt = self.scheduler.frame().dt_ms;
        let frames = duration_ms.div_ceil(dt);
        for _ in 0..frames {
            self.advance_frame();
        }
    }

    /// Runs frames until the controller is Idle or `max_frames` ran out.
    /// Returns whether it reached Idle.
    pub fn run_until_idle(&mut self, max_frames: u64) -> bool {
        let mut frames = 0;
        while self.phase() != AnimationPhase::Idle && frames < max_frames {
            self.advance_frame();
            frames += 1;
        }
        self.phase() == AnimationPhase::Idle
    }

    /// Fetches the group's chat history, extracts the trip summary and fills
    /// the form with it. On error the form is left untouched.
    pub async fn import_summary<S>(
        &mut self,
        source: &S,
        group_name: &str,
        user_id: &str,
    ) -> Result<TripSummary, ImportError>
    where
        S: ChatHistorySource + ?Sized,
    {
        let output = source.fetch(group_name, user_id).await.map_err(|err| {
            warn!(group_name, error = %err, "chat history fetch failed");
            ImportError::from(err)
        })?;
        let summary = extract_summary(&output).map_err(|err| {
            warn!(group_name, error = %err, "no usable summary in chat history");
            ImportError::from(err)
        })?;

        self.form.apply_summary(&summary);
        self.form.chat_context = format!("Imported from the \"{group_name}\" group chat.");
        info!(group_name, title = %summary.title, "trip summary imported");
        Ok(summary)
    }

    /// Ends the session: any running sequence is cut short and the
    /// generation flag goes back to `{false, 0}`.
    pub fn end(&mut self) {
        self.controller.reset(&mut self.scheduler);
        self.generation.reset();
        if let Some(snapshot) = self.watcher.poll_change() {
            self.last_seen = snapshot;
        }
        info!(frame = self.scheduler.frame().index, "session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::chat_history::{BoxFuture, ChatHistoryError, ChatHistorySource};
    use crate::error::ImportError;
    use crate::form::TripForm;
    use animation::{AnimationConfig, AnimationPhase};
    use formats::chat_output::ChatHistoryOutput;
    use foundation::geo::LngLat;
    use map_view::{CameraView, DEFAULT_COMMAND_CAPACITY, HeadlessMap, MapSurface, Marker};
    use pretty_assertions::assert_eq;

    fn madrid() -> CameraView {
        CameraView::new(LngLat::new(-3.7038, 40.4168), 5.0, 0.0)
    }

    fn session() -> Session<HeadlessMap> {
        let map = HeadlessMap::new(madrid())
            .with_markers([Marker::new("Madrid", LngLat::new(-3.7038, 40.4168))]);
        Session::with_map(AnimationConfig::default(), 16, map)
    }

    struct Canned(ChatHistoryOutput);

    impl ChatHistorySource for Canned {
        fn fetch<'a>(
            &'a self,
            _group_name: &'a str,
            _user_id: &'a str,
        ) -> BoxFuture<'a, Result<ChatHistoryOutput, ChatHistoryError>> {
            let output = self.0.clone();
            Box::pin(async move { Ok(output) })
        }
    }

    struct Down;

    impl ChatHistorySource for Down {
        fn fetch<'a>(
            &'a self,
            _group_name: &'a str,
            _user_id: &'a str,
        ) -> BoxFuture<'a, Result<ChatHistoryOutput, ChatHistoryError>> {
            Box::pin(async {
                Err(ChatHistoryError::Status {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                })
            })
        }
    }

    #[test]
    fn start_and_stop_drive_the_controller() {
        let mut s = session();
        s.start_generation();
        assert_eq!(s.phase(), AnimationPhase::ZoomingOut);

        s.run_for(3100);
        assert_eq!(s.phase(), AnimationPhase::Rotating);
        assert!(!s.map().unwrap().any_marker_visible());

        s.set_progress(60.0);
        s.run_for(500);
        s.stop_generation();
        assert_eq!(s.phase(), AnimationPhase::ReturningToIdle);
        assert_eq!(s.generation().progress(), 0.0);

        assert!(s.run_until_idle(1000));
        let map = s.map().unwrap();
        assert_eq!(map.camera(), madrid());
        assert!(map.all_markers_visible());
    }

    #[test]
    fn writes_from_a_cloned_handle_apply_on_next_frame() {
        let mut s = session();
        let reporter = s.generation().clone();
        reporter.start();
        assert_eq!(s.phase(), AnimationPhase::Idle);

        s.advance_frame();
        assert_eq!(s.phase(), AnimationPhase::ZoomingOut);

        reporter.set_progress(30.0);
        s.advance_frame();
        assert_eq!(s.phase(), AnimationPhase::ZoomingOut);
    }

    #[test]
    fn stop_from_cloned_handle_preempts_pending_tick() {
        let mut s = session();
        let reporter = s.generation().clone();
        s.start_generation();
        s.run_for(3100);
        assert_eq!(s.phase(), AnimationPhase::Rotating);
        s.run_for(160);
        let ticks = s.controller().rotation_ticks();
        assert!(ticks > 0);

        reporter.stop();
        s.advance_frame();
        assert_eq!(s.phase(), AnimationPhase::ReturningToIdle);
        assert_eq!(s.controller().rotation_ticks(), ticks);

        assert!(s.run_until_idle(1000));
        assert_eq!(s.controller().rotation_ticks(), ticks);
    }

    #[test]
    fn long_rotation_keeps_map_command_log_bounded() {
        let mut s = session();
        s.start_generation();
        s.run_for(120_000);
        assert_eq!(s.phase(), AnimationPhase::Rotating);

        let map = s.map().unwrap();
        assert_eq!(map.commands().len(), DEFAULT_COMMAND_CAPACITY);
        assert!(map.dropped_commands() > 0);
    }

    #[test]
    fn start_stop_between_frames_leaves_session_idle() {
        let mut s = session();
        let reporter = s.generation().clone();
        reporter.start();
        reporter.stop();
        s.run_for(5000);

        assert_eq!(s.phase(), AnimationPhase::Idle);
        assert!(s.map().unwrap().commands().is_empty());
    }

    #[test]
    fn end_resets_everything() {
        let mut s = session();
        s.start_generation();
        s.set_progress(80.0);
        s.run_for(4000);
        s.end();

        assert_eq!(s.phase(), AnimationPhase::Idle);
        assert!(!s.generation().is_generating());
        assert_eq!(s.generation().progress(), 0.0);
        assert_eq!(s.map().unwrap().camera(), madrid());
        assert!(s.map().unwrap().all_markers_visible());

        s.run_for(1000);
        assert_eq!(s.phase(), AnimationPhase::Idle);
    }

    #[test]
    fn session_without_map_still_animates() {
        let mut s: Session<HeadlessMap> = Session::new(AnimationConfig::default(), 16);
        s.start_generation();
        s.run_for(3100);
        assert_eq!(s.phase(), AnimationPhase::Rotating);
        s.stop_generation();
        assert!(s.run_until_idle(1000));
    }

    #[tokio::test]
    async fn import_fills_form() {
        let mut s = session();
        let source = Canned(ChatHistoryOutput::Fragments(vec![
            "not json".to_string(),
            r#"{"title":"Spain Trip","destination":"Spain","names":["Ana","Ben","Caro"]}"#
                .to_string(),
        ]));

        let summary = s
            .import_summary(&source, "SF Crew", "user-1")
            .await
            .unwrap();
        assert_eq!(summary.title, "Spain Trip");

        let form = s.form();
        assert_eq!(form.trip_name, "Spain Trip");
        assert_eq!(form.destination, "Spain");
        assert_eq!(form.traveler_count, 3);
        assert_eq!(form.chat_context, "Imported from the \"SF Crew\" group chat.");
    }

    #[tokio::test]
    async fn failed_import_leaves_form_untouched() {
        let mut s = session();
        s.form_mut().budget = "$1200".to_string();
        let before = s.form().clone();

        let err = s
            .import_summary(&Down, "SF Crew", "user-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Network(_)));

        let empty = Canned(ChatHistoryOutput::Text("Chat not found".to_string()));
        let err = s.import_summary(&empty, "SF Crew", "user-1").await.unwrap_err();
        assert!(matches!(err, ImportError::NoSummaryFound));

        let broken = Canned(ChatHistoryOutput::Text(r#"{"title":"x", oops}"#.to_string()));
        let err = s.import_summary(&broken, "SF Crew", "user-1").await.unwrap_err();
        assert!(matches!(err, ImportError::ParseFailure { .. }));

        assert_eq!(s.form(), &before);
        assert_ne!(s.form(), &TripForm::default());
    }

    #[tokio::test]
    async fn import_works_through_a_trait_object() {
        let mut s = session();
        let source: Box<dyn ChatHistorySource> = Box::new(Canned(ChatHistoryOutput::Text(
            r#"summary {"title":"Oslo"}"#.to_string(),
        )));
        s.import_summary(source.as_ref(), "g", "u").await.unwrap();
        assert_eq!(s.form().trip_name, "Oslo");
    }
}
