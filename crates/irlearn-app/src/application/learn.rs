//! The learning workflow state machine.
//!
//! Walks the user through the button catalogue one slot at a time:
//! listen for a capture, review it, save/retry/skip, and finally name and
//! persist the profile.  The machine is the single consumer of the event
//! mailbox, so every transition runs on one task and no field needs a lock.
//!
//! # Receiver posture
//!
//! The infrared receiver must listen exactly while the machine is in a
//! capture-expecting state.  To keep that pairing from scattering across
//! call sites, [`LearnStateMachine::enter`] is the only place that commands
//! the source: entering `Listening` resumes it, entering any review or
//! dialog state pauses it, and terminal states (plus `Drop`) stop it.
//!
//! # Duplicate captures
//!
//! A signal that arrives while an earlier capture is still under review is
//! dropped, never queued — the first capture for a button always wins.  The
//! `awaiting_decision` flag implementing this is owned here and mutated
//! only on the consumer task; the mailbox ordering makes that sufficient.

use std::sync::Arc;

use irlearn_core::{ButtonSequence, IrSignal, ProfileBuilder};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::events::{EventReceiver, EventSender, LearnEvent};
use crate::infrastructure::signal_source::{CaptureError, SignalSource};
use crate::infrastructure::storage::profiles::ProfileStore;

/// Prefix offered in the naming prompt, completed by the user.
const NAME_SEED: &str = "Remote_";

/// Error type for the learning workflow.
#[derive(Debug, Error)]
pub enum LearnError {
    /// The capture source could not be started.
    #[error("capture source failed to start: {0}")]
    Capture(#[from] CaptureError),
}

/// Where to return after a cancelled exit dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    Listening { cursor: usize },
    Reviewing { cursor: usize },
}

/// The workflow states.
///
/// `cursor` is the index into the button catalogue; it only ever moves
/// forward, one slot per confirmed-or-skipped button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnState {
    /// Waiting for the receiver to deliver a capture for `cursor`.
    Listening { cursor: usize },
    /// A capture is held; waiting for the user to save, retry, or skip.
    Reviewing { cursor: usize },
    /// Exit confirmation dialog; `resume` restores the prior state on cancel.
    ConfirmExit { resume: ResumePoint },
    /// Naming step.  Trap state: only a completed naming leads out.
    Finishing,
    /// Profile stored; the session is over.
    Completed,
    /// Session abandoned; nothing stored.
    Aborted,
}

impl LearnState {
    /// `true` for the two end states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LearnState::Completed | LearnState::Aborted)
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    Completed,
    Aborted,
}

/// Immutable view of the session handed to the UI façade after every
/// transition.  Screens render from this copy, never from live state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: LearnState,
    /// Current catalogue position, when one is meaningful.
    pub cursor: Option<usize>,
    /// Catalogue size.
    pub total: usize,
    /// Name of the button at `cursor`.
    pub button: Option<String>,
    /// The capture under review, if any.
    pub pending_signal: Option<IrSignal>,
    /// Number of buttons recorded so far.
    pub recorded: usize,
    /// Prefix to offer in the naming prompt.
    pub name_seed: String,
    /// User-visible message (e.g. a failed store), cleared on transition.
    pub notice: Option<String>,
}

/// Render hook for the UI façade.
pub trait SessionObserver: Send {
    fn state_changed(&self, snapshot: &SessionSnapshot);
}

/// Connects a capture source to the session mailbox.
///
/// The handler's only action is to enqueue — it never touches session
/// state, which keeps all mutation on the consumer task.
pub fn wire_capture(source: &dyn SignalSource, events: EventSender) {
    source.set_capture_handler(Box::new(move |signal| {
        events.send(LearnEvent::SignalReceived(signal));
    }));
}

/// The learning workflow state machine.
///
/// Owns its mailbox receiver and is constructed with explicit references to
/// its collaborators — there is no global dispatcher to register with.
pub struct LearnStateMachine {
    buttons: ButtonSequence,
    state: LearnState,
    /// Set only while `Reviewing`; cleared on every transition out of it.
    pending_signal: Option<IrSignal>,
    /// Guards against a second delivery while the first is unresolved.
    awaiting_decision: bool,
    /// Latched once the user stops early or the catalogue is exhausted;
    /// from then on only the finishing intents are honoured.
    finishing: bool,
    notice: Option<String>,
    builder: ProfileBuilder,
    events: EventReceiver,
    source: Arc<dyn SignalSource>,
    store: Arc<dyn ProfileStore>,
    observer: Option<Box<dyn SessionObserver>>,
}

impl LearnStateMachine {
    /// Creates a session positioned at the first button.
    ///
    /// An empty catalogue cannot be expressed: [`ButtonSequence::new`]
    /// already rejects it, so every session starts with at least one slot.
    pub fn new(
        buttons: ButtonSequence,
        events: EventReceiver,
        source: Arc<dyn SignalSource>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            builder: ProfileBuilder::new(buttons.clone()),
            buttons,
            state: LearnState::Listening { cursor: 0 },
            pending_signal: None,
            awaiting_decision: false,
            finishing: false,
            notice: None,
            events,
            source,
            store,
            observer: None,
        }
    }

    /// Registers the render hook.
    pub fn set_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    /// Powers up the receiver and announces the initial screen.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::Capture`] when the source fails to start.
    pub fn start(&mut self) -> Result<(), LearnError> {
        self.source.start()?;
        info!(buttons = self.buttons.len(), "learning session started");
        self.notify();
        Ok(())
    }

    /// Current workflow state.
    pub fn state(&self) -> &LearnState {
        &self.state
    }

    /// Current catalogue position, when one is meaningful.
    pub fn cursor(&self) -> Option<usize> {
        match &self.state {
            LearnState::Listening { cursor } | LearnState::Reviewing { cursor } => Some(*cursor),
            LearnState::ConfirmExit { resume } => Some(match resume {
                ResumePoint::Listening { cursor } | ResumePoint::Reviewing { cursor } => *cursor,
            }),
            _ => None,
        }
    }

    /// The capture currently under review.
    pub fn pending_signal(&self) -> Option<&IrSignal> {
        self.pending_signal.as_ref()
    }

    /// Terminal outcome, once reached.
    pub fn outcome(&self) -> Option<LearnOutcome> {
        match self.state {
            LearnState::Completed => Some(LearnOutcome::Completed),
            LearnState::Aborted => Some(LearnOutcome::Aborted),
            _ => None,
        }
    }

    /// Immutable copy of the session for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let cursor = self.cursor();
        SessionSnapshot {
            state: self.state.clone(),
            cursor,
            total: self.buttons.len(),
            button: cursor
                .and_then(|c| self.buttons.name_of(c))
                .map(str::to_string),
            pending_signal: self.pending_signal.clone(),
            recorded: self.builder.recorded_count(),
            name_seed: NAME_SEED.to_string(),
            notice: self.notice.clone(),
        }
    }

    /// Consumes the mailbox until the session ends.
    ///
    /// A closed mailbox (every producer dropped) counts as an abort: with
    /// no UI left, nothing could ever complete the naming step.
    pub async fn run(mut self) -> Result<LearnOutcome, LearnError> {
        self.start()?;
        loop {
            match self.events.recv().await {
                Some(event) => {
                    self.handle_event(event).await;
                    if let Some(outcome) = self.outcome() {
                        return Ok(outcome);
                    }
                }
                None => {
                    info!("event mailbox closed; aborting learning session");
                    self.enter(LearnState::Aborted);
                    return Ok(LearnOutcome::Aborted);
                }
            }
        }
    }

    /// Applies one intent.  Unknown (state, intent) pairs are ignored.
    pub async fn handle_event(&mut self, event: LearnEvent) {
        // Once finishing, nothing but the finishing intents may move the
        // session — a straggling capture or a duplicate Save cannot
        // resurrect the workflow.
        if self.finishing
            && !matches!(
                event,
                LearnEvent::FinishConfirmed | LearnEvent::NameEntered(_)
            )
        {
            debug!(?event, "intent ignored: session is finishing");
            return;
        }

        match (self.state.clone(), event) {
            (LearnState::Listening { cursor }, LearnEvent::SignalReceived(signal)) => {
                if self.awaiting_decision {
                    debug!("capture dropped: an earlier capture is still under review");
                    return;
                }
                info!(cursor, "signal captured");
                self.pending_signal = Some(signal);
                self.awaiting_decision = true;
                self.enter(LearnState::Reviewing { cursor });
            }

            // Source race: the receiver slipped a second delivery in before
            // we paused it.  First capture wins; this one is dropped.
            (LearnState::Reviewing { .. }, LearnEvent::SignalReceived(_)) => {
                debug!("duplicate capture dropped while awaiting decision");
            }

            (LearnState::Reviewing { cursor }, LearnEvent::Save) => {
                let Some(signal) = self.pending_signal.take() else {
                    debug!("save ignored: no pending capture");
                    return;
                };
                if let Err(e) = self.builder.record(cursor, signal) {
                    // Unreachable while the cursor stays inside the
                    // catalogue; logged rather than propagated.
                    warn!(error = %e, "failed to record capture");
                }
                self.awaiting_decision = false;
                self.advance(cursor);
            }

            (LearnState::Reviewing { cursor }, LearnEvent::Skip) => {
                self.pending_signal = None;
                self.awaiting_decision = false;
                self.builder.skip(cursor);
                self.advance(cursor);
            }

            (LearnState::Reviewing { cursor }, LearnEvent::Retry) => {
                self.pending_signal = None;
                self.awaiting_decision = false;
                self.enter(LearnState::Listening { cursor });
            }

            (LearnState::Listening { cursor }, LearnEvent::AskExit) => {
                self.enter(LearnState::ConfirmExit {
                    resume: ResumePoint::Listening { cursor },
                });
            }

            // The pending capture and its guard survive the dialog so a
            // cancel returns to the review exactly as it was.
            (LearnState::Reviewing { cursor }, LearnEvent::AskExit) => {
                self.enter(LearnState::ConfirmExit {
                    resume: ResumePoint::Reviewing { cursor },
                });
            }

            (
                LearnState::Listening { .. } | LearnState::Reviewing { .. },
                LearnEvent::Finish,
            ) => {
                self.begin_finishing();
            }

            (LearnState::ConfirmExit { .. }, LearnEvent::ExitConfirmed) => {
                info!("learning session abandoned");
                self.enter(LearnState::Aborted);
            }

            (LearnState::ConfirmExit { resume }, LearnEvent::ExitCancelled) => {
                self.enter(match resume {
                    ResumePoint::Listening { cursor } => LearnState::Listening { cursor },
                    ResumePoint::Reviewing { cursor } => LearnState::Reviewing { cursor },
                });
            }

            (LearnState::ConfirmExit { .. }, LearnEvent::FinishConfirmed) => {
                self.begin_finishing();
            }

            (LearnState::Finishing, LearnEvent::NameEntered(name)) => {
                self.finalize_and_store(&name).await;
            }

            (state, event) => {
                debug!(?state, ?event, "intent ignored in this state");
            }
        }
    }

    /// Moves past `cursor` after a save or skip.
    fn advance(&mut self, cursor: usize) {
        let next = cursor + 1;
        if next >= self.buttons.len() {
            self.begin_finishing();
        } else {
            self.enter(LearnState::Listening { cursor: next });
        }
    }

    fn begin_finishing(&mut self) {
        self.finishing = true;
        self.pending_signal = None;
        self.awaiting_decision = false;
        self.enter(LearnState::Finishing);
    }

    /// Completes the naming step: validate, snapshot, hand to storage.
    ///
    /// On failure the session stays in `Finishing` with a notice so the
    /// user can retry naming/storing without re-learning any button.
    async fn finalize_and_store(&mut self, name: &str) {
        let profile = match self.builder.finalize(name) {
            Ok(profile) => profile,
            Err(e) => {
                debug!(error = %e, "profile name rejected");
                self.notice = Some("Profile name cannot be empty".to_string());
                self.notify();
                return;
            }
        };

        match self.store.store(&profile).await {
            Ok(path) => {
                info!(
                    profile = %profile.name,
                    buttons = profile.buttons.len(),
                    path = %path.display(),
                    "learning session completed"
                );
                self.enter(LearnState::Completed);
            }
            Err(e) => {
                warn!(error = %e, "failed to store profile");
                self.notice = Some(format!("Could not save profile: {e}"));
                self.notify();
            }
        }
    }

    /// The single place the receiver posture is commanded from.
    fn enter(&mut self, next: LearnState) {
        match &next {
            LearnState::Listening { .. } => self.source.resume(),
            LearnState::Reviewing { .. } | LearnState::ConfirmExit { .. } => self.source.pause(),
            LearnState::Finishing | LearnState::Completed | LearnState::Aborted => {
                self.source.stop()
            }
        }
        debug!(from = ?self.state, to = ?next, "transition");
        self.state = next;
        self.notice = None;
        self.notify();
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer.state_changed(&self.snapshot());
        }
    }
}

impl Drop for LearnStateMachine {
    fn drop(&mut self) {
        // The receiver is released on every exit path, panics included.
        self.source.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use irlearn_core::RemoteProfile;

    use super::*;
    use crate::application::events::event_channel;
    use crate::infrastructure::signal_source::mock::MockSignalSource;
    use crate::infrastructure::signal_source::Posture;
    use crate::infrastructure::storage::profiles::ProfileStoreError;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingStore {
        stored: Mutex<Vec<RemoteProfile>>,
        should_fail: AtomicBool,
    }

    #[async_trait]
    impl ProfileStore for RecordingStore {
        async fn store(&self, profile: &RemoteProfile) -> Result<PathBuf, ProfileStoreError> {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(ProfileStoreError::Io {
                    path: PathBuf::from("/dev/full"),
                    source: std::io::Error::other("injected failure"),
                });
            }
            self.stored.lock().unwrap().push(profile.clone());
            Ok(PathBuf::from(format!("/tmp/{}.toml", profile.name)))
        }

        async fn load(&self, path: &std::path::Path) -> Result<RemoteProfile, ProfileStoreError> {
            Err(ProfileStoreError::NotFound {
                path: path.to_path_buf(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        states: Arc<Mutex<Vec<LearnState>>>,
    }

    impl SessionObserver for RecordingObserver {
        fn state_changed(&self, snapshot: &SessionSnapshot) {
            self.states.lock().unwrap().push(snapshot.state.clone());
        }
    }

    fn nec(command: u32) -> IrSignal {
        IrSignal::decoded("NEC", 0x04, command, false)
    }

    fn make_machine(
        names: &[&str],
    ) -> (LearnStateMachine, Arc<MockSignalSource>, Arc<RecordingStore>) {
        let buttons =
            ButtonSequence::new(names.iter().map(|s| s.to_string()).collect()).unwrap();
        let (tx, rx) = event_channel();
        let source = Arc::new(MockSignalSource::new());
        let store = Arc::new(RecordingStore::default());
        wire_capture(source.as_ref(), tx);

        let mut machine = LearnStateMachine::new(
            buttons,
            rx,
            Arc::clone(&source) as Arc<dyn SignalSource>,
            Arc::clone(&store) as Arc<dyn ProfileStore>,
        );
        machine.start().expect("mock source must start");
        (machine, source, store)
    }

    // ── The happy path ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_save_skip_save_scenario_produces_partial_profile() {
        // Arrange
        let (mut machine, source, store) = make_machine(&["Play", "Pause", "Stop"]);
        assert_eq!(machine.state(), &LearnState::Listening { cursor: 0 });
        assert_eq!(source.posture(), Posture::Running);

        // Act – capture → Save
        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        assert_eq!(machine.state(), &LearnState::Reviewing { cursor: 0 });
        assert_eq!(source.posture(), Posture::Paused);
        machine.handle_event(LearnEvent::Save).await;
        assert_eq!(machine.state(), &LearnState::Listening { cursor: 1 });
        assert_eq!(source.posture(), Posture::Running);

        // capture → Skip
        machine.handle_event(LearnEvent::SignalReceived(nec(0x11))).await;
        machine.handle_event(LearnEvent::Skip).await;
        assert_eq!(machine.state(), &LearnState::Listening { cursor: 2 });

        // capture → Save → catalogue exhausted
        machine.handle_event(LearnEvent::SignalReceived(nec(0x12))).await;
        machine.handle_event(LearnEvent::Save).await;
        assert_eq!(machine.state(), &LearnState::Finishing);
        assert_eq!(source.posture(), Posture::Stopped);

        // Name it
        machine
            .handle_event(LearnEvent::NameEntered("Living Room".to_string()))
            .await;

        // Assert
        assert_eq!(machine.state(), &LearnState::Completed);
        assert_eq!(machine.outcome(), Some(LearnOutcome::Completed));
        let stored = store.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        let profile = &stored[0];
        assert_eq!(profile.name, "Living Room");
        assert_eq!(
            profile.buttons.iter().map(|b| b.slot).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert_eq!(profile.signal_for("Play"), Some(&nec(0x10)));
        assert_eq!(profile.signal_for("Stop"), Some(&nec(0x12)));
        assert_eq!(profile.signal_for("Pause"), None);
    }

    #[tokio::test]
    async fn test_all_save_sequence_reaches_finishing_exactly_once() {
        let (mut machine, _, store) = make_machine(&["A", "B", "C", "D", "E"]);
        let mut finishing_entries = 0;

        for command in 0..5 {
            machine
                .handle_event(LearnEvent::SignalReceived(nec(command)))
                .await;
            machine.handle_event(LearnEvent::Save).await;
            if machine.state() == &LearnState::Finishing {
                finishing_entries += 1;
            }
        }

        assert_eq!(finishing_entries, 1);
        machine
            .handle_event(LearnEvent::NameEntered("full".to_string()))
            .await;
        let stored = store.stored.lock().unwrap();
        assert_eq!(stored[0].buttons.len(), 5);
        assert!(stored[0].buttons.iter().all(|b| b.slot < 5));
    }

    // ── Duplicate and straggling captures ─────────────────────────────────────

    #[tokio::test]
    async fn test_second_capture_before_decision_is_dropped() {
        let (mut machine, _, _) = make_machine(&["Play", "Pause"]);

        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::SignalReceived(nec(0x99))).await;

        // The first capture wins; the state did not advance twice.
        assert_eq!(machine.state(), &LearnState::Reviewing { cursor: 0 });
        assert_eq!(machine.pending_signal(), Some(&nec(0x10)));

        machine.handle_event(LearnEvent::Save).await;
        assert_eq!(machine.state(), &LearnState::Listening { cursor: 1 });
    }

    #[tokio::test]
    async fn test_capture_after_terminal_state_is_ignored() {
        let (mut machine, _, _) = make_machine(&["Play"]);

        machine.handle_event(LearnEvent::AskExit).await;
        machine.handle_event(LearnEvent::ExitConfirmed).await;
        assert_eq!(machine.state(), &LearnState::Aborted);

        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        assert_eq!(machine.state(), &LearnState::Aborted);
        assert_eq!(machine.pending_signal(), None);
    }

    // ── Retry ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_retry_is_loss_free() {
        let (mut machine, source, _) = make_machine(&["Play"]);

        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::Retry).await;

        // Pending capture cleared, receiver listening again for the same slot.
        assert_eq!(machine.state(), &LearnState::Listening { cursor: 0 });
        assert_eq!(machine.pending_signal(), None);
        assert_eq!(source.posture(), Posture::Running);

        // A fresh capture for the same slot succeeds.
        machine.handle_event(LearnEvent::SignalReceived(nec(0x20))).await;
        assert_eq!(machine.state(), &LearnState::Reviewing { cursor: 0 });
        assert_eq!(machine.pending_signal(), Some(&nec(0x20)));
    }

    // ── Exit dialog ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_ask_exit_then_cancel_restores_listening_posture() {
        let (mut machine, source, _) = make_machine(&["Play", "Pause"]);

        // Advance to cursor 1 so the restored cursor is distinguishable.
        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::Save).await;

        machine.handle_event(LearnEvent::AskExit).await;
        assert!(matches!(machine.state(), LearnState::ConfirmExit { .. }));
        assert_eq!(source.posture(), Posture::Paused);

        machine.handle_event(LearnEvent::ExitCancelled).await;
        assert_eq!(machine.state(), &LearnState::Listening { cursor: 1 });
        assert_eq!(source.posture(), Posture::Running);
    }

    #[tokio::test]
    async fn test_ask_exit_from_review_keeps_the_pending_capture() {
        let (mut machine, _, _) = make_machine(&["Play"]);

        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::AskExit).await;
        machine.handle_event(LearnEvent::ExitCancelled).await;

        assert_eq!(machine.state(), &LearnState::Reviewing { cursor: 0 });
        assert_eq!(machine.pending_signal(), Some(&nec(0x10)));

        // The retained capture is still saveable.
        machine.handle_event(LearnEvent::Save).await;
        assert_eq!(machine.state(), &LearnState::Finishing);
    }

    #[tokio::test]
    async fn test_exit_confirmed_aborts_and_stops_the_source() {
        let (mut machine, source, store) = make_machine(&["Play"]);

        machine.handle_event(LearnEvent::AskExit).await;
        machine.handle_event(LearnEvent::ExitConfirmed).await;

        assert_eq!(machine.outcome(), Some(LearnOutcome::Aborted));
        assert_eq!(source.posture(), Posture::Stopped);
        assert!(store.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_confirmed_from_exit_dialog_keeps_learned_buttons() {
        let (mut machine, _, store) = make_machine(&["Play", "Pause"]);

        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::Save).await;
        machine.handle_event(LearnEvent::AskExit).await;
        machine.handle_event(LearnEvent::FinishConfirmed).await;
        assert_eq!(machine.state(), &LearnState::Finishing);

        machine
            .handle_event(LearnEvent::NameEntered("partial".to_string()))
            .await;
        assert_eq!(store.stored.lock().unwrap()[0].buttons.len(), 1);
    }

    // ── Early finish ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_early_finish_from_listening_yields_partial_profile() {
        let (mut machine, source, store) = make_machine(&["Play", "Pause", "Stop"]);

        machine.handle_event(LearnEvent::Finish).await;
        assert_eq!(machine.state(), &LearnState::Finishing);
        assert_eq!(source.posture(), Posture::Stopped);

        machine
            .handle_event(LearnEvent::NameEntered("empty".to_string()))
            .await;
        assert_eq!(machine.outcome(), Some(LearnOutcome::Completed));
        assert!(store.stored.lock().unwrap()[0].buttons.is_empty());
    }

    #[tokio::test]
    async fn test_finishing_swallows_everything_but_the_naming_intents() {
        let (mut machine, _, store) = make_machine(&["Play"]);

        machine.handle_event(LearnEvent::Finish).await;

        // None of these may move the session or touch the builder.
        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::Save).await;
        machine.handle_event(LearnEvent::Retry).await;
        machine.handle_event(LearnEvent::AskExit).await;
        assert_eq!(machine.state(), &LearnState::Finishing);

        machine
            .handle_event(LearnEvent::NameEntered("trap".to_string()))
            .await;
        assert_eq!(machine.outcome(), Some(LearnOutcome::Completed));
        assert!(store.stored.lock().unwrap()[0].buttons.is_empty());
    }

    // ── Naming and persistence ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_blank_name_reprompts_without_leaving_finishing() {
        let (mut machine, _, store) = make_machine(&["Play"]);

        machine.handle_event(LearnEvent::Finish).await;
        machine
            .handle_event(LearnEvent::NameEntered("   ".to_string()))
            .await;

        assert_eq!(machine.state(), &LearnState::Finishing);
        assert!(machine.snapshot().notice.is_some());
        assert!(store.stored.lock().unwrap().is_empty());

        machine
            .handle_event(LearnEvent::NameEntered("Remote_1".to_string()))
            .await;
        assert_eq!(machine.outcome(), Some(LearnOutcome::Completed));
        assert_eq!(store.stored.lock().unwrap()[0].name, "Remote_1");
    }

    #[tokio::test]
    async fn test_store_failure_keeps_session_in_finishing_for_retry() {
        let (mut machine, _, store) = make_machine(&["Play"]);
        store.should_fail.store(true, Ordering::SeqCst);

        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::Save).await;
        machine
            .handle_event(LearnEvent::NameEntered("tv".to_string()))
            .await;

        // Still naming; the failure is surfaced, nothing was lost.
        assert_eq!(machine.state(), &LearnState::Finishing);
        let notice = machine.snapshot().notice.expect("notice must be set");
        assert!(notice.contains("Could not save"));

        // Retrying the same name after the store recovers succeeds.
        store.should_fail.store(false, Ordering::SeqCst);
        machine
            .handle_event(LearnEvent::NameEntered("tv".to_string()))
            .await;
        assert_eq!(machine.outcome(), Some(LearnOutcome::Completed));
        let stored = store.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].buttons.len(), 1);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_drop_releases_the_receiver() {
        let (machine, source, _) = make_machine(&["Play"]);
        assert_eq!(source.posture(), Posture::Running);

        drop(machine);
        assert_eq!(source.posture(), Posture::Stopped);
    }

    #[tokio::test]
    async fn test_observer_sees_every_transition() {
        let (mut machine, _, _) = make_machine(&["Play"]);
        let observer = RecordingObserver::default();
        let states = Arc::clone(&observer.states);
        machine.set_observer(Box::new(observer));

        machine.handle_event(LearnEvent::SignalReceived(nec(0x10))).await;
        machine.handle_event(LearnEvent::Retry).await;
        machine.handle_event(LearnEvent::SignalReceived(nec(0x11))).await;
        machine.handle_event(LearnEvent::Save).await;

        let seen = states.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                LearnState::Reviewing { cursor: 0 },
                LearnState::Listening { cursor: 0 },
                LearnState::Reviewing { cursor: 0 },
                LearnState::Finishing,
            ]
        );
    }

    #[tokio::test]
    async fn test_run_drives_the_session_from_the_mailbox() {
        let buttons = ButtonSequence::new(vec!["Play".to_string()]).unwrap();
        let (tx, rx) = event_channel();
        let source = Arc::new(MockSignalSource::new());
        let store = Arc::new(RecordingStore::default());
        wire_capture(source.as_ref(), tx.clone());

        let machine = LearnStateMachine::new(
            buttons,
            rx,
            Arc::clone(&source) as Arc<dyn SignalSource>,
            Arc::clone(&store) as Arc<dyn ProfileStore>,
        );
        let session = tokio::spawn(machine.run());

        tx.send(LearnEvent::SignalReceived(nec(0x10)));
        tx.send(LearnEvent::Save);
        tx.send(LearnEvent::NameEntered("den".to_string()));

        let outcome = session.await.unwrap().unwrap();
        assert_eq!(outcome, LearnOutcome::Completed);
        assert_eq!(store.stored.lock().unwrap().len(), 1);
    }
}
