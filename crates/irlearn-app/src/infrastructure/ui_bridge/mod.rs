//! Console bridge: renders session snapshots and translates input lines
//! into intents.
//!
//! This is the only module that knows what the workflow looks like on a
//! terminal.  It holds no workflow logic: screens are a closed set derived
//! from the session state, each rendered from the immutable
//! [`SessionSnapshot`] the machine publishes after every transition, and
//! every input line maps to exactly one [`LearnEvent`] or is rejected.

use tracing::debug;

use crate::application::events::LearnEvent;
use crate::application::learn::{LearnState, SessionObserver, SessionSnapshot};

/// The closed set of screens the workflow can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// "Press any button on the remote."
    Listening,
    /// Shows the captured signal; asks save/retry/skip.
    Reviewing,
    /// "Stop learning?" three-way dialog.
    ConfirmExit,
    /// "Name new remote" prompt.
    Naming,
}

impl Screen {
    /// Maps a workflow state to its screen; terminal states have none.
    pub fn of(state: &LearnState) -> Option<Screen> {
        match state {
            LearnState::Listening { .. } => Some(Screen::Listening),
            LearnState::Reviewing { .. } => Some(Screen::Reviewing),
            LearnState::ConfirmExit { .. } => Some(Screen::ConfirmExit),
            LearnState::Finishing => Some(Screen::Naming),
            LearnState::Completed | LearnState::Aborted => None,
        }
    }
}

/// Renders one snapshot as terminal text.
pub fn render(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    match Screen::of(&snapshot.state) {
        Some(Screen::Listening) => {
            out.push_str("== Learn ==\n");
            if let (Some(cursor), Some(button)) = (snapshot.cursor, &snapshot.button) {
                out.push_str(&format!(
                    "Button {}/{}: {}\n",
                    cursor + 1,
                    snapshot.total,
                    button
                ));
            }
            out.push_str("Press any button on the remote...\n");
            out.push_str("(commands: finish, exit)\n");
        }
        Some(Screen::Reviewing) => {
            out.push_str("== RX signal ==\n");
            if let Some(signal) = &snapshot.pending_signal {
                out.push_str(&format!("{signal}\n"));
            }
            if let Some(button) = &snapshot.button {
                out.push_str(&format!("Save this signal as \"{button}\"?\n"));
            }
            out.push_str("(commands: save, retry, skip, finish, exit)\n");
        }
        Some(Screen::ConfirmExit) => {
            out.push_str("== Stop learning? ==\n");
            out.push_str("yes  - discard everything and exit\n");
            out.push_str("keep - save the buttons learned so far\n");
            out.push_str("no   - continue learning\n");
        }
        Some(Screen::Naming) => {
            out.push_str("== Name new remote ==\n");
            out.push_str(&format!(
                "{} button(s) learned. Enter: name {}<suffix>\n",
                snapshot.recorded, snapshot.name_seed
            ));
        }
        None => match snapshot.state {
            LearnState::Completed => out.push_str("Profile saved. Goodbye.\n"),
            _ => out.push_str("Learning abandoned.\n"),
        },
    }

    if let Some(notice) = &snapshot.notice {
        out.push_str(&format!("! {notice}\n"));
    }
    out
}

/// Translates one console line into an intent.
///
/// Returns `None` for lines that map to nothing; the caller decides how to
/// hint.  `SignalReceived` is deliberately not producible from here — only
/// the capture callback may enqueue it.
pub fn parse_command(line: &str) -> Option<LearnEvent> {
    let line = line.trim();
    if let Some(name) = line.strip_prefix("name ") {
        return Some(LearnEvent::NameEntered(name.to_string()));
    }
    match line {
        "save" | "ok" => Some(LearnEvent::Save),
        "skip" => Some(LearnEvent::Skip),
        "retry" => Some(LearnEvent::Retry),
        "finish" => Some(LearnEvent::Finish),
        "exit" => Some(LearnEvent::AskExit),
        "yes" => Some(LearnEvent::ExitConfirmed),
        "no" => Some(LearnEvent::ExitCancelled),
        "keep" => Some(LearnEvent::FinishConfirmed),
        _ => {
            debug!(line, "unrecognised console command");
            None
        }
    }
}

/// [`SessionObserver`] that prints every snapshot to stdout.
pub struct ConsoleView;

impl SessionObserver for ConsoleView {
    fn state_changed(&self, snapshot: &SessionSnapshot) {
        print!("\n{}", render(snapshot));
    }
}
