// Messages exchanged between the TUI, the app orchestrator and the
// submission task.

use chrono::{DateTime, Local};
use jersey_core::selection::SubmissionPayload;

/// Commands from the TUI that need I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Deliver a selection to the form endpoint.
    Submit(SubmissionPayload),
    /// Flip the vote for a jersey id (memory only).
    ToggleVote(String),
    /// Persist the current vote set.
    SaveVotes,
    /// Empty the vote set and drop the stored copy.
    ClearVotes,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Updates pushed from the orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// The full vote set after a change (or at startup).
    VotesChanged(Vec<String>),
    SubmissionSucceeded { recorded_at: DateTime<Local> },
    SubmissionFailed { message: String },
    Notice(Notice),
}

/// Result of a spawned submission task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    Succeeded,
    Failed { message: String },
}
