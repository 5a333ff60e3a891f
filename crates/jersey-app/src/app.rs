// Application orchestrator: owns the vote store and the submission task,
// reacts to TUI commands and pushes UiUpdates back.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{info, warn};

use jersey_core::selection::SubmissionPayload;
use jersey_core::votes::VoteStore;

use crate::protocol::{Notice, SubmissionEvent, UiUpdate, UserCommand};
use crate::submit::Submitter;

/// Notice shown after a successful save.
pub fn saved_votes_message(count: usize) -> String {
    format!("Thanks — your {count} vote(s) have been recorded locally.")
}

pub const SAVE_FAILED_MESSAGE: &str = "Unable to save votes locally.";
pub const CLEAR_FAILED_MESSAGE: &str = "Unable to clear saved votes.";
pub const SUBMIT_FAILED_PREFIX: &str = "There was a problem submitting your response";

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub votes: VoteStore,
    pub submitter: Arc<dyn Submitter>,
    /// Cloned into each spawned submission task.
    pub submission_tx: mpsc::Sender<SubmissionEvent>,
    pub submission_task: Option<tokio::task::JoinHandle<()>>,
    /// Set while a submission is in flight. At most one at a time.
    pub submission_pending: bool,
}

impl AppState {
    pub fn new(
        votes: VoteStore,
        submitter: Arc<dyn Submitter>,
        submission_tx: mpsc::Sender<SubmissionEvent>,
    ) -> Self {
        AppState {
            votes,
            submitter,
            submission_tx,
            submission_task: None,
            submission_pending: false,
        }
    }

    pub fn vote_ids(&self) -> Vec<String> {
        self.votes.votes().ids().to_vec()
    }

    /// Spawn the submission task. Returns false when one is already running.
    pub fn start_submission(&mut self, payload: SubmissionPayload) -> bool {
        if self.submission_pending {
            return false;
        }
        self.submission_pending = true;

        let submitter = Arc::clone(&self.submitter);
        let tx = self.submission_tx.clone();
        let handle = tokio::spawn(async move {
            let event = match submitter.submit(&payload).await {
                Ok(()) => SubmissionEvent::Succeeded,
                Err(e) => {
                    warn!("Submission for {} failed: {}", payload.jersey_name, e);
                    SubmissionEvent::Failed {
                        message: format!("{SUBMIT_FAILED_PREFIX}: {e}"),
                    }
                }
            };
            let _ = tx.send(event).await;
        });
        self.submission_task = Some(handle);
        info!("Submission started");
        true
    }

    pub fn cancel_submission(&mut self) {
        if let Some(handle) = self.submission_task.take() {
            handle.abort();
            info!("Cancelled in-flight submission");
        }
        self.submission_pending = false;
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Main application event loop.
///
/// Listens on user commands from the TUI and results from the submission
/// task, pushing UI updates through `ui_tx`. Sends the loaded vote set once
/// on startup.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut submission_rx: mpsc::Receiver<SubmissionEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let _ = ui_tx.send(UiUpdate::VotesChanged(state.vote_ids())).await;

    loop {
        tokio::select! {
            // --- Submission results ---
            event = submission_rx.recv() => {
                match event {
                    Some(event) => handle_submission_event(&mut state, event, &ui_tx).await,
                    // AppState holds a sender, so this only happens if the
                    // caller dropped it explicitly.
                    None => {
                        info!("Submission channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.cancel_submission();
    info!("Application event loop exiting");
    Ok(())
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Submit(payload) => {
            info!("Submitting selection for {}", payload.jersey_name);
            if !state.start_submission(payload) {
                warn!("Submit ignored: a submission is already in flight");
                let _ = ui_tx
                    .send(UiUpdate::Notice(Notice::error(
                        "A submission is already in progress.",
                    )))
                    .await;
            }
        }
        UserCommand::ToggleVote(id) => {
            let voted = state.votes.toggle(&id);
            info!("Vote for {} {}", id, if voted { "added" } else { "removed" });
            let _ = ui_tx.send(UiUpdate::VotesChanged(state.vote_ids())).await;
        }
        UserCommand::SaveVotes => match state.votes.save() {
            Ok(count) => {
                info!("Saved {} vote(s) under `{}`", count, state.votes.key());
                let _ = ui_tx
                    .send(UiUpdate::Notice(Notice::info(saved_votes_message(count))))
                    .await;
            }
            Err(e) => {
                warn!("Failed to save votes: {}", e);
                let _ = ui_tx
                    .send(UiUpdate::Notice(Notice::error(SAVE_FAILED_MESSAGE)))
                    .await;
            }
        },
        UserCommand::ClearVotes => {
            let result = state.votes.clear();
            let _ = ui_tx.send(UiUpdate::VotesChanged(state.vote_ids())).await;
            match result {
                Ok(()) => info!("Votes cleared"),
                Err(e) => {
                    // The stored set survives and comes back on the next start.
                    warn!("Failed to remove stored votes: {}", e);
                    let _ = ui_tx
                        .send(UiUpdate::Notice(Notice::error(CLEAR_FAILED_MESSAGE)))
                        .await;
                }
            }
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

async fn handle_submission_event(
    state: &mut AppState,
    event: SubmissionEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    state.submission_pending = false;
    state.submission_task = None;
    let update = match event {
        SubmissionEvent::Succeeded => {
            info!("Submission recorded");
            UiUpdate::SubmissionSucceeded {
                recorded_at: Local::now(),
            }
        }
        SubmissionEvent::Failed { message } => UiUpdate::SubmissionFailed { message },
    };
    let _ = ui_tx.send(update).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
