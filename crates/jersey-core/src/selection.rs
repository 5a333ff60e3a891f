// Selection flow: choose a jersey, fill in the optional form, submit, confirm.
//
// The flow is pure state. Delivering the payload is the job of the
// submission client; the host reports the result back through
// `submission_succeeded` / `submission_failed`.

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::JerseyRecord;

/// Player names longer than this are cut off while typing.
pub const PLAYER_NAME_MAX_CHARS: usize = 20;

/// Shown in the confirmation when no opinion was given.
pub const EMPTY_OPINION: &str = "—";

// ---------------------------------------------------------------------------
// Selection / payload
// ---------------------------------------------------------------------------

/// A submitted choice. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub jersey: JerseyRecord,
    pub player_name: Option<String>,
    pub opinion: Option<String>,
    pub recorded_at: DateTime<Local>,
}

impl Selection {
    pub fn opinion_display(&self) -> &str {
        self.opinion.as_deref().unwrap_or(EMPTY_OPINION)
    }

    pub fn recorded_label(&self) -> String {
        self.recorded_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// The fields delivered to the form-collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub jersey_name: String,
    pub player_name: String,
    pub opinion: String,
}

// ---------------------------------------------------------------------------
// Form fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    PlayerName,
    Opinion,
}

/// Text typed into the form. Values are kept untrimmed until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub player_name: String,
    pub opinion: String,
}

impl FormFields {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::PlayerName => &self.player_name,
            FormField::Opinion => &self.opinion,
        }
    }

    /// Append a character. Returns false when the field is full.
    pub fn push_char(&mut self, field: FormField, c: char) -> bool {
        match field {
            FormField::PlayerName => {
                if self.player_name.chars().count() >= PLAYER_NAME_MAX_CHARS {
                    return false;
                }
                self.player_name.push(c);
            }
            FormField::Opinion => self.opinion.push(c),
        }
        true
    }

    pub fn pop_char(&mut self, field: FormField) {
        match field {
            FormField::PlayerName => self.player_name.pop(),
            FormField::Opinion => self.opinion.pop(),
        };
    }

    pub fn clear(&mut self) {
        self.player_name.clear();
        self.opinion.clear();
    }
}

// ---------------------------------------------------------------------------
// Flow state
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    #[error("no jersey is selected")]
    NothingSelected,

    #[error("a submission is already in progress")]
    AlreadySubmitting,
}

/// The form for a chosen jersey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingState {
    pub jersey: JerseyRecord,
    pub fields: FormFields,
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowPhase {
    /// Nothing chosen yet; the carousel is browsing.
    Browsing,
    /// A jersey is chosen and the form is shown.
    Editing(EditingState),
    /// The submission went through; read-only confirmation.
    Confirmed(Selection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFlow {
    phase: FlowPhase,
}

impl Default for SelectionFlow {
    fn default() -> Self {
        SelectionFlow {
            phase: FlowPhase::Browsing,
        }
    }
}

impl SelectionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &FlowPhase {
        &self.phase
    }

    /// Id of the chosen jersey. Stays set through the confirmation so the
    /// carousel keeps showing it as selected.
    pub fn selected_jersey_id(&self) -> Option<&str> {
        match &self.phase {
            FlowPhase::Browsing => None,
            FlowPhase::Editing(editing) => Some(&editing.jersey.id),
            FlowPhase::Confirmed(selection) => Some(&selection.jersey.id),
        }
    }

    pub fn is_selection_active(&self) -> bool {
        !matches!(self.phase, FlowPhase::Browsing)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(&self.phase, FlowPhase::Editing(e) if e.submitting)
    }

    pub fn editing(&self) -> Option<&EditingState> {
        match &self.phase {
            FlowPhase::Editing(editing) => Some(editing),
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Option<&Selection> {
        match &self.phase {
            FlowPhase::Confirmed(selection) => Some(selection),
            _ => None,
        }
    }

    /// Form fields, writable only while the form is idle.
    pub fn fields_mut(&mut self) -> Option<&mut FormFields> {
        match &mut self.phase {
            FlowPhase::Editing(editing) if !editing.submitting => Some(&mut editing.fields),
            _ => None,
        }
    }

    /// Choose a jersey. Switching jerseys while the form is open keeps the
    /// typed text; a previous confirmation is discarded. Refused while a
    /// submission is in flight.
    pub fn choose(&mut self, jersey: JerseyRecord) -> Result<(), FlowError> {
        match &mut self.phase {
            FlowPhase::Editing(editing) if editing.submitting => Err(FlowError::AlreadySubmitting),
            FlowPhase::Editing(editing) => {
                editing.jersey = jersey;
                editing.error = None;
                Ok(())
            }
            FlowPhase::Browsing | FlowPhase::Confirmed(_) => {
                self.phase = FlowPhase::Editing(EditingState {
                    jersey,
                    fields: FormFields::default(),
                    submitting: false,
                    error: None,
                });
                Ok(())
            }
        }
    }

    /// Start a submission: trims the fields, raises the submitting flag and
    /// returns the payload to deliver.
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, FlowError> {
        let FlowPhase::Editing(editing) = &mut self.phase else {
            return Err(FlowError::NothingSelected);
        };
        if editing.submitting {
            return Err(FlowError::AlreadySubmitting);
        }
        editing.submitting = true;
        editing.error = None;
        Ok(SubmissionPayload {
            jersey_name: editing.jersey.name.clone(),
            player_name: editing.fields.player_name.trim().to_string(),
            opinion: editing.fields.opinion.trim().to_string(),
        })
    }

    /// The in-flight submission succeeded: the form is cleared and the
    /// selection recorded. Returns `None` when no submission was pending.
    pub fn submission_succeeded(&mut self, recorded_at: DateTime<Local>) -> Option<&Selection> {
        let FlowPhase::Editing(editing) = &mut self.phase else {
            return None;
        };
        if !editing.submitting {
            return None;
        }
        let non_empty = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        let selection = Selection {
            jersey: editing.jersey.clone(),
            player_name: non_empty(&editing.fields.player_name),
            opinion: non_empty(&editing.fields.opinion),
            recorded_at,
        };
        editing.fields.clear();
        self.phase = FlowPhase::Confirmed(selection);
        self.confirmation()
    }

    /// The in-flight submission failed: stay on the form, keep the typed
    /// values, remember the message.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        if let FlowPhase::Editing(editing) = &mut self.phase {
            editing.submitting = false;
            editing.error = Some(message.into());
        }
    }

    /// Clear both fields without submitting.
    pub fn reset_fields(&mut self) {
        if let FlowPhase::Editing(editing) = &mut self.phase {
            if !editing.submitting {
                editing.fields.clear();
                editing.error = None;
            }
        }
    }

    /// Discard the choice (or the confirmation) and go back to browsing.
    /// Refused while a submission is in flight.
    pub fn new_selection(&mut self) -> Result<(), FlowError> {
        if self.is_submitting() {
            return Err(FlowError::AlreadySubmitting);
        }
        self.phase = FlowPhase::Browsing;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
