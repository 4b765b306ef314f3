//! Conversational mode types for session state management.

use serde::{Deserialize, Serialize};

/// The conversational protocol currently active within a session.
///
/// `Manual` is the initial mode: the user selects fields and asks free-form
/// questions. `Interview` is entered when autofill starts and reverts to
/// `Manual` when the interview driver reports no further question (or fails
/// to start). The machine has no terminal state and is re-entrant for the
/// lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Field-by-field assistance driven by user questions.
    #[default]
    Manual,
    /// Sequential Q&A driven by the interview driver.
    Interview,
}

impl SessionMode {
    pub fn is_interview(self) -> bool {
        matches!(self, SessionMode::Interview)
    }
}
