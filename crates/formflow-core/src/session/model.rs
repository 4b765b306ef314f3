//! Session domain model.
//!
//! This module contains the [`FormSession`] aggregate: the single owner of
//! the detected fields, the transcript, the conversational mode, and the
//! in-flight request flags. All state transitions are synchronous functions
//! here; the asynchronous sequencing around collaborator calls lives in the
//! application layer.

use super::message::{ChatMessage, Transcript};
use super::mode::SessionMode;
use crate::error::{FormError, Result};
use crate::field::{Field, FieldRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Greeting shown when a session opens, before any document is imported.
pub const GREETING_MESSAGE: &str =
    "Hello. Import a document and I will analyze its fillable fields.";

/// Placeholder shown while a document analysis request is in flight.
pub const ANALYSIS_IN_PROGRESS_MESSAGE: &str = "Visual and structural analysis in progress...";

/// Opaque handle to the rendered document representation.
///
/// The analysis service returns this as a self-contained data URI; the core
/// never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedDocument(pub String);

/// A user session: one analyzed document plus the conversation about it.
///
/// Invariants maintained by the transition methods:
/// - the active field, when set, always references a field currently in the
///   registry (selection is stored as an identifier and resolved by lookup,
///   so replacing the registry can never leave a dangling handle);
/// - the mode is `Interview` only between a successful interview start and
///   the driver reporting no further question;
/// - the transcript is append-only and replaced only by a session reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSession {
    /// Unique session identifier (UUID format).
    id: String,
    /// Rendered document handle, absent until an analysis succeeds.
    rendered_doc: Option<RenderedDocument>,
    /// Detected fields for the current document.
    fields: FieldRegistry,
    /// Chat transcript, chronological.
    transcript: Transcript,
    /// Current conversational mode.
    mode: SessionMode,
    /// Identifier of the selected field, if any.
    active_field_id: Option<String>,
    /// True while a session bootstrap (analysis) is in flight.
    loading: bool,
    /// True while a chat or interview round-trip is in flight.
    sending: bool,
    /// Last load error for the banner, if any.
    last_error: Option<String>,
}

impl FormSession {
    /// Creates a fresh session with the opening greeting.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rendered_doc: None,
            fields: FieldRegistry::new(),
            transcript: Transcript::with_message(ChatMessage::ai(GREETING_MESSAGE)),
            mode: SessionMode::Manual,
            active_field_id: None,
            loading: false,
            sending: false,
            last_error: None,
        }
    }

    /// Returns the session ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rendered_doc(&self) -> Option<&RenderedDocument> {
        self.rendered_doc.as_ref()
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Resolves the selected field against the current registry.
    pub fn active_field(&self) -> Option<&Field> {
        self.active_field_id
            .as_deref()
            .and_then(|id| self.fields.get(id))
    }

    /// Appends a message to the transcript.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.transcript.append(message);
    }

    /// Atomically resets the session ahead of a new document analysis.
    ///
    /// Clears the error banner, the rendered document, the field registry,
    /// and the selection; reverts the mode to manual; and replaces the
    /// transcript with the analysis-in-progress placeholder.
    pub fn reset_for_analysis(&mut self) {
        self.last_error = None;
        self.rendered_doc = None;
        self.fields.clear();
        self.active_field_id = None;
        self.mode = SessionMode::Manual;
        self.transcript = Transcript::with_message(ChatMessage::ai(ANALYSIS_IN_PROGRESS_MESSAGE));
    }

    /// Installs a successful analysis result.
    ///
    /// Replaces the field registry (clearing any selection) and stores the
    /// rendered document. Returns the number of detected fields.
    pub fn apply_analysis(&mut self, doc: RenderedDocument, fields: Vec<Field>) -> usize {
        self.rendered_doc = Some(doc);
        self.active_field_id = None;
        self.fields.replace_all(fields);
        self.fields.len()
    }

    /// Records a load failure for the error banner.
    pub fn set_load_error(&mut self, detail: impl Into<String>) {
        self.last_error = Some(detail.into());
    }

    /// Drops the current document: rendered image, fields, and selection.
    ///
    /// The transcript is kept and the mode reverts to manual.
    pub fn clear_document(&mut self) {
        self.rendered_doc = None;
        self.fields.clear();
        self.active_field_id = None;
        self.mode = SessionMode::Manual;
    }

    /// Selects a field by identifier, or clears the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error if the identifier is not in the registry.
    pub fn set_active_field(&mut self, field_id: Option<&str>) -> Result<()> {
        match field_id {
            Some(id) => {
                if !self.fields.contains(id) {
                    return Err(FormError::not_found("field", id));
                }
                self.active_field_id = Some(id.to_string());
            }
            None => self.active_field_id = None,
        }
        Ok(())
    }

    /// Attempts the `manual -> interview` transition.
    ///
    /// Legal only with a non-empty field registry; returns false (and leaves
    /// the mode untouched) otherwise.
    pub fn begin_interview(&mut self) -> bool {
        if self.fields.is_empty() {
            return false;
        }
        self.mode = SessionMode::Interview;
        true
    }

    /// Reverts to manual mode (interview ended or failed to start).
    pub fn end_interview(&mut self) {
        self.mode = SessionMode::Manual;
    }

    /// Merges extraction results into the field registry.
    ///
    /// Returns the number of fields filled by this call.
    pub fn merge_extracted(&mut self, extracted: &HashMap<String, String>) -> usize {
        self.fields.merge_extracted(extracted)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_sending(&mut self, sending: bool) {
        self.sending = sending;
    }

    /// Returns true while either request gate is held.
    pub fn is_busy(&self) -> bool {
        self.loading || self.sending
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{BoundingBox, SimpleId};

    fn field(id: &str, simple_id: i64) -> Field {
        Field {
            id: id.to_string(),
            simple_id: SimpleId::Number(simple_id),
            label: format!("Field {}", simple_id),
            explanation: String::new(),
            bounds: BoundingBox {
                top: 0.0,
                left: 0.0,
                width: 10.0,
                height: 2.0,
            },
            value: None,
            is_auto_filled: false,
        }
    }

    #[test]
    fn new_session_opens_with_greeting_in_manual_mode() {
        let session = FormSession::new();
        assert_eq!(session.mode(), SessionMode::Manual);
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().last().unwrap().text, GREETING_MESSAGE);
        assert!(session.active_field().is_none());
        assert!(!session.is_busy());
    }

    #[test]
    fn reset_replaces_transcript_and_clears_everything() {
        let mut session = FormSession::new();
        session.apply_analysis(RenderedDocument("data:...".into()), vec![field("a", 1)]);
        session.set_active_field(Some("a")).unwrap();
        session.begin_interview();
        session.set_load_error("old failure");
        session.push_message(ChatMessage::user("hi"));

        session.reset_for_analysis();

        assert!(session.rendered_doc().is_none());
        assert!(session.fields().is_empty());
        assert!(session.active_field().is_none());
        assert_eq!(session.mode(), SessionMode::Manual);
        assert_eq!(session.last_error(), None);
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(
            session.transcript().last().unwrap().text,
            ANALYSIS_IN_PROGRESS_MESSAGE
        );
    }

    #[test]
    fn apply_analysis_clears_selection_even_on_matching_ids() {
        let mut session = FormSession::new();
        session.apply_analysis(RenderedDocument("doc-1".into()), vec![field("a", 1)]);
        session.set_active_field(Some("a")).unwrap();

        // Second analysis reuses the same field id; the selection must not
        // survive the registry replacement.
        let count = session.apply_analysis(RenderedDocument("doc-2".into()), vec![field("a", 1)]);

        assert_eq!(count, 1);
        assert!(session.active_field().is_none());
    }

    #[test]
    fn selecting_unknown_field_fails() {
        let mut session = FormSession::new();
        session.apply_analysis(RenderedDocument("doc".into()), vec![field("a", 1)]);

        let err = session.set_active_field(Some("missing")).unwrap_err();
        assert!(matches!(err, FormError::NotFound { .. }));
        assert!(session.active_field().is_none());

        session.set_active_field(Some("a")).unwrap();
        assert_eq!(session.active_field().unwrap().id, "a");
        session.set_active_field(None).unwrap();
        assert!(session.active_field().is_none());
    }

    #[test]
    fn interview_requires_detected_fields() {
        let mut session = FormSession::new();
        assert!(!session.begin_interview());
        assert_eq!(session.mode(), SessionMode::Manual);

        session.apply_analysis(RenderedDocument("doc".into()), vec![field("a", 1)]);
        assert!(session.begin_interview());
        assert_eq!(session.mode(), SessionMode::Interview);

        session.end_interview();
        assert_eq!(session.mode(), SessionMode::Manual);
    }

    #[test]
    fn clear_document_keeps_transcript() {
        let mut session = FormSession::new();
        session.apply_analysis(RenderedDocument("doc".into()), vec![field("a", 1)]);
        session.set_active_field(Some("a")).unwrap();
        session.begin_interview();
        session.push_message(ChatMessage::ai("a question"));
        let transcript_len = session.transcript().len();

        session.clear_document();

        assert!(session.rendered_doc().is_none());
        assert!(session.fields().is_empty());
        assert!(session.active_field().is_none());
        assert_eq!(session.mode(), SessionMode::Manual);
        assert_eq!(session.transcript().len(), transcript_len);
    }
}
