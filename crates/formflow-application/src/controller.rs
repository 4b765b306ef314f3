//! Session orchestration.
//!
//! [`SessionController`] is the single owner of the session state. It
//! sequences the asynchronous collaborator round-trips, folds their outcomes
//! into the `FormSession` via its pure transition methods, and converts
//! failures into visible transcript messages so no operation surfaces an
//! unhandled fault to the caller.

use formflow_core::collaborator::{
    DocumentAnalysis, DocumentAnalyzer, FieldContext, FormAssistant,
};
use formflow_core::session::{ChatMessage, FormSession, SessionMode};
use formflow_core::{FormError, Result};
use std::sync::Arc;

/// Closing line appended when the interview runs out of questions.
const INTERVIEW_FINISHED_MESSAGE: &str = "Interview finished. I've filled what I could!";
/// Shown when the first interview question cannot be fetched.
const INTERVIEW_START_FAILED_MESSAGE: &str = "Error starting the interview.";
/// Shown when a manual-mode question fails.
const MANUAL_QUERY_FAILED_MESSAGE: &str = "Error communicating with the AI.";
/// Shown in the transcript when document analysis fails.
const ANALYSIS_FAILED_MESSAGE: &str = "Critical error connecting to the analysis service.";

/// Orchestrates one form-filling session.
///
/// All user-triggered operations go through this controller. The
/// `loading`/`sending` flags on the session are real request gates: any
/// operation entered while one of them is set returns
/// [`FormError::RequestInFlight`] without touching state, so programmatic
/// callers get the same mutual exclusion the disabled UI gives interactive
/// ones.
pub struct SessionController {
    session: FormSession,
    analyzer: Arc<dyn DocumentAnalyzer>,
    assistant: Arc<dyn FormAssistant>,
}

impl SessionController {
    /// Creates a controller with a fresh session.
    pub fn new(analyzer: Arc<dyn DocumentAnalyzer>, assistant: Arc<dyn FormAssistant>) -> Self {
        Self {
            session: FormSession::new(),
            analyzer,
            assistant,
        }
    }

    /// Read access to the session state for the view layer.
    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// Bootstraps the session from an uploaded document.
    ///
    /// Resets the session, runs the analysis, and reports the outcome in the
    /// transcript. Analysis failures are absorbed into the transcript and the
    /// error banner.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::RequestInFlight`] if another request is running.
    pub async fn load_from_upload(&mut self, file_name: &str, content: Vec<u8>) -> Result<()> {
        self.ensure_idle()?;

        self.session.reset_for_analysis();
        self.session.set_loading(true);
        let outcome = self.analyzer.analyze_upload(file_name, content).await;
        self.finish_load(outcome);
        Ok(())
    }

    /// Bootstraps the session from the server-side example document.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::RequestInFlight`] if another request is running.
    pub async fn load_example(&mut self) -> Result<()> {
        self.ensure_idle()?;

        self.session.reset_for_analysis();
        self.session.set_loading(true);
        let outcome = self.analyzer.analyze_example().await;
        self.finish_load(outcome);
        Ok(())
    }

    fn finish_load(&mut self, outcome: Result<DocumentAnalysis>) {
        match outcome {
            Ok(analysis) => {
                let count = self
                    .session
                    .apply_analysis(analysis.rendered_doc, analysis.fields);
                tracing::info!(field_count = count, "document analysis complete");
                self.session.push_message(ChatMessage::ai(format!(
                    "Analysis complete. I detected {} input fields.",
                    count
                )));
            }
            Err(err) => {
                tracing::warn!(error = %err, "document analysis failed");
                self.session.set_load_error(err.detail());
                self.session.push_message(ChatMessage::ai(ANALYSIS_FAILED_MESSAGE));
            }
        }
        self.session.set_loading(false);
    }

    /// Starts the autofill interview.
    ///
    /// A no-op when no fields are detected or an interview is already
    /// running. On success the first question is appended and the mode
    /// switches to interview; if the question cannot be fetched the mode
    /// reverts to manual and no field is touched.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::RequestInFlight`] if another request is running.
    pub async fn start_auto_fill(&mut self) -> Result<()> {
        self.ensure_idle()?;

        if self.session.mode().is_interview() || !self.session.begin_interview() {
            return Ok(());
        }

        self.session.set_sending(true);
        match self
            .assistant
            .start_interview(self.session.fields().fields())
            .await
        {
            Ok(question) => {
                self.session
                    .push_message(ChatMessage::interview_question(question));
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to start interview");
                self.session
                    .push_message(ChatMessage::ai(INTERVIEW_START_FAILED_MESSAGE));
                self.session.end_interview();
            }
        }
        self.session.set_sending(false);
        Ok(())
    }

    /// Single dispatch point for a submitted chat line.
    ///
    /// Blank input is ignored. The user's message is echoed into the
    /// transcript before the round-trip starts, then the line is routed by
    /// the current mode: interview answers go to the extraction step, manual
    /// questions to the free-form assistant.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::RequestInFlight`] if another request is running.
    pub async fn handle_input(&mut self, input: &str) -> Result<()> {
        self.ensure_idle()?;

        let text = input.trim();
        if text.is_empty() {
            return Ok(());
        }

        self.session.push_message(ChatMessage::user(text));
        self.session.set_sending(true);
        match self.session.mode() {
            SessionMode::Interview => self.submit_interview_answer(text).await,
            SessionMode::Manual => self.ask_assistant(text).await,
        }
        self.session.set_sending(false);
        Ok(())
    }

    /// Runs one interview step over the user's answer.
    async fn submit_interview_answer(&mut self, answer: &str) {
        let turn = match self
            .assistant
            .process_answer(answer, self.session.fields().fields())
            .await
        {
            Ok(turn) => turn,
            Err(err) => {
                tracing::warn!(error = %err, "interview step failed");
                self.session.push_message(ChatMessage::ai(format!(
                    "Error processing the answer: {}",
                    err.detail()
                )));
                // Mode stays at interview so the answer can be re-submitted.
                return;
            }
        };

        let filled = self.session.merge_extracted(&turn.extracted);
        if filled > 0 {
            tracing::info!(filled, "autofill merged extracted values");
            self.session.push_message(ChatMessage::system(format!(
                "{} field(s) automatically filled.",
                filled
            )));
        }

        match turn.next_question {
            Some(question) => {
                self.session
                    .push_message(ChatMessage::interview_question(question));
            }
            None => {
                self.session
                    .push_message(ChatMessage::ai(INTERVIEW_FINISHED_MESSAGE));
                self.session.end_interview();
            }
        }
    }

    /// Forwards a free-form question with the active-field context.
    async fn ask_assistant(&mut self, query: &str) {
        let context = self
            .session
            .active_field()
            .map(FieldContext::for_field)
            .unwrap_or_else(FieldContext::general);

        match self.assistant.ask(query, &context).await {
            Ok(reply) => self.session.push_message(ChatMessage::ai(reply)),
            Err(err) => {
                tracing::warn!(error = %err, "manual query failed");
                self.session
                    .push_message(ChatMessage::ai(MANUAL_QUERY_FAILED_MESSAGE));
            }
        }
    }

    /// Selects a field for manual-mode context, or clears the selection.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error for an identifier not in the registry.
    pub fn set_active_field(&mut self, field_id: Option<&str>) -> Result<()> {
        self.session.set_active_field(field_id)
    }

    /// Drops the current document while keeping the conversation.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::RequestInFlight`] if another request is running.
    pub fn clear_document(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.session.clear_document();
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.session.is_busy() {
            return Err(FormError::RequestInFlight);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut FormSession {
        &mut self.session
    }
}
