//! Collaborator service seams.
//!
//! The orchestrator consumes two external AI services: a document analyzer
//! that detects fillable fields on an uploaded form, and a form assistant
//! that answers contextual questions and runs the autofill interview. Both
//! are modeled as traits here so the application layer can be exercised with
//! in-memory fakes; the HTTP implementations live in `formflow-interaction`.

use crate::error::Result;
use crate::field::Field;
use crate::session::RenderedDocument;
use async_trait::async_trait;
use std::collections::HashMap;

/// Result of a successful document analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    /// Rendered representation of the first page.
    pub rendered_doc: RenderedDocument,
    /// Fields detected on the document, in detection order.
    pub fields: Vec<Field>,
}

/// One step of the interview protocol.
///
/// `extracted` maps stringified field `simple_id`s to values pulled from the
/// user's answer; `next_question` is absent when the interview is over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewTurn {
    pub extracted: HashMap<String, String>,
    pub next_question: Option<String>,
}

/// Context accompanying a free-form manual-mode question.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContext {
    pub label: String,
    pub explanation: String,
}

impl FieldContext {
    /// Context for a selected field.
    pub fn for_field(field: &Field) -> Self {
        Self {
            label: field.label.clone(),
            explanation: field.explanation.clone(),
        }
    }

    /// Sentinel context when no field is selected.
    pub fn general() -> Self {
        Self {
            label: "No field selected".to_string(),
            explanation: "General context".to_string(),
        }
    }
}

/// Detects fillable fields on a document.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Analyzes an uploaded file.
    async fn analyze_upload(&self, file_name: &str, content: Vec<u8>) -> Result<DocumentAnalysis>;

    /// Analyzes the server-provided example document.
    async fn analyze_example(&self) -> Result<DocumentAnalysis>;
}

/// Conversational backend for field questions and the autofill interview.
#[async_trait]
pub trait FormAssistant: Send + Sync {
    /// Opens the interview over the given fields; returns the first question.
    async fn start_interview(&self, fields: &[Field]) -> Result<String>;

    /// Feeds one user answer to the extraction step.
    async fn process_answer(&self, answer: &str, fields: &[Field]) -> Result<InterviewTurn>;

    /// Free-form question with optional field context.
    async fn ask(&self, query: &str, context: &FieldContext) -> Result<String>;
}
