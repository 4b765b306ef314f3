//! HTTP client for the form assistant service.
//!
//! The assistant service answers free-form questions about a selected field
//! and drives the autofill interview: it opens with a broad question over the
//! detected fields, then extracts values from each answer and decides whether
//! another question is needed.

use crate::http::{decode_failure, error_from_response, request_failure};
use async_trait::async_trait;
use formflow_core::collaborator::{FieldContext, FormAssistant, InterviewTurn};
use formflow_core::field::Field;
use formflow_core::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Client implementation that talks to the assistant HTTP service.
#[derive(Clone)]
pub struct HttpFormAssistant {
    client: Client,
    base_url: String,
}

impl HttpFormAssistant {
    /// Creates a new client against the given endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, operation: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|err| request_failure(operation, err))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|err| decode_failure(operation, err))
    }
}

#[async_trait]
impl FormAssistant for HttpFormAssistant {
    async fn start_interview(&self, fields: &[Field]) -> Result<String> {
        tracing::info!(field_count = fields.len(), "starting autofill interview");

        let request = StartInterviewRequest { fields };
        let response: StartInterviewResponse = self
            .post_json("/start-interview", "interview start", &request)
            .await?;

        Ok(response.question)
    }

    async fn process_answer(&self, answer: &str, fields: &[Field]) -> Result<InterviewTurn> {
        tracing::debug!(field_count = fields.len(), "submitting interview answer");

        let request = InterviewAnswerRequest {
            user_response: answer,
            fields,
        };
        let response: InterviewStepResponse = self
            .post_json("/process-interview-answer", "interview step", &request)
            .await?;

        Ok(response.into_turn())
    }

    async fn ask(&self, query: &str, context: &FieldContext) -> Result<String> {
        tracing::debug!(field = %context.label, "asking assistant");

        let request = AskRequest {
            user_query: query,
            current_field_label: &context.label,
            current_field_explanation: &context.explanation,
        };
        let response: AskResponse = self.post_json("/ask-assistant", "ask", &request).await?;

        Ok(response.reply)
    }
}

#[derive(Serialize)]
struct StartInterviewRequest<'a> {
    fields: &'a [Field],
}

#[derive(Deserialize)]
struct StartInterviewResponse {
    question: String,
}

#[derive(Serialize)]
struct InterviewAnswerRequest<'a> {
    user_response: &'a str,
    fields: &'a [Field],
}

#[derive(Deserialize)]
struct InterviewStepResponse {
    /// Values keyed by stringified field `simple_id`. Null entries are
    /// dropped rather than failing the decode.
    #[serde(default)]
    extracted_data: Option<HashMap<String, Option<String>>>,
    #[serde(default)]
    next_question: Option<String>,
}

impl InterviewStepResponse {
    fn into_turn(self) -> InterviewTurn {
        let extracted = self
            .extracted_data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();

        InterviewTurn {
            extracted,
            next_question: self.next_question,
        }
    }
}

#[derive(Serialize)]
struct AskRequest<'a> {
    user_query: &'a str,
    current_field_label: &'a str,
    current_field_explanation: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_response_maps_extraction_and_question() {
        let json = r#"{
            "extracted_data": { "1": "John", "2": "Doe" },
            "next_question": "What is your address?"
        }"#;

        let turn: InterviewTurn = serde_json::from_str::<InterviewStepResponse>(json)
            .unwrap()
            .into_turn();

        assert_eq!(turn.extracted.get("1").map(String::as_str), Some("John"));
        assert_eq!(turn.extracted.get("2").map(String::as_str), Some("Doe"));
        assert_eq!(turn.next_question.as_deref(), Some("What is your address?"));
    }

    #[test]
    fn step_response_with_null_question_ends_the_interview() {
        let json = r#"{ "extracted_data": { "1": "John" }, "next_question": null }"#;

        let turn = serde_json::from_str::<InterviewStepResponse>(json)
            .unwrap()
            .into_turn();

        assert_eq!(turn.next_question, None);
    }

    #[test]
    fn step_response_without_extraction_yields_empty_map() {
        let json = r#"{ "next_question": "Anything else?" }"#;

        let turn = serde_json::from_str::<InterviewStepResponse>(json)
            .unwrap()
            .into_turn();

        assert!(turn.extracted.is_empty());
    }

    #[test]
    fn null_extraction_values_are_dropped() {
        let json = r#"{ "extracted_data": { "1": "John", "2": null } }"#;

        let turn = serde_json::from_str::<InterviewStepResponse>(json)
            .unwrap()
            .into_turn();

        assert_eq!(turn.extracted.len(), 1);
        assert!(!turn.extracted.contains_key("2"));
    }

    #[test]
    fn ask_request_serializes_sentinel_context() {
        let context = FieldContext::general();
        let request = AskRequest {
            user_query: "How do I fill this form?",
            current_field_label: &context.label,
            current_field_explanation: &context.explanation,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["current_field_label"], "No field selected");
        assert_eq!(value["current_field_explanation"], "General context");
    }
}
