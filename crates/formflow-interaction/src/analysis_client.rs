//! HTTP client for the document analysis service.
//!
//! The analysis service accepts a form document (uploaded bytes or a canned
//! server-side example), renders the first page, and returns the rendered
//! image together with the detected fillable fields.

use crate::http::{decode_failure, error_from_response, request_failure};
use async_trait::async_trait;
use formflow_core::collaborator::{DocumentAnalysis, DocumentAnalyzer};
use formflow_core::field::Field;
use formflow_core::session::RenderedDocument;
use formflow_core::Result;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;

/// Client implementation that talks to the analysis HTTP service.
#[derive(Clone)]
pub struct HttpDocumentAnalyzer {
    client: Client,
    base_url: String,
}

impl HttpDocumentAnalyzer {
    /// Creates a new client against the given endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_base_url(base_url.into()),
        }
    }

    async fn decode(response: reqwest::Response) -> Result<DocumentAnalysis> {
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload: AnalyzeResponse = response
            .json()
            .await
            .map_err(|err| decode_failure("analysis", err))?;

        Ok(payload.into_analysis())
    }
}

#[async_trait]
impl DocumentAnalyzer for HttpDocumentAnalyzer {
    async fn analyze_upload(&self, file_name: &str, content: Vec<u8>) -> Result<DocumentAnalysis> {
        tracing::info!(file_name, bytes = content.len(), "uploading document for analysis");

        let part = multipart::Part::bytes(content).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/analyze-doc", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|err| request_failure("analysis", err))?;

        Self::decode(response).await
    }

    async fn analyze_example(&self) -> Result<DocumentAnalysis> {
        tracing::info!("requesting example document analysis");

        let response = self
            .client
            .post(format!("{}/load-example", self.base_url))
            .send()
            .await
            .map_err(|err| request_failure("analysis", err))?;

        Self::decode(response).await
    }
}

fn trim_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    image_data: String,
    analysis: AnalysisPayload,
}

#[derive(Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    fields: Vec<Field>,
}

impl AnalyzeResponse {
    fn into_analysis(self) -> DocumentAnalysis {
        DocumentAnalysis {
            rendered_doc: RenderedDocument(self.image_data),
            fields: self.analysis.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::field::SimpleId;

    #[test]
    fn analyze_payload_decodes_fields() {
        let json = r#"{
            "image_data": "data:image/jpeg;base64,/9j/4AAQ",
            "analysis": {
                "fields": [{
                    "id": "137",
                    "simple_id": 1,
                    "label": "First name",
                    "explanation": "Given name of the applicant",
                    "top": 10.0, "left": 5.0, "width": 25.0, "height": 2.5
                }]
            }
        }"#;

        let payload: AnalyzeResponse = serde_json::from_str(json).unwrap();
        let analysis = payload.into_analysis();

        assert_eq!(analysis.rendered_doc.0, "data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(analysis.fields.len(), 1);
        assert_eq!(analysis.fields[0].simple_id, SimpleId::Number(1));
        assert_eq!(analysis.fields[0].value, None);
    }

    #[test]
    fn analyze_payload_tolerates_missing_field_list() {
        let json = r#"{ "image_data": "data:image/jpeg;base64,AAAA", "analysis": {} }"#;

        let payload: AnalyzeResponse = serde_json::from_str(json).unwrap();
        assert!(payload.into_analysis().fields.is_empty());
    }

    #[test]
    fn base_url_is_normalized() {
        let client = HttpDocumentAnalyzer::new("http://127.0.0.1:8000/");
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
    }
}
