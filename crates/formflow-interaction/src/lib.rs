//! HTTP collaborator clients for FormFlow.
//!
//! Implements the `formflow-core` collaborator traits against the document
//! analysis and form assistant services.

mod analysis_client;
mod assistant_client;
pub mod config;
mod http;

pub use analysis_client::HttpDocumentAnalyzer;
pub use assistant_client::HttpFormAssistant;
pub use config::{FormFlowConfig, ServerConfig};
