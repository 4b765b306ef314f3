//! Session domain module.
//!
//! This module contains the session aggregate and its building blocks.
//!
//! # Module Structure
//!
//! - `model`: Session aggregate (`FormSession`) and the rendered-document handle
//! - `message`: Transcript types (`MessageRole`, `ChatMessage`, `Transcript`)
//! - `mode`: Conversational mode (`SessionMode`)

mod message;
mod mode;
mod model;

// Re-export public API
pub use message::{ChatMessage, MessageRole, Transcript};
pub use mode::SessionMode;
pub use model::{
    ANALYSIS_IN_PROGRESS_MESSAGE, FormSession, GREETING_MESSAGE, RenderedDocument,
};
