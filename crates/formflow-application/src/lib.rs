//! Application layer for FormFlow.
//!
//! Owns the [`SessionController`], the orchestrator that drives a form
//! session against the collaborator services.

pub mod controller;

pub use controller::SessionController;
