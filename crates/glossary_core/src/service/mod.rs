//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Map repository errors to use-case errors and read back written state.
//! - Keep callers decoupled from storage details.

pub mod history_service;
pub mod term_service;
