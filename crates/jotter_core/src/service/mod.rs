//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and file store calls into UI-level use-cases.
//! - Keep FFI callers decoupled from storage details.

pub mod note_service;
