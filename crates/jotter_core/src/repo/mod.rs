//! Repository layer.
//!
//! # Responsibility
//! - Define the note collection contract used by services and FFI.
//! - Keep wire encoding and preference-store details out of callers.
//!
//! # Invariants
//! - Every mutation is a whole-collection read-modify-write.
//! - Repositories persist values as given; they never stamp timestamps.

pub mod note_repo;
