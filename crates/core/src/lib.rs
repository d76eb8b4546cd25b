//! Domain logic for the planforge platform.
//!
//! Pure, I/O-free building blocks shared by the database and API crates:
//! the error taxonomy, common id/timestamp types, generation request
//! validation and job-key derivation, and failure-message classification.

pub mod error;
pub mod generation;
pub mod messages;
pub mod types;
