//! Local notification boundary.
//!
//! # Responsibility
//! - Describe notification requests, trigger specs and host responses.
//! - Define the `NotificationCenter` capability injected into the scheduler.
//!
//! # Invariants
//! - Requests are keyed by reminder id; one live request per id.

pub mod center;
pub mod request;
pub mod trigger;
