//! Authentication gate in front of the task UI.
//!
//! # Responsibility
//! - Expose the unlock state as a single boolean capability.
//! - Keep the platform prompt behind the `Authenticator` trait.

pub mod gate;
