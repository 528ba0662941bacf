//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, scheduler and clock into task use-cases.
//! - Keep FFI layers decoupled from storage and notification details.

pub mod reminder_service;
pub mod stats_service;
pub mod task_service;
