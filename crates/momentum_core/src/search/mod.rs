//! Task list query entry points.
//!
//! # Responsibility
//! - Expose the in-memory search/filter/sort pipeline behind the task list.

pub mod filter;
