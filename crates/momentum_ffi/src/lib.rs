//! Flutter-facing bindings for the Momentum core.

pub mod api;
