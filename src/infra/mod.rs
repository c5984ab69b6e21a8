//! Outbound integrations.

pub mod api;
