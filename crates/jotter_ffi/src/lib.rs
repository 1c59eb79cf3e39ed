//! Flutter-facing bindings for jotter core.

pub mod api;
