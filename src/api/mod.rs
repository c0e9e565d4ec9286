//! Upstream clinic API access

mod client;

pub use client::{is_not_found, ApiClient};
