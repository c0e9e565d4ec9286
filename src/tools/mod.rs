//! Clinic Reports tools module
//!
//! Request-level operations behind the MCP tools.

pub mod reports;
pub mod status;
