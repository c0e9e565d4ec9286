//! Clinic Reports Library
//!
//! PDF report generation for clinic appointments, patients and sensor data.

pub mod api;
pub mod build_info;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod report;
pub mod tools;
