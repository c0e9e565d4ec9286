//! Runtime configuration
//!
//! Resolved once at startup and passed into the services; request handling never reads the
//! environment.

use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the clinic REST API (no trailing slash)
    pub api_base_url: String,
    /// Directory where generated PDFs are written
    pub reports_dir: PathBuf,
    /// Default credential for the offline/CLI surfaces
    pub default_token: Option<String>,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>, reports_dir: PathBuf) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            reports_dir,
            default_token: None,
        }
    }

    /// Read `CLINIC_API_URL`, `CLINIC_REPORTS_DIR` and `CLINIC_API_TOKEN`
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("CLINIC_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let reports_dir = std::env::var("CLINIC_REPORTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_reports_dir());

        let default_token = std::env::var("CLINIC_API_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            default_token,
            ..Self::new(api_base_url, reports_dir)
        }
    }
}

/// `<project>/data/reports`, walking up from target/release or target/debug
fn default_reports_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("reports");
    path
}
