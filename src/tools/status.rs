//! Clinic Reports Status Tool
//!
//! Provides runtime status information about the report service.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::report::ReportKind;

/// Service status information
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub api_base_url: String,
    pub reports_dir: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
    pub reports_generated: u64,
    pub reports_failed: u64,
    /// Successful reports per kind slug
    pub reports_by_kind: BTreeMap<String, u64>,
}

/// Status tracker for the service
pub struct StatusTracker {
    start_time: Instant,
    api_base_url: String,
    reports_dir: PathBuf,
    generated: BTreeMap<ReportKind, u64>,
    failed: u64,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(api_base_url: impl Into<String>, reports_dir: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            api_base_url: api_base_url.into(),
            reports_dir,
            generated: BTreeMap::new(),
            failed: 0,
        }
    }

    pub fn record_success(&mut self, kind: ReportKind) {
        *self.generated.entry(kind).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Get the current status
    pub fn get_status(&self) -> ServiceStatus {
        let build_info = BuildInfo::current();

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build_profile: build_info.build_profile,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            api_base_url: self.api_base_url.clone(),
            reports_dir: self.reports_dir.display().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            reports_generated: self.generated.values().sum(),
            reports_failed: self.failed,
            reports_by_kind: self
                .generated
                .iter()
                .map(|(kind, count)| (kind.slug().to_string(), *count))
                .collect(),
        }
    }
}
