//! Clinic Reports MCP Server Implementation
//!
//! Implements the MCP server with one tool per report kind plus a status tool.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::error;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ReportError;
use crate::models::ReportSpec;
use crate::report::ReportKind;
use crate::tools::reports::ReportService;
use crate::tools::status::StatusTracker;

/// Clinic Reports MCP Service
#[derive(Clone)]
pub struct ClinicReportsService {
    config: Arc<Config>,
    reports: ReportService,
    status_tracker: Arc<Mutex<StatusTracker>>,
    tool_router: ToolRouter<ClinicReportsService>,
}

impl ClinicReportsService {
    pub fn new(config: Config) -> Self {
        let reports = ReportService::new(ApiClient::new(config.api_base_url.clone()));
        let status_tracker = StatusTracker::new(config.api_base_url.clone(), config.reports_dir.clone());
        Self {
            config: Arc::new(config),
            reports,
            status_tracker: Arc::new(Mutex::new(status_tracker)),
            tool_router: Self::tool_router(),
        }
    }

    /// Generate, write and describe one report; failures carry only the public message
    async fn run_report(
        &self,
        kind: ReportKind,
        token: Option<String>,
        spec: ReportSpec,
    ) -> Result<CallToolResult, McpError> {
        let token = token
            .or_else(|| self.config.default_token.clone())
            .unwrap_or_default();

        let result = self
            .reports
            .generate_to_dir(kind, &token, spec, &self.config.reports_dir)
            .await;

        let mut tracker = self.status_tracker.lock().await;
        match result {
            Ok(response) => {
                tracker.record_success(kind);
                let json = serde_json::to_string_pretty(&response)
                    .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            Err(e) => {
                tracker.record_failure();
                error!(kind = kind.slug(), status = e.status_code(), error = %e, "report generation failed");
                Err(to_mcp_error(&e))
            }
        }
    }
}

fn to_mcp_error(e: &ReportError) -> McpError {
    let data = Some(serde_json::json!({ "status": e.status_code() }));
    match e {
        ReportError::Precondition(_) => McpError::invalid_params(e.public_message(), data),
        _ => McpError::internal_error(e.public_message(), data),
    }
}

// ============================================================================
// Tool Parameter Structs
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ReportFilterParams {
    /// Bearer credential forwarded to the clinic API (defaults to CLINIC_API_TOKEN)
    pub token: Option<String>,
    /// Start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Doctor ID, or "all"
    pub doctor_id: Option<String>,
    /// Patient ID, or "all"
    pub patient_id: Option<String>,
    /// Appointment status (e.g. completed, pending, cancelled), or "all"
    pub status: Option<String>,
}

impl ReportFilterParams {
    fn into_parts(self) -> (Option<String>, ReportSpec) {
        let spec = ReportSpec {
            start_date: self.start_date,
            end_date: self.end_date,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            status: self.status,
        };
        (self.token, spec)
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SensorReportParams {
    /// Bearer credential forwarded to the clinic API (defaults to CLINIC_API_TOKEN)
    pub token: Option<String>,
    /// Start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Patient ID, or "all"
    pub patient_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PatientReportParams {
    /// Bearer credential forwarded to the clinic API (defaults to CLINIC_API_TOKEN)
    pub token: Option<String>,
    /// Patient ID
    pub patient_id: String,
}

impl PatientReportParams {
    fn into_parts(self) -> (Option<String>, ReportSpec) {
        let spec = ReportSpec { patient_id: Some(self.patient_id), ..Default::default() };
        (self.token, spec)
    }
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl ClinicReportsService {
    // --- Status ---

    #[tool(description = "Get the current status of the report service including build info, upstream API, output directory, process information and report counts")]
    async fn report_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Reports ---

    #[tool(description = "Generate the appointments PDF report: applied filters, a detail table (date, time, patient, doctor, status, amount) and totals. All filters are optional; \"all\" means no filter.")]
    async fn generate_appointments_report(&self, Parameters(p): Parameters<ReportFilterParams>) -> Result<CallToolResult, McpError> {
        let (token, spec) = p.into_parts();
        self.run_report(ReportKind::Appointments, token, spec).await
    }

    #[tool(description = "Generate the general PDF report: total appointments, status distribution, appointments per doctor and the daily trend, filtered by date range, doctor and status.")]
    async fn generate_general_report(&self, Parameters(p): Parameters<ReportFilterParams>) -> Result<CallToolResult, McpError> {
        let (token, spec) = p.into_parts();
        self.run_report(ReportKind::General, token, spec).await
    }

    #[tool(description = "Generate the IoT sensor PDF report: pulse and force charts over every measurement and per-session averages, optionally filtered by date range and patient.")]
    async fn generate_sensor_report(&self, Parameters(p): Parameters<SensorReportParams>) -> Result<CallToolResult, McpError> {
        let spec = ReportSpec {
            start_date: p.start_date,
            end_date: p.end_date,
            patient_id: p.patient_id,
            ..Default::default()
        };
        self.run_report(ReportKind::Sensor, p.token, spec).await
    }

    #[tool(description = "Generate a patient's medical history PDF: patient information, appointment progress and one page per appointment with its sensor charts when available.")]
    async fn generate_history_report(&self, Parameters(p): Parameters<PatientReportParams>) -> Result<CallToolResult, McpError> {
        let (token, spec) = p.into_parts();
        self.run_report(ReportKind::History, token, spec).await
    }

    #[tool(description = "Generate a patient's clinical record PDF: patient details, diagnosis, treatment, notes and record timestamps.")]
    async fn generate_patient_record(&self, Parameters(p): Parameters<PatientReportParams>) -> Result<CallToolResult, McpError> {
        let (token, spec) = p.into_parts();
        self.run_report(ReportKind::PatientRecord, token, spec).await
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for ClinicReportsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "clinic-reports".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Clinic Reports".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Clinic Reports - PDF reports from the clinic API. \
                 Reports: generate_appointments_report, generate_general_report, generate_sensor_report \
                 (filters: start_date, end_date, doctor_id, patient_id, status; \"all\" means unfiltered), \
                 generate_history_report and generate_patient_record (patient_id required). \
                 Each tool writes the PDF to the reports directory and returns its path. \
                 Pass token to forward a bearer credential; otherwise CLINIC_API_TOKEN is used. \
                 Status: report_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_filter_params_into_spec() {
        let params = ReportFilterParams {
            token: Some("abc".into()),
            doctor_id: Some("all".into()),
            status: Some("completed".into()),
            ..Default::default()
        };
        let (token, spec) = params.into_parts();
        assert_eq!(token.as_deref(), Some("abc"));
        assert_eq!(spec.clone().normalized().doctor_id, None);
        assert_eq!(spec.status.as_deref(), Some("completed"));
    }

    #[test]
    fn test_error_mapping_keeps_detail_private() {
        let err = to_mcp_error(&ReportError::upstream(Some(503), "db password wrong"));
        assert!(!err.message.contains("password"));
        let err = to_mcp_error(&ReportError::Precondition("patient_id".into()));
        assert!(err.message.contains("patient_id"));
    }

    #[tokio::test]
    async fn test_missing_credential_counts_as_failure() {
        let service = ClinicReportsService::new(Config::new("http://127.0.0.1:9", PathBuf::from("/tmp/clinic-reports-test")));
        let result = service
            .run_report(ReportKind::General, None, ReportSpec::default())
            .await;
        assert!(result.is_err());
        let status = service.status_tracker.lock().await.get_status();
        assert_eq!(status.reports_failed, 1);
        assert_eq!(status.reports_generated, 0);
    }
}
