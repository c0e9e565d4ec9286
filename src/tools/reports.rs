//! Report generation tools
//!
//! Fetch the records a report needs, compose and encode it off the async runtime, and hand
//! back the PDF bytes with a filename. The tool surface additionally writes the file to the
//! configured reports directory.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{ReportError, ReportResult};
use crate::models::{Directory, MedicalRecord, ReportSpec};
use crate::report::{
    compose, encode, AppointmentsData, ChartRenderer, GeneralData, HistoryData, HistoryEntry, PatientRecordData,
    ReportInput, ReportKind, SensorData,
};

pub const PDF_MIME: &str = "application/pdf";

// ============================================================================
// Response Types
// ============================================================================

/// A finished report
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub kind: ReportKind,
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
    pub pages: usize,
}

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub kind: String,
    pub file_path: String,
    pub filename: String,
    pub mime_type: String,
    pub pages: usize,
    pub size_bytes: usize,
    pub message: String,
}

/// `<report-kind>-<YYYY-MM-DD>.pdf`
pub fn report_filename(kind: ReportKind, date: NaiveDate) -> String {
    format!("{}-{}.pdf", kind.slug(), date.format("%Y-%m-%d"))
}

// ============================================================================
// Rendering
// ============================================================================

/// Compose, finalize and encode a report from already-fetched records
///
/// CPU-bound; async callers run it through [`ReportService::generate`], which moves it to
/// the blocking pool.
pub fn render(input: &ReportInput, charts: &ChartRenderer, date: NaiveDate) -> ReportResult<RenderedReport> {
    let kind = input.kind();
    let document = compose(input, charts)?;
    let bytes = encode(&document)?;
    Ok(RenderedReport {
        kind,
        filename: report_filename(kind, date),
        mime_type: PDF_MIME,
        pages: document.page_count(),
        bytes,
    })
}

/// Log a secondary fetch failure and continue with a fallback
fn or_warn<T>(result: ReportResult<T>, what: &str, fallback: T) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "{} unavailable, continuing without it", what);
        fallback
    })
}

// ============================================================================
// Service
// ============================================================================

/// Request-level entry point: credential + kind + filters → PDF
#[derive(Debug, Clone)]
pub struct ReportService {
    api: ApiClient,
    charts: ChartRenderer,
}

impl ReportService {
    pub fn new(api: ApiClient) -> Self {
        Self { api, charts: ChartRenderer::init() }
    }

    /// Use a specific chart renderer configuration (e.g. headless)
    pub fn with_charts(mut self, charts: ChartRenderer) -> Self {
        self.charts = charts;
        self
    }

    /// Generate one report
    ///
    /// The credential is forwarded verbatim to the clinic API. An empty credential and missing
    /// required filters are rejected before anything is fetched.
    pub async fn generate(&self, kind: ReportKind, token: &str, spec: ReportSpec) -> ReportResult<RenderedReport> {
        if token.trim().is_empty() {
            return Err(ReportError::Unauthenticated);
        }
        let spec = spec.normalized();
        if kind.requires_patient() {
            spec.require_patient_id()?;
        }

        let input = self.gather(kind, token, &spec).await?;

        let charts = self.charts.clone();
        let today = Local::now().date_naive();
        let report = tokio::task::spawn_blocking(move || render(&input, &charts, today))
            .await
            .map_err(|e| ReportError::Encoding(format!("render task failed: {}", e)))??;

        info!(
            kind = kind.slug(),
            pages = report.pages,
            bytes = report.bytes.len(),
            "generated report"
        );
        Ok(report)
    }

    /// Generate a report and write it to `dir`
    pub async fn generate_to_dir(
        &self,
        kind: ReportKind,
        token: &str,
        spec: ReportSpec,
        dir: &Path,
    ) -> ReportResult<GenerateReportResponse> {
        let report = self.generate(kind, token, spec).await?;
        let path = write_report(&report, dir).await?;
        Ok(GenerateReportResponse {
            success: true,
            kind: kind.slug().to_string(),
            file_path: path.display().to_string(),
            filename: report.filename.clone(),
            mime_type: report.mime_type.to_string(),
            pages: report.pages,
            size_bytes: report.bytes.len(),
            message: format!("{} generated ({} pages)", kind.title(), report.pages),
        })
    }

    /// Fetch everything one report needs
    async fn gather(&self, kind: ReportKind, token: &str, spec: &ReportSpec) -> ReportResult<ReportInput> {
        let api = &self.api;
        let input = match kind {
            ReportKind::Appointments => {
                let (appointments, patients, doctors) = tokio::join!(
                    api.report_appointments(token, spec),
                    api.patients(token),
                    api.doctors(token),
                );
                ReportInput::Appointments(AppointmentsData {
                    spec: spec.clone(),
                    appointments: appointments?,
                    directory: Directory::new(
                        or_warn(patients, "patient directory", Vec::new()),
                        or_warn(doctors, "doctor directory", Vec::new()),
                    ),
                })
            }
            ReportKind::General => {
                let (appointments, doctors) = tokio::join!(api.appointments(token), api.doctors(token));
                ReportInput::General(GeneralData {
                    spec: spec.clone(),
                    appointments: appointments?,
                    doctors: or_warn(doctors, "doctor directory", Vec::new()),
                })
            }
            ReportKind::Sensor => {
                let records = api.sensor_records(token, spec).await?;
                let patient = match spec.patient_id.as_deref() {
                    Some(id) => or_warn(api.patient(token, id).await.map(Some), "patient details", None),
                    None => None,
                };
                ReportInput::Sensor(SensorData { spec: spec.clone(), records, patient })
            }
            ReportKind::History => {
                let patient_id = spec.require_patient_id()?;
                let (patient, appointments) = tokio::join!(
                    api.patient(token, patient_id),
                    api.patient_appointment_details(token, patient_id),
                );
                let (patient, appointments) = (patient?, appointments?);
                let ids = appointments.iter().filter_map(|a| a.id.clone()).collect();
                let records = api.sensor_for_appointments(token, ids).await;
                ReportInput::History(HistoryData {
                    patient,
                    entries: HistoryEntry::join(appointments, &records),
                })
            }
            ReportKind::PatientRecord => {
                let patient_id = spec.require_patient_id()?;
                let (patient, records) = tokio::join!(api.patient(token, patient_id), api.medical_records(token));
                let (patient, records) = (patient?, records?);
                let record = MedicalRecord::find_for_patient(&records, patient_id)
                    .cloned()
                    .ok_or_else(|| ReportError::NotFound("Medical record".to_string()))?;
                ReportInput::PatientRecord(PatientRecordData { patient, record })
            }
        };
        Ok(input)
    }
}

async fn write_report(report: &RenderedReport, dir: &Path) -> ReportResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&report.filename);
    tokio::fs::write(&path, &report.bytes).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Appointment;

    fn offline_service() -> ReportService {
        ReportService::new(ApiClient::new("http://127.0.0.1:9"))
            .with_charts(ChartRenderer::headless().with_size(160, 80))
    }

    fn sample_input() -> ReportInput {
        let appointment = |status: &str, amount: f64| Appointment {
            id: Some(status.into()),
            date: "2024-05-01".into(),
            status: status.into(),
            payment_amount: amount,
            ..Default::default()
        };
        ReportInput::Appointments(AppointmentsData {
            spec: ReportSpec::default(),
            appointments: vec![
                appointment("completed", 100.5),
                appointment("pending", 200.0),
                appointment("cancelled", 50.25),
            ],
            directory: Directory::default(),
        })
    }

    #[test]
    fn test_report_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(report_filename(ReportKind::Appointments, date), "appointments-report-2024-05-01.pdf");
        assert_eq!(report_filename(ReportKind::PatientRecord, date), "clinical-record-2024-05-01.pdf");
    }

    #[test]
    fn test_render_produces_pdf() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let charts = ChartRenderer::headless().with_size(160, 80);
        let report = render(&sample_input(), &charts, date).unwrap();
        assert!(report.bytes.starts_with(b"%PDF-"));
        assert_eq!(report.mime_type, "application/pdf");
        assert_eq!(report.filename, "appointments-report-2024-05-01.pdf");
        assert_eq!(report.pages, 1);
    }

    #[tokio::test]
    async fn test_empty_credential_rejected() {
        let err = offline_service()
            .generate(ReportKind::General, "  ", ReportSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Unauthenticated));
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_patient_reports_need_patient_id() {
        for kind in [ReportKind::History, ReportKind::PatientRecord] {
            let spec = ReportSpec { patient_id: Some("all".into()), ..Default::default() };
            let err = offline_service().generate(kind, "token", spec).await.unwrap_err();
            assert!(matches!(err, ReportError::Precondition(_)), "{:?}", kind);
            assert_eq!(err.status_code(), 400);
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_fails_request() {
        let err = offline_service()
            .generate(ReportKind::Appointments, "token", ReportSpec::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.public_message(), "Error fetching report data");
    }

    #[tokio::test]
    async fn test_write_report_to_dir() {
        let dir = std::env::temp_dir().join(format!("clinic-reports-test-{}", std::process::id()));
        let report = RenderedReport {
            kind: ReportKind::General,
            bytes: b"%PDF-1.3 test".to_vec(),
            filename: "general-report-2024-05-01.pdf".to_string(),
            mime_type: PDF_MIME,
            pages: 1,
        };
        let path = write_report(&report, &dir).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), report.bytes);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
