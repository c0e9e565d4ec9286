//! Document composers, one per report kind
//!
//! Each composer takes already-fetched, normalized records and produces a finalized
//! [`Document`]. Composers never fetch; the service gathers a [`ReportInput`] first.

mod appointments;
mod common;
mod general;
mod history;
mod patient_record;
mod sensor;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chart::ChartRenderer;
use super::document::Document;
use crate::error::ReportResult;
use crate::models::{Appointment, Directory, Doctor, MedicalRecord, Patient, ReportSpec, SensorRecord};

pub use history::HistoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Appointments,
    General,
    Sensor,
    History,
    PatientRecord,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Appointments,
        ReportKind::General,
        ReportKind::Sensor,
        ReportKind::History,
        ReportKind::PatientRecord,
    ];

    /// Filename prefix
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::Appointments => "appointments-report",
            ReportKind::General => "general-report",
            ReportKind::Sensor => "sensor-report",
            ReportKind::History => "medical-history",
            ReportKind::PatientRecord => "clinical-record",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Appointments => "Appointments Report",
            ReportKind::General => "General Report",
            ReportKind::Sensor => "IoT Sensor Report",
            ReportKind::History => "Medical History",
            ReportKind::PatientRecord => "Clinical Record",
        }
    }

    /// Whether the report is about a single patient
    pub fn requires_patient(&self) -> bool {
        matches!(self, ReportKind::History | ReportKind::PatientRecord)
    }

    /// Accepts the filename slug or the snake_case kind name
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_lowercase().as_str() {
            "appointments-report" | "appointments" => Some(ReportKind::Appointments),
            "general-report" | "general" => Some(ReportKind::General),
            "sensor-report" | "sensor" | "iot" => Some(ReportKind::Sensor),
            "medical-history" | "history" => Some(ReportKind::History),
            "clinical-record" | "patient_record" => Some(ReportKind::PatientRecord),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentsData {
    pub spec: ReportSpec,
    pub appointments: Vec<Appointment>,
    pub directory: Directory,
}

#[derive(Debug, Clone, Default)]
pub struct GeneralData {
    pub spec: ReportSpec,
    pub appointments: Vec<Appointment>,
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Clone, Default)]
pub struct SensorData {
    pub spec: ReportSpec,
    pub records: Vec<SensorRecord>,
    /// Set when the report is filtered to one patient
    pub patient: Option<Patient>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryData {
    pub patient: Patient,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientRecordData {
    pub patient: Patient,
    pub record: MedicalRecord,
}

/// Everything one report needs, fetched up front
#[derive(Debug, Clone)]
pub enum ReportInput {
    Appointments(AppointmentsData),
    General(GeneralData),
    Sensor(SensorData),
    History(HistoryData),
    PatientRecord(PatientRecordData),
}

impl ReportInput {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportInput::Appointments(_) => ReportKind::Appointments,
            ReportInput::General(_) => ReportKind::General,
            ReportInput::Sensor(_) => ReportKind::Sensor,
            ReportInput::History(_) => ReportKind::History,
            ReportInput::PatientRecord(_) => ReportKind::PatientRecord,
        }
    }
}

/// Lay out a report and run the footer pass
pub fn compose(input: &ReportInput, charts: &ChartRenderer) -> ReportResult<Document> {
    let document = match input {
        ReportInput::Appointments(data) => appointments::compose(data)?,
        ReportInput::General(data) => general::compose(data, charts)?,
        ReportInput::Sensor(data) => sensor::compose(data, charts)?,
        ReportInput::History(data) => history::compose(data, charts)?,
        ReportInput::PatientRecord(data) => patient_record::compose(data)?,
    };
    debug!(kind = ?input.kind(), pages = document.page_count(), "composed report");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs() {
        let slugs: Vec<&str> = ReportKind::ALL.iter().map(ReportKind::slug).collect();
        assert_eq!(
            slugs,
            vec!["appointments-report", "general-report", "sensor-report", "medical-history", "clinical-record"]
        );
    }

    #[test]
    fn test_from_slug() {
        assert_eq!(ReportKind::from_slug("medical-history"), Some(ReportKind::History));
        assert_eq!(ReportKind::from_slug("patient_record"), Some(ReportKind::PatientRecord));
        assert_eq!(ReportKind::from_slug("General"), Some(ReportKind::General));
        assert_eq!(ReportKind::from_slug("invoices"), None);
    }

    #[test]
    fn test_every_kind_composes_finalized() {
        let charts = ChartRenderer::headless().with_size(120, 60);
        let inputs = vec![
            ReportInput::Appointments(AppointmentsData::default()),
            ReportInput::General(GeneralData::default()),
            ReportInput::Sensor(SensorData::default()),
            ReportInput::History(HistoryData::default()),
            ReportInput::PatientRecord(PatientRecordData::default()),
        ];
        for input in inputs {
            let document = compose(&input, &charts).unwrap();
            assert!(document.is_finalized(), "{:?}", input.kind());
            assert!(document.page_count() >= 1);
        }
    }
}
