//! Appointment model
//!
//! Appointments arrive from two endpoints with different field names (`date` vs
//! `appointment_date`, `id_ap` vs `appointment_id`, ...). [`RawAppointment`] accepts all of
//! them and [`Appointment`] is the single canonical shape the composers see.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::{self, first_of};
use crate::error::ReportResult;

/// Status category used for counting and color-coding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Completed,
    Pending,
    Cancelled,
    Other,
}

impl StatusCategory {
    /// Case-insensitive exact match against the fixed status vocabulary
    pub fn classify(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "completed" | "completada" | "completa" | "realizada" => StatusCategory::Completed,
            "pending" | "pendiente" => StatusCategory::Pending,
            "cancelled" | "canceled" | "cancelada" => StatusCategory::Cancelled,
            _ => StatusCategory::Other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StatusCategory::Completed => "Completed",
            StatusCategory::Pending => "Pending",
            StatusCategory::Cancelled => "Cancelled",
            StatusCategory::Other => "Other",
        }
    }

    /// Ordinal used by the appointment progress chart
    pub fn progress_value(&self) -> f64 {
        match self {
            StatusCategory::Completed => 3.0,
            StatusCategory::Pending => 2.0,
            StatusCategory::Cancelled => 1.0,
            StatusCategory::Other => 0.0,
        }
    }
}

/// Appointment exactly as any upstream endpoint may send it
#[derive(Debug, Clone, Default, Deserialize)]
struct RawAppointment {
    #[serde(default, deserialize_with = "de::opt_string")]
    id_ap: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    appointment_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    id: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    appointment_date: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    appointment_time: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    appointment_status: Option<String>,

    #[serde(default, deserialize_with = "de::opt_f64")]
    payment_amount: Option<f64>,

    #[serde(default, deserialize_with = "de::opt_string")]
    id_pc: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    patient_id: Option<String>,
    #[serde(default, rename = "patientId", deserialize_with = "de::opt_string")]
    patient_id_camel: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    id_dc: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    doctor_id: Option<String>,
    #[serde(default, rename = "doctorId", deserialize_with = "de::opt_string")]
    doctor_id_camel: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    doctor_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    patient_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    notes: Option<String>,
}

/// Canonical appointment record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAppointment")]
pub struct Appointment {
    pub id: Option<String>,
    pub date: String,
    pub time: String,
    pub status: String,
    pub payment_amount: f64,
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
    pub notes: Option<String>,
}

impl From<RawAppointment> for Appointment {
    fn from(raw: RawAppointment) -> Self {
        Self {
            id: first_of([raw.id_ap, raw.appointment_id, raw.id]),
            date: raw.date.or(raw.appointment_date).unwrap_or_default(),
            time: raw.time.or(raw.appointment_time).unwrap_or_default(),
            status: raw.status.or(raw.appointment_status).unwrap_or_default(),
            payment_amount: raw.payment_amount.unwrap_or(0.0),
            patient_id: first_of([raw.id_pc, raw.patient_id, raw.patient_id_camel]),
            doctor_id: first_of([raw.id_dc, raw.doctor_id, raw.doctor_id_camel]),
            doctor_name: raw.doctor_name,
            patient_name: raw.patient_name,
            notes: raw.notes,
        }
    }
}

impl Appointment {
    /// Normalize an upstream payload (array, single object or null)
    pub fn list_from_json(value: Value) -> ReportResult<Vec<Self>> {
        Ok(de::list_from_value(value)?)
    }

    pub fn status_category(&self) -> StatusCategory {
        StatusCategory::classify(&self.status)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        de::parse_date(&self.date)
    }
}

/// Per-category appointment counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub completed: usize,
    pub pending: usize,
    pub cancelled: usize,
    pub other: usize,
}

impl StatusCounts {
    pub fn tally<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        let mut counts = Self::default();
        for appointment in appointments {
            match appointment.status_category() {
                StatusCategory::Completed => counts.completed += 1,
                StatusCategory::Pending => counts.pending += 1,
                StatusCategory::Cancelled => counts.cancelled += 1,
                StatusCategory::Other => counts.other += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.completed + self.pending + self.cancelled + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_vocabulary() {
        assert_eq!(StatusCategory::classify("completed"), StatusCategory::Completed);
        assert_eq!(StatusCategory::classify("Completada"), StatusCategory::Completed);
        assert_eq!(StatusCategory::classify("REALIZADA"), StatusCategory::Completed);
        assert_eq!(StatusCategory::classify("completa"), StatusCategory::Completed);
        assert_eq!(StatusCategory::classify("Pendiente"), StatusCategory::Pending);
        assert_eq!(StatusCategory::classify("canceled"), StatusCategory::Cancelled);
        assert_eq!(StatusCategory::classify("Cancelada"), StatusCategory::Cancelled);
        assert_eq!(StatusCategory::classify("rescheduled"), StatusCategory::Other);
        // exact match only, no fuzzy prefixes
        assert_eq!(StatusCategory::classify("completed-late"), StatusCategory::Other);
    }

    #[test]
    fn test_aliases_normalize_to_canonical_fields() {
        let list = Appointment::list_from_json(json!([
            {"id_ap": 1, "date": "2024-05-01", "time": "09:00", "status": "completed",
             "payment_amount": "100.5", "id_pc": 3, "id_dc": 9},
            {"appointment_id": "2", "appointment_date": "2024-05-02T00:00:00.000Z",
             "appointment_time": "10:00", "appointment_status": "pending",
             "patientId": "4", "doctor_name": "Dr. House"},
            {"id": 3, "status": "cancelled", "patient_id": 5, "doctorId": 8}
        ]))
        .unwrap();

        assert_eq!(list[0].id.as_deref(), Some("1"));
        assert_eq!(list[0].payment_amount, 100.5);
        assert_eq!(list[0].patient_id.as_deref(), Some("3"));
        assert_eq!(list[0].doctor_id.as_deref(), Some("9"));

        assert_eq!(list[1].id.as_deref(), Some("2"));
        assert_eq!(list[1].time, "10:00");
        assert_eq!(list[1].status, "pending");
        assert_eq!(list[1].patient_id.as_deref(), Some("4"));
        assert_eq!(list[1].parsed_date(), NaiveDate::from_ymd_opt(2024, 5, 2));

        assert_eq!(list[2].id.as_deref(), Some("3"));
        assert_eq!(list[2].patient_id.as_deref(), Some("5"));
        assert_eq!(list[2].doctor_id.as_deref(), Some("8"));
        assert_eq!(list[2].payment_amount, 0.0);
        assert_eq!(list[2].notes, None);
    }

    #[test]
    fn test_both_status_fields_present() {
        let list = Appointment::list_from_json(json!([
            {"appointment_id": 10, "status": "completed", "appointment_status": "Completada"}
        ]))
        .unwrap();
        assert_eq!(list[0].status, "completed");
    }

    #[test]
    fn test_status_counts_partition_total() {
        let statuses = ["completed", "PENDING", "cancelada", "no-show", "realizada", ""];
        let appointments: Vec<Appointment> = statuses
            .iter()
            .map(|s| Appointment { status: s.to_string(), ..Default::default() })
            .collect();

        let counts = StatusCounts::tally(&appointments);
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.cancelled, 1);
        assert_eq!(counts.other, 2);
        assert_eq!(counts.total(), appointments.len());
    }
}
