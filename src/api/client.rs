//! Clinic REST API client
//!
//! Thin async wrapper over the upstream endpoints. Every call forwards the caller's bearer
//! credential unchanged and normalizes the payload into canonical records.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{ReportError, ReportResult};
use crate::models::{Appointment, Doctor, MedicalRecord, Patient, ReportSpec, SensorRecord};

/// Client for the clinic REST API
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("clinic-reports/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON document; non-2xx responses become [`ReportError::Upstream`]
    async fn get_json(&self, token: &str, path: &str, query: &[(&str, String)]) -> ReportResult<Value> {
        let url = self.url(path);
        debug!(url = %url, params = query.len(), "fetching");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::upstream(
                Some(status.as_u16()),
                format!("GET {} returned {}: {}", path, status, body.chars().take(200).collect::<String>()),
            ));
        }

        Ok(response.json::<Value>().await?)
    }

    // ========================================================================
    // Appointments
    // ========================================================================

    /// Filtered appointments for the appointments report
    pub async fn report_appointments(&self, token: &str, spec: &ReportSpec) -> ReportResult<Vec<Appointment>> {
        let value = self.get_json(token, "/reports/appointments", &spec.query_pairs()).await?;
        Appointment::list_from_json(value)
    }

    pub async fn appointments(&self, token: &str) -> ReportResult<Vec<Appointment>> {
        let value = self.get_json(token, "/appointments", &[]).await?;
        Appointment::list_from_json(value)
    }

    /// Appointments of one patient, with doctor names and notes
    pub async fn patient_appointment_details(&self, token: &str, patient_id: &str) -> ReportResult<Vec<Appointment>> {
        let query = [("patientId", patient_id.to_string())];
        let value = self.get_json(token, "/patients/appointments/details", &query).await?;
        Appointment::list_from_json(value)
    }

    // ========================================================================
    // People
    // ========================================================================

    pub async fn doctors(&self, token: &str) -> ReportResult<Vec<Doctor>> {
        let value = self.get_json(token, "/doctors", &[]).await?;
        Doctor::list_from_json(value)
    }

    pub async fn patients(&self, token: &str) -> ReportResult<Vec<Patient>> {
        let value = self.get_json(token, "/patients", &[]).await?;
        Patient::list_from_json(value)
    }

    /// One patient; the endpoint answers with either an object or a one-element array
    pub async fn patient(&self, token: &str, patient_id: &str) -> ReportResult<Patient> {
        let path = format!("/patients/{}", patient_id);
        let value = match self.get_json(token, &path, &[]).await {
            Err(e) if is_not_found(&e) => Value::Null,
            other => other?,
        };
        Patient::list_from_json(value)?
            .into_iter()
            .next()
            .ok_or_else(|| ReportError::NotFound("Patient".to_string()))
    }

    // ========================================================================
    // Sensor data and records
    // ========================================================================

    /// Sensor sessions filtered by date range and patient
    pub async fn sensor_records(&self, token: &str, spec: &ReportSpec) -> ReportResult<Vec<SensorRecord>> {
        let query: Vec<(&str, String)> = spec
            .query_pairs()
            .into_iter()
            .filter(|(key, _)| matches!(*key, "startDate" | "endDate" | "patientId"))
            .collect();
        let value = self.get_json(token, "/iot", &query).await?;
        SensorRecord::list_from_json(value)
    }

    /// Sensor sessions recorded during one appointment
    pub async fn sensor_for_appointment(&self, token: &str, appointment_id: &str) -> ReportResult<Vec<SensorRecord>> {
        let query = [("cita", appointment_id.to_string())];
        let value = self.get_json(token, "/iot", &query).await?;
        SensorRecord::list_from_json(value)
    }

    /// Fetch sensor sessions for many appointments concurrently
    ///
    /// A failed fetch is logged and contributes nothing; it never fails the others.
    pub async fn sensor_for_appointments(&self, token: &str, appointment_ids: Vec<String>) -> Vec<SensorRecord> {
        let mut set = JoinSet::new();
        for id in appointment_ids {
            let client = self.clone();
            let token = token.to_string();
            set.spawn(async move {
                let result = client.sensor_for_appointment(&token, &id).await;
                (id, result)
            });
        }

        let mut records = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(found))) => records.extend(found),
                Ok((id, Err(e))) => warn!(appointment = %id, error = %e, "sensor fetch failed, rendering without sensor data"),
                Err(e) => warn!(error = %e, "sensor fetch task failed"),
            }
        }
        records
    }

    pub async fn medical_records(&self, token: &str) -> ReportResult<Vec<MedicalRecord>> {
        let value = self.get_json(token, "/medical-records", &[]).await?;
        MedicalRecord::list_from_json(value)
    }
}

/// Whether an upstream error is a plain "not found"
pub fn is_not_found(error: &ReportError) -> bool {
    matches!(error, ReportError::Upstream { status: Some(s), .. } if *s == StatusCode::NOT_FOUND.as_u16())
}
