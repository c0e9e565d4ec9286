//! Sensor (IoT) sample model
//!
//! One record per appointment session: arrays of pulse and grip-force readings linked to the
//! appointment through `cita`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use crate::error::ReportResult;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawSensorRecord {
    #[serde(default, deserialize_with = "de::opt_string")]
    cita: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    appointment_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    fecha: Option<String>,
    #[serde(default, deserialize_with = "de::f64_vec")]
    pulso: Vec<f64>,
    #[serde(default, deserialize_with = "de::f64_vec")]
    fuerza: Vec<f64>,
}

/// Canonical sensor record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSensorRecord")]
pub struct SensorRecord {
    /// Appointment linkage key, compared as a string
    pub cita: Option<String>,
    pub fecha: Option<String>,
    pub pulso: Vec<f64>,
    pub fuerza: Vec<f64>,
}

impl From<RawSensorRecord> for SensorRecord {
    fn from(raw: RawSensorRecord) -> Self {
        Self {
            cita: raw.cita.or(raw.appointment_id),
            fecha: raw.fecha,
            pulso: raw.pulso,
            fuerza: raw.fuerza,
        }
    }
}

impl SensorRecord {
    pub fn list_from_json(value: Value) -> ReportResult<Vec<Self>> {
        Ok(de::list_from_value(value)?)
    }

    /// Whether this record belongs to the given appointment id
    pub fn is_for_appointment(&self, appointment_id: &str) -> bool {
        self.cita.as_deref() == Some(appointment_id)
    }

    /// Both arrays present, as required for per-appointment detail charts
    pub fn has_readings(&self) -> bool {
        !self.pulso.is_empty() && !self.fuerza.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cita_is_string_keyed() {
        let records = SensorRecord::list_from_json(json!([
            {"cita": 42, "fecha": "2024-05-01", "pulso": [70, 72], "fuerza": [10.5]},
            {"appointment_id": "43", "pulso": null}
        ]))
        .unwrap();

        assert!(records[0].is_for_appointment("42"));
        assert!(!records[0].is_for_appointment("420"));
        assert!(records[0].has_readings());
        assert!(records[1].is_for_appointment("43"));
        assert!(!records[1].has_readings());
        assert_eq!(records[0].fecha.as_deref(), Some("2024-05-01"));
    }
}
