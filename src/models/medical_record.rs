//! Medical record model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::{self, first_of};
use crate::error::ReportResult;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawMedicalRecord {
    #[serde(default, deserialize_with = "de::opt_string")]
    id_pc: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    patient_id: Option<String>,
    #[serde(default, rename = "patientId", deserialize_with = "de::opt_string")]
    patient_id_camel: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    diagnosis: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    treatment: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    notes: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    updated_at: Option<String>,
}

/// Clinical file entry for one patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMedicalRecord")]
pub struct MedicalRecord {
    pub patient_id: Option<String>,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<RawMedicalRecord> for MedicalRecord {
    fn from(raw: RawMedicalRecord) -> Self {
        Self {
            patient_id: first_of([raw.id_pc, raw.patient_id, raw.patient_id_camel]),
            diagnosis: raw.diagnosis.unwrap_or_default(),
            treatment: raw.treatment.unwrap_or_default(),
            notes: raw.notes,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

impl MedicalRecord {
    pub fn list_from_json(value: Value) -> ReportResult<Vec<Self>> {
        Ok(de::list_from_value(value)?)
    }

    /// Find the record for a patient among all records
    pub fn find_for_patient<'a>(records: &'a [Self], patient_id: &str) -> Option<&'a Self> {
        records
            .iter()
            .find(|r| r.patient_id.as_deref() == Some(patient_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_for_patient() {
        let records = MedicalRecord::list_from_json(json!([
            {"id_pc": 1, "diagnosis": "Tendinitis", "treatment": "Rest"},
            {"patient_id": "2", "diagnosis": "Sprain", "treatment": "Ice", "notes": ""}
        ]))
        .unwrap();

        let found = MedicalRecord::find_for_patient(&records, "2").unwrap();
        assert_eq!(found.diagnosis, "Sprain");
        // empty notes normalize to absent
        assert_eq!(found.notes, None);
        assert!(MedicalRecord::find_for_patient(&records, "3").is_none());
    }
}
