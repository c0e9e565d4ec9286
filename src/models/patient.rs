//! Patient and doctor models
//!
//! Both share the `nombre` / `apellido_p` / `apellido_m` naming of the clinic API; only the
//! id field aliases differ.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::{self, first_of};
use crate::error::ReportResult;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawPatient {
    #[serde(default, deserialize_with = "de::opt_string")]
    id_pc: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    patient_id: Option<String>,
    #[serde(default, rename = "patientId", deserialize_with = "de::opt_string")]
    patient_id_camel: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    nombre: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    apellido_p: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    apellido_m: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    age: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    weight: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    height: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    gender: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    blood_type: Option<String>,
}

/// Canonical patient record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPatient")]
pub struct Patient {
    pub id: Option<String>,
    pub nombre: String,
    pub apellido_p: String,
    pub apellido_m: String,
    pub age: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
}

impl From<RawPatient> for Patient {
    fn from(raw: RawPatient) -> Self {
        let id = first_of([raw.id_pc, raw.patient_id, raw.patient_id_camel]).or(raw.id);
        Self {
            id,
            nombre: raw.nombre.unwrap_or_default(),
            apellido_p: raw.apellido_p.unwrap_or_default(),
            apellido_m: raw.apellido_m.unwrap_or_default(),
            age: raw.age,
            weight: raw.weight,
            height: raw.height,
            gender: raw.gender,
            blood_type: raw.blood_type,
        }
    }
}

impl Patient {
    pub fn list_from_json(value: Value) -> ReportResult<Vec<Self>> {
        Ok(de::list_from_value(value)?)
    }

    pub fn full_name(&self) -> String {
        join_name(&[&self.nombre, &self.apellido_p, &self.apellido_m])
    }

    pub fn gender_display(&self) -> &'static str {
        match self.gender.as_deref().map(str::to_lowercase).as_deref() {
            Some("male") | Some("masculino") | Some("m") => "Male",
            Some("female") | Some("femenino") | Some("f") => "Female",
            _ => "Other",
        }
    }

    /// Legacy name match used only when appointments carry no patient id
    pub fn matches_name(&self, name: &str) -> bool {
        let wanted = normalize_name(name);
        !wanted.is_empty() && normalize_name(&self.full_name()) == wanted
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawDoctor {
    #[serde(default, deserialize_with = "de::opt_string")]
    id_dc: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    doctor_id: Option<String>,
    #[serde(default, rename = "doctorId", deserialize_with = "de::opt_string")]
    doctor_id_camel: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    nombre: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    apellido_p: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    apellido_m: Option<String>,
}

/// Canonical doctor record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDoctor")]
pub struct Doctor {
    pub id: Option<String>,
    pub nombre: String,
    pub apellido_p: String,
    pub apellido_m: String,
}

impl From<RawDoctor> for Doctor {
    fn from(raw: RawDoctor) -> Self {
        Self {
            id: first_of([raw.id_dc, raw.doctor_id, raw.doctor_id_camel]).or(raw.id),
            nombre: raw.nombre.unwrap_or_default(),
            apellido_p: raw.apellido_p.unwrap_or_default(),
            apellido_m: raw.apellido_m.unwrap_or_default(),
        }
    }
}

impl Doctor {
    pub fn list_from_json(value: Value) -> ReportResult<Vec<Self>> {
        Ok(de::list_from_value(value)?)
    }

    pub fn full_name(&self) -> String {
        join_name(&[&self.nombre, &self.apellido_p, &self.apellido_m])
    }

    /// First name and paternal surname, as used on chart axes
    pub fn short_name(&self) -> String {
        let nombre = if self.nombre.is_empty() { "Unnamed" } else { &self.nombre };
        join_name(&[nombre, &self.apellido_p])
    }
}

fn join_name(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, whitespace-collapsed form for name comparison
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patient_id_aliases() {
        let patients = Patient::list_from_json(json!([
            {"id_pc": 1, "nombre": "Ana"},
            {"patient_id": "2", "nombre": "Luis"},
            {"patientId": 3, "nombre": "Eva"},
            {"id": 4, "nombre": "Raul"}
        ]))
        .unwrap();
        let ids: Vec<_> = patients.iter().map(|p| p.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_full_name_skips_missing_parts() {
        let patient = Patient {
            nombre: "Ana".into(),
            apellido_p: "Lopez".into(),
            ..Default::default()
        };
        assert_eq!(patient.full_name(), "Ana Lopez");
    }

    #[test]
    fn test_gender_display() {
        let mut patient = Patient::default();
        patient.gender = Some("female".into());
        assert_eq!(patient.gender_display(), "Female");
        patient.gender = Some("MALE".into());
        assert_eq!(patient.gender_display(), "Male");
        patient.gender = None;
        assert_eq!(patient.gender_display(), "Other");
    }

    #[test]
    fn test_legacy_name_match() {
        let patient = Patient {
            nombre: "Ana".into(),
            apellido_p: "Lopez".into(),
            apellido_m: "Diaz".into(),
            ..Default::default()
        };
        assert!(patient.matches_name("  ana   LOPEZ diaz "));
        assert!(!patient.matches_name("Ana Lopez"));
        assert!(!patient.matches_name(""));
    }

    #[test]
    fn test_doctor_short_name() {
        let doctors = Doctor::list_from_json(json!({"id_dc": 9, "apellido_p": "House"})).unwrap();
        assert_eq!(doctors[0].id.as_deref(), Some("9"));
        assert_eq!(doctors[0].short_name(), "Unnamed House");
    }
}
