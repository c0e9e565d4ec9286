//! Patient and doctor lookups
//!
//! Appointments reference people by id. The directory resolves those ids to display names,
//! falling back to names already embedded in the appointment payload.

use super::appointment::Appointment;
use super::patient::{Doctor, Patient};

#[derive(Debug, Clone, Default)]
pub struct Directory {
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
}

impl Directory {
    pub fn new(patients: Vec<Patient>, doctors: Vec<Doctor>) -> Self {
        Self { patients, doctors }
    }

    pub fn find_patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id.as_deref() == Some(id))
    }

    pub fn find_doctor(&self, id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id.as_deref() == Some(id))
    }

    /// Legacy lookup for payloads without linkage ids
    pub fn find_patient_by_name(&self, name: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.matches_name(name))
    }

    pub fn doctor_label(&self, doctor_id: Option<&str>) -> Option<String> {
        doctor_id
            .and_then(|id| self.find_doctor(id))
            .map(Doctor::full_name)
            .filter(|n| !n.is_empty())
    }

    pub fn patient_label(&self, patient_id: Option<&str>) -> Option<String> {
        patient_id
            .and_then(|id| self.find_patient(id))
            .map(Patient::full_name)
            .filter(|n| !n.is_empty())
    }

    pub fn appointment_doctor(&self, appointment: &Appointment) -> String {
        self.doctor_label(appointment.doctor_id.as_deref())
            .or_else(|| appointment.doctor_name.clone())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn appointment_patient(&self, appointment: &Appointment) -> String {
        if let Some(label) = self.patient_label(appointment.patient_id.as_deref()) {
            return label;
        }
        match appointment.patient_name.as_deref() {
            Some(name) if appointment.patient_id.is_none() => self
                .find_patient_by_name(name)
                .map(Patient::full_name)
                .unwrap_or_else(|| name.to_string()),
            Some(name) => name.to_string(),
            None => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(
            vec![Patient {
                id: Some("3".into()),
                nombre: "Ana".into(),
                apellido_p: "Lopez".into(),
                ..Default::default()
            }],
            vec![Doctor {
                id: Some("9".into()),
                nombre: "Gregory".into(),
                apellido_p: "House".into(),
                ..Default::default()
            }],
        )
    }

    #[test]
    fn test_appointment_labels_prefer_ids() {
        let dir = directory();
        let appointment = Appointment {
            patient_id: Some("3".into()),
            doctor_id: Some("9".into()),
            doctor_name: Some("Someone Else".into()),
            ..Default::default()
        };
        assert_eq!(dir.appointment_patient(&appointment), "Ana Lopez");
        assert_eq!(dir.appointment_doctor(&appointment), "Gregory House");
    }

    #[test]
    fn test_appointment_labels_fall_back() {
        let dir = directory();
        let appointment = Appointment {
            doctor_id: Some("404".into()),
            doctor_name: Some("Dr. Who".into()),
            ..Default::default()
        };
        assert_eq!(dir.appointment_doctor(&appointment), "Dr. Who");
        assert_eq!(dir.appointment_patient(&appointment), "N/A");
    }

    #[test]
    fn test_name_fallback_lookup() {
        let dir = directory();
        assert_eq!(dir.find_patient_by_name("ana lopez").and_then(|p| p.id.as_deref()), Some("3"));
        assert!(dir.find_patient_by_name("Luis").is_none());

        let unlinked = Appointment { patient_name: Some("ANA  lopez".into()), ..Default::default() };
        assert_eq!(dir.appointment_patient(&unlinked), "Ana Lopez");
    }
}
