//! Data models
//!
//! Canonical records normalized from the clinic REST API, plus report filters.

mod appointment;
pub mod de;
mod directory;
mod medical_record;
mod patient;
mod report_spec;
mod sensor;

pub use appointment::{Appointment, StatusCategory, StatusCounts};
pub use directory::Directory;
pub use medical_record::MedicalRecord;
pub use patient::{normalize_name, Doctor, Patient};
pub use report_spec::ReportSpec;
pub use sensor::SensorRecord;
