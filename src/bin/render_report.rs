//! Render a report from a local JSON fixture, without the clinic API
//!
//! Usage: render_report <kind> <fixture.json> [output.pdf]
//!
//! The fixture is one JSON object holding the upstream payloads the report needs:
//! `spec`, `appointments`, `patients`, `doctors`, `patient`, `sensor`, `medical_records`.

use std::path::PathBuf;

use chrono::Local;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use clinic_reports::error::{ReportError, ReportResult};
use clinic_reports::models::{Appointment, Directory, Doctor, MedicalRecord, Patient, ReportSpec, SensorRecord};
use clinic_reports::report::{
    AppointmentsData, ChartRenderer, GeneralData, HistoryData, HistoryEntry, PatientRecordData, ReportInput,
    ReportKind, SensorData,
};
use clinic_reports::tools::reports::render;

fn field(fixture: &Value, key: &str) -> Value {
    fixture.get(key).cloned().unwrap_or(Value::Null)
}

fn input_from_fixture(kind: ReportKind, fixture: &Value) -> ReportResult<ReportInput> {
    let spec: ReportSpec = match fixture.get("spec") {
        Some(v) => serde_json::from_value::<ReportSpec>(v.clone())?.normalized(),
        None => ReportSpec::default(),
    };
    let appointments = Appointment::list_from_json(field(fixture, "appointments"))?;
    let patients = Patient::list_from_json(field(fixture, "patients"))?;
    let doctors = Doctor::list_from_json(field(fixture, "doctors"))?;
    let sensor = SensorRecord::list_from_json(field(fixture, "sensor"))?;
    let patient = Patient::list_from_json(field(fixture, "patient"))?.into_iter().next();

    let input = match kind {
        ReportKind::Appointments => ReportInput::Appointments(AppointmentsData {
            spec,
            appointments,
            directory: Directory::new(patients, doctors),
        }),
        ReportKind::General => ReportInput::General(GeneralData { spec, appointments, doctors }),
        ReportKind::Sensor => ReportInput::Sensor(SensorData { spec, records: sensor, patient }),
        ReportKind::History => ReportInput::History(HistoryData {
            patient: patient.ok_or_else(|| ReportError::NotFound("Patient".to_string()))?,
            entries: HistoryEntry::join(appointments, &sensor),
        }),
        ReportKind::PatientRecord => {
            let patient = patient.ok_or_else(|| ReportError::NotFound("Patient".to_string()))?;
            let records = MedicalRecord::list_from_json(field(fixture, "medical_records"))?;
            let record = patient
                .id
                .as_deref()
                .and_then(|id| MedicalRecord::find_for_patient(&records, id))
                .cloned()
                .ok_or_else(|| ReportError::NotFound("Medical record".to_string()))?;
            ReportInput::PatientRecord(PatientRecordData { patient, record })
        }
    };
    Ok(input)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("clinic_reports=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <kind> <fixture.json> [output.pdf]", args[0]);
        eprintln!(
            "Kinds: {}",
            ReportKind::ALL.iter().map(|k| k.slug()).collect::<Vec<_>>().join(", ")
        );
        std::process::exit(2);
    }

    let kind = ReportKind::from_slug(&args[1]).ok_or_else(|| format!("Unknown report kind: {}", args[1]))?;
    let fixture: Value = serde_json::from_str(&std::fs::read_to_string(&args[2])?)?;

    let input = input_from_fixture(kind, &fixture)?;
    let report = render(&input, &ChartRenderer::init(), Local::now().date_naive())?;

    let output = args.get(3).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(&report.filename));
    std::fs::write(&output, &report.bytes)?;

    println!("Report written: {}", output.display());
    println!("  Kind: {}", kind.title());
    println!("  Pages: {}", report.pages);
    println!("  Size: {} bytes", report.bytes.len());

    Ok(())
}
