//! Clinical record: patient details followed by diagnosis, treatment and notes

use super::common;
use super::PatientRecordData;
use crate::error::ReportResult;
use crate::report::document::Document;
use crate::report::format;
use crate::report::layout::{LayoutEngine, Run, TextOptions};
use crate::report::metrics::FontStyle;
use crate::report::theme::{COLOR_TEXT_DARK, COLOR_TEXT_MEDIUM};

pub fn compose(data: &PatientRecordData) -> ReportResult<Document> {
    let patient = &data.patient;
    let record = &data.record;

    let mut engine = common::start("Clinical Record")?;
    common::header_band(&mut engine, "Clinical Record")?;
    common::report_title(&mut engine, "Patient Clinical Record")?;

    common::section_title(&mut engine, "Patient Information", 14.0, 25.0)?;
    let name = patient.full_name();
    let rows = [
        ("Full name", if name.is_empty() { format::NOT_AVAILABLE.to_string() } else { name }),
        ("Age", format::measurement(patient.age, "years")),
        ("Gender", patient.gender_display().to_string()),
        ("Blood type", patient.blood_type.clone().unwrap_or_else(|| format::NOT_AVAILABLE.to_string())),
        ("Weight", format::measurement(patient.weight, "kg")),
        ("Height", format::measurement(patient.height, "cm")),
    ];
    let left = engine.left();
    for (label, value) in rows {
        let next = engine.place_runs(&[Run::bold(format!("{}:", label)), Run::regular(format!(" {}", value))], left, None, 11.0)?;
        engine.set_y(next + 4.0);
    }
    engine.advance(16.0);

    common::ensure_room(&mut engine, 80.0)?;
    common::section_title(&mut engine, "Clinical Record", 14.0, 25.0)?;
    paragraph(&mut engine, "Diagnosis", &record.diagnosis)?;
    paragraph(&mut engine, "Treatment", &record.treatment)?;
    if let Some(notes) = record.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        paragraph(&mut engine, "Notes", notes)?;
    }

    let stamp = |value: &Option<String>| {
        value
            .as_deref()
            .map(format::display_timestamp)
            .unwrap_or_else(|| format::NOT_AVAILABLE.to_string())
    };
    common::ensure_room(&mut engine, 30.0)?;
    let muted = TextOptions::new(10.0).color(COLOR_TEXT_MEDIUM);
    engine.place_text(&format!("Created: {}", stamp(&record.created_at)), left, None, &muted)?;
    engine.place_text(&format!("Last updated: {}", stamp(&record.updated_at)), left, None, &muted)?;

    Ok(common::finish(engine))
}

/// Bold heading followed by wrapped body text, moving to a new page if the heading would be orphaned
fn paragraph(engine: &mut LayoutEngine, heading: &str, body: &str) -> ReportResult<()> {
    let width = engine.content_width();
    let body = if body.trim().is_empty() { format::NOT_AVAILABLE } else { body };
    let height = 20.0 + engine.measure(body, FontStyle::Regular, 11.0, width);
    if !engine.ensure_space(height.min(80.0)) {
        engine.next_page()?;
    }

    let left = engine.left();
    engine.place_text(heading, left, None, &TextOptions::new(12.0).bold().color(COLOR_TEXT_DARK))?;
    engine.advance(4.0);
    common::place_wrapped(engine, body, &TextOptions::new(11.0).width(width))?;
    engine.advance(12.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MedicalRecord, Patient};

    fn data(notes: Option<&str>) -> PatientRecordData {
        PatientRecordData {
            patient: Patient {
                id: Some("3".into()),
                nombre: "José".into(),
                apellido_p: "Pérez".into(),
                age: Some(51.0),
                weight: Some(80.5),
                height: Some(175.0),
                gender: Some("masculino".into()),
                blood_type: Some("O+".into()),
                ..Default::default()
            },
            record: MedicalRecord {
                patient_id: Some("3".into()),
                diagnosis: "Carpal tunnel syndrome".into(),
                treatment: "Splint and grip exercises".into(),
                notes: notes.map(str::to_string),
                created_at: Some("2024-03-01T09:15:00Z".into()),
                updated_at: None,
            },
        }
    }

    #[test]
    fn test_record_sections() {
        let document = compose(&data(Some("Review in 6 weeks"))).unwrap();
        let texts: Vec<&str> = document.texts().collect();
        assert!(texts.contains(&"Jose Perez"));
        assert!(texts.contains(&"Male"));
        assert!(texts.contains(&"80.5 kg"));
        assert!(texts.contains(&"Carpal tunnel syndrome"));
        assert!(texts.contains(&"Notes"));
        assert!(texts.contains(&"Created: 01/03/2024 09:15"));
        assert!(texts.contains(&"Last updated: N/A"));
    }

    #[test]
    fn test_notes_optional() {
        let document = compose(&data(None)).unwrap();
        assert!(!document.texts().any(|t| t == "Notes"));
    }

    #[test]
    fn test_long_treatment_continues_on_next_page() {
        let mut input = data(None);
        input.record.treatment = "Daily stretching and grip strengthening. ".repeat(200);
        let document = compose(&input).unwrap();
        assert!(document.page_count() > 1);
        common::assert_within_content_area(&document);
    }
}
