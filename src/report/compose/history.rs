//! Medical history report: patient summary, appointment progress and one page per appointment

use super::common::{self, Field};
use super::HistoryData;
use crate::error::ReportResult;
use crate::models::{Appointment, Patient, SensorRecord, StatusCategory};
use crate::report::chart::{ChartData, ChartKind, ChartRenderer, ChartStyle, Series};
use crate::report::document::Document;
use crate::report::format;
use crate::report::layout::{LayoutEngine, TextOptions};
use crate::report::metrics;
use crate::report::theme::{COLOR_FORCE, COLOR_PANEL, COLOR_PANEL_NEUTRAL, COLOR_PRIMARY, COLOR_PULSE};

/// An appointment paired with the sensor session recorded during it, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryEntry {
    pub appointment: Appointment,
    pub sensor: Option<SensorRecord>,
}

impl HistoryEntry {
    /// Pair each appointment with the first sensor record whose `cita` equals its id
    ///
    /// Records without both pulse and force readings are not paired. Records matching no
    /// appointment are dropped.
    pub fn join(appointments: Vec<Appointment>, records: &[SensorRecord]) -> Vec<Self> {
        appointments
            .into_iter()
            .map(|appointment| {
                let sensor = appointment.id.as_deref().and_then(|id| {
                    records
                        .iter()
                        .find(|r| r.is_for_appointment(id) && r.has_readings())
                        .cloned()
                });
                Self { appointment, sensor }
            })
            .collect()
    }
}

pub fn compose(data: &HistoryData, charts: &ChartRenderer) -> ReportResult<Document> {
    let patient = &data.patient;

    let mut engine = common::start("Medical History")?;
    common::header_band(&mut engine, "Medical History")?;
    common::report_title(&mut engine, "Patient Medical History")?;
    common::info_panel(&mut engine, Some("Patient Information"), &patient_fields(patient), COLOR_PANEL)?;

    if data.entries.is_empty() {
        common::section_title(&mut engine, "Appointment History", 16.0, 30.0)?;
        common::no_data(&mut engine, "No appointments recorded for this patient.")?;
        return Ok(common::finish(engine));
    }

    let labels = data
        .entries
        .iter()
        .map(|e| format::display_date(&e.appointment.date))
        .collect();
    let values = data
        .entries
        .iter()
        .map(|e| e.appointment.status_category().progress_value())
        .collect();
    let progress = ChartData::single(labels, Series::new("Appointment status", values, COLOR_PRIMARY));
    let style = ChartStyle {
        y_range: Some((0.0, 3.5)),
        y_ticks: [
            StatusCategory::Other,
            StatusCategory::Cancelled,
            StatusCategory::Pending,
            StatusCategory::Completed,
        ]
        .iter()
        .map(|c| (c.progress_value(), c.display_name().to_string()))
        .collect(),
        ..ChartStyle::default()
    };
    common::chart_block(&mut engine, charts, "Appointment History", ChartKind::Line, &progress, &style)?;

    for (n, entry) in data.entries.iter().enumerate() {
        engine.next_page()?;
        common::section_title(&mut engine, &format!("Appointment #{}", n + 1), 16.0, 30.0)?;

        let appointment = &entry.appointment;
        let doctor = appointment
            .doctor_name
            .clone()
            .unwrap_or_else(|| format::NOT_AVAILABLE.to_string());
        common::info_panel(
            &mut engine,
            None,
            &[
                vec![
                    Field::new("Date", format::display_date(&appointment.date)),
                    Field::new("Time", appointment.time.clone()),
                ],
                vec![
                    Field::new("Status", appointment.status_category().display_name()),
                    Field::new("Doctor", doctor),
                ],
            ],
            COLOR_PANEL_NEUTRAL,
        )?;

        if let Some(notes) = appointment.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            common::ensure_room(&mut engine, 2.0 * metrics::line_height(10.0))?;
            let left = engine.left();
            engine.place_text("Notes:", left, None, &TextOptions::new(10.0).bold())?;
            common::place_wrapped(&mut engine, notes, &TextOptions::new(10.0))?;
            engine.advance(15.0);
        }

        match &entry.sensor {
            Some(record) => sensor_charts(&mut engine, charts, record)?,
            None => {
                common::section_title(&mut engine, "Sensor Data", 14.0, 25.0)?;
                common::no_data(&mut engine, "No sensor data recorded for this appointment.")?;
            }
        }
    }

    Ok(common::finish(engine))
}

fn sensor_charts(
    engine: &mut LayoutEngine,
    charts: &ChartRenderer,
    record: &SensorRecord,
) -> ReportResult<()> {
    let labels = |len: usize| (1..=len).map(|i| format!("M{}", i)).collect::<Vec<_>>();
    let style = ChartStyle { fill_area: true, ..ChartStyle::default() };

    let pulse = ChartData::single(labels(record.pulso.len()), Series::new("Pulse", record.pulso.clone(), COLOR_PULSE));
    let title = format!("Pulse (average {} bpm)", format::average(&record.pulso));
    common::chart_block(engine, charts, &title, ChartKind::Line, &pulse, &style)?;

    let force = ChartData::single(labels(record.fuerza.len()), Series::new("Force", record.fuerza.clone(), COLOR_FORCE));
    let title = format!("Force (average {})", format::average(&record.fuerza));
    common::chart_block(engine, charts, &title, ChartKind::Line, &force, &style)
}

fn patient_fields(patient: &Patient) -> [Vec<Field>; 2] {
    let name = patient.full_name();
    [
        vec![
            Field::new("Name", if name.is_empty() { format::NOT_AVAILABLE.to_string() } else { name }),
            Field::new("Age", format::measurement(patient.age, "years")),
            Field::new("Gender", patient.gender_display()),
        ],
        vec![
            Field::new(
                "Blood type",
                patient.blood_type.clone().unwrap_or_else(|| format::NOT_AVAILABLE.to_string()),
            ),
            Field::new("Weight", format::measurement(patient.weight, "kg")),
            Field::new("Height", format::measurement(patient.height, "cm")),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(id: &str, status: &str) -> Appointment {
        Appointment {
            id: Some(id.into()),
            date: "2024-05-01".into(),
            time: "10:00".into(),
            status: status.into(),
            doctor_name: Some("Gregory House".into()),
            ..Default::default()
        }
    }

    fn record(cita: &str) -> SensorRecord {
        SensorRecord {
            cita: Some(cita.into()),
            fecha: Some("2024-05-01".into()),
            pulso: vec![70.0, 74.0],
            fuerza: vec![12.0, 14.0],
        }
    }

    #[test]
    fn test_join_pairs_by_id_string() {
        let entries = HistoryEntry::join(
            vec![appointment("42", "completed"), appointment("7", "pending")],
            &[record("99"), record("42")],
        );
        assert_eq!(entries[0].sensor.as_ref().and_then(|r| r.cita.as_deref()), Some("42"));
        assert_eq!(entries[1].sensor, None);
        // "99" matched no appointment and appears nowhere
        assert!(entries.iter().all(|e| e.sensor.as_ref().map(|r| r.cita.as_deref()) != Some(Some("99"))));
    }

    #[test]
    fn test_join_requires_both_readings() {
        let mut partial = record("42");
        partial.fuerza.clear();
        let entries = HistoryEntry::join(vec![appointment("42", "completed")], &[partial]);
        assert_eq!(entries[0].sensor, None);
    }

    #[test]
    fn test_one_page_per_appointment() {
        let data = HistoryData {
            patient: Patient {
                id: Some("3".into()),
                nombre: "Ana".into(),
                apellido_p: "Lopez".into(),
                age: Some(34.0),
                gender: Some("F".into()),
                ..Default::default()
            },
            entries: HistoryEntry::join(
                vec![appointment("42", "completed"), appointment("7", "cancelada")],
                &[record("42"), record("99")],
            ),
        };
        let charts = ChartRenderer::headless().with_size(120, 60);
        let document = compose(&data, &charts).unwrap();

        let pages = document.pages();
        let first_detail = pages.iter().position(|p| p.texts().any(|t| t == "Appointment #1")).unwrap();
        let second_detail = pages.iter().position(|p| p.texts().any(|t| t == "Appointment #2")).unwrap();
        assert!(first_detail > 0);
        assert!(second_detail > first_detail);

        let texts: Vec<&str> = document.texts().collect();
        assert!(texts.contains(&"Ana Lopez"));
        assert!(texts.contains(&"34 years"));
        assert!(texts.contains(&"Female"));
        assert!(texts.contains(&"Cancelled"));

        let detail_texts: Vec<&str> = pages[first_detail..second_detail].iter().flat_map(|p| p.texts()).collect();
        assert!(detail_texts.contains(&"Pulse (average 72.00 bpm)"));
        assert!(!detail_texts.iter().any(|t| t.starts_with("No sensor data")));

        let last: Vec<&str> = pages[second_detail..].iter().flat_map(|p| p.texts()).collect();
        assert!(last.iter().any(|t| t.starts_with("No sensor data")));
        assert!(!last.iter().any(|t| t.starts_with("Pulse (average")));
    }

    #[test]
    fn test_no_appointments_message() {
        let charts = ChartRenderer::headless().with_size(120, 60);
        let document = compose(&HistoryData::default(), &charts).unwrap();
        assert_eq!(document.page_count(), 1);
        assert!(document.texts().any(|t| t.starts_with("No appointments recorded")));
    }

    #[test]
    fn test_long_notes_stay_inside_content_area() {
        let mut long = appointment("42", "completed");
        long.notes = Some("Patient reports tingling in the fingers after long typing sessions. ".repeat(120));
        let data = HistoryData {
            patient: Patient { nombre: "Ana".into(), apellido_p: "Lopez".into(), ..Default::default() },
            entries: HistoryEntry::join(vec![long], &[record("42")]),
        };
        let charts = ChartRenderer::headless().with_size(120, 60);
        let document = compose(&data, &charts).unwrap();

        assert!(document.page_count() > 2);
        assert!(document.texts().any(|t| t == "Notes:"));
        assert!(document.texts().any(|t| t == "Pulse (average 72.00 bpm)"));
        common::assert_within_content_area(&document);
    }
}
