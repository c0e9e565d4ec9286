//! IoT sensor report: pulse and force charts over every measurement, per-session averages

use super::common::{self, Cell, Field, Table};
use super::SensorData;
use crate::error::ReportResult;
use crate::models::{ReportSpec, SensorRecord};
use crate::report::chart::{ChartData, ChartKind, ChartRenderer, ChartStyle, Series};
use crate::report::document::Document;
use crate::report::format;
use crate::report::theme::{pulse_color, COLOR_FORCE, COLOR_PANEL, COLOR_PULSE, COLOR_TEXT_DARK};

const HEADERS: [&str; 4] = ["Date", "Appointment ID", "Pulse (Average)", "Force (Average)"];
const COLUMNS: [f32; 4] = [60.0, 150.0, 280.0, 420.0];

pub fn compose(data: &SensorData, charts: &ChartRenderer) -> ReportResult<Document> {
    let spec = data.spec.clone().normalized();

    let mut engine = common::start("IoT Sensor Report")?;
    common::header_band(&mut engine, "IoT Report")?;
    common::report_title(&mut engine, "IoT Sensor Report")?;

    let patient = match (&data.patient, spec.patient_id.as_deref()) {
        (Some(patient), _) => patient.full_name(),
        (None, Some(id)) => id.to_string(),
        (None, None) => "All Patients".to_string(),
    };
    common::info_panel(
        &mut engine,
        Some("Applied Filters"),
        &[vec![Field::new("Period", period(&spec))], vec![Field::new("Patient", patient)]],
        COLOR_PANEL,
    )?;

    if data.records.is_empty() {
        common::no_data(&mut engine, "No sensor data found for the selected filters.")?;
        return Ok(common::finish(engine));
    }

    let (pulse_labels, pulse_values) = measurements(&data.records, |r| &r.pulso);
    let (force_labels, force_values) = measurements(&data.records, |r| &r.fuerza);
    let line = |title: &str| ChartStyle {
        y_label: Some(title.to_string()),
        fill_area: true,
        ..ChartStyle::default()
    };

    if pulse_values.is_empty() {
        common::section_title(&mut engine, "Pulse Measurements", 14.0, 25.0)?;
        common::no_data(&mut engine, "No pulse readings recorded.")?;
    } else {
        let data = ChartData::single(pulse_labels, Series::new("Pulse (bpm)", pulse_values, COLOR_PULSE));
        common::chart_block(&mut engine, charts, "Pulse Measurements", ChartKind::Line, &data, &line("bpm"))?;
    }

    if force_values.is_empty() {
        common::ensure_room(&mut engine, 60.0)?;
        common::section_title(&mut engine, "Force Measurements", 14.0, 25.0)?;
        common::no_data(&mut engine, "No force readings recorded.")?;
    } else {
        let data = ChartData::single(force_labels, Series::new("Force", force_values, COLOR_FORCE));
        common::chart_block(&mut engine, charts, "Force Measurements", ChartKind::Line, &data, &line("Force"))?;
    }

    common::ensure_room(&mut engine, 30.0 + 2.0 * common::ROW_HEIGHT)?;
    common::section_title(&mut engine, "Detailed Data", 14.0, 25.0)?;

    let mut table = Table::new(HEADERS.to_vec(), COLUMNS.to_vec());
    table.draw_header(&mut engine)?;
    for record in &data.records {
        let pulse_avg = format::mean(&record.pulso);
        let pulse_cell = match pulse_avg {
            Some(avg) => Cell::colored(format::decimal(Some(avg)), pulse_color(avg)),
            None => Cell::colored(format::NOT_AVAILABLE, COLOR_TEXT_DARK),
        };
        table.draw_row(
            &mut engine,
            vec![
                Cell::text(record_date(record)),
                Cell::text(record.cita.clone().unwrap_or_else(|| format::NOT_AVAILABLE.to_string())),
                pulse_cell,
                Cell::text(format::average(&record.fuerza)),
            ],
        )?;
    }

    let (pulse_total, force_total) = total_averages(&data.records);
    table.draw_total(
        &mut engine,
        vec![
            Cell::text("TOTAL AVERAGE"),
            Cell::text("-"),
            Cell::text(format::decimal(pulse_total)),
            Cell::text(format::decimal(force_total)),
        ],
    )?;

    Ok(common::finish(engine))
}

fn period(spec: &ReportSpec) -> String {
    let bound = |d: Option<&str>| d.map(format::display_date).unwrap_or_else(|| format::ALL.to_string());
    match (spec.start_date.as_deref(), spec.end_date.as_deref()) {
        (None, None) => format::ALL.to_string(),
        (start, end) => format!("{} - {}", bound(start), bound(end)),
    }
}

fn record_date(record: &SensorRecord) -> String {
    record
        .fecha
        .as_deref()
        .map(format::display_date)
        .unwrap_or_else(|| format::NOT_AVAILABLE.to_string())
}

/// Every reading across all records, labelled `<date> - M<n>` with `n` counting within a record
fn measurements<F>(records: &[SensorRecord], field: F) -> (Vec<String>, Vec<f64>)
where
    F: Fn(&SensorRecord) -> &Vec<f64>,
{
    let mut labels = Vec::new();
    let mut values = Vec::new();
    for record in records {
        let date = record_date(record);
        for (i, value) in field(record).iter().enumerate() {
            labels.push(format!("{} - M{}", date, i + 1));
            values.push(*value);
        }
    }
    (labels, values)
}

/// Mean of per-record averages over records that have readings
fn total_averages(records: &[SensorRecord]) -> (Option<f64>, Option<f64>) {
    let pulse: Vec<f64> = records.iter().filter_map(|r| format::mean(&r.pulso)).collect();
    let force: Vec<f64> = records.iter().filter_map(|r| format::mean(&r.fuerza)).collect();
    (format::mean(&pulse), format::mean(&force))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;
    use crate::report::document::DrawOp;
    use crate::report::theme::COLOR_DANGER;

    fn record(cita: &str, fecha: &str, pulso: Vec<f64>, fuerza: Vec<f64>) -> SensorRecord {
        SensorRecord { cita: Some(cita.into()), fecha: Some(fecha.into()), pulso, fuerza }
    }

    #[test]
    fn test_measurement_labels() {
        let records = vec![
            record("1", "2024-05-01", vec![70.0, 72.0], vec![10.0]),
            record("2", "2024-05-03", vec![80.0], vec![]),
        ];
        let (labels, values) = measurements(&records, |r| &r.pulso);
        assert_eq!(labels, vec!["01/05/2024 - M1", "01/05/2024 - M2", "03/05/2024 - M1"]);
        assert_eq!(values, vec![70.0, 72.0, 80.0]);
    }

    #[test]
    fn test_total_average_skips_empty_records() {
        let records = vec![
            record("1", "2024-05-01", vec![70.0, 80.0], vec![]),
            record("2", "2024-05-02", vec![90.0], vec![]),
        ];
        let (pulse, force) = total_averages(&records);
        assert_eq!(pulse, Some(82.5));
        assert_eq!(force, None);
        assert_eq!(format::decimal(force), "N/A");
    }

    #[test]
    fn test_table_rows_and_totals() {
        let data = SensorData {
            spec: ReportSpec::default(),
            records: vec![
                record("42", "2024-05-01", vec![110.0, 120.0], vec![10.0, 20.0]),
                record("43", "2024-05-02", vec![], vec![]),
            ],
            patient: Some(Patient { nombre: "Ana".into(), apellido_p: "Lopez".into(), ..Default::default() }),
        };
        let charts = ChartRenderer::headless().with_size(120, 60);
        let document = compose(&data, &charts).unwrap();
        let texts: Vec<&str> = document.texts().collect();
        assert!(texts.contains(&"Ana Lopez"));
        assert!(texts.contains(&"115.00"));
        assert!(texts.contains(&"15.00"));
        assert!(texts.contains(&"N/A"));
        assert!(texts.contains(&"TOTAL AVERAGE"));

        let high = document
            .pages()
            .iter()
            .flat_map(|p| p.ops())
            .find(|op| op.text() == Some("115.00"))
            .unwrap();
        match high {
            DrawOp::Text { color, .. } => assert_eq!(*color, COLOR_DANGER),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_empty_records_message() {
        let charts = ChartRenderer::headless().with_size(120, 60);
        let document = compose(&SensorData::default(), &charts).unwrap();
        assert!(document.texts().any(|t| t == "All Patients"));
        assert!(document.texts().any(|t| t.starts_with("No sensor data")));
    }
}
