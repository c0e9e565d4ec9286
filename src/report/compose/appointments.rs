//! Appointments report: filter summary, detail table and totals

use super::common::{self, Cell, Field, Table};
use super::AppointmentsData;
use crate::error::ReportResult;
use crate::models::{Directory, ReportSpec, StatusCounts};
use crate::report::document::Document;
use crate::report::format;
use crate::report::theme::{status_color, COLOR_PANEL};

const HEADERS: [&str; 6] = ["Date", "Time", "Patient", "Doctor", "Status", "Amount"];
const COLUMNS: [f32; 6] = [60.0, 130.0, 180.0, 300.0, 420.0, 480.0];

pub fn compose(data: &AppointmentsData) -> ReportResult<Document> {
    let spec = data.spec.clone().normalized();
    let directory = &data.directory;
    let counts = StatusCounts::tally(&data.appointments);

    let mut engine = common::start("Appointments Report")?;
    common::header_band(&mut engine, "Medical Management System")?;
    common::report_title(&mut engine, "Appointments Report")?;

    common::info_panel(
        &mut engine,
        Some("Applied Filters"),
        &[
            vec![
                Field::new("Period", period(&spec)),
                Field::new("Doctor", doctor_filter(&spec, directory)),
                Field::new("Patient", patient_filter(&spec, directory)),
            ],
            vec![
                Field::new("Status", common::status_filter(&spec)),
                Field::new("Total appointments", counts.total().to_string()),
                Field::new("Completed", counts.completed.to_string()),
            ],
        ],
        COLOR_PANEL,
    )?;

    if data.appointments.is_empty() {
        common::no_data(&mut engine, "No appointments found for the selected filters.")?;
        return Ok(common::finish(engine));
    }

    let mut table = Table::new(HEADERS.to_vec(), COLUMNS.to_vec());
    table.draw_header(&mut engine)?;
    for appointment in &data.appointments {
        let category = appointment.status_category();
        table.draw_row(
            &mut engine,
            vec![
                Cell::text(format::display_date(&appointment.date)),
                Cell::text(appointment.time.clone()),
                Cell::text(format::truncate_name(&directory.appointment_patient(appointment))),
                Cell::text(format::truncate_name(&directory.appointment_doctor(appointment))),
                Cell::colored(common::status_label(&appointment.status, category), status_color(category)),
                Cell::text(format::currency(appointment.payment_amount)),
            ],
        )?;
    }

    let total: f64 = data.appointments.iter().map(|a| a.payment_amount).sum();
    table.draw_total(
        &mut engine,
        vec![
            Cell::text("TOTAL"),
            Cell::text(""),
            Cell::text(format!("Appointments: {}", data.appointments.len())),
            Cell::text(""),
            Cell::text(""),
            Cell::text(format::currency(total)),
        ],
    )?;

    Ok(common::finish(engine))
}

fn period(spec: &ReportSpec) -> String {
    match (&spec.start_date, &spec.end_date) {
        (None, None) => format::ALL.to_string(),
        (start, end) => format!(
            "{} - {}",
            start.as_deref().map(format::display_date).unwrap_or_else(|| format::ALL.to_string()),
            end.as_deref().map(format::display_date).unwrap_or_else(|| format::ALL.to_string()),
        ),
    }
}

fn doctor_filter(spec: &ReportSpec, directory: &Directory) -> String {
    match spec.doctor_id.as_deref() {
        Some(id) => directory.doctor_label(Some(id)).unwrap_or_else(|| id.to_string()),
        None => format::ALL.to_string(),
    }
}

fn patient_filter(spec: &ReportSpec, directory: &Directory) -> String {
    match spec.patient_id.as_deref() {
        Some(id) => directory.patient_label(Some(id)).unwrap_or_else(|| id.to_string()),
        None => format::ALL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, Doctor, Patient};

    fn appointment(id: &str, status: &str, amount: f64) -> Appointment {
        Appointment {
            id: Some(id.into()),
            date: "2024-05-01".into(),
            time: "09:00".into(),
            status: status.into(),
            payment_amount: amount,
            patient_id: Some("3".into()),
            doctor_id: Some("9".into()),
            ..Default::default()
        }
    }

    fn directory() -> Directory {
        Directory::new(
            vec![Patient { id: Some("3".into()), nombre: "Ana".into(), apellido_p: "Lopez".into(), ..Default::default() }],
            vec![Doctor { id: Some("9".into()), nombre: "Gregory".into(), apellido_p: "House".into(), ..Default::default() }],
        )
    }

    fn texts(document: &Document) -> Vec<String> {
        document.texts().map(str::to_string).collect()
    }

    #[test]
    fn test_three_appointments_end_to_end() {
        let data = AppointmentsData {
            spec: ReportSpec::default(),
            appointments: vec![
                appointment("1", "completed", 100.5),
                appointment("2", "pending", 200.0),
                appointment("3", "cancelled", 50.25),
            ],
            directory: directory(),
        };
        let document = compose(&data).unwrap();
        let texts = texts(&document);

        for amount in ["$100.50", "$200.00", "$50.25"] {
            assert!(texts.iter().any(|t| t == amount), "missing {}", amount);
        }
        assert!(texts.iter().any(|t| t == "Appointments: 3"));
        assert!(texts.iter().any(|t| t == "$350.75"));
        assert!(texts.iter().any(|t| t == "Ana Lopez"));
        assert!(texts.iter().any(|t| t == "Gregory House"));
        assert!(texts.iter().any(|t| t == "Completed"));
        assert!(texts.iter().any(|t| t == "Cancelled"));
        assert!(document.is_finalized());
        assert_eq!(document.page_count(), 1);
    }

    #[test]
    fn test_all_filter_renders_like_absent() {
        let appointments = vec![appointment("1", "completed", 10.0)];
        let absent = AppointmentsData {
            spec: ReportSpec::default(),
            appointments: appointments.clone(),
            directory: directory(),
        };
        let all = AppointmentsData {
            spec: ReportSpec {
                doctor_id: Some("all".into()),
                patient_id: Some("ALL".into()),
                status: Some("All".into()),
                ..Default::default()
            },
            appointments,
            directory: directory(),
        };
        assert_eq!(texts(&compose(&absent).unwrap()), texts(&compose(&all).unwrap()));
    }

    #[test]
    fn test_filters_resolve_names() {
        let data = AppointmentsData {
            spec: ReportSpec { doctor_id: Some("9".into()), status: Some("pendiente".into()), ..Default::default() },
            appointments: vec![],
            directory: directory(),
        };
        let texts = texts(&compose(&data).unwrap());
        assert!(texts.iter().any(|t| t == "Gregory House"));
        assert!(texts.iter().any(|t| t == "Pending"));
        assert!(texts.iter().any(|t| t.starts_with("No appointments found")));
    }

    #[test]
    fn test_long_table_repeats_header() {
        let appointments: Vec<Appointment> =
            (0..70).map(|i| appointment(&i.to_string(), "completed", 1.0)).collect();
        let data = AppointmentsData { spec: ReportSpec::default(), appointments, directory: directory() };
        let document = compose(&data).unwrap();
        assert!(document.page_count() >= 3);
        for page in document.pages() {
            assert_eq!(page.texts().filter(|t| *t == "Amount").count(), 1);
        }
        assert_eq!(document.texts().filter(|t| *t == "$1.00").count(), 70);
        assert!(document.texts().any(|t| t == "Appointments: 70"));
    }
}
