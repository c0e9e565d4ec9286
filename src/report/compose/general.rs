//! General report: totals, status distribution, load per doctor and daily trend

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use super::common::{self, Field};
use super::GeneralData;
use crate::error::ReportResult;
use crate::models::{normalize_name, Appointment, Doctor, ReportSpec, StatusCategory, StatusCounts};
use crate::report::chart::{ChartData, ChartKind, ChartRenderer, ChartStyle, Series};
use crate::report::document::Document;
use crate::report::format;
use crate::report::layout::{Align, TextOptions};
use crate::report::theme::*;

pub fn compose(data: &GeneralData, charts: &ChartRenderer) -> ReportResult<Document> {
    let spec = data.spec.clone().normalized();
    let selected_doctor = spec
        .doctor_id
        .as_deref()
        .and_then(|id| data.doctors.iter().find(|d| d.id.as_deref() == Some(id)));
    let appointments: Vec<&Appointment> = data
        .appointments
        .iter()
        .filter(|a| spec.contains_date(a.parsed_date()))
        .filter(|a| match (spec.doctor_id.as_deref(), selected_doctor) {
            (None, _) => true,
            (Some(_), Some(doctor)) => assigned_to(a, doctor),
            (Some(id), None) => a.doctor_id.as_deref() == Some(id),
        })
        .filter(|a| spec.status.as_deref().map_or(true, |status| matches_status(status, a)))
        .collect();
    debug!(
        total = data.appointments.len(),
        selected = appointments.len(),
        "filtered appointments for general report"
    );
    let counts = StatusCounts::tally(appointments.iter().copied());

    let mut engine = common::start("General Report")?;
    common::header_band(&mut engine, "Medical Management System")?;
    common::report_title(&mut engine, "General Report")?;

    common::info_panel(
        &mut engine,
        Some("Applied Filters"),
        &[
            vec![Field::new("Period", period(&spec)), Field::new("Doctor", doctor_filter(&spec, &data.doctors))],
            vec![Field::new("Status", common::status_filter(&spec))],
        ],
        COLOR_PANEL,
    )?;

    // Total box
    let top = engine.current_y();
    let (left, width) = (engine.left(), engine.content_width());
    engine.place_rect(left, top, width, 60.0, COLOR_PANEL_NEUTRAL, Some(10.0))?;
    let centered = |size: f32| TextOptions::new(size).align(Align::Center).width(width);
    engine.place_text(&counts.total().to_string(), left, Some(top + 8.0), &centered(24.0).bold().color(COLOR_PRIMARY))?;
    engine.place_text(
        "Appointments in the selected period",
        left,
        Some(top + 38.0),
        &centered(12.0).color(COLOR_TEXT_MEDIUM),
    )?;
    engine.set_y(top + 80.0);

    let distribution = ChartData::single(
        vec![
            format!("Completed ({})", counts.completed),
            format!("Pending ({})", counts.pending),
            format!("Cancelled ({})", counts.cancelled),
        ],
        Series::new(
            "Appointments",
            vec![counts.completed as f64, counts.pending as f64, counts.cancelled as f64],
            COLOR_PRIMARY,
        ),
    );
    let doughnut_style = ChartStyle {
        palette: vec![COLOR_SUCCESS, COLOR_WARNING, COLOR_DANGER],
        ..ChartStyle::default()
    };
    common::chart_block(&mut engine, charts, "Status Distribution", ChartKind::Doughnut, &distribution, &doughnut_style)?;

    let per_doctor = doctor_counts(&appointments, &data.doctors);
    if per_doctor.is_empty() {
        common::ensure_room(&mut engine, 60.0)?;
        common::section_title(&mut engine, "Appointments per Doctor", 14.0, 25.0)?;
        common::no_data(&mut engine, "No appointments assigned to doctors in this period.")?;
    } else {
        let (labels, values): (Vec<String>, Vec<f64>) =
            per_doctor.into_iter().map(|(name, count)| (name, count as f64)).unzip();
        let data = ChartData::single(labels, Series::new("Appointments", values, COLOR_ACCENT));
        let style = ChartStyle { y_label: Some("Appointments".to_string()), ..ChartStyle::default() };
        common::chart_block(&mut engine, charts, "Appointments per Doctor", ChartKind::Bar, &data, &style)?;
    }

    engine.next_page()?;
    common::section_title(&mut engine, "Trends Over Time", 16.0, 30.0)?;
    let trend = daily_counts(&appointments);
    if trend.is_empty() {
        common::no_data(&mut engine, "No dated appointments in this period.")?;
    } else {
        let labels = trend.keys().map(|d| d.format("%d/%m/%Y").to_string()).collect();
        let values = trend.values().map(|c| *c as f64).collect();
        let data = ChartData::single(labels, Series::new("Appointments per day", values, COLOR_PRIMARY));
        let style = ChartStyle { fill_area: true, ..ChartStyle::default() };
        common::chart_block(&mut engine, charts, "Appointments per Day", ChartKind::Line, &data, &style)?;
    }

    Ok(common::finish(engine))
}

fn period(spec: &ReportSpec) -> String {
    match (spec.start_date.as_deref(), spec.end_date.as_deref()) {
        (Some(start), Some(end)) => format!("{} - {}", format::display_date(start), format::display_date(end)),
        (Some(start), None) => format!("From {}", format::display_date(start)),
        (None, Some(end)) => format!("Until {}", format::display_date(end)),
        (None, None) => format::ALL.to_string(),
    }
}

fn doctor_filter(spec: &ReportSpec, doctors: &[Doctor]) -> String {
    match spec.doctor_id.as_deref() {
        Some(id) => doctors
            .iter()
            .find(|d| d.id.as_deref() == Some(id))
            .map(Doctor::full_name)
            .unwrap_or_else(|| id.to_string()),
        None => format::ALL.to_string(),
    }
}

/// Whether the appointment is assigned to `doctor`, by id or by name when it carries no id
fn assigned_to(appointment: &Appointment, doctor: &Doctor) -> bool {
    match (appointment.doctor_id.as_deref(), doctor.id.as_deref()) {
        (Some(a_id), Some(d_id)) => a_id == d_id,
        (None, _) => {
            let full_name = normalize_name(&doctor.full_name());
            appointment
                .doctor_name
                .as_deref()
                .map(|n| !full_name.is_empty() && normalize_name(n) == full_name)
                .unwrap_or(false)
        }
        _ => false,
    }
}

/// Known statuses match by category, anything else by its raw value
fn matches_status(filter: &str, appointment: &Appointment) -> bool {
    match StatusCategory::classify(filter) {
        StatusCategory::Other => appointment.status.trim().eq_ignore_ascii_case(filter.trim()),
        category => appointment.status_category() == category,
    }
}

/// Appointments per doctor in directory order, doctors without appointments omitted
fn doctor_counts(appointments: &[&Appointment], doctors: &[Doctor]) -> Vec<(String, usize)> {
    doctors
        .iter()
        .map(|doctor| {
            let count = appointments.iter().filter(|a| assigned_to(a, doctor)).count();
            (doctor.short_name(), count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Appointments per calendar day, in date order
fn daily_counts(appointments: &[&Appointment]) -> BTreeMap<NaiveDate, usize> {
    let mut days = BTreeMap::new();
    for appointment in appointments {
        match appointment.parsed_date() {
            Some(date) => *days.entry(date).or_insert(0) += 1,
            None => debug!(date = %appointment.date, "skipping undated appointment in trend"),
        }
    }
    days
}
