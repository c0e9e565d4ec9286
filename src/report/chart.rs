//! Chart rendering (plotters)
//!
//! Charts are drawn into an RGB bitmap buffer and PNG-encoded, ready for
//! [`LayoutEngine::place_image`](super::layout::LayoutEngine::place_image). Rendering is
//! deterministic: the same data and style always produce the same bytes.
//!
//! Text (captions, axis labels, legends) needs a system font. When none can be loaded the
//! text step is skipped with a warning and the chart is still produced.

use std::f64::consts::PI;

use plotters::coord::Shift;
use plotters::prelude::*;
use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;
use tracing::warn;

use super::document::RasterImage;
use super::theme::{COLOR_DANGER, COLOR_PRIMARY, COLOR_SUCCESS, COLOR_TEXT_DARK, COLOR_WARNING};
use crate::error::{ReportError, ReportResult};

/// Default raster size; placed at half size (400x200 pt) in documents
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 400;

/// Placement box for charts in points
pub const CHART_BOX: (f32, f32) = (400.0, 200.0);

const FONT: &str = "sans-serif";
const COLOR_RING_EMPTY: (u8, u8, u8) = (220, 220, 220);

type ChartArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
}

/// One named numeric series
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    pub color: (u8, u8, u8),
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>, color: (u8, u8, u8)) -> Self {
        Self { name: name.into(), values, color }
    }
}

/// Series sharing one label axis
///
/// For doughnut charts the first series holds one value per label (slice).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartData {
    pub fn single(labels: Vec<String>, series: Series) -> Self {
        Self { labels, series: vec![series] }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.values.is_empty())
    }

    fn max_len(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: Option<String>,
    pub y_label: Option<String>,
    /// Translucent fill under line series
    pub fill_area: bool,
    pub show_points: bool,
    /// Fixed y range; derived from the data when absent
    pub y_range: Option<(f64, f64)>,
    /// Named y ticks, e.g. status ordinals
    pub y_ticks: Vec<(f64, String)>,
    /// Slice colors for doughnut charts
    pub palette: Vec<(u8, u8, u8)>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: None,
            y_label: None,
            fill_area: false,
            show_points: true,
            y_range: None,
            y_ticks: Vec::new(),
            palette: vec![COLOR_SUCCESS, COLOR_WARNING, COLOR_DANGER, COLOR_PRIMARY],
        }
    }
}

/// Chart rendering capability, created once per request and handed to composers
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    draw_text: bool,
}

impl ChartRenderer {
    pub fn init() -> Self {
        Self { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT, draw_text: true }
    }

    /// Renderer that never draws text, for environments without fonts
    pub fn headless() -> Self {
        Self { draw_text: false, ..Self::init() }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(16);
        self.height = height.max(16);
        self
    }

    pub fn render(&self, kind: ChartKind, data: &ChartData, style: &ChartStyle) -> ReportResult<RasterImage> {
        let (width, height) = (self.width, self.height);
        let mut buffer = vec![0u8; (width * height * 3) as usize];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;

            let area = match (&style.title, self.draw_text) {
                (Some(title), true) => match root.titled(title, (FONT, 28).into_font().color(&rgb(COLOR_TEXT_DARK))) {
                    Ok(area) => area,
                    Err(e) => {
                        warn!(error = %e, "chart title skipped");
                        root.clone()
                    }
                },
                _ => root.clone(),
            };

            match kind {
                ChartKind::Line => self.draw_line(&area, data, style)?,
                ChartKind::Bar => self.draw_bar(&area, data, style)?,
                ChartKind::Doughnut => self.draw_doughnut(&area, data, style)?,
            }

            root.present().map_err(chart_err)?;
        }

        // Convert RGB buffer to PNG
        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| ReportError::Chart("failed to create image from buffer".to_string()))?;

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .map_err(chart_err)?;

        Ok(RasterImage { png, width, height })
    }

    fn draw_line(&self, area: &ChartArea<'_>, data: &ChartData, style: &ChartStyle) -> ReportResult<()> {
        let len = data.max_len();
        let x_max = len.saturating_sub(1).max(1) as f64;
        let (y_min, y_max) = style.y_range.unwrap_or_else(|| value_range(data));

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(if self.draw_text { 40 } else { 0 })
            .y_label_area_size(if self.draw_text { 60 } else { 0 })
            .build_cartesian_2d(0f64..x_max, y_min..y_max)
            .map_err(chart_err)?;

        if self.draw_text {
            let labels = &data.labels;
            let ticks = &style.y_ticks;
            let x_formatter = |x: &f64| label_at(labels, *x);
            let y_formatter = |y: &f64| tick_label(ticks, *y);
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(len.clamp(1, 10))
                .x_label_formatter(&x_formatter)
                .y_label_formatter(&y_formatter);
            if !ticks.is_empty() {
                mesh.y_labels(ticks.len() + 1);
            }
            if let Some(desc) = &style.y_label {
                mesh.y_desc(desc.as_str());
            }
            if let Err(e) = mesh.draw() {
                warn!(error = %e, "chart axis labels skipped");
            }
        }

        for series in &data.series {
            let color = rgb(series.color);
            let points: Vec<(f64, f64)> = series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect();
            if points.is_empty() {
                continue;
            }

            if style.fill_area {
                chart
                    .draw_series(
                        AreaSeries::new(points.clone(), y_min.max(0.0), color.mix(0.25))
                            .border_style(color.stroke_width(3)),
                    )
                    .map_err(chart_err)?
                    .label(series.name.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
            } else {
                chart
                    .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
                    .map_err(chart_err)?
                    .label(series.name.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
            }

            if style.show_points {
                chart
                    .draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 4, color.filled())))
                    .map_err(chart_err)?;
            }
        }

        if self.draw_text && !data.is_empty() {
            let legend = chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((FONT, 18))
                .draw();
            if let Err(e) = legend {
                warn!(error = %e, "chart legend skipped");
            }
        }

        Ok(())
    }

    fn draw_bar(&self, area: &ChartArea<'_>, data: &ChartData, style: &ChartStyle) -> ReportResult<()> {
        let len = data.max_len().max(1);
        let (y_min, y_max) = style.y_range.unwrap_or_else(|| value_range(data));
        let groups = data.series.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(if self.draw_text { 40 } else { 0 })
            .y_label_area_size(if self.draw_text { 60 } else { 0 })
            .build_cartesian_2d(0f64..len as f64, y_min..y_max)
            .map_err(chart_err)?;

        if self.draw_text {
            let labels = &data.labels;
            let x_formatter = |x: &f64| label_at(labels, x.floor());
            let mut mesh = chart.configure_mesh();
            mesh.disable_x_mesh()
                .x_labels(len.min(10) * 2 + 1)
                .x_label_formatter(&x_formatter);
            if let Some(desc) = &style.y_label {
                mesh.y_desc(desc.as_str());
            }
            if let Err(e) = mesh.draw() {
                warn!(error = %e, "chart axis labels skipped");
            }
        }

        let slot = 0.7 / groups;
        for (g, series) in data.series.iter().enumerate() {
            let color = rgb(series.color);
            let offset = 0.15 + g as f64 * slot;
            chart
                .draw_series(series.values.iter().enumerate().map(|(i, v)| {
                    let x0 = i as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + slot, *v)], color.filled())
                }))
                .map_err(chart_err)?
                .label(series.name.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
        }

        if self.draw_text && !data.is_empty() {
            let legend = chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((FONT, 18))
                .draw();
            if let Err(e) = legend {
                warn!(error = %e, "chart legend skipped");
            }
        }

        Ok(())
    }

    fn draw_doughnut(&self, area: &ChartArea<'_>, data: &ChartData, style: &ChartStyle) -> ReportResult<()> {
        let (w, h) = area.dim_in_pixel();
        let center = ((w as f64 * 0.35), (h as f64 / 2.0));
        let outer = (h as f64 / 2.0 - 20.0).min(w as f64 * 0.3).max(4.0);
        let inner = outer * 0.55;

        let values: Vec<f64> = data
            .series
            .first()
            .map(|s| s.values.iter().map(|v| v.max(0.0)).collect())
            .unwrap_or_default();
        let total: f64 = values.iter().sum();

        if total <= 0.0 {
            let ring = ring_segment(center, inner, outer, 0.0, 2.0 * PI);
            area.draw(&Polygon::new(ring, rgb(COLOR_RING_EMPTY).filled()))
                .map_err(chart_err)?;
        } else {
            let mut start = 0.0;
            for (i, value) in values.iter().enumerate() {
                if *value <= 0.0 {
                    continue;
                }
                let sweep = value / total * 2.0 * PI;
                let color = palette_color(&style.palette, i);
                let wedge = ring_segment(center, inner, outer, start, start + sweep);
                area.draw(&Polygon::new(wedge, rgb(color).filled()))
                    .map_err(chart_err)?;
                start += sweep;
            }
        }

        if self.draw_text {
            let x = (w as f64 * 0.68) as i32;
            let mut y = (h as f64 / 2.0) as i32 - (data.labels.len() as i32 * 30) / 2;
            for (i, label) in data.labels.iter().enumerate() {
                let color = palette_color(&style.palette, i);
                area.draw(&Rectangle::new([(x, y), (x + 20, y + 20)], rgb(color).filled()))
                    .map_err(chart_err)?;
                let text = Text::new(label.clone(), (x + 30, y), (FONT, 20).into_font().color(&rgb(COLOR_TEXT_DARK)));
                if let Err(e) = area.draw(&text) {
                    warn!(error = %e, "chart legend skipped");
                    break;
                }
                y += 30;
            }
        }

        Ok(())
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Chart(e.to_string())
}

fn rgb(color: (u8, u8, u8)) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn palette_color(palette: &[(u8, u8, u8)], index: usize) -> (u8, u8, u8) {
    if palette.is_empty() {
        COLOR_PRIMARY
    } else {
        palette[index % palette.len()]
    }
}

/// Y range covering every value, anchored at zero, with headroom
fn value_range(data: &ChartData) -> (f64, f64) {
    let values = data.series.iter().flat_map(|s| s.values.iter().copied());
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (max - min).max(1.0);
    (min, max + span * 0.1)
}

fn label_at(labels: &[String], x: f64) -> String {
    if x < 0.0 || x.fract().abs() > 1e-6 {
        return String::new();
    }
    labels.get(x as usize).cloned().unwrap_or_default()
}

fn tick_label(ticks: &[(f64, String)], y: f64) -> String {
    if ticks.is_empty() {
        return format!("{:.0}", y);
    }
    ticks
        .iter()
        .find(|(value, _)| (value - y).abs() < 1e-6)
        .map(|(_, label)| label.clone())
        .unwrap_or_default()
}

/// Polygon outline of a ring segment, angles clockwise from 12 o'clock
fn ring_segment(center: (f64, f64), inner: f64, outer: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = (((end - start) / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;
    let point = |radius: f64, angle: f64| {
        let a = angle - PI / 2.0;
        (
            (center.0 + radius * a.cos()).round() as i32,
            (center.1 + radius * a.sin()).round() as i32,
        )
    };

    let mut points = Vec::with_capacity(2 * (steps + 1));
    for i in 0..=steps {
        points.push(point(outer, start + (end - start) * i as f64 / steps as f64));
    }
    for i in (0..=steps).rev() {
        points.push(point(inner, start + (end - start) * i as f64 / steps as f64));
    }
    points
}
