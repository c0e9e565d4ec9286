//! Building blocks shared by every report: header band, titles, filter panel, tables,
//! chart blocks and the closing footer pass.

use crate::error::ReportResult;
use crate::models::{ReportSpec, StatusCategory};
use crate::report::chart::{ChartData, ChartKind, ChartRenderer, ChartStyle, CHART_BOX};
use crate::report::document::{Document, FooterStyle, Margins, A4};
use crate::report::format;
use crate::report::layout::{Align, LayoutEngine, Run, TextOptions};
use crate::report::metrics::{self, FontStyle};
use crate::report::theme::*;

pub const BRAND: &str = "KARPOS";

/// Height of the coloured header band on the first page
pub const HEADER_HEIGHT: f32 = 80.0;

/// Cursor position where first-page content starts
pub const FIRST_PAGE_CONTENT_Y: f32 = 110.0;

pub const ROW_HEIGHT: f32 = 25.0;

const PANEL_TEXT_SIZE: f32 = 10.0;

/// Vertical space reserved for a titled chart
const CHART_BLOCK: f32 = 25.0 + 220.0;

pub fn start(title: &str) -> ReportResult<LayoutEngine> {
    let mut engine = LayoutEngine::new(title);
    engine.begin_page(A4, Margins::default())?;
    Ok(engine)
}

/// Seal the document with the standard footer band
pub fn finish(engine: LayoutEngine) -> Document {
    let mut document = engine.into_document();
    document.finalize(&FooterStyle::default());
    document
}

/// Brand band across the top of the first page, separator rule, cursor at content start
pub fn header_band(engine: &mut LayoutEngine, subtitle: &str) -> ReportResult<()> {
    let width = engine.page_width();
    engine.place_rect(0.0, 0.0, width, HEADER_HEIGHT, COLOR_PRIMARY, None)?;
    engine.place_text(BRAND, 50.0, Some(22.0), &TextOptions::new(28.0).bold().color(COLOR_WHITE))?;
    engine.place_text(subtitle, 50.0, Some(56.0), &TextOptions::new(14.0).bold().color(COLOR_WHITE))?;
    engine.place_line(50.0, 90.0, width - 50.0, 90.0, COLOR_SUCCESS, 2.0)?;
    engine.set_y(FIRST_PAGE_CONTENT_Y);
    Ok(())
}

/// Centered report title
pub fn report_title(engine: &mut LayoutEngine, title: &str) -> ReportResult<()> {
    let y = engine.current_y();
    let opts = TextOptions::new(20.0)
        .bold()
        .color(COLOR_PRIMARY)
        .align(Align::Center)
        .width(engine.content_width());
    engine.place_text(title, engine.left(), Some(y), &opts)?;
    engine.set_y(y + 40.0);
    Ok(())
}

/// Section heading; `gap` is the space from the heading top to the following content
pub fn section_title(engine: &mut LayoutEngine, title: &str, size: f32, gap: f32) -> ReportResult<()> {
    let y = engine.current_y();
    engine.place_text(title, engine.left(), Some(y), &TextOptions::new(size).bold().color(COLOR_PRIMARY))?;
    engine.set_y(y + gap);
    Ok(())
}

/// Move to a fresh page unless `height` still fits
pub fn ensure_room(engine: &mut LayoutEngine, height: f32) -> ReportResult<()> {
    if !engine.ensure_space(height) {
        engine.next_page()?;
    }
    Ok(())
}

/// One `label: value` entry of an information panel
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }

    fn runs(&self) -> [Run; 2] {
        [Run::regular(format!("{}:", self.label)), Run::bold(format!(" {}", self.value))]
    }
}

/// Vertical padding below each panel entry
const FIELD_GAP: f32 = 8.0;

/// Rounded panel with an optional heading and label/value entries in up to two columns
///
/// Rows grow with wrapped values; the whole panel moves to a new page when it does not fit.
pub fn info_panel(
    engine: &mut LayoutEngine,
    heading: Option<&str>,
    columns: &[Vec<Field>],
    background: (u8, u8, u8),
) -> ReportResult<()> {
    let (left, width) = (engine.left(), engine.content_width());
    let column_width = (width - 40.0) / columns.len().max(1) as f32;
    let text_width = column_width - 10.0;

    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    let row_heights: Vec<f32> = (0..rows)
        .map(|r| {
            columns
                .iter()
                .filter_map(|fields| fields.get(r))
                .map(|field| engine.measure_runs(&field.runs(), PANEL_TEXT_SIZE, text_width))
                .fold(0.0, f32::max)
                + FIELD_GAP
        })
        .collect();
    let heading_space = if heading.is_some() { 25.0 } else { 0.0 };
    let height = 15.0 + heading_space + row_heights.iter().sum::<f32>() + 5.0;

    ensure_room(engine, height)?;
    let top = engine.current_y();
    engine.place_rect(left, top, width, height, background, Some(10.0))?;

    let mut y = top + 12.0;
    if let Some(text) = heading {
        engine.place_text(text, left + 20.0, Some(y), &TextOptions::new(14.0).bold().color(COLOR_PRIMARY))?;
        y += heading_space;
    }

    for (c, fields) in columns.iter().enumerate() {
        let x = left + 20.0 + c as f32 * column_width;
        let mut row_y = y;
        for (field, row_height) in fields.iter().zip(&row_heights) {
            engine.place_runs_within(&field.runs(), x, Some(row_y), PANEL_TEXT_SIZE, text_width)?;
            row_y += row_height;
        }
    }

    engine.set_y(top + height + 20.0);
    Ok(())
}

/// Italic centered message shown in place of missing content
pub fn no_data(engine: &mut LayoutEngine, message: &str) -> ReportResult<()> {
    let y = engine.current_y();
    let opts = TextOptions::new(12.0)
        .italic()
        .color(COLOR_TEXT_MEDIUM)
        .align(Align::Center)
        .width(engine.content_width());
    let next = engine.place_text(message, engine.left(), Some(y), &opts)?;
    engine.set_y(next + 20.0);
    Ok(())
}

/// Titled chart, moved to a new page when it does not fit
pub fn chart_block(
    engine: &mut LayoutEngine,
    charts: &ChartRenderer,
    title: &str,
    kind: ChartKind,
    data: &ChartData,
    style: &ChartStyle,
) -> ReportResult<()> {
    ensure_room(engine, CHART_BLOCK)?;
    section_title(engine, title, 14.0, 25.0)?;
    let image = charts.render(kind, data, style)?;
    let y = engine.current_y();
    engine.place_image(&image, engine.left(), y, CHART_BOX)?;
    engine.set_y(y + 220.0);
    Ok(())
}

/// Wrapped text that continues on a new page instead of running past the bottom margin
pub fn place_wrapped(engine: &mut LayoutEngine, text: &str, opts: &TextOptions) -> ReportResult<()> {
    let width = opts.width.unwrap_or_else(|| engine.content_width());
    let line_height = metrics::line_height(opts.size);
    let left = engine.left();
    for line in metrics::wrap(&metrics::fold_to_ascii(text), opts.font, opts.size, width) {
        if !engine.ensure_space(line_height) {
            engine.next_page()?;
        }
        engine.place_text(&line, left, None, opts)?;
    }
    Ok(())
}

/// Canonical English label for known statuses, the raw value otherwise
pub fn status_label(raw: &str, category: StatusCategory) -> String {
    match category {
        StatusCategory::Other if !raw.trim().is_empty() => raw.trim().to_string(),
        category => category.display_name().to_string(),
    }
}

/// Status filter as shown in a filter panel
pub fn status_filter(spec: &ReportSpec) -> String {
    match spec.status.as_deref() {
        Some(status) => status_label(status, StatusCategory::classify(status)),
        None => format::ALL.to_string(),
    }
}

/// One table cell
pub struct Cell {
    pub text: String,
    pub color: (u8, u8, u8),
    pub font: FontStyle,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), color: COLOR_TEXT_DARK, font: FontStyle::Regular }
    }

    pub fn colored(text: impl Into<String>, color: (u8, u8, u8)) -> Self {
        Self { text: text.into(), color, font: FontStyle::Regular }
    }
}

/// Fixed-column table with a colored header row
///
/// Rows are a fixed height and never split. When a row does not fit, the table moves to
/// a new page and draws its header again before the row.
pub struct Table {
    headers: Vec<&'static str>,
    columns: Vec<f32>,
    rows_drawn: usize,
}

impl Table {
    /// `columns` are the x positions of each column's text
    pub fn new(headers: Vec<&'static str>, columns: Vec<f32>) -> Self {
        Self { headers, columns, rows_drawn: 0 }
    }

    pub fn draw_header(&self, engine: &mut LayoutEngine) -> ReportResult<()> {
        ensure_room(engine, 2.0 * ROW_HEIGHT)?;
        let y = engine.current_y();
        engine.place_rect(engine.left(), y, engine.content_width(), ROW_HEIGHT, COLOR_ACCENT, None)?;
        let opts = TextOptions::new(10.0).bold().color(COLOR_WHITE);
        for (header, x) in self.headers.iter().zip(&self.columns) {
            engine.place_text(header, *x, Some(y + 7.0), &self.clip(&opts, *x, engine))?;
        }
        engine.set_y(y + ROW_HEIGHT);
        Ok(())
    }

    pub fn draw_row(&mut self, engine: &mut LayoutEngine, cells: Vec<Cell>) -> ReportResult<()> {
        if !engine.ensure_space(ROW_HEIGHT) {
            engine.next_page()?;
            self.draw_header(engine)?;
        }

        let y = engine.current_y();
        if self.rows_drawn % 2 == 0 {
            engine.place_rect(engine.left(), y, engine.content_width(), ROW_HEIGHT, COLOR_ROW_TINT, None)?;
        }
        for (cell, x) in cells.into_iter().zip(&self.columns) {
            let opts = TextOptions { font: cell.font, ..TextOptions::new(9.0).color(cell.color) };
            let text = self.fit(&cell.text, &opts, *x, engine);
            engine.place_text(&text, *x, Some(y + 8.0), &opts)?;
        }
        self.rows_drawn += 1;
        engine.set_y(y + ROW_HEIGHT);
        Ok(())
    }

    /// Emphasised closing row (totals)
    pub fn draw_total(&mut self, engine: &mut LayoutEngine, cells: Vec<Cell>) -> ReportResult<()> {
        let height = ROW_HEIGHT + 5.0;
        if !engine.ensure_space(10.0 + height) {
            engine.next_page()?;
            self.draw_header(engine)?;
        }
        let y = engine.advance(10.0);
        engine.place_rect(engine.left(), y, engine.content_width(), height, COLOR_ACCENT, None)?;
        for (cell, x) in cells.into_iter().zip(&self.columns) {
            let opts = TextOptions::new(10.0).bold().color(COLOR_WHITE);
            let text = self.fit(&cell.text, &opts, *x, engine);
            engine.place_text(&text, *x, Some(y + 10.0), &opts)?;
        }
        engine.set_y(y + height + 10.0);
        Ok(())
    }

    pub fn rows_drawn(&self) -> usize {
        self.rows_drawn
    }

    fn column_width(&self, x: f32, engine: &LayoutEngine) -> f32 {
        let next = self.columns.iter().copied().find(|c| *c > x).unwrap_or(engine.right());
        (next - x - 4.0).max(10.0)
    }

    fn clip(&self, opts: &TextOptions, x: f32, engine: &LayoutEngine) -> TextOptions {
        opts.clone().width(self.column_width(x, engine))
    }

    /// Single-line text for a cell, shortened with `...` when wider than the column
    fn fit(&self, text: &str, opts: &TextOptions, x: f32, engine: &LayoutEngine) -> String {
        let width = self.column_width(x, engine);
        let text = metrics::fold_to_ascii(text);
        if metrics::text_width(&text, opts.font, opts.size) <= width {
            return text;
        }
        let mut shortened: String = text.clone();
        while !shortened.is_empty()
            && metrics::text_width(&format!("{}...", shortened), opts.font, opts.size) > width
        {
            shortened.pop();
        }
        format!("{}...", shortened.trim_end())
    }
}

/// Assert no content op reaches below the bottom margin; the footer band is skipped
#[cfg(test)]
pub fn assert_within_content_area(document: &Document) {
    for page in document.pages() {
        let bottom = page.content_bottom();
        for op in page.ops() {
            let b = op.bounds();
            if b.y >= bottom {
                continue;
            }
            assert!(
                b.bottom() <= bottom + 1e-3,
                "op on page {} ends at {} past {}: {:?}",
                page.index,
                b.bottom(),
                bottom,
                op.text()
            );
        }
    }
}
