//! Layout engine
//!
//! Keeps a vertical cursor on the current page and turns text, boxes, rules and images into
//! [`DrawOp`]s. Pagination is always the caller's decision: [`LayoutEngine::ensure_space`]
//! only answers whether something fits, and [`LayoutEngine::begin_page`] starts the next page.

use tracing::debug;

use super::document::{Bounds, Document, DrawOp, Margins, PageSize, RasterImage, A4};
use super::metrics::{self, FontStyle};
use super::theme::COLOR_TEXT_DARK;
use crate::error::{ReportError, ReportResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Styling for [`LayoutEngine::place_text`]
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub font: FontStyle,
    pub size: f32,
    pub color: (u8, u8, u8),
    pub align: Align,
    /// Wrap width; defaults to the distance from `x` to the right margin
    pub width: Option<f32>,
}

impl TextOptions {
    pub fn new(size: f32) -> Self {
        Self {
            font: FontStyle::Regular,
            size,
            color: COLOR_TEXT_DARK,
            align: Align::Left,
            width: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.font = FontStyle::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.font = FontStyle::Italic;
        self
    }

    pub fn color(mut self, color: (u8, u8, u8)) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }
}

/// A styled piece of one logical line, e.g. a label followed by a bold value
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: FontStyle,
    pub color: (u8, u8, u8),
}

impl Run {
    pub fn regular(text: impl Into<String>) -> Self {
        Self { text: text.into(), font: FontStyle::Regular, color: COLOR_TEXT_DARK }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), font: FontStyle::Bold, color: COLOR_TEXT_DARK }
    }
}

/// One word of a run, ready for line filling
struct Token {
    text: String,
    font: FontStyle,
    color: (u8, u8, u8),
    space_before: bool,
}

/// Contiguous same-style text on one line; `x` is relative to the run start
struct Segment {
    x: f32,
    line: usize,
    text: String,
    width: f32,
    font: FontStyle,
    color: (u8, u8, u8),
}

pub struct LayoutEngine {
    document: Document,
    size: PageSize,
    margins: Margins,
    cursor_y: f32,
}

impl LayoutEngine {
    /// Engine over an empty document; call [`LayoutEngine::begin_page`] before drawing
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            document: Document::new(title),
            size: A4,
            margins: Margins::default(),
            cursor_y: 0.0,
        }
    }

    /// Start a new page and move the cursor to its top margin
    pub fn begin_page(&mut self, size: PageSize, margins: Margins) -> ReportResult<usize> {
        let index = self.document.add_page(size, margins)?;
        self.size = size;
        self.margins = margins;
        self.cursor_y = margins.top;
        debug!(page = index + 1, "began page");
        Ok(index)
    }

    /// Start a new page with the same size and margins as the current one
    pub fn next_page(&mut self) -> ReportResult<usize> {
        self.begin_page(self.size, self.margins)
    }

    /// Height the text would occupy when wrapped to `width`
    pub fn measure(&self, text: &str, font: FontStyle, size: f32, width: f32) -> f32 {
        let lines = metrics::wrap(&metrics::fold_to_ascii(text), font, size, width);
        lines.len() as f32 * metrics::line_height(size)
    }

    /// Place wrapped text; `y = None` uses the cursor. Returns the new cursor position.
    pub fn place_text(&mut self, text: &str, x: f32, y: Option<f32>, opts: &TextOptions) -> ReportResult<f32> {
        let top = y.unwrap_or(self.cursor_y);
        let width = opts.width.unwrap_or_else(|| self.right() - x).max(1.0);
        let line_height = metrics::line_height(opts.size);
        let lines = metrics::wrap(&metrics::fold_to_ascii(text), opts.font, opts.size, width);

        let mut line_y = top;
        for line in lines {
            let line_width = metrics::text_width(&line, opts.font, opts.size);
            let line_x = match opts.align {
                Align::Left => x,
                Align::Center => x + (width - line_width).max(0.0) / 2.0,
                Align::Right => x + (width - line_width).max(0.0),
            };
            if !line.is_empty() {
                self.document.push(DrawOp::Text {
                    x: line_x,
                    y: line_y,
                    width: line_width,
                    text: line,
                    font: opts.font,
                    size: opts.size,
                    color: opts.color,
                })?;
            }
            line_y += line_height;
        }

        self.cursor_y = line_y;
        Ok(line_y)
    }

    /// Place styled runs flowing as one logical line, wrapping at the right margin
    pub fn place_runs(&mut self, runs: &[Run], x: f32, y: Option<f32>, size: f32) -> ReportResult<f32> {
        let width = self.right() - x;
        self.place_runs_within(runs, x, y, size, width)
    }

    /// Place styled runs wrapping at `width` points from `x`. Returns the new cursor position.
    pub fn place_runs_within(
        &mut self,
        runs: &[Run],
        x: f32,
        y: Option<f32>,
        size: f32,
        width: f32,
    ) -> ReportResult<f32> {
        let top = y.unwrap_or(self.cursor_y);
        let line_height = metrics::line_height(size);
        let (segments, lines) = flow_runs(runs, size, width);

        for seg in segments {
            self.document.push(DrawOp::Text {
                x: x + seg.x,
                y: top + seg.line as f32 * line_height,
                width: seg.width,
                text: seg.text,
                font: seg.font,
                size,
                color: seg.color,
            })?;
        }

        let next = top + lines as f32 * line_height;
        self.cursor_y = next;
        Ok(next)
    }

    /// Height styled runs would occupy when wrapped to `width`
    pub fn measure_runs(&self, runs: &[Run], size: f32, width: f32) -> f32 {
        let (_, lines) = flow_runs(runs, size, width);
        lines as f32 * metrics::line_height(size)
    }

    pub fn place_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: (u8, u8, u8),
        radius: Option<f32>,
    ) -> ReportResult<()> {
        self.document.push(DrawOp::Rect { x, y, width, height, color, radius })
    }

    pub fn place_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: (u8, u8, u8),
        width: f32,
    ) -> ReportResult<()> {
        self.document.push(DrawOp::Line { x1, y1, x2, y2, color, width })
    }

    /// Scale the raster into `fit` (width, height) keeping its aspect ratio, anchored at `(x, y)`
    pub fn place_image(&mut self, image: &RasterImage, x: f32, y: f32, fit: (f32, f32)) -> ReportResult<Bounds> {
        if image.width == 0 || image.height == 0 {
            return Err(ReportError::Layout("image has no pixels".to_string()));
        }
        let scale = (fit.0 / image.width as f32).min(fit.1 / image.height as f32);
        let bounds = Bounds {
            x,
            y,
            width: image.width as f32 * scale,
            height: image.height as f32 * scale,
        };
        self.document.push(DrawOp::Image {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            image: image.clone(),
        })?;
        Ok(bounds)
    }

    /// Whether `height` points fit between the cursor and the bottom margin
    pub fn ensure_space(&self, height: f32) -> bool {
        let fits = self.cursor_y + height <= self.content_bottom() + f32::EPSILON;
        if !fits {
            debug!(cursor = self.cursor_y, height, "insufficient space on page");
        }
        fits
    }

    pub fn current_y(&self) -> f32 {
        self.cursor_y
    }

    pub fn advance(&mut self, delta: f32) -> f32 {
        self.cursor_y += delta;
        self.cursor_y
    }

    pub fn set_y(&mut self, y: f32) {
        self.cursor_y = y;
    }

    pub fn left(&self) -> f32 {
        self.margins.left
    }

    pub fn right(&self) -> f32 {
        self.size.width - self.margins.right
    }

    pub fn page_width(&self) -> f32 {
        self.size.width
    }

    pub fn content_width(&self) -> f32 {
        self.right() - self.left()
    }

    pub fn content_bottom(&self) -> f32 {
        self.size.height - self.margins.bottom
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Fill runs into lines no wider than `width`; returns the segments and the line count
fn flow_runs(runs: &[Run], size: f32, width: f32) -> (Vec<Segment>, usize) {
    let width = width.max(1.0);
    let mut segments = Vec::new();
    let mut line = 0;
    let mut cursor_x = 0.0;
    let mut segment: Option<Segment> = None;

    for token in tokenize(runs, size, width) {
        let mut space = if token.space_before && cursor_x > 0.0 {
            metrics::text_width(" ", token.font, size)
        } else {
            0.0
        };
        let token_width = metrics::text_width(&token.text, token.font, size);

        if cursor_x > 0.0 && cursor_x + space + token_width > width {
            segments.extend(segment.take());
            line += 1;
            cursor_x = 0.0;
            space = 0.0;
        }

        match segment.as_mut() {
            Some(seg) if seg.font == token.font && seg.color == token.color && seg.line == line => {
                if space > 0.0 {
                    seg.text.push(' ');
                }
                seg.text.push_str(&token.text);
                seg.width += space + token_width;
            }
            _ => {
                segments.extend(segment.take());
                segment = Some(Segment {
                    x: cursor_x + space,
                    line,
                    text: token.text,
                    width: token_width,
                    font: token.font,
                    color: token.color,
                });
            }
        }
        cursor_x += space + token_width;
    }
    segments.extend(segment);

    (segments, line + 1)
}

fn tokenize(runs: &[Run], size: f32, available: f32) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pending_space = false;

    for run in runs {
        let text = metrics::fold_to_ascii(&run.text);
        for (i, word) in text.split(' ').enumerate() {
            if i > 0 {
                pending_space = true;
            }
            if word.is_empty() {
                continue;
            }
            let pieces = if metrics::text_width(word, run.font, size) > available {
                metrics::wrap(word, run.font, size, available)
            } else {
                vec![word.to_string()]
            };
            for (j, piece) in pieces.into_iter().enumerate() {
                tokens.push(Token {
                    text: piece,
                    font: run.font,
                    color: run.color,
                    space_before: j == 0 && pending_space,
                });
            }
            pending_space = false;
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LayoutEngine {
        let mut engine = LayoutEngine::new("Test");
        engine.begin_page(A4, Margins::default()).unwrap();
        engine
    }

    fn text_ops(engine: LayoutEngine) -> Vec<DrawOp> {
        let document = engine.into_document();
        document.pages().iter().flat_map(|p| p.ops().to_vec()).collect()
    }

    #[test]
    fn test_begin_page_resets_cursor() {
        let mut engine = engine();
        engine.advance(300.0);
        engine.next_page().unwrap();
        assert_eq!(engine.current_y(), 80.0);
        assert_eq!(engine.page_count(), 2);
    }

    #[test]
    fn test_measure_is_pure() {
        let engine = engine();
        let text = "A fairly long sentence that has to wrap over more than one line of output";
        let first = engine.measure(text, FontStyle::Regular, 10.0, 120.0);
        let second = engine.measure(text, FontStyle::Regular, 10.0, 120.0);
        assert_eq!(first, second);
        assert!(first > 12.0);
        assert_eq!(engine.current_y(), 80.0);
        assert!(text_ops(engine).is_empty());
    }

    #[test]
    fn test_place_text_uses_cursor_and_wraps() {
        let mut engine = engine();
        let opts = TextOptions::new(10.0).width(80.0);
        let next = engine
            .place_text("several words that will not fit on a single line", 50.0, None, &opts)
            .unwrap();
        assert!(next > 80.0 + 12.0);
        assert_eq!(engine.current_y(), next);

        let ops = text_ops(engine);
        assert!(ops.len() > 1);
        for op in ops {
            let b = op.bounds();
            assert!(b.x + b.width <= 50.0 + 80.0 + 1e-3);
        }
    }

    #[test]
    fn test_place_text_centered() {
        let mut engine = engine();
        let opts = TextOptions::new(20.0).bold().align(Align::Center).width(495.28);
        engine.place_text("Title", 50.0, Some(110.0), &opts).unwrap();
        let ops = text_ops(engine);
        let b = ops[0].bounds();
        let left_gap = b.x - 50.0;
        let right_gap = 545.28 - (b.x + b.width);
        assert!((left_gap - right_gap).abs() < 1e-2);
        assert_eq!(b.y, 110.0);
    }

    #[test]
    fn test_runs_share_a_line() {
        let mut engine = engine();
        engine
            .place_runs(&[Run::regular("Doctor:"), Run::bold(" All")], 70.0, Some(150.0), 10.0)
            .unwrap();
        let ops = text_ops(engine);
        assert_eq!(ops.len(), 2);
        match (&ops[0], &ops[1]) {
            (
                DrawOp::Text { x: x0, y: y0, width: w0, font: f0, .. },
                DrawOp::Text { x: x1, y: y1, text, font: f1, .. },
            ) => {
                assert_eq!(y0, y1);
                assert_eq!(*f0, FontStyle::Regular);
                assert_eq!(*f1, FontStyle::Bold);
                assert_eq!(text, "All");
                assert!(*x1 > x0 + w0);
            }
            _ => panic!("expected two text ops"),
        }
    }

    #[test]
    fn test_runs_wrap_at_margin() {
        let mut engine = engine();
        let long = "word ".repeat(60);
        let next = engine.place_runs(&[Run::regular("Notes:"), Run::bold(long)], 50.0, Some(100.0), 10.0).unwrap();
        assert!(next > 100.0 + 2.0 * 12.0);
        for op in text_ops(engine) {
            let b = op.bounds();
            assert!(b.x + b.width <= 545.28 + 1e-3);
        }
    }

    #[test]
    fn test_runs_measure_matches_placement() {
        let mut engine = engine();
        let runs = [Run::regular("Doctor:"), Run::bold(" Maria Fernanda de los Angeles Gutierrez Villalobos")];
        let height = engine.measure_runs(&runs, 10.0, 120.0);
        assert!(height > metrics::line_height(10.0));

        let next = engine.place_runs_within(&runs, 70.0, Some(150.0), 10.0, 120.0).unwrap();
        assert!((next - 150.0 - height).abs() < 1e-3);
        for op in text_ops(engine) {
            let b = op.bounds();
            assert!(b.x >= 70.0 && b.x + b.width <= 190.0 + 1e-3);
        }
    }

    #[test]
    fn test_place_image_keeps_aspect() {
        let mut engine = engine();
        let image = RasterImage { png: vec![], width: 800, height: 400 };
        let bounds = engine.place_image(&image, 50.0, 200.0, (400.0, 400.0)).unwrap();
        assert_eq!(bounds.width, 400.0);
        assert_eq!(bounds.height, 200.0);
        // placing an image never moves the cursor or paginates
        assert_eq!(engine.current_y(), 80.0);
        assert_eq!(engine.page_count(), 1);
    }

    #[test]
    fn test_ensure_space_never_paginates() {
        let mut engine = engine();
        engine.set_y(760.0);
        assert!(engine.ensure_space(11.0));
        assert!(!engine.ensure_space(12.0));
        assert_eq!(engine.page_count(), 1);
    }

    #[test]
    fn test_fixed_rows_paginate_to_ceiling() {
        let size = PageSize { width: 595.28, height: 650.0 };
        let margins = Margins::default();
        let body = size.height - margins.top - margins.bottom;
        let row = 25.0;
        let rows = 45;

        let mut engine = LayoutEngine::new("Rows");
        engine.begin_page(size, margins).unwrap();
        for _ in 0..rows {
            if !engine.ensure_space(row) {
                engine.next_page().unwrap();
            }
            let y = engine.current_y();
            engine.place_rect(50.0, y, 100.0, row, (0, 0, 0), None).unwrap();
            engine.advance(row);
        }

        let expected = ((rows as f32 * row) / body).ceil() as usize;
        assert_eq!(engine.page_count(), expected);

        let document = engine.into_document();
        for page in document.pages() {
            for op in page.ops() {
                let b = op.bounds();
                assert!(b.y >= margins.top);
                assert!(b.bottom() <= page.content_bottom() + 1e-3);
            }
        }
    }
}
