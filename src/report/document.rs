//! Paginated document model
//!
//! A [`Document`] is an ordered list of [`Page`]s, each an append-only list of [`DrawOp`]s in
//! top-left-origin point coordinates. Once [`Document::finalize`] has stamped the footer band
//! the document is sealed and every further append fails.

use serde::Serialize;

use super::metrics::{self, FontStyle};
use super::theme::{COLOR_ACCENT, COLOR_TEXT_MEDIUM};
use crate::error::{ReportError, ReportResult};

/// A4 portrait in points
pub const A4: PageSize = PageSize { width: 595.28, height: 841.89 };

/// Distance of the footer rule above the bottom edge
pub const FOOTER_OFFSET: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self { top: 80.0, bottom: 70.0, left: 50.0, right: 50.0 }
    }
}

/// Encoded raster image (PNG) with its pixel size
#[derive(Clone, PartialEq)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("bytes", &self.png.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// One drawing primitive; `y` is the top edge
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        width: f32,
        text: String,
        font: FontStyle,
        size: f32,
        color: (u8, u8, u8),
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: (u8, u8, u8),
        radius: Option<f32>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: (u8, u8, u8),
        width: f32,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: RasterImage,
    },
}

impl DrawOp {
    pub fn bounds(&self) -> Bounds {
        match self {
            DrawOp::Text { x, y, width, size, .. } => Bounds {
                x: *x,
                y: *y,
                width: *width,
                height: metrics::line_height(*size),
            },
            DrawOp::Rect { x, y, width, height, .. } | DrawOp::Image { x, y, width, height, .. } => {
                Bounds { x: *x, y: *y, width: *width, height: *height }
            }
            DrawOp::Line { x1, y1, x2, y2, width, .. } => Bounds {
                x: x1.min(*x2),
                y: y1.min(*y2) - width / 2.0,
                width: (x2 - x1).abs(),
                height: (y2 - y1).abs() + width,
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    pub size: PageSize,
    pub margins: Margins,
    ops: Vec<DrawOp>,
}

impl Page {
    /// Lowest y content may reach before the bottom margin
    pub fn content_bottom(&self) -> f32 {
        self.size.height - self.margins.bottom
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text)
    }
}

/// Footer band stamped on every page by [`Document::finalize`]
#[derive(Debug, Clone, PartialEq)]
pub struct FooterStyle {
    pub rule_color: (u8, u8, u8),
    pub rule_width: f32,
    pub page_numbers: bool,
    pub label_size: f32,
    pub label_color: (u8, u8, u8),
}

impl Default for FooterStyle {
    fn default() -> Self {
        Self {
            rule_color: COLOR_ACCENT,
            rule_width: 1.0,
            page_numbers: true,
            label_size: 8.0,
            label_color: COLOR_TEXT_MEDIUM,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    pages: Vec<Page>,
    finalized: bool,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
            finalized: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// All text content in page order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }

    /// Append a new empty page and return its index
    pub fn add_page(&mut self, size: PageSize, margins: Margins) -> ReportResult<usize> {
        self.ensure_open()?;
        let index = self.pages.len();
        self.pages.push(Page { index, size, margins, ops: Vec::new() });
        Ok(index)
    }

    /// Append an op to the last page
    pub fn push(&mut self, op: DrawOp) -> ReportResult<()> {
        self.ensure_open()?;
        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| ReportError::Layout("no page to draw on".to_string()))?;
        page.ops.push(op);
        Ok(())
    }

    fn ensure_open(&self) -> ReportResult<()> {
        if self.finalized {
            Err(ReportError::Layout("document is finalized".to_string()))
        } else {
            Ok(())
        }
    }

    /// Stamp the footer band on every page and seal the document
    ///
    /// Returns `false` without touching anything when already finalized.
    pub fn finalize(&mut self, style: &FooterStyle) -> bool {
        if self.finalized {
            return false;
        }

        let total = self.pages.len();

        for page in &mut self.pages {
            let rule_y = page.size.height - FOOTER_OFFSET;
            let left = page.margins.left;
            let right = page.size.width - page.margins.right;

            page.ops.push(DrawOp::Line {
                x1: left,
                y1: rule_y,
                x2: right,
                y2: rule_y,
                color: style.rule_color,
                width: style.rule_width,
            });

            if style.page_numbers {
                let label = format!("Page {} of {}", page.index + 1, total);
                let width = metrics::text_width(&label, FontStyle::Regular, style.label_size);
                page.ops.push(DrawOp::Text {
                    x: right - width,
                    y: rule_y + 6.0,
                    width,
                    text: label,
                    font: FontStyle::Regular,
                    size: style.label_size,
                    color: style.label_color,
                });
            }
        }

        self.finalized = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> DrawOp {
        DrawOp::Rect { x: 50.0, y: 100.0, width: 10.0, height: 10.0, color: (0, 0, 0), radius: None }
    }

    fn sample(pages: usize) -> Document {
        let mut doc = Document::new("Test");
        for _ in 0..pages {
            doc.add_page(A4, Margins::default()).unwrap();
            doc.push(rect()).unwrap();
        }
        doc
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut once = sample(3);
        assert!(once.finalize(&FooterStyle::default()));
        let snapshot: Vec<Page> = once.pages().to_vec();

        assert!(!once.finalize(&FooterStyle::default()));
        assert_eq!(once.pages(), snapshot.as_slice());

        let labels: Vec<&str> = once.texts().collect();
        assert_eq!(labels, vec!["Page 1 of 3", "Page 2 of 3", "Page 3 of 3"]);
    }

    #[test]
    fn test_append_after_finalize_fails() {
        let mut doc = sample(1);
        doc.finalize(&FooterStyle::default());
        assert!(matches!(doc.push(rect()), Err(ReportError::Layout(_))));
        assert!(matches!(doc.add_page(A4, Margins::default()), Err(ReportError::Layout(_))));
    }

    #[test]
    fn test_push_without_page_fails() {
        let mut doc = Document::new("Empty");
        assert!(doc.push(rect()).is_err());
    }

    #[test]
    fn test_footer_stays_below_content_area() {
        let mut doc = sample(1);
        doc.finalize(&FooterStyle { page_numbers: false, ..Default::default() });
        let ops = doc.pages()[0].ops();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], rect());

        let footer = ops[1].bounds();
        assert!(footer.y > doc.pages()[0].content_bottom());
        assert_eq!(footer.x, 50.0);
        assert!((footer.width - (A4.width - 100.0)).abs() < 1e-3);
    }
}
