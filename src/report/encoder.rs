//! PDF encoding (printpdf)
//!
//! Turns a finalized [`Document`] into PDF bytes. Documents use top-left-origin points;
//! printpdf wants bottom-left-origin millimetres, so every coordinate is flipped and
//! converted here and nowhere else.

use std::io::{BufWriter, Cursor, Write};

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use tracing::debug;

use super::document::{Document, DrawOp, RasterImage};
use super::metrics::{fold_to_ascii, FontStyle};
use crate::error::{ReportError, ReportResult};

/// Baseline offset from the top of a text line, as a fraction of font size
const BASELINE_RATIO: f32 = 0.855;

/// Segments per quarter circle for rounded corners
const ARC_SEGMENTS: usize = 8;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn rgb_to_printpdf(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

fn encoding_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Encoding(e.to_string())
}

/// Point in document space (top-left origin, points) to a printpdf point
fn pdf_point(x: f32, y: f32, page_height: f32) -> Point {
    Point::new(pt_to_mm(x), pt_to_mm(page_height - y))
}

/// Encode a finalized document to PDF bytes
pub fn encode(document: &Document) -> ReportResult<Vec<u8>> {
    if !document.is_finalized() {
        return Err(ReportError::Encoding("document is not finalized".to_string()));
    }
    let first = document
        .pages()
        .first()
        .ok_or_else(|| ReportError::Encoding("document has no pages".to_string()))?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        fold_to_ascii(document.title()),
        pt_to_mm(first.size.width),
        pt_to_mm(first.size.height),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(encoding_err)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(encoding_err)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(encoding_err)?,
    };

    for page in document.pages() {
        let layer = if page.index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(
                pt_to_mm(page.size.width),
                pt_to_mm(page.size.height),
                format!("Page {}", page.index + 1),
            );
            doc.get_page(p).get_layer(l)
        };

        for op in page.ops() {
            draw_op(&layer, &fonts, page.size.height, op)?;
        }
    }

    let mut bytes = Vec::new();
    {
        let mut writer = BufWriter::new(&mut bytes);
        doc.save(&mut writer).map_err(encoding_err)?;
        writer.flush().map_err(encoding_err)?;
    }

    debug!(pages = document.page_count(), bytes = bytes.len(), "encoded document");
    Ok(bytes)
}

fn draw_op(layer: &PdfLayerReference, fonts: &Fonts, page_height: f32, op: &DrawOp) -> ReportResult<()> {
    match op {
        DrawOp::Text { x, y, text, font, size, color, .. } => {
            let baseline = y + size * BASELINE_RATIO;
            layer.set_fill_color(rgb_to_printpdf(*color));
            layer.use_text(
                fold_to_ascii(text),
                *size,
                pt_to_mm(*x),
                pt_to_mm(page_height - baseline),
                fonts.get(*font),
            );
        }
        DrawOp::Rect { x, y, width, height, color, radius } => {
            layer.set_fill_color(rgb_to_printpdf(*color));
            let points = match radius {
                Some(r) if *r > 0.0 => rounded_rect_points(*x, *y, *width, *height, *r, page_height),
                _ => vec![
                    (pdf_point(*x, *y, page_height), false),
                    (pdf_point(x + width, *y, page_height), false),
                    (pdf_point(x + width, y + height, page_height), false),
                    (pdf_point(*x, y + height, page_height), false),
                ],
            };
            layer.add_polygon(Polygon {
                rings: vec![points],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
        DrawOp::Line { x1, y1, x2, y2, color, width } => {
            layer.set_outline_color(rgb_to_printpdf(*color));
            layer.set_outline_thickness(*width);
            layer.add_line(Line {
                points: vec![
                    (pdf_point(*x1, *y1, page_height), false),
                    (pdf_point(*x2, *y2, page_height), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Image { x, y, width, height, image } => {
            let (px_width, px_height) = png_dimensions(image)?;
            let dynamic_image = printpdf::image_crate::load_from_memory(&image.png).map_err(encoding_err)?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            // At 72 dpi one pixel is one point
            let transform = ImageTransform {
                translate_x: Some(pt_to_mm(*x)),
                translate_y: Some(pt_to_mm(page_height - (y + height))),
                scale_x: Some(width / px_width as f32),
                scale_y: Some(height / px_height as f32),
                dpi: Some(72.0),
                ..Default::default()
            };
            pdf_image.add_to_layer(layer.clone(), transform);
        }
    }
    Ok(())
}

/// Pixel size from the PNG header; rejects buffers that are not a readable image
fn png_dimensions(image: &RasterImage) -> ReportResult<(u32, u32)> {
    let (width, height) = ::image::ImageReader::new(Cursor::new(&image.png))
        .with_guessed_format()
        .map_err(encoding_err)?
        .into_dimensions()
        .map_err(|e| ReportError::Encoding(format!("malformed image: {}", e)))?;
    if width == 0 || height == 0 {
        return Err(ReportError::Encoding("image has no pixels".to_string()));
    }
    Ok((width, height))
}

/// Outline of a rounded rectangle, corners approximated by line segments
fn rounded_rect_points(x: f32, y: f32, w: f32, h: f32, radius: f32, page_height: f32) -> Vec<(Point, bool)> {
    let r = radius.min(w / 2.0).min(h / 2.0);
    let half_pi = std::f32::consts::FRAC_PI_2;

    // Corner centers in document space with their start angles (y grows downward)
    let corners = [
        (x + w - r, y + r, -half_pi),    // top-right
        (x + w - r, y + h - r, 0.0),     // bottom-right
        (x + r, y + h - r, half_pi),     // bottom-left
        (x + r, y + r, 2.0 * half_pi),   // top-left
    ];

    let mut points = Vec::with_capacity(4 * (ARC_SEGMENTS + 1));
    for (cx, cy, start) in corners {
        for i in 0..=ARC_SEGMENTS {
            let angle = start + half_pi * i as f32 / ARC_SEGMENTS as f32;
            points.push((pdf_point(cx + r * angle.cos(), cy + r * angle.sin(), page_height), false));
        }
    }
    points
}
