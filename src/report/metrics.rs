//! Text metrics for the builtin Helvetica faces
//!
//! Advance widths come from the standard Adobe AFM tables (units per 1000 em), so measuring
//! text needs no font files and always gives the same answer.

use serde::Serialize;

/// Builtin font face used for a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// Line height as a multiple of font size
pub const LINE_HEIGHT: f32 = 1.2;

/// Width used for characters outside the tables
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica, ASCII 32..=126
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold, ASCII 32..=126
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

fn glyph_width(ch: char, font: FontStyle) -> u16 {
    let table = match font {
        FontStyle::Bold => &HELVETICA_BOLD,
        // Helvetica-Oblique shares the upright advance widths
        FontStyle::Regular | FontStyle::Italic => &HELVETICA,
    };
    let code = ch as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Width of a single line of text in points
pub fn text_width(text: &str, font: FontStyle, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c, font) as u32).sum();
    units as f32 * size / 1000.0
}

pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT
}

/// Replace characters the builtin fonts cannot show with close ASCII equivalents
pub fn fold_to_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            '¿' | '¡' => ' ',
            '\t' => ' ',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap to `max_width` points
///
/// Explicit newlines always break. Words wider than the line are split by character.
/// Never returns an empty vector; blank input yields one empty line.
pub fn wrap(text: &str, font: FontStyle, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font, size, max_width, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(paragraph: &str, font: FontStyle, size: f32, max_width: f32, lines: &mut Vec<String>) {
    let space = text_width(" ", font, size);
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in paragraph.split_whitespace() {
        let word_width = text_width(word, font, size);

        if !current.is_empty() && current_width + space + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += space + word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if word_width <= max_width {
            current.push_str(word);
            current_width = word_width;
        } else {
            // Break an overlong word into chunks that fit
            let mut chunk = String::new();
            let mut chunk_width = 0.0;
            for ch in word.chars() {
                let w = glyph_width(ch, font) as f32 * size / 1000.0;
                if !chunk.is_empty() && chunk_width + w > max_width {
                    lines.push(std::mem::take(&mut chunk));
                    chunk_width = 0.0;
                }
                chunk.push(ch);
                chunk_width += w;
            }
            current = chunk;
            current_width = chunk_width;
        }
    }

    lines.push(current);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "Hello" in Helvetica: 722 + 556 + 222 + 222 + 556 = 2278
        assert!((text_width("Hello", FontStyle::Regular, 10.0) - 22.78).abs() < 1e-4);
        assert!(text_width("Hello", FontStyle::Bold, 10.0) > text_width("Hello", FontStyle::Regular, 10.0));
        assert_eq!(text_width("abc", FontStyle::Italic, 12.0), text_width("abc", FontStyle::Regular, 12.0));
    }

    #[test]
    fn test_wrap_greedy() {
        let lines = wrap("one two three four five six", FontStyle::Regular, 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, FontStyle::Regular, 10.0) <= 60.0);
        }
        assert_eq!(lines.join(" "), "one two three four five six");
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let word = "x".repeat(100);
        let lines = wrap(&word, FontStyle::Regular, 10.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        assert!(lines.iter().all(|l| text_width(l, FontStyle::Regular, 10.0) <= 50.0));
    }

    #[test]
    fn test_wrap_blank_is_one_line() {
        assert_eq!(wrap("", FontStyle::Regular, 10.0, 100.0), vec![String::new()]);
        assert_eq!(wrap("a\nb", FontStyle::Regular, 10.0, 100.0), vec!["a", "b"]);
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("José Pérez Núñez"), "Jose Perez Nunez");
        assert_eq!(fold_to_ascii("心"), "?");
    }
}
