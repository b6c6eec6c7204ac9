//! Font loading and text measurement using `ttf-parser`.
//!
//! A label uses exactly two faces, regular and bold. Without TrueType files
//! the builtin Helvetica pair is used; its metrics come from the subset faces
//! printpdf ships, so wrapping matches what the PDF viewer draws.

use std::collections::HashMap;
use std::path::Path;

use printpdf::BuiltinFont;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a TrueType face.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font {name}: {reason}")]
    Parse { name: String, reason: String },
}

/// The two faces a label is written with.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
}

impl FontStyle {
    pub fn name(self) -> &'static str {
        match self {
            FontStyle::Regular => "regular",
            FontStyle::Bold => "bold",
        }
    }

    /// The standard PDF face used when no TrueType file is configured.
    pub fn builtin_font(self) -> BuiltinFont {
        match self {
            FontStyle::Regular => BuiltinFont::Helvetica,
            FontStyle::Bold => BuiltinFont::HelveticaBold,
        }
    }
}

/// Width of a space in Helvetica (both weights), as a fraction of the em.
/// The builtin subset faces carry no space glyph.
const HELVETICA_SPACE_EM: f32 = 0.278;

/// A font face with the metrics used for layout.
#[derive(Clone)]
pub struct FontData {
    /// TrueType bytes, used for measurement and, unless builtin, embedding.
    pub bytes: Vec<u8>,
    /// Set when the face is a standard PDF font written by name.
    pub builtin: Option<BuiltinFont>,
    pub units_per_em: f32,
    pub ascender: f32,
}

impl FontData {
    fn parse(bytes: Vec<u8>, builtin: Option<BuiltinFont>, name: &str) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(&bytes, 0).map_err(|e| FontError::Parse {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            builtin,
            bytes,
        })
    }

    /// Helvetica metrics from the subset face bundled with printpdf. Should
    /// that face ever fail to parse, fall back to Helvetica's AFM ascender
    /// and the average-width estimate.
    fn builtin(font: BuiltinFont) -> Self {
        let bytes = font.get_subset_font().bytes;
        Self::parse(bytes, Some(font), font.get_id()).unwrap_or_else(|e| {
            log::warn!("{e}; estimating builtin text widths");
            Self {
                bytes: Vec::new(),
                builtin: Some(font),
                units_per_em: 1000.0,
                ascender: 718.0,
            }
        })
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin.is_some()
    }
}

/// Manages the regular and bold faces.
pub struct FontManager {
    fonts: HashMap<FontStyle, FontData>,
}

impl FontManager {
    /// Builtin Helvetica for both styles.
    pub fn new() -> Self {
        let fonts = [FontStyle::Regular, FontStyle::Bold]
            .into_iter()
            .map(|style| (style, FontData::builtin(style.builtin_font())))
            .collect();
        Self { fonts }
    }

    /// Replace the face for `style` with a TTF/OTF font from bytes.
    pub fn load_font(&mut self, style: FontStyle, bytes: Vec<u8>) -> Result<(), FontError> {
        let data = FontData::parse(bytes, None, style.name())?;
        self.fonts.insert(style, data);
        Ok(())
    }

    /// Read a font file from disk and load it for `style`.
    pub fn load_font_file(&mut self, style: FontStyle, path: &Path) -> Result<(), FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.load_font(style, bytes)?;
        log::info!("Loaded {} face from {}", style.name(), path.display());
        Ok(())
    }

    pub fn get(&self, style: FontStyle) -> &FontData {
        // Both styles are inserted at construction and never removed.
        &self.fonts[&style]
    }

    /// Measure the width of a string at a given font size, in points, by
    /// summing glyph advances.
    ///
    /// Whitespace without a glyph counts as a Helvetica space. Any other
    /// unmapped character is measured as `?`, which is what the builtin
    /// faces draw in its place.
    pub fn measure_text_width(&self, text: &str, font_size: f32, style: FontStyle) -> f32 {
        let data = self.get(style);

        let Ok(face) = ttf_parser::Face::parse(&data.bytes, 0) else {
            return text.chars().count() as f32 * font_size * 0.5;
        };

        let scale = font_size / data.units_per_em;
        let advance = |ch: char| {
            face.glyph_index(ch)
                .and_then(|gid| face.glyph_hor_advance(gid))
                .map(|units| units as f32 * scale)
        };

        text.chars()
            .map(|ch| match advance(ch) {
                Some(width) => width,
                None if ch.is_whitespace() => font_size * HELVETICA_SPACE_EM,
                None => advance('?').unwrap_or(font_size * 0.5),
            })
            .sum()
    }

    /// Ascender height in points, used to place the text baseline.
    pub fn ascender_pt(&self, font_size: f32, style: FontStyle) -> f32 {
        let data = self.get(style);
        data.ascender * font_size / data.units_per_em
    }

    /// Font bytes for embedding in the PDF, `None` for builtin faces.
    pub fn font_bytes(&self, style: FontStyle) -> Option<&[u8]> {
        self.fonts.get(&style).and_then(|d| {
            if d.is_builtin() {
                None
            } else {
                Some(d.bytes.as_slice())
            }
        })
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of rows.
///
/// Embedded newlines start a new paragraph; an empty paragraph yields an
/// empty row. A word wider than `max_width` on its own is broken at
/// character boundaries, keeping at least one character per row.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    style: FontStyle,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let fits = |s: &str| fonts.measure_text_width(s, font_size, style) <= max_width;

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };
            if fits(&candidate) {
                current_line = candidate;
                continue;
            }
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            if fits(word) {
                current_line = word.to_string();
            } else {
                let mut pieces = break_word(word, &fits);
                // The tail may still share a row with the next word.
                current_line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split a single over-wide word into the longest prefixes that fit.
fn break_word(word: &str, fits: &dyn Fn(&str) -> bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if !fits(&piece) && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_widths_use_helvetica_metrics() {
        let mgr = FontManager::default();
        // H 1479 + e 1139 + l 455 + l 455 + o 1139 = 4667 units of 2048.
        let w = mgr.measure_text_width("Hello", 10.0, FontStyle::Regular);
        assert!((w - 22.788).abs() < 0.01, "got {w}");
        let b = mgr.measure_text_width("Hello", 10.0, FontStyle::Bold);
        assert!(b > w);
        let space = mgr.measure_text_width(" ", 10.0, FontStyle::Regular);
        assert!((space - 2.78).abs() < 0.01, "got {space}");
    }

    #[test]
    fn builtin_ascender_comes_from_the_face() {
        let mgr = FontManager::default();
        // hhea ascender 1577 of 2048.
        let asc = mgr.ascender_pt(10.0, FontStyle::Regular);
        assert!((asc - 7.70).abs() < 0.01, "got {asc}");
        assert!(mgr.font_bytes(FontStyle::Regular).is_none());
    }

    #[test]
    fn uppercase_address_wraps_at_real_width() {
        let mgr = FontManager::default();
        // 25 chars; roughly 178 pt of real Helvetica at 10 pt.
        let text = "WOODWARD AVENUE NORTHWEST";
        assert!(mgr.measure_text_width(text, 10.0, FontStyle::Regular) > 144.0);

        let lines = wrap_text(text, 10.0, FontStyle::Regular, 144.0, &mgr);
        assert_eq!(lines, vec!["WOODWARD AVENUE".to_string(), "NORTHWEST".to_string()]);
        for line in &lines {
            assert!(mgr.measure_text_width(line, 10.0, FontStyle::Regular) <= 144.0);
        }
    }

    #[test]
    fn unmapped_chars_measure_as_question_mark() {
        let mgr = FontManager::default();
        let cjk = mgr.measure_text_width("\u{4e2d}", 10.0, FontStyle::Regular);
        let q = mgr.measure_text_width("?", 10.0, FontStyle::Regular);
        assert_eq!(cjk, q);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let lines = wrap_text("Hello world foo bar", 16.0, FontStyle::Regular, 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn short_text_is_one_row() {
        let mgr = FontManager::default();
        let lines = wrap_text("Order #1001", 10.0, FontStyle::Regular, 144.0, &mgr);
        assert_eq!(lines, vec!["Order #1001".to_string()]);
    }

    #[test]
    fn over_wide_word_is_force_broken() {
        let mgr = FontManager::default();
        // "A" is 1366/2048 em: 21 fit in 144 pt at 10 pt, 22 do not.
        let word = "A".repeat(40);
        let lines = wrap_text(&word, 10.0, FontStyle::Regular, 144.0, &mgr);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 21);
        assert_eq!(lines[1].len(), 19);
        for line in &lines {
            assert!(mgr.measure_text_width(line, 10.0, FontStyle::Regular) <= 144.0);
        }
    }

    #[test]
    fn broken_tail_shares_row_with_next_word() {
        let mgr = FontManager::default();
        // "x" is exactly 5 pt at 10 pt: 28 fit, 30 do not.
        let text = format!("{} ab", "x".repeat(30));
        let lines = wrap_text(&text, 10.0, FontStyle::Regular, 144.0, &mgr);
        assert_eq!(lines, vec!["x".repeat(28), "xx ab".to_string()]);
    }

    #[test]
    fn embedded_blank_paragraph_is_empty_row() {
        let mgr = FontManager::default();
        let lines = wrap_text("Thanks\n\nBye", 10.0, FontStyle::Regular, 144.0, &mgr);
        assert_eq!(lines, vec!["Thanks".to_string(), String::new(), "Bye".to_string()]);
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let mut mgr = FontManager::new();
        let err = mgr.load_font(FontStyle::Bold, vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, FontError::Parse { .. }));
        assert!(mgr.font_bytes(FontStyle::Bold).is_none());
    }
}
