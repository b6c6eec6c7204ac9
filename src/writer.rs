//! Line writer – a cursor over a [`Label`] that word-wraps text at the
//! printable width and turns extra trailing newlines into blank space.

use std::path::Path;

use crate::fonts::{wrap_text, FontManager, FontStyle};
use crate::label::{Element, Label};

/// Vertical advance per written row, in points.
pub const LINE_SPACING_PT: f32 = 13.0;
/// Font size for every row on the slip.
pub const FONT_SIZE_PT: f32 = 10.0;

/// Horizontal page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
}

/// Writes rows onto a label, top to bottom. `y` never decreases through
/// [`LineWriter::write_line`] or [`LineWriter::br`]; nothing is paginated.
pub struct LineWriter<'a> {
    label: &'a mut Label,
    fonts: &'a FontManager,
    margins: Margins,
    x: f32,
    y: f32,
    style: FontStyle,
}

impl<'a> LineWriter<'a> {
    pub fn new(label: &'a mut Label, fonts: &'a FontManager, margins: Margins) -> Self {
        Self {
            label,
            fonts,
            margins,
            x: margins.left,
            y: 0.0,
            style: FontStyle::Regular,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    pub fn page_height(&self) -> f32 {
        self.label.page_height_pt
    }

    /// Wrap boundary: page width minus the right margin.
    pub fn printable_width(&self) -> f32 {
        self.label.page_width_pt - self.margins.right
    }

    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn set_style(&mut self, style: FontStyle) {
        self.style = style;
    }

    /// Line break: back to the left margin, down by `height`.
    pub fn br(&mut self, height: f32) {
        self.x = self.margins.left;
        self.y += height;
    }

    /// Write `s`, wrapped at the printable width, one row per wrapped
    /// segment. A single trailing newline is the normal end of line; each
    /// newline beyond the first adds one blank row of spacing.
    pub fn write_line(&mut self, s: &str) {
        let trimmed = s.trim_end_matches('\n');
        let newlines = s.len() - trimmed.len();

        if !trimmed.trim().is_empty() {
            let rows = wrap_text(
                trimmed,
                FONT_SIZE_PT,
                self.style,
                self.printable_width(),
                self.fonts,
            );
            for row in rows {
                if !row.is_empty() {
                    self.label.push(Element::Text {
                        text: row,
                        x: self.x,
                        y: self.y,
                        style: self.style,
                        font_size: FONT_SIZE_PT,
                    });
                }
                self.br(LINE_SPACING_PT);
            }
        }

        if newlines > 1 {
            self.br(LINE_SPACING_PT * (newlines - 1) as f32);
        }
    }

    /// Place an image with its top-left corner at the cursor, at its native
    /// size (one pixel per point). Does not move the cursor.
    pub fn image(&mut self, path: &Path) -> Result<(), image::ImageError> {
        let (width, height) = image::image_dimensions(path)?;
        self.label.push(Element::Image {
            path: path.to_path_buf(),
            x: self.x,
            y: self.y,
            width: width as f32,
            height: height as f32,
        });
        Ok(())
    }
}
