//! PDF renderer – takes a [`Label`] and produces PDF bytes using `printpdf`
//! (v0.8 ops-based API).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use printpdf::*;
use thiserror::Error;

use crate::fonts::{FontManager, FontStyle};
use crate::label::{Element, Label};

const PT_TO_MM: f32 = 0.352778;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {reason}")]
    ImageDecode { path: String, reason: String },
    #[error("failed to embed {style} font")]
    Font { style: &'static str },
}

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// The face a text run is written with.
#[derive(Clone)]
enum PdfFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

/// Render a label into PDF bytes.
///
/// Every image must be readable; a missing or undecodable file fails the
/// whole render rather than producing a label without its logo.
pub fn render_pdf(label: &Label, fonts: &FontManager) -> Result<Vec<u8>, RenderError> {
    let page_w = Mm(label.page_width_pt * PT_TO_MM);
    let page_h = Mm(label.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&label.title);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    // ── Fonts ─────────────────────────────────────────────────────────────
    let mut faces: HashMap<FontStyle, PdfFont> = HashMap::new();
    for style in [FontStyle::Regular, FontStyle::Bold] {
        let face = match fonts.font_bytes(style) {
            Some(bytes) => {
                let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings).ok_or(
                    RenderError::Font {
                        style: style.name(),
                    },
                )?;
                PdfFont::Embedded(doc.add_font(&parsed))
            }
            None => PdfFont::Builtin(style.builtin_font()),
        };
        faces.insert(style, face);
    }

    // ── Images ────────────────────────────────────────────────────────────
    let mut images: HashMap<PathBuf, ImageResource> = HashMap::new();
    for element in &label.elements {
        if let Element::Image { path, .. } = element {
            if !images.contains_key(path) {
                let res = load_image(&mut doc, path, &mut warnings)?;
                images.insert(path.clone(), res);
            }
        }
    }

    // ── Page ──────────────────────────────────────────────────────────────
    let mut ops = Vec::new();
    for element in &label.elements {
        match element {
            Element::Image {
                path,
                x,
                y,
                width,
                height,
            } => {
                if let Some(res) = images.get(path) {
                    render_image(&mut ops, res, *x, *y, *width, *height, label.page_height_pt);
                }
            }
            Element::Text {
                text,
                x,
                y,
                style,
                font_size,
            } => {
                // Both styles are inserted above.
                let face = &faces[style];
                let baseline = label.page_height_pt - y - fonts.ascender_pt(*font_size, *style);
                render_text(&mut ops, face, text, *x, baseline, *font_size);
            }
        }
    }

    for warning in &warnings {
        log::debug!("printpdf: {warning:?}");
    }

    doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    Ok(bytes)
}

fn load_image(
    doc: &mut PdfDocument,
    path: &Path,
    warnings: &mut Vec<PdfWarnMsg>,
) -> Result<ImageResource, RenderError> {
    let bytes = std::fs::read(path).map_err(|source| RenderError::ImageRead {
        path: path.display().to_string(),
        source,
    })?;

    // Decode with the `image` crate to obtain pixel dimensions.
    let dyn_img = ::image::load_from_memory(&bytes).map_err(|e| RenderError::ImageDecode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let (px_width, px_height) = (dyn_img.width(), dyn_img.height());

    let raw = RawImage::decode_from_bytes(&bytes, warnings).map_err(|e| {
        RenderError::ImageDecode {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(ImageResource {
        xobj_id: doc.add_image(&raw),
        px_width,
        px_height,
    })
}

fn render_image(
    ops: &mut Vec<Op>,
    res: &ImageResource,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    page_height: f32,
) {
    // PDF origin is bottom-left; label origin is top-left.
    let img_bottom_y = page_height - y - height;

    // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px_dim.
    let scale_x = if res.px_width > 0 {
        width / res.px_width as f32
    } else {
        1.0
    };
    let scale_y = if res.px_height > 0 {
        height / res.px_height as f32
    } else {
        1.0
    };

    ops.push(Op::UseXobject {
        id: res.xobj_id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(x)),
            translate_y: Some(Pt(img_bottom_y)),
            dpi: Some(72.0),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            rotate: None,
        },
    });
}

fn render_text(ops: &mut Vec<Op>, face: &PdfFont, text: &str, x: f32, baseline: f32, size: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x),
            y: Pt(baseline),
        },
    });
    ops.push(Op::SetFillColor {
        col: Color::Rgb(Rgb {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            icc_profile: None,
        }),
    });
    match face {
        PdfFont::Builtin(font) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size),
                font: *font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(text))],
                font: *font,
            });
        }
        PdfFont::Embedded(id) => {
            ops.push(Op::SetFontSize {
                size: Pt(size),
                font: id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font: id.clone(),
            });
        }
    }
    ops.push(Op::EndTextSection);
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s.chars().map(winlatin_byte).collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0xFF; printpdf passes these
    // bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

/// Windows-1252 code for `c`, `?` when the code page has none.
fn winlatin_byte(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80, // euro
        '\u{201A}' => 0x82, // single low quote
        '\u{0192}' => 0x83, // florin
        '\u{201E}' => 0x84, // double low quote
        '\u{2026}' => 0x85, // ellipsis
        '\u{2020}' => 0x86, // dagger
        '\u{2021}' => 0x87, // double dagger
        '\u{02C6}' => 0x88, // circumflex
        '\u{2030}' => 0x89, // per mille
        '\u{0160}' => 0x8A, // S caron
        '\u{2039}' => 0x8B, // single left angle quote
        '\u{0152}' => 0x8C, // OE
        '\u{017D}' => 0x8E, // Z caron
        '\u{2018}' => 0x91, // left single quote
        '\u{2019}' => 0x92, // right single quote
        '\u{201C}' => 0x93, // left double quote
        '\u{201D}' => 0x94, // right double quote
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96, // en-dash
        '\u{2014}' => 0x97, // em-dash
        '\u{02DC}' => 0x98, // small tilde
        '\u{2122}' => 0x99, // trade mark
        '\u{0161}' => 0x9A, // s caron
        '\u{203A}' => 0x9B, // single right angle quote
        '\u{0153}' => 0x9C, // oe
        '\u{017E}' => 0x9E, // z caron
        '\u{0178}' => 0x9F, // Y diaeresis
        '\u{00A0}' => 0x20, // non-breaking space -> space
        // C1 controls have no glyph in WinAnsiEncoding.
        c if ('\u{80}'..='\u{9F}').contains(&c) => b'?',
        c if (c as u32) < 256 => c as u8,
        _ => b'?',
    }
}
