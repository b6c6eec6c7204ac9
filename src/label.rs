//! Label layout – the intermediate representation between slip composition
//! and PDF rendering. This is the "frozen" structure that encodes exactly
//! what goes on the page, in draw order.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::fonts::FontStyle;

/// Label width in PDF points (2 in).
pub const PAGE_WIDTH_PT: f32 = 144.0;
/// Label height in PDF points (7 in).
pub const PAGE_HEIGHT_PT: f32 = 504.0;

/// A complete single-page label ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "Label::default_title")]
    pub title: String,
    /// Width of the page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of the page in PDF points.
    pub page_height_pt: f32,
    /// Everything drawn on the page, in draw order.
    pub elements: Vec<Element>,
}

/// One drawn item. Coordinates are the top-left corner relative to the page
/// top-left, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Image {
        path: PathBuf,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        style: FontStyle,
        font_size: f32,
    },
}

impl Label {
    /// An empty 144×504 pt packing slip label.
    pub fn packing_slip() -> Self {
        Self {
            title: Self::default_title(),
            page_width_pt: PAGE_WIDTH_PT,
            page_height_pt: PAGE_HEIGHT_PT,
            elements: Vec::new(),
        }
    }

    fn default_title() -> String {
        "Packing slip".to_string()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Text of every text element, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.as_str()),
                Element::Image { .. } => None,
            })
            .collect()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
