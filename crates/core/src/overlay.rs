use serde::Serialize;

use crate::fields::{label, DeedFields};
use crate::legend::{overlay_color, Rgb};
use crate::ocr::{Geometry, Page};

/// Word box in page pixels. Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBox {
    /// Scale normalized geometry to a `width` x `height` image, truncating
    /// toward zero.
    pub fn from_geometry(geometry: &Geometry, width: u32, height: u32) -> Self {
        let w = width as f64;
        let h = height as f64;
        PixelBox {
            x0: (geometry.x_min * w) as i32,
            y0: (geometry.y_min * h) as i32,
            x1: (geometry.x_max * w) as i32,
            y1: (geometry.y_max * h) as i32,
        }
    }
}

/// One highlight: an OCR word tied to one extracted field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub bbox: PixelBox,
    pub field: String,
    pub label: String,
    pub color: Rgb,
    pub word: String,
}

/// Lower-cased whitespace tokens of a field value.
pub fn value_tokens(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Whole-token, case-insensitive match of an OCR word against a field value.
///
/// `"Street"` matches `"Main Street"`; `"St"` does not.
pub fn word_matches(word: &str, value: &str) -> bool {
    let word = word.to_lowercase();
    value_tokens(value).iter().any(|token| *token == word)
}

/// Compute every overlay for one page.
///
/// Each word is tested against each present field; a word matching several
/// fields yields one overlay per field, in the order the model returned the
/// fields, so later fields are drawn on top. Sentinel and empty values never
/// match.
pub fn plan_page_overlays(
    page: &Page,
    fields: &DeedFields,
    width: u32,
    height: u32,
) -> Vec<Overlay> {
    let targets: Vec<(&str, Vec<String>)> = fields
        .present()
        .into_iter()
        .map(|entry| (entry.name, value_tokens(&entry.value)))
        .collect();

    let mut overlays = Vec::new();

    for word in page.words() {
        let text = word.value.to_lowercase();

        for (name, tokens) in &targets {
            if tokens.iter().any(|token| *token == text) {
                overlays.push(Overlay {
                    bbox: PixelBox::from_geometry(&word.geometry, width, height),
                    field: name.to_string(),
                    label: label(name),
                    color: overlay_color(name),
                    word: word.value.clone(),
                });
            }
        }
    }

    overlays
}
