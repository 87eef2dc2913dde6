use serde::{Deserialize, Serialize};

/// Word bounding box as two normalized corners, relative to the page size.
///
/// All coordinates lie in `[0, 1]`; `(x_min, y_min)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Geometry {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Geometry {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

/// A recognized word and where it sits on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub value: String,
    pub geometry: Geometry,
    /// Recognition confidence in `[0, 100]` when the engine reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Word {
    pub fn new(value: impl Into<String>, geometry: Geometry) -> Self {
        Word {
            value: value.into(),
            geometry,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub lines: Vec<Line>,
}

/// One OCR'd page. Its index in [`OcrDocument::pages`] matches the index of
/// the rasterized page image it was recognized from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

impl Page {
    /// Iterate every word on the page in block/line/word order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.blocks
            .iter()
            .flat_map(|block| block.lines.iter())
            .flat_map(|line| line.words.iter())
    }
}

/// Hierarchical OCR output for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    pub pages: Vec<Page>,
}

impl OcrDocument {
    /// Total number of lines across all pages and blocks.
    pub fn line_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| page.blocks.iter())
            .map(|block| block.lines.len())
            .sum()
    }
}
