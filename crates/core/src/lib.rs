//! Core library for deedscan
//!
//! This crate implements the **Functional Core** of the deedscan application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`deedscan_core`** (this crate): Pure transformation functions with zero I/O
//! - **`deedscan`**: Rasterization, OCR, LLM calls, drawing and file output
//!   (the Imperative Shell)
//!
//! Every function here is deterministic and testable with fixture data. The
//! shell owns the collaborators (OCR engine, completion model, image
//! rasterizer) and feeds their outputs through these transformations.
//!
//! # Module Organization
//!
//! - [`ocr`]: OCR document model, text flattening, Tesseract TSV decoding
//! - [`prompt`]: Field extraction prompts sent to the completion model
//! - [`repair`]: Sanitizing and parsing model responses into JSON
//! - [`fields`]: Typed deed field map with tolerated unknown keys
//! - [`legend`]: Static field-to-color legend
//! - [`overlay`]: Matching OCR words to extracted values, pixel geometry
//! - [`summary`]: Layout of the summary canvas
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use deedscan_core::{flatten_text, parse_response, plan_page_overlays};
//!
//! let text = flatten_text(&document);
//! // ... send `build_prompt(&text)` to the model ...
//! let extraction = parse_response(&raw_response)?;
//! let overlays = plan_page_overlays(&document.pages[0], &extraction.fields, 1700, 2200);
//! ```

pub mod fields;
pub mod legend;
pub mod ocr;
pub mod overlay;
pub mod prompt;
pub mod repair;
pub mod summary;

pub use fields::{DeedFields, FIELD_NAMES, NOT_SPECIFIED};
pub use legend::Rgb;
pub use ocr::{flatten_text, Block, Geometry, Line, OcrDocument, Page, Word};
pub use overlay::{plan_page_overlays, Overlay, PixelBox};
pub use prompt::{build_prompt, ExtractionRequest, SYSTEM_PREAMBLE};
pub use repair::{parse_response, sanitize_response, to_canonical_json, Extraction, RepairError};
pub use summary::{layout_summary, SummaryLayout};
