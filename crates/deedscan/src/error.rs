use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("PDF not found: {0}")]
    PdfNotFound(PathBuf),

    #[error("Failed to read PDF {path}: {reason}")]
    PdfUnreadable { path: PathBuf, reason: String },

    #[error("PDF has {expected} pages but {found} page images were rendered")]
    PageCountMismatch { expected: usize, found: usize },

    #[error("No rasterized image for OCR page {0}")]
    MissingPageImage(usize),

    #[error("{tool} is not installed or not on PATH")]
    ToolMissing { tool: &'static str },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },

    #[error("Model completion failed: {0}")]
    Completion(String),

    #[error(transparent)]
    Format(#[from] deedscan_core::RepairError),
}
