pub mod flatten;
pub mod tsv;
pub mod types;

pub use flatten::flatten_text;
pub use tsv::{parse_tsv, TsvError};
pub use types::{Block, Geometry, Line, OcrDocument, Page, Word};
