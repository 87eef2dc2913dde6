pub mod lint;

pub use lint::lint;
