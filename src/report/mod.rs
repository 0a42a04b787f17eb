//! Report module - Presentation-side formatting and table export

pub mod format;
mod table;

pub use table::{ExportError, TableExporter, BALANCE_COLUMN, CLASSIFICATION_COLUMN, YEAR_COLUMN};
