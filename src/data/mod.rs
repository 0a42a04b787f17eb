//! Data module - CSV loading, typed records and grouping

mod loader;
mod processor;
mod record;

pub use loader::{DataLoader, Dataset, LoaderError};
pub use processor::{DataProcessor, MonthlyTotal, RangeError, YearRange, YearlyAggregate};
pub use record::{Measure, MeasureSet, Period, PeriodParseError, TradeRecord, PERIOD_COLUMN};
