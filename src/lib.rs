//! Indonesia Export-Import Dashboard
//!
//! Loads the BPS monthly export-import CSV and derives the yearly totals,
//! growth rates and trade balance a dashboard displays.

pub mod charts;
pub mod dashboard;
pub mod data;
pub mod report;
pub mod stats;

pub use dashboard::{DashboardView, HeadlineMetrics, SummaryColumn};
pub use data::{
    DataLoader, DataProcessor, Dataset, LoaderError, Measure, MeasureSet, MonthlyTotal, Period,
    RangeError, TradeRecord, YearRange, YearlyAggregate,
};
pub use stats::{BalanceRow, GrowthRow, StatsCalculator, StatsError, TradeBalance};
