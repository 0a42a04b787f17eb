//! Data Processor Module
//! Year-range filtering and grouping of trade records by year and by month.

use super::loader::Dataset;
use super::record::{MeasureSet, Period, TradeRecord};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Year range is inverted: {start} > {end}")]
    Inverted { start: i32, end: i32 },
    #[error("Dataset is empty, no year bounds available")]
    EmptyDataset,
}

/// Inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    /// Clamp each bound independently into `bounds`.
    pub fn clamp_to(&self, bounds: YearRange) -> YearRange {
        YearRange {
            start: self.start.clamp(bounds.start, bounds.end),
            end: self.end.clamp(bounds.start, bounds.end),
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Sums of the four measures over one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyAggregate {
    pub year: i32,
    pub totals: MeasureSet<f64>,
}

/// Sums of the four measures over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub period: Period,
    pub totals: MeasureSet<f64>,
}

/// Handles filtering and grouping of trade records.
pub struct DataProcessor;

impl DataProcessor {
    /// Resolve a requested range against the dataset.
    ///
    /// Missing bounds default to the dataset's bounds and every bound is
    /// clamped into them. Only a request whose two given bounds are inverted
    /// is rejected, along with an empty dataset.
    pub fn resolve_range(
        dataset: &Dataset,
        start: Option<i32>,
        end: Option<i32>,
    ) -> Result<YearRange, RangeError> {
        if let (Some(start), Some(end)) = (start, end) {
            YearRange::new(start, end)?;
        }
        let bounds = dataset.year_bounds().ok_or(RangeError::EmptyDataset)?;
        let requested = YearRange {
            start: start.unwrap_or(bounds.start),
            end: end.unwrap_or(bounds.end),
        };
        let effective = requested.clamp_to(bounds);

        if effective != requested {
            debug!("Clamped year range {} to {}", requested, effective);
        }
        Ok(effective)
    }

    /// Records whose year falls in `range`, original order preserved.
    pub fn filter_by_year_range(records: &[TradeRecord], range: YearRange) -> Vec<TradeRecord> {
        records
            .iter()
            .filter(|r| range.contains(r.year()))
            .copied()
            .collect()
    }

    /// Group records by year, summing each measure. Ascending by year, one row
    /// per year present.
    pub fn group_by_year(records: &[TradeRecord]) -> Vec<YearlyAggregate> {
        let mut groups: BTreeMap<i32, MeasureSet<f64>> = BTreeMap::new();
        for record in records {
            groups.entry(record.year()).or_default().accumulate(&record.measures);
        }

        groups
            .into_iter()
            .map(|(year, totals)| YearlyAggregate { year, totals })
            .collect()
    }

    /// Group records by month, summing each measure. Chronological order.
    pub fn group_by_month(records: &[TradeRecord]) -> Vec<MonthlyTotal> {
        let mut groups: BTreeMap<Period, MeasureSet<f64>> = BTreeMap::new();
        for record in records {
            groups.entry(record.period).or_default().accumulate(&record.measures);
        }

        groups
            .into_iter()
            .map(|(period, totals)| MonthlyTotal { period, totals })
            .collect()
    }

    /// Records sorted chronologically. Stable, so same-month rows keep file order.
    pub fn sort_by_period(records: &[TradeRecord]) -> Vec<TradeRecord> {
        let mut sorted = records.to_vec();
        sorted.sort_by_key(|r| r.period);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Measure;

    fn record(year: i32, month: u32, export_value: f64) -> TradeRecord {
        TradeRecord::new(Period::new(year, month).unwrap(), export_value, 1.0, 2.0, 3.0)
    }

    fn decade() -> Dataset {
        let mut records = Vec::new();
        for year in 2014..=2023 {
            for month in [1, 6, 12] {
                records.push(record(year, month, (year * 100 + month as i32) as f64));
            }
        }
        Dataset::from_records(records)
    }

    #[test]
    fn test_year_range_rejects_inverted() {
        assert_eq!(
            YearRange::new(2020, 2015),
            Err(RangeError::Inverted { start: 2020, end: 2015 })
        );
    }

    #[test]
    fn test_resolve_range_defaults_to_bounds() {
        let range = DataProcessor::resolve_range(&decade(), None, None).unwrap();
        assert_eq!(range, YearRange { start: 2014, end: 2023 });
    }

    #[test]
    fn test_resolve_range_clamps_each_bound() {
        let dataset = decade();
        let wide = DataProcessor::resolve_range(&dataset, Some(2000), Some(2100)).unwrap();
        assert_eq!(wide, YearRange { start: 2014, end: 2023 });

        let high = DataProcessor::resolve_range(&dataset, Some(2030), None).unwrap();
        assert_eq!(high, YearRange::single(2023));

        let low = DataProcessor::resolve_range(&dataset, None, Some(2000)).unwrap();
        assert_eq!(low, YearRange::single(2014));

        let both_high = DataProcessor::resolve_range(&dataset, Some(2030), Some(2040)).unwrap();
        assert_eq!(both_high, YearRange::single(2023));
    }

    #[test]
    fn test_resolve_range_rejects_inverted_request() {
        assert_eq!(
            DataProcessor::resolve_range(&decade(), Some(2020), Some(2015)),
            Err(RangeError::Inverted { start: 2020, end: 2015 })
        );
        assert_eq!(
            DataProcessor::resolve_range(&decade(), Some(2100), Some(2000)),
            Err(RangeError::Inverted { start: 2100, end: 2000 })
        );
    }

    #[test]
    fn test_resolve_range_on_empty_dataset() {
        let empty = Dataset::from_records(Vec::new());
        assert_eq!(
            DataProcessor::resolve_range(&empty, Some(2014), Some(2015)),
            Err(RangeError::EmptyDataset)
        );
    }

    #[test]
    fn test_filter_single_year_keeps_original_order() {
        let dataset = Dataset::from_records(vec![
            record(2016, 12, 1.0),
            record(2015, 1, 2.0),
            record(2016, 1, 3.0),
            record(2017, 1, 4.0),
            record(2016, 6, 5.0),
        ]);

        let filtered =
            DataProcessor::filter_by_year_range(dataset.records(), YearRange::single(2016));
        let months: Vec<u32> = filtered.iter().map(|r| r.period.month()).collect();
        assert_eq!(months, vec![12, 1, 6]);
        assert!(filtered.iter().all(|r| r.year() == 2016));
    }

    #[test]
    fn test_group_by_year_conserves_totals() {
        let dataset = decade();
        let yearly = DataProcessor::group_by_year(dataset.records());

        for measure in Measure::ALL {
            let raw: f64 = dataset
                .records()
                .iter()
                .map(|r| r.value(measure).unwrap_or(0.0))
                .sum();
            let grouped: f64 = yearly.iter().map(|y| *y.totals.get(measure)).sum();
            assert!((raw - grouped).abs() < 1e-6, "{measure} not conserved");
        }
    }

    #[test]
    fn test_group_by_year_omits_empty_years() {
        let records = vec![record(2014, 1, 1.0), record(2016, 1, 1.0)];
        let years: Vec<i32> = DataProcessor::group_by_year(&records)
            .iter()
            .map(|y| y.year)
            .collect();
        assert_eq!(years, vec![2014, 2016]);
    }

    #[test]
    fn test_group_by_year_is_ascending_and_sums_duplicates() {
        let records = vec![record(2015, 3, 5.0), record(2014, 3, 1.0), record(2015, 3, 7.0)];
        let yearly = DataProcessor::group_by_year(&records);
        assert_eq!(yearly[0].year, 2014);
        assert_eq!(yearly[1].totals.export_value, 12.0);
        assert_eq!(yearly[1].totals.import_value, 2.0);
    }

    #[test]
    fn test_group_by_month_sums_duplicate_periods() {
        let records = vec![record(2014, 2, 1.0), record(2014, 1, 4.0), record(2014, 2, 2.0)];
        let monthly = DataProcessor::group_by_month(&records);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].period, Period::new(2014, 1).unwrap());
        assert_eq!(monthly[1].totals.export_value, 3.0);
    }

    #[test]
    fn test_sort_by_period_is_stable() {
        let records = vec![record(2015, 1, 1.0), record(2014, 5, 2.0), record(2014, 5, 3.0)];
        let sorted = DataProcessor::sort_by_period(&records);
        let values: Vec<f64> = sorted
            .iter()
            .map(|r| r.measures.export_value.unwrap())
            .collect();
        assert_eq!(values, vec![2.0, 3.0, 1.0]);
    }
}
