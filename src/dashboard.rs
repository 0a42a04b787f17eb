//! Dashboard Pipeline
//! Runs filtering, grouping and derived metrics for one year-range request.

use crate::data::{
    DataProcessor, Dataset, Measure, MeasureSet, MonthlyTotal, RangeError, TradeRecord,
    YearRange, YearlyAggregate,
};
use crate::stats::{BalanceRow, GrowthRow, StatsCalculator, StatsError};
use log::{debug, info};
use serde::Serialize;

/// A numeric column of the derived tables that can be reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryColumn {
    Total(Measure),
    Growth(Measure),
    Balance,
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub totals: MeasureSet<f64>,
    /// Missing when the range holds fewer than two years with a defined rate.
    pub average_growth: MeasureSet<Option<f64>>,
    pub total_balance: f64,
    pub average_balance: f64,
}

/// Every derived table for one request.
///
/// Recomputed from the dataset on each call; nothing is cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub range: YearRange,
    /// Raw records of the full dataset in chronological order.
    pub records: Vec<TradeRecord>,
    /// Full dataset, month by month, regardless of `range`.
    pub monthly: Vec<MonthlyTotal>,
    pub yearly: Vec<YearlyAggregate>,
    pub growth: Vec<GrowthRow>,
    pub balance: Vec<BalanceRow>,
}

impl DashboardView {
    /// Compute all views for the requested range. Bounds are clamped to the
    /// dataset; `None` means the dataset's own bound.
    pub fn compute(
        dataset: &Dataset,
        start: Option<i32>,
        end: Option<i32>,
    ) -> Result<Self, RangeError> {
        let range = DataProcessor::resolve_range(dataset, start, end)?;
        Ok(Self::compute_for_range(dataset, range))
    }

    /// Compute all views for an already resolved range.
    pub fn compute_for_range(dataset: &Dataset, range: YearRange) -> Self {
        let filtered = DataProcessor::filter_by_year_range(dataset.records(), range);
        let yearly = DataProcessor::group_by_year(&filtered);
        let growth = StatsCalculator::growth_rates(&yearly);
        let balance = StatsCalculator::trade_balance(&yearly);
        let records = DataProcessor::sort_by_period(dataset.records());
        let monthly = DataProcessor::group_by_month(dataset.records());

        debug!(
            "Range {}: {} records, {} years",
            range,
            filtered.len(),
            yearly.len()
        );

        Self {
            range,
            records,
            monthly,
            yearly,
            growth,
            balance,
        }
    }

    /// Values of `column`, skipping undefined growth rates.
    pub fn column(&self, column: SummaryColumn) -> Vec<f64> {
        match column {
            SummaryColumn::Total(m) => self.yearly.iter().map(|y| *y.totals.get(m)).collect(),
            SummaryColumn::Growth(m) => {
                self.growth.iter().filter_map(|g| *g.change.get(m)).collect()
            }
            SummaryColumn::Balance => self.balance.iter().map(|b| b.balance).collect(),
        }
    }

    pub fn sum(&self, column: SummaryColumn) -> Result<f64, StatsError> {
        StatsCalculator::sum(&self.column(column))
    }

    pub fn mean(&self, column: SummaryColumn) -> Result<f64, StatsError> {
        StatsCalculator::mean(&self.column(column))
    }

    /// Headline metrics. Fails with `EmptyInput` when no year falls in range.
    pub fn headline(&self) -> Result<HeadlineMetrics, StatsError> {
        let mut totals = MeasureSet::default();
        for measure in Measure::ALL {
            *totals.get_mut(measure) = self.sum(SummaryColumn::Total(measure))?;
        }

        let mut average_growth = MeasureSet::default();
        for measure in Measure::ALL {
            *average_growth.get_mut(measure) = match self.mean(SummaryColumn::Growth(measure)) {
                Ok(mean) => Some(mean),
                Err(StatsError::EmptyInput) => None,
            };
        }

        let metrics = HeadlineMetrics {
            totals,
            average_growth,
            total_balance: self.sum(SummaryColumn::Balance)?,
            average_balance: self.mean(SummaryColumn::Balance)?,
        };
        info!(
            "Range {}: total balance {:.2} US $",
            self.range, metrics.total_balance
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Period, TradeRecord};
    use crate::stats::TradeBalance;

    fn record(year: i32, month: u32, export_value: f64, import_value: f64) -> TradeRecord {
        TradeRecord::new(
            Period::new(year, month).unwrap(),
            export_value,
            import_value,
            1.0,
            1.0,
        )
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record(2014, 1, 60.0, 50.0),
            record(2014, 2, 40.0, 30.0),
            record(2015, 1, 150.0, 80.0),
            record(2017, 1, 75.0, 90.0),
        ])
    }

    #[test]
    fn test_compute_full_range() {
        let view = DashboardView::compute(&sample(), None, None).unwrap();
        assert_eq!(view.range, YearRange { start: 2014, end: 2017 });

        let years: Vec<i32> = view.yearly.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2014, 2015, 2017]);
        assert_eq!(view.yearly[0].totals.export_value, 100.0);

        assert_eq!(view.growth[1].change.export_value, Some(50.0));
        assert_eq!(view.growth[2].change.export_value, Some(-50.0));

        assert_eq!(view.balance[0].balance, 20.0);
        assert_eq!(view.balance[0].classification, TradeBalance::Surplus);
        assert_eq!(view.balance[2].classification, TradeBalance::Deficit);
    }

    #[test]
    fn test_monthly_ignores_range() {
        let view = DashboardView::compute(&sample(), Some(2015), Some(2015)).unwrap();
        assert_eq!(view.yearly.len(), 1);
        assert_eq!(view.monthly.len(), 4);
    }

    #[test]
    fn test_records_are_sorted_full_dataset() {
        let dataset = Dataset::from_records(vec![
            record(2017, 1, 75.0, 90.0),
            record(2014, 2, 40.0, 30.0),
            record(2015, 1, 150.0, 80.0),
            record(2014, 1, 60.0, 50.0),
        ]);
        let view = DashboardView::compute(&dataset, Some(2015), Some(2015)).unwrap();

        let labels: Vec<String> = view.records.iter().map(|r| r.period.label()).collect();
        assert_eq!(
            labels,
            vec!["January 2014", "February 2014", "January 2015", "January 2017"]
        );
        assert_eq!(view.records[0].value(Measure::ExportValue), Some(60.0));
    }

    #[test]
    fn test_single_bound_outside_dataset_is_clamped() {
        let dataset = sample();

        let late = DashboardView::compute(&dataset, Some(2030), None).unwrap();
        assert_eq!(late.range, YearRange::single(2017));
        assert_eq!(late.yearly.len(), 1);
        assert_eq!(late.yearly[0].year, 2017);

        let early = DashboardView::compute(&dataset, None, Some(2000)).unwrap();
        assert_eq!(early.range, YearRange::single(2014));
        assert_eq!(early.yearly[0].totals.export_value, 100.0);
    }

    #[test]
    fn test_first_growth_row_undefined_for_any_range() {
        let dataset = sample();
        for start in 2014..=2017 {
            let view = DashboardView::compute(&dataset, Some(start), None).unwrap();
            if let Some(first) = view.growth.first() {
                assert_eq!(first.change, MeasureSet::default());
            }
        }
    }

    #[test]
    fn test_compute_is_idempotent() {
        let dataset = sample();
        let a = DashboardView::compute(&dataset, Some(2014), Some(2016)).unwrap();
        let b = DashboardView::compute(&dataset, Some(2014), Some(2016)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_headline_metrics() {
        let view = DashboardView::compute(&sample(), None, None).unwrap();
        let metrics = view.headline().unwrap();

        assert_eq!(metrics.totals.export_value, 325.0);
        assert_eq!(metrics.totals.import_value, 250.0);
        assert_eq!(metrics.total_balance, 75.0);
        assert_eq!(metrics.average_balance, 25.0);
        // (50 + -50) / 2
        assert_eq!(metrics.average_growth.export_value, Some(0.0));
    }

    #[test]
    fn test_headline_single_year_has_no_growth_mean() {
        let view = DashboardView::compute(&sample(), Some(2015), Some(2015)).unwrap();
        let metrics = view.headline().unwrap();
        assert_eq!(metrics.average_growth.export_value, None);
        assert_eq!(metrics.totals.export_value, 150.0);
    }

    #[test]
    fn test_headline_over_empty_range_fails() {
        // 2016 lies inside the bounds but has no records
        let view = DashboardView::compute(&sample(), Some(2016), Some(2016)).unwrap();
        assert!(view.yearly.is_empty());
        assert_eq!(view.headline(), Err(StatsError::EmptyInput));
    }

    #[test]
    fn test_inverted_range_fails() {
        assert!(matches!(
            DashboardView::compute(&sample(), Some(2017), Some(2014)),
            Err(RangeError::Inverted { .. })
        ));
    }
}
