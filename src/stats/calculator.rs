//! Statistics Calculator Module
//! Year-over-year growth, trade balance and summary reductions.

use crate::data::{Measure, MeasureSet, YearlyAggregate};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Cannot reduce an empty input")]
    EmptyInput,
}

/// Percentage change of each measure against the preceding year in the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    pub year: i32,
    /// `None` for the first row and wherever the previous value is zero.
    pub change: MeasureSet<Option<f64>>,
}

/// Sign classification of a trade balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeBalance {
    Surplus,
    Deficit,
}

impl TradeBalance {
    /// Zero counts as surplus.
    pub fn classify(balance: f64) -> Self {
        if balance >= 0.0 {
            TradeBalance::Surplus
        } else {
            TradeBalance::Deficit
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TradeBalance::Surplus => "Surplus",
            TradeBalance::Deficit => "Deficit",
        }
    }
}

impl fmt::Display for TradeBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub year: i32,
    pub export_value: f64,
    pub import_value: f64,
    pub balance: f64,
    pub classification: TradeBalance,
}

/// Handles derived-metric calculations over yearly aggregates.
pub struct StatsCalculator;

impl StatsCalculator {
    /// `(current - previous) / previous * 100`, undefined when `previous` is zero.
    pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
        if previous == 0.0 {
            return None;
        }
        Some((current - previous) / previous * 100.0)
    }

    /// Growth of every measure against the immediately preceding row.
    ///
    /// Gaps in the year sequence are not filled: a row is compared with
    /// whatever row precedes it.
    pub fn growth_rates(yearly: &[YearlyAggregate]) -> Vec<GrowthRow> {
        let mut rows = Vec::with_capacity(yearly.len());
        let mut previous: Option<&YearlyAggregate> = None;

        for current in yearly {
            let change = match previous {
                Some(prev) => MeasureSet::from_fn(|m| {
                    Self::percent_change(*prev.totals.get(m), *current.totals.get(m))
                }),
                None => MeasureSet::default(),
            };
            rows.push(GrowthRow {
                year: current.year,
                change,
            });
            previous = Some(current);
        }

        rows
    }

    /// Export value minus import value per year, with classification.
    pub fn trade_balance(yearly: &[YearlyAggregate]) -> Vec<BalanceRow> {
        yearly
            .iter()
            .map(|y| {
                let export_value = *y.totals.get(Measure::ExportValue);
                let import_value = *y.totals.get(Measure::ImportValue);
                let balance = export_value - import_value;
                BalanceRow {
                    year: y.year,
                    export_value,
                    import_value,
                    balance,
                    classification: TradeBalance::classify(balance),
                }
            })
            .collect()
    }

    pub fn sum(values: &[f64]) -> Result<f64, StatsError> {
        if values.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        Ok(values.iter().sum())
    }

    pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
        if values.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        Ok(values.iter().mean())
    }
}
