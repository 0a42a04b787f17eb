//! Table Export Module
//! Converts derived views into Polars DataFrames and writes them as CSV.

use crate::dashboard::DashboardView;
use crate::data::{Measure, MonthlyTotal, TradeRecord, YearlyAggregate, PERIOD_COLUMN};
use crate::stats::{BalanceRow, GrowthRow};
use log::info;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const YEAR_COLUMN: &str = "Tahun";
pub const BALANCE_COLUMN: &str = "Neraca Perdagangan (US $)";
pub const CLASSIFICATION_COLUMN: &str = "Keterangan";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Builds DataFrames with the dashboard's column headers.
pub struct TableExporter;

impl TableExporter {
    /// Raw records with the period spelled out ("January 2014"). Missing
    /// cells become nulls.
    pub fn records_frame(rows: &[TradeRecord]) -> Result<DataFrame, ExportError> {
        let periods: Vec<String> = rows.iter().map(|r| r.period.label()).collect();
        let mut columns = vec![Column::new(PERIOD_COLUMN.into(), periods)];
        for measure in Measure::ALL {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.value(measure)).collect();
            columns.push(Column::new(measure.column().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }

    pub fn monthly_frame(rows: &[MonthlyTotal]) -> Result<DataFrame, ExportError> {
        let periods: Vec<String> = rows.iter().map(|r| r.period.to_string()).collect();
        let mut columns = vec![Column::new(PERIOD_COLUMN.into(), periods)];
        for measure in Measure::ALL {
            let values: Vec<f64> = rows.iter().map(|r| *r.totals.get(measure)).collect();
            columns.push(Column::new(measure.column().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }

    pub fn yearly_frame(rows: &[YearlyAggregate]) -> Result<DataFrame, ExportError> {
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        let mut columns = vec![Column::new(YEAR_COLUMN.into(), years)];
        for measure in Measure::ALL {
            let values: Vec<f64> = rows.iter().map(|r| *r.totals.get(measure)).collect();
            columns.push(Column::new(measure.column().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Undefined rates become nulls.
    pub fn growth_frame(rows: &[GrowthRow]) -> Result<DataFrame, ExportError> {
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        let mut columns = vec![Column::new(YEAR_COLUMN.into(), years)];
        for measure in Measure::ALL {
            let values: Vec<Option<f64>> = rows.iter().map(|r| *r.change.get(measure)).collect();
            columns.push(Column::new(measure.growth_column().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }

    pub fn balance_frame(rows: &[BalanceRow]) -> Result<DataFrame, ExportError> {
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        let exports: Vec<f64> = rows.iter().map(|r| r.export_value).collect();
        let imports: Vec<f64> = rows.iter().map(|r| r.import_value).collect();
        let balances: Vec<f64> = rows.iter().map(|r| r.balance).collect();
        let labels: Vec<&str> = rows.iter().map(|r| r.classification.name()).collect();

        Ok(DataFrame::new(vec![
            Column::new(YEAR_COLUMN.into(), years),
            Column::new(Measure::ExportValue.column().into(), exports),
            Column::new(Measure::ImportValue.column().into(), imports),
            Column::new(BALANCE_COLUMN.into(), balances),
            Column::new(CLASSIFICATION_COLUMN.into(), labels),
        ])?)
    }

    pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), ExportError> {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
        Ok(())
    }

    /// Write every table into `dir`, returning the written paths.
    pub fn export_csv(view: &DashboardView, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir)?;

        let tables = [
            ("records.csv", Self::records_frame(&view.records)?),
            ("monthly.csv", Self::monthly_frame(&view.monthly)?),
            ("yearly.csv", Self::yearly_frame(&view.yearly)?),
            ("growth.csv", Self::growth_frame(&view.growth)?),
            ("balance.csv", Self::balance_frame(&view.balance)?),
        ];

        let mut written = Vec::with_capacity(tables.len());
        for (name, mut df) in tables {
            let path = dir.join(name);
            Self::write_csv(&mut df, &path)?;
            info!("Wrote {} rows to {}", df.height(), path.display());
            written.push(path);
        }
        Ok(written)
    }

    pub fn to_json(view: &DashboardView) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(view)?)
    }
}
