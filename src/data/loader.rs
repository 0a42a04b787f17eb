//! CSV Data Loader Module
//! Reads the BPS export-import CSV with Polars into an immutable `Dataset`.

use super::record::{Measure, MeasureSet, Period, TradeRecord, PERIOD_COLUMN};
use super::processor::YearRange;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Required column '{0}' is missing")]
    MissingColumn(String),
    #[error("Column '{0}' contains non-numeric values")]
    NonNumeric(String),
    #[error("Row {row}: unrecognized period '{value}'")]
    InvalidPeriod { row: usize, value: String },
    #[error("Row {0}: period is empty")]
    MissingPeriod(usize),
}

/// Immutable, cheaply cloneable handle over the loaded records.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[TradeRecord]>,
    file_path: Option<PathBuf>,
}

impl Dataset {
    pub fn from_records(records: Vec<TradeRecord>) -> Self {
        Self {
            records: records.into(),
            file_path: None,
        }
    }

    /// Records in file order.
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest year present, or `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<YearRange> {
        let min = self.records.iter().map(|r| r.year()).min()?;
        let max = self.records.iter().map(|r| r.year()).max()?;
        Some(YearRange { start: min, end: max })
    }

    /// Get file path.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(10000),
        }
    }

    /// Rows scanned to infer column types. `None` scans the whole file.
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a CSV file into a `Dataset`. Nothing is returned on partial failure.
    pub fn load_csv(&self, file_path: impl AsRef<Path>) -> Result<Dataset, LoaderError> {
        let file_path = file_path.as_ref();
        if !file_path.is_file() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .finish()?
            .collect()?;

        debug!("Read {} rows, {} columns", df.height(), df.width());

        let mut dataset = Self::records_from_dataframe(&df)?;
        dataset.file_path = Some(file_path.to_path_buf());

        info!(
            "Loaded {} trade records from {}",
            dataset.len(),
            file_path.display()
        );
        Ok(dataset)
    }

    /// Convert a DataFrame carrying the fixed column contract into typed records.
    pub fn records_from_dataframe(df: &DataFrame) -> Result<Dataset, LoaderError> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let required =
            std::iter::once(PERIOD_COLUMN).chain(Measure::ALL.iter().map(|m| m.column()));
        for name in required {
            if !columns.iter().any(|c| c == name) {
                return Err(LoaderError::MissingColumn(name.to_string()));
            }
        }

        let period_col = df.column(PERIOD_COLUMN)?.cast(&DataType::String)?;
        let periods = period_col.as_materialized_series().str()?;

        let mut values = MeasureSet::<Vec<Option<f64>>>::default();
        for measure in Measure::ALL {
            let series = df
                .column(measure.column())?
                .as_materialized_series()
                .strict_cast(&DataType::Float64)
                .map_err(|_| LoaderError::NonNumeric(measure.column().to_string()))?;
            *values.get_mut(measure) = series.f64()?.into_iter().collect();
        }

        let mut records = Vec::with_capacity(df.height());
        for (i, raw) in periods.into_iter().enumerate() {
            // 1-based, counting the header line
            let row = i + 2;
            let raw = raw.ok_or(LoaderError::MissingPeriod(row))?;
            let period: Period = raw.parse().map_err(|_| LoaderError::InvalidPeriod {
                row,
                value: raw.to_string(),
            })?;

            records.push(TradeRecord {
                period,
                measures: MeasureSet::from_fn(|m| values.get(m)[i]),
            });
        }

        Ok(Dataset::from_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(periods: Vec<&str>, export_value: Vec<Option<f64>>) -> DataFrame {
        let n = periods.len();
        DataFrame::new(vec![
            Column::new("Bulan".into(), periods),
            Column::new("Nilai Ekspor (US $)".into(), export_value),
            Column::new("Nilai Impor (US $)".into(), vec![1.0; n]),
            Column::new("Berat Ekspor (KG)".into(), vec![2.0; n]),
            Column::new("Berat Impor (KG)".into(), vec![3.0; n]),
        ])
        .unwrap()
    }

    #[test]
    fn test_records_from_dataframe_preserves_order() {
        let df = frame(vec!["2015-02-01", "2014-01-01"], vec![Some(10.0), Some(20.0)]);
        let dataset = DataLoader::records_from_dataframe(&df).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].year(), 2015);
        assert_eq!(dataset.records()[1].value(Measure::ExportValue), Some(20.0));
        assert_eq!(dataset.records()[1].value(Measure::ImportWeight), Some(3.0));
    }

    #[test]
    fn test_null_measure_is_kept_as_missing() {
        let df = frame(vec!["2014-01-01"], vec![None]);
        let dataset = DataLoader::records_from_dataframe(&df).unwrap();
        assert_eq!(dataset.records()[0].value(Measure::ExportValue), None);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let df = DataFrame::new(vec![
            Column::new("Bulan".into(), vec!["2014-01-01"]),
            Column::new("Nilai Ekspor (US $)".into(), vec![1.0]),
        ])
        .unwrap();

        match DataLoader::records_from_dataframe(&df) {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, "Nilai Impor (US $)"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_period_reports_row() {
        let df = frame(vec!["2014-01-01", "sometime"], vec![Some(1.0), Some(2.0)]);
        match DataLoader::records_from_dataframe(&df) {
            Err(LoaderError::InvalidPeriod { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "sometime");
            }
            other => panic!("expected InvalidPeriod, got {other:?}"),
        }
    }

    #[test]
    fn test_year_bounds() {
        let df = frame(
            vec!["2018-05-01", "2014-01-01", "2023-12-01"],
            vec![Some(1.0), Some(1.0), Some(1.0)],
        );
        let dataset = DataLoader::records_from_dataframe(&df).unwrap();
        assert_eq!(dataset.year_bounds(), Some(YearRange { start: 2014, end: 2023 }));
        assert_eq!(Dataset::from_records(Vec::new()).year_bounds(), None);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = DataLoader::new().load_csv("/definitely/not/here.csv");
        assert!(matches!(result, Err(LoaderError::NotFound(_))));
    }
}
