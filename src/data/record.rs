//! Trade Record Module
//! Typed rows of the export-import dataset and the measure enumeration.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Header of the period column in the source CSV.
pub const PERIOD_COLUMN: &str = "Bulan";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized period: '{0}'")]
pub struct PeriodParseError(pub String);

/// One of the four tracked quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measure {
    ExportValue,
    ImportValue,
    ExportWeight,
    ImportWeight,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::ExportValue,
        Measure::ImportValue,
        Measure::ExportWeight,
        Measure::ImportWeight,
    ];

    /// Column header in the source CSV. Fixed external contract.
    pub fn column(&self) -> &'static str {
        match self {
            Measure::ExportValue => "Nilai Ekspor (US $)",
            Measure::ImportValue => "Nilai Impor (US $)",
            Measure::ExportWeight => "Berat Ekspor (KG)",
            Measure::ImportWeight => "Berat Impor (KG)",
        }
    }

    /// Column header of the year-over-year growth table.
    pub fn growth_column(&self) -> &'static str {
        match self {
            Measure::ExportValue => "Nilai Ekspor (%)",
            Measure::ImportValue => "Nilai Impor (%)",
            Measure::ExportWeight => "Berat Ekspor (%)",
            Measure::ImportWeight => "Berat Impor (%)",
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            Measure::ExportValue => "Export value",
            Measure::ImportValue => "Import value",
            Measure::ExportWeight => "Export weight",
            Measure::ImportWeight => "Import weight",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One value per measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureSet<T> {
    pub export_value: T,
    pub import_value: T,
    pub export_weight: T,
    pub import_weight: T,
}

impl<T> MeasureSet<T> {
    /// Build a set by evaluating `f` once per measure.
    pub fn from_fn(mut f: impl FnMut(Measure) -> T) -> Self {
        Self {
            export_value: f(Measure::ExportValue),
            import_value: f(Measure::ImportValue),
            export_weight: f(Measure::ExportWeight),
            import_weight: f(Measure::ImportWeight),
        }
    }

    pub fn get(&self, measure: Measure) -> &T {
        match measure {
            Measure::ExportValue => &self.export_value,
            Measure::ImportValue => &self.import_value,
            Measure::ExportWeight => &self.export_weight,
            Measure::ImportWeight => &self.import_weight,
        }
    }

    pub fn get_mut(&mut self, measure: Measure) -> &mut T {
        match measure {
            Measure::ExportValue => &mut self.export_value,
            Measure::ImportValue => &mut self.import_value,
            Measure::ExportWeight => &mut self.export_weight,
            Measure::ImportWeight => &mut self.import_weight,
        }
    }
}

impl MeasureSet<f64> {
    /// Add every measure of `values` into this set, treating missing as zero.
    pub fn accumulate(&mut self, values: &MeasureSet<Option<f64>>) {
        for measure in Measure::ALL {
            *self.get_mut(measure) += values.get(measure).unwrap_or(0.0);
        }
    }
}

/// Calendar month identifying one raw record.
///
/// Stored as the first day of the month so ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period(NaiveDate);

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// English month name and year, e.g. "January 2014".
    pub fn label(&self) -> String {
        self.0.format("%B %Y").to_string()
    }

    fn from_date(date: NaiveDate) -> Self {
        Period(date.with_day(1).unwrap_or(date))
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Ok(Period::from_date(date));
            }
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Period::from_date(dt.date()));
            }
        }

        // Month-only spellings carry no day, so pin them to the first.
        let with_day = format!("{s} 1");
        for fmt in ["%Y-%m %d", "%B %Y %d", "%b %Y %d"] {
            if let Ok(date) = NaiveDate::parse_from_str(&with_day, fmt) {
                return Ok(Period::from_date(date));
            }
        }

        Err(PeriodParseError(s.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// One row of raw input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub period: Period,
    /// Missing cells stay `None` and count as zero when summed.
    pub measures: MeasureSet<Option<f64>>,
}

impl TradeRecord {
    /// Record with all four measures present.
    pub fn new(
        period: Period,
        export_value: f64,
        import_value: f64,
        export_weight: f64,
        import_weight: f64,
    ) -> Self {
        Self {
            period,
            measures: MeasureSet {
                export_value: Some(export_value),
                import_value: Some(import_value),
                export_weight: Some(export_weight),
                import_weight: Some(import_weight),
            },
        }
    }

    pub fn year(&self) -> i32 {
        self.period.year()
    }

    pub fn value(&self, measure: Measure) -> Option<f64> {
        *self.measures.get(measure)
    }
}
