//! Static Chart Renderer
//! Draws the dashboard charts as PNG files with plotters.
//!
//! Charts:
//! 1. Monthly measures over the whole dataset, stacked areas
//! 2. Yearly export vs import value
//! 3. Yearly export vs import weight
//! 4. Year-over-year growth of all four measures
//! 5. Trade balance bars, colored by surplus/deficit

use crate::dashboard::DashboardView;
use crate::data::{Measure, MonthlyTotal};
use crate::stats::TradeBalance;
use anyhow::Result;
use chrono::{Days, NaiveDate};
use log::{info, warn};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const GOLD: RGBColor = RGBColor(255, 215, 0);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const LAWN_GREEN: RGBColor = RGBColor(124, 252, 0);
const ORANGE_RED: RGBColor = RGBColor(255, 69, 0);
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const PURPLE: RGBColor = RGBColor(148, 103, 189);

const SIZE: (u32, u32) = (1000, 600);

fn measure_color(measure: Measure) -> RGBColor {
    match measure {
        Measure::ExportValue => GOLD,
        Measure::ImportValue => LIGHT_GREEN,
        Measure::ExportWeight => STEEL_BLUE,
        Measure::ImportWeight => PURPLE,
    }
}

/// Padded y range covering `values`, always including zero.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.1).max(1.0);
    (if min < 0.0 { min - pad } else { 0.0 }, max + pad)
}

/// Cumulative monthly totals in `Measure::ALL` order: layer `i` is the sum of
/// measures `0..=i`, so the last layer is the month's grand total.
fn stack_monthly(rows: &[MonthlyTotal]) -> Vec<(NaiveDate, [f64; 4])> {
    rows.iter()
        .map(|row| {
            let mut layers = [0.0; 4];
            let mut running = 0.0;
            for (layer, measure) in layers.iter_mut().zip(Measure::ALL) {
                running += *row.totals.get(measure);
                *layer = running;
            }
            (row.period.first_day(), layers)
        })
        .collect()
}

/// Half-year padding on both sides of the year span.
fn year_axis(view: &DashboardView) -> (f64, f64) {
    let first = view.yearly.first().map(|y| y.year).unwrap_or(view.range.start);
    let last = view.yearly.last().map(|y| y.year).unwrap_or(view.range.end);
    (first as f64 - 0.5, last as f64 + 0.5)
}

pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Render every chart the view has data for. Returns the written files.
    pub fn render_all(&self, view: &DashboardView) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if view.monthly.is_empty() {
            warn!("No monthly data, skipping monthly chart");
        } else {
            written.push(self.render(view, "monthly.png", Self::draw_monthly)?);
        }

        if view.yearly.is_empty() {
            warn!("No years in range {}, skipping yearly charts", view.range);
            return Ok(written);
        }

        let values = [Measure::ExportValue, Measure::ImportValue];
        let weights = [Measure::ExportWeight, Measure::ImportWeight];
        written.push(self.render(view, "yearly_value.png", |view, path| {
            Self::draw_yearly(view, path, "Nilai (US $)", &values)
        })?);
        written.push(self.render(view, "yearly_weight.png", |view, path| {
            Self::draw_yearly(view, path, "Berat (Kg)", &weights)
        })?);
        written.push(self.render(view, "growth.png", Self::draw_growth)?);
        written.push(self.render(view, "balance.png", Self::draw_balance)?);

        info!(
            "Rendered {} charts into {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    fn render(
        &self,
        view: &DashboardView,
        file_name: &str,
        draw: impl Fn(&DashboardView, &Path) -> Result<()>,
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        draw(view, &path)?;
        Ok(path)
    }

    fn draw_monthly(view: &DashboardView, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let first = view.monthly[0].period.first_day();
        let mut last = view.monthly[view.monthly.len() - 1].period.first_day();
        if last == first {
            last = first.checked_add_days(Days::new(31)).unwrap_or(first);
        }
        let stacked = stack_monthly(&view.monthly);
        let (y_min, y_max) =
            value_range(stacked.iter().flat_map(|(_, layers)| layers.iter().copied()));

        let mut chart = ChartBuilder::on(&root)
            .caption("Ekspor-Impor Indonesia per Bulan", ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(first..last, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
            .draw()?;

        // top layer first so lower bands paint over it
        for (i, measure) in Measure::ALL.into_iter().enumerate().rev() {
            let color = measure_color(measure);
            chart
                .draw_series(
                    AreaSeries::new(
                        stacked.iter().map(|(date, layers)| (*date, layers[i])),
                        0.0,
                        color.filled(),
                    )
                    .border_style(color),
                )?
                .label(measure.column())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn draw_yearly(
        view: &DashboardView,
        path: &Path,
        y_desc: &str,
        measures: &[Measure],
    ) -> Result<()> {
        let root = BitMapBackend::new(path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = year_axis(view);
        let (y_min, y_max) = value_range(
            view.yearly
                .iter()
                .flat_map(|y| measures.iter().map(move |m| *y.totals.get(*m))),
        );

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Tahun (Year)")
            .y_desc(y_desc)
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .draw()?;

        for &measure in measures {
            let color = measure_color(measure);
            let points: Vec<(f64, f64)> = view
                .yearly
                .iter()
                .map(|y| (y.year as f64, *y.totals.get(measure)))
                .collect();

            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(measure.column())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
            chart.draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 5, color.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn draw_growth(view: &DashboardView, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = year_axis(view);
        let (y_min, y_max) = value_range(
            view.growth
                .iter()
                .flat_map(|g| Measure::ALL.into_iter().filter_map(move |m| *g.change.get(m))),
        );

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Tahun (Year)")
            .y_desc("Pertumbuhan (%)")
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .draw()?;

        for measure in Measure::ALL {
            let color = measure_color(measure);
            // undefined rates are left out of the line
            let points: Vec<(f64, f64)> = view
                .growth
                .iter()
                .filter_map(|g| g.change.get(measure).map(|v| (g.year as f64, v)))
                .collect();

            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(measure.growth_column())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
            chart.draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 5, color.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn draw_balance(view: &DashboardView, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = year_axis(view);
        let (y_min, y_max) = value_range(view.balance.iter().map(|b| b.balance));

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Tahun (Year)")
            .y_desc("Nilai (US $)")
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .draw()?;

        chart.draw_series(view.balance.iter().map(|b| {
            let color = match b.classification {
                TradeBalance::Surplus => LAWN_GREEN,
                TradeBalance::Deficit => ORANGE_RED,
            };
            let x = b.year as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, b.balance)], color.filled())
        }))?;

        root.present()?;
        Ok(())
    }
}
