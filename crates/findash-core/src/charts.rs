//! Chart rendering to PNG files
//!
//! Four charts are produced per run, each with a fixed file name inside the
//! output directory. Existing files with the same name are overwritten.
//!
//! Drawing is written against a generic `DrawingBackend` so the layout code
//! does not depend on the bitmap encoder; the `render_*` functions bind it to
//! a PNG file.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, warn};

use crate::aggregate::{FinancialSummary, LabeledRecord};
use crate::error::{Error, Result};
use crate::models::{CategoryTotal, Record};

pub const REVENUE_BAR_FILE: &str = "Revenue_by_Department.png";
pub const PROFIT_PIE_FILE: &str = "Profit_Contribution.png";
pub const TRENDS_FILE: &str = "Financial_Trends.png";
pub const PERFORMANCE_PIE_FILE: &str = "Profit_Performance.png";

/// Bar chart must fit between the two image anchors on the revenue sheet
pub const BAR_CHART_SIZE: (u32, u32) = (800, 340);
pub const PROFIT_PIE_SIZE: (u32, u32) = (600, 600);
pub const TRENDS_CHART_SIZE: (u32, u32) = (1000, 600);
pub const PERFORMANCE_PIE_SIZE: (u32, u32) = (600, 600);

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const GOLD: RGBColor = RGBColor(255, 215, 0);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);

/// Slice colors for department pies, cycled when there are more departments
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

type DrawResult<DB> =
    std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Paths of the four rendered charts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub revenue_bar: PathBuf,
    pub profit_pie: PathBuf,
    pub trends: PathBuf,
    pub performance_pie: PathBuf,
}

impl ChartPaths {
    /// Fixed chart locations inside an output directory
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            revenue_bar: output_dir.join(REVENUE_BAR_FILE),
            profit_pie: output_dir.join(PROFIT_PIE_FILE),
            trends: output_dir.join(TRENDS_FILE),
            performance_pie: output_dir.join(PERFORMANCE_PIE_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            &self.revenue_bar,
            &self.profit_pie,
            &self.trends,
            &self.performance_pie,
        ]
    }
}

/// Render all four charts into `output_dir`
pub fn render_charts(summary: &FinancialSummary, output_dir: &Path) -> Result<ChartPaths> {
    let paths = ChartPaths::in_dir(output_dir);
    let (high, low) = summary.performance_counts();

    render_revenue_bar(&summary.revenue_by_department, &paths.revenue_bar)?;
    render_profit_pie(&summary.profit_by_department, &paths.profit_pie)?;
    render_trends(&summary.records, &paths.trends)?;
    render_performance_pie(high, low, &paths.performance_pie)?;

    Ok(paths)
}

/// Bar chart of summed revenue per department
pub fn render_revenue_bar(totals: &[CategoryTotal], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    draw_revenue_bar(&root, totals).map_err(|e| chart_error(path, e))?;
    root.present().map_err(|e| chart_error(path, e))?;
    debug!(path = %path.display(), "Rendered revenue bar chart");
    Ok(())
}

/// Pie chart of each department's share of profit
pub fn render_profit_pie(totals: &[CategoryTotal], path: &Path) -> Result<()> {
    let labels: Vec<String> = totals.iter().map(|c| c.department.clone()).collect();
    let sizes: Vec<f64> = totals.iter().map(|c| c.amount).collect();
    let colors: Vec<RGBColor> = (0..totals.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();

    let root = BitMapBackend::new(path, PROFIT_PIE_SIZE).into_drawing_area();
    draw_pie(
        &root,
        "Profit Contribution by Department",
        &labels,
        &sizes,
        &colors,
    )
    .map_err(|e| chart_error(path, e))?;
    root.present().map_err(|e| chart_error(path, e))?;
    debug!(path = %path.display(), "Rendered profit contribution chart");
    Ok(())
}

/// Revenue, expenses and profit over time
pub fn render_trends(records: &[LabeledRecord], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, TRENDS_CHART_SIZE).into_drawing_area();
    draw_trends(&root, records).map_err(|e| chart_error(path, e))?;
    root.present().map_err(|e| chart_error(path, e))?;
    debug!(path = %path.display(), "Rendered trends chart");
    Ok(())
}

/// Pie chart of High vs Low record counts
pub fn render_performance_pie(high: usize, low: usize, path: &Path) -> Result<()> {
    let (labels, sizes, colors) = performance_slices(high, low);

    let root = BitMapBackend::new(path, PERFORMANCE_PIE_SIZE).into_drawing_area();
    draw_pie(&root, "High vs Low Profit Months", &labels, &sizes, &colors)
        .map_err(|e| chart_error(path, e))?;
    root.present().map_err(|e| chart_error(path, e))?;
    debug!(path = %path.display(), "Rendered profit performance chart");
    Ok(())
}

/// Non-empty High/Low slices with their colors
fn performance_slices(high: usize, low: usize) -> (Vec<String>, Vec<f64>, Vec<RGBColor>) {
    let mut labels = Vec::with_capacity(2);
    let mut sizes = Vec::with_capacity(2);
    let mut colors = Vec::with_capacity(2);
    for (label, count, color) in [("High", high, GOLD), ("Low", low, LIGHT_CORAL)] {
        if count > 0 {
            labels.push(label.to_string());
            sizes.push(count as f64);
            colors.push(color);
        }
    }
    (labels, sizes, colors)
}

fn chart_error(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Chart(format!("{}: {}", path.display(), err))
}

/// Axis range that always includes zero, with headroom above the data
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.1).max(1.0);
    let low = if min < 0.0 { min - pad } else { 0.0 };
    (low, max + pad)
}

fn draw_revenue_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    totals: &[CategoryTotal],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let (y_min, y_max) = value_range(totals.iter().map(|c| c.amount));
    let slots = totals.len().max(1) as u32;

    let mut chart = ChartBuilder::on(root)
        .caption("Revenue by Department", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..slots).into_segmented(), y_min..y_max)?;

    let department_label = |v: &SegmentValue<u32>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => totals
            .get(*i as usize)
            .map(|c| c.department.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(totals.len().max(1))
        .x_label_formatter(&department_label)
        .x_desc("Department")
        .y_desc("Total Revenue ($)")
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(SKY_BLUE.filled())
            .margin(10)
            .data(totals.iter().enumerate().map(|(i, c)| (i as u32, c.amount))),
    )?;

    Ok(())
}

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    labels: &[String],
    sizes: &[f64],
    colors: &[RGBColor],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 24))?;
    let (width, height) = area.dim_in_pixel();

    // Negative shares cannot be drawn as wedges
    let sizes: Vec<f64> = sizes
        .iter()
        .zip(labels)
        .map(|(size, label)| {
            if *size < 0.0 {
                warn!(slice = %label, value = size, "Negative pie slice drawn as empty");
                0.0
            } else {
                *size
            }
        })
        .collect();

    if sizes.iter().sum::<f64>() <= 0.0 {
        let center = ((width / 2) as i32 - 30, (height / 2) as i32);
        area.draw(&Text::new("No data", center, ("sans-serif", 20).into_font()))?;
        return Ok(());
    }

    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = f64::from(width.min(height)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, colors, labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&BLACK));
    area.draw(&pie)?;

    Ok(())
}

fn draw_trends<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    records: &[LabeledRecord],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let (start, end) = match (records.first(), records.last()) {
        (Some(first), Some(last)) if first.record.date < last.record.date => {
            (first.record.date, last.record.date)
        }
        // A single date still needs a non-empty axis
        (Some(only), _) => (
            only.record.date - Duration::days(1),
            only.record.date + Duration::days(1),
        ),
        _ => return Ok(()),
    };

    let (y_min, y_max) = value_range(
        records
            .iter()
            .flat_map(|r| [r.record.revenue, r.record.expenses, r.record.profit]),
    );

    let mut chart = ChartBuilder::on(root)
        .caption("Financial Trends Over Time", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(start..end, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
        .x_desc("Date")
        .y_desc("Amount ($)")
        .draw()?;

    let series: [(&str, RGBColor, fn(&Record) -> f64); 3] = [
        ("Revenue", GREEN, |r| r.revenue),
        ("Expenses", RED, |r| r.expenses),
        ("Profit", BLUE, |r| r.profit),
    ];

    for (name, color, metric) in series {
        chart
            .draw_series(LineSeries::new(
                records.iter().map(|r| (r.record.date, metric(&r.record))),
                &color,
            ))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
