//! Report assembly
//!
//! Runs the pipeline in fixed order (load, aggregate, chart, narrate) and
//! writes the results:
//!
//! ```text
//! outputs/
//! ├── Revenue_by_Department.png
//! ├── Profit_Contribution.png
//! ├── Financial_Trends.png
//! ├── Profit_Performance.png
//! ├── AI_Insights.txt
//! └── Full_Financial_Report.xlsx
//!     ├── Raw_Data               Date, Department, Revenue, Expenses, Profit, Performance
//!     ├── Revenue_by_Department  Department, Revenue + bar chart at D2, profit pie at D20
//!     ├── Profit_by_Department   Department, Profit
//!     ├── Trends                 trend chart at B2
//!     ├── Profit_Performance     High/Low pie at B2
//!     └── AI_Insights            A1 "Summary:", A2 KPIs, A7 "AI Insights:", A8 commentary
//! ```
//!
//! Every file is rewritten on each run.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{ColNum, Format, FormatAlign, Image, RowNum, Workbook, Worksheet};
use tracing::{info, warn};

use crate::aggregate::FinancialSummary;
use crate::ai::InsightClient;
use crate::charts::{self, ChartPaths};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::import::load_records;
use crate::models::{CategoryTotal, Record};

pub const WORKBOOK_FILE: &str = "Full_Financial_Report.xlsx";
pub const NARRATIVE_FILE: &str = "AI_Insights.txt";

pub const RAW_DATA_SHEET: &str = "Raw_Data";
pub const REVENUE_SHEET: &str = "Revenue_by_Department";
pub const PROFIT_SHEET: &str = "Profit_by_Department";
pub const TRENDS_SHEET: &str = "Trends";
pub const PERFORMANCE_SHEET: &str = "Profit_Performance";
pub const INSIGHTS_SHEET: &str = "AI_Insights";

/// Zero-based (row, col) cell anchors for embedded images
pub const REVENUE_BAR_ANCHOR: (RowNum, ColNum) = (1, 3); // D2
pub const PROFIT_PIE_ANCHOR: (RowNum, ColNum) = (19, 3); // D20
pub const TRENDS_ANCHOR: (RowNum, ColNum) = (1, 1); // B2
pub const PERFORMANCE_ANCHOR: (RowNum, ColNum) = (1, 1); // B2

/// Default worksheet row height in pixels
pub const ROW_HEIGHT_PX: u32 = 20;

const RAW_DATA_HEADERS: [&str; 6] = [
    "Date",
    "Department",
    "Revenue",
    "Expenses",
    "Profit",
    "Performance",
];

/// Number of records echoed back to the console after loading
const PREVIEW_ROWS: usize = 5;

/// Outcome of one run
#[derive(Debug)]
pub enum ReportStatus {
    /// Everything was written
    Completed(Box<ReportArtifacts>),
    /// The input file does not exist; nothing was written
    InputMissing { path: PathBuf },
}

/// Files written by a completed run, plus the values that went into them
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub output_dir: PathBuf,
    pub workbook: PathBuf,
    pub narrative: PathBuf,
    pub charts: ChartPaths,
    /// First few records in file order
    pub preview: Vec<Record>,
    pub record_count: usize,
    pub summary: FinancialSummary,
    pub kpi_summary: String,
    pub insights: String,
}

/// Run the full report pipeline
///
/// A missing input file is reported through `ReportStatus::InputMissing`
/// before anything is created. Every other failure propagates.
pub async fn generate_report(
    config: &ReportConfig,
    insights: &InsightClient,
) -> Result<ReportStatus> {
    if !config.input.exists() {
        warn!(path = %config.input.display(), "Input file not found");
        return Ok(ReportStatus::InputMissing {
            path: config.input.clone(),
        });
    }

    let records = load_records(&config.input)?;
    info!(records = records.len(), path = %config.input.display(), "Data loaded");

    let summary = FinancialSummary::compute(&records)?;

    std::fs::create_dir_all(&config.output_dir)?;

    let charts = charts::render_charts(&summary, &config.output_dir)?;
    info!(dir = %config.output_dir.display(), "Charts rendered");

    let kpi_summary = kpi_summary(&summary);
    let commentary = insights.generate_insights(&kpi_summary).await;

    let narrative = config.output_dir.join(NARRATIVE_FILE);
    std::fs::write(&narrative, narrative_text(&kpi_summary, &commentary))?;

    let workbook = config.output_dir.join(WORKBOOK_FILE);
    write_workbook(&workbook, &summary, &charts, &kpi_summary, &commentary)?;
    info!(path = %workbook.display(), "Workbook written");

    Ok(ReportStatus::Completed(Box::new(ReportArtifacts {
        output_dir: config.output_dir.clone(),
        workbook,
        narrative,
        charts,
        preview: records.iter().take(PREVIEW_ROWS).cloned().collect(),
        record_count: records.len(),
        summary,
        kpi_summary,
        insights: commentary,
    })))
}

/// KPI lines sent to the model and written to the narrative
pub fn kpi_summary(summary: &FinancialSummary) -> String {
    let (high, low) = summary.performance_counts();
    format!(
        "Total Revenue: {}\n\
         Total Expenses: {}\n\
         Total Profit: {}\n\
         Total Departments: {}\n\
         High Profit Months: {}\n\
         Low Profit Months: {}\n",
        format_amount(summary.totals.revenue),
        format_amount(summary.totals.expenses),
        format_amount(summary.totals.profit),
        summary.department_count(),
        high,
        low,
    )
}

/// Contents of the narrative text file
pub fn narrative_text(kpi_summary: &str, insights: &str) -> String {
    format!("Summary:\n{}\n\nAI Insights:\n{}", kpi_summary, insights)
}

/// Two decimals with comma thousands separators, e.g. `-1,234.50`
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Reusable cell formats
struct ReportFormats {
    header: Format,
    money: Format,
    date: Format,
    wrapped: Format,
}

impl ReportFormats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            money: Format::new().set_num_format("#,##0.00"),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            wrapped: Format::new().set_text_wrap().set_align(FormatAlign::Top),
        }
    }
}

/// Write the six-sheet workbook, embedding the rendered charts
pub fn write_workbook(
    path: &Path,
    summary: &FinancialSummary,
    charts: &ChartPaths,
    kpi_summary: &str,
    insights: &str,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let formats = ReportFormats::new();

    add_raw_data_sheet(workbook.add_worksheet(), summary, &formats)?;

    let revenue = workbook.add_worksheet();
    add_category_sheet(
        revenue,
        REVENUE_SHEET,
        "Revenue",
        &summary.revenue_by_department,
        &formats,
    )?;
    insert_image(revenue, REVENUE_BAR_ANCHOR, &charts.revenue_bar)?;
    insert_image(revenue, PROFIT_PIE_ANCHOR, &charts.profit_pie)?;

    add_category_sheet(
        workbook.add_worksheet(),
        PROFIT_SHEET,
        "Profit",
        &summary.profit_by_department,
        &formats,
    )?;

    let trends = workbook.add_worksheet();
    trends.set_name(TRENDS_SHEET)?;
    insert_image(trends, TRENDS_ANCHOR, &charts.trends)?;

    let performance = workbook.add_worksheet();
    performance.set_name(PERFORMANCE_SHEET)?;
    insert_image(performance, PERFORMANCE_ANCHOR, &charts.performance_pie)?;

    let ai = workbook.add_worksheet();
    ai.set_name(INSIGHTS_SHEET)?;
    ai.set_column_width(0, 100)?;
    ai.write_string_with_format(0, 0, "Summary:", &formats.header)?;
    ai.write_string_with_format(1, 0, kpi_summary, &formats.wrapped)?;
    ai.write_string_with_format(6, 0, "AI Insights:", &formats.header)?;
    ai.write_string_with_format(7, 0, insights, &formats.wrapped)?;

    workbook.save(path)?;
    Ok(())
}

fn add_raw_data_sheet(
    sheet: &mut Worksheet,
    summary: &FinancialSummary,
    formats: &ReportFormats,
) -> Result<()> {
    sheet.set_name(RAW_DATA_SHEET)?;

    for (col, title) in RAW_DATA_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as ColNum, *title, &formats.header)?;
    }

    for (i, labeled) in summary.records.iter().enumerate() {
        let row = i as RowNum + 1;
        let record = &labeled.record;
        sheet.write_date_with_format(row, 0, &record.date, &formats.date)?;
        sheet.write_string(row, 1, record.department.as_str())?;
        sheet.write_number_with_format(row, 2, record.revenue, &formats.money)?;
        sheet.write_number_with_format(row, 3, record.expenses, &formats.money)?;
        sheet.write_number_with_format(row, 4, record.profit, &formats.money)?;
        sheet.write_string(row, 5, labeled.performance.as_str())?;
    }

    sheet.set_column_width(0, 12)?;
    sheet.set_column_width(1, 20)?;
    Ok(())
}

fn add_category_sheet(
    sheet: &mut Worksheet,
    name: &str,
    metric: &str,
    totals: &[CategoryTotal],
    formats: &ReportFormats,
) -> Result<()> {
    sheet.set_name(name)?;
    sheet.write_string_with_format(0, 0, "Department", &formats.header)?;
    sheet.write_string_with_format(0, 1, metric, &formats.header)?;

    for (i, total) in totals.iter().enumerate() {
        let row = i as RowNum + 1;
        sheet.write_string(row, 0, total.department.as_str())?;
        sheet.write_number_with_format(row, 1, total.amount, &formats.money)?;
    }

    sheet.set_column_width(0, 20)?;
    Ok(())
}

fn insert_image(sheet: &mut Worksheet, anchor: (RowNum, ColNum), path: &Path) -> Result<()> {
    let image = Image::new(path)?;
    sheet.insert_image(anchor.0, anchor.1, &image)?;
    Ok(())
}
