use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use issuance_lib::aggregate::{effective_amount, effective_date, Dimension, UNSPECIFIED};
use issuance_lib::types::{Identified, Party, PaymentRecord, Reference};
use issuance_lib::validation::export_file_name;
use issuance_lib::{DateRange, Report, ReportOutput};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::html_output;

/// Written ahead of every CSV so spreadsheet tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Self {
        match value {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            "html" => OutputFormat::Html,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct ListingRow {
    #[tabled(rename = "#")]
    #[serde(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Id")]
    #[serde(rename = "Id")]
    pub id: String,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Company")]
    #[serde(rename = "Company")]
    pub company: String,
    #[tabled(rename = "Employee")]
    #[serde(rename = "Employee")]
    pub employee: String,
    #[tabled(rename = "Amount")]
    #[serde(rename = "Amount")]
    pub amount: String,
}

#[derive(Tabled, Serialize)]
pub struct ReportIdRow {
    #[tabled(rename = "Report")]
    #[serde(rename = "Report")]
    pub id: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    pub title: String,
}

/// Header, body and optional footer of a rendered report, as display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Option<Vec<String>>,
}

// -- Row builders --

fn party_display(reference: Option<&Reference<Party>>) -> String {
    reference
        .and_then(|r| r.embedded().and_then(Party::name).or_else(|| r.id()))
        .unwrap_or(UNSPECIFIED)
        .to_string()
}

pub fn build_listing_rows(records: &[&PaymentRecord]) -> Vec<ListingRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| ListingRow {
            index: i + 1,
            id: r.id().unwrap_or_default().to_string(),
            date: effective_date(r)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            company: party_display(r.insurance_company.as_ref()),
            employee: party_display(r.processed_by.as_ref()),
            amount: format_amount(effective_amount(r)),
        })
        .collect()
}

pub fn build_report_id_rows() -> Vec<ReportIdRow> {
    Dimension::ALL
        .iter()
        .map(|d| ReportIdRow {
            id: d.report_id().to_string(),
            title: d.title().to_string(),
        })
        .collect()
}

fn summary_header(dimension: Dimension) -> Vec<String> {
    vec![
        "#".to_string(),
        dimension.column_title().to_string(),
        "Count".to_string(),
        "Total".to_string(),
    ]
}

pub fn report_table(report: &Report<'_>) -> ReportTable {
    match &report.output {
        ReportOutput::Summary { dimension, rows } => {
            let (count, total) = report.grand_total();
            ReportTable {
                header: summary_header(*dimension),
                rows: rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        vec![
                            (i + 1).to_string(),
                            row.label.clone(),
                            row.count.to_string(),
                            format_amount(row.total),
                        ]
                    })
                    .collect(),
                footer: Some(vec![
                    String::new(),
                    "Total".to_string(),
                    count.to_string(),
                    format_amount(total),
                ]),
            }
        }
        ReportOutput::Listing(records) => ReportTable {
            header: ["#", "Id", "Date", "Company", "Employee", "Amount"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: build_listing_rows(records)
                .into_iter()
                .map(|r| {
                    vec![
                        r.index.to_string(),
                        r.id,
                        r.date,
                        r.company,
                        r.employee,
                        r.amount,
                    ]
                })
                .collect(),
            footer: None,
        },
    }
}

fn build_table(table: &ReportTable) -> Table {
    let mut builder = Builder::default();
    builder.push_record(table.header.clone());
    for row in &table.rows {
        builder.push_record(row.clone());
    }
    if let Some(footer) = &table.footer {
        builder.push_record(footer.clone());
    }
    builder.build()
}

// -- Report output --

pub fn print_report(report: &Report<'_>, range: &DateRange, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{} ({})", report.title(), range);
            println!("{}", build_table(&report_table(report)));
        }
        OutputFormat::Markdown => {
            let mut table = build_table(&report_table(report));
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Json => match &report.output {
            ReportOutput::Summary { rows, .. } => print_json(rows),
            ReportOutput::Listing(records) => print_json(&build_listing_rows(records)),
        },
        OutputFormat::Csv => {
            let stdout = std::io::stdout();
            write_report_csv(stdout.lock(), report)?;
        }
        OutputFormat::Html => {
            println!("{}", html_output::report_to_html(report, range)?);
        }
    }
    Ok(())
}

pub fn print_report_ids(format: &OutputFormat) -> Result<()> {
    let rows = build_report_id_rows();
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Table | OutputFormat::Html => println!("{}", Table::new(rows)),
    }
    Ok(())
}

// -- CSV output --

/// Writes the report as CSV: UTF-8 BOM, every field quoted, header matching
/// the on-screen columns. Summary totals are written as plain numbers.
pub fn write_report_csv<W: Write>(mut writer: W, report: &Report<'_>) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);
    match &report.output {
        ReportOutput::Summary { dimension, rows } => {
            wtr.write_record(summary_header(*dimension))?;
            for (i, row) in rows.iter().enumerate() {
                wtr.write_record([
                    (i + 1).to_string(),
                    row.label.clone(),
                    row.count.to_string(),
                    row.total.to_string(),
                ])?;
            }
        }
        ReportOutput::Listing(records) => {
            for row in build_listing_rows(records) {
                wtr.serialize(row)?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `<reportId>_<from>_<to>.csv` into `dir`, creating it if needed.
pub fn export_csv(report: &Report<'_>, range: &DateRange, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(export_file_name(&report.report_id, range, "csv"));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_report_csv(std::io::BufWriter::new(file), report)?;
    Ok(path)
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Amount with thousands separators; two decimals only when there is a fraction.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match cents % 100 {
        0 => format!("{}{}", sign, grouped),
        fraction => format!("{}{}.{:02}", sign, grouped, fraction),
    }
}
