//! Report dispatch: maps a report id to its dimension and runs it.

use issuance_api::types::PaymentRecord;
use tracing::warn;

use crate::aggregate::{summarize, BucketSummary, Dimension};
use crate::vehicles::VehicleIndex;

/// Number of records shown when the report id is not recognised.
pub const LISTING_LIMIT: usize = 10;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput<'a> {
    /// Per-bucket rows, already ordered for display.
    Summary {
        dimension: Dimension,
        rows: Vec<BucketSummary>,
    },
    /// Raw records for an unrecognised report id, input order.
    Listing(Vec<&'a PaymentRecord>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report<'a> {
    pub report_id: String,
    pub output: ReportOutput<'a>,
}

impl<'a> Report<'a> {
    pub fn title(&self) -> String {
        match &self.output {
            ReportOutput::Summary { dimension, .. } => dimension.title().to_string(),
            ReportOutput::Listing(_) => format!("Payments ({})", self.report_id),
        }
    }

    pub fn dimension(&self) -> Option<Dimension> {
        match &self.output {
            ReportOutput::Summary { dimension, .. } => Some(*dimension),
            ReportOutput::Listing(_) => None,
        }
    }

    /// Summary rows, empty for a listing.
    pub fn rows(&self) -> &[BucketSummary] {
        match &self.output {
            ReportOutput::Summary { rows, .. } => rows,
            ReportOutput::Listing(_) => &[],
        }
    }

    /// Records counted and their combined amount across all rows.
    pub fn grand_total(&self) -> (usize, f64) {
        match &self.output {
            ReportOutput::Summary { rows, .. } => rows
                .iter()
                .fold((0, 0.0), |(count, total), row| (count + row.count, total + row.total)),
            ReportOutput::Listing(records) => (
                records.len(),
                records
                    .iter()
                    .map(|r| crate::aggregate::effective_amount(r))
                    .sum(),
            ),
        }
    }
}

/// Runs the report named `report_id` over `records`.
///
/// Unrecognised ids never fail: they produce a listing of the first
/// [`LISTING_LIMIT`] records.
pub fn run_report<'a>(
    report_id: &str,
    records: &'a [PaymentRecord],
    vehicles: &VehicleIndex,
) -> Report<'a> {
    let output = match report_id.parse::<Dimension>() {
        Ok(dimension) => {
            let grouping = dimension.group(records, vehicles);
            ReportOutput::Summary {
                dimension,
                rows: summarize(dimension, &grouping),
            }
        }
        Err(()) => {
            match suggest_report_id(report_id) {
                Some(suggestion) => warn!(
                    "Unknown report id '{}', did you mean '{}'? Showing raw records",
                    report_id, suggestion
                ),
                None => warn!("Unknown report id '{}', showing raw records", report_id),
            }
            ReportOutput::Listing(records.iter().take(LISTING_LIMIT).collect())
        }
    };
    Report {
        report_id: report_id.to_string(),
        output,
    }
}

/// Closest known report id to `input`, if any is close enough.
pub fn suggest_report_id(input: &str) -> Option<&'static str> {
    let needle = input.trim().to_lowercase();
    Dimension::ALL
        .iter()
        .map(|d| (d.report_id(), strsim::jaro_winkler(&needle, d.report_id())))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
