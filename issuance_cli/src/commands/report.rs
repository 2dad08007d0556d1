use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use issuance_lib::validation;
use issuance_lib::{
    load_from_files, ApiConfig, DateRange, FetchOutcome, IssuanceError, ReportData, ReportSession,
};

use crate::output::{export_csv, print_report, OutputFormat};

#[derive(Args)]
pub struct ReportArgs {
    /// Report id, e.g. by-month or by-company (see `issuance reports`)
    #[arg(long)]
    pub id: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: String,

    /// End date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: String,

    /// Also write the report as CSV into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Read payments from a local JSON file instead of the API
    #[arg(long, requires_all = ["syrian_vehicles_file", "foreign_vehicles_file"])]
    pub payments_file: Option<PathBuf>,

    /// Local JSON file with the syrian vehicle registry
    #[arg(long, requires = "payments_file")]
    pub syrian_vehicles_file: Option<PathBuf>,

    /// Local JSON file with the foreign vehicle registry
    #[arg(long, requires = "payments_file")]
    pub foreign_vehicles_file: Option<PathBuf>,
}

fn user_error(err: IssuanceError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn load(
    args: &ReportArgs,
    config: &ApiConfig,
    range: DateRange,
) -> Result<Option<ReportData>> {
    if let (Some(payments), Some(syrian), Some(foreign)) = (
        &args.payments_file,
        &args.syrian_vehicles_file,
        &args.foreign_vehicles_file,
    ) {
        return load_from_files(range, payments, syrian, foreign)
            .map(Some)
            .map_err(user_error);
    }

    let client = config.build_client().map_err(user_error)?;
    let session = ReportSession::new(client);
    let pb = spinner(format!("Loading payments for {}...", range));
    let outcome = session.fetch(range).await;
    pb.finish_and_clear();

    match outcome.map_err(user_error)? {
        FetchOutcome::Fresh(data) => Ok(Some(data)),
        FetchOutcome::Stale { .. } => Ok(None),
    }
}

pub async fn run(args: &ReportArgs, config: &ApiConfig, format: &OutputFormat) -> Result<()> {
    let report_id = validation::validate_report_id(&args.id).map_err(user_error)?;
    let range = validation::validate_date_range(&args.from, &args.to).map_err(user_error)?;

    let Some(data) = load(args, config, range).await? else {
        return Ok(());
    };

    if data.is_empty() {
        eprintln!("No payments found between {} and {}.", range.from, range.to);
        return Ok(());
    }

    let report = data.run(&report_id);
    print_report(&report, &data.range, format)?;

    if let Some(dir) = &args.export_dir {
        let path = export_csv(&report, &data.range, dir)?;
        eprintln!("Exported {}", path.display());
    }

    Ok(())
}
