mod commands;
mod html_output;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use issuance_lib::ApiConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "issuance")]
#[command(about = "Summary reports over vehicle insurance issuance payments")]
struct Cli {
    /// Output format: table, json, csv, markdown or html
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// API base URL (overrides ISSUANCE_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token (overrides ISSUANCE_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a summary report over a date range
    Report(commands::report::ReportArgs),
    /// List available report ids
    Reports,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("issuance=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);
    let config = ApiConfig::from_env()
        .with_base_url(cli.base_url.clone())
        .with_token(cli.token.clone());

    match &cli.command {
        Commands::Report(args) => commands::report::run(args, &config, &format).await?,
        Commands::Reports => commands::reports::run(&format)?,
    }

    Ok(())
}
