//! Ads Report CLI
//!
//! Read-only reporting against a Google Ads account

use ads_reporter::core::{ConfigFile, ConfigLoadOptions, ConfigLoader};
use ads_reporter::reports::{
    try_list_campaigns, try_probe_connection, try_summarize_range, MetricsSummary,
    DEFAULT_DAYS_BACK,
};
use ads_reporter::{build_client, load_credentials, ClientHandle, DateRange, ReportError};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Read-only reporting against a Google Ads account
#[derive(Parser)]
#[command(name = "ads-report")]
#[command(version)]
#[command(about = "Read-only Google Ads reporting", long_about = None)]
struct Cli {
    /// Config file (defaults to ./ads-config.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Account to report on (overrides customer_id)
    #[arg(long, global = true)]
    customer_id: Option<String>,

    /// Service account key file (overrides service_account_file)
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the credentials can read the account
    Probe,

    /// List campaigns that are not removed
    Campaigns,

    /// Summarize account performance
    Performance {
        /// Report on the last N days
        #[arg(long, default_value_t = DEFAULT_DAYS_BACK, conflicts_with_all = ["start", "end"])]
        days: u32,

        /// Start date (YYYY-MM-DD), requires --end
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// End date (YYYY-MM-DD), requires --start
        #[arg(long, requires = "start")]
        end: Option<String>,
    },

    /// Probe, then list campaigns, then summarize performance
    All {
        /// Report on the last N days
        #[arg(long, default_value_t = DEFAULT_DAYS_BACK)]
        days: u32,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            if let Some(report_error) = e.downcast_ref::<ReportError>() {
                eprintln!("\nPossible fixes:");
                for action in report_error.suggested_actions() {
                    eprintln!("  - {}", action);
                }
            }
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut options = ConfigLoadOptions::from_process_env();
    options.config_path = cli.config;
    options.cli_args = Some(ConfigFile {
        customer_id: cli.customer_id,
        service_account_file: cli.key_file,
        ..Default::default()
    });

    let config = ConfigLoader::load(options)
        .await
        .map_err(ReportError::from)?;

    let credential = load_credentials(&config.service_account_file, &config.scopes)
        .map_err(ReportError::from)?;
    let client = build_client(&config, credential).map_err(ReportError::from)?;
    let account_id = config.customer_id.as_str();

    match cli.command {
        Commands::Probe => probe_command(&client, account_id).await,
        Commands::Campaigns => campaigns_command(&client, account_id).await,
        Commands::Performance { days, start, end } => {
            let range = match (start, end) {
                (Some(start), Some(end)) => DateRange::parse(&start, &end)
                    .map_err(anyhow::Error::msg)
                    .context("invalid --start/--end")?,
                _ => days_range(days)?,
            };
            performance_command(&client, account_id, &range).await
        }
        Commands::All { days } => {
            let range = days_range(days)?;
            probe_command(&client, account_id).await?;
            println!();
            campaigns_command(&client, account_id).await?;
            println!();
            performance_command(&client, account_id, &range).await
        }
    }
}

fn days_range(days: u32) -> Result<DateRange> {
    DateRange::ending_today(days)
        .map_err(anyhow::Error::msg)
        .context("invalid --days")
}

async fn probe_command(client: &ClientHandle, account_id: &str) -> Result<()> {
    println!("🔍 Testing Google Ads API connection...");

    let outcome = try_probe_connection(client, account_id)
        .await
        .map_err(ReportError::from)?;

    if outcome.connected {
        println!(
            "✅ Connected to account: {} (ID: {})",
            outcome.display_name.as_deref().unwrap_or("<unnamed>"),
            outcome
                .customer_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| account_id.to_string())
        );
        Ok(())
    } else {
        anyhow::bail!("account {} returned no customer row", account_id)
    }
}

async fn campaigns_command(client: &ClientHandle, account_id: &str) -> Result<()> {
    println!("📋 Fetching campaigns...");

    let campaigns = try_list_campaigns(client, account_id)
        .await
        .map_err(ReportError::from)?;

    for campaign in &campaigns {
        println!(
            "📊 Campaign: {} (ID: {}) - Status: {} - Type: {}",
            campaign.name, campaign.id, campaign.status, campaign.channel_type
        );
    }
    println!("\n📊 Found {} campaigns", campaigns.len());
    Ok(())
}

async fn performance_command(
    client: &ClientHandle,
    account_id: &str,
    range: &DateRange,
) -> Result<()> {
    println!("📈 Fetching account performance...");

    let summary = try_summarize_range(client, account_id, range)
        .await
        .map_err(ReportError::from)?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &MetricsSummary) {
    println!("\n📈 Account Performance ({}):", summary.date_range);
    println!("   Impressions: {}", group_thousands(summary.impressions));
    println!("   Clicks: {}", group_thousands(summary.clicks));
    println!("   Cost: ${:.2}", summary.cost);
    println!("   Conversions: {}", summary.conversions);
    println!("   CTR: {:.2}%", summary.ctr);
    println!("   CPC: ${:.2}", summary.cpc);
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-45000), "-45,000");
    }

    #[test]
    fn test_cli_parses_performance_range() {
        let cli = Cli::try_parse_from([
            "ads-report",
            "performance",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
        ])
        .unwrap();

        match cli.command {
            Commands::Performance { start, end, .. } => {
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert_eq!(end.as_deref(), Some("2024-01-31"));
            }
            _ => panic!("expected performance command"),
        }
    }

    #[test]
    fn test_cli_start_requires_end() {
        assert!(Cli::try_parse_from(["ads-report", "performance", "--start", "2024-01-01"]).is_err());
    }

    #[test]
    fn test_cli_default_days() {
        let cli = Cli::try_parse_from(["ads-report", "--verbose", "performance"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Performance { days: 7, .. }));
    }

    #[test]
    fn test_cli_all_command() {
        let cli = Cli::try_parse_from(["ads-report", "all", "--days", "30"]).unwrap();
        assert!(matches!(cli.command, Commands::All { days: 30 }));
    }

    #[test]
    fn test_days_range_out_of_calendar_is_error() {
        let err = days_range(u32::MAX).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid --days"));
        assert!(days_range(7).is_ok());
    }
}
