//! CLI entry point: fetch gage height for each region, merge, report jumps.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use water_anomalies::config::Config;
use water_anomalies::ingest::usgs;
use water_anomalies::logging::{self, DataSource, LogLevel};
use water_anomalies::pipeline::{self, FailurePolicy};
use water_anomalies::regions;
use water_anomalies::report;

#[derive(Parser, Debug)]
#[command(name = "water_anomalies", version)]
#[command(about = "Flag sudden water-level jumps in USGS gage height data", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Region (state code) to query; repeat to query several. Overrides config.
    #[arg(short, long = "region", value_name = "CODE")]
    regions: Vec<String>,

    /// Print anomalies as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Leave out regions that fail instead of aborting the run
    #[arg(long)]
    skip_failed_regions: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load(cli.config.as_deref(), &cli.regions)?;
    if cli.verbose {
        config.log_level = LogLevel::Debug;
    }

    logging::init_logger(
        config.log_level,
        config.log_file.as_deref(),
        config.console_timestamps,
    );

    let names: Vec<&str> = config.regions.iter().map(|c| regions::region_name(c)).collect();
    logging::debug(
        DataSource::System,
        None,
        &format!("Querying {} region(s): {}", names.len(), names.join(", ")),
    );

    let policy = if cli.skip_failed_regions {
        FailurePolicy::SkipRegion
    } else {
        FailurePolicy::Abort
    };

    let client = usgs::build_client(config.timeout_secs)?;
    let outcome = pipeline::run_live(&client, &config.regions, policy)?;

    for (region, err) in &outcome.skipped {
        logging::warn(
            DataSource::Usgs,
            Some(region.as_str()),
            &format!("Region left out of report: {}", err),
        );
    }

    if cli.json {
        println!("{}", report::render_json(&outcome.anomalies)?);
    } else {
        print!("{}", report::render_report(&outcome.anomalies));
    }

    Ok(())
}
