use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use goose_q5::{run, RawConfig};
use tracing::{error, info};

/// TPC-H Query 5: revenue per nation from same-nation trades in a region
#[derive(Parser, Debug)]
#[command(name = "goose-q5", version)]
struct Args {
    /// Region name, e.g. ASIA
    #[arg(long = "r_name")]
    r_name: Option<String>,

    /// First order date included (YYYY-MM-DD)
    #[arg(long = "start_date")]
    start_date: Option<String>,

    /// First order date excluded (YYYY-MM-DD)
    #[arg(long = "end_date")]
    end_date: Option<String>,

    /// Worker threads per parallel stage
    #[arg(long = "threads", allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Directory holding the six .tbl files
    #[arg(long = "table_path", value_name = "DIR")]
    table_path: Option<PathBuf>,

    /// File the result is written to
    #[arg(long = "result_path", value_name = "FILE")]
    result_path: Option<PathBuf>,
}

impl From<Args> for RawConfig {
    fn from(args: Args) -> Self {
        RawConfig {
            region_name: args.r_name,
            start_date: args.start_date,
            end_date: args.end_date,
            thread_count: args.threads,
            input_dir: args.table_path,
            output_path: args.result_path,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match RawConfig::from(Args::parse()).validate() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        region = %config.region_name,
        start = %config.start_date,
        end = %config.end_date,
        threads = config.workers.get(),
        tables = %config.input_dir.display(),
        "running TPC-H Q5"
    );

    match run(&config) {
        Ok(output) => {
            info!(
                valid_orders = output.stats.valid_orders,
                lineitems_matched = output.stats.lineitems_matched,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "query failed");
            ExitCode::FAILURE
        }
    }
}
