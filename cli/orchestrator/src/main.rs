//! protoc-gen-openapiv2
//!
//! protoc plugin that renders protobuf services and messages as OpenAPI v2
//! (Swagger) JSON. Invoked by protoc as `--openapiv2_out=<params>:<dir>`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use openapiv2_cli::{load_config, run, CliError};

/// Command-line interface configuration.
#[derive(Parser, Debug)]
#[command(
    name = "protoc-gen-openapiv2",
    about = "protoc plugin generating OpenAPI v2 documents",
    version
)]
struct Cli {
    /// TOML configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter, e.g. `debug` or `pipeline=trace`; overrides the config file
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("protoc-gen-openapiv2: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    logging::init(level)?;
    run(&config, io::stdin().lock(), io::stdout().lock())
}
