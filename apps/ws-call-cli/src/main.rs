//! `ws-call`: send one SOAP request and report the classified outcome.
//!
//! # Usage
//!
//! ```bash
//! # Call GetFlights on the local airline sample
//! ws-call --operation GetFlights \
//!     --action http://www.springframework.org/spring-ws/samples/airline/GetFlights \
//!     --payload get-flights.xml
//!
//! # SOAP 1.2 with a tight deadline, JSON output
//! ws-call --endpoint https://quotes.example.com/ws --soap12 --deadline 2s \
//!     --operation GetQuote --payload - --json < quote.xml
//!
//! # Show the effective configuration
//! ws-call --config ws-call.yaml --print-config
//! ```
//!
//! Exit status is 0 on success, 1 when the call failed, 2 on usage or
//! configuration errors.

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod config;
mod logging;
mod output;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ws_call::{OperationDescriptor, execute};
use ws_soap::SoapTransport;

use crate::config::{AppConfig, Overrides};

const EXIT_CALL_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Send a SOAP request and classify the outcome
#[derive(Parser, Debug)]
#[command(name = "ws-call")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service endpoint URL (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// SOAP action URI for the operation
    #[arg(long)]
    action: Option<String>,

    /// Use SOAP 1.2 instead of SOAP 1.1
    #[arg(long)]
    soap12: bool,

    /// Deadline for the whole call, e.g. "5s" or "1m 30s" (overrides config)
    #[arg(long, value_parser = humantime::parse_duration)]
    deadline: Option<Duration>,

    /// Operation name, used for logging
    #[arg(long, required_unless_present = "print_config")]
    operation: Option<String>,

    /// File holding the XML body payload, or "-" for stdin
    #[arg(long, value_name = "FILE", required_unless_present = "print_config")]
    payload: Option<PathBuf>,

    /// Print the call result as JSON
    #[arg(long)]
    json: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&Overrides {
        endpoint: cli.endpoint.clone(),
        soap12: cli.soap12,
        deadline: cli.deadline,
    });

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(&config.logging, cli.verbose);

    let (Some(operation), Some(payload_path)) = (&cli.operation, &cli.payload) else {
        anyhow::bail!("--operation and --payload are required");
    };
    let payload = read_payload(payload_path)?;

    let transport = SoapTransport::new(config.client)?;

    let mut op = OperationDescriptor::new(operation.as_str(), payload);
    if let Some(action) = &cli.action {
        op = op.with_action(action.as_str());
    }

    tracing::info!(operation = %operation, "calling remote operation");
    let result = execute(&op, &transport);

    if cli.json {
        println!("{}", output::to_json(&result)?);
    } else {
        output::print_human(&result);
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_CALL_FAILED)
    })
}

fn read_payload(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("failed to read payload from stdin")?;
        return Ok(payload);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file {}", path.display()))
}
