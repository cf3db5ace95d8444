//! lsnmpvs-get: Read MIB values from an agent.
//!
//! Part of the lsnmpvs CLI utilities.

use clap::Parser;
use lsnmpvs::cli::args::{LogArgs, TargetArgs};
use lsnmpvs::cli::output::{write_error, write_response};
use lsnmpvs::{Manager, RawIid};
use std::process::ExitCode;

/// Retrieve one or more IIDs.
#[derive(Debug, Parser)]
#[command(name = "lsnmpvs-get", version, about)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    log: LogArgs,

    /// IIDs to retrieve (dotted notation, e.g. 2.3.0.0).
    #[arg(required = true, value_name = "IID")]
    iids: Vec<RawIid>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing("warn");

    let timeout = match args.target.timeout_duration() {
        Ok(timeout) => timeout,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let manager = match Manager::connect(args.target.target_addr()).await {
        Ok(manager) => manager.timeout(timeout),
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    match manager.get(&args.iids).await {
        Ok(response) => {
            if let Err(e) = write_response(&mut std::io::stdout().lock(), &response) {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}
