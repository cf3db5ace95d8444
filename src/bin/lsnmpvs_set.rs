//! lsnmpvs-set: Write MIB values on an agent.
//!
//! Part of the lsnmpvs CLI utilities.

use clap::Parser;
use lsnmpvs::cli::args::{LogArgs, TargetArgs, ValueType};
use lsnmpvs::cli::output::{write_error, write_response};
use lsnmpvs::{Manager, RawIid, Value};
use std::process::ExitCode;

/// Set one or more IIDs.
///
/// Type specifiers:
///   i = integer
///   s = text
///   d = date (d:m:yyyy:h:m:s:ms)
#[derive(Debug, Parser)]
#[command(name = "lsnmpvs-set", version, about, verbatim_doc_comment)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    log: LogArgs,

    /// IID TYPE VALUE triplets (e.g., 3.3.1 i 40).
    #[arg(required = true, value_name = "IID TYPE VALUE", num_args = 3.., allow_hyphen_values = true)]
    bindings: Vec<String>,
}

fn parse_bindings(args: &[String]) -> Result<Vec<(RawIid, Value)>, String> {
    if !args.len().is_multiple_of(3) {
        return Err("arguments must be IID TYPE VALUE triplets".into());
    }

    args.chunks(3)
        .map(|chunk| {
            let iid = RawIid::parse(&chunk[0]).map_err(|e| format!("invalid IID '{}': {}", chunk[0], e))?;
            let value_type: ValueType = chunk[1].parse()?;
            let value = value_type.parse_value(&chunk[2])?;
            Ok((iid, value))
        })
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing("warn");

    let bindings = match parse_bindings(&args.bindings) {
        Ok(bindings) => bindings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

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

    match manager.set(&bindings).await {
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
