//! lsnmpvs-agent: Run a simulated L-SNMPvS device.
//!
//! Part of the lsnmpvs CLI utilities.

use clap::Parser;
use lsnmpvs::cli::args::{AgentArgs, LogArgs};
use lsnmpvs::cli::output::write_error;
use std::process::ExitCode;

/// Serve a device MIB over UDP until interrupted.
#[derive(Debug, Parser)]
#[command(name = "lsnmpvs-agent", version, about)]
struct Args {
    #[command(flatten)]
    agent: AgentArgs,

    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing("info");

    let agent = match args.agent.builder().build().await {
        Ok(agent) => agent,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = agent.cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match agent.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}
