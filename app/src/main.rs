use std::process::ExitCode;

use caloscope_core::{application::create_client, domain::common::CaloscopeConfig};
use clap::Parser;
use tracing::debug;

use crate::{application::TemporaryFailure, args::Args};

/// `EX_TEMPFAIL` from sysexits.h: the command may succeed if run again.
const EXIT_TEMPORARY_FAILURE: u8 = 75;

mod application;
mod args;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    application::logging::init(&args.log);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if e.downcast_ref::<TemporaryFailure>().is_some() {
                ExitCode::from(EXIT_TEMPORARY_FAILURE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = CaloscopeConfig::try_from(&args)?;
    debug!(api = %config.api.base_url, "starting");
    let client = create_client(config)?;
    application::dispatch(&client, args.command).await
}
