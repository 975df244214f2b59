//! # lampctl: one-shot command line
//!
//! Runs a single command (`lampctl much darker kitchen`) against the
//! configured transport, prints one line per bulb and exits.

use std::process::ExitCode;

use lampctl::config::{Config, TransportKind};
use lampctl::{Invocation, USAGE, command_service, init_tracing, parse_args};
use lampctl_adapter_lifx::LifxTransport;
use lampctl_adapter_virtual::VirtualTransport;
use lampctl_app::ports::LightTransport;
use lampctl_domain::command::Command;

const USAGE_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(Invocation::Run(command)) => command,
        Ok(Invocation::Usage) => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(USAGE_ERROR));
        }
        Ok(Invocation::Help) => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => {
            eprintln!("lampctl: {err}\n\n{USAGE}");
            return Ok(ExitCode::from(USAGE_ERROR));
        }
    };

    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    match config.transport.kind {
        TransportKind::Lifx => {
            let transport = LifxTransport::bind(config.lifx.clone()).await?;
            run_once(&config, transport, command).await
        }
        TransportKind::Virtual => {
            let transport = VirtualTransport::new(&config.virtual_bulbs);
            run_once(&config, transport, command).await
        }
    }
}

async fn run_once<T>(config: &Config, transport: T, command: Command) -> anyhow::Result<ExitCode>
where
    T: LightTransport + 'static,
{
    let summary = command_service(config, transport).execute(command).await?;
    println!("{summary}");
    if summary.failures() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
