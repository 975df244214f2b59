//! # lampctl: composition root
//!
//! Wires all adapters together for the two binaries:
//!
//! - `lampctl <command…>` runs one command against the network and prints
//!   what happened to each bulb
//! - `lampd` serves the HTTP ingress and runs posted commands one at a time
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Construct the selected light transport and the JSON snapshot store
//! - Construct application services, injecting adapters via port traits
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

pub mod config;

use lampctl_adapter_storage_json::JsonSnapshotStore;
use lampctl_app::effects::EffectContext;
use lampctl_app::ports::LightTransport;
use lampctl_app::services::command_service::CommandService;
use lampctl_app::services::snapshot_service::SnapshotService;
use lampctl_domain::command::Command;
use lampctl_domain::error::CommandError;

use crate::config::Config;

/// Usage text printed by the command line.
pub const USAGE: &str = "\
usage: lampctl [much|little] <verb> [<bulb> [and <bulb>]...] [clauses] [quickly|slowly]

verbs:
  on | off | status
  darker | lighter
  color|rgb <bulb>... in <name> | in <r> <g> <b>
  hsb <bulb>... in <h> <s> <b>
  save <bulb>... [to <name>]
  restore <bulb>... [from <name>]

examples:
  lampctl much darker kitchen
  lampctl color kitchen and hall in light blue slowly
  lampctl save all to dinner";

/// What the command line was asked to do.
#[derive(Debug)]
pub enum Invocation {
    /// No arguments at all.
    Usage,
    /// `-h` or `--help`.
    Help,
    Run(Command),
}

/// Interpret the arguments after the program name.
///
/// Needs neither configuration nor network, so a malformed command is
/// reported before either is touched.
///
/// # Errors
///
/// The [`CommandError`] of a command line that does not compile.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Invocation, CommandError> {
    match args.first().map(AsRef::as_ref) {
        None => Ok(Invocation::Usage),
        Some("-h" | "--help") => Ok(Invocation::Help),
        Some(_) => Command::compile(args).map(Invocation::Run),
    }
}

/// Install the global `tracing` subscriber, writing to stderr.
pub fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

/// Build the command service for `transport` from the configuration.
#[must_use]
pub fn command_service<T>(config: &Config, transport: T) -> CommandService<T, JsonSnapshotStore>
where
    T: LightTransport + 'static,
{
    CommandService::new(
        EffectContext::new(transport, config.tuning, config.run.query_policy()),
        SnapshotService::new(JsonSnapshotStore::new(config.storage.path.clone())),
        config.run.orchestrator(),
    )
}
