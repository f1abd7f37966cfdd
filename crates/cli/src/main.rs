//! eventsink entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: read the command-line flags and validate them
//!    into an immutable [`subscription::AgentConfig`].
//! 2. **Wire observability**: configure `tracing-subscriber` (pretty or JSON)
//!    and, when `--otlp-endpoint` is given, an OpenTelemetry OTLP exporter. All
//!    `tracing` events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: the OS interface table, the Marathon
//!    client, and the log sink, injected into [`driver::Driver`].
//! 4. **Run**: install the SIGINT/SIGTERM handlers, drive startup to
//!    `Listening`, serve until a signal arrives, then release the subscription.
//!    A signal received during startup is honoured as soon as the current step
//!    finishes.
//!
//! Any startup failure ends the process with a non-zero exit status and the
//! error message.

mod args;
mod shutdown;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use driver::Driver;
use listener::LogSink;
use netif::SystemInterfaces;
use orchestrator::MarathonClient;
use tracing::{error, info};

use crate::args::Args;
use crate::shutdown::ShutdownSignals;
use crate::telemetry::Telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let telemetry = Telemetry::init(args.log_format, args.otlp_endpoint.as_deref())?;

    let result = match ShutdownSignals::install() {
        Ok(signals) => run(&args, signals).await,
        Err(err) => Err(anyhow::Error::new(err).context("failed to install signal handlers")),
    };
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "eventsink exiting");
    }

    telemetry.shutdown();
    result
}

async fn run(args: &Args, signals: ShutdownSignals) -> anyhow::Result<()> {
    let config = args.agent_config().context("invalid configuration")?;
    info!(
        marathon = config.orchestrator_endpoint(),
        interface = %config.interface(),
        port = %config.port(),
        "starting eventsink"
    );

    let remote = MarathonClient::new(config.orchestrator_endpoint())
        .context("failed to create Marathon client")?;
    let driver = Driver::new(
        config,
        SystemInterfaces::new(),
        Arc::new(remote),
        Arc::new(LogSink),
    );

    driver
        .run(signals.recv())
        .await
        .context("event subscription failed")?;

    info!("eventsink stopped");
    Ok(())
}
