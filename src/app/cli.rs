use std::{io::Write, path::PathBuf};

use clap::Parser;
use log::info;

use crate::config::{self, SupervisorConfig};
use crate::error::Result;
use crate::manager::{MonitorSettings, Supervisor};
use crate::models::message::ReportMessage;
use crate::monitor::{monitor, MonitorOutcome};
use crate::report::Reporter;
use crate::sampler::ResourceSampler;
use crate::signal::SignalBridge;

#[derive(Parser, Debug)]
#[command(
    name = "process_supervisor",
    version,
    about = "Launches configured programs, reports their usage and enforces a time limit"
)]
pub struct Cli {
    /// Config file: a `timelimit <seconds>` line, then one program and its
    /// arguments per line
    #[arg(short = 'i', long = "input", value_name = "CONFIG")]
    pub input: PathBuf,
}

pub fn run_cli(cli: Cli) -> Result<MonitorOutcome> {
    let config = config::load(&cli.input)?;
    info!("Loaded {} processes from {}", config.specs.len(), cli.input.display());

    let signals = SignalBridge::install()?;
    let mut reporter = Reporter::stdout();
    supervise(config, MonitorSettings::default(), &signals, &mut reporter)
}

/// One full run: starting line, launches, monitoring and the elapsed summary.
pub fn supervise<W: Write, S: ResourceSampler>(
    config: SupervisorConfig,
    settings: MonitorSettings,
    signals: &SignalBridge,
    reporter: &mut Reporter<W, S>,
) -> Result<MonitorOutcome> {
    reporter.timestamp(ReportMessage::Starting)?;

    let mut supervisor = Supervisor::new(settings);
    supervisor.launch_all(config.specs, reporter)?;

    let outcome = monitor(&mut supervisor, config.timelimit, signals, reporter)?;
    reporter.elapsed(outcome.elapsed)?;
    info!("Supervision finished: {:?} after {} ticks", outcome.reason, outcome.elapsed);
    Ok(outcome)
}
