use std::{
    fmt::Display,
    io::{self, Stdout, Write},
};

use chrono::Local;
use crossterm::{
    style::{style, Color, Stylize},
    tty::IsTty,
};

use crate::models::{
    message::ReportMessage,
    process::{ProcessRecord, ProcessState},
};
use crate::sampler::{ResourceSampler, ResourceUsage, SystemSampler};

const TIMESTAMP_FORMAT: &str = "%a %b %e %T %Y";

/// Renders launch messages and report blocks to a line-oriented sink.
pub struct Reporter<W: Write, S: ResourceSampler> {
    out: W,
    sampler: S,
    colored: bool,
}

impl Reporter<Stdout, SystemSampler> {
    /// Reports to stdout, coloured when stdout is a terminal.
    pub fn stdout() -> Self {
        let colored = io::stdout().is_tty();
        Reporter::new(io::stdout(), SystemSampler::new()).with_color(colored)
    }
}

impl<W: Write, S: ResourceSampler> Reporter<W, S> {
    pub fn new(out: W, sampler: S) -> Self {
        Self {
            out,
            sampler,
            colored: false,
        }
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn timestamp(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(
            self.out,
            "[{}] {}",
            Local::now().format(TIMESTAMP_FORMAT),
            message
        )?;
        self.out.flush()
    }

    /// Writes the header line followed by one status line per record,
    /// in index order.
    pub fn report(&mut self, records: &[ProcessRecord], header: ReportMessage) -> io::Result<()> {
        self.timestamp(header)?;
        for record in records {
            let usage = record.pid().and_then(|pid| self.sampler.sample(pid));
            let line = self.status_line(record, usage);
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()
    }

    pub fn launched(&mut self, record: &ProcessRecord) -> io::Result<()> {
        let pid = record
            .pid()
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "?".to_string());
        writeln!(
            self.out,
            "[{}] {} {}, {} (pid: {})",
            record.index,
            record.spec.program_name(),
            record.spec.joined_args(),
            self.paint("started successfully", Color::Green),
            pid
        )?;
        self.out.flush()
    }

    pub fn launch_failed(&mut self, record: &ProcessRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "[{}] {}, {}",
            record.index,
            record.spec.path.display(),
            self.paint("failed to start", Color::Red)
        )?;
        self.out.flush()
    }

    pub fn elapsed(&mut self, seconds: u64) -> io::Result<()> {
        writeln!(self.out, "Exiting (total time: {} seconds)", seconds)?;
        self.out.flush()
    }

    fn status_line(&self, record: &ProcessRecord, usage: Option<ResourceUsage>) -> String {
        match record.state {
            ProcessState::Running => match usage {
                Some(usage) => format!(
                    "[{}] {}, cpu usage: {}%, mem usage: {:.2} MB",
                    record.index,
                    self.paint("Running", Color::Green),
                    usage.cpu_percent,
                    usage.memory_mb
                ),
                None => format!(
                    "[{}] {}, cpu usage: n/a, mem usage: n/a",
                    record.index,
                    self.paint("Running", Color::Green)
                ),
            },
            ProcessState::Terminated => {
                format!("[{}] {}", record.index, self.paint("Terminated", Color::Red))
            }
            ProcessState::ExitedNormally | ProcessState::FailedToStart => match record.exit_code {
                Some(code) if code != 0 => format!(
                    "[{}] {} (status {})",
                    record.index,
                    self.paint("Exited", Color::Yellow),
                    code
                ),
                _ => format!("[{}] {}", record.index, self.paint("Exited", Color::Yellow)),
            },
        }
    }

    fn paint(&self, word: &str, color: Color) -> String {
        if self.colored {
            style(word).with(color).to_string()
        } else {
            word.to_string()
        }
    }
}
