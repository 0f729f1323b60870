use std::process::ExitCode;

use clap::Parser;
use log::debug;

use process_supervisor::app::cli::{self, Cli};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli::run_cli(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Fatal: {:?}", e);
            eprintln!("process_supervisor: {}", e);
            ExitCode::FAILURE
        }
    }
}
