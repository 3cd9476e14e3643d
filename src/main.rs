mod app;
mod arguments;
mod checks;
mod cli;
mod console;
mod engine;
mod freedb;
mod interactive;
mod job;
mod query;
mod time;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;

use crate::cli::Args;
use crate::engine::{CancelFlag, ProcessEngine};

fn main() -> ExitCode {
    // invoked with nothing at all: show the short usage and stop
    if std::env::args_os().len() < 2 {
        let mut command = Args::command();
        let _ = command.print_help();
        return ExitCode::SUCCESS;
    }

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if args.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.format_timestamp(None).init();

    // Ctrl+C only trips the flag; the in-flight engine call observes it,
    // stops, and the error path below exits non-zero.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        if let Err(err) = ctrlc::set_handler(move || cancel.cancel()) {
            log::warn!("could not install the interrupt handler: {err}");
        }
    }

    let engine = ProcessEngine::from_env();
    match app::run(args, &engine, &cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(" Error: {err}");
            ExitCode::FAILURE
        }
    }
}
