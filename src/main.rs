mod cli;
mod config;
mod page_range;
mod scanner;
mod sink;

use anyhow::Result;
use cli::Meta;
use config::{ArgError, Config};
use log::debug;
use sink::{Sink, SinkError};
use std::ffi::OsString;

/// Exit code for failures that carry no code of their own
const GENERIC_FAILURE: i32 = 99;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    match cli::meta_request(&args) {
        Some(Meta::Help) => {
            print!("{}", cli::command().render_long_help());
            return;
        }
        Some(Meta::Version) => {
            print!("{}", cli::command().render_version());
            return;
        }
        None => {}
    }

    let program = cli::program_name();
    if let Err(err) = run(&program, &args) {
        eprintln!("{}: {:#}", program, err);
        eprintln!("{}", cli::usage(&program));
        std::process::exit(exit_code(&err));
    }
}

fn run(program: &str, args: &[OsString]) -> Result<()> {
    let config = Config::parse(args)?;
    debug!("parsed configuration: {:?}", config);

    let input = config.input.open()?;
    let mut sink = Sink::open(config.print_dest.as_deref())?;

    let report = scanner::scan(input, &mut sink, &config);
    let finished = sink.finish();

    for message in report.diagnostics(config.range) {
        eprintln!("{}: {}", program, message);
    }
    if let Err(err) = finished {
        eprintln!("{}: {:#}", program, err);
    }

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<ArgError>() {
        err.exit_code()
    } else if let Some(err) = err.downcast_ref::<SinkError>() {
        err.exit_code()
    } else {
        GENERIC_FAILURE
    }
}
