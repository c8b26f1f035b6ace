use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::Path;

const USAGE: &str =
    "-sstart_page -eend_page [ -f | -llines_per_page ] [ -ddest ] [ in_filename ]";

/// Select a range of pages from a text stream
///
/// Arguments are positional: -sSTART first, -eEND second, then any of
/// -f, -lLINES and -dDEST, then an optional input file (stdin otherwise).
#[derive(Parser)]
#[command(name = "selpg")]
#[command(version)]
pub struct Cli {}

/// A request clap answers instead of the page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meta {
    Help,
    Version,
}

/// `--help` or `--version` given as the only argument.
///
/// Everything else, including a leading `--`, goes to the positional parser
/// untouched.
pub fn meta_request(args: &[OsString]) -> Option<Meta> {
    match args {
        [arg] if arg == "--help" => Some(Meta::Help),
        [arg] if arg == "--version" => Some(Meta::Version),
        _ => None,
    }
}

pub fn command() -> clap::Command {
    Cli::command().override_usage(format!("selpg {}", USAGE))
}

/// File name of the running binary, used to prefix every message
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "selpg".to_string())
}

/// Two-line banner printed after every argument error
pub fn usage(program: &str) -> String {
    format!("\nUSAGE: {} {}", program, USAGE)
}
