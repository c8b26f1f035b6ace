use anyhow::{bail, Context, Result};
use log::debug;
use std::fmt;
use std::io::{self, BufWriter, StdoutLock, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Print command used when `SELPG_PRINT_CMD` is not set
pub const DEFAULT_PRINT_COMMAND: &str = "lp";

/// Environment variable that overrides the print command
pub const PRINT_COMMAND_ENV: &str = "SELPG_PRINT_CMD";

/// Where selected pages end up
pub enum Sink {
    Stdout(BufWriter<StdoutLock<'static>>),
    Printer {
        child: Child,
        stdin: BufWriter<ChildStdin>,
        command: String,
    },
}

/// The print command could not be started
#[derive(Debug)]
pub struct SinkError {
    pub command: String,
    pub source: io::Error,
}

impl SinkError {
    pub fn exit_code(&self) -> i32 {
        13
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not open pipe to \"{}\"", self.command)
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Sink {
    /// Standard output, or the print command from the environment when a
    /// destination is given
    pub fn open(print_dest: Option<&str>) -> Result<Self, SinkError> {
        let program = std::env::var(PRINT_COMMAND_ENV)
            .ok()
            .filter(|program| !program.is_empty())
            .unwrap_or_else(|| DEFAULT_PRINT_COMMAND.to_string());
        Self::open_with(print_dest, &program)
    }

    pub fn open_with(print_dest: Option<&str>, program: &str) -> Result<Self, SinkError> {
        let Some(dest) = print_dest else {
            debug!("writing selected pages to stdout");
            return Ok(Sink::Stdout(BufWriter::new(io::stdout().lock())));
        };

        let dest_arg = format!("-d{}", dest);
        let command = format!("{} {}", program, dest_arg);
        debug!("piping selected pages to {:?}", command);

        let spawned = Command::new(program)
            .arg(&dest_arg)
            .stdin(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => return Err(SinkError { command, source }),
        };
        let Some(stdin) = child.stdin.take() else {
            return Err(SinkError {
                command,
                source: io::Error::new(io::ErrorKind::BrokenPipe, "child has no stdin"),
            });
        };

        Ok(Sink::Printer {
            child,
            stdin: BufWriter::new(stdin),
            command,
        })
    }

    /// Close the sink, waiting for the print command to exit.
    ///
    /// Output must already be flushed; bytes still buffered here belong to a
    /// write that failed and has been reported, so they are discarded.
    pub fn finish(self) -> Result<()> {
        match self {
            Sink::Stdout(out) => {
                let (_, unwritten) = out.into_parts();
                log_unwritten(unwritten.map_or(0, |buf| buf.len()));
            }
            Sink::Printer {
                mut child,
                stdin,
                command,
            } => {
                // Dropping stdin sends end of file to the print command
                let (stdin, unwritten) = stdin.into_parts();
                drop(stdin);
                log_unwritten(unwritten.map_or(0, |buf| buf.len()));

                let status = child
                    .wait()
                    .with_context(|| format!("Failed to wait for \"{}\"", command))?;
                if !status.success() {
                    bail!("print command \"{}\" exited with {}", command, status);
                }
            }
        }
        Ok(())
    }
}

fn log_unwritten(len: usize) {
    if len > 0 {
        debug!("discarding {} bytes left after a failed write", len);
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(out) => out.write(buf),
            Sink::Printer { stdin, .. } => stdin.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(out) => out.flush(),
            Sink::Printer { stdin, .. } => stdin.flush(),
        }
    }
}
