use crate::page_range::{parse_page_number, PageRange};
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Lines per page when no `-l` switch is given
pub const DEFAULT_PAGE_LENGTH: usize = 72;

const INPUT_BUFFER_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Fixed number of lines per page
    Lines,
    /// Pages end at each form feed character
    FormFeed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn open(&self) -> Result<Box<dyn BufRead>, ArgError> {
        match self {
            Input::Stdin => Ok(Box::new(BufReader::with_capacity(
                INPUT_BUFFER_SIZE,
                io::stdin(),
            ))),
            Input::File(path) => {
                let file = File::open(path).map_err(|source| ArgError::UnreadableInput {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(BufReader::with_capacity(INPUT_BUFFER_SIZE, file)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub range: PageRange,
    pub input: Input,
    pub page_length: usize,
    pub page_mode: PageMode,
    pub print_dest: Option<String>,
}

/// Everything that can go wrong while reading the command line.
///
/// Each variant maps to its own process exit code.
#[derive(Debug)]
pub enum ArgError {
    NotEnoughArguments,
    ExpectedStartPage,
    InvalidStartPage(String),
    ExpectedEndPage,
    InvalidEndPage(String),
    InvalidPageLength(String),
    MalformedFormFeedFlag,
    MissingDestination,
    UnknownOption(String),
    UnreadableInput { path: PathBuf, source: io::Error },
    InvalidConfiguration,
}

impl ArgError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ArgError::NotEnoughArguments => 1,
            ArgError::ExpectedStartPage => 2,
            ArgError::InvalidStartPage(_) => 3,
            ArgError::ExpectedEndPage => 4,
            ArgError::InvalidEndPage(_) => 5,
            ArgError::InvalidPageLength(_) => 6,
            ArgError::MalformedFormFeedFlag => 7,
            ArgError::MissingDestination => 8,
            ArgError::UnknownOption(_) => 9,
            ArgError::UnreadableInput { .. } => 10,
            ArgError::InvalidConfiguration => 88,
        }
    }
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgError::NotEnoughArguments => write!(f, "not enough arguments"),
            ArgError::ExpectedStartPage => write!(f, "1st arg should be -sstart_page"),
            ArgError::InvalidStartPage(s) => write!(f, "invalid start page {:?}", s),
            ArgError::ExpectedEndPage => write!(f, "2nd arg should be -eend_page"),
            ArgError::InvalidEndPage(s) => write!(f, "invalid end page {:?}", s),
            ArgError::InvalidPageLength(s) => write!(f, "invalid page length {:?}", s),
            ArgError::MalformedFormFeedFlag => write!(f, "option should be \"-f\""),
            ArgError::MissingDestination => {
                write!(f, "-d option requires a printer destination")
            }
            ArgError::UnknownOption(s) => write!(f, "unknown option {:?}", s),
            ArgError::UnreadableInput { path, .. } => {
                write!(f, "could not open input file \"{}\"", path.display())
            }
            ArgError::InvalidConfiguration => {
                write!(f, "invalid page selection after argument parsing")
            }
        }
    }
}

impl std::error::Error for ArgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgError::UnreadableInput { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Config {
    /// Parse the arguments that follow the program name.
    ///
    /// The grammar is positional: `-sN` first, `-eN` second, then any of
    /// `-lN`, `-f`, `-dDEST`, then an optional input file. A named input file
    /// is opened once here so an unreadable path fails before any output.
    ///
    /// Switches are matched on their UTF-8 view; the input path is kept as
    /// given, so file names that are not valid UTF-8 still work.
    pub fn parse<S: AsRef<OsStr>>(args: &[S]) -> Result<Self, ArgError> {
        if args.len() < 2 {
            return Err(ArgError::NotEnoughArguments);
        }

        let start_arg = args[0].as_ref().to_string_lossy();
        let start_text = start_arg
            .strip_prefix("-s")
            .ok_or(ArgError::ExpectedStartPage)?;
        let start = parse_page_number(start_text)
            .ok_or_else(|| ArgError::InvalidStartPage(start_text.to_string()))?;

        let end_arg = args[1].as_ref().to_string_lossy();
        let end_text = end_arg
            .strip_prefix("-e")
            .ok_or(ArgError::ExpectedEndPage)?;
        let end = parse_page_number(end_text)
            .filter(|&end| end >= start)
            .ok_or_else(|| ArgError::InvalidEndPage(end_text.to_string()))?;

        let mut config = Config {
            range: PageRange::new(start, end),
            input: Input::Stdin,
            page_length: DEFAULT_PAGE_LENGTH,
            page_mode: PageMode::Lines,
            print_dest: None,
        };

        let rest: Vec<&OsStr> = args[2..].iter().map(|arg| arg.as_ref()).collect();
        let mut rest = rest.into_iter().peekable();
        while let Some(arg) = rest.next_if(|arg| arg.to_string_lossy().starts_with('-')) {
            let arg = arg.to_string_lossy();
            // The switch letter is ASCII, so slicing past it stays on a char boundary
            match arg.chars().nth(1) {
                Some('l') => {
                    let value = &arg[2..];
                    config.page_length = parse_page_number(value)
                        .ok_or_else(|| ArgError::InvalidPageLength(value.to_string()))?;
                }
                Some('f') => {
                    if arg != "-f" {
                        return Err(ArgError::MalformedFormFeedFlag);
                    }
                    config.page_mode = PageMode::FormFeed;
                }
                Some('d') => {
                    let dest = &arg[2..];
                    if dest.is_empty() {
                        return Err(ArgError::MissingDestination);
                    }
                    config.print_dest = Some(dest.to_string());
                }
                _ => return Err(ArgError::UnknownOption(arg.to_string())),
            }
        }

        if let Some(path) = rest.next() {
            config.input = Input::File(PathBuf::from(path));
            // Only checks that the file can be opened; scanning reopens it
            config.input.open()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Re-check the invariants the parser is supposed to have established.
    pub fn validate(&self) -> Result<(), ArgError> {
        if !self.range.is_valid() {
            return Err(ArgError::InvalidConfiguration);
        }
        if self.page_length <= 1 {
            return Err(ArgError::InvalidConfiguration);
        }
        if !matches!(self.page_mode, PageMode::Lines | PageMode::FormFeed) {
            return Err(ArgError::InvalidConfiguration);
        }
        Ok(())
    }
}
