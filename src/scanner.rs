use crate::config::{Config, PageMode};
use crate::page_range::PageRange;
use log::debug;
use std::io::{self, BufRead, ErrorKind, Write};

const FORM_FEED: u8 = b'\x0c';

/// Outcome of one pass over the input
#[derive(Debug)]
pub struct ScanReport {
    /// Page number the scan ended on, i.e. the total number of pages seen
    pub pages: usize,
    pub input_error: Option<io::Error>,
    pub output_error: Option<io::Error>,
}

/// Writer half of a scan: after the first failed write it drops further
/// output so the scan can still count pages to the end of the input
struct Selected<'a, W> {
    writer: &'a mut W,
    error: Option<io::Error>,
}

impl<W: Write> Selected<'_, W> {
    fn write(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.writer.write_all(bytes) {
            self.error = Some(err);
        }
    }
}

/// Copy the pages selected by `config` from `reader` to `writer`.
///
/// I/O failures are recorded in the report rather than returned. A read
/// error ends the scan; a write error only stops output, and pages are still
/// counted to the end of the input. Whatever was written is flushed.
pub fn scan<R: BufRead, W: Write>(reader: R, writer: &mut W, config: &Config) -> ScanReport {
    let mut pages = 1;
    let mut output = Selected {
        writer,
        error: None,
    };
    let result = match config.page_mode {
        PageMode::Lines => {
            scan_lines(reader, &mut output, config.range, config.page_length, &mut pages)
        }
        PageMode::FormFeed => scan_form_feeds(reader, &mut output, config.range, &mut pages),
    };

    let Selected { writer, error } = output;
    let mut report = ScanReport {
        pages,
        input_error: result.err(),
        output_error: error,
    };
    if report.output_error.is_none() {
        if let Err(err) = writer.flush() {
            report.output_error = Some(err);
        }
    }

    debug!("scan finished on page {}", report.pages);
    report
}

fn scan_lines<R: BufRead, W: Write>(
    mut reader: R,
    output: &mut Selected<'_, W>,
    range: PageRange,
    page_length: usize,
    pages: &mut usize,
) -> io::Result<()> {
    let mut line = Vec::new();
    let mut line_ctr = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }

        line_ctr += 1;
        if line_ctr > page_length {
            *pages += 1;
            line_ctr = 1;
        }

        if range.contains(*pages) {
            output.write(&line);
        }
    }
}

fn scan_form_feeds<R: BufRead, W: Write>(
    mut reader: R,
    output: &mut Selected<'_, W>,
    range: PageRange,
    pages: &mut usize,
) -> io::Result<()> {
    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if buf.is_empty() {
            return Ok(());
        }

        // A form feed opens the next page and is written as part of it
        let mut segment_start = 0;
        for (i, &byte) in buf.iter().enumerate() {
            if byte == FORM_FEED {
                if range.contains(*pages) {
                    output.write(&buf[segment_start..i]);
                }
                *pages += 1;
                segment_start = i;
            }
        }
        if range.contains(*pages) {
            output.write(&buf[segment_start..]);
        }

        let consumed = buf.len();
        reader.consume(consumed);
    }
}

impl ScanReport {
    /// Status lines for stderr, in the order they should be printed
    pub fn diagnostics(&self, range: PageRange) -> Vec<String> {
        let mut messages = Vec::new();

        if self.pages < range.start {
            messages.push(format!(
                "start_page ({}) greater than total pages ({}), no output written",
                range.start, self.pages
            ));
        } else if self.pages < range.end {
            messages.push(format!(
                "end_page ({}) greater than total pages ({}), less output than expected",
                range.end, self.pages
            ));
        }

        if let Some(err) = &self.input_error {
            messages.push(format!("system error occurred on input stream: {}", err));
        }
        if let Some(err) = &self.output_error {
            messages.push(format!("system error occurred on output stream: {}", err));
        }
        if self.input_error.is_none() && self.output_error.is_none() {
            messages.push("done".to_string());
        }

        messages
    }
}
