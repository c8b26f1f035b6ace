/// An inclusive range of 1-based page numbers, e.g. `-s3 -e7`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        PageRange { start, end }
    }

    pub fn contains(&self, page: usize) -> bool {
        page >= self.start && page <= self.end
    }

    /// Both bounds are positive and the range is not reversed
    pub fn is_valid(&self) -> bool {
        self.start > 0 && self.end > 0 && self.end >= self.start
    }
}

/// Parse a positive page number like "12" or "+12".
///
/// Zero, negative numbers and anything that is not a plain integer are rejected.
pub fn parse_page_number(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|&n| n >= 1)
}
