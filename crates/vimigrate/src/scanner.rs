//! Line-oriented recognition of VimScript function boundaries.
//!
//! Only function headers and end markers are recognized; everything else is
//! ordinary content. This is deliberately not a grammar-level parser: the
//! later pipeline stages depend on the same under/over-approximations the
//! line patterns produce.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Expands a `mandatory|optional` Vim command spelling into a regex fragment
/// accepting every abbreviation Vim itself accepts: the mandatory stem
/// followed by any prefix of the optional suffix.
fn command_pattern(spelling: &str) -> String {
    let Some((stem, suffix)) = spelling.split_once('|') else {
        return regex::escape(spelling);
    };
    let mut pattern = regex::escape(stem);
    for ch in suffix.chars() {
        pattern.push_str("(?:");
        pattern.push_str(&regex::escape(&ch.to_string()));
    }
    pattern.push_str(&")?".repeat(suffix.chars().count()));
    pattern
}

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"^{}\s+([^(\s]+)\s*(\(.*)$", command_pattern("func|tion!"));
    Regex::new(&pattern).expect("function header pattern is valid")
});

static END_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!("^{}", command_pattern("endfu|nction"));
    Regex::new(&pattern).expect("end marker pattern is valid")
});

/// A recognized function definition header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionHeader<'a> {
    /// Name as written, private marker not yet folded.
    pub name: &'a str,
    /// Raw parameter text, opening paren included, up to end of line.
    pub params: &'a str,
}

/// Matches a function definition header. Lines that fail the pattern are
/// ordinary content, never an error.
pub fn match_header(line: &str) -> Option<FunctionHeader<'_>> {
    let caps = HEADER_RE.captures(line)?;
    Some(FunctionHeader {
        name: caps.get(1)?.as_str(),
        params: caps.get(2)?.as_str(),
    })
}

/// Matches an `endfunction` marker in any accepted abbreviation.
pub fn is_end_marker(line: &str) -> bool {
    END_RE.is_match(line)
}

/// A demarcated function body inside a line sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBlock {
    /// Body line range, end marker line included when one was found.
    pub body: Range<usize>,
    /// First line index after the block; the caller resumes here and never
    /// re-scans consumed lines.
    pub next: usize,
}

/// Consumes lines from `start` up to and including the function's end
/// marker. An unterminated function runs to the end of input.
pub fn consume_function_body(lines: &[String], start: usize) -> FunctionBlock {
    let mut pos = start;
    while pos < lines.len() {
        let at_end = is_end_marker(&lines[pos]);
        pos += 1;
        if at_end {
            break;
        }
    }
    FunctionBlock {
        body: start..pos,
        next: pos,
    }
}
