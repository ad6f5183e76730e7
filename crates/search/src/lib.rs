//! Search execution used by the analyse toolkit.
//!
//! A pattern is evaluated against one text buffer at a time. The engine
//! supports literal, extended (backslash escaped), regex and multi-line regex
//! modes together with whole-word and case-sensitivity switches. Matches carry
//! byte offsets plus line/column information so callers can record either hit
//! positions or hit lines.

mod escape;

use std::fmt;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

pub use escape::convert_extended;

/// Error conditions raised by the search engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search pattern cannot be empty")]
    EmptyPattern,
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Determines how the search pattern is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Literal text.
    #[default]
    Normal,
    /// Literal text after decoding `\n`, `\t`, `\xNN` and friends.
    Escaped,
    /// Regular expression, `.` stops at line ends.
    Regex,
    /// Regular expression where `.` also matches line ends.
    RegexMultiline,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Normal,
        SearchMode::Escaped,
        SearchMode::Regex,
        SearchMode::RegexMultiline,
    ];

    /// Name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Normal => "normal",
            SearchMode::Escaped => "escaped",
            SearchMode::Regex => "regex",
            SearchMode::RegexMultiline => "rgx_multiline",
        }
    }

    /// Parses a configuration name. Unknown names resolve to [`SearchMode::Normal`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_default()
    }

    pub fn is_regex(self) -> bool {
        matches!(self, SearchMode::Regex | SearchMode::RegexMultiline)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options supplied to the search engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub pattern: String,
    pub mode: SearchMode,
    pub case_sensitive: bool,
    pub whole_word: bool,
}

impl SearchOptions {
    /// Creates a new option set for the specified pattern with sensible defaults.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            mode: SearchMode::Normal,
            case_sensitive: false,
            whole_word: false,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.pattern.is_empty() {
            return Err(SearchError::EmptyPattern);
        }
        Ok(())
    }
}

/// Represents a single match produced by a search query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    pub matched: String,
    pub line_text: String,
}

/// Captures the outcome of a `replace_all` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaceAllOutcome {
    pub replaced_text: String,
    pub replacements: usize,
}

/// Search engine bound to a particular text buffer.
pub struct SearchEngine<'a> {
    text: &'a str,
    line_index: LineIndex<'a>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            line_index: LineIndex::new(text),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Returns every match of the options over the whole buffer, in buffer order.
    pub fn find_all(&self, options: &SearchOptions) -> Result<Vec<SearchMatch>, SearchError> {
        options.validate()?;
        let regex = build_regex(options)?;
        let matches = self
            .collect_ranges(&regex, options)
            .into_iter()
            .map(|range| self.build_match(range))
            .collect();
        Ok(matches)
    }

    /// Returns only the byte ranges of the matches; cheaper than [`find_all`](Self::find_all)
    /// when line text is not needed.
    pub fn find_ranges(&self, options: &SearchOptions) -> Result<Vec<Range<usize>>, SearchError> {
        options.validate()?;
        let regex = build_regex(options)?;
        Ok(self.collect_ranges(&regex, options))
    }

    /// Replaces every match in the buffer and returns the updated text.
    pub fn replace_all(
        &self,
        replacement: &str,
        options: &SearchOptions,
    ) -> Result<ReplaceAllOutcome, SearchError> {
        options.validate()?;
        let regex = build_regex(options)?;
        let mut replaced = String::with_capacity(self.text.len());
        let mut last = 0usize;
        let mut replacements = 0usize;

        for caps in regex.captures_iter(self.text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            if m.start() == m.end() {
                continue;
            }
            if options.whole_word && !self.is_whole_word(m.start(), m.end()) {
                continue;
            }
            replaced.push_str(&self.text[last..m.start()]);
            if options.mode.is_regex() {
                caps.expand(replacement, &mut replaced);
            } else {
                replaced.push_str(replacement);
            }
            last = m.end();
            replacements += 1;
        }

        if replacements == 0 {
            return Ok(ReplaceAllOutcome {
                replaced_text: self.text.to_string(),
                replacements,
            });
        }
        replaced.push_str(&self.text[last..]);
        Ok(ReplaceAllOutcome {
            replaced_text: replaced,
            replacements,
        })
    }

    /// 1-based line containing the byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_index.line_and_column(offset.min(self.text.len())).0
    }

    /// Text of a 1-based line without its terminator.
    pub fn line_text(&self, line: usize) -> &'a str {
        self.line_index.line_text(line)
    }

    pub fn line_count(&self) -> usize {
        self.line_index.starts.len()
    }

    fn build_match(&self, range: Range<usize>) -> SearchMatch {
        let (line, column) = self.line_index.line_and_column(range.start);
        SearchMatch {
            start: range.start,
            end: range.end,
            line,
            column,
            matched: self.text[range].to_string(),
            line_text: self.line_index.line_text(line).to_string(),
        }
    }

    fn collect_ranges(&self, regex: &Regex, options: &SearchOptions) -> Vec<Range<usize>> {
        regex
            .find_iter(self.text)
            .filter(|m| m.start() != m.end())
            .filter(|m| !options.whole_word || self.is_whole_word(m.start(), m.end()))
            .map(|m| m.range())
            .collect()
    }

    fn is_whole_word(&self, start: usize, end: usize) -> bool {
        let is_word = |ch: char| ch.is_alphanumeric() || ch == '_';
        let left = self.text[..start].chars().next_back().is_some_and(is_word);
        let right = self.text[end..].chars().next().is_some_and(is_word);
        !(left || right)
    }
}

fn build_regex(options: &SearchOptions) -> Result<Regex, SearchError> {
    let source = translate_pattern(options);
    if source.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let mut builder = RegexBuilder::new(&source);
    builder.case_insensitive(!options.case_sensitive);
    builder.multi_line(true);
    builder.dot_matches_new_line(matches!(options.mode, SearchMode::RegexMultiline));
    builder.build().map_err(|err| {
        log::debug!("rejecting pattern {:?}: {err}", options.pattern);
        SearchError::InvalidPattern(err.to_string())
    })
}

fn translate_pattern(options: &SearchOptions) -> String {
    match options.mode {
        SearchMode::Normal => regex::escape(&options.pattern),
        SearchMode::Escaped => regex::escape(&convert_extended(&options.pattern)),
        SearchMode::Regex | SearchMode::RegexMultiline => options.pattern.clone(),
    }
}

#[derive(Clone)]
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { text, starts }
    }

    fn line_and_column(&self, index: usize) -> (usize, usize) {
        let pos = match self.starts.binary_search(&index) {
            Ok(line_zero) => line_zero,
            Err(insert) => insert.saturating_sub(1),
        };
        let line_start = self.starts.get(pos).copied().unwrap_or(0);
        let column = self.text[line_start..index]
            .chars()
            .count()
            .saturating_add(1);
        (pos + 1, column)
    }

    fn line_text(&self, line: usize) -> &'a str {
        let zero_based = line.saturating_sub(1);
        let Some(&start) = self.starts.get(zero_based) else {
            return "";
        };
        let end = self
            .starts
            .get(zero_based + 1)
            .copied()
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }
}
