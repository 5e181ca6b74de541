//! Line classification shared by every analyzer.
//!
//! Normalizes raw source text into a sequence of logical lines tagged as
//! code, comment, or blank. COBOL marks comments with `*` at the start of
//! a line; fixed-column sources additionally use `*` in the indicator
//! column (column 7, index 6).

use crate::core::{LineKind, SourceLine};

/// Classify every line of `content`. Empty input yields an empty
/// sequence; there are no error conditions.
pub fn classify_lines(content: &str, fixed_column: bool) -> Vec<SourceLine> {
    content
        .lines()
        .enumerate()
        .map(|(idx, text)| SourceLine {
            number: idx + 1,
            text: text.to_string(),
            kind: classify(text, fixed_column),
        })
        .collect()
}

fn classify(text: &str, fixed_column: bool) -> LineKind {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('*') {
        return LineKind::Comment;
    }
    if fixed_column && text.as_bytes().get(6) == Some(&b'*') {
        return LineKind::Comment;
    }
    LineKind::Code
}

/// Count of lines that are neither comment nor blank.
pub fn line_count(lines: &[SourceLine]) -> usize {
    lines.iter().filter(|l| l.is_code()).count()
}
