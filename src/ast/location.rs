use nom_locate::LocatedSpan;

use crate::error::SyntaxError;

pub(crate) type Span<'a> = LocatedSpan<&'a str>;

pub(super) fn new_span(text: &str) -> Span<'_> {
    Span::new(text)
}

/// Width bound for the source excerpt carried by a syntax error.
const SNIPPET_WIDTH: usize = 40;

/// Builds a [`SyntaxError`] for the position where parsing stopped.
///
/// The reported line is counted from the first non-blank line of the input
/// rather than from its very first character, so `"\n\n<< bogus >>"` reports
/// line 1. The snippet is the offending line from the offending column
/// onward, bounded to [`SNIPPET_WIDTH`] characters.
pub(super) fn syntax_error_at(text: &str, at: Span<'_>) -> SyntaxError {
    let absolute_line = at.location_line() as usize;
    let column = at.get_utf8_column();

    let leading_blank = text
        .lines()
        .take(absolute_line.saturating_sub(1))
        .take_while(|line| line.trim().is_empty())
        .count();
    let line = absolute_line.saturating_sub(leading_blank).max(1);

    let line_text = text.lines().nth(absolute_line.saturating_sub(1)).unwrap_or("");
    let mut snippet: String = line_text
        .chars()
        .skip(column.saturating_sub(1))
        .take(SNIPPET_WIDTH)
        .collect();
    if snippet.is_empty() {
        // The position is past the end of the line, e.g. an unterminated
        // brace at end of input. Fall back to the line itself.
        snippet = line_text.trim().chars().take(SNIPPET_WIDTH).collect();
    }

    SyntaxError { line, column, snippet }
}
