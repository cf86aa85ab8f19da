//! Turn chumsky errors into [`ParseError`] reports.
//!
//! The excerpt is rendered by ariadne without colour so the report is plain text that
//! can be logged, compared in tests, or printed as is.
use std::ops::Range;

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use chumsky::error::{Rich, RichReason};
use log::warn;

use crate::error::ParseError;

const SOURCE_ID: &str = "<input>";

/// Labels that describe skippable input; they are never worth listing as expected.
const HIDDEN_LABELS: [&str; 2] = ["whitespace", "comment"];

impl ParseError {
    /// Build a report from the errors of a failed parse. Only the first error is kept:
    /// a unit stops at its first failure.
    pub(crate) fn from_rich(src: &str, errors: Vec<Rich<'_, char>>) -> Self {
        match errors.into_iter().next() {
            Some(error) => Self::from_error(src, &error),
            None => Self::new(src, src.len()..src.len(), "parse failed".into(), Vec::new(), None),
        }
    }

    fn from_error(src: &str, error: &Rich<'_, char>) -> Self {
        let span = error.span().start..error.span().end;

        let mut expected: Vec<String> = error
            .expected()
            .map(|pattern| pattern.to_string())
            .filter(|pattern| !HIDDEN_LABELS.contains(&pattern.as_str()))
            .collect();
        expected.sort();
        expected.dedup();

        // Custom errors carry no token; quote the rejected text instead.
        let found = match error.reason() {
            RichReason::Custom(_) => src.get(span.clone()).filter(|text| !text.is_empty()),
            _ => None,
        }
        .map(str::to_string)
        .or_else(|| error.found().map(|c| c.to_string()))
        .or_else(|| char_at(src, span.start).map(String::from));

        let message = match error.reason() {
            RichReason::Custom(msg) => msg.to_string(),
            _ => match &found {
                Some(c) => format!("unexpected {c:?}"),
                None => "unexpected end of input".to_string(),
            },
        };

        Self::new(src, span, message, expected, found)
    }

    fn new(
        src: &str,
        span: Range<usize>,
        message: String,
        expected: Vec<String>,
        found: Option<String>,
    ) -> Self {
        let (line, column) = line_col(src, span.start);
        let excerpt = render_excerpt(src, span.clone(), &message, &expected);
        Self {
            span,
            line,
            column,
            message,
            expected,
            found,
            excerpt,
        }
    }
}

/// 1-based line and column of a byte offset. Columns count characters, not bytes.
pub fn line_col(src: &str, offset: usize) -> (usize, usize) {
    let before = src.get(..offset).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count())
        + 1;
    (line, column)
}

/// Character starting at byte `offset`, or `None` at (or past) the end of `src`.
fn char_at(src: &str, offset: usize) -> Option<char> {
    src.get(offset..).and_then(|rest| rest.chars().next())
}

fn render_excerpt(src: &str, span: Range<usize>, message: &str, expected: &[String]) -> String {
    let note = if expected.is_empty() {
        "unexpected input here".to_string()
    } else {
        format!("expected {}", expected.join(", "))
    };

    let mut out = Vec::new();
    let written = Report::build(ReportKind::Error, (SOURCE_ID, span.clone()))
        .with_config(
            Config::default()
                .with_color(false)
                .with_index_type(IndexType::Byte),
        )
        .with_message(message)
        .with_label(Label::new((SOURCE_ID, span)).with_message(note))
        .finish()
        .write((SOURCE_ID, Source::from(src)), &mut out);

    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(err) => {
            warn!("Failed to render parse error excerpt: {err}");
            String::new()
        }
    }
}
