use std::ops::Range;

use hvterm::{error::HeapError, term::Tag};
use thiserror::Error;

/// A syntax error, with everything needed to show it to a user.
///
/// Produced by the parser entry points; the first failure aborts the unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// Byte range of the offending input.
    pub span: Range<usize>,
    /// 1-based line of the failure point.
    pub line: usize,
    /// 1-based column of the failure point, counted in characters.
    pub column: usize,
    pub message: String,
    /// What the grammar would have accepted at the failure point. Whitespace and
    /// comments are never listed.
    pub expected: Vec<String>,
    /// The offending character, or `None` at end of input.
    pub found: Option<String>,
    /// The offending source line with the span highlighted.
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// A reference names a definition that does not exist.
    #[error("Definition `@{definition}` refers to `@{name}`, which is not defined in the book.")]
    UndefinedReference { name: String, definition: String },

    /// Two definitions share a name.
    #[error("`@{name}` is defined more than once.")]
    DuplicateDefinition { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
    #[error(transparent)]
    Heap(#[from] HeapError),

    /// A label, constructor id or arm count does not fit in the 24-bit label field.
    #[error("Value {value} does not fit in the label field of a {tag} term.")]
    LabelOverflow { tag: Tag, value: u64 },

    /// A variable was used but no binder with that name appeared in the unit.
    #[error("Variable `{name}` is used but never bound.")]
    UnboundVariable { name: String },

    /// A reference reached the injector before the book assigned it an id.
    #[error("Reference `@{name}` has no function id; assemble it into a book first.")]
    UnresolvedReference { name: String },

    #[error("No definition has id {fid}.")]
    UnknownDefinition { fid: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("parse error at {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Book(#[from] BookError),

    #[error(transparent)]
    Inject(#[from] InjectError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
