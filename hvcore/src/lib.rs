//! Front end of the interaction-graph runtime: text in, heap graph out.
//!
//! Pipeline
//!  - [`parser`] turns source text into [`Core`](ast::Core) trees and book sources.
//!  - [`book`] numbers top-level definitions and links references between them.
//!  - [`inject`] lowers a tree into cells of a [`Memory`](hvterm::heap::Memory) in one pass.
//!
//! Example
//! ```
//! use hvcore::prelude::*;
//!
//! let book = Book::parse("data Bool { #T{} #F{} }\n@not = λb ~b{#T: #F{} #F: #T{}}").unwrap();
//! let mut heap = Heap::new();
//! let roots = book.inject_all(&mut heap).unwrap();
//! assert_eq!(roots[0].tag(), Some(Tag::Lam));
//! ```

/// Source tree.
pub mod ast;
/// Top-level definitions and constructor aliases.
pub mod book;
mod diagnostic;
/// Error types of every stage.
pub mod error;
/// Single-pass lowering into the heap.
pub mod inject;
/// Surface syntax.
pub mod parser;

pub use diagnostic::line_col;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::ast::{Core, WILDCARD_CTR};
    pub use crate::book::{Book, CtorTable};
    pub use crate::error::{BookError, Error, InjectError, ParseError, Result};
    pub use crate::inject::{Injector, ROOT, inject_at, inject_root};
    pub use crate::parser::{parse_book, parse_core, parse_core_or_failure, parse_core_with};
    pub use hvterm::prelude::*;
}
