//! Heap/term substrate of the interaction-graph runtime.
//!
//! - [`term`]: the packed 64-bit term word and its tags.
//! - [`heap`]: the append-only cell heap and the [`Memory`](heap::Memory) contract.
//! - [`config`]: heap settings, loadable from TOML.
//!
//! ```
//! use hvterm::prelude::*;
//!
//! let mut heap = Heap::new();
//! let lam = heap.alloc(2).unwrap();
//! heap.set(lam, Term::SUB);
//! heap.set(lam + 1, Term::ERA);
//! let root = Term::new(Tag::Lam, 0, lam);
//! assert_eq!(heap.got(root.loc() + 1).tag(), Some(Tag::Era));
//! ```

pub mod config;
pub mod error;
pub mod heap;
pub mod term;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::config::HeapConfig;
    pub use crate::error::{ConfigError, HeapError};
    pub use crate::heap::{Heap, Memory, global};
    pub use crate::term::{Lab, Loc, Oper, Tag, Term};
}
