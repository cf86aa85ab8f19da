//! Append-only heap of term cells.
//!
//! Role
//! - Hand out contiguous runs of fresh cells through a bump pointer. Cells are never
//!   freed, moved or reused while a program is being built.
//! - Store and load packed [`Term`] words at absolute addresses.
//!
//! The [`Memory`] trait is the whole contract the graph builder relies on; [`Heap`] is
//! the default implementation and [`global`] exposes a process-wide instance.
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};

use crate::{
    config::HeapConfig,
    error::{ConfigError, HeapError},
    term::{Loc, Term},
};

/// Storage for term cells.
pub trait Memory {
    /// Reserve `n` contiguous fresh cells and return the address of the first one.
    /// Addresses are monotonically increasing and never reused.
    fn alloc(&mut self, n: u64) -> Result<Loc, HeapError>;

    /// Store `term` at `loc`. `loc` must have been handed out by [`Memory::alloc`].
    fn set(&mut self, loc: Loc, term: Term);

    /// Load the word stored at `loc`.
    fn got(&self, loc: Loc) -> Term;

    /// Number of cells handed out so far.
    fn size(&self) -> u64;
}

/// A `Vec`-backed bump allocator with a fixed capacity.
#[derive(Debug, Clone)]
pub struct Heap {
    cells: Vec<Term>,
    capacity: u64,
}

impl Heap {
    /// Create a heap with the default capacity.
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            capacity: HeapConfig::DEFAULT_CAPACITY,
        }
    }

    /// Create a heap holding at most `capacity` cells.
    pub fn with_capacity(capacity: u64) -> Result<Self, HeapError> {
        // Addresses must fit in the 32-bit payload, hence the inclusive bound.
        let max = Term::MAX_LOC + 1;
        if capacity > max {
            return Err(HeapError::CapacityTooLarge { capacity, max });
        }
        Ok(Self {
            cells: Vec::new(),
            capacity,
        })
    }

    pub fn with_config(config: &HeapConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_capacity(config.capacity)?)
    }

    /// Configured capacity in cells.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Drop every cell, so that the next allocation starts again at address 0.
    pub fn reset(&mut self) {
        debug!("Resetting heap ({} cells in use)", self.cells.len());
        self.cells.clear();
    }

    /// Whether no cell has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The allocated cells, in address order.
    pub fn cells(&self) -> &[Term] {
        &self.cells
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for Heap {
    fn alloc(&mut self, n: u64) -> Result<Loc, HeapError> {
        let used = self.cells.len() as u64;
        match used.checked_add(n) {
            Some(end) if end <= self.capacity => {
                self.cells.resize(end as usize, Term::VOID);
                Ok(used)
            }
            _ => Err(HeapError::OutOfMemory {
                requested: n,
                used,
                capacity: self.capacity,
            }),
        }
    }

    #[inline]
    fn set(&mut self, loc: Loc, term: Term) {
        self.cells[loc as usize] = term;
    }

    #[inline]
    fn got(&self, loc: Loc) -> Term {
        self.cells[loc as usize]
    }

    #[inline]
    fn size(&self) -> u64 {
        self.cells.len() as u64
    }
}

static GLOBAL_HEAP: Lazy<Mutex<Heap>> = Lazy::new(|| Mutex::new(Heap::new()));

/// Lock the process-wide heap.
///
/// Graph construction is single-threaded; the lock only guards against two builders
/// running at once. Hold the guard for the whole build of one program unit.
pub fn global() -> MutexGuard<'static, Heap> {
    GLOBAL_HEAP.lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Tag;

    #[test]
    fn allocation_is_a_bump_pointer() {
        let mut heap = Heap::with_capacity(16).unwrap();
        assert_eq!(heap.alloc(2).unwrap(), 0);
        assert_eq!(heap.alloc(3).unwrap(), 2);
        assert_eq!(heap.alloc(0).unwrap(), 5);
        assert_eq!(heap.alloc(1).unwrap(), 5);
        assert_eq!(heap.size(), 6);
    }

    #[test]
    fn fresh_cells_read_as_void() {
        let mut heap = Heap::new();
        let loc = heap.alloc(4).unwrap();
        assert!(heap.cells().iter().all(|t| *t == Term::VOID));
        heap.set(loc + 2, Term::ERA);
        assert_eq!(heap.got(loc + 2).tag(), Some(Tag::Era));
        assert_eq!(heap.got(loc + 3), Term::VOID);
    }

    #[test]
    fn exhaustion_allocates_nothing() {
        let mut heap = Heap::with_capacity(4).unwrap();
        heap.alloc(3).unwrap();
        let err = heap.alloc(2).unwrap_err();
        assert_eq!(
            err,
            HeapError::OutOfMemory {
                requested: 2,
                used: 3,
                capacity: 4
            }
        );
        assert_eq!(heap.size(), 3);
        assert_eq!(heap.alloc(1).unwrap(), 3);
    }

    #[test]
    fn capacity_is_bounded_by_the_payload_width() {
        assert!(Heap::with_capacity(Term::MAX_LOC + 1).is_ok());
        assert!(matches!(
            Heap::with_capacity(Term::MAX_LOC + 2),
            Err(HeapError::CapacityTooLarge { .. })
        ));
    }

    #[test]
    fn reset_restarts_at_zero() {
        let mut heap = Heap::new();
        heap.alloc(10).unwrap();
        heap.reset();
        assert!(heap.is_empty());
        assert_eq!(heap.alloc(1).unwrap(), 0);
    }
}
