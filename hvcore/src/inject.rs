//! Lowering of [`Core`] trees into heap cells.
//!
//! Node layouts, relative to the cells allocated for the node:
//!
//! | Node | Cells | Contents                               | Term written at host      |
//! |------|-------|----------------------------------------|---------------------------|
//! | Lam  | 2     | `[binder slot, body]`                  | `LAM(0, loc)`             |
//! | App  | 2     | `[func, arg]`                          | `APP(0, loc)`             |
//! | Sup  | 2     | `[left, right]`                        | `SUP(lab, loc)`           |
//! | Dup  | 3     | `[dp0 slot, dp1 slot, value]`          | the body, spliced in      |
//! | Ctr  | n     | `[field...]`                           | `CTR(cid, loc)`           |
//! | Mat  | 1+2n  | `[scrutinee, (W32(cid), case)...]`     | `MAT(n, loc)`             |
//! | Op2  | 2     | `[lhs, rhs]`                           | `OPX(op, loc)`            |
//!
//! `Era`, `Ref`, `U32` and nullary `Ctr` (loc 0) allocate nothing. Binder slots start as `SUB`.
//!
//! Variables are resolved in the same single pass: a use seen before its binder is
//! parked as pending and patched when the binder shows up.
use std::collections::HashMap;

use hvterm::{
    heap::Memory,
    term::{Loc, Tag, Term},
};
use log::trace;
use smallvec::{SmallVec, smallvec};

use crate::{ast::Core, error::InjectError};

/// Cell holding the root of a standalone expression.
pub const ROOT: Loc = 0;

/// What the scope knows about a name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    /// Uses seen before any binder; their cells are still unwritten.
    Pending(SmallVec<[Loc; 2]>),
    /// The term every further use is a copy of.
    Bound(Term),
}

/// Single-use injection context for one unit.
///
/// The scope is keyed by the exact variable name. A binder overwrites whatever the
/// name held before, so an inner binder that reuses a name captures the uses of the
/// outer one that come after it.
pub struct Injector<'h, M: Memory + ?Sized> {
    heap: &'h mut M,
    scope: HashMap<String, Binding>,
}

impl<'h, M: Memory + ?Sized> Injector<'h, M> {
    pub fn new(heap: &'h mut M) -> Self {
        Self {
            heap,
            scope: HashMap::new(),
        }
    }

    /// Write the encoding of `core` into `host`, allocating cells for its children.
    pub fn inject(&mut self, core: &Core, host: Loc) -> Result<(), InjectError> {
        match core {
            Core::Era => self.heap.set(host, Term::ERA),

            Core::Lam { var, body } => {
                let lam = self.heap.alloc(2)?;
                self.bind(var, lam, Term::new(Tag::Var, 0, lam));
                self.inject(body, lam + 1)?;
                self.heap.set(host, Term::new(Tag::Lam, 0, lam));
            }

            Core::App { func, arg } => {
                let app = self.heap.alloc(2)?;
                self.inject(func, app)?;
                self.inject(arg, app + 1)?;
                self.heap.set(host, Term::new(Tag::App, 0, app));
            }

            Core::Sup { lab, left, right } => {
                let lab = label(Tag::Sup, *lab as u64)?;
                let sup = self.heap.alloc(2)?;
                self.inject(left, sup)?;
                self.inject(right, sup + 1)?;
                self.heap.set(host, Term::new(Tag::Sup, lab, sup));
            }

            Core::Dup {
                lab,
                dp0,
                dp1,
                value,
                body,
            } => {
                let lab = label(Tag::Dp0, *lab as u64)?;
                let dup = self.heap.alloc(3)?;
                self.bind(dp0, dup, Term::new(Tag::Dp0, lab, dup));
                self.bind(dp1, dup + 1, Term::new(Tag::Dp1, lab, dup));
                self.inject(value, dup + 2)?;
                self.inject(body, host)?;
            }

            Core::Ref { name, fid } => {
                let fid = fid.ok_or_else(|| InjectError::UnresolvedReference { name: name.clone() })?;
                self.heap.set(host, Term::new(Tag::Ref, 0, fid as Loc));
            }

            Core::Var(name) => self.occur(name, host),

            Core::Ctr { cid, fields } => {
                let cid = label(Tag::Ctr, *cid as u64)?;
                // Nullary constructors own no cells; their payload is left at 0.
                let ctr = match fields.len() {
                    0 => 0,
                    arity => self.heap.alloc(arity as u64)?,
                };
                for (i, field) in fields.iter().enumerate() {
                    self.inject(field, ctr + i as Loc)?;
                }
                self.heap.set(host, Term::new(Tag::Ctr, cid, ctr));
            }

            Core::Mat { scrutinee, arms } => {
                let len = label(Tag::Mat, arms.len() as u64)?;
                let mat = self.heap.alloc(1 + 2 * arms.len() as u64)?;
                self.inject(scrutinee, mat)?;
                for (i, (cid, case)) in arms.iter().enumerate() {
                    let arm = mat + 1 + 2 * i as Loc;
                    self.heap.set(arm, Term::new(Tag::W32, 0, *cid as Loc));
                    self.inject(case, arm + 1)?;
                }
                self.heap.set(host, Term::new(Tag::Mat, len, mat));
            }

            Core::Op2 { op, lhs, rhs } => {
                let opx = self.heap.alloc(2)?;
                self.inject(lhs, opx)?;
                self.inject(rhs, opx + 1)?;
                self.heap.set(host, Term::new(Tag::Opx, *op as u32, opx));
            }

            Core::U32(value) => self.heap.set(host, Term::new(Tag::W32, 0, *value as Loc)),
        }
        Ok(())
    }

    /// Introduce a binder whose storage is `slot` and whose uses read `term`.
    fn bind(&mut self, name: &str, slot: Loc, term: Term) {
        self.heap.set(slot, Term::SUB);
        if let Some(Binding::Pending(uses)) = self.scope.insert(name.to_string(), Binding::Bound(term)) {
            for site in uses {
                self.heap.set(site, term);
            }
        }
    }

    /// Resolve a use of `name` at `host`, or park it until the binder appears.
    fn occur(&mut self, name: &str, host: Loc) {
        match self.scope.get_mut(name) {
            Some(Binding::Bound(term)) => self.heap.set(host, *term),
            Some(Binding::Pending(uses)) => uses.push(host),
            None => {
                self.scope
                    .insert(name.to_string(), Binding::Pending(smallvec![host]));
            }
        }
    }

    /// Close the unit. Fails if some use never met its binder.
    pub fn finish(self) -> Result<(), InjectError> {
        let unbound = self
            .scope
            .into_iter()
            .filter(|(_, binding)| matches!(binding, Binding::Pending(_)))
            .map(|(name, _)| name)
            .min();
        match unbound {
            Some(name) => Err(InjectError::UnboundVariable { name }),
            None => Ok(()),
        }
    }
}

fn label(tag: Tag, value: u64) -> Result<u32, InjectError> {
    if Term::fits_label(value) {
        Ok(value as u32)
    } else {
        Err(InjectError::LabelOverflow { tag, value })
    }
}

/// Inject `core` into the already allocated cell `host` with a fresh scope, and return
/// the term left there.
pub fn inject_at<M: Memory + ?Sized>(heap: &mut M, core: &Core, host: Loc) -> Result<Term, InjectError> {
    let mut injector = Injector::new(heap);
    injector.inject(core, host)?;
    injector.finish()?;
    let root = heap.got(host);
    trace!("Injected unit at {host:#x}: {root}, heap size {}", heap.size());
    Ok(root)
}

/// Inject a standalone expression at [`ROOT`], allocating it on an empty heap.
///
/// ```
/// use hvcore::{ast::Core, inject::inject_root};
/// use hvterm::prelude::*;
///
/// let mut heap = Heap::new();
/// let root = inject_root(&mut heap, &Core::lam("x", Core::var("x"))).unwrap();
/// assert_eq!(root.tag(), Some(Tag::Lam));
/// assert_eq!(heap.got(root.loc() + 1), Term::new(Tag::Var, 0, root.loc()));
/// ```
pub fn inject_root<M: Memory + ?Sized>(heap: &mut M, core: &Core) -> Result<Term, InjectError> {
    if heap.size() == 0 {
        heap.alloc(1)?;
    }
    inject_at(heap, core, ROOT)
}
