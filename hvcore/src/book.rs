//! Top-level definitions and constructor aliases.
//!
//! A [`Book`] numbers definitions by source order and patches every reference with the
//! id of its callee, so a definition may call another one declared further down.
use std::collections::{BTreeMap, btree_map::Entry};

use hvterm::{heap::Memory, term::Term};
use log::{debug, trace, warn};

use crate::{
    ast::Core,
    error::{BookError, InjectError, Result},
    inject::inject_at,
    parser::{BookSource, DataDecl, parse_book},
};

/// Constructor name to id table, filled from `data` blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CtorTable {
    ids: BTreeMap<String, u32>,
    names: BTreeMap<u32, String>,
}

impl CtorTable {
    /// Merge the constructors of a `data` block.
    ///
    /// Each constructor is given the current table size plus its position in the
    /// block. Names already in the table keep their first id; within one block the
    /// last declaration of a name wins.
    pub fn merge(&mut self, data: &DataDecl) {
        let base = self.ids.len() as u32;
        let mut fresh: BTreeMap<&str, u32> = BTreeMap::new();
        for (pos, ctor) in data.ctors.iter().enumerate() {
            fresh.insert(&ctor.name, base + pos as u32);
        }

        for (name, cid) in fresh {
            match self.ids.entry(name.to_string()) {
                Entry::Occupied(prev) => warn!(
                    "Constructor `#{name}` of `{}` is already declared with id {}; keeping it",
                    data.name,
                    prev.get()
                ),
                Entry::Vacant(slot) => {
                    slot.insert(cid);
                    if let Some(prev) = self.names.insert(cid, name.to_string()) {
                        warn!("Constructors `#{prev}` and `#{name}` share id {cid}");
                    }
                }
            }
        }
        debug!(
            "Merged data `{}`: {} constructors known",
            data.name,
            self.ids.len()
        );
    }

    /// Resolve a constructor name: a declared alias, else a decimal id. The empty name
    /// is id 0.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        if let Some(cid) = self.ids.get(name) {
            return Some(*cid);
        }
        if name.is_empty() {
            return Some(0);
        }
        name.parse().ok()
    }

    /// Id of a declared constructor.
    pub fn id(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Name of the constructor holding `cid`.
    pub fn name(&self, cid: u32) -> Option<&str> {
        self.names.get(&cid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Declared constructors in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(cid, name)| (*cid, name.as_str()))
    }
}

/// Assembled set of top-level definitions.
///
/// ```
/// use hvcore::book::Book;
///
/// let book = Book::parse("@f = @g\n@g = *").unwrap();
/// assert_eq!(book.id("g"), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Book {
    defs: Vec<Core>,
    names: Vec<String>,
    ids: BTreeMap<String, u32>,
    ctrs: CtorTable,
}

impl Book {
    /// Number the definitions of `source` by order and link every reference.
    ///
    /// Fails on the first reference to a name that is not defined, and on a name
    /// defined twice.
    pub fn assemble(source: BookSource) -> Result<Self, BookError> {
        let mut ids = BTreeMap::new();
        let mut names = Vec::with_capacity(source.defs.len());
        let mut defs = Vec::with_capacity(source.defs.len());

        for (fid, (name, core)) in source.defs.into_iter().enumerate() {
            match ids.entry(name.clone()) {
                Entry::Occupied(_) => return Err(BookError::DuplicateDefinition { name }),
                Entry::Vacant(slot) => {
                    slot.insert(fid as u32);
                }
            }
            names.push(name);
            defs.push(core);
        }

        for (owner, core) in names.iter().zip(defs.iter_mut()) {
            core.for_each_ref_mut(&mut |name, fid| match ids.get(name) {
                Some(id) => {
                    *fid = Some(*id);
                    Ok(())
                }
                None => Err(BookError::UndefinedReference {
                    name: name.to_string(),
                    definition: owner.clone(),
                }),
            })?;
        }

        debug!(
            "Assembled book: {} definitions, {} constructors",
            defs.len(),
            source.ctrs.len()
        );

        Ok(Self {
            defs,
            names,
            ids,
            ctrs: source.ctrs,
        })
    }

    /// Parse and assemble a book in one go.
    pub fn parse(src: &str) -> Result<Self> {
        Ok(Self::assemble(parse_book(src)?)?)
    }

    /// Tree of definition `fid`.
    pub fn get(&self, fid: u32) -> Option<&Core> {
        self.defs.get(fid as usize)
    }

    /// Name of definition `fid`.
    pub fn name(&self, fid: u32) -> Option<&str> {
        self.names.get(fid as usize).map(String::as_str)
    }

    /// Id of the definition called `name`.
    pub fn id(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    pub fn ctrs(&self) -> &CtorTable {
        &self.ctrs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions as `(id, name, tree)`, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str, &Core)> {
        self.names
            .iter()
            .zip(self.defs.iter())
            .enumerate()
            .map(|(fid, (name, core))| (fid as u32, name.as_str(), core))
    }

    /// Inject definition `fid` into a fresh one-cell host and return its root term.
    /// Every definition is injected with its own, empty variable scope.
    pub fn inject<M: Memory + ?Sized>(&self, fid: u32, heap: &mut M) -> Result<Term, InjectError> {
        let core = self.get(fid).ok_or(InjectError::UnknownDefinition { fid })?;
        let host = heap.alloc(1)?;
        trace!("Injecting @{} at {host:#x}", self.name(fid).unwrap_or_default());
        inject_at(heap, core, host)
    }

    /// Inject every definition, in id order.
    pub fn inject_all<M: Memory + ?Sized>(&self, heap: &mut M) -> Result<Vec<Term>, InjectError> {
        (0..self.len() as u32)
            .map(|fid| self.inject(fid, heap))
            .collect()
    }
}
