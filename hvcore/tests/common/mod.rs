#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use hvcore::prelude::*;

/// Rebuilds a textual shape from the cells reachable from a root term.
///
/// Binders are named `x0`, `x1`, ... in the order they are first met, and the two
/// projections of a duplication stored at `x1` read `x1.0` and `x1.1`. Duplications
/// are listed after the main term as `!&L{x1.0 x1.1} = value`.
pub struct Readback<'h> {
    heap: &'h Heap,
    names: HashMap<Loc, String>,
    seen: HashSet<Loc>,
    dups: Vec<(Loc, Lab)>,
    arities: HashMap<Lab, Loc>,
}

impl<'h> Readback<'h> {
    pub fn new(heap: &'h Heap) -> Self {
        Self {
            heap,
            names: HashMap::new(),
            seen: HashSet::new(),
            dups: Vec::new(),
            arities: HashMap::new(),
        }
    }

    /// Constructor terms do not record their arity; declare it for `cid`. Undeclared
    /// constructors read as having no fields.
    pub fn arity(mut self, cid: Lab, arity: Loc) -> Self {
        self.arities.insert(cid, arity);
        self
    }

    fn name(&mut self, loc: Loc) -> String {
        let next = self.names.len();
        self.names
            .entry(loc)
            .or_insert_with(|| format!("x{next}"))
            .clone()
    }

    fn projection(&mut self, term: Term, side: u8) -> String {
        if self.seen.insert(term.loc()) {
            self.dups.push((term.loc(), term.lab()));
        }
        format!("{}.{side}", self.name(term.loc()))
    }

    pub fn term(&mut self, term: Term) -> String {
        let heap = self.heap;
        let loc = term.loc();
        match term.tag() {
            None => "?".to_string(),
            Some(Tag::Era) => "*".to_string(),
            Some(Tag::Sub) => "_".to_string(),
            Some(Tag::Var) => self.name(loc),
            Some(Tag::Dp0) => self.projection(term, 0),
            Some(Tag::Dp1) => self.projection(term, 1),
            Some(Tag::Ref) => format!("@{loc}"),
            Some(Tag::W32) => format!("{loc}"),
            Some(Tag::Lam) => {
                let var = self.name(loc);
                let body = self.term(heap.got(loc + 1));
                format!("λ{var} {body}")
            }
            Some(Tag::App) => {
                let func = self.term(heap.got(loc));
                let arg = self.term(heap.got(loc + 1));
                format!("({func} {arg})")
            }
            Some(Tag::Sup) => {
                let left = self.term(heap.got(loc));
                let right = self.term(heap.got(loc + 1));
                format!("&{}{{{left} {right}}}", term.lab())
            }
            Some(Tag::Opx) => {
                let lhs = self.term(heap.got(loc));
                let rhs = self.term(heap.got(loc + 1));
                let op = term.oper().map_or("?", |op| op.symbol());
                format!("({op} {lhs} {rhs})")
            }
            Some(Tag::Ctr) => {
                let arity = self.arities.get(&term.lab()).copied().unwrap_or(0);
                let fields: Vec<String> = (0..arity)
                    .map(|i| self.term(heap.got(loc + i)))
                    .collect();
                format!("#{}{{{}}}", term.lab(), fields.join(" "))
            }
            Some(Tag::Mat) => {
                let scrutinee = self.term(heap.got(loc));
                let arms: Vec<String> = (0..term.lab() as Loc)
                    .map(|i| {
                        let cid = heap.got(loc + 1 + 2 * i).loc();
                        let case = self.term(heap.got(loc + 2 + 2 * i));
                        format!("#{cid}: {case}")
                    })
                    .collect();
                format!("~{scrutinee}{{{}}}", arms.join(" "))
            }
        }
    }

    /// Render `root`, followed by every duplication reached from it.
    pub fn show(mut self, root: Term) -> String {
        let mut out = self.term(root);
        let mut i = 0;
        while i < self.dups.len() {
            let (dup, lab) = self.dups[i];
            let name = self.name(dup);
            let value = self.term(self.heap.got(dup + 2));
            out.push_str(&format!(" !&{lab}{{{name}.0 {name}.1}} = {value}"));
            i += 1;
        }
        out
    }
}

pub fn show(heap: &Heap, root: Term) -> String {
    Readback::new(heap).show(root)
}

/// Parse `src` as a standalone expression and inject it into a fresh heap.
pub fn inject_src(src: &str) -> (Heap, Term) {
    let core = parse_core(src).expect("source should parse");
    let mut heap = Heap::new();
    let root = inject_root(&mut heap, &core).expect("injection should succeed");
    (heap, root)
}
