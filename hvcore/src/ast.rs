//! Source tree produced by the parser and consumed by the injector.
//!
//! Variables are plain strings and are never renamed. A name is visible to every node
//! injected after (or, for forward references, before) its binder within the same unit.
use hvterm::term::Oper;

/// Constructor id given to the wildcard arm of a match. Greater than any declared id,
/// so the wildcard always sorts last.
pub const WILDCARD_CTR: u32 = 0xFFF_FFFF;

/// Name carried by the sentinel reference that replaces an unparsable expression.
pub const FAILURE_REF: &str = "⊥";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Core {
    /// `*`
    Era,
    /// `λx body`
    Lam { var: String, body: Box<Core> },
    /// `(f x)`
    App { func: Box<Core>, arg: Box<Core> },
    /// `&L{a b}`
    Sup {
        lab: u32,
        left: Box<Core>,
        right: Box<Core>,
    },
    /// `!&L{x y} = value body`
    Dup {
        lab: u32,
        dp0: String,
        dp1: String,
        value: Box<Core>,
        body: Box<Core>,
    },
    /// `@name`. `fid` stays `None` until the book assigns ids.
    Ref { name: String, fid: Option<u32> },
    /// Occurrence of a bound variable.
    Var(String),
    /// `#Name{fields...}`
    Ctr { cid: u32, fields: Vec<Core> },
    /// `~scrutinee{#A: case ...}`. Arms are kept sorted by constructor id.
    Mat {
        scrutinee: Box<Core>,
        arms: Vec<(u32, Core)>,
    },
    /// `(op a b)`
    Op2 {
        op: Oper,
        lhs: Box<Core>,
        rhs: Box<Core>,
    },
    /// Inline 32-bit integer literal.
    U32(u32),
}

impl Core {
    pub fn lam(var: impl Into<String>, body: Core) -> Self {
        Core::Lam {
            var: var.into(),
            body: Box::new(body),
        }
    }

    pub fn app(func: Core, arg: Core) -> Self {
        Core::App {
            func: Box::new(func),
            arg: Box::new(arg),
        }
    }

    pub fn sup(lab: u32, left: Core, right: Core) -> Self {
        Core::Sup {
            lab,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn dup(
        lab: u32,
        dp0: impl Into<String>,
        dp1: impl Into<String>,
        value: Core,
        body: Core,
    ) -> Self {
        Core::Dup {
            lab,
            dp0: dp0.into(),
            dp1: dp1.into(),
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Core::Var(name.into())
    }

    /// Unresolved reference to a top-level definition.
    pub fn reference(name: impl Into<String>) -> Self {
        Core::Ref {
            name: name.into(),
            fid: None,
        }
    }

    pub fn op2(op: Oper, lhs: Core, rhs: Core) -> Self {
        Core::Op2 {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Build a match, ordering the arms by constructor id. The sort is stable, so arms
    /// sharing an id keep their source order.
    pub fn mat(scrutinee: Core, mut arms: Vec<(u32, Core)>) -> Self {
        arms.sort_by_key(|(cid, _)| *cid);
        Core::Mat {
            scrutinee: Box::new(scrutinee),
            arms,
        }
    }

    /// The sentinel substituted for an expression that failed to parse.
    pub fn failure() -> Self {
        Core::reference(FAILURE_REF)
    }

    /// Whether this is the [failure sentinel](Core::failure).
    pub fn is_failure(&self) -> bool {
        matches!(self, Core::Ref { name, fid: None } if name == FAILURE_REF)
    }

    /// Visit every reference node, depth first, allowing its id to be rewritten.
    pub fn for_each_ref_mut<E>(
        &mut self,
        f: &mut impl FnMut(&str, &mut Option<u32>) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Core::Era | Core::Var(_) | Core::U32(_) => Ok(()),
            Core::Ref { name, fid } => f(name, fid),
            Core::Lam { body, .. } => body.for_each_ref_mut(f),
            Core::App { func: a, arg: b }
            | Core::Sup {
                left: a, right: b, ..
            }
            | Core::Dup {
                value: a, body: b, ..
            }
            | Core::Op2 { lhs: a, rhs: b, .. } => {
                a.for_each_ref_mut(f)?;
                b.for_each_ref_mut(f)
            }
            Core::Ctr { fields, .. } => fields.iter_mut().try_for_each(|c| c.for_each_ref_mut(f)),
            Core::Mat { scrutinee, arms } => {
                scrutinee.for_each_ref_mut(f)?;
                arms.iter_mut()
                    .try_for_each(|(_, case)| case.for_each_ref_mut(f))
            }
        }
    }
}
