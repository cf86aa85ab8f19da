//! Packed term words.
//!
//! A term is a single 64-bit word. The same width is used for heap addresses, so an
//! address can always be stored where a term is expected and later overwritten.
//!
//! ```text
//!   63                             32 31                      8 7        0
//!  +---------------------------------+-------------------------+----------+
//!  |            payload (32)         |        label (24)       | tag (8)  |
//!  +---------------------------------+-------------------------+----------+
//! ```
//!
//! The payload is either a heap address, a function id, or (for [`Tag::W32`]) the
//! numeric value itself. The label is only meaningful for a handful of tags:
//!
//! | Tag         | Label              | Payload                         |
//! |-------------|--------------------|---------------------------------|
//! | `DP0`/`DP1` | duplication label  | duplication node (3 cells)      |
//! | `VAR`       | -                  | lambda node (2 cells)           |
//! | `SUB`       | -                  | -                               |
//! | `REF`       | -                  | function id                     |
//! | `ERA`       | -                  | -                               |
//! | `LAM`       | -                  | lambda node (2 cells)           |
//! | `APP`       | -                  | application node (2 cells)      |
//! | `SUP`       | superposition label| superposition node (2 cells)    |
//! | `CTR`       | constructor id     | field block (arity cells)       |
//! | `MAT`       | number of arms     | match node (1 + 2 * arms cells) |
//! | `OPX`       | operator code      | operand pair (2 cells)          |
//! | `W32`       | -                  | 32-bit value                    |
use std::fmt;

use strum::{Display, EnumIter, FromRepr};

/// A heap address. Shares its width with [`Term`].
pub type Loc = u64;

/// A 24-bit label carried by duplication, superposition, constructor, match and
/// operator terms.
pub type Lab = u32;

/// Node kind stored in the low byte of a [`Term`].
///
/// The byte `0x00` is reserved: a cell that was allocated but never written reads
/// back as [`Term::VOID`] and decodes to no tag at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, FromRepr, Display)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Tag {
    /// First projection of a duplication.
    Dp0 = 0x01,
    /// Second projection of a duplication.
    Dp1 = 0x02,
    /// Variable bound by a lambda.
    Var = 0x03,
    /// Substitution placeholder held by a binder slot.
    Sub = 0x04,
    /// Reference to a top-level definition.
    Ref = 0x05,
    /// Erasure.
    Era = 0x06,
    /// Lambda.
    Lam = 0x07,
    /// Application.
    App = 0x08,
    /// Superposition.
    Sup = 0x09,
    /// Data constructor.
    Ctr = 0x0A,
    /// Pattern match.
    Mat = 0x0B,
    /// Binary operator application.
    Opx = 0x0C,
    /// Inline 32-bit integer.
    W32 = 0x0D,
}

/// Binary operators understood by `OPX` nodes. The discriminant is the operator
/// code stored in the label field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, FromRepr, Display)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Oper {
    Add = 0x00,
    Sub = 0x01,
    Mul = 0x02,
    Div = 0x03,
    Mod = 0x04,
    Eq = 0x05,
    Ne = 0x06,
    And = 0x07,
    Or = 0x08,
    Xor = 0x09,
    Lsh = 0x0A,
    Rsh = 0x0B,
    Lt = 0x0C,
    Lte = 0x0D,
    Gt = 0x0E,
    Gte = 0x0F,
}

impl Oper {
    /// Surface syntax of the operator, as written after an opening parenthesis.
    pub fn symbol(self) -> &'static str {
        match self {
            Oper::Add => "+",
            Oper::Sub => "-",
            Oper::Mul => "*",
            Oper::Div => "/",
            Oper::Mod => "%",
            Oper::Eq => "==",
            Oper::Ne => "!=",
            Oper::And => "&",
            Oper::Or => "|",
            Oper::Xor => "^",
            Oper::Lsh => "<<",
            Oper::Rsh => ">>",
            Oper::Lt => "<",
            Oper::Lte => "<=",
            Oper::Gt => ">",
            Oper::Gte => ">=",
        }
    }
}

/// A packed term word. See the [module documentation](self) for the layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Term(u64);

impl Term {
    const TAG_BITS: u32 = 8;
    const LAB_BITS: u32 = 24;
    const LOC_SHIFT: u32 = Self::TAG_BITS + Self::LAB_BITS;

    const TAG_MASK: u64 = (1 << Self::TAG_BITS) - 1;
    const LAB_MASK: u64 = (1 << Self::LAB_BITS) - 1;

    /// Largest label that fits in a term.
    pub const MAX_LAB: Lab = Self::LAB_MASK as Lab;

    /// Largest address or payload that fits in a term.
    pub const MAX_LOC: Loc = u32::MAX as Loc;

    /// Content of an allocated cell that has not been written yet.
    pub const VOID: Term = Term(0);

    /// Erasure term.
    pub const ERA: Term = Term(Tag::Era as u64);

    /// Substitution placeholder.
    pub const SUB: Term = Term(Tag::Sub as u64);

    /// Pack a term. `lab` is truncated to 24 bits and `loc` to 32 bits; callers that
    /// cannot guarantee the ranges should check with [`Term::fits_label`] first.
    #[inline]
    pub const fn new(tag: Tag, lab: Lab, loc: Loc) -> Self {
        debug_assert!(lab <= Self::MAX_LAB);
        debug_assert!(loc <= Self::MAX_LOC);
        Term(
            (tag as u64)
                | (((lab as u64) & Self::LAB_MASK) << Self::TAG_BITS)
                | ((loc & Self::MAX_LOC) << Self::LOC_SHIFT),
        )
    }

    /// Reinterpret a raw word as a term.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Term(raw)
    }

    /// Reinterpret a heap address as a (not yet meaningful) term word.
    #[inline]
    pub const fn from_loc(loc: Loc) -> Self {
        Term(loc)
    }

    /// The raw 64-bit word.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Decode the tag byte. Returns `None` for [`Term::VOID`] and any other byte that
    /// does not name a [`Tag`].
    #[inline]
    pub fn tag(self) -> Option<Tag> {
        Tag::from_repr((self.0 & Self::TAG_MASK) as u8)
    }

    /// The 24-bit label.
    #[inline]
    pub const fn lab(self) -> Lab {
        ((self.0 >> Self::TAG_BITS) & Self::LAB_MASK) as Lab
    }

    /// The 32-bit payload, read as an address.
    #[inline]
    pub const fn loc(self) -> Loc {
        self.0 >> Self::LOC_SHIFT
    }

    /// Operator code of an `OPX` term.
    #[inline]
    pub fn oper(self) -> Option<Oper> {
        u8::try_from(self.lab()).ok().and_then(Oper::from_repr)
    }

    /// Whether `value` can be stored in the label field.
    #[inline]
    pub const fn fits_label(value: u64) -> bool {
        value <= Self::MAX_LAB as u64
    }

    /// Copy of this term pointing at another location.
    #[inline]
    pub fn with_loc(self, loc: Loc) -> Self {
        Term((self.0 & ((1 << Self::LOC_SHIFT) - 1)) | ((loc & Self::MAX_LOC) << Self::LOC_SHIFT))
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Term({self})")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "{tag}:{:#x}:{:#x}", self.lab(), self.loc()),
            None if *self == Term::VOID => write!(f, "VOID"),
            None => write!(f, "RAW:{:#018x}", self.0),
        }
    }
}
