//! Parser for the surface language using chumsky.
//!
//! Grammar
//! - Erasure: `*`
//! - Lambda: `λx body`
//! - Application: `(f a b ...)`, left-associative, at least one argument.
//! - Operators: `(+ a b)` for `+ - * / % == != & | ^ << >> < <= > >=`. Operator forms
//!   are tried before plain application, longest symbol first.
//! - Superposition: `&L{a b}` where `L` is a decimal label.
//! - Duplication: `!&L{x y} = value body`
//! - Reference: `@name`
//! - Constructor: `#Name{fields...}`. `Name` resolves through the [`CtorTable`], else
//!   must be a decimal id; the empty name is id 0.
//! - Match: `~scrutinee{#A: case #B: case #_: default}`. `#_` is the wildcard arm.
//! - Anything else made of name characters is a variable, or an inline integer when it
//!   is made of digits only.
//!
//! Books are `data` blocks followed by definitions:
//!
//! ```text
//! data List { #Nil{} #Cons{head tail} }
//! @main = (@len #Cons{1 #Nil{}})
//! ```
//!
//! Whitespace and `//` line comments may appear between any two tokens.
use chumsky::{prelude::*, text::digits};
use log::{debug, error};

use crate::{
    ast::{Core, WILDCARD_CTR},
    book::CtorTable,
    error::ParseError,
};
use hvterm::term::Oper;

type Extra<'src> = extra::Err<Rich<'src, char>>;

/// A `data` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDecl {
    pub name: String,
    pub ctors: Vec<CtorDecl>,
}

/// One constructor of a `data` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorDecl {
    pub name: String,
    pub fields: Vec<String>,
}

/// Output of [`parse_book`]: everything a [`Book`](crate::book::Book) is assembled from.
#[derive(Debug, Clone, Default)]
pub struct BookSource {
    pub datas: Vec<DataDecl>,
    /// Definitions in source order. References are not resolved yet.
    pub defs: Vec<(String, Core)>,
    /// Constructor aliases accumulated from `datas`.
    pub ctrs: CtorTable,
}

fn is_name_char(c: &char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')
}

/// Whitespace and `//` comments, possibly none.
pub fn skip<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    let whitespace = any()
        .filter(|c: &char| c.is_whitespace())
        .ignored()
        .labelled("whitespace");
    let comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored()
        .labelled("comment");
    whitespace.or(comment).repeated()
}

pub fn name<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    any()
        .filter(is_name_char)
        .repeated()
        .at_least(1)
        .to_slice()
        .labelled("name")
}

fn label<'src>() -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    digits(10)
        .at_least(1)
        .to_slice()
        .labelled("label")
        .try_map(|raw: &str, span| {
            raw.parse::<u32>()
                .map_err(|_| Rich::custom(span, format!("label `{raw}` does not fit in 32 bits")))
        })
}

fn oper<'src>() -> impl Parser<'src, &'src str, Oper, Extra<'src>> + Clone {
    choice((
        just("==").to(Oper::Eq),
        just("!=").to(Oper::Ne),
        just("<<").to(Oper::Lsh),
        just(">>").to(Oper::Rsh),
        just("<=").to(Oper::Lte),
        just(">=").to(Oper::Gte),
        just("<").to(Oper::Lt),
        just(">").to(Oper::Gt),
        just("+").to(Oper::Add),
        just("-").to(Oper::Sub),
        just("*").to(Oper::Mul),
        just("/").to(Oper::Div),
        just("%").to(Oper::Mod),
        just("&").to(Oper::And),
        just("|").to(Oper::Or),
        just("^").to(Oper::Xor),
    ))
    .labelled("operator")
}

/// Items up to (and including) the `close` delimiter. The delimiter is looked for
/// before each item, so lists need no separator.
fn closed_by<'src, O, P>(
    item: P,
    close: char,
    min: usize,
) -> impl Parser<'src, &'src str, Vec<O>, Extra<'src>> + Clone
where
    P: Parser<'src, &'src str, O, Extra<'src>> + Clone,
{
    skip()
        .then(just(close))
        .not()
        .ignore_then(item)
        .repeated()
        .at_least(min)
        .collect::<Vec<_>>()
        .then_ignore(skip())
        .then_ignore(just(close))
}

/// Constructor name, resolved to its id. With `wildcard`, `_` stands for the wildcard
/// arm of a match.
fn ctor_id<'src>(
    ctrs: &'src CtorTable,
    wildcard: bool,
) -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    any()
        .filter(is_name_char)
        .repeated()
        .to_slice()
        .labelled("constructor name")
        .try_map(move |name: &str, span| {
            if wildcard && name == "_" {
                return Ok(WILDCARD_CTR);
            }
            ctrs.resolve(name)
                .ok_or_else(|| Rich::custom(span, format!("unknown constructor `#{name}`")))
        })
}

/// Parser for one term, resolving constructor names through `ctrs`. Leading
/// whitespace is skipped, trailing whitespace is not.
pub fn core_parser<'src>(
    ctrs: &'src CtorTable,
) -> impl Parser<'src, &'src str, Core, Extra<'src>> + Clone {
    recursive(|core| {
        let era = just('*').to(Core::Era).labelled("erasure");

        let lam = just('λ')
            .ignore_then(skip())
            .ignore_then(name())
            .then(core.clone())
            .map(|(var, body)| Core::lam(var, body))
            .labelled("lambda");

        let op2 = just('(')
            .ignore_then(skip())
            .ignore_then(oper())
            .then(core.clone())
            .then(core.clone())
            .then_ignore(skip())
            .then_ignore(just(')'))
            .map(|((op, lhs), rhs)| Core::op2(op, lhs, rhs))
            .labelled("operator application");

        let app = just('(')
            .ignore_then(core.clone())
            .then(closed_by(core.clone(), ')', 1))
            .map(|(func, args)| args.into_iter().fold(func, Core::app))
            .labelled("application");

        let sup = just('&')
            .ignore_then(label())
            .then_ignore(skip())
            .then_ignore(just('{'))
            .then(core.clone())
            .then(core.clone())
            .then_ignore(skip())
            .then_ignore(just('}'))
            .map(|((lab, left), right)| Core::sup(lab, left, right))
            .labelled("superposition");

        let dup = just('!')
            .ignore_then(skip())
            .ignore_then(just('&'))
            .ignore_then(label())
            .then_ignore(skip())
            .then_ignore(just('{'))
            .then_ignore(skip())
            .then(name())
            .then_ignore(skip())
            .then(name())
            .then_ignore(skip())
            .then_ignore(just('}'))
            .then_ignore(skip())
            .then_ignore(just('='))
            .then(core.clone())
            .then(core.clone())
            .map(|((((lab, dp0), dp1), value), body)| Core::dup(lab, dp0, dp1, value, body))
            .labelled("duplication");

        let reference = just('@')
            .ignore_then(name())
            .map(|name: &str| Core::reference(name))
            .labelled("reference");

        let ctr = just('#')
            .ignore_then(ctor_id(ctrs, false))
            .then_ignore(skip())
            .then_ignore(just('{'))
            .then(closed_by(core.clone(), '}', 0))
            .map(|(cid, fields)| Core::Ctr { cid, fields })
            .labelled("constructor");

        let arm = skip()
            .ignore_then(just('#'))
            .ignore_then(ctor_id(ctrs, true))
            .then_ignore(skip())
            .then_ignore(just(':'))
            .then(core.clone())
            .labelled("match arm");

        let mat = just('~')
            .ignore_then(core.clone())
            .then_ignore(skip())
            .then_ignore(just('{'))
            .then(closed_by(arm, '}', 0))
            .map(|(scrutinee, arms)| Core::mat(scrutinee, arms))
            .labelled("match");

        let atom = name()
            .labelled("variable")
            .try_map(|name: &str, span| {
                if !name.bytes().all(|b| b.is_ascii_digit()) {
                    return Ok(Core::var(name));
                }
                name.parse::<u32>().map(Core::U32).map_err(|_| {
                    Rich::custom(
                        span,
                        format!("integer literal `{name}` does not fit in 32 bits"),
                    )
                })
            });

        skip().ignore_then(choice((
            era, lam, op2, app, sup, dup, reference, ctr, mat, atom,
        )))
    })
}

/// `data Name { #Ctor{field ...} ... }`
pub fn data_parser<'src>() -> impl Parser<'src, &'src str, DataDecl, Extra<'src>> + Clone {
    let field = skip()
        .ignore_then(name())
        .map(|field: &str| field.to_string());

    let ctor = skip()
        .ignore_then(just('#'))
        .ignore_then(name())
        .then_ignore(skip())
        .then_ignore(just('{'))
        .then(closed_by(field, '}', 0))
        .map(|(name, fields)| CtorDecl {
            name: name.to_string(),
            fields,
        })
        .labelled("constructor declaration");

    skip()
        .ignore_then(just("data"))
        .ignore_then(skip())
        .ignore_then(name())
        .then_ignore(skip())
        .then_ignore(just('{'))
        .then(closed_by(ctor, '}', 0))
        .map(|(name, ctors)| DataDecl {
            name: name.to_string(),
            ctors,
        })
        .labelled("data declaration")
}

/// `@name = term`
pub fn definition_parser<'src>(
    ctrs: &'src CtorTable,
) -> impl Parser<'src, &'src str, (String, Core), Extra<'src>> + Clone {
    skip()
        .ignore_then(just('@'))
        .ignore_then(name())
        .then_ignore(skip())
        .then_ignore(just('='))
        .then(core_parser(ctrs))
        .map(|(name, core)| (name.to_string(), core))
        .labelled("definition")
}

fn book_parser<'src>(
    ctrs: &'src CtorTable,
) -> impl Parser<'src, &'src str, (Vec<DataDecl>, Vec<(String, Core)>), Extra<'src>> {
    data_parser()
        .repeated()
        .collect::<Vec<_>>()
        .then(definition_parser(ctrs).repeated().collect::<Vec<_>>())
        .then_ignore(skip())
        .then_ignore(end())
}

/// Parse a single term. Constructor names must be numeric ids (or empty).
///
/// ```
/// use hvcore::{ast::Core, parser::parse_core};
/// assert_eq!(parse_core("λx x").unwrap(), Core::lam("x", Core::var("x")));
/// assert!(parse_core("λ").is_err());
/// ```
pub fn parse_core(src: &str) -> Result<Core, ParseError> {
    parse_core_with(src, &CtorTable::default())
}

/// Parse a single term, resolving constructor names through `ctrs`.
pub fn parse_core_with(src: &str, ctrs: &CtorTable) -> Result<Core, ParseError> {
    core_parser(ctrs)
        .then_ignore(skip())
        .then_ignore(end())
        .parse(src)
        .into_result()
        .map_err(|errors| ParseError::from_rich(src, errors))
}

/// Parse a single term; on failure, log the diagnostic and return
/// [`Core::failure`] instead.
pub fn parse_core_or_failure(src: &str) -> Core {
    match parse_core(src) {
        Ok(core) => core,
        Err(err) => {
            error!("{err}\n{}", err.excerpt);
            Core::failure()
        }
    }
}

/// Parse a whole book: `data` blocks, then definitions, then end of input.
///
/// Constructor aliases are collected from the leading `data` blocks first, then the
/// unit is parsed with that table, so every `#Name` in a definition can be resolved
/// where it appears.
pub fn parse_book(src: &str) -> Result<BookSource, ParseError> {
    let prefix = data_parser()
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(any().repeated())
        .parse(src)
        .into_output()
        .unwrap_or_default();

    let mut ctrs = CtorTable::default();
    for data in &prefix {
        ctrs.merge(data);
    }

    let (datas, defs) = book_parser(&ctrs)
        .parse(src)
        .into_result()
        .map_err(|errors| ParseError::from_rich(src, errors))?;

    debug!(
        "Parsed {} data blocks ({} constructors) and {} definitions",
        datas.len(),
        ctrs.len(),
        defs.len()
    );

    Ok(BookSource { datas, defs, ctrs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_accepts_comments_and_nothing() {
        assert!(skip().then_ignore(end()).parse("").into_result().is_ok());
        assert!(
            skip()
                .then_ignore(end())
                .parse("  // one\n\t// two")
                .into_result()
                .is_ok()
        );
    }

    #[test]
    fn longest_operator_wins() {
        let parse = |s: &str| oper().then_ignore(end()).parse(s).into_result().unwrap();
        assert_eq!(parse("<="), Oper::Lte);
        assert_eq!(parse("<<"), Oper::Lsh);
        assert_eq!(parse("<"), Oper::Lt);
        assert_eq!(parse("!="), Oper::Ne);
    }

    #[test]
    fn names_allow_dots_and_underscores() {
        let out = name().then_ignore(end()).parse("List.cons_2").into_result();
        assert_eq!(out.ok(), Some("List.cons_2"));
        assert!(name().parse("").into_result().is_err());
    }

    #[test]
    fn data_prefix_feeds_constructor_ids() {
        let src = "data B { #T{} #F{} }\n@f = #F{}";
        let book = parse_book(src).unwrap();
        assert_eq!(book.datas.len(), 1);
        assert_eq!(book.defs[0].1, Core::Ctr {
            cid: 1,
            fields: vec![]
        });
    }
}
