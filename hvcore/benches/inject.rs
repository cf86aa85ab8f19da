use criterion::{Criterion, black_box, criterion_group, criterion_main};

use hvcore::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Binders in scope, plus a counter so that no two binders of a tree share a name.
#[derive(Default)]
struct Names {
    scope: Vec<String>,
    next: usize,
}

impl Names {
    fn fresh(&mut self) -> String {
        self.next += 1;
        format!("v{}", self.next)
    }
}

/// Random closed tree. Every variable refers to an enclosing binder.
fn random_core(budget: usize, rng: &mut impl Rng, names: &mut Names) -> Core {
    if budget == 0 || rng.random_bool(0.2) {
        return match rng.random_range(0..=2) {
            0 if !names.scope.is_empty() => {
                let i = rng.random_range(0..names.scope.len());
                Core::var(names.scope[i].clone())
            }
            1 => Core::U32(rng.next_u32()),
            _ => Core::Era,
        };
    }

    match rng.random_range(0..=5) {
        0 => {
            let var = names.fresh();
            names.scope.push(var.clone());
            let body = random_core(budget - 1, rng, names);
            names.scope.pop();
            Core::lam(var, body)
        }
        1 => {
            let func = random_core(budget - 1, rng, names);
            let arg = random_core(budget - 1, rng, names);
            Core::app(func, arg)
        }
        2 => {
            let left = random_core(budget - 1, rng, names);
            let right = random_core(budget - 1, rng, names);
            Core::sup(rng.random_range(0..16), left, right)
        }
        3 => {
            let value = random_core(budget - 1, rng, names);
            let (dp0, dp1) = (names.fresh(), names.fresh());
            names.scope.push(dp0.clone());
            names.scope.push(dp1.clone());
            let body = random_core(budget - 1, rng, names);
            names.scope.truncate(names.scope.len() - 2);
            Core::dup(rng.random_range(0..16), dp0, dp1, value, body)
        }
        4 => {
            let lhs = random_core(budget - 1, rng, names);
            let rhs = random_core(budget - 1, rng, names);
            Core::op2(Oper::Add, lhs, rhs)
        }
        _ => {
            let fields = (0..rng.random_range(0..4))
                .map(|_| random_core(budget - 1, rng, names))
                .collect();
            Core::Ctr {
                cid: rng.random_range(0..8),
                fields,
            }
        }
    }
}

/// Names of every binder in `core`, in visit order.
fn binders<'a>(core: &'a Core, out: &mut Vec<&'a str>) {
    match core {
        Core::Lam { var, body } => {
            out.push(var);
            binders(body, out);
        }
        Core::Dup {
            dp0,
            dp1,
            value,
            body,
            ..
        } => {
            out.push(dp0);
            out.push(dp1);
            binders(value, out);
            binders(body, out);
        }
        Core::App { func: a, arg: b }
        | Core::Sup {
            left: a, right: b, ..
        }
        | Core::Op2 { lhs: a, rhs: b, .. } => {
            binders(a, out);
            binders(b, out);
        }
        Core::Ctr { fields, .. } => fields.iter().for_each(|f| binders(f, out)),
        Core::Mat { scrutinee, arms } => {
            binders(scrutinee, out);
            arms.iter().for_each(|(_, case)| binders(case, out));
        }
        Core::Era | Core::Ref { .. } | Core::Var(_) | Core::U32(_) => {}
    }
}

fn book_source(defs: usize) -> String {
    let mut src = String::from("data List { #Nil{} #Cons{head tail} }\n");
    for i in 0..defs {
        let next = (i + 1) % defs;
        src.push_str(&format!(
            "@f{i} = λx λy // step {i}\n  !&{i}{{a b}} = x ~y{{#Nil: (@f{next} a) #Cons: (+ b {i}) #_: *}}\n"
        ));
    }
    src
}

fn bench_inject(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    let core = random_core(12, &mut rng, &mut Names::default());

    // A reused binder name would let an inner binder capture outer uses.
    let mut names = Vec::new();
    binders(&core, &mut names);
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total, "random tree reuses a binder name");

    let mut heap = Heap::new();

    c.bench_function("inject_random", |b| {
        b.iter(|| {
            heap.reset();
            black_box(inject_root(&mut heap, &core).unwrap());
        })
    });

    let book = Book::parse(&book_source(64)).unwrap();
    c.bench_function("inject_book", |b| {
        b.iter(|| {
            heap.reset();
            black_box(book.inject_all(&mut heap).unwrap());
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let src = book_source(64);
    c.bench_function("parse_book", |b| {
        b.iter(|| black_box(Book::parse(black_box(&src)).unwrap()))
    });
}

criterion_group!(benches, bench_inject, bench_parse);
criterion_main!(benches);
