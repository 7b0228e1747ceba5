//! Scope lookup benchmarks.
//!
//! Measures name lookups through the scope chain of a frozen program, and
//! the analysis that produces it, over class hierarchies of growing depth.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jetc::{Modifiers, NodeArena, NodeIndex, ResolvedProgram, analyze_file};

/// `open class C0 { open fun m0(): Int { target } }`, `open class C1 : C0 { ... }`, ...
///
/// Returns the file and the `target` name expression inside the deepest class.
fn hierarchy(syntax: &mut NodeArena, depth: usize) -> (NodeIndex, NodeIndex) {
    let mut declarations = Vec::with_capacity(depth + 1);
    let mut target = NodeIndex::NONE;
    for i in 0..depth {
        target = syntax.name_expr("target");
        let body = syntax.block(vec![target]);
        let int = syntax.type_ref("Int");
        let method = syntax
            .function(&format!("m{i}"))
            .modifiers(Modifiers::OPEN)
            .returns(int)
            .body(body)
            .finish();
        let entry = (i > 0).then(|| {
            let base = syntax.type_ref(&format!("C{}", i - 1));
            syntax.supertype(base)
        });
        let mut class = syntax
            .class(&format!("C{i}"))
            .modifiers(Modifiers::OPEN)
            .member(method);
        if let Some(entry) = entry {
            class = class.supertype(entry);
        }
        declarations.push(class.finish());
    }
    let int = syntax.type_ref("Int");
    let top = syntax.property("target", int).finish();
    declarations.push(top);
    (syntax.file("bench.kt", declarations), target)
}

fn analyzed(depth: usize) -> (ResolvedProgram, NodeIndex) {
    let mut syntax = NodeArena::new();
    let (file, target) = hierarchy(&mut syntax, depth);
    let (program, _) = analyze_file(&syntax, file).expect("analysis failed");
    (program, target)
}

const DEPTHS: [usize; 3] = [4, 16, 64];

/// Benchmark resolving names from the innermost body scope.
fn bench_scope_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_lookup");

    for depth in DEPTHS {
        let (program, target) = analyzed(depth);
        let scope = program.scope_of_expression(target).expect("target is bound");
        let target_name = program.lookup_name("target").expect("interned");
        let first_method = program.lookup_name("m0").expect("interned");
        let root_class = program.lookup_name("C0").expect("interned");

        group.bench_with_input(BenchmarkId::new("variable", depth), &scope, |b, &scope| {
            b.iter(|| black_box(program.scopes().get_properties(scope, target_name)))
        });
        group.bench_with_input(BenchmarkId::new("inherited_function", depth), &scope, |b, &scope| {
            b.iter(|| black_box(program.scopes().get_functions(scope, first_method)))
        });
        group.bench_with_input(BenchmarkId::new("classifier", depth), &scope, |b, &scope| {
            b.iter(|| black_box(program.scopes().get_classifier(scope, root_class)))
        });
        group.bench_with_input(BenchmarkId::new("candidates", depth), &target, |b, &target| {
            b.iter(|| black_box(program.candidates(target).len()))
        });
    }

    group.finish();
}

/// Benchmark the whole analysis of a hierarchy.
fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for depth in DEPTHS {
        let mut syntax = NodeArena::new();
        let (file, _) = hierarchy(&mut syntax, depth);
        group.bench_with_input(BenchmarkId::new("hierarchy", depth), &file, |b, &file| {
            b.iter(|| {
                let (program, diagnostics) = analyze_file(&syntax, file).expect("analysis failed");
                black_box((program.classes().len(), diagnostics.len()))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scope_lookup, bench_analyze);
criterion_main!(benches);
