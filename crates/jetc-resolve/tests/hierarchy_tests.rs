use super::*;
use crate::test_support::{analyze, codes, open_class};
use jetc_binder::{BinderOptions, BinderState};
use jetc_common::{DiagnosticCollector, diagnostic_codes};
use jetc_descriptors::JetType;
use jetc_syntax::{NodeArena, NodeIndex};

fn order_of(syntax: &NodeArena, file: NodeIndex) -> (BinderState<'_>, Vec<jetc_descriptors::DescriptorId>, DiagnosticCollector) {
    let mut diagnostics = DiagnosticCollector::new();
    let mut state = BinderState::new(syntax, "test.kt", BinderOptions::default()).unwrap();
    state.discover_declarations(file, &mut diagnostics).unwrap();
    state.resolve_headers(&mut diagnostics).unwrap();
    let order = HierarchyChecker::new(&mut state).check(&mut diagnostics).unwrap();
    (state, order, diagnostics)
}

#[test]
fn test_order_lists_supertypes_first() {
    let mut syntax = NodeArena::new();
    let c = open_class(&mut syntax, "C", &["B"], vec![]);
    let b = open_class(&mut syntax, "B", &["A"], vec![]);
    let a = open_class(&mut syntax, "A", &[], vec![]);
    let file = syntax.file("test.kt", vec![c, b, a]);

    let (state, order, diagnostics) = order_of(&syntax, file);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    let position = |node: NodeIndex| {
        let class = state.node_descriptors[&node];
        order.iter().position(|&c| c == class).unwrap()
    };
    assert!(position(a) < position(b));
    assert!(position(b) < position(c));
    assert_eq!(order.len(), 3);
    assert!(!order.contains(&state.builtins.any));
}

#[test]
fn test_cycle_is_reported_and_broken() {
    let mut syntax = NodeArena::new();
    let a = open_class(&mut syntax, "A", &["B"], vec![]);
    let b = open_class(&mut syntax, "B", &["A"], vec![]);
    let file = syntax.file("test.kt", vec![a, b]);

    let (state, order, diagnostics) = order_of(&syntax, file);
    let cyclic: Vec<_> = diagnostics
        .with_code(diagnostic_codes::CYCLIC_INHERITANCE_HIERARCHY)
        .collect();
    assert_eq!(cyclic.len(), 2);
    assert_eq!(order.len(), 2);

    let a = state.node_descriptors[&a];
    let b = state.node_descriptors[&b];
    let a_extends_b = state.descriptors.supertypes(a).contains(&JetType::class(b));
    let b_extends_a = state.descriptors.supertypes(b).contains(&JetType::class(a));
    assert!(!(a_extends_b && b_extends_a), "the loop must be cut");
}

#[test]
fn test_self_inheritance_is_a_cycle() {
    let mut syntax = NodeArena::new();
    let a = open_class(&mut syntax, "A", &["A"], vec![]);
    let file = syntax.file("test.kt", vec![a]);

    let (state, order, diagnostics) = order_of(&syntax, file);
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::CYCLIC_INHERITANCE_HIERARCHY]);
    let a = state.node_descriptors[&a];
    assert_eq!(order, vec![a]);
    assert!(!state.descriptors.supertypes(a).contains(&JetType::class(a)));
}

#[test]
fn test_final_supertype() {
    let mut syntax = NodeArena::new();
    let base = syntax.class("Base").finish();
    let type_ref = syntax.type_ref("Base");
    let entry = syntax.supertype(type_ref);
    let derived = syntax.class("Derived").supertype(entry).finish();
    let file = syntax.file("test.kt", vec![base, derived]);

    let (_, diagnostics) = analyze(&syntax, file);
    let finals: Vec<_> = diagnostics.with_code(diagnostic_codes::FINAL_SUPERTYPE).collect();
    assert_eq!(finals.len(), 1);
    assert!(finals[0].message_text.contains("Base"));
    assert_eq!(finals[0].start, syntax.span(entry).start);
}

#[test]
fn test_type_parameter_supertype() {
    let mut syntax = NodeArena::new();
    let t = syntax.type_parameter("T", NodeIndex::NONE);
    let type_ref = syntax.type_ref("T");
    let entry = syntax.supertype(type_ref);
    let class = syntax.class("Box").type_parameter(t).supertype(entry).finish();
    let file = syntax.file("test.kt", vec![class]);

    let (_, diagnostics) = analyze(&syntax, file);
    assert_eq!(
        diagnostics.with_code(diagnostic_codes::SUPERTYPE_NOT_A_CLASS).count(),
        1
    );
}

#[test]
fn test_is_subclass_of_follows_supertypes() {
    let mut syntax = NodeArena::new();
    let a = open_class(&mut syntax, "A", &[], vec![]);
    let b = open_class(&mut syntax, "B", &["A"], vec![]);
    let file = syntax.file("test.kt", vec![a, b]);

    let (program, _) = analyze(&syntax, file);
    let checker = jetc_descriptors::TypeChecker::new(program.descriptors(), program.builtins());
    let a = program.descriptor_for(a).unwrap();
    let b = program.descriptor_for(b).unwrap();
    assert!(crate::hierarchy::is_subclass_of(&checker, b, a));
    assert!(!crate::hierarchy::is_subclass_of(&checker, a, b));
    assert!(crate::hierarchy::is_subclass_of(&checker, a, program.builtins().any));
}

#[test]
fn test_chain_deeper_than_supertype_limit_keeps_order() {
    let depth = jetc_common::limits::MAX_SUPERTYPE_DEPTH + 88;
    let mut syntax = NodeArena::new();
    // Declared subclass first so the walk starts at the bottom of the chain.
    let declarations: Vec<NodeIndex> = (0..depth)
        .map(|i| {
            let supertype = format!("C{}", i + 1);
            let supertypes: Vec<&str> = (i + 1 < depth).then_some(supertype.as_str()).into_iter().collect();
            open_class(&mut syntax, &format!("C{i}"), &supertypes, vec![])
        })
        .collect();
    let file = syntax.file("test.kt", declarations.clone());

    let (state, order, diagnostics) = order_of(&syntax, file);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    assert_eq!(order.len(), depth);
    let positions: Vec<usize> = declarations
        .iter()
        .map(|node| {
            let class = state.node_descriptors[node];
            order.iter().position(|&c| c == class).unwrap()
        })
        .collect();
    // `C0 : C1`, `C1 : C2`, ...
    for pair in positions.windows(2) {
        assert!(pair[1] < pair[0], "supertype ordered after its subclass");
    }
}
