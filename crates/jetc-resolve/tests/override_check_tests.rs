use super::*;
use crate::test_support::{analyze, analyze_with, codes, member_function, open_class};
use jetc_common::diagnostic_codes;
use jetc_descriptors::Visibility;
use jetc_syntax::{Modifiers, NodeArena, NodeIndex};

/// `open class Base { base_member }` and `open class Derived : Base { derived_member }`.
fn base_and_derived(syntax: &mut NodeArena, base_member: NodeIndex, derived_member: NodeIndex) -> NodeIndex {
    let base = open_class(syntax, "Base", &[], vec![base_member]);
    let derived = open_class(syntax, "Derived", &["Base"], vec![derived_member]);
    syntax.file("test.kt", vec![base, derived])
}

#[test]
fn test_nothing_to_override() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN);
    let derived_g = member_function(&mut syntax, "g", "Int", Modifiers::OVERRIDE);
    let file = base_and_derived(&mut syntax, base_f, derived_g);

    let (_, diagnostics) = analyze(&syntax, file);
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::NOTHING_TO_OVERRIDE]);
    assert_eq!(diagnostics.diagnostics()[0].start, syntax.span(derived_g).start);
}

#[test]
fn test_missing_override_modifier_hides_member() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN);
    let derived_f = member_function(&mut syntax, "f", "Int", Modifiers::empty());
    let file = base_and_derived(&mut syntax, base_f, derived_f);

    let (program, diagnostics) = analyze(&syntax, file);
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::VIRTUAL_MEMBER_HIDDEN]);
    assert!(diagnostics.diagnostics()[0].message_text.contains("Base"));

    // Still an override as far as the member graph is concerned.
    let derived_f = program.descriptor_for(derived_f).unwrap();
    let base_f = program.descriptor_for(base_f).unwrap();
    assert_eq!(
        program.descriptors().callable(derived_f).unwrap().overridden.as_slice(),
        &[base_f]
    );
}

#[test]
fn test_overriding_final_member() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::empty());
    let derived_f = member_function(&mut syntax, "f", "Int", Modifiers::OVERRIDE);
    let file = base_and_derived(&mut syntax, base_f, derived_f);

    let (_, diagnostics) = analyze(&syntax, file);
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::OVERRIDING_FINAL_MEMBER]);
}

#[test]
fn test_return_type_mismatch() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN);
    let derived_f = member_function(&mut syntax, "f", "String", Modifiers::OVERRIDE);
    let file = base_and_derived(&mut syntax, base_f, derived_f);

    let (_, diagnostics) = analyze(&syntax, file);
    assert_eq!(
        codes(&diagnostics),
        vec![diagnostic_codes::RETURN_TYPE_MISMATCH_ON_OVERRIDE]
    );
}

#[test]
fn test_covariant_return_type_is_accepted() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Any", Modifiers::OPEN);
    let derived_f = member_function(&mut syntax, "f", "String", Modifiers::OVERRIDE);
    let file = base_and_derived(&mut syntax, base_f, derived_f);

    let (_, diagnostics) = analyze(&syntax, file);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
}

#[test]
fn test_var_overridden_by_val() {
    let mut syntax = NodeArena::new();
    let int = syntax.type_ref("Int");
    let base_p = syntax.property("p", int).modifiers(Modifiers::OPEN).var().finish();
    let int = syntax.type_ref("Int");
    let derived_p = syntax.property("p", int).modifiers(Modifiers::OVERRIDE).finish();
    let file = base_and_derived(&mut syntax, base_p, derived_p);

    let (_, diagnostics) = analyze(&syntax, file);
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::VAR_OVERRIDDEN_BY_VAL]);
}

#[test]
fn test_var_property_type_must_match_exactly() {
    let mut syntax = NodeArena::new();
    let any = syntax.type_ref("Any");
    let base_p = syntax.property("p", any).modifiers(Modifiers::OPEN).var().finish();
    let string = syntax.type_ref("String");
    let derived_p = syntax
        .property("p", string)
        .modifiers(Modifiers::OVERRIDE)
        .var()
        .finish();
    let file = base_and_derived(&mut syntax, base_p, derived_p);

    let (_, diagnostics) = analyze(&syntax, file);
    assert_eq!(
        codes(&diagnostics),
        vec![diagnostic_codes::PROPERTY_TYPE_MISMATCH_ON_OVERRIDE]
    );
}

#[test]
fn test_abstract_member_not_implemented() {
    let mut syntax = NodeArena::new();
    let area = member_function(&mut syntax, "area", "Int", Modifiers::ABSTRACT);
    let shape = syntax
        .class("Shape")
        .modifiers(Modifiers::ABSTRACT)
        .member(area)
        .finish();
    let type_ref = syntax.type_ref("Shape");
    let entry = syntax.supertype_call(type_ref, vec![]);
    let square = syntax.class("Square").supertype(entry).finish();
    let file = syntax.file("test.kt", vec![shape, square]);

    let (_, diagnostics) = analyze(&syntax, file);
    assert_eq!(
        codes(&diagnostics),
        vec![diagnostic_codes::ABSTRACT_MEMBER_NOT_IMPLEMENTED]
    );
    assert!(diagnostics.diagnostics()[0].message_text.contains("Square"));
}

#[test]
fn test_override_inherits_visibility() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN | Modifiers::PROTECTED);
    let derived_f = member_function(&mut syntax, "f", "Int", Modifiers::OVERRIDE);
    let file = base_and_derived(&mut syntax, base_f, derived_f);

    let (program, diagnostics) = analyze(&syntax, file);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    let derived_f = program.descriptor_for(derived_f).unwrap();
    assert_eq!(
        program.descriptors().visibility(derived_f),
        Some(Visibility::Protected)
    );
}

#[test]
fn test_options_disable_checks() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN);
    let derived_f = member_function(&mut syntax, "f", "Int", Modifiers::empty());
    let area = member_function(&mut syntax, "area", "Int", Modifiers::ABSTRACT);
    let base = open_class(&mut syntax, "Base", &[], vec![base_f]);
    let derived = open_class(&mut syntax, "Derived", &["Base"], vec![derived_f]);
    let shape = syntax
        .class("Shape")
        .modifiers(Modifiers::ABSTRACT)
        .member(area)
        .finish();
    let square = open_class(&mut syntax, "Square", &["Shape"], vec![]);
    let file = syntax.file("test.kt", vec![base, derived, shape, square]);

    let options = AnalyzerOptions {
        report_override_modifier_errors: false,
        report_abstract_not_implemented: false,
        ..AnalyzerOptions::default()
    };
    let (_, diagnostics) = analyze_with(&syntax, file, options);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());

    let (_, diagnostics) = analyze(&syntax, file);
    let mut found = codes(&diagnostics);
    found.sort_unstable();
    assert_eq!(
        found,
        vec![
            diagnostic_codes::VIRTUAL_MEMBER_HIDDEN,
            diagnostic_codes::ABSTRACT_MEMBER_NOT_IMPLEMENTED
        ]
    );
}
