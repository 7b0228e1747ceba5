use super::*;
use crate::overriding::FakeOverrideVisibility;
use crate::test_support::{analyze, codes, member_function, open_class};
use jetc_common::diagnostic_codes;
use jetc_descriptors::{CallableKind, Modality, Visibility};
use jetc_syntax::{Modifiers, NodeArena};

#[test]
fn test_is_overridable_by_signature_rules() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN);
    let base_h = member_function(&mut syntax, "h", "Int", Modifiers::OPEN);
    let int = syntax.type_ref("Int");
    let x = syntax.parameter("x", int);
    let unit = syntax.type_ref("Unit");
    let base_g = syntax
        .function("g")
        .modifiers(Modifiers::OPEN)
        .parameter(x)
        .returns(unit)
        .finish();
    let base = open_class(&mut syntax, "Base", &[], vec![base_f, base_g, base_h]);

    let derived_f = member_function(&mut syntax, "f", "Int", Modifiers::OVERRIDE);
    let derived_h = member_function(&mut syntax, "h", "String", Modifiers::OVERRIDE);
    let string = syntax.type_ref("String");
    let y = syntax.parameter("x", string);
    let unit = syntax.type_ref("Unit");
    let derived_g = syntax.function("g").parameter(y).returns(unit).finish();
    let derived = open_class(&mut syntax, "Derived", &["Base"], vec![derived_f, derived_g, derived_h]);
    let file = syntax.file("test.kt", vec![base, derived]);

    let (program, _) = analyze(&syntax, file);
    let util = OverridingUtil::new(program.descriptors(), program.builtins());
    let id = |node| program.descriptor_for(node).unwrap();

    assert_eq!(
        util.is_overridable_by(id(base_f), id(derived_f), true),
        OverrideCompatibility::Overridable
    );
    assert!(matches!(
        util.is_overridable_by(id(base_g), id(derived_g), true),
        OverrideCompatibility::Incompatible(_)
    ));
    assert!(matches!(
        util.is_overridable_by(id(base_f), id(derived_g), true),
        OverrideCompatibility::Incompatible(_)
    ));
    assert!(matches!(
        util.is_overridable_by(id(base_h), id(derived_h), true),
        OverrideCompatibility::Conflict(_)
    ));
    assert!(util.is_overridable_by(id(base_h), id(derived_h), false).is_overridable());
}

#[test]
fn test_resolution_for_name_is_pure() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN);
    let base = open_class(&mut syntax, "Base", &[], vec![base_f]);
    let derived_f = member_function(&mut syntax, "f", "Int", Modifiers::OVERRIDE);
    let derived = open_class(&mut syntax, "Derived", &["Base"], vec![derived_f]);
    let file = syntax.file("test.kt", vec![base, derived]);

    let (program, diagnostics) = analyze(&syntax, file);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    let util = OverridingUtil::new(program.descriptors(), program.builtins());
    let inherited = [program.descriptor_for(base_f).unwrap()];
    let declared = [program.descriptor_for(derived_f).unwrap()];

    let first = resolve_overrides_for_name(&util, &inherited, &declared);
    let second = resolve_overrides_for_name(&util, &inherited, &declared);
    assert_eq!(first, second);
    assert!(first.fake_overrides.is_empty());
    assert!(first.conflicts.is_empty());
    assert_eq!(first.bindings.len(), 1);
    assert_eq!(first.bindings[0].1.as_slice(), &inherited);
}

#[test]
fn test_fake_override_is_owned_by_inheriting_class() {
    let mut syntax = NodeArena::new();
    let base_f = member_function(&mut syntax, "f", "Int", Modifiers::OPEN);
    let base = open_class(&mut syntax, "Base", &[], vec![base_f]);
    let derived = open_class(&mut syntax, "Derived", &["Base"], vec![]);
    let file = syntax.file("test.kt", vec![base, derived]);

    let (program, diagnostics) = analyze(&syntax, file);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    let derived = program.descriptor_for(derived).unwrap();
    let members = program.members_named(derived, "f");
    let [fake] = members[..] else {
        panic!("expected exactly one f in Derived");
    };
    let descriptors = program.descriptors();
    let data = descriptors.callable(fake).unwrap();
    assert_eq!(descriptors.containing(fake), Some(derived));
    assert_eq!(data.kind, CallableKind::FakeOverride);
    assert_eq!(data.modality, Modality::Open);
    assert_eq!(data.visibility, Visibility::Public);
    assert_eq!(data.overridden.as_slice(), &[program.descriptor_for(base_f).unwrap()]);
    assert_eq!(descriptors.original_of(fake), program.descriptor_for(base_f).unwrap());
    assert_eq!(program.source_of(fake), None);
}

#[test]
fn test_conflicting_inherited_members_are_excluded() {
    let mut syntax = NodeArena::new();
    let a_g = member_function(&mut syntax, "g", "Int", Modifiers::empty());
    let a = syntax.interface("A").member(a_g).finish();
    let b_g = member_function(&mut syntax, "g", "String", Modifiers::empty());
    let b = syntax.interface("B").member(b_g).finish();
    let c = open_class(&mut syntax, "C", &["A", "B"], vec![]);
    let file = syntax.file("test.kt", vec![a, b, c]);

    let (program, diagnostics) = analyze(&syntax, file);
    assert_eq!(
        codes(&diagnostics),
        vec![diagnostic_codes::CONFLICTING_INHERITED_MEMBERS]
    );
    let c = program.descriptor_for(c).unwrap();
    assert!(program.members_named(c, "g").is_empty());

    let util = OverridingUtil::new(program.descriptors(), program.builtins());
    let inherited = [program.descriptor_for(a_g).unwrap(), program.descriptor_for(b_g).unwrap()];
    let resolution = resolve_overrides_for_name(&util, &inherited, &[]);
    assert!(resolution.fake_overrides.is_empty());
    assert_eq!(resolution.conflicts.len(), 1);
}

#[test]
fn test_compatible_inherited_members_merge_into_one_fake_override() {
    let mut syntax = NodeArena::new();
    let a_g = member_function(&mut syntax, "g", "Any", Modifiers::empty());
    let a = syntax.interface("A").member(a_g).finish();
    let b_g = member_function(&mut syntax, "g", "String", Modifiers::empty());
    let b = syntax.interface("B").member(b_g).finish();
    let file = syntax.file("test.kt", vec![a, b]);

    let (program, _) = analyze(&syntax, file);
    let util = OverridingUtil::new(program.descriptors(), program.builtins());
    let a_g = program.descriptor_for(a_g).unwrap();
    let b_g = program.descriptor_for(b_g).unwrap();
    let resolution = resolve_overrides_for_name(&util, &[a_g, b_g], &[]);
    assert!(resolution.conflicts.is_empty());
    let [plan] = &resolution.fake_overrides[..] else {
        panic!("expected a single fake override");
    };
    assert_eq!(plan.most_specific, b_g);
    assert_eq!(plan.overridden.len(), 2);
    assert_eq!(plan.modality, Modality::Abstract);
}

#[test]
fn test_visibility_inference() {
    let mut syntax = NodeArena::new();
    let p_f = member_function(&mut syntax, "f", "Unit", Modifiers::OPEN | Modifiers::PROTECTED);
    let p = open_class(&mut syntax, "P", &[], vec![p_f]);
    let q_f = member_function(&mut syntax, "f", "Unit", Modifiers::OPEN | Modifiers::INTERNAL);
    let r_f = member_function(&mut syntax, "f", "Unit", Modifiers::PRIVATE);
    let q = open_class(&mut syntax, "Q", &[], vec![q_f]);
    let r = open_class(&mut syntax, "R", &[], vec![r_f]);
    let file = syntax.file("test.kt", vec![p, q, r]);

    let (program, _) = analyze(&syntax, file);
    let util = OverridingUtil::new(program.descriptors(), program.builtins());
    let p_f = program.descriptor_for(p_f).unwrap();
    let q_f = program.descriptor_for(q_f).unwrap();
    let r_f = program.descriptor_for(r_f).unwrap();

    assert_eq!(
        util.infer_visibility(&[p_f]),
        FakeOverrideVisibility::Inferred(Visibility::Protected)
    );
    assert_eq!(
        util.infer_visibility(&[p_f, q_f]),
        FakeOverrideVisibility::CannotInfer {
            fallback: Visibility::Protected
        }
    );
    assert_eq!(util.infer_visibility(&[r_f]), FakeOverrideVisibility::Invisible);
    assert_eq!(
        util.infer_visibility(&[r_f, q_f]),
        FakeOverrideVisibility::Inferred(Visibility::Internal)
    );
    assert_eq!(util.most_restrictive(&[]), Visibility::Public);
}

#[test]
fn test_fake_override_keeps_var_over_narrower_val() {
    // interface A { var p: Any }  interface B { val p: String }
    let mut syntax = NodeArena::new();
    let any = syntax.type_ref("Any");
    let a_p = syntax.property("p", any).var().finish();
    let a = syntax.interface("A").member(a_p).finish();
    let string = syntax.type_ref("String");
    let b_p = syntax.property("p", string).finish();
    let b = syntax.interface("B").member(b_p).finish();
    let a_ref = syntax.type_ref("A");
    let a_entry = syntax.supertype(a_ref);
    let b_ref = syntax.type_ref("B");
    let b_entry = syntax.supertype(b_ref);
    let c = syntax
        .class("C")
        .modifiers(Modifiers::ABSTRACT)
        .supertype(a_entry)
        .supertype(b_entry)
        .finish();
    let file = syntax.file("test.kt", vec![a, b, c]);

    let (program, diagnostics) = analyze(&syntax, file);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    let a_p = program.descriptor_for(a_p).unwrap();
    let b_p = program.descriptor_for(b_p).unwrap();
    let util = OverridingUtil::new(program.descriptors(), program.builtins());
    assert!(!util.is_more_specific(b_p, a_p));
    assert!(!util.is_more_specific(a_p, b_p));

    let c = program.descriptor_for(c).unwrap();
    let members = program.members_named(c, "p");
    let [p] = members[..] else {
        panic!("expected exactly one p in C");
    };
    let descriptors = program.descriptors();
    let data = descriptors.property(p).unwrap();
    assert!(data.is_var);
    assert_eq!(data.callable.return_type, program.builtins().any_type());
    assert_eq!(data.callable.kind, CallableKind::FakeOverride);
    assert_eq!(data.callable.overridden.as_slice(), &[a_p, b_p]);
}

#[test]
fn test_two_vars_need_equal_types_to_be_more_specific() {
    let mut syntax = NodeArena::new();
    let any = syntax.type_ref("Any");
    let a_p = syntax.property("p", any).var().finish();
    let string = syntax.type_ref("String");
    let b_p = syntax.property("p", string).var().finish();
    let string = syntax.type_ref("String");
    let c_p = syntax.property("p", string).var().finish();
    let string = syntax.type_ref("String");
    let d_p = syntax.property("p", string).finish();
    let a = syntax.interface("A").member(a_p).finish();
    let b = syntax.interface("B").member(b_p).finish();
    let c = syntax.interface("C").member(c_p).finish();
    let d = syntax.interface("D").member(d_p).finish();
    let file = syntax.file("test.kt", vec![a, b, c, d]);

    let (program, _) = analyze(&syntax, file);
    let util = OverridingUtil::new(program.descriptors(), program.builtins());
    let id = |node| program.descriptor_for(node).unwrap();
    assert!(!util.is_more_specific(id(b_p), id(a_p)));
    assert!(util.is_more_specific(id(b_p), id(c_p)));
    // A var may narrow a val, never the other way round.
    assert!(util.is_more_specific(id(b_p), id(d_p)));
    assert!(!util.is_more_specific(id(d_p), id(b_p)));
}

#[test]
fn test_cannot_infer_visibility_reported_by_class_driver() {
    // interface A { internal fun f() {} }  interface B { protected fun f() {} }
    let mut syntax = NodeArena::new();
    let body = syntax.block(Vec::new());
    let a_f = syntax
        .function("f")
        .modifiers(Modifiers::INTERNAL)
        .body(body)
        .finish();
    let a = syntax.interface("A").member(a_f).finish();
    let body = syntax.block(Vec::new());
    let b_f = syntax
        .function("f")
        .modifiers(Modifiers::PROTECTED)
        .body(body)
        .finish();
    let b = syntax.interface("B").member(b_f).finish();
    let a_ref = syntax.type_ref("A");
    let a_entry = syntax.supertype(a_ref);
    let b_ref = syntax.type_ref("B");
    let b_entry = syntax.supertype(b_ref);
    let c = syntax.class("C").supertype(a_entry).supertype(b_entry).finish();
    let file = syntax.file("test.kt", vec![a, b, c]);

    let (program, diagnostics) = analyze(&syntax, file);
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::CANNOT_INFER_VISIBILITY]);
    assert_eq!(diagnostics.diagnostics()[0].start, syntax.span(c).start);

    let c = program.descriptor_for(c).unwrap();
    let members = program.members_named(c, "f");
    let [f] = members[..] else {
        panic!("expected exactly one f in C");
    };
    let data = program.descriptors().callable(f).unwrap();
    assert_eq!(data.kind, CallableKind::FakeOverride);
    assert_eq!(data.visibility, Visibility::Protected);
    assert_eq!(data.overridden.len(), 2);
}
