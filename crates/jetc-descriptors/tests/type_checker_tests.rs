use super::*;
use jetc_common::Interner;
use jetc_syntax::{ClassKind, NodeIndex};

struct Fixture {
    arena: DescriptorArena,
    interner: Interner,
    builtins: Builtins,
    root: DescriptorId,
}

fn fixture() -> Fixture {
    let mut interner = Interner::new();
    let mut arena = DescriptorArena::new();
    let builtins = Builtins::install(&mut arena, &interner).unwrap();
    let root = arena.alloc_module(interner.intern("<root>"));
    Fixture {
        arena,
        interner,
        builtins,
        root,
    }
}

fn class(f: &mut Fixture, name: &str, supertypes: Vec<JetType>) -> DescriptorId {
    let id = f.arena.reserve_class(
        f.root,
        f.interner.intern(name),
        NodeIndex::NONE,
        ClassKind::Class,
        false,
        Modality::Open,
        Visibility::Public,
    );
    let data = f.arena.class_mut(id).unwrap();
    for supertype in supertypes {
        data.add_supertype(id, supertype).unwrap();
    }
    id
}

#[test]
fn test_builtin_subtyping() {
    let f = fixture();
    let checker = TypeChecker::new(&f.arena, &f.builtins);
    let int = f.builtins.int_type();
    let any = f.builtins.any_type();
    assert!(checker.is_subtype(&int, &any));
    assert!(checker.is_subtype(&int, &f.builtins.nullable_any_type()));
    assert!(!checker.is_subtype(&int.make_nullable(), &any));
    assert!(!checker.is_subtype(&any, &int));
    assert!(checker.is_subtype(&f.builtins.nothing_type(), &int));
    assert!(!checker.is_subtype(&f.builtins.string_type(), &int));
}

#[test]
fn test_error_type_is_compatible() {
    let f = fixture();
    let checker = TypeChecker::new(&f.arena, &f.builtins);
    assert!(checker.is_subtype(&JetType::Error, &f.builtins.int_type()));
    assert!(checker.is_subtype(&f.builtins.int_type(), &JetType::Error));
}

#[test]
fn test_user_class_hierarchy() {
    let mut f = fixture();
    let any = f.builtins.any_type();
    let base = class(&mut f, "Base", vec![any]);
    let derived = class(&mut f, "Derived", vec![JetType::class(base)]);
    let checker = TypeChecker::new(&f.arena, &f.builtins);
    assert!(checker.is_subtype(&JetType::class(derived), &JetType::class(base)));
    assert!(!checker.is_subtype(&JetType::class(base), &JetType::class(derived)));
}

#[test]
fn test_generic_supertype_arguments_are_invariant() {
    let mut f = fixture();
    let any = f.builtins.any_type();
    let boxed = class(&mut f, "Box", vec![any]);
    let t = f
        .arena
        .alloc_type_parameter(boxed, f.interner.intern("T"), NodeIndex::NONE, 0);
    f.arena
        .class_mut(boxed)
        .unwrap()
        .set_type_parameters(boxed, vec![t])
        .unwrap();
    let int_type = f.builtins.int_type();
    let int_box = class(&mut f, "IntBox", vec![JetType::generic(boxed, vec![int_type])]);

    let checker = TypeChecker::new(&f.arena, &f.builtins);
    let sub = JetType::class(int_box);
    assert!(checker.is_subtype(&sub, &JetType::generic(boxed, vec![f.builtins.int_type()])));
    assert!(!checker.is_subtype(&sub, &JetType::generic(boxed, vec![f.builtins.string_type()])));
    assert_eq!(
        checker.find_supertype_instance(&sub, boxed),
        Some(JetType::generic(boxed, vec![f.builtins.int_type()]))
    );
}

#[test]
fn test_unbounded_type_parameter_is_nullable() {
    let mut f = fixture();
    let any = f.builtins.any_type();
    let c = class(&mut f, "C", vec![any]);
    let t = f
        .arena
        .alloc_type_parameter(c, f.interner.intern("T"), NodeIndex::NONE, 0);
    let checker = TypeChecker::new(&f.arena, &f.builtins);
    let t_type = JetType::type_parameter(t);
    assert!(checker.is_subtype(&t_type, &f.builtins.nullable_any_type()));
    assert!(!checker.is_subtype(&t_type, &f.builtins.any_type()));
    assert!(checker.is_subtype(&t_type, &t_type));
}

#[test]
fn test_equal_types_with_correspondence() {
    let mut f = fixture();
    let any = f.builtins.any_type();
    let c = class(&mut f, "C", vec![any]);
    let t = f
        .arena
        .alloc_type_parameter(c, f.interner.intern("T"), NodeIndex::NONE, 0);
    let u = f
        .arena
        .alloc_type_parameter(c, f.interner.intern("U"), NodeIndex::NONE, 0);
    let checker = TypeChecker::new(&f.arena, &f.builtins);
    let mut correspondence = TypeParameterCorrespondence::default();
    let left = f.builtins.array_of(JetType::type_parameter(t));
    let right = f.builtins.array_of(JetType::type_parameter(u));
    assert!(!checker.equal_types(&left, &right, &correspondence));
    correspondence.insert(t, u);
    assert!(checker.equal_types(&left, &right, &correspondence));
    assert!(!checker.equal_types(&left, &right.make_nullable(), &correspondence));
}
