use super::*;
use jetc_common::Interner;
use jetc_syntax::{ClassKind, NodeIndex};

fn setup() -> (DescriptorArena, Interner, DescriptorId) {
    let mut interner = Interner::new();
    let mut arena = DescriptorArena::new();
    let root = arena.alloc_module(interner.intern("<root>"));
    (arena, interner, root)
}

fn class(arena: &mut DescriptorArena, interner: &mut Interner, root: DescriptorId, name: &str, kind: ClassKind) -> DescriptorId {
    arena.reserve_class(
        root,
        interner.intern(name),
        NodeIndex::NONE,
        kind,
        false,
        Modality::Final,
        Visibility::Public,
    )
}

#[test]
fn test_type_parameters_set_at_most_once() {
    let (mut arena, mut interner, root) = setup();
    let c = class(&mut arena, &mut interner, root, "C", ClassKind::Class);
    let t = arena.alloc_type_parameter(c, interner.intern("T"), NodeIndex::NONE, 0);
    let u = arena.alloc_type_parameter(c, interner.intern("U"), NodeIndex::NONE, 0);

    arena.class_mut(c).unwrap().set_type_parameters(c, vec![t]).unwrap();
    let err = arena
        .class_mut(c)
        .unwrap()
        .set_type_parameters(c, vec![u])
        .unwrap_err();
    assert_eq!(err, InternalError::TypeParametersAlreadySet { class: c });
    assert_eq!(
        arena.class(c).unwrap().type_parameters(),
        &[t],
        "first call's parameters must be preserved"
    );
}

#[test]
fn test_primary_constructor_set_at_most_once() {
    let (mut arena, mut interner, root) = setup();
    let c = class(&mut arena, &mut interner, root, "C", ClassKind::Class);
    let init = interner.intern("<init>");
    let ctor = |arena: &mut DescriptorArena| {
        arena.alloc(
            Some(c),
            Vec::new(),
            init,
            NodeIndex::NONE,
            DescriptorData::Constructor(ConstructorData {
                is_primary: true,
                visibility: Visibility::Public,
                value_parameters: Vec::new(),
                return_type: JetType::class(c),
            }),
        )
    };
    let first = ctor(&mut arena);
    let second = ctor(&mut arena);
    arena.class_mut(c).unwrap().set_primary_constructor(c, first).unwrap();
    assert_eq!(
        arena.class_mut(c).unwrap().set_primary_constructor(c, second),
        Err(InternalError::PrimaryConstructorAlreadySet { class: c })
    );
    assert_eq!(arena.class(c).unwrap().primary_constructor(), Some(first));
}

#[test]
fn test_error_supertype_is_skipped() {
    let (mut arena, mut interner, root) = setup();
    let base = class(&mut arena, &mut interner, root, "Base", ClassKind::Class);
    let c = class(&mut arena, &mut interner, root, "C", ClassKind::Class);
    let data = arena.class_mut(c).unwrap();
    assert!(!data.add_supertype(c, JetType::Error).unwrap());
    assert!(data.add_supertype(c, JetType::class(base)).unwrap());
    assert_eq!(data.supertypes(), &[JetType::class(base)]);
}

#[test]
fn test_locked_class_rejects_mutation() {
    let (mut arena, mut interner, root) = setup();
    let base = class(&mut arena, &mut interner, root, "Base", ClassKind::Class);
    let c = class(&mut arena, &mut interner, root, "C", ClassKind::Class);
    let data = arena.class_mut(c).unwrap();
    data.lock(c).unwrap();
    assert!(data.is_locked());
    assert!(matches!(
        data.add_supertype(c, JetType::class(base)),
        Err(InternalError::ClassLocked { .. })
    ));
    assert!(matches!(
        data.set_type_parameters(c, Vec::new()),
        Err(InternalError::ClassLocked { .. })
    ));
    assert_eq!(
        data.lock(c),
        Err(InternalError::ScopesAlreadyLocked { class: c })
    );
}

#[test]
fn test_companion_status() {
    let (mut arena, mut interner, root) = setup();
    let c = class(&mut arena, &mut interner, root, "C", ClassKind::Class);
    let first = class(&mut arena, &mut interner, c, "Companion", ClassKind::Object);
    let second = class(&mut arena, &mut interner, c, "Other", ClassKind::Object);
    let o = class(&mut arena, &mut interner, root, "O", ClassKind::Object);

    let data = arena.class_mut(c).unwrap();
    assert_eq!(data.set_companion(c, first).unwrap(), CompanionStatus::Ok);
    assert_eq!(data.set_companion(c, second).unwrap(), CompanionStatus::Duplicate);
    assert_eq!(data.companion(), Some(first));

    let object = arena.class_mut(o).unwrap();
    assert_eq!(object.set_companion(o, second).unwrap(), CompanionStatus::NotAllowed);
    assert_eq!(object.companion(), None);
}

#[test]
fn test_fake_overrides_are_indexed_but_not_declared() {
    let (mut arena, mut interner, root) = setup();
    let c = class(&mut arena, &mut interner, root, "C", ClassKind::Class);
    let f = interner.intern("f");
    let make = |arena: &mut DescriptorArena| {
        arena.alloc(
            Some(c),
            Vec::new(),
            f,
            NodeIndex::NONE,
            DescriptorData::Function(CallableData::new(
                JetType::Error,
                Modality::Final,
                Visibility::Public,
            )),
        )
    };
    let declared = make(&mut arena);
    let fake = make(&mut arena);
    let data = arena.class_mut(c).unwrap();
    data.add_declared_callable(c, declared, f, MemberKind::Function)
        .unwrap();
    data.add_fake_override(c, fake, f, MemberKind::Function).unwrap();

    assert_eq!(data.declared_callables(), &[declared]);
    assert_eq!(data.all_callables(), &[declared, fake]);
    assert_eq!(data.functions(f), &[declared, fake]);
    assert!(data.properties(f).is_empty());
}

#[test]
fn test_containing_class_skips_callables() {
    let (mut arena, mut interner, root) = setup();
    let c = class(&mut arena, &mut interner, root, "C", ClassKind::Class);
    let f = arena.alloc(
        Some(c),
        Vec::new(),
        interner.intern("f"),
        NodeIndex::NONE,
        DescriptorData::Function(CallableData::new(
            JetType::Error,
            Modality::Final,
            Visibility::Public,
        )),
    );
    let x = arena.alloc_value_parameter(
        f,
        interner.intern("x"),
        NodeIndex::NONE,
        ValueParameterData {
            index: 0,
            ty: JetType::Error,
            has_default: false,
            is_vararg: false,
        },
    );
    assert_eq!(arena.containing_class(x), Some(c));
    assert_eq!(arena.containing_class(c), None);
    assert_eq!(arena.containing(root), None);
}
