use super::*;
use jetc_common::Atom;
use jetc_descriptors::{
    CallableData, ConstructorData, DescriptorData, DescriptorId, InternalError, JetType,
    MemberKind, Modality, Visibility,
};
use jetc_syntax::{ClassKind, NodeArena, NodeIndex};

fn header(name: Atom, kind: ClassKind) -> ClassHeader {
    ClassHeader {
        name,
        source: NodeIndex::NONE,
        kind,
        is_inner: false,
        modality: Modality::Final,
        visibility: Visibility::Public,
    }
}

fn names(syntax: &mut NodeArena, names: &[&str]) -> Vec<Atom> {
    names.iter().map(|name| syntax.intern(name)).collect()
}

fn new_class(state: &mut BinderState<'_>, name: Atom, kind: ClassKind) -> DescriptorId {
    let root = state.root_package;
    let file = state.file_scope;
    state.create_class(root, file, header(name, kind)).unwrap()
}

fn constructor(state: &mut BinderState<'_>, class: DescriptorId, init: Atom) -> DescriptorId {
    state.descriptors.alloc(
        Some(class),
        Vec::new(),
        init,
        NodeIndex::NONE,
        DescriptorData::Constructor(ConstructorData {
            is_primary: true,
            visibility: Visibility::Public,
            value_parameters: Vec::new(),
            return_type: JetType::class(class),
        }),
    )
}

fn function(state: &mut BinderState<'_>, owner: DescriptorId, name: Atom) -> DescriptorId {
    state.descriptors.alloc(
        Some(owner),
        Vec::new(),
        name,
        NodeIndex::NONE,
        DescriptorData::Function(CallableData::new(
            JetType::Error,
            Modality::Final,
            Visibility::Public,
        )),
    )
}

#[test]
fn test_create_class_wires_scope_chain() {
    let mut syntax = NodeArena::new();
    let [a] = names(&mut syntax, &["A"])[..] else { unreachable!() };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let class = new_class(&mut state, a, ClassKind::Class);
    let scopes = state.class_scopes(class).unwrap();

    let member = state.scopes.get(scopes.member_resolution).unwrap();
    assert_eq!(member.parent(), Some(scopes.supertype_resolution));
    assert_eq!(member.implicit_receiver(), Some(class));
    assert_eq!(member.imports(), &[scopes.static_scope]);
    assert_eq!(
        state.scopes.get(scopes.supertype_resolution).unwrap().parent(),
        Some(state.file_scope)
    );
    assert_eq!(state.scopes.get(scopes.member_lookup).unwrap().parent(), None);
    assert_eq!(state.scopes.get(scopes.static_scope).unwrap().parent(), None);
    assert_eq!(
        state.scopes.get_declarations_by_label(scopes.member_resolution, a),
        vec![class]
    );
    assert_eq!(scopes.initializer, None);
    assert_eq!(state.classes, vec![class]);
}

#[test]
fn test_interface_gets_initializer_scope_eagerly() {
    let mut syntax = NodeArena::new();
    let [i] = names(&mut syntax, &["I"])[..] else { unreachable!() };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let class = new_class(&mut state, i, ClassKind::Interface);
    let scopes = state.class_scopes(class).unwrap();
    let initializer = scopes.initializer.expect("interface initializer scope");
    assert_eq!(
        state.scopes.get(initializer).unwrap().parent(),
        Some(scopes.member_resolution)
    );
}

#[test]
fn test_type_parameters_set_once_and_supertype_scope_locked() {
    let mut syntax = NodeArena::new();
    let [c, t] = names(&mut syntax, &["C", "T"])[..] else { unreachable!() };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let class = new_class(&mut state, c, ClassKind::Class);
    let parameter = state
        .descriptors
        .alloc_type_parameter(class, t, NodeIndex::NONE, 0);

    state.set_class_type_parameters(class, vec![parameter]).unwrap();
    let scopes = state.class_scopes(class).unwrap();
    assert_eq!(state.scopes.get_classifier(scopes.member_resolution, t), Some(parameter));
    assert_eq!(
        state.scopes.lock_level(scopes.supertype_resolution),
        Some(LockLevel::Reading)
    );
    assert_eq!(
        state.set_class_type_parameters(class, Vec::new()),
        Err(InternalError::TypeParametersAlreadySet { class })
    );
}

#[test]
fn test_error_supertype_is_not_added() {
    let mut syntax = NodeArena::new();
    let [b, c] = names(&mut syntax, &["B", "C"])[..] else { unreachable!() };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let base = new_class(&mut state, b, ClassKind::Class);
    let class = new_class(&mut state, c, ClassKind::Class);

    assert!(!state.add_class_supertype(class, JetType::Error).unwrap());
    assert!(state.add_class_supertype(class, JetType::class(base)).unwrap());
    assert_eq!(state.descriptors.supertypes(class), &[JetType::class(base)]);
}

#[test]
fn test_primary_constructor_allocates_initializer_once() {
    let mut syntax = NodeArena::new();
    let [c, init] = names(&mut syntax, &["C", "<init>"])[..] else { unreachable!() };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let class = new_class(&mut state, c, ClassKind::Class);
    let first = constructor(&mut state, class, init);
    let second = constructor(&mut state, class, init);

    let initializer = state.set_class_primary_constructor(class, first).unwrap();
    let scopes = state.class_scopes(class).unwrap();
    assert_eq!(scopes.initializer, Some(initializer));
    assert_eq!(scopes.initializer_or_members(), initializer);
    assert_eq!(
        state.set_class_primary_constructor(class, second),
        Err(InternalError::PrimaryConstructorAlreadySet { class })
    );
    assert_eq!(
        state.descriptors.class(class).unwrap().primary_constructor(),
        Some(first)
    );
}

#[test]
fn test_members_registered_in_lookup_and_resolution_scopes() {
    let mut syntax = NodeArena::new();
    let [c, f] = names(&mut syntax, &["C", "f"])[..] else { unreachable!() };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let class = new_class(&mut state, c, ClassKind::Class);
    let member = function(&mut state, class, f);

    state.add_class_member(class, member, MemberKind::Function).unwrap();
    let scopes = state.class_scopes(class).unwrap();
    assert_eq!(state.scopes.get_functions(scopes.member_lookup, f), vec![member]);
    assert_eq!(state.scopes.get_functions(scopes.member_resolution, f), vec![member]);
    assert_eq!(state.descriptors.class(class).unwrap().declared_callables(), &[member]);
}

#[test]
fn test_nested_class_visibility_depends_on_inner() {
    let mut syntax = NodeArena::new();
    let [o, n, i] = names(&mut syntax, &["Outer", "Nested", "Inner"])[..] else {
        unreachable!()
    };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let outer = new_class(&mut state, o, ClassKind::Class);
    let member_resolution = state.class_scopes(outer).unwrap().member_resolution;
    let nested = state
        .create_class(outer, member_resolution, header(n, ClassKind::Class))
        .unwrap();
    let inner = state
        .create_class(
            outer,
            member_resolution,
            ClassHeader {
                is_inner: true,
                ..header(i, ClassKind::Class)
            },
        )
        .unwrap();
    state.add_class_classifier(outer, nested).unwrap();
    state.add_class_classifier(outer, inner).unwrap();

    let scopes = state.class_scopes(outer).unwrap();
    assert_eq!(state.scopes.get_classifier(scopes.static_scope, n), Some(nested));
    assert_eq!(state.scopes.get_classifier(scopes.static_scope, i), None);
    assert_eq!(state.scopes.get_classifier(scopes.member_lookup, i), Some(inner));
    assert_eq!(
        state.descriptors.class(outer).unwrap().nested_classes(),
        &[nested, inner]
    );
}

#[test]
fn test_lock_class_scopes_once() {
    let mut syntax = NodeArena::new();
    let [c, f] = names(&mut syntax, &["C", "f"])[..] else { unreachable!() };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let class = new_class(&mut state, c, ClassKind::Class);
    let member = function(&mut state, class, f);

    state.lock_class_scopes(class).unwrap();
    let scopes = state.class_scopes(class).unwrap();
    for scope in scopes.all() {
        assert_eq!(state.scopes.lock_level(scope), Some(LockLevel::Reading));
    }
    assert!(matches!(
        state.add_class_member(class, member, MemberKind::Function),
        Err(InternalError::ClassLocked { .. })
    ));
    assert_eq!(
        state.lock_class_scopes(class),
        Err(InternalError::ScopesAlreadyLocked { class })
    );
}

#[test]
fn test_companion_locked_with_owner() {
    let mut syntax = NodeArena::new();
    let [c, companion_name, other] = names(&mut syntax, &["C", "Companion", "Other"])[..] else {
        unreachable!()
    };
    let mut state = BinderState::new(&syntax, "test.kt", BinderOptions::default()).unwrap();
    let class = new_class(&mut state, c, ClassKind::Class);
    let member_resolution = state.class_scopes(class).unwrap().member_resolution;
    let companion = state
        .create_class(class, member_resolution, header(companion_name, ClassKind::Object))
        .unwrap();
    let second = state
        .create_class(class, member_resolution, header(other, ClassKind::Object))
        .unwrap();

    assert_eq!(
        state.set_class_companion(class, companion).unwrap(),
        jetc_descriptors::CompanionStatus::Ok
    );
    assert_eq!(
        state.set_class_companion(class, second).unwrap(),
        jetc_descriptors::CompanionStatus::Duplicate
    );
    assert!(state.descriptors.class(companion).unwrap().is_companion);
    assert!(!state.descriptors.class(second).unwrap().is_companion);

    state.lock_class_scopes(class).unwrap();
    assert!(state.descriptors.class(companion).unwrap().is_locked());
    assert!(!state.descriptors.class(second).unwrap().is_locked());
}
