use super::*;
use jetc_common::Atom;
use jetc_descriptors::{DescriptorId, InternalError};

const OWNER: DescriptorId = DescriptorId(0);

fn atom(n: u32) -> Atom {
    Atom(100 + n)
}

fn d(n: u32) -> DescriptorId {
    DescriptorId(10 + n)
}

#[test]
fn test_new_scope_accepts_reads_and_writes() {
    let mut arena = ScopeArena::new();
    let scope = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "test");
    assert_eq!(arena.lock_level(scope), Some(LockLevel::Both));

    arena.add_classifier(scope, atom(1), d(1)).unwrap();
    assert_eq!(arena.get_classifier(scope, atom(1)), Some(d(1)));
}

#[test]
fn test_add_after_lock_is_rejected() {
    let mut arena = ScopeArena::new();
    let scope = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "test");
    arena.add_function(scope, atom(1), d(1)).unwrap();
    arena.lock(scope).unwrap();

    let err = arena.add_function(scope, atom(1), d(2)).unwrap_err();
    assert!(matches!(err, InternalError::ScopeLocked { .. }));
    assert_eq!(
        arena.get_functions(scope, atom(1)),
        vec![d(1)],
        "rejected add must not change the scope"
    );
    assert!(matches!(
        arena.set_implicit_receiver(scope, d(3)),
        Err(InternalError::ScopeLocked { .. })
    ));
}

#[test]
fn test_reading_is_terminal() {
    let mut arena = ScopeArena::new();
    let scope = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "test");
    arena.change_lock_level(scope, LockLevel::Both).unwrap();
    arena.lock(scope).unwrap();
    arena.lock(scope).unwrap();

    assert_eq!(
        arena.change_lock_level(scope, LockLevel::Both),
        Err(InternalError::IllegalLockTransition {
            scope: scope.0,
            from: "READING",
            to: "BOTH",
        })
    );
    assert_eq!(arena.lock_level(scope), Some(LockLevel::Reading));
}

#[test]
fn test_writing_only_still_accepts_adds() {
    let mut arena = ScopeArena::new();
    let scope = arena.new_writing_only_scope(None, OWNER, RedeclarationPolicy::Ignore, "test");
    assert_eq!(arena.lock_level(scope), Some(LockLevel::WritingOnly));
    arena.add_variable(scope, atom(1), d(1)).unwrap();
    assert_eq!(arena.get_variable(scope, atom(1)), Some(d(1)));
    arena.lock(scope).unwrap();
    assert_eq!(arena.lock_level(scope), Some(LockLevel::Reading));
}

#[test]
fn test_writable_levels_only_move_to_reading() {
    let mut arena = ScopeArena::new();
    let both = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "both");
    assert_eq!(
        arena.change_lock_level(both, LockLevel::WritingOnly),
        Err(InternalError::IllegalLockTransition {
            scope: both.0,
            from: "BOTH",
            to: "WRITING_ONLY",
        })
    );
    assert_eq!(arena.lock_level(both), Some(LockLevel::Both));

    let writing = arena.new_writing_only_scope(None, OWNER, RedeclarationPolicy::Ignore, "writing");
    assert_eq!(
        arena.change_lock_level(writing, LockLevel::Both),
        Err(InternalError::IllegalLockTransition {
            scope: writing.0,
            from: "WRITING_ONLY",
            to: "BOTH",
        })
    );
    assert_eq!(arena.lock_level(writing), Some(LockLevel::WritingOnly));
}

#[test]
fn test_reading_scope_is_locked_from_construction() {
    let mut arena = ScopeArena::new();
    let contents = ScopeContents {
        classifiers: vec![(atom(1), d(1))],
        functions: vec![(atom(2), d(2)), (atom(2), d(3))],
        properties: Vec::new(),
    };
    let scope = arena.new_reading_scope(None, OWNER, "library", contents);

    assert_eq!(arena.lock_level(scope), Some(LockLevel::Reading));
    assert_eq!(arena.get_classifier(scope, atom(1)), Some(d(1)));
    assert_eq!(arena.get_functions(scope, atom(2)), vec![d(2), d(3)]);
    assert!(arena.add_classifier(scope, atom(4), d(4)).is_err());
}

#[test]
fn test_inner_scope_shadows_parent() {
    let mut arena = ScopeArena::new();
    let outer = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "outer");
    let inner = arena.new_scope(Some(outer), OWNER, RedeclarationPolicy::Ignore, "inner");
    arena.add_variable(outer, atom(1), d(1)).unwrap();
    arena.add_variable(inner, atom(1), d(2)).unwrap();
    arena.add_variable(outer, atom(2), d(3)).unwrap();

    assert_eq!(arena.get_variable(inner, atom(1)), Some(d(2)));
    assert_eq!(arena.get_variable(inner, atom(2)), Some(d(3)));
    assert_eq!(arena.get_variable(outer, atom(1)), Some(d(1)));
    assert_eq!(arena.chain(inner).collect::<Vec<_>>(), vec![inner, outer]);
}

#[test]
fn test_overloads_collected_innermost_first() {
    let mut arena = ScopeArena::new();
    let outer = arena.new_scope(None, OWNER, RedeclarationPolicy::Report, "outer");
    let inner = arena.new_scope(Some(outer), OWNER, RedeclarationPolicy::Report, "inner");
    arena.add_function(outer, atom(1), d(1)).unwrap();
    arena.add_function(inner, atom(1), d(2)).unwrap();
    arena.add_function(inner, atom(1), d(3)).unwrap();

    assert_eq!(arena.get_functions(inner, atom(1)), vec![d(2), d(3), d(1)]);
    assert!(
        arena.redeclarations().is_empty(),
        "overloads are not redeclarations"
    );
}

#[test]
fn test_imported_scope_is_searched_but_not_its_parent() {
    let mut arena = ScopeArena::new();
    let hidden = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "hidden");
    let imported = arena.new_scope(Some(hidden), OWNER, RedeclarationPolicy::Ignore, "static");
    let scope = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "members");
    arena.add_classifier(hidden, atom(1), d(1)).unwrap();
    arena.add_classifier(imported, atom(2), d(2)).unwrap();
    arena.import_scope(scope, imported).unwrap();

    assert_eq!(arena.get_classifier(scope, atom(2)), Some(d(2)));
    assert_eq!(arena.get_classifier(scope, atom(1)), None);
    assert_eq!(
        arena.import_scope(scope, ScopeId(99)),
        Err(InternalError::UnknownScope { scope: 99 })
    );
}

#[test]
fn test_redeclaration_recorded_only_when_reporting() {
    let mut arena = ScopeArena::new();
    let quiet = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "quiet");
    let loud = arena.new_scope(None, OWNER, RedeclarationPolicy::Report, "loud");
    for scope in [quiet, loud] {
        arena.add_classifier(scope, atom(1), d(1)).unwrap();
        arena.add_classifier(scope, atom(1), d(2)).unwrap();
        assert_eq!(arena.get_classifier(scope, atom(1)), Some(d(1)), "first wins");
    }

    assert_eq!(
        arena.redeclarations(),
        &[Redeclaration {
            scope: loud,
            name: atom(1),
            first: d(1),
            second: d(2),
        }]
    );
    assert_eq!(arena.take_redeclarations().len(), 1);
    assert!(arena.redeclarations().is_empty());
}

#[test]
fn test_re_adding_same_descriptor_is_not_a_redeclaration() {
    let mut arena = ScopeArena::new();
    let scope = arena.new_scope(None, OWNER, RedeclarationPolicy::Report, "scope");
    arena.add_variable(scope, atom(1), d(1)).unwrap();
    arena.add_variable(scope, atom(1), d(1)).unwrap();
    assert!(arena.redeclarations().is_empty());
}

#[test]
fn test_labels_are_not_in_all_descriptors() {
    let mut arena = ScopeArena::new();
    let outer = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "outer");
    let inner = arena.new_scope(Some(outer), OWNER, RedeclarationPolicy::Ignore, "inner");
    arena.add_labeled_declaration(inner, atom(9), d(9)).unwrap();
    arena.add_property(inner, atom(1), d(1)).unwrap();
    arena.add_classifier(outer, atom(2), d(2)).unwrap();
    arena.add_function(outer, atom(3), d(1)).unwrap();

    assert_eq!(arena.get_declarations_by_label(inner, atom(9)), vec![d(9)]);
    assert_eq!(arena.get_all_descriptors(inner), vec![d(1), d(2)]);
}

#[test]
fn test_local_callables_ignore_parents() {
    let mut arena = ScopeArena::new();
    let outer = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "outer");
    let inner = arena.new_scope(Some(outer), OWNER, RedeclarationPolicy::Ignore, "inner");
    arena.add_function(outer, atom(1), d(1)).unwrap();
    arena.add_function(inner, atom(1), d(2)).unwrap();
    arena.add_property(inner, atom(1), d(3)).unwrap();
    arena.add_variable(inner, atom(1), d(4)).unwrap();

    assert_eq!(arena.get_local_callables(inner, atom(1)), vec![d(2), d(3), d(4)]);
}

#[test]
fn test_implicit_receivers_innermost_first() {
    let mut arena = ScopeArena::new();
    let outer = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "outer");
    let middle = arena.new_scope(Some(outer), OWNER, RedeclarationPolicy::Ignore, "middle");
    let inner = arena.new_scope(Some(middle), OWNER, RedeclarationPolicy::Ignore, "inner");
    arena.set_implicit_receiver(outer, d(1)).unwrap();
    arena.set_implicit_receiver(inner, d(2)).unwrap();

    assert_eq!(arena.get_implicit_receivers_hierarchy(inner), vec![d(2), d(1)]);
    assert_eq!(arena.get(inner).unwrap().implicit_receiver(), Some(d(2)));
}

#[test]
fn test_freeze_requires_every_scope_locked() {
    let mut arena = ScopeArena::new();
    let a = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "a");
    let b = arena.new_scope(None, OWNER, RedeclarationPolicy::Ignore, "b");
    arena.add_variable(b, atom(1), d(1)).unwrap();
    arena.lock(a).unwrap();
    assert_eq!(
        arena.clone().freeze().unwrap_err(),
        InternalError::UnlockedScope { scope: b.0 }
    );

    arena.lock(b).unwrap();
    let frozen = arena.freeze().unwrap();
    assert_eq!(frozen.get_variable(b, atom(1)), Some(d(1)));
    assert_eq!(frozen.len(), 2);
}
