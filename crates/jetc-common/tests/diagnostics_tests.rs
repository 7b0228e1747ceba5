use super::*;
use crate::diagnostics::get_message_template;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message("'{0}' inherits conflicting members: {1} and {2}", &["C", "a", "b"]);
    assert_eq!(text, "'C' inherits conflicting members: a and b");
}

#[test]
fn test_every_code_has_a_template() {
    use diagnostic_codes::*;
    for code in [
        REDECLARATION,
        UNRESOLVED_REFERENCE,
        CYCLIC_INHERITANCE_HIERARCHY,
        SUPERTYPE_NOT_A_CLASS,
        FINAL_SUPERTYPE,
        MANY_COMPANION_OBJECTS,
        COMPANION_OBJECT_NOT_ALLOWED,
        CONFLICTING_INHERITED_MEMBERS,
        CANNOT_INFER_VISIBILITY,
        RETURN_TYPE_MISMATCH_ON_OVERRIDE,
        PROPERTY_TYPE_MISMATCH_ON_OVERRIDE,
        VAR_OVERRIDDEN_BY_VAL,
        OVERRIDING_FINAL_MEMBER,
        NOTHING_TO_OVERRIDE,
        VIRTUAL_MEMBER_HIDDEN,
        ABSTRACT_MEMBER_NOT_IMPLEMENTED,
    ] {
        assert!(
            get_message_template(code).is_some(),
            "code {code} has no message template"
        );
    }
}

#[test]
fn test_from_code_uses_span_and_template() {
    let diag = Diagnostic::from_code(
        "a.kt",
        Span::new(10, 14),
        diagnostic_codes::UNRESOLVED_REFERENCE,
        &["Foo"],
    );
    assert_eq!(diag.start, 10);
    assert_eq!(diag.length, 4);
    assert_eq!(diag.message_text, "Unresolved reference: Foo");
    assert!(diag.is_error());
}

#[test]
fn test_collector_accumulates_in_order() {
    let mut collector = DiagnosticCollector::new();
    assert!(collector.is_empty());
    collector.report(Diagnostic::error(
        "a.kt".into(),
        0,
        1,
        "first".into(),
        diagnostic_codes::REDECLARATION,
    ));
    collector.report(Diagnostic::error(
        "a.kt".into(),
        2,
        1,
        "second".into(),
        diagnostic_codes::NOTHING_TO_OVERRIDE,
    ));
    assert_eq!(collector.len(), 2);
    assert!(collector.has_errors());
    assert_eq!(
        collector
            .with_code(diagnostic_codes::NOTHING_TO_OVERRIDE)
            .count(),
        1
    );
    let taken = collector.take_diagnostics();
    assert_eq!(taken[0].message_text, "first");
    assert!(collector.is_empty());
}
