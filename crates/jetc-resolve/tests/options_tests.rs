use super::*;

#[test]
fn test_defaults_enable_everything() {
    let options = AnalyzerOptions::default();
    assert!(options.report_redeclarations);
    assert!(options.report_override_modifier_errors);
    assert!(options.report_abstract_not_implemented);
    assert!(options.implicit_any_supertype);
}

#[test]
fn test_json_uses_camel_case_and_fills_missing_keys() {
    let options =
        AnalyzerOptions::from_json(r#"{"reportRedeclarations": false, "implicitAnySupertype": false}"#).unwrap();
    assert!(!options.report_redeclarations);
    assert!(!options.implicit_any_supertype);
    assert!(options.report_override_modifier_errors);
    assert!(options.report_abstract_not_implemented);

    let binder = options.to_binder_options();
    assert!(!binder.report_redeclarations);
    assert!(!binder.implicit_any_supertype);
}

#[test]
fn test_empty_object_is_default() {
    assert_eq!(AnalyzerOptions::from_json("{}").unwrap(), AnalyzerOptions::default());
}

#[test]
fn test_serializes_camel_case() {
    let json = serde_json::to_string(&AnalyzerOptions::default()).unwrap();
    assert!(json.contains("\"reportAbstractNotImplemented\":true"));
}

#[test]
fn test_rejects_wrong_types() {
    assert!(AnalyzerOptions::from_json(r#"{"reportRedeclarations": "yes"}"#).is_err());
}
