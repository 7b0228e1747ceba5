//! Shared fixtures for the resolve tests.

use jetc_common::DiagnosticCollector;
use jetc_syntax::{Modifiers, NodeArena, NodeIndex};

use crate::{AnalyzerOptions, ResolvedProgram, TopDownAnalyzer};

pub(crate) fn analyze(syntax: &NodeArena, file: NodeIndex) -> (ResolvedProgram, DiagnosticCollector) {
    analyze_with(syntax, file, AnalyzerOptions::default())
}

pub(crate) fn analyze_with(
    syntax: &NodeArena,
    file: NodeIndex,
    options: AnalyzerOptions,
) -> (ResolvedProgram, DiagnosticCollector) {
    let mut diagnostics = DiagnosticCollector::new();
    let program = TopDownAnalyzer::analyze(syntax, file, &options, &mut diagnostics).unwrap();
    (program, diagnostics)
}

/// `fun name(): returns` with the given modifiers and no parameters.
pub(crate) fn member_function(syntax: &mut NodeArena, name: &str, returns: &str, modifiers: Modifiers) -> NodeIndex {
    let return_type = syntax.type_ref(returns);
    syntax
        .function(name)
        .modifiers(modifiers)
        .returns(return_type)
        .finish()
}

/// `open class name : supertypes() { members }`.
pub(crate) fn open_class(
    syntax: &mut NodeArena,
    name: &str,
    supertypes: &[&str],
    members: Vec<NodeIndex>,
) -> NodeIndex {
    let entries: Vec<NodeIndex> = supertypes
        .iter()
        .map(|supertype| {
            let type_ref = syntax.type_ref(supertype);
            syntax.supertype(type_ref)
        })
        .collect();
    let mut builder = syntax.class(name).modifiers(Modifiers::OPEN).members(members);
    for entry in entries {
        builder = builder.supertype(entry);
    }
    builder.finish()
}

pub(crate) fn codes(diagnostics: &DiagnosticCollector) -> Vec<u32> {
    diagnostics.diagnostics().iter().map(|d| d.code).collect()
}
