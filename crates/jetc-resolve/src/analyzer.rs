//! Top-down analysis of one file.

use jetc_binder::BinderState;
use jetc_common::DiagnosticReporter;
use jetc_descriptors::InternalError;
use jetc_syntax::{NodeArena, NodeIndex};
use tracing::{debug, info};

use crate::calls::CallCollector;
use crate::hierarchy::HierarchyChecker;
use crate::options::AnalyzerOptions;
use crate::override_resolver::OverrideResolver;
use crate::program::ResolvedProgram;

/// Runs the declaration phases in order and freezes the result.
///
/// Source errors are reported and analysis continues; an `InternalError`
/// aborts the run and no program is produced.
pub struct TopDownAnalyzer;

impl TopDownAnalyzer {
    #[tracing::instrument(level = "info", skip_all, fields(file = file.0))]
    pub fn analyze(
        syntax: &NodeArena,
        file: NodeIndex,
        options: &AnalyzerOptions,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<ResolvedProgram, InternalError> {
        let file_name = syntax
            .file_data(file)
            .map(|data| data.name.clone())
            .ok_or(InternalError::MalformedSyntax {
                node: file.0,
                expected: "file",
            })?;
        let mut state = BinderState::new(syntax, file_name, options.to_binder_options())?;

        state.discover_declarations(file, reporter)?;
        state.resolve_headers(reporter)?;
        let order = HierarchyChecker::new(&mut state).check(reporter)?;
        state.bind_members(reporter)?;
        OverrideResolver::new(&mut state, *options).resolve(&order, reporter)?;
        state.lock_declarations()?;
        state.bind_bodies(reporter)?;
        Self::resolve_local_classes(&mut state, options, reporter)?;
        let calls = CallCollector::new(&state).collect()?;
        state.report_redeclarations(reporter);

        debug!(
            classes = state.classes.len(),
            descriptors = state.descriptors.len(),
            calls = calls.calls.len(),
            "analysis phases complete"
        );
        let program = ResolvedProgram::freeze(state, calls)?;
        info!(file = program.file_name(), "analyzed file");
        Ok(program)
    }

    /// Classes declared in bodies get the same hierarchy checks and override
    /// resolution as top-level ones before they are locked. Their bodies may
    /// declare further local classes, hence the loop.
    fn resolve_local_classes(
        state: &mut BinderState<'_>,
        options: &AnalyzerOptions,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        loop {
            let classes = state.take_local_classes();
            if classes.is_empty() {
                return Ok(());
            }
            debug!(classes = classes.len(), "resolving local classes");
            let order = HierarchyChecker::new(state).check_classes(&classes, reporter)?;
            OverrideResolver::new(state, *options).resolve(&order, reporter)?;
            state.finish_local_classes(&classes)?;
            state.bind_bodies(reporter)?;
        }
    }
}
