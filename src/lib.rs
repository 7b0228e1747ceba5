//! jetc: declaration descriptors, scope chains and override resolution for a
//! Kotlin-style frontend.
//!
//! The pipeline is split across the workspace crates and re-exported here:
//! - `jetc_syntax` - the syntax tree boundary and its builder API
//! - `jetc_descriptors` - descriptors, types, substitution and builtins
//! - `jetc_binder` - scope chains, class scopes and declaration binding
//! - `jetc_resolve` - hierarchy checks, override resolution, the call model
//!   and the `TopDownAnalyzer` producing a frozen `ResolvedProgram`

pub use jetc_binder as binder;
pub use jetc_common as common;
pub use jetc_descriptors as descriptors;
pub use jetc_resolve as resolve;
pub use jetc_syntax as syntax;

pub use jetc_common::{Atom, Diagnostic, DiagnosticCollector, DiagnosticReporter, Interner, diagnostic_codes};
pub use jetc_descriptors::{DescriptorArena, DescriptorId, InternalError, JetType, Modality, Visibility};
pub use jetc_resolve::{AnalyzerOptions, Call, CallType, ResolvedProgram, TopDownAnalyzer};
pub use jetc_syntax::{Modifiers, NodeArena, NodeIndex};

// Tracing configuration (text / tree / JSON output for debugging)
pub mod tracing_config;
pub use tracing_config::init_tracing;

/// Analyze one file with default options, collecting diagnostics.
pub fn analyze_file(
    syntax: &NodeArena,
    file: NodeIndex,
) -> Result<(ResolvedProgram, DiagnosticCollector), InternalError> {
    let mut diagnostics = DiagnosticCollector::new();
    let program = TopDownAnalyzer::analyze(syntax, file, &AnalyzerOptions::default(), &mut diagnostics)?;
    Ok((program, diagnostics))
}
