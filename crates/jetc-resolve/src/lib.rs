//! Resolution phases of the jetc frontend.
//!
//! This crate provides:
//! - `HierarchyChecker` - supertype validation, cycle breaking, class order
//! - `OverridingUtil` / `OverrideResolver` - override binding, fake
//!   overrides, conflicts, visibility inference and override checks
//! - `TopDownAnalyzer` - the phase driver producing a `ResolvedProgram`
//! - `calls` - the `Call` model, its factories and candidate collection

pub mod analyzer;
pub use analyzer::TopDownAnalyzer;

pub mod calls;
pub use calls::{Call, CallMaker, CallType, CandidateGroup, Receiver, ValueArgument};

pub mod hierarchy;
pub use hierarchy::HierarchyChecker;

pub mod options;
pub use options::AnalyzerOptions;

pub mod override_resolver;
pub use override_resolver::OverrideResolver;

pub mod overriding;
pub use overriding::{OverrideCompatibility, OverridingUtil, resolve_overrides_for_name};

pub mod program;
pub use program::ResolvedProgram;

#[cfg(test)]
#[path = "../tests/test_support.rs"]
mod test_support;

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod hierarchy_tests;

#[cfg(test)]
#[path = "../tests/overriding_tests.rs"]
mod overriding_tests;

#[cfg(test)]
#[path = "../tests/override_check_tests.rs"]
mod override_check_tests;

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod options_tests;

#[cfg(test)]
#[path = "../tests/call_tests.rs"]
mod call_tests;

#[cfg(test)]
#[path = "../tests/analyzer_tests.rs"]
mod analyzer_tests;
