//! Common types and utilities for the jetc frontend.
//!
//! This crate provides foundational types used across all jetc crates:
//! - Name interning (`Atom`, `Interner`)
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `DiagnosticReporter`, `DiagnosticCollector`)
//! - Centralized limits

// Name interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Source-level diagnostics and the reporter seam
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticCollector, DiagnosticReporter, diagnostic_codes,
    format_message,
};

// Centralized limits and thresholds
pub mod limits;

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
