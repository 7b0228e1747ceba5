//! Centralized limits and thresholds for the jetc frontend.
//!
//! Analysis walks parent chains and supertype graphs that are finite by
//! construction, but a corrupted graph (a scope accidentally parented to
//! itself, a supertype loop that escaped hierarchy validation) would hang
//! the compiler. These bounds turn that into a bail-out instead.

// =============================================================================
// Traversal Limits
// =============================================================================

/// Maximum number of parent links followed by a single scope lookup.
///
/// Real scope chains are a handful of levels deep (builtins, file, class
/// header, class members, initializer, function body, nested blocks).
pub const MAX_SCOPE_CHAIN_DEPTH: usize = 256;

/// Maximum depth when walking the resolved supertype graph.
///
/// Used by subtype checks and the supertype-first class ordering. Cycles are
/// removed by hierarchy validation before these walks happen.
pub const MAX_SUPERTYPE_DEPTH: usize = 512;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Initial capacity of a descriptor arena. Builtins alone take ~40 slots.
pub const DESCRIPTOR_ARENA_CAPACITY: usize = 128;

/// Initial capacity of a scope arena.
pub const SCOPE_ARENA_CAPACITY: usize = 64;
