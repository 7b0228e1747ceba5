//! Internal (programmer) errors.
//!
//! These indicate an ordering bug inside the frontend, never bad user input.
//! Every mutating operation on scopes, class builders and descriptors returns
//! `Result<_, InternalError>`; the analyzer propagates the first one and
//! aborts the invocation. Source errors go through `DiagnosticReporter`
//! instead.

use thiserror::Error;

use crate::DescriptorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// A mutation was attempted on a scope in the `Reading` lock level.
    #[error("cannot {operation} in scope #{scope}: scope is locked for reading")]
    ScopeLocked { scope: u32, operation: &'static str },

    /// A lock level transition the state machine does not allow.
    #[error("illegal lock transition {from} -> {to} in scope #{scope}")]
    IllegalLockTransition {
        scope: u32,
        from: &'static str,
        to: &'static str,
    },

    #[error("scope #{scope} does not exist")]
    UnknownScope { scope: u32 },

    /// A scope arena was frozen while one of its scopes still accepted writes.
    #[error("scope #{scope} is still writable and cannot be frozen")]
    UnlockedScope { scope: u32 },

    #[error("type parameters of class {class:?} are already set")]
    TypeParametersAlreadySet { class: DescriptorId },

    #[error("primary constructor of class {class:?} is already set")]
    PrimaryConstructorAlreadySet { class: DescriptorId },

    #[error("scopes of class {class:?} are already locked")]
    ScopesAlreadyLocked { class: DescriptorId },

    /// A class-level mutation after `lock_scopes`.
    #[error("cannot {operation} on class {class:?}: class scopes are locked")]
    ClassLocked {
        class: DescriptorId,
        operation: &'static str,
    },

    /// Substitution requested for a descriptor kind that has no substitution
    /// semantics.
    #[error("substitution is not supported for {kind} descriptor {descriptor:?}")]
    UnsupportedSubstitution {
        descriptor: DescriptorId,
        kind: &'static str,
    },

    #[error("builtin name `{name}` is not interned")]
    MissingBuiltin { name: &'static str },

    #[error("descriptor {descriptor:?} does not exist")]
    UnknownDescriptor { descriptor: DescriptorId },

    #[error("descriptor {descriptor:?} is a {actual}, expected a {expected}")]
    UnexpectedDescriptorKind {
        descriptor: DescriptorId,
        expected: &'static str,
        actual: &'static str,
    },

    /// The syntax tree does not have the shape binding relies on.
    #[error("malformed syntax at node #{node}: expected {expected}")]
    MalformedSyntax { node: u32, expected: &'static str },
}
