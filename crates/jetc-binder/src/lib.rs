//! Scope chain and declaration binding for the jetc frontend.
//!
//! This crate provides:
//! - `ScopeArena` - writable scopes with a one-way lock protocol
//! - `BinderState` - class descriptor builder and the binding phases
//! - `ClassScopes` - the scopes a class owns and how they chain

pub mod scope;
pub use scope::{
    FrozenScopes, LockLevel, Redeclaration, RedeclarationPolicy, ScopeArena, ScopeChain,
    ScopeContents, ScopeId, WritableScope,
};

pub mod class_scopes;
pub use class_scopes::ClassScopes;

pub mod state;
pub use state::{BinderOptions, BinderState, SupertypeRef};

mod state_bodies;
mod state_class_builder;
pub use state_class_builder::ClassHeader;
mod state_declarations;
mod state_members;
mod state_types;

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod scope_tests;

#[cfg(test)]
#[path = "../tests/class_builder_tests.rs"]
mod class_builder_tests;

#[cfg(test)]
#[path = "../tests/binding_tests.rs"]
mod binding_tests;
