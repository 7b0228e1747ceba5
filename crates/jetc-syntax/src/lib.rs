//! Declaration syntax for the jetc frontend.
//!
//! This crate does not parse text. It defines the tree a parser hands to
//! declaration binding: a flat `NodeArena` of declaration and expression
//! nodes addressed by `NodeIndex`, plus builders for constructing trees.

pub mod modifiers;
pub use modifiers::Modifiers;

pub mod node;
pub use node::*;

mod node_access;

pub mod node_arena;
pub use node_arena::{
    CallBuilder, ClassBuilder, FunctionBuilder, ParameterBuilder, PropertyBuilder,
};

#[cfg(test)]
#[path = "../tests/node_arena_tests.rs"]
mod node_arena_tests;
