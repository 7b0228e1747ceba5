//! Declaration descriptors for the jetc frontend.
//!
//! This crate provides the semantic symbol graph:
//! - `DescriptorArena` / `DescriptorId` - descriptor storage and identity
//! - Class data with set-once header fields and a post-lock freeze
//! - `JetType` and `TypeChecker` (equality and nominal subtyping)
//! - `TypeSubstitutor`, descriptor substitution and callable copying
//! - Builtin classifiers and a Kotlin-like `DescriptorRenderer`
//! - `InternalError`, the fatal error type shared by every mutating API

pub mod arena;
pub use arena::DescriptorArena;

pub mod builtins;
pub use builtins::Builtins;

pub mod class;
pub use class::{CompanionStatus, MemberKind};

pub mod descriptor;
pub use descriptor::*;

pub mod error;
pub use error::InternalError;

pub mod renderer;
pub use renderer::DescriptorRenderer;

pub mod substitution;
pub use substitution::{CopyParams, TypeSubstitutor};

pub mod types;
pub use types::{JetType, TypeChecker, TypeParameterCorrespondence};

pub mod visibility;
pub use visibility::{CallableKind, Modality, Visibility};

#[cfg(test)]
#[path = "../tests/class_data_tests.rs"]
mod class_data_tests;

#[cfg(test)]
#[path = "../tests/substitution_tests.rs"]
mod substitution_tests;

#[cfg(test)]
#[path = "../tests/type_checker_tests.rs"]
mod type_checker_tests;

#[cfg(test)]
#[path = "../tests/builtins_tests.rs"]
mod builtins_tests;

#[cfg(test)]
#[path = "../tests/visibility_tests.rs"]
mod visibility_tests;
