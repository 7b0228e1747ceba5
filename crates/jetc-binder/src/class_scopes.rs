//! The scopes owned by one class.

use crate::scope::ScopeId;

/// Scopes allocated by the class builder.
///
/// ```text
///   outer scope
///       ^
///   supertype resolution   (type parameters)
///       ^
///   member resolution      (members, nested classes, label, implicit `this`;
///       ^                   imports the static scope)
///   initializer            (primary constructor parameters)
/// ```
///
/// `member_lookup` and `static_scope` have no parent: they are what other
/// code sees when it looks into the class from outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassScopes {
    /// Members as seen through an instance (declared and fake overrides).
    pub member_lookup: ScopeId,
    /// Non-inner nested classes and the companion object.
    pub static_scope: ScopeId,
    pub supertype_resolution: ScopeId,
    pub member_resolution: ScopeId,
    /// Allocated with the primary constructor, or eagerly for interfaces.
    pub initializer: Option<ScopeId>,
}

impl ClassScopes {
    /// Scope property initializers and supertype constructor arguments are
    /// resolved in.
    pub fn initializer_or_members(&self) -> ScopeId {
        self.initializer.unwrap_or(self.member_resolution)
    }

    /// Every scope, in locking order.
    pub fn all(&self) -> impl Iterator<Item = ScopeId> {
        [
            Some(self.member_lookup),
            Some(self.supertype_resolution),
            Some(self.member_resolution),
            Some(self.static_scope),
            self.initializer,
        ]
        .into_iter()
        .flatten()
    }
}
