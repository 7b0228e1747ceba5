//! The frozen result of one analyzer run.

use jetc_binder::{BinderState, ClassScopes, FrozenScopes, ScopeArena, ScopeId};
use jetc_common::{Atom, Interner};
use jetc_descriptors::{Builtins, DescriptorArena, DescriptorId, DescriptorRenderer, InternalError, JetType};
use jetc_syntax::NodeIndex;
use rustc_hash::FxHashMap;

use crate::calls::{Call, CandidateCollector, CandidateGroup, CollectedCalls};

/// Descriptors, scopes and calls of an analyzed file.
///
/// Every scope is in the `Reading` lock level and nothing here can be
/// mutated, so a program can be shared across threads and queried
/// concurrently.
#[derive(Clone, Debug)]
pub struct ResolvedProgram {
    file_name: String,
    interner: Interner,
    descriptors: DescriptorArena,
    scopes: FrozenScopes,
    builtins: Builtins,
    root_package: DescriptorId,
    file_scope: ScopeId,
    classes: Vec<DescriptorId>,
    class_scopes: FxHashMap<DescriptorId, ClassScopes>,
    node_descriptors: FxHashMap<NodeIndex, DescriptorId>,
    expression_scopes: FxHashMap<NodeIndex, ScopeId>,
    calls: FxHashMap<NodeIndex, Call>,
    expression_types: FxHashMap<NodeIndex, JetType>,
}

impl ResolvedProgram {
    /// Freeze the binder's output. Fails if a scope is still writable.
    pub(crate) fn freeze(state: BinderState<'_>, calls: CollectedCalls) -> Result<Self, InternalError> {
        let file_name = state.file_name().to_string();
        let interner = state.syntax().interner().clone();
        let BinderState {
            descriptors,
            scopes,
            builtins,
            root_package,
            file_scope,
            classes,
            class_scopes,
            node_descriptors,
            expression_scopes,
            ..
        } = state;
        Ok(ResolvedProgram {
            file_name,
            interner,
            descriptors,
            scopes: scopes.freeze()?,
            builtins,
            root_package,
            file_scope,
            classes,
            class_scopes,
            node_descriptors,
            expression_scopes,
            calls: calls.calls,
            expression_types: calls.expression_types,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn descriptors(&self) -> &DescriptorArena {
        &self.descriptors
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn root_package(&self) -> DescriptorId {
        self.root_package
    }

    pub fn file_scope(&self) -> ScopeId {
        self.file_scope
    }

    /// Classes declared in the file, in discovery order.
    pub fn classes(&self) -> &[DescriptorId] {
        &self.classes
    }

    pub fn class_scopes(&self, class: DescriptorId) -> Option<&ClassScopes> {
        self.class_scopes.get(&class)
    }

    // =========================================================================
    // Node <-> descriptor
    // =========================================================================

    /// Descriptor declared by a syntax node.
    pub fn descriptor_for(&self, node: NodeIndex) -> Option<DescriptorId> {
        self.node_descriptors.get(&node).copied()
    }

    /// Syntax node a descriptor was declared by. `None` for builtins and
    /// fake overrides.
    pub fn source_of(&self, descriptor: DescriptorId) -> Option<NodeIndex> {
        self.descriptors.source(descriptor).get()
    }

    /// Scope an expression was bound in.
    pub fn scope_of_expression(&self, node: NodeIndex) -> Option<ScopeId> {
        self.expression_scopes.get(&node).copied()
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Call made at a node (the call expression, selector, operator
    /// expression, indexing expression, assignment or supertype entry).
    pub fn call(&self, node: NodeIndex) -> Option<&Call> {
        self.calls.get(&node)
    }

    /// Every call, ordered by node.
    pub fn calls(&self) -> Vec<(NodeIndex, &Call)> {
        let mut calls: Vec<(NodeIndex, &Call)> = self.calls.iter().map(|(&n, c)| (n, c)).collect();
        calls.sort_unstable_by_key(|(node, _)| *node);
        calls
    }

    /// Best-effort type of an expression; the error type when unknown.
    pub fn expression_type(&self, node: NodeIndex) -> Option<&JetType> {
        self.expression_types.get(&node)
    }

    /// Candidate groups for the call at `node`, in the scope the call was
    /// bound in.
    pub fn candidates(&self, node: NodeIndex) -> Vec<CandidateGroup> {
        let Some(call) = self.calls.get(&node) else {
            return Vec::new();
        };
        let scope = self
            .expression_scopes
            .get(&call.call_element())
            .or_else(|| self.expression_scopes.get(&call.callee()))
            .copied()
            .unwrap_or(self.file_scope);
        CandidateCollector::new(&self.descriptors, &self.scopes, &self.builtins).collect(call, scope)
    }

    // =========================================================================
    // Names and rendering
    // =========================================================================

    pub fn lookup_name(&self, name: &str) -> Option<Atom> {
        self.interner.lookup(name)
    }

    pub fn name_text(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    /// First class declared in the file with this simple name.
    pub fn class_named(&self, name: &str) -> Option<DescriptorId> {
        let atom = self.lookup_name(name)?;
        self.classes
            .iter()
            .copied()
            .find(|&class| self.descriptors.name(class) == atom)
    }

    /// Functions then properties named `name` that `class` has, declared
    /// and inherited.
    pub fn members_named(&self, class: DescriptorId, name: &str) -> Vec<DescriptorId> {
        let (Some(atom), Some(data)) = (self.lookup_name(name), self.descriptors.class(class)) else {
            return Vec::new();
        };
        data.functions(atom)
            .iter()
            .chain(data.properties(atom))
            .copied()
            .collect()
    }

    /// Kotlin-like rendering of a descriptor.
    pub fn render(&self, descriptor: DescriptorId) -> String {
        DescriptorRenderer::new(&self.descriptors, &self.interner).render(descriptor)
    }
}
