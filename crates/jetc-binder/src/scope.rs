//! Lexical scopes and the scope chain.
//!
//! Scopes live in a `ScopeArena` and point at their parent by `ScopeId`, so
//! several child scopes can share one parent. Each scope carries a lock
//! level: while it is `Both` or `WritingOnly` declarations may be added, once
//! it is `Reading` every add fails with `InternalError::ScopeLocked`.
//! Lookups are available at every lock level.
//!
//! Lookup order for a single scope is: local table, then imported scopes,
//! then the parent. Imported scopes contribute their own tables (and their
//! own imports) but not their parents.

use indexmap::IndexMap;
use jetc_common::Atom;
use jetc_common::limits::{MAX_SCOPE_CHAIN_DEPTH, SCOPE_ARENA_CAPACITY};
use jetc_descriptors::{DescriptorId, InternalError};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::ops::Deref;
use tracing::{trace, warn};

/// Index of a scope in a `ScopeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// Write permission state of a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockLevel {
    Both,
    WritingOnly,
    Reading,
}

impl LockLevel {
    pub fn name(self) -> &'static str {
        match self {
            LockLevel::Both => "BOTH",
            LockLevel::WritingOnly => "WRITING_ONLY",
            LockLevel::Reading => "READING",
        }
    }

    #[inline]
    pub fn allows_writing(self) -> bool {
        !matches!(self, LockLevel::Reading)
    }
}

/// What an add does when the name is already taken in the same scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RedeclarationPolicy {
    /// Keep the first declaration, say nothing.
    #[default]
    Ignore,
    /// Keep the first declaration and record a `Redeclaration`.
    Report,
}

/// A name declared twice in one scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redeclaration {
    pub scope: ScopeId,
    pub name: Atom,
    pub first: DescriptorId,
    pub second: DescriptorId,
}

/// Initial contents of a scope built directly in `Reading`.
#[derive(Clone, Debug, Default)]
pub struct ScopeContents {
    pub classifiers: Vec<(Atom, DescriptorId)>,
    pub functions: Vec<(Atom, DescriptorId)>,
    pub properties: Vec<(Atom, DescriptorId)>,
}

type Overloads = SmallVec<[DescriptorId; 2]>;

#[derive(Clone, Debug)]
pub struct WritableScope {
    debug_name: &'static str,
    owner: DescriptorId,
    parent: Option<ScopeId>,
    lock_level: LockLevel,
    policy: RedeclarationPolicy,
    /// Classes and type parameters.
    classifiers: IndexMap<Atom, DescriptorId>,
    /// Local variables and value parameters.
    variables: IndexMap<Atom, DescriptorId>,
    functions: IndexMap<Atom, Overloads>,
    properties: IndexMap<Atom, Overloads>,
    labels: IndexMap<Atom, Overloads>,
    imports: Vec<ScopeId>,
    implicit_receiver: Option<DescriptorId>,
    /// Everything added, in declaration order.
    declared: Vec<DescriptorId>,
}

impl WritableScope {
    fn new(
        parent: Option<ScopeId>,
        owner: DescriptorId,
        policy: RedeclarationPolicy,
        debug_name: &'static str,
        lock_level: LockLevel,
    ) -> Self {
        WritableScope {
            debug_name,
            owner,
            parent,
            lock_level,
            policy,
            classifiers: IndexMap::new(),
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            properties: IndexMap::new(),
            labels: IndexMap::new(),
            imports: Vec::new(),
            implicit_receiver: None,
            declared: Vec::new(),
        }
    }

    #[inline]
    pub fn debug_name(&self) -> &'static str {
        self.debug_name
    }

    /// The declaration this scope belongs to.
    #[inline]
    pub fn owner(&self) -> DescriptorId {
        self.owner
    }

    #[inline]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[inline]
    pub fn lock_level(&self) -> LockLevel {
        self.lock_level
    }

    #[inline]
    pub fn policy(&self) -> RedeclarationPolicy {
        self.policy
    }

    pub fn imports(&self) -> &[ScopeId] {
        &self.imports
    }

    pub fn implicit_receiver(&self) -> Option<DescriptorId> {
        self.implicit_receiver
    }

    /// Descriptors added to this scope itself, in declaration order.
    pub fn own_descriptors(&self) -> &[DescriptorId] {
        &self.declared
    }
}

/// Tables holding at most one descriptor per name.
#[derive(Clone, Copy)]
enum UniqueTable {
    Classifiers,
    Variables,
}

/// Tables holding overloads.
#[derive(Clone, Copy)]
enum OverloadTable {
    Functions,
    Properties,
    Labels,
    /// Every declared descriptor, regardless of name.
    Declared,
}

impl WritableScope {
    fn unique(&self, table: UniqueTable, name: Atom) -> Option<DescriptorId> {
        match table {
            UniqueTable::Classifiers => self.classifiers.get(&name).copied(),
            UniqueTable::Variables => self.variables.get(&name).copied(),
        }
    }

    fn overloads(&self, table: OverloadTable, name: Atom) -> &[DescriptorId] {
        let map = match table {
            OverloadTable::Functions => &self.functions,
            OverloadTable::Properties => &self.properties,
            OverloadTable::Labels => &self.labels,
            OverloadTable::Declared => return &self.declared,
        };
        map.get(&name).map(|ids| ids.as_slice()).unwrap_or(&[])
    }
}

#[derive(Clone, Debug)]
pub struct ScopeArena {
    scopes: Vec<WritableScope>,
    redeclarations: Vec<Redeclaration>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena {
            scopes: Vec::with_capacity(SCOPE_ARENA_CAPACITY),
            redeclarations: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: ScopeId) -> Option<&WritableScope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.scopes.len() as u32).map(ScopeId)
    }

    // =========================================================================
    // Construction and locking
    // =========================================================================

    /// Allocate a writable scope (`Both`).
    pub fn new_scope(
        &mut self,
        parent: Option<ScopeId>,
        owner: DescriptorId,
        policy: RedeclarationPolicy,
        debug_name: &'static str,
    ) -> ScopeId {
        self.push(WritableScope::new(
            parent,
            owner,
            policy,
            debug_name,
            LockLevel::Both,
        ))
    }

    /// Allocate a scope that only takes declarations until it is locked.
    pub fn new_writing_only_scope(
        &mut self,
        parent: Option<ScopeId>,
        owner: DescriptorId,
        policy: RedeclarationPolicy,
        debug_name: &'static str,
    ) -> ScopeId {
        self.push(WritableScope::new(
            parent,
            owner,
            policy,
            debug_name,
            LockLevel::WritingOnly,
        ))
    }

    /// Allocate a scope that is `Reading` from the start. Used to wrap
    /// declarations that were resolved elsewhere (builtins, libraries).
    pub fn new_reading_scope(
        &mut self,
        parent: Option<ScopeId>,
        owner: DescriptorId,
        debug_name: &'static str,
        contents: ScopeContents,
    ) -> ScopeId {
        let mut scope = WritableScope::new(
            parent,
            owner,
            RedeclarationPolicy::Ignore,
            debug_name,
            LockLevel::Reading,
        );
        for (name, descriptor) in contents.classifiers {
            scope.classifiers.entry(name).or_insert(descriptor);
            scope.declared.push(descriptor);
        }
        for (name, descriptor) in contents.functions {
            scope.functions.entry(name).or_default().push(descriptor);
            scope.declared.push(descriptor);
        }
        for (name, descriptor) in contents.properties {
            scope.properties.entry(name).or_default().push(descriptor);
            scope.declared.push(descriptor);
        }
        self.push(scope)
    }

    fn push(&mut self, scope: WritableScope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        trace!(
            scope = id.0,
            name = scope.debug_name,
            parent = ?scope.parent.map(|p| p.0),
            "new scope"
        );
        self.scopes.push(scope);
        id
    }

    pub fn lock_level(&self, id: ScopeId) -> Option<LockLevel> {
        self.get(id).map(|scope| scope.lock_level)
    }

    /// Move a scope to another lock level.
    ///
    /// The only move is from a writable level to `Reading`. Asking for the
    /// current level is a no-op; anything else is an internal error.
    pub fn change_lock_level(&mut self, id: ScopeId, level: LockLevel) -> Result<(), InternalError> {
        let scope = self
            .scopes
            .get_mut(id.0 as usize)
            .ok_or(InternalError::UnknownScope { scope: id.0 })?;
        if scope.lock_level != level && level != LockLevel::Reading {
            return Err(InternalError::IllegalLockTransition {
                scope: id.0,
                from: scope.lock_level.name(),
                to: level.name(),
            });
        }
        if scope.lock_level != level {
            trace!(scope = id.0, name = scope.debug_name, to = level.name(), "lock level");
        }
        scope.lock_level = level;
        Ok(())
    }

    #[inline]
    pub fn lock(&mut self, id: ScopeId) -> Result<(), InternalError> {
        self.change_lock_level(id, LockLevel::Reading)
    }

    fn writable(
        &mut self,
        id: ScopeId,
        operation: &'static str,
    ) -> Result<&mut WritableScope, InternalError> {
        let scope = self
            .scopes
            .get_mut(id.0 as usize)
            .ok_or(InternalError::UnknownScope { scope: id.0 })?;
        if !scope.lock_level.allows_writing() {
            return Err(InternalError::ScopeLocked {
                scope: id.0,
                operation,
            });
        }
        Ok(scope)
    }

    /// Consume the arena into a read-only handle. Every scope must already
    /// be `Reading`.
    pub fn freeze(self) -> Result<FrozenScopes, InternalError> {
        if let Some((index, _)) = self
            .scopes
            .iter()
            .enumerate()
            .find(|(_, scope)| scope.lock_level.allows_writing())
        {
            return Err(InternalError::UnlockedScope {
                scope: index as u32,
            });
        }
        Ok(FrozenScopes { scopes: self })
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    pub fn add_classifier(
        &mut self,
        id: ScopeId,
        name: Atom,
        classifier: DescriptorId,
    ) -> Result<(), InternalError> {
        self.add_unique(id, name, classifier, UniqueTable::Classifiers, "add classifier")
    }

    /// Type parameters share the classifier namespace.
    pub fn add_type_parameter(
        &mut self,
        id: ScopeId,
        name: Atom,
        type_parameter: DescriptorId,
    ) -> Result<(), InternalError> {
        self.add_unique(
            id,
            name,
            type_parameter,
            UniqueTable::Classifiers,
            "add type parameter",
        )
    }

    pub fn add_variable(
        &mut self,
        id: ScopeId,
        name: Atom,
        variable: DescriptorId,
    ) -> Result<(), InternalError> {
        self.add_unique(id, name, variable, UniqueTable::Variables, "add variable")
    }

    pub fn add_function(
        &mut self,
        id: ScopeId,
        name: Atom,
        function: DescriptorId,
    ) -> Result<(), InternalError> {
        self.add_overload(id, name, function, OverloadTable::Functions, "add function")
    }

    pub fn add_property(
        &mut self,
        id: ScopeId,
        name: Atom,
        property: DescriptorId,
    ) -> Result<(), InternalError> {
        self.add_overload(id, name, property, OverloadTable::Properties, "add property")
    }

    pub fn add_labeled_declaration(
        &mut self,
        id: ScopeId,
        label: Atom,
        descriptor: DescriptorId,
    ) -> Result<(), InternalError> {
        self.add_overload(
            id,
            label,
            descriptor,
            OverloadTable::Labels,
            "add labeled declaration",
        )
    }

    /// Make another scope's declarations visible here without reparenting.
    pub fn import_scope(&mut self, id: ScopeId, imported: ScopeId) -> Result<(), InternalError> {
        if self.get(imported).is_none() {
            return Err(InternalError::UnknownScope { scope: imported.0 });
        }
        let scope = self.writable(id, "import scope")?;
        if !scope.imports.contains(&imported) {
            scope.imports.push(imported);
        }
        Ok(())
    }

    pub fn set_implicit_receiver(
        &mut self,
        id: ScopeId,
        receiver: DescriptorId,
    ) -> Result<(), InternalError> {
        let scope = self.writable(id, "set implicit receiver")?;
        scope.implicit_receiver = Some(receiver);
        Ok(())
    }

    fn add_unique(
        &mut self,
        id: ScopeId,
        name: Atom,
        descriptor: DescriptorId,
        table: UniqueTable,
        operation: &'static str,
    ) -> Result<(), InternalError> {
        let scope = self.writable(id, operation)?;
        let policy = scope.policy;
        let map = match table {
            UniqueTable::Classifiers => &mut scope.classifiers,
            UniqueTable::Variables => &mut scope.variables,
        };
        let first = match map.get(&name) {
            Some(&first) => first,
            None => {
                map.insert(name, descriptor);
                scope.declared.push(descriptor);
                return Ok(());
            }
        };
        if first != descriptor && policy == RedeclarationPolicy::Report {
            self.redeclarations.push(Redeclaration {
                scope: id,
                name,
                first,
                second: descriptor,
            });
        }
        Ok(())
    }

    fn add_overload(
        &mut self,
        id: ScopeId,
        name: Atom,
        descriptor: DescriptorId,
        table: OverloadTable,
        operation: &'static str,
    ) -> Result<(), InternalError> {
        let scope = self.writable(id, operation)?;
        let map = match table {
            OverloadTable::Functions => &mut scope.functions,
            OverloadTable::Properties => &mut scope.properties,
            OverloadTable::Labels | OverloadTable::Declared => &mut scope.labels,
        };
        let overloads = map.entry(name).or_default();
        if overloads.contains(&descriptor) {
            return Ok(());
        }
        overloads.push(descriptor);
        if !matches!(table, OverloadTable::Labels) {
            scope.declared.push(descriptor);
        }
        Ok(())
    }

    /// Redeclarations recorded so far.
    pub fn redeclarations(&self) -> &[Redeclaration] {
        &self.redeclarations
    }

    pub fn take_redeclarations(&mut self) -> Vec<Redeclaration> {
        std::mem::take(&mut self.redeclarations)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// `start` and its parents, innermost first.
    pub fn chain(&self, start: ScopeId) -> ScopeChain<'_> {
        ScopeChain {
            arena: self,
            next: Some(start),
            steps: 0,
        }
    }

    /// Search one scope's own table, then its imports.
    fn find_local(
        &self,
        id: ScopeId,
        table: UniqueTable,
        name: Atom,
        depth: usize,
    ) -> Option<DescriptorId> {
        let scope = self.get(id)?;
        if let Some(found) = scope.unique(table, name) {
            return Some(found);
        }
        if depth >= MAX_SCOPE_CHAIN_DEPTH {
            warn!(scope = id.0, "scope import depth limit reached");
            return None;
        }
        scope
            .imports
            .iter()
            .find_map(|&imported| self.find_local(imported, table, name, depth + 1))
    }

    fn collect_local(
        &self,
        id: ScopeId,
        table: OverloadTable,
        name: Atom,
        out: &mut Vec<DescriptorId>,
        depth: usize,
    ) {
        let Some(scope) = self.get(id) else {
            return;
        };
        for &descriptor in scope.overloads(table, name) {
            if !out.contains(&descriptor) {
                out.push(descriptor);
            }
        }
        if depth >= MAX_SCOPE_CHAIN_DEPTH {
            warn!(scope = id.0, "scope import depth limit reached");
            return;
        }
        for &imported in &scope.imports {
            self.collect_local(imported, table, name, out, depth + 1);
        }
    }

    fn find_in_chain(&self, start: ScopeId, table: UniqueTable, name: Atom) -> Option<DescriptorId> {
        self.chain(start)
            .find_map(|scope| self.find_local(scope, table, name, 0))
    }

    fn collect_in_chain(&self, start: ScopeId, table: OverloadTable, name: Atom) -> Vec<DescriptorId> {
        let mut out = Vec::new();
        for scope in self.chain(start) {
            self.collect_local(scope, table, name, &mut out, 0);
        }
        out
    }

    /// Nearest classifier (class or type parameter) named `name`.
    pub fn get_classifier(&self, start: ScopeId, name: Atom) -> Option<DescriptorId> {
        self.find_in_chain(start, UniqueTable::Classifiers, name)
    }

    /// Nearest local variable or value parameter named `name`.
    pub fn get_variable(&self, start: ScopeId, name: Atom) -> Option<DescriptorId> {
        self.find_in_chain(start, UniqueTable::Variables, name)
    }

    /// Every function named `name` along the chain, innermost first.
    pub fn get_functions(&self, start: ScopeId, name: Atom) -> Vec<DescriptorId> {
        self.collect_in_chain(start, OverloadTable::Functions, name)
    }

    pub fn get_properties(&self, start: ScopeId, name: Atom) -> Vec<DescriptorId> {
        self.collect_in_chain(start, OverloadTable::Properties, name)
    }

    pub fn get_declarations_by_label(&self, start: ScopeId, label: Atom) -> Vec<DescriptorId> {
        self.collect_in_chain(start, OverloadTable::Labels, label)
    }

    /// Every descriptor visible from `start`, innermost first, without
    /// duplicates.
    pub fn get_all_descriptors(&self, start: ScopeId) -> Vec<DescriptorId> {
        let mut out = self.collect_in_chain(start, OverloadTable::Declared, Atom::NONE);
        let mut seen = FxHashSet::default();
        out.retain(|d| seen.insert(*d));
        out
    }

    /// Functions, properties and variables named `name` declared in one
    /// scope or its imports, ignoring parents.
    pub fn get_local_callables(&self, id: ScopeId, name: Atom) -> Vec<DescriptorId> {
        let mut out = Vec::new();
        self.collect_local(id, OverloadTable::Functions, name, &mut out, 0);
        self.collect_local(id, OverloadTable::Properties, name, &mut out, 0);
        if let Some(variable) = self.find_local(id, UniqueTable::Variables, name, 0)
            && !out.contains(&variable)
        {
            out.push(variable);
        }
        out
    }

    /// Implicit receivers from the innermost scope outwards.
    pub fn get_implicit_receivers_hierarchy(&self, start: ScopeId) -> Vec<DescriptorId> {
        let mut receivers = Vec::new();
        for scope in self.chain(start) {
            if let Some(receiver) = self.get(scope).and_then(|s| s.implicit_receiver)
                && !receivers.contains(&receiver)
            {
                receivers.push(receiver);
            }
        }
        receivers
    }
}

/// Iterator over a scope and its parents.
pub struct ScopeChain<'a> {
    arena: &'a ScopeArena,
    next: Option<ScopeId>,
    steps: usize,
}

impl Iterator for ScopeChain<'_> {
    type Item = ScopeId;

    fn next(&mut self) -> Option<ScopeId> {
        let current = self.next?;
        if self.steps >= MAX_SCOPE_CHAIN_DEPTH {
            warn!(scope = current.0, "scope chain depth limit reached");
            self.next = None;
            return None;
        }
        self.steps += 1;
        self.next = self.arena.get(current).and_then(|scope| scope.parent);
        Some(current)
    }
}

/// A scope arena in which every scope is `Reading`.
///
/// Only shared access to the underlying `ScopeArena` is reachable, so no
/// add can be issued after freezing.
#[derive(Clone, Debug)]
pub struct FrozenScopes {
    scopes: ScopeArena,
}

impl Deref for FrozenScopes {
    type Target = ScopeArena;

    fn deref(&self) -> &ScopeArena {
        &self.scopes
    }
}
