//! Binder state.
//!
//! `BinderState` owns the descriptor arena and the scope arena while a file
//! is being bound. Binding is split into phases that the analyzer drives in
//! order:
//!
//! 1. `discover_declarations` - class descriptors and their scopes
//! 2. `resolve_headers` - type parameters and supertypes
//! 3. `bind_members` - constructors, functions and properties
//! 4. `lock_declarations` - freeze class scopes and the file scope
//! 5. `bind_bodies` - function body scopes and local declarations
//!
//! Override resolution runs between phases 3 and 4 in `jetc-resolve`.
//! Classes declared in bodies go through phases 1 to 3 where they are
//! found; `take_local_classes` hands them to override resolution and
//! `finish_local_classes` locks them and queues their bodies.

use jetc_common::{Atom, Diagnostic, DiagnosticReporter, diagnostic_codes};
use jetc_descriptors::{Builtins, DescriptorArena, DescriptorId, InternalError, JetType};
use jetc_syntax::{NodeArena, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::class_scopes::ClassScopes;
use crate::scope::{RedeclarationPolicy, ScopeArena, ScopeContents, ScopeId};

/// Configuration options for the binder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinderOptions {
    /// Member-resolution, file and body scopes record redeclarations.
    pub report_redeclarations: bool,
    /// Classes without explicit supertypes get `Any`.
    pub implicit_any_supertype: bool,
}

impl Default for BinderOptions {
    fn default() -> Self {
        BinderOptions {
            report_redeclarations: true,
            implicit_any_supertype: true,
        }
    }
}

/// A supertype entry as written, after type resolution.
///
/// Kept separately from the class's supertype list because that list drops
/// error and non-class types, which hierarchy validation still reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupertypeRef {
    pub ty: JetType,
    /// The `SupertypeEntry` node.
    pub entry: NodeIndex,
}

/// Code whose scope is created after declarations are locked.
#[derive(Clone, Debug)]
pub(crate) struct PendingBody {
    /// Function, constructor, property or class owning the code.
    pub owner: DescriptorId,
    /// Block, expression or value argument list.
    pub node: NodeIndex,
    pub parent: ScopeId,
    /// Value parameters visible in the body.
    pub parameters: Vec<DescriptorId>,
    /// Extension receiver made implicit inside the body.
    pub receiver: Option<DescriptorId>,
    pub label: Atom,
}

/// Binder state over one file.
pub struct BinderState<'a> {
    pub options: BinderOptions,
    pub(crate) syntax: &'a NodeArena,
    pub(crate) file_name: String,
    pub descriptors: DescriptorArena,
    pub scopes: ScopeArena,
    pub builtins: Builtins,
    /// Builtin classifiers, `Reading` from construction.
    pub builtins_scope: ScopeId,
    /// The package every top-level declaration belongs to.
    pub root_package: DescriptorId,
    /// Top-level declarations of the file.
    pub file_scope: ScopeId,
    /// Classes in discovery order, outer classes before nested ones.
    pub classes: Vec<DescriptorId>,
    pub class_scopes: FxHashMap<DescriptorId, ClassScopes>,
    /// Raw supertype entries per class.
    pub supertype_refs: FxHashMap<DescriptorId, Vec<SupertypeRef>>,
    /// Declaration and lambda nodes to their descriptors.
    pub node_descriptors: FxHashMap<NodeIndex, DescriptorId>,
    /// Every bound expression (and supertype entry) to the scope it is
    /// resolved in.
    pub expression_scopes: FxHashMap<NodeIndex, ScopeId>,
    pub(crate) top_level_callables: Vec<NodeIndex>,
    pub(crate) pending_bodies: Vec<PendingBody>,
    /// Classes declared in bodies that still wait for override resolution.
    pub(crate) local_classes: Vec<DescriptorId>,
    /// Bodies of those classes, bound once the classes are locked.
    pub(crate) local_class_bodies: Vec<PendingBody>,
}

impl<'a> BinderState<'a> {
    /// Install builtins and create the root package and file scope.
    pub fn new(
        syntax: &'a NodeArena,
        file_name: impl Into<String>,
        options: BinderOptions,
    ) -> Result<Self, InternalError> {
        let interner = syntax.interner();
        let mut descriptors = DescriptorArena::new();
        let builtins = Builtins::install(&mut descriptors, interner)?;

        let root_name = interner
            .lookup("<root>")
            .ok_or(InternalError::MissingBuiltin { name: "<root>" })?;
        let root_package = descriptors.alloc_module(root_name);

        let mut scopes = ScopeArena::new();
        let contents = ScopeContents {
            classifiers: builtins
                .classes()
                .iter()
                .map(|&class| (descriptors.name(class), class))
                .collect(),
            ..ScopeContents::default()
        };
        let builtins_scope = scopes.new_reading_scope(None, builtins.module, "builtins", contents);
        let file_scope = scopes.new_scope(
            Some(builtins_scope),
            root_package,
            Self::policy_for(options),
            "file",
        );

        Ok(BinderState {
            options,
            syntax,
            file_name: file_name.into(),
            descriptors,
            scopes,
            builtins,
            builtins_scope,
            root_package,
            file_scope,
            classes: Vec::new(),
            class_scopes: FxHashMap::default(),
            supertype_refs: FxHashMap::default(),
            node_descriptors: FxHashMap::default(),
            expression_scopes: FxHashMap::default(),
            top_level_callables: Vec::new(),
            pending_bodies: Vec::new(),
            local_classes: Vec::new(),
            local_class_bodies: Vec::new(),
        })
    }

    fn policy_for(options: BinderOptions) -> RedeclarationPolicy {
        if options.report_redeclarations {
            RedeclarationPolicy::Report
        } else {
            RedeclarationPolicy::Ignore
        }
    }

    /// Policy for scopes that report true redeclarations.
    #[inline]
    pub(crate) fn reporting_policy(&self) -> RedeclarationPolicy {
        Self::policy_for(self.options)
    }

    #[inline]
    pub fn syntax(&self) -> &'a NodeArena {
        self.syntax
    }

    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name text of an atom.
    #[inline]
    pub fn text(&self, atom: Atom) -> &'a str {
        self.syntax.resolve(atom)
    }

    pub fn class_scopes(&self, class: DescriptorId) -> Result<ClassScopes, InternalError> {
        self.class_scopes
            .get(&class)
            .copied()
            .ok_or(InternalError::UnexpectedDescriptorKind {
                descriptor: class,
                expected: "class with scopes",
                actual: self.descriptors.kind_name(class),
            })
    }

    /// Report a diagnostic anchored at a syntax node.
    pub fn report_at(
        &self,
        reporter: &mut dyn DiagnosticReporter,
        node: NodeIndex,
        code: u32,
        args: &[&str],
    ) {
        let span = self.syntax.span(node);
        reporter.report(Diagnostic::from_code(&self.file_name, span, code, args));
    }

    /// Turn recorded redeclarations into `REDECLARATION` diagnostics at the
    /// second declaration.
    pub fn report_redeclarations(&mut self, reporter: &mut dyn DiagnosticReporter) {
        for redeclaration in self.scopes.take_redeclarations() {
            let node = self.descriptors.source(redeclaration.second);
            let name = self.text(redeclaration.name);
            debug!(
                name,
                scope = redeclaration.scope.0,
                first = redeclaration.first.0,
                second = redeclaration.second.0,
                "redeclaration"
            );
            self.report_at(reporter, node, diagnostic_codes::REDECLARATION, &[name]);
        }
    }

    /// Lock every class that is not locked yet, then the file scope.
    pub fn lock_declarations(&mut self) -> Result<(), InternalError> {
        for class in self.classes.clone() {
            if !self.descriptors.class(class).is_some_and(|data| data.is_locked()) {
                self.lock_class_scopes(class)?;
            }
        }
        self.scopes.lock(self.file_scope)
    }
}
