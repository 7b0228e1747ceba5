//! Declaration discovery and class headers.
//!
//! Discovery creates a descriptor for every class in the file before any
//! type is resolved, so that supertype lists and member signatures can
//! refer to classes declared later in the file.

use jetc_common::{DiagnosticReporter, diagnostic_codes};
use jetc_descriptors::{CompanionStatus, DescriptorId, InternalError, Modality, Visibility};
use jetc_syntax::{ClassDecl, ClassKind, Modifiers, NodeData, NodeIndex};
use tracing::{debug, warn};

use crate::scope::ScopeId;
use crate::state::{BinderState, SupertypeRef};
use crate::state_class_builder::ClassHeader;

/// Modality of a class when none is written.
pub(crate) fn default_class_modality(kind: ClassKind) -> Modality {
    match kind {
        ClassKind::Interface => Modality::Abstract,
        _ => Modality::Final,
    }
}

impl BinderState<'_> {
    pub(crate) fn class_decl_of(&self, class: DescriptorId) -> Result<&ClassDecl, InternalError> {
        let node = self.descriptors.source(class);
        self.syntax
            .class_decl(node)
            .ok_or(InternalError::MalformedSyntax {
                node: node.0,
                expected: "class declaration",
            })
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Create class descriptors for the whole file and remember top-level
    /// functions and properties for member binding.
    #[tracing::instrument(level = "debug", skip(self, reporter))]
    pub fn discover_declarations(
        &mut self,
        file: NodeIndex,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let data = self
            .syntax
            .file_data(file)
            .ok_or(InternalError::MalformedSyntax {
                node: file.0,
                expected: "file",
            })?;
        for &declaration in &data.declarations {
            match self.syntax.data(declaration) {
                Some(NodeData::Class(_)) => {
                    self.discover_class(declaration, self.root_package, self.file_scope, None, false, reporter)?;
                }
                Some(NodeData::Function(_) | NodeData::Property(_)) => {
                    self.top_level_callables.push(declaration);
                }
                Some(other) => {
                    warn!(
                        node = declaration.0,
                        kind = other.kind_name(),
                        "unexpected top-level node"
                    );
                }
                None => {
                    return Err(InternalError::MalformedSyntax {
                        node: declaration.0,
                        expected: "declaration",
                    });
                }
            }
        }
        debug!(
            classes = self.classes.len(),
            callables = self.top_level_callables.len(),
            "discovered declarations"
        );
        Ok(())
    }

    /// Create the descriptor and scopes of a class and its nested classes.
    /// A `local` class is declared in a body and has `Local` visibility.
    pub(crate) fn discover_class(
        &mut self,
        node: NodeIndex,
        containing: DescriptorId,
        outer_scope: ScopeId,
        outer_class: Option<DescriptorId>,
        local: bool,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<DescriptorId, InternalError> {
        let decl = self
            .syntax
            .class_decl(node)
            .ok_or(InternalError::MalformedSyntax {
                node: node.0,
                expected: "class declaration",
            })?;
        let header = ClassHeader {
            name: decl.name,
            source: node,
            kind: decl.kind,
            is_inner: decl.modifiers.contains(Modifiers::INNER),
            modality: Modality::from_modifiers(decl.modifiers)
                .unwrap_or_else(|| default_class_modality(decl.kind)),
            visibility: if local {
                Visibility::Local
            } else {
                Visibility::from_modifiers(decl.modifiers).unwrap_or(Visibility::Public)
            },
        };
        let class = self.create_class(containing, outer_scope, header)?;
        self.node_descriptors.insert(node, class);

        match outer_class {
            Some(outer) => self.add_class_classifier(outer, class)?,
            None => self.scopes.add_classifier(outer_scope, decl.name, class)?,
        }

        if decl.modifiers.contains(Modifiers::COMPANION) {
            self.attach_companion(node, class, outer_class, reporter)?;
        }

        let member_resolution = self.class_scopes(class)?.member_resolution;
        for &member in &decl.members {
            if matches!(self.syntax.data(member), Some(NodeData::Class(_))) {
                self.discover_class(member, class, member_resolution, Some(class), false, reporter)?;
            }
        }
        Ok(class)
    }

    fn attach_companion(
        &mut self,
        node: NodeIndex,
        companion: DescriptorId,
        outer_class: Option<DescriptorId>,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let status = match outer_class {
            Some(outer) => self.set_class_companion(outer, companion)?,
            None => CompanionStatus::NotAllowed,
        };
        match status {
            CompanionStatus::Ok => {}
            CompanionStatus::Duplicate => {
                let outer_name = outer_class
                    .map(|outer| self.text(self.descriptors.name(outer)))
                    .unwrap_or_default();
                self.report_at(
                    reporter,
                    node,
                    diagnostic_codes::MANY_COMPANION_OBJECTS,
                    &[outer_name],
                );
            }
            CompanionStatus::NotAllowed => {
                let name = self.text(self.descriptors.name(companion));
                self.report_at(
                    reporter,
                    node,
                    diagnostic_codes::COMPANION_OBJECT_NOT_ALLOWED,
                    &[name],
                );
            }
        }
        Ok(())
    }

    // =========================================================================
    // Headers
    // =========================================================================

    /// Resolve type parameters, their bounds and supertypes of every class.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve_headers(&mut self, reporter: &mut dyn DiagnosticReporter) -> Result<(), InternalError> {
        for class in self.classes.clone() {
            self.resolve_class_header(class, reporter)?;
        }
        Ok(())
    }

    pub(crate) fn resolve_class_header(
        &mut self,
        class: DescriptorId,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let decl = self.class_decl_of(class)?.clone();
        let scope = self.class_scopes(class)?.supertype_resolution;

        let mut type_parameters = Vec::with_capacity(decl.type_parameters.len());
        for (index, &node) in decl.type_parameters.iter().enumerate() {
            let data = self
                .syntax
                .type_parameter_decl(node)
                .ok_or(InternalError::MalformedSyntax {
                    node: node.0,
                    expected: "type parameter",
                })?;
            let parameter = self
                .descriptors
                .alloc_type_parameter(class, data.name, node, index as u32);
            self.node_descriptors.insert(node, parameter);
            type_parameters.push(parameter);
        }
        self.set_class_type_parameters(class, type_parameters.clone())?;
        self.resolve_upper_bounds(scope, &decl.type_parameters, &type_parameters, reporter)?;

        let mut refs = Vec::with_capacity(decl.supertypes.len());
        for &entry in &decl.supertypes {
            let data = self
                .syntax
                .supertype_entry(entry)
                .ok_or(InternalError::MalformedSyntax {
                    node: entry.0,
                    expected: "supertype entry",
                })?;
            let ty = self.resolve_type(scope, data.type_ref, reporter);
            self.add_class_supertype(class, ty.clone())?;
            refs.push(SupertypeRef { ty, entry });
        }
        if decl.supertypes.is_empty()
            && self.options.implicit_any_supertype
            && class != self.builtins.any
        {
            let any = self.builtins.any_type();
            self.add_class_supertype(class, any)?;
        }
        self.supertype_refs.insert(class, refs);
        Ok(())
    }

    /// Resolve `T : Bound` for already registered type parameters.
    pub(crate) fn resolve_upper_bounds(
        &mut self,
        scope: ScopeId,
        nodes: &[NodeIndex],
        parameters: &[DescriptorId],
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        for (&node, &parameter) in nodes.iter().zip(parameters) {
            let bound = self
                .syntax
                .type_parameter_decl(node)
                .map_or(NodeIndex::NONE, |data| data.upper_bound);
            if bound.is_none() {
                continue;
            }
            let ty = self.resolve_type(scope, bound, reporter);
            self.descriptors.set_upper_bounds(parameter, vec![ty])?;
        }
        Ok(())
    }
}
