//! Member binding: constructors, functions and properties.
//!
//! Signatures are resolved here; bodies and initializers are queued as
//! `PendingBody` and bound after every class is locked.

use jetc_common::{Atom, DiagnosticReporter};
use jetc_descriptors::{
    AccessorData, CallableData, ConstructorData, DescriptorData, DescriptorId,
    InternalError, JetType, MemberKind, Modality, PropertyData, ValueParameterData, Visibility,
};
use jetc_syntax::{ClassKind, Modifiers, NodeData, NodeIndex, ValOrVar};
use tracing::{debug, trace};

use crate::scope::{RedeclarationPolicy, ScopeId};
use crate::state::{BinderState, PendingBody};

/// Where a callable is declared; decides its default visibility and
/// modality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CallableContext {
    TopLevel,
    Member(ClassKind),
    Local,
}

impl CallableContext {
    fn visibility(self, modifiers: Modifiers) -> Visibility {
        if self == CallableContext::Local {
            return Visibility::Local;
        }
        Visibility::from_modifiers(modifiers).unwrap_or(if modifiers.contains(Modifiers::OVERRIDE) {
            Visibility::Inherited
        } else {
            Visibility::Public
        })
    }

    fn modality(self, modifiers: Modifiers, has_body: bool) -> Modality {
        if let Some(modality) = Modality::from_modifiers(modifiers) {
            return modality;
        }
        match self {
            CallableContext::Member(ClassKind::Interface) if has_body => Modality::Open,
            CallableContext::Member(ClassKind::Interface) => Modality::Abstract,
            CallableContext::Member(_) if modifiers.contains(Modifiers::OVERRIDE) => Modality::Open,
            _ => Modality::Final,
        }
    }
}

impl BinderState<'_> {
    fn atom(&self, name: &'static str) -> Result<Atom, InternalError> {
        self.syntax
            .interner()
            .lookup(name)
            .ok_or(InternalError::MissingBuiltin { name })
    }

    /// Bind constructors and members of every class, then top-level
    /// functions and properties.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn bind_members(&mut self, reporter: &mut dyn DiagnosticReporter) -> Result<(), InternalError> {
        for class in self.classes.clone() {
            self.bind_class_members(class, reporter)?;
        }
        for node in std::mem::take(&mut self.top_level_callables) {
            let owner = self.root_package;
            let scope = self.file_scope;
            match self.syntax.data(node) {
                Some(NodeData::Function(_)) => {
                    let function = self.bind_function(node, owner, scope, CallableContext::TopLevel, reporter)?;
                    self.scopes
                        .add_function(scope, self.descriptors.name(function), function)?;
                }
                Some(NodeData::Property(_)) => {
                    let property = self.bind_property(node, owner, scope, scope, CallableContext::TopLevel, reporter)?;
                    self.scopes
                        .add_property(scope, self.descriptors.name(property), property)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub(crate) fn bind_class_members(
        &mut self,
        class: DescriptorId,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let decl = self.class_decl_of(class)?.clone();
        let context = CallableContext::Member(decl.kind);

        match &decl.primary_constructor {
            Some(parameters) => {
                self.bind_primary_constructor(class, parameters, reporter)?;
            }
            None => {
                let has_secondary = decl.members.iter().any(|&member| {
                    matches!(self.syntax.data(member), Some(NodeData::SecondaryConstructor(_)))
                });
                if !has_secondary && !matches!(decl.kind, ClassKind::Interface | ClassKind::AnnotationClass) {
                    self.bind_default_constructor(class)?;
                }
            }
        }

        let scopes = self.class_scopes(class)?;
        let initializer_scope = scopes.initializer_or_members();
        for &entry in &decl.supertypes {
            if let Some(arguments) = self
                .syntax
                .supertype_entry(entry)
                .and_then(|data| data.constructor_arguments)
            {
                self.expression_scopes.insert(entry, initializer_scope);
                self.pending_bodies.push(PendingBody {
                    owner: class,
                    node: arguments,
                    parent: initializer_scope,
                    parameters: Vec::new(),
                    receiver: None,
                    label: Atom::NONE,
                });
            }
        }

        for &member in &decl.members {
            match self.syntax.data(member) {
                Some(NodeData::Function(_)) => {
                    let function =
                        self.bind_function(member, class, scopes.member_resolution, context, reporter)?;
                    self.add_class_member(class, function, MemberKind::Function)?;
                }
                Some(NodeData::Property(_)) => {
                    let property = self.bind_property(
                        member,
                        class,
                        scopes.member_resolution,
                        initializer_scope,
                        context,
                        reporter,
                    )?;
                    self.add_class_member(class, property, MemberKind::Property)?;
                }
                Some(NodeData::SecondaryConstructor(_)) => {
                    self.bind_secondary_constructor(class, member, reporter)?;
                }
                _ => {}
            }
        }
        trace!(
            class = class.0,
            members = self.descriptors.class(class).map_or(0, |d| d.declared_callables().len()),
            "bound class members"
        );
        Ok(())
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    fn constructor_data(&self, class: DescriptorId, is_primary: bool, visibility: Visibility) -> ConstructorData {
        ConstructorData {
            is_primary,
            visibility,
            value_parameters: Vec::new(),
            return_type: self.descriptors.default_type(class),
        }
    }

    fn bind_primary_constructor(
        &mut self,
        class: DescriptorId,
        parameters: &[NodeIndex],
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let init = self.atom("<init>")?;
        let source = self.descriptors.source(class);
        let data = self.constructor_data(class, true, Visibility::Public);
        let constructor = self.descriptors.alloc(
            Some(class),
            Vec::new(),
            init,
            source,
            DescriptorData::Constructor(data),
        );
        let scopes = self.class_scopes(class)?;
        let value_parameters =
            self.bind_value_parameters(constructor, parameters, scopes.member_resolution, reporter)?;
        self.set_constructor_parameters(constructor, value_parameters.clone())?;
        let initializer = self.set_class_primary_constructor(class, constructor)?;

        for (&node, &parameter) in parameters.iter().zip(&value_parameters) {
            let Some(decl) = self.syntax.parameter_decl(node) else {
                continue;
            };
            if let Some(val_or_var) = decl.val_or_var {
                let property = self.promote_parameter(class, node, parameter, val_or_var)?;
                self.add_class_member(class, property, MemberKind::Property)?;
            }
            self.scopes.add_variable(initializer, decl.name, parameter)?;
        }
        Ok(())
    }

    /// `class C(val x: Int)` declares a property `x`.
    fn promote_parameter(
        &mut self,
        class: DescriptorId,
        node: NodeIndex,
        parameter: DescriptorId,
        val_or_var: ValOrVar,
    ) -> Result<DescriptorId, InternalError> {
        let Some(decl) = self.syntax.parameter_decl(node) else {
            return Err(InternalError::MalformedSyntax {
                node: node.0,
                expected: "parameter",
            });
        };
        let kind = self.descriptors.class(class).map_or(ClassKind::Class, |d| d.kind);
        let context = CallableContext::Member(kind);
        let ty = self
            .descriptors
            .value_parameter(parameter)
            .map_or(JetType::Error, |data| data.ty.clone());
        let is_var = val_or_var == ValOrVar::Var;
        let callable = CallableData {
            has_override_modifier: decl.modifiers.contains(Modifiers::OVERRIDE),
            ..CallableData::new(
                ty,
                context.modality(decl.modifiers, true),
                context.visibility(decl.modifiers),
            )
        };
        self.alloc_property(class, decl.name, node, callable, is_var)
    }

    /// Classes without any constructor get a public, parameterless one.
    fn bind_default_constructor(&mut self, class: DescriptorId) -> Result<(), InternalError> {
        let init = self.atom("<init>")?;
        let data = self.constructor_data(class, true, Visibility::Public);
        let constructor = self.descriptors.alloc(
            Some(class),
            Vec::new(),
            init,
            NodeIndex::NONE,
            DescriptorData::Constructor(data),
        );
        self.set_class_primary_constructor(class, constructor)?;
        Ok(())
    }

    fn bind_secondary_constructor(
        &mut self,
        class: DescriptorId,
        node: NodeIndex,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let Some(decl) = self.syntax.secondary_constructor_decl(node) else {
            return Err(InternalError::MalformedSyntax {
                node: node.0,
                expected: "secondary constructor",
            });
        };
        let init = self.atom("<init>")?;
        let visibility = Visibility::from_modifiers(decl.modifiers).unwrap_or(Visibility::Public);
        let data = self.constructor_data(class, false, visibility);
        let constructor =
            self.descriptors
                .alloc(Some(class), Vec::new(), init, node, DescriptorData::Constructor(data));
        self.node_descriptors.insert(node, constructor);
        let scope = self.class_scopes(class)?.member_resolution;
        let value_parameters =
            self.bind_value_parameters(constructor, &decl.value_parameters, scope, reporter)?;
        self.set_constructor_parameters(constructor, value_parameters.clone())?;
        self.add_class_constructor(class, constructor)?;
        if decl.body.is_some() {
            self.pending_bodies.push(PendingBody {
                owner: constructor,
                node: decl.body,
                parent: scope,
                parameters: value_parameters,
                receiver: None,
                label: Atom::NONE,
            });
        }
        Ok(())
    }

    fn set_constructor_parameters(
        &mut self,
        constructor: DescriptorId,
        parameters: Vec<DescriptorId>,
    ) -> Result<(), InternalError> {
        let descriptor = self.descriptors.descriptor_mut(constructor)?;
        let actual = descriptor.data.kind_name();
        match &mut descriptor.data {
            DescriptorData::Constructor(data) => {
                data.value_parameters = parameters;
                Ok(())
            }
            _ => Err(InternalError::UnexpectedDescriptorKind {
                descriptor: constructor,
                expected: "constructor",
                actual,
            }),
        }
    }

    // =========================================================================
    // Callables
    // =========================================================================

    /// Allocate own type parameters in a fresh header scope chained to
    /// `scope`. The header scope is locked once bounds are resolved.
    fn bind_callable_type_parameters(
        &mut self,
        owner: DescriptorId,
        nodes: &[NodeIndex],
        scope: ScopeId,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(ScopeId, Vec<DescriptorId>), InternalError> {
        let header = self
            .scopes
            .new_scope(Some(scope), owner, RedeclarationPolicy::Ignore, "callable header");
        let mut parameters = Vec::with_capacity(nodes.len());
        for (index, &node) in nodes.iter().enumerate() {
            let Some(decl) = self.syntax.type_parameter_decl(node) else {
                return Err(InternalError::MalformedSyntax {
                    node: node.0,
                    expected: "type parameter",
                });
            };
            let parameter = self
                .descriptors
                .alloc_type_parameter(owner, decl.name, node, index as u32);
            self.scopes.add_type_parameter(header, decl.name, parameter)?;
            self.node_descriptors.insert(node, parameter);
            parameters.push(parameter);
        }
        self.resolve_upper_bounds(header, nodes, &parameters, reporter)?;
        self.scopes.lock(header)?;
        Ok((header, parameters))
    }

    /// Value parameter descriptors owned by `owner`, types resolved in
    /// `scope`. Default values are queued for body binding.
    pub(crate) fn bind_value_parameters(
        &mut self,
        owner: DescriptorId,
        nodes: &[NodeIndex],
        scope: ScopeId,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<Vec<DescriptorId>, InternalError> {
        let mut parameters = Vec::with_capacity(nodes.len());
        for (index, &node) in nodes.iter().enumerate() {
            let Some(decl) = self.syntax.parameter_decl(node) else {
                return Err(InternalError::MalformedSyntax {
                    node: node.0,
                    expected: "parameter",
                });
            };
            let ty = self.resolve_type(scope, decl.type_ref, reporter);
            let parameter = self.descriptors.alloc_value_parameter(
                owner,
                decl.name,
                node,
                ValueParameterData {
                    index: index as u32,
                    ty,
                    has_default: decl.default_value.is_some(),
                    is_vararg: decl.is_vararg || decl.modifiers.contains(Modifiers::VARARG),
                },
            );
            self.node_descriptors.insert(node, parameter);
            if decl.default_value.is_some() {
                self.pending_bodies.push(PendingBody {
                    owner,
                    node: decl.default_value,
                    parent: scope,
                    parameters: Vec::new(),
                    receiver: None,
                    label: Atom::NONE,
                });
            }
            parameters.push(parameter);
        }
        Ok(parameters)
    }

    pub(crate) fn bind_function(
        &mut self,
        node: NodeIndex,
        owner: DescriptorId,
        scope: ScopeId,
        context: CallableContext,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<DescriptorId, InternalError> {
        let Some(decl) = self.syntax.function_decl(node) else {
            return Err(InternalError::MalformedSyntax {
                node: node.0,
                expected: "function",
            });
        };
        let has_body = decl.body.is_some();
        let callable = CallableData {
            has_override_modifier: decl.modifiers.contains(Modifiers::OVERRIDE),
            ..CallableData::new(
                JetType::Error,
                context.modality(decl.modifiers, has_body),
                context.visibility(decl.modifiers),
            )
        };
        let function = self.descriptors.alloc(
            Some(owner),
            Vec::new(),
            decl.name,
            node,
            DescriptorData::Function(callable),
        );
        self.node_descriptors.insert(node, function);

        let (header, type_parameters) =
            self.bind_callable_type_parameters(function, &decl.type_parameters, scope, reporter)?;
        let extension_receiver = decl
            .receiver_type
            .get()
            .map(|receiver| self.resolve_type(header, receiver, reporter));
        let value_parameters = self.bind_value_parameters(function, &decl.value_parameters, header, reporter)?;
        // Expression bodies would need inference.
        let default_return = match self.syntax.data(decl.body) {
            None | Some(NodeData::Block(_)) => self.builtins.unit_type(),
            Some(_) => JetType::Error,
        };
        let return_type = self.resolve_type_or(header, decl.return_type, default_return, reporter);

        {
            let data = self.descriptors.callable_mut(function)?;
            data.type_parameters = type_parameters;
            data.extension_receiver = extension_receiver.clone();
            data.value_parameters = value_parameters.clone();
            data.return_type = return_type;
        }

        if has_body {
            self.pending_bodies.push(PendingBody {
                owner: function,
                node: decl.body,
                parent: header,
                parameters: value_parameters,
                receiver: extension_receiver.map(|_| function),
                label: decl.name,
            });
        }
        debug!(
            function = function.0,
            name = self.text(decl.name),
            ?context,
            "bound function"
        );
        Ok(function)
    }

    pub(crate) fn bind_property(
        &mut self,
        node: NodeIndex,
        owner: DescriptorId,
        scope: ScopeId,
        initializer_scope: ScopeId,
        context: CallableContext,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<DescriptorId, InternalError> {
        let Some(decl) = self.syntax.property_decl(node) else {
            return Err(InternalError::MalformedSyntax {
                node: node.0,
                expected: "property",
            });
        };
        let has_initializer = decl.initializer.is_some();
        let callable = CallableData {
            has_override_modifier: decl.modifiers.contains(Modifiers::OVERRIDE),
            ..CallableData::new(
                JetType::Error,
                context.modality(decl.modifiers, has_initializer),
                context.visibility(decl.modifiers),
            )
        };
        let property = self.alloc_property(owner, decl.name, node, callable, decl.is_var)?;
        self.node_descriptors.insert(node, property);

        let (header, type_parameters) =
            self.bind_callable_type_parameters(property, &decl.type_parameters, scope, reporter)?;
        let extension_receiver = decl
            .receiver_type
            .get()
            .map(|receiver| self.resolve_type(header, receiver, reporter));
        let ty = self.resolve_type_or(header, decl.type_ref, JetType::Error, reporter);
        {
            let data = self.descriptors.callable_mut(property)?;
            data.type_parameters = type_parameters;
            data.extension_receiver = extension_receiver;
            data.return_type = ty;
        }

        if has_initializer {
            self.pending_bodies.push(PendingBody {
                owner: property,
                node: decl.initializer,
                parent: initializer_scope,
                parameters: Vec::new(),
                receiver: None,
                label: Atom::NONE,
            });
        }
        Ok(property)
    }

    /// Property descriptor with a getter and, for `var`, a setter.
    fn alloc_property(
        &mut self,
        owner: DescriptorId,
        name: Atom,
        source: NodeIndex,
        callable: CallableData,
        is_var: bool,
    ) -> Result<DescriptorId, InternalError> {
        let visibility = callable.visibility;
        let modality = callable.modality;
        let property = self.descriptors.alloc(
            Some(owner),
            Vec::new(),
            name,
            source,
            DescriptorData::Property(PropertyData {
                callable,
                is_var,
                getter: None,
                setter: None,
            }),
        );

        let accessor = |is_getter| {
            DescriptorData::Accessor(AccessorData {
                is_getter,
                visibility,
                modality,
            })
        };
        let getter_name = self.atom("<get>")?;
        let getter = self
            .descriptors
            .alloc(Some(property), Vec::new(), getter_name, source, accessor(true));
        let setter = if is_var {
            let setter_name = self.atom("<set>")?;
            Some(
                self.descriptors
                    .alloc(Some(property), Vec::new(), setter_name, source, accessor(false)),
            )
        } else {
            None
        };
        if let DescriptorData::Property(data) = &mut self.descriptors.descriptor_mut(property)?.data {
            data.getter = Some(getter);
            data.setter = setter;
        }
        Ok(property)
    }
}

