//! Body binding.
//!
//! Every function body, initializer, default value and supertype argument
//! list gets its own scope once the declarations around it are locked.
//! Blocks and lambdas nest further scopes; each is locked when its last
//! statement is bound, so nothing can be added to a scope after the code
//! that reads it.

use jetc_common::{Atom, DiagnosticReporter};
use jetc_descriptors::{
    CallableData, DescriptorData, DescriptorId, InternalError, JetType, LocalVariableData, Modality,
    Visibility,
};
use jetc_syntax::{NodeData, NodeIndex};
use tracing::{debug, trace, warn};

use crate::scope::ScopeId;
use crate::state::{BinderState, PendingBody};
use crate::state_members::CallableContext;

impl BinderState<'_> {
    /// Bind every queued body. Local functions queue their own bodies,
    /// which are bound in place.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn bind_bodies(&mut self, reporter: &mut dyn DiagnosticReporter) -> Result<(), InternalError> {
        let mut bound = 0usize;
        while !self.pending_bodies.is_empty() {
            for pending in std::mem::take(&mut self.pending_bodies) {
                self.bind_pending(pending, reporter)?;
                bound += 1;
            }
        }
        debug!(bodies = bound, expressions = self.expression_scopes.len(), "bound bodies");
        Ok(())
    }

    fn bind_pending(
        &mut self,
        pending: PendingBody,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let policy = self.reporting_policy();
        let scope = self
            .scopes
            .new_scope(Some(pending.parent), pending.owner, policy, "body");
        for &parameter in &pending.parameters {
            let name = self.descriptors.name(parameter);
            self.scopes.add_variable(scope, name, parameter)?;
        }
        if let Some(receiver) = pending.receiver {
            self.scopes.set_implicit_receiver(scope, receiver)?;
        }
        if pending.label != Atom::NONE {
            self.scopes
                .add_labeled_declaration(scope, pending.label, pending.owner)?;
        }

        match self.syntax.data(pending.node) {
            Some(NodeData::Block(block)) => {
                self.expression_scopes.insert(pending.node, scope);
                for &statement in &block.statements {
                    self.bind_statement(scope, pending.owner, statement, reporter)?;
                }
            }
            Some(_) => {
                self.bind_expression(scope, pending.owner, pending.node, reporter)?;
            }
            None => {
                return Err(InternalError::MalformedSyntax {
                    node: pending.node.0,
                    expected: "body",
                });
            }
        }
        trace!(owner = pending.owner.0, scope = scope.0, "bound body");
        self.scopes.lock(scope)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn bind_statement(
        &mut self,
        scope: ScopeId,
        owner: DescriptorId,
        node: NodeIndex,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        match self.syntax.data(node) {
            Some(NodeData::LocalVariable(decl)) => {
                if decl.initializer.is_some() {
                    self.bind_expression(scope, owner, decl.initializer, reporter)?;
                }
                let ty = self.resolve_type_or(scope, decl.type_ref, JetType::Error, reporter);
                let variable = self.descriptors.alloc(
                    Some(owner),
                    Vec::new(),
                    decl.name,
                    node,
                    DescriptorData::LocalVariable(LocalVariableData {
                        ty,
                        is_var: decl.is_var,
                    }),
                );
                self.node_descriptors.insert(node, variable);
                self.scopes.add_variable(scope, decl.name, variable)?;
            }
            Some(NodeData::Function(_)) => {
                let mark = self.pending_bodies.len();
                let function = self.bind_function(node, owner, scope, CallableContext::Local, reporter)?;
                self.scopes
                    .add_function(scope, self.descriptors.name(function), function)?;
                let queued: Vec<PendingBody> = self.pending_bodies.drain(mark..).collect();
                for pending in queued {
                    self.bind_pending(pending, reporter)?;
                }
            }
            Some(NodeData::Class(_)) => {
                self.bind_local_class(node, owner, scope, reporter)?;
            }
            Some(_) => self.bind_expression(scope, owner, node, reporter)?,
            None => {
                return Err(InternalError::MalformedSyntax {
                    node: node.0,
                    expected: "statement",
                });
            }
        }
        Ok(())
    }

    /// Declare a class found in a body. Its header and members are bound
    /// here; its bodies wait in `local_class_bodies` until the class is
    /// locked.
    fn bind_local_class(
        &mut self,
        node: NodeIndex,
        owner: DescriptorId,
        scope: ScopeId,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<DescriptorId, InternalError> {
        let first = self.classes.len();
        let class = self.discover_class(node, owner, scope, None, true, reporter)?;
        let discovered = self.classes[first..].to_vec();
        for &class in &discovered {
            self.resolve_class_header(class, reporter)?;
        }
        let mark = self.pending_bodies.len();
        for &class in &discovered {
            self.bind_class_members(class, reporter)?;
        }
        let held = self.pending_bodies.split_off(mark);
        trace!(class = class.0, classes = discovered.len(), bodies = held.len(), "bound local class");
        self.local_class_bodies.extend(held);
        self.local_classes.extend(discovered);
        Ok(class)
    }

    /// Local classes declared since the last call, outer classes first.
    pub fn take_local_classes(&mut self) -> Vec<DescriptorId> {
        std::mem::take(&mut self.local_classes)
    }

    /// Lock `classes` once override resolution has run on them and queue the
    /// bodies held back for them; `bind_bodies` binds those next.
    pub fn finish_local_classes(&mut self, classes: &[DescriptorId]) -> Result<(), InternalError> {
        for &class in classes {
            if !self.descriptors.class(class).is_some_and(|data| data.is_locked()) {
                self.lock_class_scopes(class)?;
            }
        }
        self.pending_bodies.append(&mut self.local_class_bodies);
        Ok(())
    }

    fn bind_block(
        &mut self,
        parent: ScopeId,
        owner: DescriptorId,
        node: NodeIndex,
        statements: &[NodeIndex],
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let policy = self.reporting_policy();
        let scope = self.scopes.new_scope(Some(parent), owner, policy, "block");
        self.expression_scopes.insert(node, scope);
        for &statement in statements {
            self.bind_statement(scope, owner, statement, reporter)?;
        }
        self.scopes.lock(scope)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Record `node` and its subexpressions against `scope`.
    fn bind_expression(
        &mut self,
        scope: ScopeId,
        owner: DescriptorId,
        node: NodeIndex,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        if node.is_none() {
            return Ok(());
        }
        let syntax = self.syntax;
        let Some(data) = syntax.data(node) else {
            return Err(InternalError::MalformedSyntax {
                node: node.0,
                expected: "expression",
            });
        };
        if let NodeData::Block(block) = data {
            return self.bind_block(scope, owner, node, &block.statements, reporter);
        }
        self.expression_scopes.insert(node, scope);

        match data {
            NodeData::Call(call) => {
                self.bind_expression(scope, owner, call.callee, reporter)?;
                self.bind_expression(scope, owner, call.value_arguments, reporter)?;
                for &lambda in &call.lambda_arguments {
                    self.bind_expression(scope, owner, lambda, reporter)?;
                }
            }
            NodeData::ValueArgumentList(list) => {
                for &argument in &list.arguments {
                    self.bind_expression(scope, owner, argument, reporter)?;
                }
            }
            NodeData::ValueArgument(argument) => {
                self.bind_expression(scope, owner, argument.expression, reporter)?;
            }
            NodeData::Qualified(qualified) => {
                self.bind_expression(scope, owner, qualified.receiver, reporter)?;
                self.bind_expression(scope, owner, qualified.selector, reporter)?;
            }
            NodeData::Binary(binary) => {
                self.bind_expression(scope, owner, binary.left, reporter)?;
                self.bind_expression(scope, owner, binary.operation, reporter)?;
                self.bind_expression(scope, owner, binary.right, reporter)?;
            }
            NodeData::ArrayAccess(access) => {
                self.bind_expression(scope, owner, access.array, reporter)?;
                for &index in &access.indices {
                    self.bind_expression(scope, owner, index, reporter)?;
                }
            }
            NodeData::Assignment(assignment) => {
                self.bind_expression(scope, owner, assignment.target, reporter)?;
                self.bind_expression(scope, owner, assignment.value, reporter)?;
            }
            NodeData::ArrayLiteral(elements) => {
                for &element in elements {
                    self.bind_expression(scope, owner, element, reporter)?;
                }
            }
            NodeData::Lambda(_) => {
                self.bind_lambda(scope, owner, node, reporter)?;
            }
            NodeData::Name(_)
            | NodeData::This
            | NodeData::Literal(_)
            | NodeData::OperationReference(_) => {}
            other => {
                warn!(node = node.0, kind = other.kind_name(), "not an expression");
            }
        }
        Ok(())
    }

    /// A lambda is an anonymous local function with its own scope.
    fn bind_lambda(
        &mut self,
        scope: ScopeId,
        owner: DescriptorId,
        node: NodeIndex,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let syntax = self.syntax;
        let Some(lambda) = syntax.lambda_data(node) else {
            return Err(InternalError::MalformedSyntax {
                node: node.0,
                expected: "lambda",
            });
        };
        let anonymous = syntax
            .interner()
            .lookup("<anonymous>")
            .ok_or(InternalError::MissingBuiltin { name: "<anonymous>" })?;
        let function = self.descriptors.alloc(
            Some(owner),
            Vec::new(),
            anonymous,
            node,
            DescriptorData::Function(CallableData::new(
                JetType::Error,
                Modality::Final,
                Visibility::Local,
            )),
        );
        self.node_descriptors.insert(node, function);

        let parameters = self.bind_value_parameters(function, &lambda.parameters, scope, reporter)?;
        self.descriptors.callable_mut(function)?.value_parameters = parameters.clone();

        let policy = self.reporting_policy();
        let body_scope = self.scopes.new_scope(Some(scope), function, policy, "lambda");
        for &parameter in &parameters {
            let name = self.descriptors.name(parameter);
            self.scopes.add_variable(body_scope, name, parameter)?;
        }
        match syntax.data(lambda.body) {
            Some(NodeData::Block(block)) => {
                self.expression_scopes.insert(lambda.body, body_scope);
                for &statement in &block.statements {
                    self.bind_statement(body_scope, function, statement, reporter)?;
                }
            }
            Some(_) => self.bind_expression(body_scope, function, lambda.body, reporter)?,
            None => {}
        }
        self.scopes.lock(body_scope)
    }
}
