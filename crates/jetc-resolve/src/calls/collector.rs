//! Call table construction.
//!
//! Walks every expression recorded during body binding, builds the `Call`
//! each call-producing node denotes and gives every expression a
//! best-effort type. Receiver types feed candidate collection, so typing
//! and call construction happen in one memoized pass. A callee is picked
//! only to type the expression; the call table carries no resolution.

use jetc_binder::{BinderState, ScopeId};
use jetc_descriptors::{
    Builtins, DescriptorArena, DescriptorData, DescriptorId, InternalError, JetType, TypeSubstitutor,
};
use jetc_syntax::{BinaryOp, Literal, NodeData, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::call::{Call, Receiver};
use super::call_maker::CallMaker;
use super::candidates::{ArgumentShape, CandidateCollector};

/// Output of call collection.
#[derive(Debug, Default)]
pub struct CollectedCalls {
    /// Calls by `call_element`.
    pub calls: FxHashMap<NodeIndex, Call>,
    pub expression_types: FxHashMap<NodeIndex, JetType>,
}

pub struct CallCollector<'s, 'a> {
    state: &'s BinderState<'a>,
    maker: CallMaker<'a>,
    /// Selector node -> enclosing `Qualified` node.
    qualified_parents: FxHashMap<NodeIndex, NodeIndex>,
    /// Names that are the callee of a call rather than a property read.
    callees: FxHashSet<NodeIndex>,
    /// Indexing expressions written to, which become `set` calls.
    assignment_targets: FxHashSet<NodeIndex>,
    output: CollectedCalls,
}

impl<'s, 'a> CallCollector<'s, 'a> {
    pub fn new(state: &'s BinderState<'a>) -> Self {
        CallCollector {
            state,
            maker: CallMaker::new(state.syntax()),
            qualified_parents: FxHashMap::default(),
            callees: FxHashSet::default(),
            assignment_targets: FxHashSet::default(),
            output: CollectedCalls::default(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn collect(mut self) -> Result<CollectedCalls, InternalError> {
        let mut nodes: Vec<NodeIndex> = self.state.expression_scopes.keys().copied().collect();
        nodes.sort_unstable();

        let syntax = self.state.syntax();
        for &node in &nodes {
            match syntax.data(node) {
                Some(NodeData::Qualified(qualified)) => {
                    self.qualified_parents.insert(qualified.selector, node);
                }
                Some(NodeData::Call(call)) => {
                    self.callees.insert(call.callee);
                }
                Some(NodeData::Assignment(assignment)) => {
                    self.assignment_targets.insert(assignment.target);
                }
                _ => {}
            }
        }

        for &node in &nodes {
            self.type_of(node)?;
        }
        self.collect_super_delegations()?;

        debug!(
            calls = self.output.calls.len(),
            typed = self.output.expression_types.len(),
            "collected calls"
        );
        Ok(self.output)
    }

    fn collect_super_delegations(&mut self) -> Result<(), InternalError> {
        let mut classes: Vec<DescriptorId> = self.state.supertype_refs.keys().copied().collect();
        classes.sort_unstable();
        for class in classes {
            let Some(refs) = self.state.supertype_refs.get(&class) else {
                continue;
            };
            for supertype in refs {
                if supertype.entry.is_none() {
                    continue;
                }
                if let Some(call) = self.maker.make_super_delegation(supertype.entry)? {
                    trace!(class = class.0, entry = supertype.entry.0, "super delegation call");
                    self.output.calls.insert(supertype.entry, call);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Typing
    // =========================================================================

    fn descriptors(&self) -> &'s DescriptorArena {
        &self.state.descriptors
    }

    fn builtins(&self) -> &'s Builtins {
        &self.state.builtins
    }

    fn scope_of(&self, node: NodeIndex) -> ScopeId {
        self.state
            .expression_scopes
            .get(&node)
            .copied()
            .unwrap_or(self.state.file_scope)
    }

    fn type_of(&mut self, node: NodeIndex) -> Result<JetType, InternalError> {
        if node.is_none() {
            return Ok(JetType::Error);
        }
        if let Some(ty) = self.output.expression_types.get(&node) {
            return Ok(ty.clone());
        }
        let ty = self.compute_type(node)?;
        self.output.expression_types.insert(node, ty.clone());
        Ok(ty)
    }

    fn compute_type(&mut self, node: NodeIndex) -> Result<JetType, InternalError> {
        let syntax = self.state.syntax();
        let builtins = *self.builtins();
        let Some(data) = syntax.data(node) else {
            return Ok(JetType::Error);
        };
        let ty = match data {
            NodeData::Literal(literal) => match literal {
                Literal::Int(_) => builtins.int_type(),
                Literal::String(_) => builtins.string_type(),
                Literal::Boolean(_) => builtins.boolean_type(),
                Literal::Null => builtins.nothing_type().make_nullable(),
            },
            NodeData::This => self.this_type(self.scope_of(node)),
            NodeData::Name(_) => {
                if self.callees.contains(&node) {
                    return Ok(JetType::Error);
                }
                let (receiver, safe) = self.receiver_for(node)?;
                let call = self.maker.make_property_call(node, receiver, safe)?;
                self.record(call)?
            }
            NodeData::Call(call_data) => {
                let (mut receiver, safe) = self.receiver_for(node)?;
                if syntax.name_of(call_data.callee).is_none() && !receiver.exists() {
                    receiver = Receiver::Expression {
                        expression: call_data.callee,
                        ty: self.type_of(call_data.callee)?,
                    };
                }
                let call = self.maker.make_call(node, receiver, safe)?;
                self.record(call)?
            }
            NodeData::Qualified(qualified) => {
                self.type_of(qualified.receiver)?;
                let selected = self.type_of(qualified.selector)?;
                if qualified.safe {
                    selected.make_nullable()
                } else {
                    selected
                }
            }
            NodeData::Binary(binary) => {
                let op = syntax.operation(binary.operation);
                let receiver = match self.maker.binary_receiver_operand(node) {
                    Some(operand) => Receiver::Expression {
                        expression: operand,
                        ty: self.type_of(operand)?,
                    },
                    None => Receiver::None,
                };
                self.type_of(binary.left)?;
                self.type_of(binary.right)?;
                let returned = match self.maker.make_binary_call(node, receiver)? {
                    Some(call) => self.record(call)?,
                    None => JetType::Error,
                };
                match op {
                    Some(
                        BinaryOp::Plus
                        | BinaryOp::Minus
                        | BinaryOp::Times
                        | BinaryOp::Div
                        | BinaryOp::Rem
                        | BinaryOp::RangeTo,
                    ) => returned,
                    _ => builtins.boolean_type(),
                }
            }
            NodeData::ArrayAccess(access) => {
                let receiver = Receiver::Expression {
                    expression: access.array,
                    ty: self.type_of(access.array)?,
                };
                for &index in &access.indices {
                    self.type_of(index)?;
                }
                if self.assignment_targets.contains(&node) {
                    JetType::Error
                } else {
                    let call = self.maker.make_array_get(node, receiver)?;
                    self.record(call)?
                }
            }
            NodeData::Assignment(assignment) => {
                self.type_of(assignment.value)?;
                if let Some(access) = syntax.array_access_data(assignment.target) {
                    let receiver = Receiver::Expression {
                        expression: access.array,
                        ty: self.type_of(access.array)?,
                    };
                    if let Some(call) = self.maker.make_array_set(node, receiver)? {
                        self.record(call)?;
                    }
                }
                self.type_of(assignment.target)?;
                builtins.unit_type()
            }
            NodeData::ArrayLiteral(elements) => {
                let mut element_type = JetType::Error;
                for (i, &element) in elements.iter().enumerate() {
                    let ty = self.type_of(element)?;
                    if i == 0 {
                        element_type = ty;
                    }
                }
                let call = self.maker.make_array_literal(node)?;
                self.record(call)?;
                builtins.array_of(element_type)
            }
            NodeData::ValueArgument(argument) => self.type_of(argument.expression)?,
            NodeData::ValueArgumentList(list) => {
                for &argument in &list.arguments {
                    self.type_of(argument)?;
                }
                JetType::Error
            }
            _ => JetType::Error,
        };
        Ok(ty)
    }

    /// `this` in `scope`: the innermost implicit receiver.
    fn this_type(&self, scope: ScopeId) -> JetType {
        let descriptors = self.descriptors();
        let Some(&receiver) = self.state.scopes.get_implicit_receivers_hierarchy(scope).first() else {
            return JetType::Error;
        };
        if descriptors.is_class(receiver) {
            return descriptors.default_type(receiver);
        }
        descriptors
            .callable(receiver)
            .and_then(|callable| callable.extension_receiver.clone())
            .unwrap_or(JetType::Error)
    }

    /// Explicit receiver of the call made at `node`, when `node` is the
    /// selector of a qualified expression.
    fn receiver_for(&mut self, node: NodeIndex) -> Result<(Receiver, bool), InternalError> {
        let syntax = self.state.syntax();
        let Some(&parent) = self.qualified_parents.get(&node) else {
            return Ok((Receiver::None, false));
        };
        let Some(qualified) = syntax.qualified_data(parent) else {
            return Ok((Receiver::None, false));
        };
        Ok((self.explicit_receiver(qualified.receiver)?, qualified.safe))
    }

    /// A written receiver. `this` stands for the innermost implicit
    /// receiver: the enclosing class, or the receiver parameter of an
    /// enclosing extension.
    fn explicit_receiver(&mut self, expression: NodeIndex) -> Result<Receiver, InternalError> {
        let ty = self.type_of(expression)?;
        if !matches!(self.state.syntax().data(expression), Some(NodeData::This)) {
            return Ok(Receiver::Expression { expression, ty });
        }
        let implicit = self
            .state
            .scopes
            .get_implicit_receivers_hierarchy(self.scope_of(expression))
            .first()
            .copied();
        Ok(match implicit {
            Some(class) if self.descriptors().is_class(class) => Receiver::ClassThis { class, ty },
            Some(callable) => Receiver::Extension { callable, ty },
            None => Receiver::Expression { expression, ty },
        })
    }

    /// Store `call` and return the type of its value.
    fn record(&mut self, call: Call) -> Result<JetType, InternalError> {
        let scope = self.scope_of(call.call_element());
        let ty = self.value_type(&call, scope);
        trace!(
            node = call.call_element().0,
            name = self.state.text(call.callee_name()),
            "recorded call"
        );
        if let Some(previous) = self.output.calls.insert(call.call_element(), call) {
            return Err(InternalError::MalformedSyntax {
                node: previous.call_element().0,
                expected: "one call per expression",
            });
        }
        Ok(ty)
    }

    /// Type of the value a call produces, through the first applicable
    /// candidate. Ambiguity is not an error here.
    fn value_type(&self, call: &Call, scope: ScopeId) -> JetType {
        let descriptors = self.descriptors();
        let collector = CandidateCollector::new(descriptors, &self.state.scopes, self.builtins());
        let picked = collector
            .collect(call, scope)
            .into_iter()
            .flat_map(|group| group.candidates)
            .find(|candidate| candidate.shape == ArgumentShape::Applicable);
        let Some(candidate) = picked else {
            return JetType::Error;
        };

        let ty = match descriptors.get(candidate.descriptor).map(|d| &d.data) {
            Some(DescriptorData::Function(callable)) => callable.return_type.clone(),
            Some(DescriptorData::Property(property)) => property.callable.return_type.clone(),
            Some(DescriptorData::Constructor(constructor)) => constructor.return_type.clone(),
            Some(DescriptorData::LocalVariable(variable)) => variable.ty.clone(),
            Some(DescriptorData::ValueParameter(parameter)) => parameter.ty.clone(),
            _ => JetType::Error,
        };
        let ty = match call.explicit_receiver().ty() {
            Some(receiver @ JetType::Class { .. }) => {
                TypeSubstitutor::for_class_type(descriptors, &receiver.with_nullability(false))
                    .substitute_type(&ty)
            }
            _ => ty,
        };
        if call.is_safe_call() { ty.make_nullable() } else { ty }
    }
}
