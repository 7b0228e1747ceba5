//! NodeArena creation methods.
//!
//! Hosts that already have a parser translate their trees through these
//! methods; tests use them directly. Leaf nodes are created with plain
//! methods, declarations with small fluent builders that push the node on
//! `finish()`.

use jetc_common::{Atom, Interner, Span};

use crate::Modifiers;
use crate::node::*;

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Get a reference to the interner
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        self.interner.intern(s)
    }

    /// Hand out a fresh synthetic span `len` bytes long.
    fn next_span(&mut self, len: usize) -> Span {
        let start = self.cursor;
        let end = start + (len.max(1) as u32);
        self.cursor = end + 1;
        Span::new(start, end)
    }

    /// Push a node with an explicit span.
    pub fn add_node_with_span(&mut self, span: Span, data: NodeData) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node { span, data });
        index
    }

    /// Push a node with a synthetic span sized after `hint`.
    pub fn add_node(&mut self, hint: usize, data: NodeData) -> NodeIndex {
        let span = self.next_span(hint);
        self.add_node_with_span(span, data)
    }

    /// Override the span of an existing node (hosts mapping real offsets).
    pub fn set_span(&mut self, index: NodeIndex, span: Span) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.span = span;
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn file(&mut self, name: &str, declarations: Vec<NodeIndex>) -> NodeIndex {
        self.add_node(
            name.len(),
            NodeData::File(FileData {
                name: name.to_string(),
                declarations,
            }),
        )
    }

    pub fn class(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name, ClassKind::Class)
    }

    pub fn interface(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name, ClassKind::Interface)
    }

    pub fn object(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name, ClassKind::Object)
    }

    pub fn class_of_kind(&mut self, name: &str, kind: ClassKind) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name, kind)
    }

    /// `companion object`, named `Companion` unless a name is given.
    pub fn companion(&mut self, name: Option<&str>) -> ClassBuilder<'_> {
        let mut builder = ClassBuilder::new(self, name.unwrap_or("Companion"), ClassKind::Object);
        builder.data.modifiers |= Modifiers::COMPANION;
        builder
    }

    pub fn type_parameter(&mut self, name: &str, upper_bound: NodeIndex) -> NodeIndex {
        let name_atom = self.intern(name);
        self.add_node(
            name.len(),
            NodeData::TypeParameter(TypeParameterDecl {
                name: name_atom,
                upper_bound,
            }),
        )
    }

    /// A plain supertype entry (`: Iface`).
    pub fn supertype(&mut self, type_ref: NodeIndex) -> NodeIndex {
        self.add_node(
            1,
            NodeData::SupertypeEntry(SupertypeEntry {
                type_ref,
                constructor_arguments: None,
            }),
        )
    }

    /// A superclass constructor invocation (`: Base(args)`).
    pub fn supertype_call(&mut self, type_ref: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        let list = self.add_node(
            2,
            NodeData::ValueArgumentList(ValueArgumentListData { arguments }),
        );
        self.add_node(
            1,
            NodeData::SupertypeEntry(SupertypeEntry {
                type_ref,
                constructor_arguments: Some(list),
            }),
        )
    }

    pub fn parameter(&mut self, name: &str, type_ref: NodeIndex) -> NodeIndex {
        self.parameter_builder(name, type_ref).finish()
    }

    /// Primary constructor parameter promoted to a property.
    pub fn property_parameter(
        &mut self,
        name: &str,
        type_ref: NodeIndex,
        val_or_var: ValOrVar,
    ) -> NodeIndex {
        self.parameter_builder(name, type_ref)
            .val_or_var(val_or_var)
            .finish()
    }

    pub fn parameter_builder(&mut self, name: &str, type_ref: NodeIndex) -> ParameterBuilder<'_> {
        let name_atom = self.intern(name);
        ParameterBuilder {
            hint: name.len(),
            data: ParameterDecl {
                name: name_atom,
                modifiers: Modifiers::empty(),
                type_ref,
                default_value: NodeIndex::NONE,
                is_vararg: false,
                val_or_var: None,
            },
            arena: self,
        }
    }

    pub fn function(&mut self, name: &str) -> FunctionBuilder<'_> {
        let name_atom = self.intern(name);
        FunctionBuilder {
            hint: name.len(),
            data: FunctionDecl {
                name: name_atom,
                modifiers: Modifiers::empty(),
                type_parameters: Vec::new(),
                receiver_type: NodeIndex::NONE,
                value_parameters: Vec::new(),
                return_type: NodeIndex::NONE,
                body: NodeIndex::NONE,
            },
            arena: self,
        }
    }

    pub fn property(&mut self, name: &str, type_ref: NodeIndex) -> PropertyBuilder<'_> {
        let name_atom = self.intern(name);
        PropertyBuilder {
            hint: name.len(),
            data: PropertyDecl {
                name: name_atom,
                modifiers: Modifiers::empty(),
                is_var: false,
                type_parameters: Vec::new(),
                receiver_type: NodeIndex::NONE,
                type_ref,
                initializer: NodeIndex::NONE,
            },
            arena: self,
        }
    }

    pub fn secondary_constructor(
        &mut self,
        modifiers: Modifiers,
        value_parameters: Vec<NodeIndex>,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add_node(
            "constructor".len(),
            NodeData::SecondaryConstructor(SecondaryConstructorDecl {
                modifiers,
                value_parameters,
                body,
            }),
        )
    }

    // =========================================================================
    // Types, blocks, locals
    // =========================================================================

    pub fn type_ref(&mut self, name: &str) -> NodeIndex {
        self.generic_type_ref(name, Vec::new(), false)
    }

    pub fn nullable_type_ref(&mut self, name: &str) -> NodeIndex {
        self.generic_type_ref(name, Vec::new(), true)
    }

    pub fn generic_type_ref(
        &mut self,
        name: &str,
        arguments: Vec<NodeIndex>,
        nullable: bool,
    ) -> NodeIndex {
        let name_atom = self.intern(name);
        self.add_node(
            name.len(),
            NodeData::TypeReference(TypeReferenceData {
                name: name_atom,
                arguments,
                nullable,
            }),
        )
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add_node(2, NodeData::Block(BlockData { statements }))
    }

    pub fn local_variable(
        &mut self,
        name: &str,
        is_var: bool,
        type_ref: NodeIndex,
        initializer: NodeIndex,
    ) -> NodeIndex {
        let name_atom = self.intern(name);
        self.add_node(
            name.len(),
            NodeData::LocalVariable(LocalVariableDecl {
                name: name_atom,
                is_var,
                type_ref,
                initializer,
            }),
        )
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn name_expr(&mut self, name: &str) -> NodeIndex {
        let name_atom = self.intern(name);
        self.add_node(name.len(), NodeData::Name(name_atom))
    }

    pub fn this_expr(&mut self) -> NodeIndex {
        self.add_node(4, NodeData::This)
    }

    pub fn int_literal(&mut self, value: i64) -> NodeIndex {
        self.add_node(
            value.to_string().len(),
            NodeData::Literal(Literal::Int(value)),
        )
    }

    pub fn string_literal(&mut self, value: &str) -> NodeIndex {
        self.add_node(
            value.len() + 2,
            NodeData::Literal(Literal::String(value.to_string())),
        )
    }

    pub fn bool_literal(&mut self, value: bool) -> NodeIndex {
        self.add_node(5, NodeData::Literal(Literal::Boolean(value)))
    }

    pub fn null_literal(&mut self) -> NodeIndex {
        self.add_node(4, NodeData::Literal(Literal::Null))
    }

    /// Positional value argument.
    pub fn arg(&mut self, expression: NodeIndex) -> NodeIndex {
        self.push_value_argument(Atom::NONE, false, expression)
    }

    pub fn named_arg(&mut self, name: &str, expression: NodeIndex) -> NodeIndex {
        let name_atom = self.intern(name);
        self.push_value_argument(name_atom, false, expression)
    }

    pub fn spread_arg(&mut self, expression: NodeIndex) -> NodeIndex {
        self.push_value_argument(Atom::NONE, true, expression)
    }

    fn push_value_argument(&mut self, name: Atom, spread: bool, expression: NodeIndex) -> NodeIndex {
        self.add_node(
            1,
            NodeData::ValueArgument(ValueArgumentData {
                name,
                spread,
                expression,
            }),
        )
    }

    /// `callee(arguments)` where `arguments` are `ValueArgument` nodes.
    pub fn call(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.call_builder(callee).arguments(arguments).finish()
    }

    pub fn call_builder(&mut self, callee: NodeIndex) -> CallBuilder<'_> {
        CallBuilder {
            callee,
            type_arguments: Vec::new(),
            arguments: Some(Vec::new()),
            lambda_arguments: Vec::new(),
            arena: self,
        }
    }

    pub fn lambda(&mut self, parameters: Vec<NodeIndex>, body: NodeIndex) -> NodeIndex {
        self.add_node(2, NodeData::Lambda(LambdaData { parameters, body }))
    }

    pub fn qualified(&mut self, receiver: NodeIndex, selector: NodeIndex) -> NodeIndex {
        self.add_node(
            1,
            NodeData::Qualified(QualifiedData {
                receiver,
                selector,
                safe: false,
            }),
        )
    }

    pub fn safe_qualified(&mut self, receiver: NodeIndex, selector: NodeIndex) -> NodeIndex {
        self.add_node(
            2,
            NodeData::Qualified(QualifiedData {
                receiver,
                selector,
                safe: true,
            }),
        )
    }

    pub fn binary(&mut self, left: NodeIndex, op: BinaryOp, right: NodeIndex) -> NodeIndex {
        let operation = self.add_node(op.token().len(), NodeData::OperationReference(op));
        self.add_node(
            1,
            NodeData::Binary(BinaryData {
                left,
                operation,
                right,
            }),
        )
    }

    pub fn array_access(&mut self, array: NodeIndex, indices: Vec<NodeIndex>) -> NodeIndex {
        self.add_node(2, NodeData::ArrayAccess(ArrayAccessData { array, indices }))
    }

    pub fn assignment(&mut self, target: NodeIndex, value: NodeIndex) -> NodeIndex {
        self.add_node(1, NodeData::Assignment(AssignmentData { target, value }))
    }

    pub fn array_literal(&mut self, elements: Vec<NodeIndex>) -> NodeIndex {
        self.add_node(2, NodeData::ArrayLiteral(elements))
    }
}

// =============================================================================
// Builders
// =============================================================================

pub struct ClassBuilder<'a> {
    arena: &'a mut NodeArena,
    hint: usize,
    data: ClassDecl,
}

impl<'a> ClassBuilder<'a> {
    fn new(arena: &'a mut NodeArena, name: &str, kind: ClassKind) -> Self {
        let name_atom = arena.intern(name);
        ClassBuilder {
            hint: name.len(),
            data: ClassDecl {
                name: name_atom,
                kind,
                modifiers: Modifiers::empty(),
                type_parameters: Vec::new(),
                supertypes: Vec::new(),
                primary_constructor: None,
                members: Vec::new(),
            },
            arena,
        }
    }

    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.data.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn type_parameter(mut self, type_parameter: NodeIndex) -> Self {
        self.data.type_parameters.push(type_parameter);
        self
    }

    /// Add a `SupertypeEntry` node.
    #[must_use]
    pub fn supertype(mut self, entry: NodeIndex) -> Self {
        self.data.supertypes.push(entry);
        self
    }

    /// Declare a primary constructor with the given parameters.
    #[must_use]
    pub fn primary_constructor(mut self, parameters: Vec<NodeIndex>) -> Self {
        self.data.primary_constructor = Some(parameters);
        self
    }

    #[must_use]
    pub fn member(mut self, member: NodeIndex) -> Self {
        self.data.members.push(member);
        self
    }

    #[must_use]
    pub fn members(mut self, members: impl IntoIterator<Item = NodeIndex>) -> Self {
        self.data.members.extend(members);
        self
    }

    pub fn finish(self) -> NodeIndex {
        self.arena.add_node(self.hint, NodeData::Class(self.data))
    }
}

pub struct FunctionBuilder<'a> {
    arena: &'a mut NodeArena,
    hint: usize,
    data: FunctionDecl,
}

impl FunctionBuilder<'_> {
    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.data.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn type_parameter(mut self, type_parameter: NodeIndex) -> Self {
        self.data.type_parameters.push(type_parameter);
        self
    }

    #[must_use]
    pub fn receiver(mut self, receiver_type: NodeIndex) -> Self {
        self.data.receiver_type = receiver_type;
        self
    }

    #[must_use]
    pub fn parameter(mut self, parameter: NodeIndex) -> Self {
        self.data.value_parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn returns(mut self, return_type: NodeIndex) -> Self {
        self.data.return_type = return_type;
        self
    }

    #[must_use]
    pub fn body(mut self, body: NodeIndex) -> Self {
        self.data.body = body;
        self
    }

    pub fn finish(self) -> NodeIndex {
        self.arena.add_node(self.hint, NodeData::Function(self.data))
    }
}

pub struct PropertyBuilder<'a> {
    arena: &'a mut NodeArena,
    hint: usize,
    data: PropertyDecl,
}

impl PropertyBuilder<'_> {
    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.data.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn var(mut self) -> Self {
        self.data.is_var = true;
        self
    }

    #[must_use]
    pub fn type_parameter(mut self, type_parameter: NodeIndex) -> Self {
        self.data.type_parameters.push(type_parameter);
        self
    }

    #[must_use]
    pub fn receiver(mut self, receiver_type: NodeIndex) -> Self {
        self.data.receiver_type = receiver_type;
        self
    }

    #[must_use]
    pub fn initializer(mut self, initializer: NodeIndex) -> Self {
        self.data.initializer = initializer;
        self
    }

    pub fn finish(self) -> NodeIndex {
        self.arena.add_node(self.hint, NodeData::Property(self.data))
    }
}

pub struct ParameterBuilder<'a> {
    arena: &'a mut NodeArena,
    hint: usize,
    data: ParameterDecl,
}

impl ParameterBuilder<'_> {
    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.data.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: NodeIndex) -> Self {
        self.data.default_value = value;
        self
    }

    #[must_use]
    pub fn vararg(mut self) -> Self {
        self.data.is_vararg = true;
        self.data.modifiers |= Modifiers::VARARG;
        self
    }

    #[must_use]
    pub fn val_or_var(mut self, val_or_var: ValOrVar) -> Self {
        self.data.val_or_var = Some(val_or_var);
        self
    }

    pub fn finish(self) -> NodeIndex {
        self.arena.add_node(self.hint, NodeData::Parameter(self.data))
    }
}

pub struct CallBuilder<'a> {
    arena: &'a mut NodeArena,
    callee: NodeIndex,
    type_arguments: Vec<NodeIndex>,
    /// `None` when the call has no parenthesized argument list.
    arguments: Option<Vec<NodeIndex>>,
    lambda_arguments: Vec<NodeIndex>,
}

impl CallBuilder<'_> {
    #[must_use]
    pub fn type_argument(mut self, type_ref: NodeIndex) -> Self {
        self.type_arguments.push(type_ref);
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: NodeIndex) -> Self {
        self.arguments.get_or_insert_with(Vec::new).push(argument);
        self
    }

    #[must_use]
    pub fn arguments(mut self, arguments: impl IntoIterator<Item = NodeIndex>) -> Self {
        self.arguments.get_or_insert_with(Vec::new).extend(arguments);
        self
    }

    /// `f { ... }`: only trailing lambdas, no parentheses.
    #[must_use]
    pub fn without_parentheses(mut self) -> Self {
        self.arguments = None;
        self
    }

    #[must_use]
    pub fn lambda(mut self, lambda: NodeIndex) -> Self {
        self.lambda_arguments.push(lambda);
        self
    }

    pub fn finish(self) -> NodeIndex {
        let value_arguments = match self.arguments {
            Some(arguments) => self.arena.add_node(
                2,
                NodeData::ValueArgumentList(ValueArgumentListData { arguments }),
            ),
            None => NodeIndex::NONE,
        };
        self.arena.add_node(
            1,
            NodeData::Call(CallExprData {
                callee: self.callee,
                type_arguments: self.type_arguments,
                value_arguments,
                lambda_arguments: self.lambda_arguments,
            }),
        )
    }
}
