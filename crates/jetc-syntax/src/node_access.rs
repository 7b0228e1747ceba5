//! Read access to nodes in a `NodeArena`.

use jetc_common::{Atom, Span};

use crate::node::*;

macro_rules! typed_accessors {
    ($($fn_name:ident => $variant:ident ( $ty:ty )),+ $(,)?) => {
        $(
            #[inline]
            pub fn $fn_name(&self, index: NodeIndex) -> Option<&$ty> {
                match self.data(index)? {
                    NodeData::$variant(data) => Some(data),
                    _ => None,
                }
            }
        )+
    };
}

impl NodeArena {
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get(index.0 as usize)
    }

    #[inline]
    pub fn data(&self, index: NodeIndex) -> Option<&NodeData> {
        self.get(index).map(|node| &node.data)
    }

    /// Span of a node, `Span::DUMMY` for NONE or out-of-range indices.
    #[inline]
    pub fn span(&self, index: NodeIndex) -> Span {
        self.get(index).map_or(Span::DUMMY, |node| node.span)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve an atom through the arena's interner.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    typed_accessors! {
        file_data => File(FileData),
        class_decl => Class(ClassDecl),
        type_parameter_decl => TypeParameter(TypeParameterDecl),
        supertype_entry => SupertypeEntry(SupertypeEntry),
        parameter_decl => Parameter(ParameterDecl),
        function_decl => Function(FunctionDecl),
        property_decl => Property(PropertyDecl),
        secondary_constructor_decl => SecondaryConstructor(SecondaryConstructorDecl),
        type_reference => TypeReference(TypeReferenceData),
        block_data => Block(BlockData),
        local_variable_decl => LocalVariable(LocalVariableDecl),
        call_expr => Call(CallExprData),
        value_argument_list => ValueArgumentList(ValueArgumentListData),
        value_argument => ValueArgument(ValueArgumentData),
        lambda_data => Lambda(LambdaData),
        qualified_data => Qualified(QualifiedData),
        binary_data => Binary(BinaryData),
        array_access_data => ArrayAccess(ArrayAccessData),
        assignment_data => Assignment(AssignmentData),
    }

    /// Name of a named node (declarations and simple names).
    pub fn name_of(&self, index: NodeIndex) -> Option<Atom> {
        match self.data(index)? {
            NodeData::Class(data) => Some(data.name),
            NodeData::TypeParameter(data) => Some(data.name),
            NodeData::Parameter(data) => Some(data.name),
            NodeData::Function(data) => Some(data.name),
            NodeData::Property(data) => Some(data.name),
            NodeData::TypeReference(data) => Some(data.name),
            NodeData::LocalVariable(data) => Some(data.name),
            NodeData::Name(name) => Some(*name),
            _ => None,
        }
    }

    pub fn operation(&self, index: NodeIndex) -> Option<BinaryOp> {
        match self.data(index)? {
            NodeData::OperationReference(op) => Some(*op),
            _ => None,
        }
    }

    pub fn array_literal_elements(&self, index: NodeIndex) -> Option<&[NodeIndex]> {
        match self.data(index)? {
            NodeData::ArrayLiteral(elements) => Some(elements),
            _ => None,
        }
    }

    /// Render a type reference back to source form (`Array<Int>?`).
    pub fn type_ref_text(&self, index: NodeIndex) -> String {
        let Some(data) = self.type_reference(index) else {
            return String::from("<no type>");
        };
        let mut text = self.resolve(data.name).to_string();
        if !data.arguments.is_empty() {
            let args: Vec<String> = data
                .arguments
                .iter()
                .map(|&arg| self.type_ref_text(arg))
                .collect();
            text.push('<');
            text.push_str(&args.join(", "));
            text.push('>');
        }
        if data.nullable {
            text.push('?');
        }
        text
    }
}
