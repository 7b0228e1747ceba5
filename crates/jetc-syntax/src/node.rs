//! Syntax node storage.
//!
//! Nodes live in a flat `NodeArena` and refer to each other by `NodeIndex`.
//! Declarations expose exactly what declaration binding needs: names,
//! modifiers, supertype entries, parameter lists and child declarations.
//! Expressions are limited to the forms that produce calls.

use jetc_common::{Atom, Interner, Span};
use serde::Serialize;

use crate::Modifiers;

/// Index of a node in a `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel for an absent child (no return type, no body, ...).
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    /// `None` for the sentinel, `Some(self)` otherwise.
    #[inline]
    pub const fn get(self) -> Option<NodeIndex> {
        if self.is_none() { None } else { Some(self) }
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

/// Kind of a class-like declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    EnumClass,
    EnumEntry,
    AnnotationClass,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Object => "object",
            ClassKind::EnumClass => "enum class",
            ClassKind::EnumEntry => "enum entry",
            ClassKind::AnnotationClass => "annotation class",
        }
    }

    /// Singletons: objects and enum entries.
    pub fn is_singleton(self) -> bool {
        matches!(self, ClassKind::Object | ClassKind::EnumEntry)
    }
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct FileData {
    pub name: String,
    pub declarations: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub name: Atom,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<NodeIndex>,
    /// `SupertypeEntry` nodes in declaration order.
    pub supertypes: Vec<NodeIndex>,
    /// Parameters of the primary constructor, when one is declared.
    pub primary_constructor: Option<Vec<NodeIndex>>,
    pub members: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct TypeParameterDecl {
    pub name: Atom,
    /// `TypeReference`, or NONE for an implicit `Any?` bound.
    pub upper_bound: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct SupertypeEntry {
    pub type_ref: NodeIndex,
    /// Arguments of a superclass constructor invocation (`: Base(1)`).
    /// `None` for a plain type entry (`: Iface`).
    pub constructor_arguments: Option<NodeIndex>,
}

/// `val`/`var` marker on a primary constructor parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ValOrVar {
    Val,
    Var,
}

#[derive(Clone, Debug)]
pub struct ParameterDecl {
    pub name: Atom,
    pub modifiers: Modifiers,
    pub type_ref: NodeIndex,
    pub default_value: NodeIndex,
    pub is_vararg: bool,
    /// Promotes a primary constructor parameter to a property.
    pub val_or_var: Option<ValOrVar>,
}

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: Atom,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<NodeIndex>,
    pub receiver_type: NodeIndex,
    pub value_parameters: Vec<NodeIndex>,
    pub return_type: NodeIndex,
    /// `Block` or expression body, NONE for abstract/interface members.
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct PropertyDecl {
    pub name: Atom,
    pub modifiers: Modifiers,
    pub is_var: bool,
    pub type_parameters: Vec<NodeIndex>,
    pub receiver_type: NodeIndex,
    pub type_ref: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct SecondaryConstructorDecl {
    pub modifiers: Modifiers,
    pub value_parameters: Vec<NodeIndex>,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeReferenceData {
    pub name: Atom,
    pub arguments: Vec<NodeIndex>,
    pub nullable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BlockData {
    pub statements: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct LocalVariableDecl {
    pub name: Atom,
    pub is_var: bool,
    pub type_ref: NodeIndex,
    pub initializer: NodeIndex,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Clone, Debug)]
pub struct CallExprData {
    pub callee: NodeIndex,
    pub type_arguments: Vec<NodeIndex>,
    /// `ValueArgumentList` node, NONE for `f { ... }`.
    pub value_arguments: NodeIndex,
    /// Trailing lambda expressions.
    pub lambda_arguments: Vec<NodeIndex>,
}

#[derive(Clone, Debug, Default)]
pub struct ValueArgumentListData {
    pub arguments: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct ValueArgumentData {
    /// `Atom::NONE` for a positional argument.
    pub name: Atom,
    pub spread: bool,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Default)]
pub struct LambdaData {
    pub parameters: Vec<NodeIndex>,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct QualifiedData {
    pub receiver: NodeIndex,
    pub selector: NodeIndex,
    /// `?.` rather than `.`
    pub safe: bool,
}

/// Binary operators that appear in an operation reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Div,
    Rem,
    RangeTo,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    In,
    NotIn,
    Equals,
    NotEquals,
    And,
    Or,
}

impl BinaryOp {
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::RangeTo => "..",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEq => "<=",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "!in",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BinaryData {
    pub left: NodeIndex,
    /// `OperationReference` node; the callee of the desugared call.
    pub operation: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ArrayAccessData {
    pub array: NodeIndex,
    pub indices: Vec<NodeIndex>,
}

#[derive(Clone, Debug)]
pub struct AssignmentData {
    pub target: NodeIndex,
    pub value: NodeIndex,
}

// =============================================================================
// Node
// =============================================================================

#[derive(Clone, Debug)]
pub enum NodeData {
    File(FileData),
    Class(ClassDecl),
    TypeParameter(TypeParameterDecl),
    SupertypeEntry(SupertypeEntry),
    Parameter(ParameterDecl),
    Function(FunctionDecl),
    Property(PropertyDecl),
    SecondaryConstructor(SecondaryConstructorDecl),
    TypeReference(TypeReferenceData),
    Block(BlockData),
    LocalVariable(LocalVariableDecl),
    Name(Atom),
    This,
    Literal(Literal),
    Call(CallExprData),
    ValueArgumentList(ValueArgumentListData),
    ValueArgument(ValueArgumentData),
    Lambda(LambdaData),
    Qualified(QualifiedData),
    Binary(BinaryData),
    OperationReference(BinaryOp),
    ArrayAccess(ArrayAccessData),
    Assignment(AssignmentData),
    ArrayLiteral(Vec<NodeIndex>),
}

impl NodeData {
    /// Short kind name for logging and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeData::File(_) => "file",
            NodeData::Class(_) => "class",
            NodeData::TypeParameter(_) => "type parameter",
            NodeData::SupertypeEntry(_) => "supertype entry",
            NodeData::Parameter(_) => "parameter",
            NodeData::Function(_) => "function",
            NodeData::Property(_) => "property",
            NodeData::SecondaryConstructor(_) => "secondary constructor",
            NodeData::TypeReference(_) => "type reference",
            NodeData::Block(_) => "block",
            NodeData::LocalVariable(_) => "local variable",
            NodeData::Name(_) => "name",
            NodeData::This => "this",
            NodeData::Literal(_) => "literal",
            NodeData::Call(_) => "call",
            NodeData::ValueArgumentList(_) => "value argument list",
            NodeData::ValueArgument(_) => "value argument",
            NodeData::Lambda(_) => "lambda",
            NodeData::Qualified(_) => "qualified expression",
            NodeData::Binary(_) => "binary expression",
            NodeData::OperationReference(_) => "operation reference",
            NodeData::ArrayAccess(_) => "array access",
            NodeData::Assignment(_) => "assignment",
            NodeData::ArrayLiteral(_) => "array literal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub span: Span,
    pub data: NodeData,
}

/// Flat storage for one or more syntax trees.
///
/// The arena owns the interner so names can be interned while trees are
/// built; analysis only ever borrows it immutably.
#[derive(Clone, Default)]
pub struct NodeArena {
    pub(crate) interner: Interner,
    pub(crate) nodes: Vec<Node>,
    /// Next synthetic source offset handed out by the builders.
    pub(crate) cursor: u32,
}
