//! The normalized call representation handed to overload resolution.
//!
//! A `Call` never changes after construction. Variants that differ from an
//! existing call in a few properties wrap it (`Call::Delegating`) and
//! override only those properties; every other accessor forwards to the
//! wrapped call.

use std::sync::Arc;

use jetc_common::Atom;
use jetc_descriptors::{DescriptorId, JetType};
use jetc_syntax::NodeIndex;
use serde::Serialize;

/// What a call is made on, when written explicitly or implied by an
/// extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    None,
    /// `expr.f()`: an expression with its (best-effort) type.
    Expression {
        expression: NodeIndex,
        ty: JetType,
    },
    /// `this` naming the receiver parameter of an enclosing extension
    /// callable.
    Extension {
        callable: DescriptorId,
        ty: JetType,
    },
    /// `this` naming an enclosing class.
    ClassThis {
        class: DescriptorId,
        ty: JetType,
    },
}

impl Receiver {
    #[inline]
    pub fn exists(&self) -> bool {
        !matches!(self, Receiver::None)
    }

    pub fn ty(&self) -> Option<&JetType> {
        match self {
            Receiver::None => None,
            Receiver::Expression { ty, .. }
            | Receiver::Extension { ty, .. }
            | Receiver::ClassThis { ty, .. } => Some(ty),
        }
    }

    /// The receiver expression node, for receivers written in source.
    pub fn expression(&self) -> Option<NodeIndex> {
        match self {
            Receiver::Expression { expression, .. } => Some(*expression),
            _ => None,
        }
    }
}

/// One logical argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueArgument {
    /// The `ValueArgument` node, NONE for synthesized arguments.
    pub argument: NodeIndex,
    pub expression: NodeIndex,
    pub name: Option<Atom>,
    /// `*array`
    pub spread: bool,
    /// Not written in the call's own argument list (an operand of an
    /// operator, a trailing lambda passed through).
    pub external: bool,
}

impl ValueArgument {
    /// An argument synthesized from an operand.
    pub fn external(expression: NodeIndex) -> Self {
        ValueArgument {
            argument: NodeIndex::NONE,
            expression,
            name: None,
            spread: false,
            external: true,
        }
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CallType {
    Default,
    /// `a[i]` desugared to `a.get(i)`.
    ArrayGetMethod,
    /// `a[i] = v` desugared to `a.set(i, v)`.
    ArraySetMethod,
    /// `f(...)` where `f` is a value with an `invoke` member.
    Invoke,
    /// `: Base(args)` in a class header.
    SuperDelegation,
}

/// Properties of a call built from syntax or synthesized for an operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallData {
    /// Node the call was built for.
    pub call_element: NodeIndex,
    pub explicit_receiver: Receiver,
    pub callee: NodeIndex,
    /// Name the callee resolves under (`plus` for `a + b`).
    pub callee_name: Atom,
    /// Syntactic argument list; `None` for calls without one (operators,
    /// property access, trailing-lambda-only calls).
    pub value_argument_list: Option<NodeIndex>,
    pub value_arguments: Vec<ValueArgument>,
    pub lambda_arguments: Vec<NodeIndex>,
    pub type_arguments: Vec<NodeIndex>,
    pub call_type: CallType,
    /// Invocation of a function rather than access to a property.
    pub function_call: bool,
    /// Made through `?.`.
    pub safe_call: bool,
    pub semantically_equivalent_to_safe_call: bool,
}

impl CallData {
    pub fn new(call_element: NodeIndex, callee: NodeIndex, callee_name: Atom) -> Self {
        CallData {
            call_element,
            explicit_receiver: Receiver::None,
            callee,
            callee_name,
            value_argument_list: None,
            value_arguments: Vec::new(),
            lambda_arguments: Vec::new(),
            type_arguments: Vec::new(),
            call_type: CallType::Default,
            function_call: true,
            safe_call: false,
            semantically_equivalent_to_safe_call: false,
        }
    }
}

/// Properties a delegating call replaces. `None` forwards to the base.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOverrides {
    pub explicit_receiver: Option<Receiver>,
    pub callee: Option<(NodeIndex, Atom)>,
    pub value_argument_list: Option<Option<NodeIndex>>,
    pub value_arguments: Option<Vec<ValueArgument>>,
    pub lambda_arguments: Option<Vec<NodeIndex>>,
    pub type_arguments: Option<Vec<NodeIndex>>,
    pub call_type: Option<CallType>,
    pub semantically_equivalent_to_safe_call: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegatingCall {
    base: Call,
    overrides: CallOverrides,
}

impl DelegatingCall {
    pub fn base(&self) -> &Call {
        &self.base
    }

    pub fn overrides(&self) -> &CallOverrides {
        &self.overrides
    }
}

/// A call, shared cheaply between the call table and its consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Plain(Arc<CallData>),
    Delegating(Arc<DelegatingCall>),
}

impl From<CallData> for Call {
    fn from(data: CallData) -> Self {
        Call::Plain(Arc::new(data))
    }
}

macro_rules! forward {
    ($self:ident, $field:ident, $base:ident) => {
        match $self {
            Call::Plain(data) => &data.$field,
            Call::Delegating(delegating) => match &delegating.overrides.$field {
                Some(value) => value,
                None => delegating.base.$base(),
            },
        }
    };
}

impl Call {
    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn call_element(&self) -> NodeIndex {
        match self {
            Call::Plain(data) => data.call_element,
            Call::Delegating(delegating) => delegating.base.call_element(),
        }
    }

    pub fn explicit_receiver(&self) -> &Receiver {
        forward!(self, explicit_receiver, explicit_receiver)
    }

    pub fn callee(&self) -> NodeIndex {
        match self {
            Call::Plain(data) => data.callee,
            Call::Delegating(delegating) => delegating
                .overrides
                .callee
                .map_or_else(|| delegating.base.callee(), |(callee, _)| callee),
        }
    }

    pub fn callee_name(&self) -> Atom {
        match self {
            Call::Plain(data) => data.callee_name,
            Call::Delegating(delegating) => delegating
                .overrides
                .callee
                .map_or_else(|| delegating.base.callee_name(), |(_, name)| name),
        }
    }

    pub fn value_argument_list(&self) -> Option<NodeIndex> {
        *forward!(self, value_argument_list, value_argument_list_ref)
    }

    fn value_argument_list_ref(&self) -> &Option<NodeIndex> {
        forward!(self, value_argument_list, value_argument_list_ref)
    }

    pub fn value_arguments(&self) -> &[ValueArgument] {
        self.value_arguments_vec()
    }

    fn value_arguments_vec(&self) -> &Vec<ValueArgument> {
        forward!(self, value_arguments, value_arguments_vec)
    }

    pub fn lambda_arguments(&self) -> &[NodeIndex] {
        self.lambda_arguments_vec()
    }

    fn lambda_arguments_vec(&self) -> &Vec<NodeIndex> {
        forward!(self, lambda_arguments, lambda_arguments_vec)
    }

    pub fn type_arguments(&self) -> &[NodeIndex] {
        self.type_arguments_vec()
    }

    fn type_arguments_vec(&self) -> &Vec<NodeIndex> {
        forward!(self, type_arguments, type_arguments_vec)
    }

    pub fn call_type(&self) -> CallType {
        *forward!(self, call_type, call_type_ref)
    }

    fn call_type_ref(&self) -> &CallType {
        forward!(self, call_type, call_type_ref)
    }

    pub fn is_function_call(&self) -> bool {
        match self {
            Call::Plain(data) => data.function_call,
            Call::Delegating(delegating) => delegating.base.is_function_call(),
        }
    }

    pub fn is_safe_call(&self) -> bool {
        match self {
            Call::Plain(data) => data.safe_call,
            Call::Delegating(delegating) => delegating.base.is_safe_call(),
        }
    }

    pub fn is_semantically_equivalent_to_safe_call(&self) -> bool {
        *forward!(
            self,
            semantically_equivalent_to_safe_call,
            semantically_equivalent_to_safe_call_ref
        )
    }

    fn semantically_equivalent_to_safe_call_ref(&self) -> &bool {
        forward!(
            self,
            semantically_equivalent_to_safe_call,
            semantically_equivalent_to_safe_call_ref
        )
    }

    /// Value arguments followed by trailing lambdas, as one positional
    /// sequence.
    pub fn argument_count(&self) -> usize {
        self.value_arguments().len() + self.lambda_arguments().len()
    }

    // =========================================================================
    // Decoration
    // =========================================================================

    /// Wrap `base` without overriding anything yet.
    pub fn delegating(base: Call) -> Call {
        Call::Delegating(Arc::new(DelegatingCall {
            base,
            overrides: CallOverrides::default(),
        }))
    }

    /// Change the overrides of this call's decoration layer, adding one
    /// when the call is plain.
    fn decorate(self, update: impl FnOnce(&mut CallOverrides)) -> Call {
        let (base, mut overrides) = match self {
            Call::Delegating(delegating) => {
                let DelegatingCall { base, overrides } = Arc::unwrap_or_clone(delegating);
                (base, overrides)
            }
            plain @ Call::Plain(_) => (plain, CallOverrides::default()),
        };
        update(&mut overrides);
        Call::Delegating(Arc::new(DelegatingCall { base, overrides }))
    }

    pub fn with_explicit_receiver(self, receiver: Receiver) -> Call {
        self.decorate(|overrides| overrides.explicit_receiver = Some(receiver))
    }

    pub fn with_callee(self, callee: NodeIndex, name: Atom) -> Call {
        self.decorate(|overrides| overrides.callee = Some((callee, name)))
    }

    pub fn with_value_argument_list(self, list: Option<NodeIndex>) -> Call {
        self.decorate(|overrides| overrides.value_argument_list = Some(list))
    }

    pub fn with_value_arguments(self, arguments: Vec<ValueArgument>) -> Call {
        self.decorate(|overrides| overrides.value_arguments = Some(arguments))
    }

    pub fn with_lambda_arguments(self, lambdas: Vec<NodeIndex>) -> Call {
        self.decorate(|overrides| overrides.lambda_arguments = Some(lambdas))
    }

    pub fn with_type_arguments(self, type_arguments: Vec<NodeIndex>) -> Call {
        self.decorate(|overrides| overrides.type_arguments = Some(type_arguments))
    }

    pub fn with_call_type(self, call_type: CallType) -> Call {
        self.decorate(|overrides| overrides.call_type = Some(call_type))
    }

    pub fn with_semantically_equivalent_to_safe_call(self, value: bool) -> Call {
        self.decorate(|overrides| overrides.semantically_equivalent_to_safe_call = Some(value))
    }
}
