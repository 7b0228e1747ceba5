//! Factories for `Call` values.
//!
//! Calls written as call syntax take every property from the node. Operator
//! forms (binary operators, indexing, array literals) synthesize receiver
//! and arguments from their operands and have no value argument list.

use jetc_common::Atom;
use jetc_descriptors::InternalError;
use jetc_syntax::{BinaryOp, NodeArena, NodeIndex};

use super::call::{Call, CallData, CallType, Receiver, ValueArgument};

/// Convention function a binary operator desugars to, and whether the
/// operands swap places (`a in b` is `b.contains(a)`).
pub fn operator_convention(op: BinaryOp) -> Option<(&'static str, bool)> {
    let convention = match op {
        BinaryOp::Plus => ("plus", false),
        BinaryOp::Minus => ("minus", false),
        BinaryOp::Times => ("times", false),
        BinaryOp::Div => ("div", false),
        BinaryOp::Rem => ("rem", false),
        BinaryOp::RangeTo => ("rangeTo", false),
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEq | BinaryOp::GreaterEq => {
            ("compareTo", false)
        }
        BinaryOp::In | BinaryOp::NotIn => ("contains", true),
        BinaryOp::Equals | BinaryOp::NotEquals => ("equals", false),
        // Short-circuiting operators are not calls.
        BinaryOp::And | BinaryOp::Or => return None,
    };
    Some(convention)
}

pub struct CallMaker<'a> {
    syntax: &'a NodeArena,
}

impl<'a> CallMaker<'a> {
    pub fn new(syntax: &'a NodeArena) -> Self {
        CallMaker { syntax }
    }

    fn name(&self, text: &'static str) -> Result<Atom, InternalError> {
        self.syntax
            .interner()
            .lookup(text)
            .ok_or(InternalError::MissingBuiltin { name: text })
    }

    fn malformed(node: NodeIndex, expected: &'static str) -> InternalError {
        InternalError::MalformedSyntax {
            node: node.0,
            expected,
        }
    }

    /// Arguments of a `ValueArgumentList` node, in source order.
    fn arguments_of(&self, list: NodeIndex) -> Result<Vec<ValueArgument>, InternalError> {
        let data = self
            .syntax
            .value_argument_list(list)
            .ok_or_else(|| Self::malformed(list, "value argument list"))?;
        data.arguments
            .iter()
            .map(|&argument| {
                let value = self
                    .syntax
                    .value_argument(argument)
                    .ok_or_else(|| Self::malformed(argument, "value argument"))?;
                Ok(ValueArgument {
                    argument,
                    expression: value.expression,
                    name: (!value.name.is_none()).then_some(value.name),
                    spread: value.spread,
                    external: false,
                })
            })
            .collect()
    }

    /// A call expression, `receiver.f<T>(args) { lambda }`.
    pub fn make_call(&self, call: NodeIndex, receiver: Receiver, safe: bool) -> Result<Call, InternalError> {
        let data = self
            .syntax
            .call_expr(call)
            .ok_or_else(|| Self::malformed(call, "call"))?;
        let callee_name = self.syntax.name_of(data.callee);
        let mut call_data = CallData::new(call, data.callee, callee_name.unwrap_or(Atom::NONE));
        call_data.explicit_receiver = receiver;
        call_data.safe_call = safe;
        call_data.type_arguments = data.type_arguments.clone();
        call_data.lambda_arguments = data.lambda_arguments.clone();
        if let Some(list) = data.value_arguments.get() {
            call_data.value_argument_list = Some(list);
            call_data.value_arguments = self.arguments_of(list)?;
        }
        // `f()()` and `(expr)(...)` call the value's `invoke`.
        if callee_name.is_none() {
            call_data.call_type = CallType::Invoke;
            call_data.callee_name = self.name("invoke")?;
        }
        Ok(call_data.into())
    }

    /// A simple name or a qualified selector read as a property.
    pub fn make_property_call(
        &self,
        selector: NodeIndex,
        receiver: Receiver,
        safe: bool,
    ) -> Result<Call, InternalError> {
        let name = self
            .syntax
            .name_of(selector)
            .ok_or_else(|| Self::malformed(selector, "name"))?;
        let mut call_data = CallData::new(selector, selector, name);
        call_data.explicit_receiver = receiver;
        call_data.function_call = false;
        call_data.safe_call = safe;
        Ok(call_data.into())
    }

    /// `left op right` through its operator convention. `None` for `&&`
    /// and `||`.
    ///
    /// `receiver` is the operand the convention is called on: `left`, or
    /// `right` for `in`.
    pub fn make_binary_call(
        &self,
        binary: NodeIndex,
        receiver: Receiver,
    ) -> Result<Option<Call>, InternalError> {
        let data = self
            .syntax
            .binary_data(binary)
            .ok_or_else(|| Self::malformed(binary, "binary expression"))?;
        let op = self
            .syntax
            .operation(data.operation)
            .ok_or_else(|| Self::malformed(data.operation, "operation reference"))?;
        let Some((convention, swapped)) = operator_convention(op) else {
            return Ok(None);
        };
        let argument = if swapped { data.left } else { data.right };
        let mut call_data = CallData::new(binary, data.operation, self.name(convention)?);
        call_data.explicit_receiver = receiver;
        call_data.value_arguments = vec![ValueArgument::external(argument)];
        // `a == b` is `a?.equals(b) ?: (b === null)`.
        call_data.semantically_equivalent_to_safe_call =
            matches!(op, BinaryOp::Equals | BinaryOp::NotEquals);
        Ok(Some(call_data.into()))
    }

    /// The operand a binary call is made on.
    pub fn binary_receiver_operand(&self, binary: NodeIndex) -> Option<NodeIndex> {
        let data = self.syntax.binary_data(binary)?;
        let op = self.syntax.operation(data.operation)?;
        let (_, swapped) = operator_convention(op)?;
        Some(if swapped { data.right } else { data.left })
    }

    /// `array[indices]` as `array.get(indices)`.
    pub fn make_array_get(&self, access: NodeIndex, receiver: Receiver) -> Result<Call, InternalError> {
        let data = self
            .syntax
            .array_access_data(access)
            .ok_or_else(|| Self::malformed(access, "array access"))?;
        let mut call_data = CallData::new(access, access, self.name("get")?);
        call_data.explicit_receiver = receiver;
        call_data.value_arguments = data
            .indices
            .iter()
            .map(|&index| ValueArgument::external(index))
            .collect();
        call_data.call_type = CallType::ArrayGetMethod;
        Ok(call_data.into())
    }

    /// `array[indices] = value` as `array.set(indices, value)`. `None` when
    /// the assignment target is not an indexing expression.
    pub fn make_array_set(
        &self,
        assignment: NodeIndex,
        receiver: Receiver,
    ) -> Result<Option<Call>, InternalError> {
        let data = self
            .syntax
            .assignment_data(assignment)
            .ok_or_else(|| Self::malformed(assignment, "assignment"))?;
        let Some(access) = self.syntax.array_access_data(data.target) else {
            return Ok(None);
        };
        let mut call_data = CallData::new(assignment, data.target, self.name("set")?);
        call_data.explicit_receiver = receiver;
        call_data.value_arguments = access
            .indices
            .iter()
            .chain(std::iter::once(&data.value))
            .map(|&expression| ValueArgument::external(expression))
            .collect();
        call_data.call_type = CallType::ArraySetMethod;
        Ok(Some(call_data.into()))
    }

    /// `[a, b]` as `arrayOf(a, b)`.
    pub fn make_array_literal(&self, literal: NodeIndex) -> Result<Call, InternalError> {
        let elements = self
            .syntax
            .array_literal_elements(literal)
            .ok_or_else(|| Self::malformed(literal, "array literal"))?;
        let mut call_data = CallData::new(literal, literal, self.name("arrayOf")?);
        call_data.value_arguments = elements
            .iter()
            .map(|&element| ValueArgument::external(element))
            .collect();
        Ok(call_data.into())
    }

    /// `: Base(args)` in a class header, a call of `Base`'s constructor.
    pub fn make_super_delegation(&self, entry: NodeIndex) -> Result<Option<Call>, InternalError> {
        let data = self
            .syntax
            .supertype_entry(entry)
            .ok_or_else(|| Self::malformed(entry, "supertype entry"))?;
        let Some(list) = data.constructor_arguments else {
            return Ok(None);
        };
        let name = self
            .syntax
            .name_of(data.type_ref)
            .ok_or_else(|| Self::malformed(data.type_ref, "type reference"))?;
        let mut call_data = CallData::new(entry, data.type_ref, name);
        call_data.value_argument_list = Some(list);
        call_data.value_arguments = self.arguments_of(list)?;
        call_data.call_type = CallType::SuperDelegation;
        Ok(Some(call_data.into()))
    }

    /// A synthetic call of `name` with `arguments` as positional operands.
    pub fn with_expressions(
        call_element: NodeIndex,
        receiver: Receiver,
        callee: NodeIndex,
        name: Atom,
        arguments: &[NodeIndex],
    ) -> Call {
        let mut call_data = CallData::new(call_element, callee, name);
        call_data.explicit_receiver = receiver;
        call_data.value_arguments = arguments
            .iter()
            .map(|&expression| ValueArgument::external(expression))
            .collect();
        call_data.into()
    }
}
