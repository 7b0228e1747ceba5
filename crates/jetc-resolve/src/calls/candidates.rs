//! Candidate collection for a call.
//!
//! Produces the ordered groups overload resolution walks: members of the
//! explicit receiver and matching extensions when a typed receiver is
//! written; otherwise, innermost scope first, each scope's local callables
//! and the members of its implicit receiver. Constructors come last when the
//! callee names a class. A descriptor appears in at most one group.

use jetc_binder::{ScopeArena, ScopeId};
use jetc_common::Atom;
use jetc_descriptors::{Builtins, DescriptorArena, DescriptorId, JetType, TypeChecker};
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::trace;

use super::call::Call;

/// Where a group of candidates was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CandidateSource {
    /// Members of the explicit receiver's class.
    ReceiverMember,
    /// Extension callables applicable to the (explicit or implicit) receiver.
    Extension,
    /// Declared in a scope of the chain.
    Local { scope: u32 },
    /// Members of an implicit receiver (`this` of a class or extension).
    ImplicitReceiverMember { receiver: DescriptorId },
    /// Constructors of the class the callee names.
    Constructor,
}

/// Result of matching the call's value arguments against a candidate's
/// parameters. Types are not considered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ArgumentShape {
    Applicable,
    ArgumentCountMismatch { expected: usize, actual: usize },
    NamedArgumentNotFound { name: Atom },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub descriptor: DescriptorId,
    pub shape: ArgumentShape,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateGroup {
    pub source: CandidateSource,
    pub candidates: Vec<Candidate>,
}

pub struct CandidateCollector<'a> {
    descriptors: &'a DescriptorArena,
    scopes: &'a ScopeArena,
    builtins: &'a Builtins,
}

impl<'a> CandidateCollector<'a> {
    pub fn new(descriptors: &'a DescriptorArena, scopes: &'a ScopeArena, builtins: &'a Builtins) -> Self {
        CandidateCollector {
            descriptors,
            scopes,
            builtins,
        }
    }

    /// Candidate groups for `call` made in `scope`.
    pub fn collect(&self, call: &Call, scope: ScopeId) -> Vec<CandidateGroup> {
        let mut groups = Vec::new();
        let mut seen = FxHashSet::default();
        let name = call.callee_name();

        if call.explicit_receiver().exists() {
            let Some(ty) = call.explicit_receiver().ty() else {
                return groups;
            };
            if ty.is_error() {
                trace!(name = name.0, "receiver type unknown, no candidates");
                return groups;
            }
            let ty = ty.with_nullability(false);
            if let Some(class) = self.class_of_type(&ty) {
                let members = self.members(class, name, call);
                self.push_group(&mut groups, &mut seen, CandidateSource::ReceiverMember, members, call);
            }
            let extensions = self.extensions(scope, name, &ty, call);
            self.push_group(&mut groups, &mut seen, CandidateSource::Extension, extensions, call);
            return groups;
        }

        for current in self.scopes.chain(scope) {
            let locals: Vec<DescriptorId> = self
                .scopes
                .get_local_callables(current, name)
                .into_iter()
                .filter(|&d| self.matches_call_kind(d, call) && !self.is_extension(d))
                .collect();
            self.push_group(
                &mut groups,
                &mut seen,
                CandidateSource::Local { scope: current.0 },
                locals,
                call,
            );

            let Some(receiver) = self.scopes.get(current).and_then(|s| s.implicit_receiver()) else {
                continue;
            };
            let Some(receiver_ty) = self.implicit_receiver_type(receiver) else {
                continue;
            };
            if let Some(class) = self.class_of_type(&receiver_ty) {
                let members = self.members(class, name, call);
                self.push_group(
                    &mut groups,
                    &mut seen,
                    CandidateSource::ImplicitReceiverMember { receiver },
                    members,
                    call,
                );
            }
            let extensions = self.extensions(scope, name, &receiver_ty, call);
            self.push_group(&mut groups, &mut seen, CandidateSource::Extension, extensions, call);
        }

        if call.is_function_call()
            && let Some(classifier) = self.scopes.get_classifier(scope, name)
            && let Some(class) = self.descriptors.class(classifier)
        {
            let constructors = class.all_constructors().collect();
            self.push_group(&mut groups, &mut seen, CandidateSource::Constructor, constructors, call);
        }
        groups
    }

    fn push_group(
        &self,
        groups: &mut Vec<CandidateGroup>,
        seen: &mut FxHashSet<DescriptorId>,
        source: CandidateSource,
        descriptors: Vec<DescriptorId>,
        call: &Call,
    ) {
        let candidates: Vec<Candidate> = descriptors
            .into_iter()
            .filter(|d| seen.insert(*d))
            .map(|descriptor| Candidate {
                descriptor,
                shape: self.check_shape(descriptor, call),
            })
            .collect();
        if !candidates.is_empty() {
            groups.push(CandidateGroup { source, candidates });
        }
    }

    // =========================================================================
    // Receivers and members
    // =========================================================================

    /// The class whose members a value of `ty` has. Type parameters use
    /// their first class bound, then `Any`.
    fn class_of_type(&self, ty: &JetType) -> Option<DescriptorId> {
        match ty {
            JetType::Class { class, .. } => Some(*class),
            JetType::TypeParameter { parameter, .. } => Some(
                self.descriptors
                    .upper_bounds(*parameter)
                    .iter()
                    .find_map(JetType::class_id)
                    .unwrap_or(self.builtins.any),
            ),
            JetType::Error => None,
        }
    }

    /// Type of `this` for an implicit receiver: a class's default type, or
    /// an extension callable's receiver type.
    fn implicit_receiver_type(&self, receiver: DescriptorId) -> Option<JetType> {
        if self.descriptors.is_class(receiver) {
            return Some(self.descriptors.default_type(receiver));
        }
        self.descriptors
            .callable(receiver)
            .and_then(|callable| callable.extension_receiver.clone())
    }

    fn members(&self, class: DescriptorId, name: Atom, call: &Call) -> Vec<DescriptorId> {
        let Some(data) = self.descriptors.class(class) else {
            return Vec::new();
        };
        let members = if call.is_function_call() {
            data.functions(name)
        } else {
            data.properties(name)
        };
        members
            .iter()
            .copied()
            .filter(|&member| !self.is_extension(member))
            .collect()
    }

    /// Extensions named `name` visible from `scope` whose receiver accepts
    /// `receiver`.
    fn extensions(&self, scope: ScopeId, name: Atom, receiver: &JetType, call: &Call) -> Vec<DescriptorId> {
        let visible = if call.is_function_call() {
            self.scopes.get_functions(scope, name)
        } else {
            self.scopes.get_properties(scope, name)
        };
        let checker = TypeChecker::new(self.descriptors, self.builtins);
        visible
            .into_iter()
            .filter(|&candidate| {
                let Some(expected) = self
                    .descriptors
                    .callable(candidate)
                    .and_then(|c| c.extension_receiver.as_ref())
                else {
                    return false;
                };
                match expected {
                    JetType::TypeParameter { parameter, .. } => self
                        .descriptors
                        .upper_bounds(*parameter)
                        .iter()
                        .all(|bound| checker.is_subtype(receiver, bound)),
                    _ => checker.is_subtype(receiver, expected),
                }
            })
            .collect()
    }

    fn is_extension(&self, descriptor: DescriptorId) -> bool {
        self.descriptors
            .callable(descriptor)
            .is_some_and(|c| c.extension_receiver.is_some())
    }

    /// Functions for invocations; properties and variables for reads.
    fn matches_call_kind(&self, descriptor: DescriptorId, call: &Call) -> bool {
        if call.is_function_call() {
            self.descriptors.is_function(descriptor)
        } else {
            self.descriptors.is_property(descriptor)
                || self.descriptors.local_variable(descriptor).is_some()
                || self.descriptors.value_parameter(descriptor).is_some()
        }
    }

    // =========================================================================
    // Argument shape
    // =========================================================================

    fn parameters_of(&self, descriptor: DescriptorId) -> Option<&[DescriptorId]> {
        if self.descriptors.is_function(descriptor) {
            return self
                .descriptors
                .callable(descriptor)
                .map(|c| c.value_parameters.as_slice());
        }
        self.descriptors
            .constructor(descriptor)
            .map(|c| c.value_parameters.as_slice())
    }

    /// Match named arguments by name and positional arguments (then
    /// trailing lambdas) by position; a vararg parameter absorbs every
    /// remaining positional argument.
    pub fn check_shape(&self, descriptor: DescriptorId, call: &Call) -> ArgumentShape {
        let Some(parameters) = self.parameters_of(descriptor) else {
            return ArgumentShape::Applicable;
        };
        let mismatch = ArgumentShape::ArgumentCountMismatch {
            expected: parameters.len(),
            actual: call.argument_count(),
        };
        let mut used = vec![false; parameters.len()];
        let mut position = 0usize;

        let positional = call
            .value_arguments()
            .iter()
            .filter(|argument| !argument.is_named())
            .count()
            + call.lambda_arguments().len();
        for argument in call.value_arguments() {
            let Some(name) = argument.name else {
                continue;
            };
            let Some(index) = parameters
                .iter()
                .position(|&p| self.descriptors.name(p) == name)
            else {
                return ArgumentShape::NamedArgumentNotFound { name };
            };
            if used[index] {
                return mismatch;
            }
            used[index] = true;
        }

        for _ in 0..positional {
            while position < parameters.len() && used[position] && !self.is_vararg(parameters[position]) {
                position += 1;
            }
            let Some(&parameter) = parameters.get(position) else {
                return mismatch;
            };
            used[position] = true;
            if !self.is_vararg(parameter) {
                position += 1;
            }
        }

        let missing = parameters.iter().zip(&used).any(|(&parameter, &used)| {
            !used
                && self
                    .descriptors
                    .value_parameter(parameter)
                    .is_some_and(|p| !p.has_default && !p.is_vararg)
        });
        if missing { mismatch } else { ArgumentShape::Applicable }
    }

    fn is_vararg(&self, parameter: DescriptorId) -> bool {
        self.descriptors
            .value_parameter(parameter)
            .is_some_and(|p| p.is_vararg)
    }
}
