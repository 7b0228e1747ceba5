//! Type substitution and callable copying.
//!
//! `DescriptorArena::substitute` is the descriptor-level entry point. It
//! returns the receiver unchanged for the identity substitutor and otherwise
//! produces a fresh copy with type parameters replaced. Only functions,
//! properties and constructors have substitution semantics; every other kind
//! is an `InternalError::UnsupportedSubstitution`.
//!
//! Fake overrides reuse the same copying machinery with a new owner and
//! kind (`copy_callable`).

use jetc_syntax::NodeIndex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::descriptor::*;
use crate::error::InternalError;
use crate::types::JetType;
use crate::visibility::{CallableKind, Modality, Visibility};
use crate::DescriptorArena;

/// Maps type parameters to replacement types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitutor {
    map: FxHashMap<DescriptorId, JetType>,
}

impl TypeSubstitutor {
    pub fn identity() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.map.is_empty()
    }

    /// Substitutor taking a class's own type parameters to the arguments of
    /// `ty` (`List<T>` seen as `List<Int>` maps `T -> Int`).
    pub fn for_class_type(arena: &DescriptorArena, ty: &JetType) -> Self {
        let mut substitutor = Self::identity();
        let JetType::Class {
            class, arguments, ..
        } = ty
        else {
            return substitutor;
        };
        let Some(data) = arena.class(*class) else {
            return substitutor;
        };
        for (&parameter, argument) in data.type_parameters().iter().zip(arguments) {
            substitutor.insert(parameter, argument.clone());
        }
        substitutor
    }

    /// Add a mapping. Mapping a parameter to itself is dropped so that
    /// `C<T>` over its own parameters stays the identity.
    pub fn insert(&mut self, parameter: DescriptorId, replacement: JetType) {
        if replacement == JetType::type_parameter(parameter) {
            return;
        }
        self.map.insert(parameter, replacement);
    }

    pub fn get(&self, parameter: DescriptorId) -> Option<&JetType> {
        self.map.get(&parameter)
    }

    pub fn substitute_type(&self, ty: &JetType) -> JetType {
        if self.is_identity() {
            return ty.clone();
        }
        match ty {
            JetType::Class {
                class,
                arguments,
                nullable,
            } => JetType::Class {
                class: *class,
                arguments: arguments.iter().map(|a| self.substitute_type(a)).collect(),
                nullable: *nullable,
            },
            JetType::TypeParameter {
                parameter,
                nullable,
            } => match self.map.get(parameter) {
                Some(replacement) if *nullable => replacement.make_nullable(),
                Some(replacement) => replacement.clone(),
                None => ty.clone(),
            },
            JetType::Error => JetType::Error,
        }
    }
}

/// How `copy_callable` builds the copy.
#[derive(Clone, Copy, Debug)]
pub struct CopyParams<'s> {
    pub owner: DescriptorId,
    pub substitutor: &'s TypeSubstitutor,
    pub kind: CallableKind,
    pub modality: Modality,
    pub visibility: Visibility,
    /// Carry the source's overridden set over (substitution) or start
    /// empty (fake overrides record their own).
    pub keep_overridden: bool,
    /// Keep the source elements of the copied declarations. Fake overrides
    /// are not declared anywhere and drop them.
    pub keep_source: bool,
}

impl CopyParams<'_> {
    fn source_of(&self, source: SourceElement) -> SourceElement {
        if self.keep_source { source } else { NodeIndex::NONE }
    }
}

impl DescriptorArena {
    /// Substitute type parameters in a descriptor.
    pub fn substitute(
        &mut self,
        id: DescriptorId,
        substitutor: &TypeSubstitutor,
    ) -> Result<DescriptorId, InternalError> {
        let descriptor = self.descriptor(id)?;
        if substitutor.is_identity() {
            return Ok(id);
        }
        let owner = descriptor.containing.unwrap_or(id);
        let (kind, modality, visibility) = match &descriptor.data {
            DescriptorData::Function(data) => (data.kind, data.modality, data.visibility),
            DescriptorData::Property(data) => (
                data.callable.kind,
                data.callable.modality,
                data.callable.visibility,
            ),
            DescriptorData::Constructor(_) => {
                return self.copy_constructor(id, owner, substitutor);
            }
            other => {
                return Err(InternalError::UnsupportedSubstitution {
                    descriptor: id,
                    kind: other.kind_name(),
                });
            }
        };
        self.copy_callable(
            id,
            CopyParams {
                owner,
                substitutor,
                kind,
                modality,
                visibility,
                keep_overridden: true,
                keep_source: true,
            },
        )
    }

    /// Copy a function or property into `params.owner`.
    pub fn copy_callable(
        &mut self,
        source: DescriptorId,
        params: CopyParams<'_>,
    ) -> Result<DescriptorId, InternalError> {
        let descriptor = self.descriptor(source)?.clone();
        let (callable, property) = match &descriptor.data {
            DescriptorData::Function(data) => (data.clone(), None),
            DescriptorData::Property(data) => (data.callable.clone(), Some(data.clone())),
            other => {
                return Err(InternalError::UnsupportedSubstitution {
                    descriptor: source,
                    kind: other.kind_name(),
                });
            }
        };

        let copy = self.alloc(
            Some(params.owner),
            descriptor.annotations.clone(),
            descriptor.name,
            params.source_of(descriptor.source),
            descriptor.data.clone(),
        );
        let signature = self.copy_signature(copy, source, &callable, &params)?;

        match property {
            None => {
                *self.callable_mut(copy)? = signature;
            }
            Some(data) => {
                let getter = match data.getter {
                    Some(getter) => Some(self.copy_accessor(getter, copy, &params)?),
                    None => None,
                };
                let setter = match data.setter {
                    Some(setter) => Some(self.copy_accessor(setter, copy, &params)?),
                    None => None,
                };
                self.descriptor_mut(copy)?.data = DescriptorData::Property(PropertyData {
                    callable: signature,
                    is_var: data.is_var,
                    getter,
                    setter,
                });
            }
        }
        tracing::trace!(
            source = source.0,
            copy = copy.0,
            owner = params.owner.0,
            kind = ?params.kind,
            "copied callable"
        );
        Ok(copy)
    }

    /// Copy own type parameters and value parameters into `copy`, with the
    /// copied type parameters replacing the originals in every type.
    fn copy_signature(
        &mut self,
        copy: DescriptorId,
        source: DescriptorId,
        callable: &CallableData,
        params: &CopyParams<'_>,
    ) -> Result<CallableData, InternalError> {
        let mut substitutor = params.substitutor.clone();
        let mut type_parameters = Vec::with_capacity(callable.type_parameters.len());
        for (index, &old) in callable.type_parameters.iter().enumerate() {
            let new = self.alloc_type_parameter(
                copy,
                self.name(old),
                params.source_of(self.source(old)),
                index as u32,
            );
            substitutor.insert(old, JetType::type_parameter(new));
            type_parameters.push((old, new));
        }
        for &(old, new) in &type_parameters {
            let bounds = self
                .upper_bounds(old)
                .iter()
                .map(|bound| substitutor.substitute_type(bound))
                .collect();
            self.set_upper_bounds(new, bounds)?;
        }

        let value_parameters =
            self.copy_value_parameters(copy, &callable.value_parameters, &substitutor, params.keep_source)?;

        Ok(CallableData {
            type_parameters: type_parameters.into_iter().map(|(_, new)| new).collect(),
            extension_receiver: callable
                .extension_receiver
                .as_ref()
                .map(|ty| substitutor.substitute_type(ty)),
            value_parameters,
            return_type: substitutor.substitute_type(&callable.return_type),
            modality: params.modality,
            visibility: params.visibility,
            kind: params.kind,
            has_override_modifier: callable.has_override_modifier,
            overridden: if params.keep_overridden {
                callable.overridden.clone()
            } else {
                SmallVec::new()
            },
            original: Some(source),
        })
    }

    fn copy_value_parameters(
        &mut self,
        owner: DescriptorId,
        parameters: &[DescriptorId],
        substitutor: &TypeSubstitutor,
        keep_source: bool,
    ) -> Result<Vec<DescriptorId>, InternalError> {
        let mut copies = Vec::with_capacity(parameters.len());
        for &parameter in parameters {
            let Some(data) = self.value_parameter(parameter).cloned() else {
                return Err(InternalError::UnexpectedDescriptorKind {
                    descriptor: parameter,
                    expected: "value parameter",
                    actual: self.kind_name(parameter),
                });
            };
            let source = if keep_source {
                self.source(parameter)
            } else {
                NodeIndex::NONE
            };
            let copy = self.alloc_value_parameter(
                owner,
                self.name(parameter),
                source,
                ValueParameterData {
                    ty: substitutor.substitute_type(&data.ty),
                    ..data
                },
            );
            copies.push(copy);
        }
        Ok(copies)
    }

    fn copy_accessor(
        &mut self,
        accessor: DescriptorId,
        property: DescriptorId,
        params: &CopyParams<'_>,
    ) -> Result<DescriptorId, InternalError> {
        let descriptor = self.descriptor(accessor)?.clone();
        let DescriptorData::Accessor(data) = &descriptor.data else {
            return Err(InternalError::UnexpectedDescriptorKind {
                descriptor: accessor,
                expected: "accessor",
                actual: descriptor.data.kind_name(),
            });
        };
        Ok(self.alloc(
            Some(property),
            descriptor.annotations.clone(),
            descriptor.name,
            params.source_of(descriptor.source),
            DescriptorData::Accessor(AccessorData {
                is_getter: data.is_getter,
                visibility: params.visibility,
                modality: params.modality,
            }),
        ))
    }

    fn copy_constructor(
        &mut self,
        source: DescriptorId,
        owner: DescriptorId,
        substitutor: &TypeSubstitutor,
    ) -> Result<DescriptorId, InternalError> {
        let descriptor = self.descriptor(source)?.clone();
        let DescriptorData::Constructor(data) = &descriptor.data else {
            return Err(InternalError::UnexpectedDescriptorKind {
                descriptor: source,
                expected: "constructor",
                actual: descriptor.data.kind_name(),
            });
        };
        let copy = self.alloc(
            Some(owner),
            descriptor.annotations.clone(),
            descriptor.name,
            descriptor.source,
            descriptor.data.clone(),
        );
        let value_parameters = self.copy_value_parameters(copy, &data.value_parameters, substitutor, true)?;
        self.descriptor_mut(copy)?.data = DescriptorData::Constructor(ConstructorData {
            is_primary: data.is_primary,
            visibility: data.visibility,
            value_parameters,
            return_type: substitutor.substitute_type(&data.return_type),
        });
        Ok(copy)
    }
}
