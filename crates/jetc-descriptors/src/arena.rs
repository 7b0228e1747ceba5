//! `DescriptorArena`: owner of every descriptor in a compilation unit.
//!
//! Descriptors refer to each other by `DescriptorId`. Classes are reserved
//! first and populated afterwards, which lets a class register itself in its
//! own scopes before its header is resolved.

use jetc_common::Atom;
use jetc_common::limits::DESCRIPTOR_ARENA_CAPACITY;
use jetc_syntax::{ClassKind, NodeIndex};

use crate::descriptor::*;
use crate::error::InternalError;
use crate::types::JetType;
use crate::visibility::{Modality, Visibility};

#[derive(Clone, Debug)]
pub struct DescriptorArena {
    descriptors: Vec<Descriptor>,
}

impl Default for DescriptorArena {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorArena {
    pub fn new() -> Self {
        DescriptorArena {
            descriptors: Vec::with_capacity(DESCRIPTOR_ARENA_CAPACITY),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DescriptorId, &Descriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (DescriptorId(i as u32), d))
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Construct a descriptor from `(containing, annotations, name, source)`
    /// and its kind-specific data.
    pub fn alloc(
        &mut self,
        containing: Option<DescriptorId>,
        annotations: Vec<Atom>,
        name: Atom,
        source: SourceElement,
        data: DescriptorData,
    ) -> DescriptorId {
        let id = DescriptorId(self.descriptors.len() as u32);
        self.descriptors.push(Descriptor {
            name,
            containing,
            annotations,
            source,
            data,
        });
        id
    }

    pub fn alloc_module(&mut self, name: Atom) -> DescriptorId {
        self.alloc(None, Vec::new(), name, NodeIndex::NONE, DescriptorData::Module)
    }

    /// Reserve a class identity. Header and members are filled in later.
    pub fn reserve_class(
        &mut self,
        containing: DescriptorId,
        name: Atom,
        source: SourceElement,
        kind: ClassKind,
        is_inner: bool,
        modality: Modality,
        visibility: Visibility,
    ) -> DescriptorId {
        self.alloc(
            Some(containing),
            Vec::new(),
            name,
            source,
            DescriptorData::Class(ClassData::new(kind, is_inner, modality, visibility)),
        )
    }

    pub fn alloc_type_parameter(
        &mut self,
        containing: DescriptorId,
        name: Atom,
        source: SourceElement,
        index: u32,
    ) -> DescriptorId {
        self.alloc(
            Some(containing),
            Vec::new(),
            name,
            source,
            DescriptorData::TypeParameter(TypeParameterData {
                index,
                upper_bounds: Vec::new(),
            }),
        )
    }

    pub fn alloc_value_parameter(
        &mut self,
        containing: DescriptorId,
        name: Atom,
        source: SourceElement,
        data: ValueParameterData,
    ) -> DescriptorId {
        self.alloc(
            Some(containing),
            Vec::new(),
            name,
            source,
            DescriptorData::ValueParameter(data),
        )
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[inline]
    pub fn get(&self, id: DescriptorId) -> Option<&Descriptor> {
        self.descriptors.get(id.0 as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, id: DescriptorId) -> Option<&mut Descriptor> {
        self.descriptors.get_mut(id.0 as usize)
    }

    pub fn descriptor(&self, id: DescriptorId) -> Result<&Descriptor, InternalError> {
        self.get(id)
            .ok_or(InternalError::UnknownDescriptor { descriptor: id })
    }

    pub fn descriptor_mut(&mut self, id: DescriptorId) -> Result<&mut Descriptor, InternalError> {
        self.get_mut(id)
            .ok_or(InternalError::UnknownDescriptor { descriptor: id })
    }

    #[inline]
    pub fn name(&self, id: DescriptorId) -> Atom {
        self.get(id).map_or(Atom::NONE, |d| d.name)
    }

    #[inline]
    pub fn containing(&self, id: DescriptorId) -> Option<DescriptorId> {
        self.get(id).and_then(|d| d.containing)
    }

    #[inline]
    pub fn source(&self, id: DescriptorId) -> SourceElement {
        self.get(id).map_or(NodeIndex::NONE, |d| d.source)
    }

    pub fn kind_name(&self, id: DescriptorId) -> &'static str {
        self.get(id).map_or("unknown", |d| d.data.kind_name())
    }

    pub fn class(&self, id: DescriptorId) -> Option<&ClassData> {
        match &self.get(id)?.data {
            DescriptorData::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: DescriptorId) -> Result<&mut ClassData, InternalError> {
        let descriptor = self.descriptor_mut(id)?;
        let actual = descriptor.data.kind_name();
        match &mut descriptor.data {
            DescriptorData::Class(data) => Ok(data),
            _ => Err(InternalError::UnexpectedDescriptorKind {
                descriptor: id,
                expected: "class",
                actual,
            }),
        }
    }

    #[inline]
    pub fn is_class(&self, id: DescriptorId) -> bool {
        self.class(id).is_some()
    }

    /// Function or property data.
    pub fn callable(&self, id: DescriptorId) -> Option<&CallableData> {
        match &self.get(id)?.data {
            DescriptorData::Function(data) => Some(data),
            DescriptorData::Property(data) => Some(&data.callable),
            _ => None,
        }
    }

    pub fn callable_mut(&mut self, id: DescriptorId) -> Result<&mut CallableData, InternalError> {
        let descriptor = self.descriptor_mut(id)?;
        let actual = descriptor.data.kind_name();
        match &mut descriptor.data {
            DescriptorData::Function(data) => Ok(data),
            DescriptorData::Property(data) => Ok(&mut data.callable),
            _ => Err(InternalError::UnexpectedDescriptorKind {
                descriptor: id,
                expected: "callable member",
                actual,
            }),
        }
    }

    pub fn property(&self, id: DescriptorId) -> Option<&PropertyData> {
        match &self.get(id)?.data {
            DescriptorData::Property(data) => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub fn is_function(&self, id: DescriptorId) -> bool {
        matches!(
            self.get(id).map(|d| &d.data),
            Some(DescriptorData::Function(_))
        )
    }

    #[inline]
    pub fn is_property(&self, id: DescriptorId) -> bool {
        self.property(id).is_some()
    }

    pub fn constructor(&self, id: DescriptorId) -> Option<&ConstructorData> {
        match &self.get(id)?.data {
            DescriptorData::Constructor(data) => Some(data),
            _ => None,
        }
    }

    pub fn value_parameter(&self, id: DescriptorId) -> Option<&ValueParameterData> {
        match &self.get(id)?.data {
            DescriptorData::ValueParameter(data) => Some(data),
            _ => None,
        }
    }

    pub fn type_parameter(&self, id: DescriptorId) -> Option<&TypeParameterData> {
        match &self.get(id)?.data {
            DescriptorData::TypeParameter(data) => Some(data),
            _ => None,
        }
    }

    pub fn local_variable(&self, id: DescriptorId) -> Option<&LocalVariableData> {
        match &self.get(id)?.data {
            DescriptorData::LocalVariable(data) => Some(data),
            _ => None,
        }
    }

    pub fn upper_bounds(&self, type_parameter: DescriptorId) -> &[JetType] {
        self.type_parameter(type_parameter)
            .map(|data| data.upper_bounds.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_upper_bounds(
        &mut self,
        type_parameter: DescriptorId,
        bounds: Vec<JetType>,
    ) -> Result<(), InternalError> {
        let descriptor = self.descriptor_mut(type_parameter)?;
        let actual = descriptor.data.kind_name();
        match &mut descriptor.data {
            DescriptorData::TypeParameter(data) => {
                data.upper_bounds = bounds;
                Ok(())
            }
            _ => Err(InternalError::UnexpectedDescriptorKind {
                descriptor: type_parameter,
                expected: "type parameter",
                actual,
            }),
        }
    }

    /// Visibility of any descriptor that has one.
    pub fn visibility(&self, id: DescriptorId) -> Option<Visibility> {
        match &self.get(id)?.data {
            DescriptorData::Class(data) => Some(data.visibility),
            DescriptorData::Function(data) => Some(data.visibility),
            DescriptorData::Property(data) => Some(data.callable.visibility),
            DescriptorData::Constructor(data) => Some(data.visibility),
            DescriptorData::Accessor(data) => Some(data.visibility),
            DescriptorData::LocalVariable(_) => Some(Visibility::Local),
            _ => None,
        }
    }

    pub fn modality(&self, id: DescriptorId) -> Option<Modality> {
        match &self.get(id)?.data {
            DescriptorData::Class(data) => Some(data.modality),
            DescriptorData::Function(data) => Some(data.modality),
            DescriptorData::Property(data) => Some(data.callable.modality),
            DescriptorData::Accessor(data) => Some(data.modality),
            _ => None,
        }
    }

    /// Follow `original` links back to the declaration a copy came from.
    pub fn original_of(&self, id: DescriptorId) -> DescriptorId {
        let mut current = id;
        while let Some(next) = self.callable(current).and_then(|c| c.original) {
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Types of a callable's value parameters, in order.
    pub fn value_parameter_types(&self, callable: DescriptorId) -> Vec<JetType> {
        let parameters = match self.get(callable).map(|d| &d.data) {
            Some(DescriptorData::Function(data)) => &data.value_parameters,
            Some(DescriptorData::Constructor(data)) => &data.value_parameters,
            _ => return Vec::new(),
        };
        parameters
            .iter()
            .filter_map(|&p| self.value_parameter(p).map(|data| data.ty.clone()))
            .collect()
    }

    /// The class type `C<T1, ..., Tn>` over the class's own type parameters.
    pub fn default_type(&self, class: DescriptorId) -> JetType {
        let arguments = self
            .class(class)
            .map(|data| {
                data.type_parameters()
                    .iter()
                    .map(|&tp| JetType::type_parameter(tp))
                    .collect()
            })
            .unwrap_or_default();
        JetType::generic(class, arguments)
    }

    /// Resolved supertypes of a class (empty for non-classes).
    pub fn supertypes(&self, class: DescriptorId) -> &[JetType] {
        self.class(class)
            .map(|data| data.supertypes.as_slice())
            .unwrap_or(&[])
    }

    /// The nearest containing class, skipping functions and properties.
    pub fn containing_class(&self, id: DescriptorId) -> Option<DescriptorId> {
        let mut current = self.containing(id);
        while let Some(candidate) = current {
            if self.is_class(candidate) {
                return Some(candidate);
            }
            current = self.containing(candidate);
        }
        None
    }
}
