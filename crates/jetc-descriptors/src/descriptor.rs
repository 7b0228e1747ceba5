//! Descriptor storage types.
//!
//! A descriptor is the semantic symbol for one declaration. Descriptors form
//! a tree through `containing` (fixed at construction, `None` only for module
//! roots) and a graph through supertype and member edges. All edges are
//! `DescriptorId`s into the owning `DescriptorArena`.

use indexmap::IndexMap;
use jetc_common::Atom;
use jetc_syntax::{ClassKind, NodeIndex};
use serde::Serialize;
use smallvec::SmallVec;

use crate::types::JetType;
use crate::visibility::{CallableKind, Modality, Visibility};

/// Index of a descriptor in a `DescriptorArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DescriptorId(pub u32);

/// The syntax element a descriptor was created from.
///
/// `NodeIndex::NONE` for builtins and compiler-generated descriptors.
pub type SourceElement = NodeIndex;

#[derive(Clone, Debug)]
pub struct Descriptor {
    pub name: Atom,
    pub containing: Option<DescriptorId>,
    pub annotations: Vec<Atom>,
    pub source: SourceElement,
    pub data: DescriptorData,
}

#[derive(Clone, Debug)]
pub enum DescriptorData {
    Module,
    Class(ClassData),
    Function(CallableData),
    Constructor(ConstructorData),
    Property(PropertyData),
    Accessor(AccessorData),
    ValueParameter(ValueParameterData),
    TypeParameter(TypeParameterData),
    LocalVariable(LocalVariableData),
}

impl DescriptorData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DescriptorData::Module => "module",
            DescriptorData::Class(_) => "class",
            DescriptorData::Function(_) => "function",
            DescriptorData::Constructor(_) => "constructor",
            DescriptorData::Property(_) => "property",
            DescriptorData::Accessor(_) => "accessor",
            DescriptorData::ValueParameter(_) => "value parameter",
            DescriptorData::TypeParameter(_) => "type parameter",
            DescriptorData::LocalVariable(_) => "local variable",
        }
    }
}

// =============================================================================
// Classes
// =============================================================================

#[derive(Clone, Debug)]
pub struct ClassData {
    pub kind: ClassKind,
    pub is_inner: bool,
    pub is_companion: bool,
    pub modality: Modality,
    pub visibility: Visibility,
    /// Set at most once.
    pub(crate) type_parameters: Option<Vec<DescriptorId>>,
    /// Resolved supertypes; always class types.
    pub(crate) supertypes: Vec<JetType>,
    pub(crate) primary_constructor: Option<DescriptorId>,
    pub(crate) constructors: Vec<DescriptorId>,
    pub(crate) declared_callables: Vec<DescriptorId>,
    /// Declared members plus fake overrides.
    pub(crate) all_callables: Vec<DescriptorId>,
    pub(crate) functions_by_name: IndexMap<Atom, SmallVec<[DescriptorId; 2]>>,
    pub(crate) properties_by_name: IndexMap<Atom, SmallVec<[DescriptorId; 2]>>,
    pub(crate) nested_classes: Vec<DescriptorId>,
    pub(crate) companion: Option<DescriptorId>,
    pub(crate) locked: bool,
}

impl ClassData {
    pub fn new(kind: ClassKind, is_inner: bool, modality: Modality, visibility: Visibility) -> Self {
        ClassData {
            kind,
            is_inner,
            is_companion: false,
            modality,
            visibility,
            type_parameters: None,
            supertypes: Vec::new(),
            primary_constructor: None,
            constructors: Vec::new(),
            declared_callables: Vec::new(),
            all_callables: Vec::new(),
            functions_by_name: IndexMap::new(),
            properties_by_name: IndexMap::new(),
            nested_classes: Vec::new(),
            companion: None,
            locked: false,
        }
    }
}

// =============================================================================
// Callables
// =============================================================================

/// Data shared by functions and properties.
#[derive(Clone, Debug)]
pub struct CallableData {
    pub type_parameters: Vec<DescriptorId>,
    pub extension_receiver: Option<JetType>,
    pub value_parameters: Vec<DescriptorId>,
    pub return_type: JetType,
    pub modality: Modality,
    pub visibility: Visibility,
    pub kind: CallableKind,
    pub has_override_modifier: bool,
    pub overridden: SmallVec<[DescriptorId; 2]>,
    /// The descriptor this one was copied or substituted from.
    pub original: Option<DescriptorId>,
}

impl CallableData {
    pub fn new(return_type: JetType, modality: Modality, visibility: Visibility) -> Self {
        CallableData {
            type_parameters: Vec::new(),
            extension_receiver: None,
            value_parameters: Vec::new(),
            return_type,
            modality,
            visibility,
            kind: CallableKind::Declaration,
            has_override_modifier: false,
            overridden: SmallVec::new(),
            original: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PropertyData {
    pub callable: CallableData,
    pub is_var: bool,
    pub getter: Option<DescriptorId>,
    pub setter: Option<DescriptorId>,
}

#[derive(Clone, Debug)]
pub struct ConstructorData {
    pub is_primary: bool,
    pub visibility: Visibility,
    pub value_parameters: Vec<DescriptorId>,
    /// The constructed class type.
    pub return_type: JetType,
}

#[derive(Clone, Debug)]
pub struct AccessorData {
    pub is_getter: bool,
    pub visibility: Visibility,
    pub modality: Modality,
}

#[derive(Clone, Debug)]
pub struct ValueParameterData {
    pub index: u32,
    pub ty: JetType,
    pub has_default: bool,
    pub is_vararg: bool,
}

#[derive(Clone, Debug)]
pub struct TypeParameterData {
    pub index: u32,
    pub upper_bounds: Vec<JetType>,
}

#[derive(Clone, Debug)]
pub struct LocalVariableData {
    pub ty: JetType,
    pub is_var: bool,
}
