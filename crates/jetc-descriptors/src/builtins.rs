//! Builtin classifiers.
//!
//! Builtins are installed into the arena before any source declaration, with
//! complete member sets (including fake overrides of `Any`'s members) and
//! locked immediately. They behave like already-resolved library classes.

use jetc_common::{Atom, Interner};
use jetc_syntax::{ClassKind, NodeIndex};

use crate::class::MemberKind;
use crate::descriptor::*;
use crate::error::InternalError;
use crate::substitution::{CopyParams, TypeSubstitutor};
use crate::types::JetType;
use crate::visibility::{CallableKind, Modality, Visibility};
use crate::DescriptorArena;

/// Ids of the builtin module and classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Builtins {
    pub module: DescriptorId,
    pub any: DescriptorId,
    pub nothing: DescriptorId,
    pub unit: DescriptorId,
    pub boolean: DescriptorId,
    pub char: DescriptorId,
    pub int: DescriptorId,
    pub string: DescriptorId,
    pub array: DescriptorId,
}

fn atom(interner: &Interner, name: &'static str) -> Result<Atom, InternalError> {
    interner
        .lookup(name)
        .ok_or(InternalError::MissingBuiltin { name })
}

struct Installer<'a> {
    arena: &'a mut DescriptorArena,
    interner: &'a Interner,
}

impl Installer<'_> {
    fn class(
        &mut self,
        module: DescriptorId,
        name: &'static str,
        kind: ClassKind,
        modality: Modality,
    ) -> Result<DescriptorId, InternalError> {
        let name = atom(self.interner, name)?;
        Ok(self.arena.reserve_class(
            module,
            name,
            NodeIndex::NONE,
            kind,
            false,
            modality,
            Visibility::Public,
        ))
    }

    fn function(
        &mut self,
        class: DescriptorId,
        name: &'static str,
        parameters: &[(&'static str, JetType)],
        return_type: JetType,
        modality: Modality,
    ) -> Result<DescriptorId, InternalError> {
        let name = atom(self.interner, name)?;
        let mut data = CallableData::new(return_type, modality, Visibility::Public);
        data.kind = CallableKind::Synthesized;
        let function = self.arena.alloc(
            Some(class),
            Vec::new(),
            name,
            NodeIndex::NONE,
            DescriptorData::Function(data),
        );
        let mut value_parameters = Vec::with_capacity(parameters.len());
        for (index, (parameter_name, ty)) in parameters.iter().enumerate() {
            let parameter_name = atom(self.interner, parameter_name)?;
            value_parameters.push(self.arena.alloc_value_parameter(
                function,
                parameter_name,
                NodeIndex::NONE,
                ValueParameterData {
                    index: index as u32,
                    ty: ty.clone(),
                    has_default: false,
                    is_vararg: false,
                },
            ));
        }
        self.arena.callable_mut(function)?.value_parameters = value_parameters;
        self.arena
            .class_mut(class)?
            .add_declared_callable(class, function, name, MemberKind::Function)?;
        Ok(function)
    }

    fn val(
        &mut self,
        class: DescriptorId,
        name: &'static str,
        ty: JetType,
    ) -> Result<DescriptorId, InternalError> {
        let name = atom(self.interner, name)?;
        let getter_name = atom(self.interner, "<get>")?;
        let mut callable = CallableData::new(ty, Modality::Final, Visibility::Public);
        callable.kind = CallableKind::Synthesized;
        let property = self.arena.alloc(
            Some(class),
            Vec::new(),
            name,
            NodeIndex::NONE,
            DescriptorData::Property(PropertyData {
                callable,
                is_var: false,
                getter: None,
                setter: None,
            }),
        );
        let getter = self.arena.alloc(
            Some(property),
            Vec::new(),
            getter_name,
            NodeIndex::NONE,
            DescriptorData::Accessor(AccessorData {
                is_getter: true,
                visibility: Visibility::Public,
                modality: Modality::Final,
            }),
        );
        if let DescriptorData::Property(data) = &mut self.arena.descriptor_mut(property)?.data {
            data.getter = Some(getter);
        }
        self.arena
            .class_mut(class)?
            .add_declared_callable(class, property, name, MemberKind::Property)?;
        Ok(property)
    }

    /// Give `class` a fake override of each of `members`.
    fn inherit(&mut self, class: DescriptorId, members: &[DescriptorId]) -> Result<(), InternalError> {
        let identity = TypeSubstitutor::identity();
        for &member in members {
            let copy = self.arena.copy_callable(
                member,
                CopyParams {
                    owner: class,
                    substitutor: &identity,
                    kind: CallableKind::FakeOverride,
                    modality: Modality::Open,
                    visibility: Visibility::Public,
                    keep_overridden: false,
                    keep_source: false,
                },
            )?;
            self.arena.callable_mut(copy)?.overridden.push(member);
            let name = self.arena.name(member);
            self.arena
                .class_mut(class)?
                .add_fake_override(class, copy, name, MemberKind::Function)?;
        }
        Ok(())
    }
}

impl Builtins {
    /// Install the builtin module into `arena`.
    ///
    /// Every builtin name must already be interned (`Interner::new` does
    /// this); analysis never mutates the interner.
    pub fn install(arena: &mut DescriptorArena, interner: &Interner) -> Result<Builtins, InternalError> {
        let module_name = atom(interner, "<builtins>")?;
        let module = arena.alloc_module(module_name);
        let mut installer = Installer { arena, interner };

        let any = installer.class(module, "Any", ClassKind::Class, Modality::Open)?;
        let nothing = installer.class(module, "Nothing", ClassKind::Class, Modality::Final)?;
        let unit = installer.class(module, "Unit", ClassKind::Object, Modality::Final)?;
        let boolean = installer.class(module, "Boolean", ClassKind::Class, Modality::Final)?;
        let char = installer.class(module, "Char", ClassKind::Class, Modality::Final)?;
        let int = installer.class(module, "Int", ClassKind::Class, Modality::Final)?;
        let string = installer.class(module, "String", ClassKind::Class, Modality::Final)?;
        let array = installer.class(module, "Array", ClassKind::Class, Modality::Final)?;

        let builtins = Builtins {
            module,
            any,
            nothing,
            unit,
            boolean,
            char,
            int,
            string,
            array,
        };

        for class in builtins.classes() {
            let parameters = if class == array {
                let name = atom(installer.interner, "T")?;
                let t = installer
                    .arena
                    .alloc_type_parameter(array, name, NodeIndex::NONE, 0);
                installer
                    .arena
                    .set_upper_bounds(t, vec![JetType::class(any).make_nullable()])?;
                vec![t]
            } else {
                Vec::new()
            };
            installer
                .arena
                .class_mut(class)?
                .set_type_parameters(class, parameters)?;
            if class != any && class != nothing {
                installer
                    .arena
                    .class_mut(class)?
                    .add_supertype(class, JetType::class(any))?;
            }
        }

        let any_type = JetType::class(any);
        let int_type = JetType::class(int);
        let boolean_type = JetType::class(boolean);
        let string_type = JetType::class(string);

        let any_members = [
            installer.function(
                any,
                "equals",
                &[("other", any_type.make_nullable())],
                boolean_type.clone(),
                Modality::Open,
            )?,
            installer.function(any, "hashCode", &[], int_type.clone(), Modality::Open)?,
            installer.function(any, "toString", &[], string_type.clone(), Modality::Open)?,
        ];

        for name in ["plus", "minus", "times"] {
            installer.function(
                int,
                name,
                &[("other", int_type.clone())],
                int_type.clone(),
                Modality::Final,
            )?;
        }
        installer.function(
            int,
            "compareTo",
            &[("other", int_type.clone())],
            int_type.clone(),
            Modality::Final,
        )?;

        installer.function(
            string,
            "plus",
            &[("other", any_type.make_nullable())],
            string_type.clone(),
            Modality::Final,
        )?;
        installer.function(
            string,
            "get",
            &[("index", int_type.clone())],
            JetType::class(char),
            Modality::Final,
        )?;
        installer.val(string, "length", int_type.clone())?;

        let element = installer
            .arena
            .class(array)
            .and_then(|data| data.type_parameters().first().copied())
            .map(JetType::type_parameter)
            .unwrap_or(JetType::Error);
        installer.function(
            array,
            "get",
            &[("index", int_type.clone())],
            element.clone(),
            Modality::Final,
        )?;
        installer.function(
            array,
            "set",
            &[("index", int_type.clone()), ("value", element)],
            JetType::class(unit),
            Modality::Final,
        )?;
        installer.val(array, "size", int_type)?;

        for class in builtins.classes() {
            if class != any && class != nothing {
                installer.inherit(class, &any_members)?;
            }
            installer.arena.class_mut(class)?.lock(class)?;
        }

        tracing::debug!(classes = builtins.classes().len(), "installed builtins");
        Ok(builtins)
    }

    pub fn classes(&self) -> [DescriptorId; 8] {
        [
            self.any,
            self.nothing,
            self.unit,
            self.boolean,
            self.char,
            self.int,
            self.string,
            self.array,
        ]
    }

    #[inline]
    pub fn is_builtin_class(&self, id: DescriptorId) -> bool {
        self.classes().contains(&id)
    }

    pub fn any_type(&self) -> JetType {
        JetType::class(self.any)
    }

    pub fn nullable_any_type(&self) -> JetType {
        JetType::class(self.any).make_nullable()
    }

    pub fn unit_type(&self) -> JetType {
        JetType::class(self.unit)
    }

    pub fn int_type(&self) -> JetType {
        JetType::class(self.int)
    }

    pub fn string_type(&self) -> JetType {
        JetType::class(self.string)
    }

    pub fn boolean_type(&self) -> JetType {
        JetType::class(self.boolean)
    }

    pub fn nothing_type(&self) -> JetType {
        JetType::class(self.nothing)
    }

    pub fn array_of(&self, element: JetType) -> JetType {
        JetType::generic(self.array, vec![element])
    }
}
