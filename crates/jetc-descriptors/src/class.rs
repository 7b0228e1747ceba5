//! Class descriptor mutation.
//!
//! Every "set once" rule and the post-lock freeze live here, so whichever
//! component drives construction cannot bypass them.

use jetc_common::Atom;

use crate::descriptor::{ClassData, DescriptorId};
use crate::error::InternalError;
use crate::types::JetType;

/// Outcome of attaching a companion object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompanionStatus {
    Ok,
    /// The class already has a companion.
    Duplicate,
    /// Objects and enum entries cannot have companions.
    NotAllowed,
}

/// Which name index a callable member goes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Function,
    Property,
}

impl ClassData {
    fn ensure_unlocked(&self, class: DescriptorId, operation: &'static str) -> Result<(), InternalError> {
        if self.locked {
            return Err(InternalError::ClassLocked { class, operation });
        }
        Ok(())
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Own type parameters; empty until set.
    pub fn type_parameters(&self) -> &[DescriptorId] {
        self.type_parameters.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn type_parameters_set(&self) -> bool {
        self.type_parameters.is_some()
    }

    pub fn set_type_parameters(
        &mut self,
        class: DescriptorId,
        type_parameters: Vec<DescriptorId>,
    ) -> Result<(), InternalError> {
        self.ensure_unlocked(class, "set type parameters")?;
        if self.type_parameters.is_some() {
            return Err(InternalError::TypeParametersAlreadySet { class });
        }
        self.type_parameters = Some(type_parameters);
        Ok(())
    }

    pub fn supertypes(&self) -> &[JetType] {
        &self.supertypes
    }

    /// Add a resolved supertype. Error and non-class types are skipped and
    /// `false` is returned; reporting them is the resolver's job.
    pub fn add_supertype(
        &mut self,
        class: DescriptorId,
        supertype: JetType,
    ) -> Result<bool, InternalError> {
        self.ensure_unlocked(class, "add supertype")?;
        if supertype.class_id().is_none() {
            return Ok(false);
        }
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        Ok(true)
    }

    /// Drop every supertype whose classifier is `target`. Used to break
    /// inheritance cycles after they have been reported.
    pub fn remove_supertype(
        &mut self,
        class: DescriptorId,
        target: DescriptorId,
    ) -> Result<(), InternalError> {
        self.ensure_unlocked(class, "remove supertype")?;
        self.supertypes.retain(|ty| ty.class_id() != Some(target));
        Ok(())
    }

    pub fn primary_constructor(&self) -> Option<DescriptorId> {
        self.primary_constructor
    }

    pub fn set_primary_constructor(
        &mut self,
        class: DescriptorId,
        constructor: DescriptorId,
    ) -> Result<(), InternalError> {
        self.ensure_unlocked(class, "set primary constructor")?;
        if self.primary_constructor.is_some() {
            return Err(InternalError::PrimaryConstructorAlreadySet { class });
        }
        self.primary_constructor = Some(constructor);
        Ok(())
    }

    /// Non-primary constructors.
    pub fn constructors(&self) -> &[DescriptorId] {
        &self.constructors
    }

    pub fn add_constructor(
        &mut self,
        class: DescriptorId,
        constructor: DescriptorId,
    ) -> Result<(), InternalError> {
        self.ensure_unlocked(class, "add constructor")?;
        self.constructors.push(constructor);
        Ok(())
    }

    /// Primary constructor first, then the rest in declaration order.
    pub fn all_constructors(&self) -> impl Iterator<Item = DescriptorId> + '_ {
        self.primary_constructor
            .into_iter()
            .chain(self.constructors.iter().copied())
    }

    pub fn declared_callables(&self) -> &[DescriptorId] {
        &self.declared_callables
    }

    pub fn all_callables(&self) -> &[DescriptorId] {
        &self.all_callables
    }

    pub fn add_declared_callable(
        &mut self,
        class: DescriptorId,
        member: DescriptorId,
        name: Atom,
        kind: MemberKind,
    ) -> Result<(), InternalError> {
        self.ensure_unlocked(class, "add declared member")?;
        self.declared_callables.push(member);
        self.index_callable(member, name, kind);
        Ok(())
    }

    /// Add a fake override: visible in `all_callables` and the name indexes,
    /// but not among the declared members.
    pub fn add_fake_override(
        &mut self,
        class: DescriptorId,
        member: DescriptorId,
        name: Atom,
        kind: MemberKind,
    ) -> Result<(), InternalError> {
        self.ensure_unlocked(class, "add fake override")?;
        self.index_callable(member, name, kind);
        Ok(())
    }

    fn index_callable(&mut self, member: DescriptorId, name: Atom, kind: MemberKind) {
        self.all_callables.push(member);
        let index = match kind {
            MemberKind::Function => &mut self.functions_by_name,
            MemberKind::Property => &mut self.properties_by_name,
        };
        index.entry(name).or_default().push(member);
    }

    /// Functions visible under `name` (declared and fake overrides).
    pub fn functions(&self, name: Atom) -> &[DescriptorId] {
        self.functions_by_name
            .get(&name)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn properties(&self, name: Atom) -> &[DescriptorId] {
        self.properties_by_name
            .get(&name)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Names of every callable member, functions first, in insertion order.
    pub fn callable_names(&self) -> impl Iterator<Item = Atom> + '_ {
        self.functions_by_name
            .keys()
            .chain(self.properties_by_name.keys())
            .copied()
    }

    pub fn nested_classes(&self) -> &[DescriptorId] {
        &self.nested_classes
    }

    pub fn add_nested_class(
        &mut self,
        class: DescriptorId,
        nested: DescriptorId,
    ) -> Result<(), InternalError> {
        self.ensure_unlocked(class, "add nested class")?;
        self.nested_classes.push(nested);
        Ok(())
    }

    pub fn companion(&self) -> Option<DescriptorId> {
        self.companion
    }

    pub fn set_companion(
        &mut self,
        class: DescriptorId,
        companion: DescriptorId,
    ) -> Result<CompanionStatus, InternalError> {
        self.ensure_unlocked(class, "set companion object")?;
        if self.kind.is_singleton() {
            return Ok(CompanionStatus::NotAllowed);
        }
        if self.companion.is_some() {
            return Ok(CompanionStatus::Duplicate);
        }
        self.companion = Some(companion);
        Ok(CompanionStatus::Ok)
    }

    /// Freeze the class. Called once by scope locking.
    pub fn lock(&mut self, class: DescriptorId) -> Result<(), InternalError> {
        if self.locked {
            return Err(InternalError::ScopesAlreadyLocked { class });
        }
        self.locked = true;
        Ok(())
    }
}
