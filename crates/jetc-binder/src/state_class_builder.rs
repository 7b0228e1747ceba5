//! Class descriptor builder.
//!
//! A class identity is reserved first, then its scopes are allocated and
//! wired, and the class registers itself in its own member-resolution scope.
//! Header fields, members and the companion are attached afterwards, and
//! `lock_class_scopes` freezes the lot exactly once.

use jetc_common::Atom;
use jetc_descriptors::{
    ClassData, CompanionStatus, DescriptorId, InternalError, JetType, MemberKind, Modality,
    Visibility,
};
use jetc_syntax::{ClassKind, NodeIndex};
use tracing::{debug, trace};

use crate::class_scopes::ClassScopes;
use crate::scope::{RedeclarationPolicy, ScopeId};
use crate::state::BinderState;

/// Everything `create_class` needs besides the containing declaration.
#[derive(Clone, Copy, Debug)]
pub struct ClassHeader {
    pub name: Atom,
    pub source: NodeIndex,
    pub kind: ClassKind,
    pub is_inner: bool,
    pub modality: Modality,
    pub visibility: Visibility,
}

impl BinderState<'_> {
    fn class_data_mut(&mut self, class: DescriptorId) -> Result<&mut ClassData, InternalError> {
        self.descriptors.class_mut(class)
    }

    /// Reserve a class descriptor and allocate its scopes.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn create_class(
        &mut self,
        containing: DescriptorId,
        outer_scope: ScopeId,
        header: ClassHeader,
    ) -> Result<DescriptorId, InternalError> {
        let class = self.descriptors.reserve_class(
            containing,
            header.name,
            header.source,
            header.kind,
            header.is_inner,
            header.modality,
            header.visibility,
        );
        let policy = self.reporting_policy();

        let member_lookup =
            self.scopes
                .new_scope(None, class, RedeclarationPolicy::Ignore, "member lookup");
        let static_scope = self
            .scopes
            .new_scope(None, class, RedeclarationPolicy::Ignore, "static");
        let supertype_resolution = self.scopes.new_scope(
            Some(outer_scope),
            class,
            RedeclarationPolicy::Ignore,
            "supertype resolution",
        );
        let member_resolution =
            self.scopes
                .new_scope(Some(supertype_resolution), class, policy, "member resolution");

        self.scopes
            .add_labeled_declaration(member_resolution, header.name, class)?;
        self.scopes.set_implicit_receiver(member_resolution, class)?;
        self.scopes.import_scope(member_resolution, static_scope)?;

        let mut scopes = ClassScopes {
            member_lookup,
            static_scope,
            supertype_resolution,
            member_resolution,
            initializer: None,
        };
        if header.kind == ClassKind::Interface {
            scopes.initializer = Some(self.scopes.new_scope(
                Some(member_resolution),
                class,
                policy,
                "initializer",
            ));
        }

        self.class_scopes.insert(class, scopes);
        self.classes.push(class);
        debug!(
            class = class.0,
            name = self.text(header.name),
            kind = header.kind.keyword(),
            "created class"
        );
        Ok(class)
    }

    /// Set the class's type parameters (once) and register them in the
    /// supertype-resolution scope, which is locked afterwards.
    pub fn set_class_type_parameters(
        &mut self,
        class: DescriptorId,
        type_parameters: Vec<DescriptorId>,
    ) -> Result<(), InternalError> {
        let scopes = self.class_scopes(class)?;
        self.class_data_mut(class)?
            .set_type_parameters(class, type_parameters.clone())?;
        for parameter in type_parameters {
            let name = self.descriptors.name(parameter);
            self.scopes
                .add_type_parameter(scopes.supertype_resolution, name, parameter)?;
        }
        self.scopes.lock(scopes.supertype_resolution)
    }

    /// Add a resolved supertype. Error and non-class types are excluded and
    /// `false` is returned.
    pub fn add_class_supertype(
        &mut self,
        class: DescriptorId,
        supertype: JetType,
    ) -> Result<bool, InternalError> {
        self.class_data_mut(class)?.add_supertype(class, supertype)
    }

    /// Set the primary constructor (once) and allocate the initializer scope.
    pub fn set_class_primary_constructor(
        &mut self,
        class: DescriptorId,
        constructor: DescriptorId,
    ) -> Result<ScopeId, InternalError> {
        self.class_data_mut(class)?
            .set_primary_constructor(class, constructor)?;
        self.ensure_initializer_scope(class)
    }

    fn ensure_initializer_scope(&mut self, class: DescriptorId) -> Result<ScopeId, InternalError> {
        let scopes = self.class_scopes(class)?;
        if let Some(initializer) = scopes.initializer {
            return Ok(initializer);
        }
        let policy = self.reporting_policy();
        let initializer =
            self.scopes
                .new_scope(Some(scopes.member_resolution), class, policy, "initializer");
        if let Some(entry) = self.class_scopes.get_mut(&class) {
            entry.initializer = Some(initializer);
        }
        Ok(initializer)
    }

    pub fn add_class_constructor(
        &mut self,
        class: DescriptorId,
        constructor: DescriptorId,
    ) -> Result<(), InternalError> {
        self.class_data_mut(class)?
            .add_constructor(class, constructor)
    }

    /// Register a declared function or property.
    pub fn add_class_member(
        &mut self,
        class: DescriptorId,
        member: DescriptorId,
        kind: MemberKind,
    ) -> Result<(), InternalError> {
        let name = self.descriptors.name(member);
        self.class_data_mut(class)?
            .add_declared_callable(class, member, name, kind)?;
        self.register_member_in_scopes(class, member, name, kind)
    }

    /// Register a fake override produced by override resolution.
    pub fn add_class_fake_override(
        &mut self,
        class: DescriptorId,
        member: DescriptorId,
        kind: MemberKind,
    ) -> Result<(), InternalError> {
        let name = self.descriptors.name(member);
        self.class_data_mut(class)?
            .add_fake_override(class, member, name, kind)?;
        self.register_member_in_scopes(class, member, name, kind)
    }

    fn register_member_in_scopes(
        &mut self,
        class: DescriptorId,
        member: DescriptorId,
        name: Atom,
        kind: MemberKind,
    ) -> Result<(), InternalError> {
        let scopes = self.class_scopes(class)?;
        for scope in [scopes.member_lookup, scopes.member_resolution] {
            match kind {
                MemberKind::Function => self.scopes.add_function(scope, name, member)?,
                MemberKind::Property => self.scopes.add_property(scope, name, member)?,
            }
        }
        trace!(class = class.0, member = member.0, ?kind, "registered member");
        Ok(())
    }

    /// Register a nested classifier. Non-inner classes are also visible
    /// through the static scope.
    pub fn add_class_classifier(
        &mut self,
        class: DescriptorId,
        nested: DescriptorId,
    ) -> Result<(), InternalError> {
        let scopes = self.class_scopes(class)?;
        let name = self.descriptors.name(nested);
        let is_inner = self.descriptors.class(nested).is_some_and(|data| data.is_inner);
        self.class_data_mut(class)?.add_nested_class(class, nested)?;
        self.scopes.add_classifier(scopes.member_lookup, name, nested)?;
        self.scopes
            .add_classifier(scopes.member_resolution, name, nested)?;
        if !is_inner {
            self.scopes.add_classifier(scopes.static_scope, name, nested)?;
        }
        Ok(())
    }

    /// Attach a companion object. Reporting a non-`Ok` status is the
    /// caller's job.
    pub fn set_class_companion(
        &mut self,
        class: DescriptorId,
        companion: DescriptorId,
    ) -> Result<CompanionStatus, InternalError> {
        let status = self.class_data_mut(class)?.set_companion(class, companion)?;
        if status == CompanionStatus::Ok {
            self.class_data_mut(companion)?.is_companion = true;
        }
        Ok(status)
    }

    /// Lock every scope of the class, the class itself and, recursively, its
    /// companion. Fails if the class is already locked.
    #[tracing::instrument(level = "debug", skip(self), fields(class = class.0))]
    pub fn lock_class_scopes(&mut self, class: DescriptorId) -> Result<(), InternalError> {
        let scopes = self.class_scopes(class)?;
        if self.descriptors.class(class).is_some_and(|data| data.is_locked()) {
            return Err(InternalError::ScopesAlreadyLocked { class });
        }
        for scope in scopes.all() {
            self.scopes.lock(scope)?;
        }
        let companion = self.descriptors.class(class).and_then(|data| data.companion());
        self.class_data_mut(class)?.lock(class)?;
        if let Some(companion) = companion
            && !self
                .descriptors
                .class(companion)
                .is_some_and(|data| data.is_locked())
        {
            self.lock_class_scopes(companion)?;
        }
        Ok(())
    }
}
