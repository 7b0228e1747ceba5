//! Class-level override resolution and override checks.
//!
//! Walks classes supertypes-first. For each class the members of every
//! supertype, substituted with that supertype's type arguments, are matched
//! name by name against the declared members (`resolve_overrides_for_name`).
//! The result is applied to the class: overridden sets on declared members,
//! fake overrides for what is inherited unchanged, and diagnostics for
//! conflicts. Declared members are then checked against what they override.

use indexmap::{IndexMap, IndexSet};
use jetc_binder::BinderState;
use jetc_common::{Atom, DiagnosticReporter, diagnostic_codes};
use jetc_descriptors::{
    CallableKind, CopyParams, DescriptorData, DescriptorId, DescriptorRenderer, InternalError,
    MemberKind, Modality, TypeSubstitutor, Visibility,
};
use jetc_syntax::ClassKind;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::options::AnalyzerOptions;
use crate::overriding::{
    FakeOverrideVisibility, NameResolution, OverridingUtil, resolve_overrides_for_name,
};

/// A declared member and the inherited members it overrides, as seen from
/// the overriding class (substituted).
type Binding = (DescriptorId, SmallVec<[DescriptorId; 2]>);

pub struct OverrideResolver<'s, 'a> {
    state: &'s mut BinderState<'a>,
    options: AnalyzerOptions,
}

impl<'s, 'a> OverrideResolver<'s, 'a> {
    pub fn new(state: &'s mut BinderState<'a>, options: AnalyzerOptions) -> Self {
        OverrideResolver { state, options }
    }

    /// Resolve every class in `order`, which must list supertypes first.
    #[tracing::instrument(level = "debug", skip_all, fields(classes = order.len()))]
    pub fn resolve(
        &mut self,
        order: &[DescriptorId],
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        for &class in order {
            self.resolve_class(class, reporter)?;
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self, reporter), fields(class = class.0))]
    fn resolve_class(
        &mut self,
        class: DescriptorId,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        // Substituted copy -> the supertype member it was made from.
        let mut origin: FxHashMap<DescriptorId, DescriptorId> = FxHashMap::default();
        let inherited = self.collect_inherited(class, &mut origin)?;

        let mut declared: IndexMap<Atom, Vec<DescriptorId>> = IndexMap::new();
        let declared_members = self
            .state
            .descriptors
            .class(class)
            .map(|data| data.declared_callables().to_vec())
            .unwrap_or_default();
        for member in declared_members {
            declared
                .entry(self.state.descriptors.name(member))
                .or_default()
                .push(member);
        }

        let names: IndexSet<Atom> = declared.keys().chain(inherited.keys()).copied().collect();
        let mut bindings: Vec<Binding> = Vec::new();
        for name in names {
            let inherited_members = inherited.get(&name).map_or(&[][..], Vec::as_slice);
            let declared_members = declared.get(&name).map_or(&[][..], Vec::as_slice);
            let resolution = {
                let util = OverridingUtil::new(&self.state.descriptors, &self.state.builtins);
                resolve_overrides_for_name(&util, inherited_members, declared_members)
            };
            trace!(
                name = self.state.text(name),
                bindings = resolution.bindings.len(),
                fake_overrides = resolution.fake_overrides.len(),
                conflicts = resolution.conflicts.len(),
                "resolved name"
            );
            bindings.extend(self.apply(class, resolution, &origin, reporter)?);
        }

        for (member, overridden) in &bindings {
            self.infer_declared_visibility(*member, overridden, reporter)?;
        }
        if self.options.report_override_modifier_errors {
            for (member, overridden) in &bindings {
                self.check_declared_member(*member, overridden, &origin, reporter);
            }
        }
        if self.options.report_abstract_not_implemented {
            self.check_abstract_members_implemented(class, reporter);
        }
        Ok(())
    }

    /// Members of every supertype, by name, substituted with the
    /// supertype's arguments. A member reachable through several supertypes
    /// under the same substitution appears once.
    fn collect_inherited(
        &mut self,
        class: DescriptorId,
        origin: &mut FxHashMap<DescriptorId, DescriptorId>,
    ) -> Result<IndexMap<Atom, Vec<DescriptorId>>, InternalError> {
        let mut inherited: IndexMap<Atom, Vec<DescriptorId>> = IndexMap::new();
        let supertypes = self.state.descriptors.supertypes(class).to_vec();
        for supertype in supertypes {
            let Some(super_class) = supertype.class_id() else {
                continue;
            };
            let substitutor = TypeSubstitutor::for_class_type(&self.state.descriptors, &supertype);
            let members = self
                .state
                .descriptors
                .class(super_class)
                .map(|data| data.all_callables().to_vec())
                .unwrap_or_default();
            for member in members {
                let name = self.state.descriptors.name(member);
                let seen = self.state.descriptors.substitute(member, &substitutor)?;
                let entry = inherited.entry(name).or_default();
                if !entry.contains(&seen) {
                    entry.push(seen);
                    origin.insert(seen, member);
                }
            }
        }
        Ok(inherited)
    }

    /// Apply one name's resolution to `class`. Returns the declared bindings
    /// for the member checks.
    fn apply(
        &mut self,
        class: DescriptorId,
        resolution: NameResolution,
        origin: &FxHashMap<DescriptorId, DescriptorId>,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<Vec<Binding>, InternalError> {
        let unsubstituted = |id: &DescriptorId| origin.get(id).copied().unwrap_or(*id);

        for (member, overridden) in &resolution.bindings {
            self.state.descriptors.callable_mut(*member)?.overridden =
                overridden.iter().map(unsubstituted).collect();
        }

        for plan in &resolution.fake_overrides {
            let identity = TypeSubstitutor::identity();
            let copy = self.state.descriptors.copy_callable(
                plan.most_specific,
                CopyParams {
                    owner: class,
                    substitutor: &identity,
                    kind: CallableKind::FakeOverride,
                    modality: plan.modality,
                    visibility: plan.visibility.visibility(),
                    keep_overridden: false,
                    keep_source: false,
                },
            )?;
            self.state.descriptors.callable_mut(copy)?.overridden =
                plan.overridden.iter().map(unsubstituted).collect();
            if let FakeOverrideVisibility::CannotInfer { fallback } = plan.visibility {
                debug!(member = copy.0, fallback = fallback.keyword(), "cannot infer visibility");
                let name = self.state.text(self.state.descriptors.name(copy));
                self.state.report_at(
                    reporter,
                    self.state.descriptors.source(class),
                    diagnostic_codes::CANNOT_INFER_VISIBILITY,
                    &[name],
                );
            }
            let kind = if self.state.descriptors.is_function(copy) {
                MemberKind::Function
            } else {
                MemberKind::Property
            };
            self.state.add_class_fake_override(class, copy, kind)?;
        }

        for &(from_super, other) in &resolution.conflicts {
            let renderer = DescriptorRenderer::new(&self.state.descriptors, self.state.syntax().interner());
            let first = renderer.render(from_super);
            let second = renderer.render(other);
            debug!(class = class.0, first = %first, second = %second, "conflicting members");
            let class_name = self.state.text(self.state.descriptors.name(class));
            self.state.report_at(
                reporter,
                self.state.descriptors.source(class),
                diagnostic_codes::CONFLICTING_INHERITED_MEMBERS,
                &[class_name, &first, &second],
            );
        }

        Ok(resolution.bindings)
    }

    /// Give a declared `override` without a visibility modifier the
    /// visibility of what it overrides.
    fn infer_declared_visibility(
        &mut self,
        member: DescriptorId,
        overridden: &[DescriptorId],
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        if self.state.descriptors.visibility(member) != Some(Visibility::Inherited) {
            return Ok(());
        }
        let visibility = if overridden.is_empty() {
            Visibility::Public
        } else {
            let util = OverridingUtil::new(&self.state.descriptors, &self.state.builtins);
            match util.infer_visibility(overridden) {
                FakeOverrideVisibility::Inferred(visibility) => visibility,
                FakeOverrideVisibility::Invisible => Visibility::Public,
                FakeOverrideVisibility::CannotInfer { fallback } => {
                    let name = self.state.text(self.state.descriptors.name(member));
                    self.state.report_at(
                        reporter,
                        self.state.descriptors.source(member),
                        diagnostic_codes::CANNOT_INFER_VISIBILITY,
                        &[name],
                    );
                    fallback
                }
            }
        };
        self.set_callable_visibility(member, visibility)
    }

    fn set_callable_visibility(
        &mut self,
        member: DescriptorId,
        visibility: Visibility,
    ) -> Result<(), InternalError> {
        self.state.descriptors.callable_mut(member)?.visibility = visibility;
        let accessors: SmallVec<[DescriptorId; 2]> = self
            .state
            .descriptors
            .property(member)
            .map(|data| data.getter.into_iter().chain(data.setter).collect())
            .unwrap_or_default();
        for accessor in accessors {
            if let DescriptorData::Accessor(data) =
                &mut self.state.descriptors.descriptor_mut(accessor)?.data
            {
                data.visibility = visibility;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Checks
    // =========================================================================

    fn check_declared_member(
        &self,
        member: DescriptorId,
        overridden: &[DescriptorId],
        origin: &FxHashMap<DescriptorId, DescriptorId>,
        reporter: &mut dyn DiagnosticReporter,
    ) {
        let descriptors = &self.state.descriptors;
        let Some(data) = descriptors.callable(member) else {
            return;
        };
        let source = descriptors.source(member);
        let name = self.state.text(descriptors.name(member));
        let renderer = DescriptorRenderer::new(descriptors, self.state.syntax().interner());

        if overridden.is_empty() {
            if data.has_override_modifier {
                self.state.report_at(
                    reporter,
                    source,
                    diagnostic_codes::NOTHING_TO_OVERRIDE,
                    &[&renderer.render(member)],
                );
            }
            return;
        }

        let owner_name = |id: DescriptorId| {
            let declaration = origin.get(&id).copied().unwrap_or(id);
            descriptors
                .containing_class(declaration)
                .map_or("", |class| self.state.text(descriptors.name(class)))
        };

        if !data.has_override_modifier && data.kind == CallableKind::Declaration {
            self.state.report_at(
                reporter,
                source,
                diagnostic_codes::VIRTUAL_MEMBER_HIDDEN,
                &[name, owner_name(overridden[0])],
            );
        }

        let util = OverridingUtil::new(descriptors, &self.state.builtins);
        let member_property = descriptors.property(member);
        for &from_super in overridden {
            if descriptors.modality(from_super) == Some(Modality::Final) {
                self.state.report_at(
                    reporter,
                    source,
                    diagnostic_codes::OVERRIDING_FINAL_MEMBER,
                    &[name, owner_name(from_super)],
                );
            }
            let rendered = renderer.render(from_super);
            match (member_property, descriptors.property(from_super)) {
                (Some(property), Some(super_property)) => {
                    let type_matches = if super_property.is_var {
                        util.return_type_equal(member, from_super)
                    } else {
                        util.return_type_within(member, from_super)
                    };
                    if !type_matches {
                        self.state.report_at(
                            reporter,
                            source,
                            diagnostic_codes::PROPERTY_TYPE_MISMATCH_ON_OVERRIDE,
                            &[name, &rendered],
                        );
                    }
                    if super_property.is_var && !property.is_var {
                        self.state.report_at(
                            reporter,
                            source,
                            diagnostic_codes::VAR_OVERRIDDEN_BY_VAL,
                            &[name, &rendered],
                        );
                    }
                }
                _ => {
                    if !util.return_type_within(member, from_super) {
                        self.state.report_at(
                            reporter,
                            source,
                            diagnostic_codes::RETURN_TYPE_MISMATCH_ON_OVERRIDE,
                            &[name, &rendered],
                        );
                    }
                }
            }
        }
    }

    /// A concrete class must not inherit an abstract member unchanged.
    fn check_abstract_members_implemented(
        &self,
        class: DescriptorId,
        reporter: &mut dyn DiagnosticReporter,
    ) {
        let descriptors = &self.state.descriptors;
        let Some(data) = descriptors.class(class) else {
            return;
        };
        if data.modality == Modality::Abstract
            || matches!(data.kind, ClassKind::Interface | ClassKind::AnnotationClass)
        {
            return;
        }
        let renderer = DescriptorRenderer::new(descriptors, self.state.syntax().interner());
        let class_name = self.state.text(descriptors.name(class));
        for &member in data.all_callables() {
            let Some(callable) = descriptors.callable(member) else {
                continue;
            };
            if callable.kind == CallableKind::FakeOverride && callable.modality == Modality::Abstract {
                self.state.report_at(
                    reporter,
                    descriptors.source(class),
                    diagnostic_codes::ABSTRACT_MEMBER_NOT_IMPLEMENTED,
                    &[class_name, &renderer.render(member)],
                );
            }
        }
    }
}
