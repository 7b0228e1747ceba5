//! Signature-level override rules.
//!
//! Everything here is a pure function of the descriptor arena: binding
//! declared members to what they override, grouping inherited members into
//! fake overrides and detecting conflicts all return plain values. Applying
//! a `NameResolution` to a class is the driver's job (`override_resolver`).

use std::cmp::Ordering;

use jetc_descriptors::{
    Builtins, DescriptorArena, DescriptorId, JetType, Modality, TypeChecker,
    TypeParameterCorrespondence, TypeSubstitutor, Visibility,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::trace;

/// Outcome of comparing an inherited member with a candidate overrider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideCompatibility {
    Overridable,
    /// Unrelated signatures that may coexist as overloads.
    Incompatible(&'static str),
    /// Signatures that clash but cannot override each other.
    Conflict(&'static str),
}

impl OverrideCompatibility {
    #[inline]
    pub fn is_overridable(self) -> bool {
        self == OverrideCompatibility::Overridable
    }
}

/// Visibility decided for a fake override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeOverrideVisibility {
    Inferred(Visibility),
    /// Every overridden member is invisible from the inheriting class.
    Invisible,
    /// The visible members disagree; use `fallback` after reporting.
    CannotInfer { fallback: Visibility },
}

impl FakeOverrideVisibility {
    pub fn visibility(self) -> Visibility {
        match self {
            FakeOverrideVisibility::Inferred(visibility) => visibility,
            FakeOverrideVisibility::Invisible => Visibility::InvisibleFake,
            FakeOverrideVisibility::CannotInfer { fallback } => fallback,
        }
    }
}

/// One fake override to create in the inheriting class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeOverridePlan {
    /// Member whose signature the fake override copies.
    pub most_specific: DescriptorId,
    /// Every inherited member the fake override stands for.
    pub overridden: SmallVec<[DescriptorId; 2]>,
    pub modality: Modality,
    pub visibility: FakeOverrideVisibility,
}

/// Override resolution result for one name in one class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameResolution {
    /// Declared members and the inherited members each one overrides.
    pub bindings: Vec<(DescriptorId, SmallVec<[DescriptorId; 2]>)>,
    pub fake_overrides: Vec<FakeOverridePlan>,
    /// `(from supertype, other)` pairs that clash. The second member is
    /// either a declared member or another inherited one.
    pub conflicts: Vec<(DescriptorId, DescriptorId)>,
}

pub struct OverridingUtil<'a> {
    arena: &'a DescriptorArena,
    checker: TypeChecker<'a>,
}

impl<'a> OverridingUtil<'a> {
    pub fn new(arena: &'a DescriptorArena, builtins: &'a Builtins) -> Self {
        OverridingUtil {
            arena,
            checker: TypeChecker::new(arena, builtins),
        }
    }

    /// Whether `sub` can override `sup`.
    pub fn is_overridable_by(
        &self,
        sup: DescriptorId,
        sub: DescriptorId,
        check_return_type: bool,
    ) -> OverrideCompatibility {
        use OverrideCompatibility::*;

        let arena = self.arena;
        let (Some(sup_data), Some(sub_data)) = (arena.callable(sup), arena.callable(sub)) else {
            return Incompatible("not a callable member");
        };
        if arena.is_function(sup) != arena.is_function(sub) {
            return Incompatible("member kind mismatch");
        }
        if arena.name(sup) != arena.name(sub) {
            return Incompatible("name mismatch");
        }
        if sup_data.extension_receiver.is_some() != sub_data.extension_receiver.is_some() {
            return Incompatible("receiver presence mismatch");
        }

        let sup_parameters = arena.value_parameter_types(sup);
        let sub_parameters = arena.value_parameter_types(sub);
        if sup_parameters.len() != sub_parameters.len() {
            return Incompatible("value parameter number mismatch");
        }

        if sup_data.type_parameters.len() != sub_data.type_parameters.len() {
            let unrelated = TypeParameterCorrespondence::default();
            return if self.all_equal(&sup_parameters, &sub_parameters, &unrelated) {
                Conflict("type parameter number mismatch")
            } else {
                Incompatible("type parameter number mismatch")
            };
        }

        let correspondence: TypeParameterCorrespondence = sup_data
            .type_parameters
            .iter()
            .copied()
            .zip(sub_data.type_parameters.iter().copied())
            .collect();
        for (&sup_parameter, &sub_parameter) in
            sup_data.type_parameters.iter().zip(&sub_data.type_parameters)
        {
            if !self.all_equal(
                arena.upper_bounds(sup_parameter),
                arena.upper_bounds(sub_parameter),
                &correspondence,
            ) {
                return Incompatible("type parameter bounds mismatch");
            }
        }

        if let (Some(sup_receiver), Some(sub_receiver)) =
            (&sup_data.extension_receiver, &sub_data.extension_receiver)
            && !self
                .checker
                .equal_types(sup_receiver, sub_receiver, &correspondence)
        {
            return Incompatible("receiver type mismatch");
        }
        if !self.all_equal(&sup_parameters, &sub_parameters, &correspondence) {
            return Incompatible("value parameter type mismatch");
        }

        if check_return_type && !self.return_type_within(sub, sup) {
            return Conflict("return type mismatch");
        }
        Overridable
    }

    fn all_equal(
        &self,
        left: &[JetType],
        right: &[JetType],
        correspondence: &TypeParameterCorrespondence,
    ) -> bool {
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(l, r)| self.checker.equal_types(l, r, correspondence))
    }

    /// `sub`'s return type is a subtype of `sup`'s, with `sup`'s own type
    /// parameters read as `sub`'s.
    pub fn return_type_within(&self, sub: DescriptorId, sup: DescriptorId) -> bool {
        let (Some(sub_data), Some(sup_data)) = (self.arena.callable(sub), self.arena.callable(sup))
        else {
            return false;
        };
        let mut substitutor = TypeSubstitutor::identity();
        for (&sup_parameter, &sub_parameter) in
            sup_data.type_parameters.iter().zip(&sub_data.type_parameters)
        {
            substitutor.insert(sup_parameter, JetType::type_parameter(sub_parameter));
        }
        let expected = substitutor.substitute_type(&sup_data.return_type);
        self.checker.is_subtype(&sub_data.return_type, &expected)
    }

    /// Same as `return_type_within` but requiring equal types, for `var`
    /// properties.
    pub fn return_type_equal(&self, sub: DescriptorId, sup: DescriptorId) -> bool {
        let (Some(sub_data), Some(sup_data)) = (self.arena.callable(sub), self.arena.callable(sup))
        else {
            return false;
        };
        let correspondence: TypeParameterCorrespondence = sup_data
            .type_parameters
            .iter()
            .copied()
            .zip(sub_data.type_parameters.iter().copied())
            .collect();
        self.checker
            .equal_types(&sup_data.return_type, &sub_data.return_type, &correspondence)
    }

    fn both_ways(&self, a: DescriptorId, b: DescriptorId) -> OverrideCompatibility {
        let forward = self.is_overridable_by(a, b, false);
        let backward = self.is_overridable_by(b, a, false);
        match (forward, backward) {
            (OverrideCompatibility::Overridable, OverrideCompatibility::Overridable) => {
                OverrideCompatibility::Overridable
            }
            (conflict @ OverrideCompatibility::Conflict(_), _)
            | (_, conflict @ OverrideCompatibility::Conflict(_)) => conflict,
            (OverrideCompatibility::Incompatible(reason), _)
            | (_, OverrideCompatibility::Incompatible(reason)) => {
                OverrideCompatibility::Incompatible(reason)
            }
        }
    }

    fn is_visible(&self, member: DescriptorId) -> bool {
        self.arena
            .visibility(member)
            .is_some_and(Visibility::is_visible_for_override)
    }

    /// The widest visibility among `members`, or `None` when some pair of
    /// visibilities cannot be ordered against it.
    pub fn max_visibility(&self, members: &[DescriptorId]) -> Option<Visibility> {
        let visibilities: SmallVec<[Visibility; 4]> = members
            .iter()
            .filter_map(|&member| self.arena.visibility(member))
            .collect();
        visibilities.iter().copied().find(|&candidate| {
            visibilities.iter().all(|&other| {
                matches!(
                    other.compare(candidate),
                    Some(Ordering::Less | Ordering::Equal)
                )
            })
        })
    }

    /// Visibility a fake override of `members` gets.
    pub fn infer_visibility(&self, members: &[DescriptorId]) -> FakeOverrideVisibility {
        let visible: SmallVec<[DescriptorId; 4]> = members
            .iter()
            .copied()
            .filter(|&member| self.is_visible(member))
            .collect();
        if visible.is_empty() {
            return FakeOverrideVisibility::Invisible;
        }
        match self.max_visibility(&visible) {
            Some(visibility) => FakeOverrideVisibility::Inferred(visibility),
            None => FakeOverrideVisibility::CannotInfer {
                fallback: self.most_restrictive(&visible),
            },
        }
    }

    /// Most restrictive visibility among `members`, `Public` when empty.
    pub fn most_restrictive(&self, members: &[DescriptorId]) -> Visibility {
        members
            .iter()
            .filter_map(|&member| self.arena.visibility(member))
            .min_by_key(|visibility| visibility.restrictiveness_rank())
            .unwrap_or(Visibility::Public)
    }

    /// Whether `a` can stand for `b` in a fake override. A `val` never
    /// stands for a `var`, and two `var`s need equal types.
    pub fn is_more_specific(&self, a: DescriptorId, b: DescriptorId) -> bool {
        match (self.arena.property(a), self.arena.property(b)) {
            (Some(pa), Some(pb)) if pa.is_var && pb.is_var => self.return_type_equal(a, b),
            (Some(pa), Some(pb)) if !pa.is_var && pb.is_var => false,
            _ => self.return_type_within(a, b),
        }
    }

    /// Member of `group` a fake override copies. `None` when no return type
    /// is within every other one.
    ///
    /// One member more specific than all others wins. Otherwise the group is
    /// walked keeping the more specific member, so a `var` is kept over a
    /// `val` of a narrower type.
    fn most_specific(&self, group: &[DescriptorId]) -> Option<DescriptorId> {
        let [first, rest @ ..] = group else {
            return None;
        };
        if rest.is_empty() {
            return Some(*first);
        }
        let typed = group
            .iter()
            .any(|&candidate| above_all(group, candidate, |a, b| self.return_type_within(a, b)));
        if !typed {
            return None;
        }
        if let Some(candidate) = group
            .iter()
            .copied()
            .rfind(|&candidate| above_all(group, candidate, |a, b| self.is_more_specific(a, b)))
        {
            return Some(candidate);
        }
        let mut transitive = *first;
        for &member in rest {
            if self.is_more_specific(member, transitive) {
                transitive = member;
            }
        }
        trace!(member = transitive.0, "no member more specific than all");
        Some(transitive)
    }

    /// Member of `queue` with the widest visibility; the first one when
    /// visibilities are not ordered.
    fn widest(&self, queue: &[DescriptorId]) -> DescriptorId {
        let mut best = queue[0];
        for &candidate in &queue[1..] {
            let best_visibility = self.arena.visibility(best);
            let candidate_visibility = self.arena.visibility(candidate);
            if let (Some(best_visibility), Some(candidate_visibility)) =
                (best_visibility, candidate_visibility)
                && best_visibility.compare(candidate_visibility) == Some(Ordering::Less)
            {
                best = candidate;
            }
        }
        best
    }
}

fn above_all(
    group: &[DescriptorId],
    candidate: DescriptorId,
    rule: impl Fn(DescriptorId, DescriptorId) -> bool,
) -> bool {
    group
        .iter()
        .all(|&other| other == candidate || rule(candidate, other))
}

// =============================================================================
// Per-name resolution
// =============================================================================

/// Resolve one name of one class: bind declared members to the inherited
/// members they override, then group what is left into fake overrides.
///
/// Members of a group that clash, or that have no most specific return type,
/// produce conflicts and no fake override at all.
pub fn resolve_overrides_for_name(
    util: &OverridingUtil<'_>,
    inherited: &[DescriptorId],
    declared: &[DescriptorId],
) -> NameResolution {
    let mut result = NameResolution::default();
    let mut bound = FxHashSet::default();

    for &member in declared {
        let mut overridden = SmallVec::new();
        for &from_super in inherited {
            match util.is_overridable_by(from_super, member, false) {
                OverrideCompatibility::Overridable => {
                    if util.is_visible(from_super) {
                        overridden.push(from_super);
                    }
                    bound.insert(from_super);
                }
                OverrideCompatibility::Conflict(reason) => {
                    if util.is_visible(from_super) {
                        trace!(from_super = from_super.0, member = member.0, reason, "declared conflict");
                        result.conflicts.push((from_super, member));
                    }
                    bound.insert(from_super);
                }
                OverrideCompatibility::Incompatible(_) => {}
            }
        }
        result.bindings.push((member, overridden));
    }

    let mut queue: Vec<DescriptorId> = inherited
        .iter()
        .copied()
        .filter(|member| !bound.contains(member))
        .collect();
    while !queue.is_empty() {
        let widest = util.widest(&queue);
        let mut group: SmallVec<[DescriptorId; 2]> = SmallVec::new();
        group.push(widest);
        let mut conflicted = false;
        queue.retain(|&other| {
            if other == widest {
                return false;
            }
            match util.both_ways(widest, other) {
                OverrideCompatibility::Overridable => {
                    group.push(other);
                    false
                }
                OverrideCompatibility::Conflict(reason) => {
                    trace!(widest = widest.0, other = other.0, reason, "inherited conflict");
                    result.conflicts.push((widest, other));
                    conflicted = true;
                    false
                }
                OverrideCompatibility::Incompatible(_) => true,
            }
        });
        if conflicted {
            continue;
        }

        let Some(most_specific) = util.most_specific(&group) else {
            result.conflicts.push((group[0], group[group.len() - 1]));
            continue;
        };
        let modality = group
            .iter()
            .filter_map(|&member| util.arena.modality(member))
            .min()
            .unwrap_or(Modality::Final);
        result.fake_overrides.push(FakeOverridePlan {
            most_specific,
            visibility: util.infer_visibility(&group),
            overridden: group,
            modality,
        });
    }
    result
}
