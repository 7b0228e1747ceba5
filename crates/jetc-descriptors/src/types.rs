//! Types and the nominal type checker used by override resolution.
//!
//! Only the relations descriptor construction needs live here: structural
//! equality (modulo a type-parameter correspondence, for comparing
//! signatures) and nominal subtyping through substituted supertypes. The
//! full constraint-based checker is an external collaborator.

use jetc_common::limits::MAX_SUPERTYPE_DEPTH;
use rustc_hash::FxHashMap;

use crate::builtins::Builtins;
use crate::substitution::TypeSubstitutor;
use crate::{DescriptorArena, DescriptorId};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum JetType {
    /// A class type with invariant type arguments.
    Class {
        class: DescriptorId,
        arguments: Vec<JetType>,
        nullable: bool,
    },
    TypeParameter {
        parameter: DescriptorId,
        nullable: bool,
    },
    /// An unresolved type. Compatible with everything so one bad reference
    /// does not cascade into unrelated diagnostics.
    Error,
}

impl JetType {
    pub fn class(class: DescriptorId) -> JetType {
        JetType::Class {
            class,
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(class: DescriptorId, arguments: Vec<JetType>) -> JetType {
        JetType::Class {
            class,
            arguments,
            nullable: false,
        }
    }

    pub fn type_parameter(parameter: DescriptorId) -> JetType {
        JetType::TypeParameter {
            parameter,
            nullable: false,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, JetType::Error)
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        match self {
            JetType::Class { nullable, .. } | JetType::TypeParameter { nullable, .. } => *nullable,
            JetType::Error => false,
        }
    }

    /// The classifier of a class type.
    #[inline]
    pub fn class_id(&self) -> Option<DescriptorId> {
        match self {
            JetType::Class { class, .. } => Some(*class),
            _ => None,
        }
    }

    #[must_use]
    pub fn with_nullability(&self, nullable: bool) -> JetType {
        match self {
            JetType::Class {
                class, arguments, ..
            } => JetType::Class {
                class: *class,
                arguments: arguments.clone(),
                nullable,
            },
            JetType::TypeParameter { parameter, .. } => JetType::TypeParameter {
                parameter: *parameter,
                nullable,
            },
            JetType::Error => JetType::Error,
        }
    }

    #[must_use]
    pub fn make_nullable(&self) -> JetType {
        self.with_nullability(true)
    }
}

/// Correspondence between the type parameters of two signatures being
/// compared (`fun <T> f(t: T)` vs `fun <U> f(t: U)`).
pub type TypeParameterCorrespondence = FxHashMap<DescriptorId, DescriptorId>;

pub struct TypeChecker<'a> {
    arena: &'a DescriptorArena,
    builtins: &'a Builtins,
}

impl<'a> TypeChecker<'a> {
    pub fn new(arena: &'a DescriptorArena, builtins: &'a Builtins) -> Self {
        TypeChecker { arena, builtins }
    }

    /// Structural equality. Type parameters on the left match their
    /// counterpart on the right through `correspondence`.
    pub fn equal_types(
        &self,
        left: &JetType,
        right: &JetType,
        correspondence: &TypeParameterCorrespondence,
    ) -> bool {
        match (left, right) {
            (JetType::Error, _) | (_, JetType::Error) => true,
            (
                JetType::Class {
                    class: c1,
                    arguments: a1,
                    nullable: n1,
                },
                JetType::Class {
                    class: c2,
                    arguments: a2,
                    nullable: n2,
                },
            ) => {
                c1 == c2
                    && n1 == n2
                    && a1.len() == a2.len()
                    && a1
                        .iter()
                        .zip(a2)
                        .all(|(l, r)| self.equal_types(l, r, correspondence))
            }
            (
                JetType::TypeParameter {
                    parameter: p1,
                    nullable: n1,
                },
                JetType::TypeParameter {
                    parameter: p2,
                    nullable: n2,
                },
            ) => n1 == n2 && (p1 == p2 || correspondence.get(p1) == Some(p2)),
            _ => false,
        }
    }

    /// Nominal subtyping: `sub <: sup`.
    pub fn is_subtype(&self, sub: &JetType, sup: &JetType) -> bool {
        self.is_subtype_at(sub, sup, 0)
    }

    fn is_subtype_at(&self, sub: &JetType, sup: &JetType, depth: usize) -> bool {
        if depth > MAX_SUPERTYPE_DEPTH {
            tracing::warn!(depth, "subtype check exceeded supertype depth limit");
            return false;
        }
        if sub.is_error() || sup.is_error() {
            return true;
        }
        if sub.is_nullable() && !sup.is_nullable() {
            return false;
        }
        match sub {
            JetType::TypeParameter {
                parameter,
                nullable,
            } => {
                if let JetType::TypeParameter { parameter: other, .. } = sup
                    && other == parameter
                {
                    return true;
                }
                let bounds = self.arena.upper_bounds(*parameter);
                if bounds.is_empty() {
                    let implicit = JetType::class(self.builtins.any).make_nullable();
                    return self.is_subtype_at(&implicit, sup, depth + 1);
                }
                bounds.iter().any(|bound| {
                    let bound = if *nullable {
                        bound.make_nullable()
                    } else {
                        bound.clone()
                    };
                    self.is_subtype_at(&bound, sup, depth + 1)
                })
            }
            JetType::Class { class, .. } => {
                if *class == self.builtins.nothing {
                    return true;
                }
                let JetType::Class {
                    class: target,
                    arguments: target_args,
                    ..
                } = sup
                else {
                    return false;
                };
                if *target == self.builtins.any {
                    return true;
                }
                let Some(instance) = self.find_supertype_instance(sub, *target) else {
                    return false;
                };
                let JetType::Class { arguments, .. } = &instance else {
                    return false;
                };
                let identity = TypeParameterCorrespondence::default();
                arguments.len() == target_args.len()
                    && arguments
                        .iter()
                        .zip(target_args)
                        .all(|(l, r)| self.equal_types(l, r, &identity))
            }
            JetType::Error => true,
        }
    }

    /// Find `ty` viewed as an instance of `target` (walking substituted
    /// supertypes), e.g. `MyList<Int>` as `List<Int>`.
    pub fn find_supertype_instance(&self, ty: &JetType, target: DescriptorId) -> Option<JetType> {
        self.find_supertype_instance_at(ty, target, 0)
    }

    fn find_supertype_instance_at(
        &self,
        ty: &JetType,
        target: DescriptorId,
        depth: usize,
    ) -> Option<JetType> {
        if depth > MAX_SUPERTYPE_DEPTH {
            return None;
        }
        let class = ty.class_id()?;
        if class == target {
            return Some(ty.clone());
        }
        let substitutor = TypeSubstitutor::for_class_type(self.arena, ty);
        for supertype in self.arena.supertypes(class) {
            let substituted = substitutor.substitute_type(supertype);
            if let Some(found) = self.find_supertype_instance_at(&substituted, target, depth + 1) {
                return Some(found);
            }
        }
        None
    }
}
