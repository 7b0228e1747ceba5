//! Visibility, modality and callable member kinds.

use std::cmp::Ordering;

use jetc_syntax::Modifiers;
use serde::Serialize;

/// Declaration visibility.
///
/// `Local` is fixed for descriptors declared inside bodies (local variables,
/// local functions, lambdas). `Inherited` marks a fake override whose
/// visibility has not been inferred yet; `InvisibleFake` a fake override of
/// members that are all invisible from the current class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    Private,
    Protected,
    Internal,
    Public,
    Local,
    Inherited,
    InvisibleFake,
}

impl Visibility {
    /// Partial order on visibilities: how widely a declaration is visible.
    ///
    /// `Protected` and `Internal` are incomparable, as are the special
    /// `Local`, `Inherited` and `InvisibleFake` values with anything else.
    pub fn compare(self, other: Visibility) -> Option<Ordering> {
        use Visibility::*;
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self, other) {
            (Private, Protected | Internal | Public) => Some(Ordering::Less),
            (Protected | Internal | Public, Private) => Some(Ordering::Greater),
            (Protected | Internal, Public) => Some(Ordering::Less),
            (Public, Protected | Internal) => Some(Ordering::Greater),
            _ => None,
        }
    }

    /// Rank used when a total order is needed (most restrictive first).
    pub fn restrictiveness_rank(self) -> u8 {
        match self {
            Visibility::Private => 0,
            Visibility::Protected => 1,
            Visibility::Internal => 2,
            Visibility::Public => 3,
            Visibility::Local | Visibility::Inherited | Visibility::InvisibleFake => 0,
        }
    }

    /// Whether a member with this visibility can be overridden in a subclass.
    pub fn is_visible_for_override(self) -> bool {
        !matches!(
            self,
            Visibility::Private | Visibility::Local | Visibility::InvisibleFake
        )
    }

    pub fn from_modifiers(modifiers: Modifiers) -> Option<Visibility> {
        if modifiers.contains(Modifiers::PRIVATE) {
            Some(Visibility::Private)
        } else if modifiers.contains(Modifiers::PROTECTED) {
            Some(Visibility::Protected)
        } else if modifiers.contains(Modifiers::INTERNAL) {
            Some(Visibility::Internal)
        } else if modifiers.contains(Modifiers::PUBLIC) {
            Some(Visibility::Public)
        } else {
            None
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
            Visibility::Local => "local",
            Visibility::Inherited => "inherited",
            Visibility::InvisibleFake => "invisible_fake",
        }
    }
}

/// Class and member modality, ordered `Final < Open < Abstract`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Modality {
    Final,
    Open,
    Abstract,
}

impl Modality {
    pub fn from_modifiers(modifiers: Modifiers) -> Option<Modality> {
        if modifiers.contains(Modifiers::ABSTRACT) {
            Some(Modality::Abstract)
        } else if modifiers.contains(Modifiers::OPEN) {
            Some(Modality::Open)
        } else if modifiers.contains(Modifiers::FINAL) {
            Some(Modality::Final)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_overridable(self) -> bool {
        self != Modality::Final
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Modality::Final => "final",
            Modality::Open => "open",
            Modality::Abstract => "abstract",
        }
    }
}

/// How a callable member came to exist in its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CallableKind {
    /// Written in source.
    Declaration,
    /// Inherited and not overridden; owned by the inheriting class.
    FakeOverride,
    /// Generated by the compiler (builtins, data-class members).
    Synthesized,
}
