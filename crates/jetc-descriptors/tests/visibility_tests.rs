use super::*;
use jetc_syntax::Modifiers;
use std::cmp::Ordering;

#[test]
fn test_visibility_partial_order() {
    use Visibility::*;
    assert_eq!(Private.compare(Public), Some(Ordering::Less));
    assert_eq!(Protected.compare(Public), Some(Ordering::Less));
    assert_eq!(Public.compare(Internal), Some(Ordering::Greater));
    assert_eq!(Private.compare(Protected), Some(Ordering::Less));
    assert_eq!(Protected.compare(Internal), None);
    assert_eq!(Local.compare(Public), None);
    assert_eq!(Inherited.compare(Inherited), Some(Ordering::Equal));
}

#[test]
fn test_visible_for_override() {
    assert!(Visibility::Public.is_visible_for_override());
    assert!(Visibility::Protected.is_visible_for_override());
    assert!(!Visibility::Private.is_visible_for_override());
    assert!(!Visibility::InvisibleFake.is_visible_for_override());
}

#[test]
fn test_from_modifiers() {
    assert_eq!(
        Visibility::from_modifiers(Modifiers::PRIVATE | Modifiers::OPEN),
        Some(Visibility::Private)
    );
    assert_eq!(Visibility::from_modifiers(Modifiers::OPEN), None);
    assert_eq!(
        Modality::from_modifiers(Modifiers::ABSTRACT | Modifiers::OVERRIDE),
        Some(Modality::Abstract)
    );
    assert_eq!(Modality::from_modifiers(Modifiers::empty()), None);
}

#[test]
fn test_modality_order() {
    assert!(Modality::Final < Modality::Open);
    assert!(Modality::Open < Modality::Abstract);
    assert_eq!(
        [Modality::Abstract, Modality::Open].into_iter().min(),
        Some(Modality::Open)
    );
}
