//! Declaration modifier flags.

use bitflags::bitflags;

bitflags! {
    /// Modifier keywords written on a declaration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const OPEN = 1 << 0;
        const ABSTRACT = 1 << 1;
        const FINAL = 1 << 2;
        const OVERRIDE = 1 << 3;
        const PRIVATE = 1 << 4;
        const PROTECTED = 1 << 5;
        const INTERNAL = 1 << 6;
        const PUBLIC = 1 << 7;
        const INNER = 1 << 8;
        const COMPANION = 1 << 9;
        const VARARG = 1 << 10;

        const VISIBILITY = Self::PRIVATE.bits()
            | Self::PROTECTED.bits()
            | Self::INTERNAL.bits()
            | Self::PUBLIC.bits();
        const MODALITY = Self::OPEN.bits() | Self::ABSTRACT.bits() | Self::FINAL.bits();
    }
}

impl Modifiers {
    #[inline]
    pub fn has_visibility(self) -> bool {
        self.intersects(Modifiers::VISIBILITY)
    }

    #[inline]
    pub fn has_modality(self) -> bool {
        self.intersects(Modifiers::MODALITY)
    }
}
