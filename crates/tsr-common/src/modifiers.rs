//! Declaration modifier flags.
//!
//! Bit assignments match the host compiler's `ModifierFlags`, so a value read
//! from the host can be emitted into the literal unchanged.

use bitflags::bitflags;

bitflags! {
    /// Declaration qualifiers (visibility, `readonly`, `static`, ...).
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const READONLY = 1 << 3;
        const OVERRIDE = 1 << 4;
        const EXPORT = 1 << 5;
        const ABSTRACT = 1 << 6;
        const AMBIENT = 1 << 7;
        const STATIC = 1 << 8;
        const ACCESSOR = 1 << 9;
        const ASYNC = 1 << 10;
        const DEFAULT = 1 << 11;
        const CONST = 1 << 12;
        const IN = 1 << 13;
        const OUT = 1 << 14;
        const DECORATOR = 1 << 15;
        const DEPRECATED = 1 << 16;

        const ACCESSIBILITY = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        const PARAMETER_PROPERTY = Self::ACCESSIBILITY.bits() | Self::READONLY.bits() | Self::OVERRIDE.bits();
    }
}

impl ModifierFlags {
    /// Parse a modifier keyword (`"readonly"`, `"private"`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "public" => Self::PUBLIC,
            "private" => Self::PRIVATE,
            "protected" => Self::PROTECTED,
            "readonly" => Self::READONLY,
            "override" => Self::OVERRIDE,
            "export" => Self::EXPORT,
            "abstract" => Self::ABSTRACT,
            "declare" => Self::AMBIENT,
            "static" => Self::STATIC,
            "accessor" => Self::ACCESSOR,
            "async" => Self::ASYNC,
            "default" => Self::DEFAULT,
            "const" => Self::CONST,
            "in" => Self::IN,
            "out" => Self::OUT,
            _ => return None,
        })
    }
}
