//! The queries the reflector makes of the host type checker.
//!
//! Flag values mirror the host compiler's bit assignments so a host can pass
//! its own flag words through unchanged.

use bitflags::bitflags;
use tsr_common::{Expr, ModifierFlags, TypeId};

bitflags! {
    /// Primary classification of a host type.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const ANY = 1 << 0;
        const UNKNOWN = 1 << 1;
        const STRING = 1 << 2;
        const NUMBER = 1 << 3;
        const BOOLEAN = 1 << 4;
        const ENUM = 1 << 5;
        const BIG_INT = 1 << 6;
        const STRING_LITERAL = 1 << 7;
        const NUMBER_LITERAL = 1 << 8;
        const BOOLEAN_LITERAL = 1 << 9;
        const ENUM_LITERAL = 1 << 10;
        const BIG_INT_LITERAL = 1 << 11;
        const ES_SYMBOL = 1 << 12;
        const UNIQUE_ES_SYMBOL = 1 << 13;
        const VOID = 1 << 14;
        const UNDEFINED = 1 << 15;
        const NULL = 1 << 16;
        const NEVER = 1 << 17;
        const TYPE_PARAMETER = 1 << 18;
        const OBJECT = 1 << 19;
        const UNION = 1 << 20;
        const INTERSECTION = 1 << 21;
        const INDEX = 1 << 22;
        const INDEXED_ACCESS = 1 << 23;
        const CONDITIONAL = 1 << 24;
        const SUBSTITUTION = 1 << 25;
        const NON_PRIMITIVE = 1 << 26;
        const TEMPLATE_LITERAL = 1 << 27;
        const STRING_MAPPING = 1 << 28;

        /// Kinds the reflector never stores in its identity cache.
        const UNCACHED = Self::STRING_LITERAL.bits() | Self::NUMBER_LITERAL.bits();
    }
}

bitflags! {
    /// Sub-classification of object types.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const CLASS = 1 << 0;
        const INTERFACE = 1 << 1;
        /// Generic instantiation (`Array<T>`, `Box<number>`, tuples)
        const REFERENCE = 1 << 2;
        const TUPLE = 1 << 3;
        const ANONYMOUS = 1 << 4;
        const MAPPED = 1 << 5;
        const INSTANTIATED = 1 << 6;
        const OBJECT_LITERAL = 1 << 7;
    }
}

bitflags! {
    /// What a host symbol declares.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u32 {
        const FUNCTION_SCOPED_VARIABLE = 1 << 0;
        const BLOCK_SCOPED_VARIABLE = 1 << 1;
        const PROPERTY = 1 << 2;
        const ENUM_MEMBER = 1 << 3;
        const FUNCTION = 1 << 4;
        const CLASS = 1 << 5;
        const INTERFACE = 1 << 6;
        const CONST_ENUM = 1 << 7;
        const REGULAR_ENUM = 1 << 8;
        const VALUE_MODULE = 1 << 9;
        const NAMESPACE_MODULE = 1 << 10;
        const TYPE_LITERAL = 1 << 11;
        const OBJECT_LITERAL = 1 << 12;
        const METHOD = 1 << 13;
        const CONSTRUCTOR = 1 << 14;
        const GET_ACCESSOR = 1 << 15;
        const SET_ACCESSOR = 1 << 16;
        const SIGNATURE = 1 << 17;
        const TYPE_PARAMETER = 1 << 18;
        const TYPE_ALIAS = 1 << 19;
        const EXPORT_VALUE = 1 << 20;
        const ALIAS = 1 << 21;

        const ENUM = Self::CONST_ENUM.bits() | Self::REGULAR_ENUM.bits();
        const ACCESSOR = Self::GET_ACCESSOR.bits() | Self::SET_ACCESSOR.bits();
    }
}

/// One construct signature of a class.
#[derive(Clone, Debug)]
pub struct ConstructSignature<S> {
    pub modifiers: ModifierFlags,
    /// Parameter symbols in declaration order
    pub parameters: Vec<S>,
}

/// Read-only view of a checked host program.
///
/// `Type` and `Symbol` are the host's own handles. They are cloned freely, so
/// they should be cheap (ids, indices or shared pointers).
pub trait TypeHost {
    type Type: Clone;
    type Symbol: Clone;

    // -- types --

    /// Identity of `ty`, stable for the lifetime of the host.
    fn type_id(&self, ty: &Self::Type) -> TypeId;
    fn type_flags(&self, ty: &Self::Type) -> TypeFlags;
    fn object_flags(&self, ty: &Self::Type) -> ObjectFlags;

    fn string_literal_value(&self, ty: &Self::Type) -> Option<String>;
    fn number_literal_value(&self, ty: &Self::Type) -> Option<f64>;
    /// Intrinsic value of a `true`/`false` literal type.
    fn boolean_literal_value(&self, ty: &Self::Type) -> Option<bool>;

    fn union_members(&self, ty: &Self::Type) -> Vec<Self::Type>;
    /// Type arguments of a generic reference, in order.
    fn type_arguments(&self, ty: &Self::Type) -> Vec<Self::Type>;
    /// The generic target of a reference (`Array<T>` for `Array<number>`).
    fn reference_target(&self, ty: &Self::Type) -> Option<Self::Type>;
    fn symbol_of_type(&self, ty: &Self::Type) -> Option<Self::Symbol>;
    fn call_signature_count(&self, ty: &Self::Type) -> usize;
    /// All properties, inherited ones included, in enumeration order.
    fn properties_of_type(&self, ty: &Self::Type) -> Vec<Self::Symbol>;
    /// Members declared directly on a class or interface.
    fn declared_properties(&self, ty: &Self::Type) -> Vec<Self::Symbol>;
    fn base_types(&self, ty: &Self::Type) -> Vec<Self::Type>;

    /// Name the host would print for `ty` in type-reference position, if it
    /// prints it as a type reference at all.
    fn type_reference_name(&self, ty: &Self::Type) -> Option<String>;
    /// Display form used in diagnostics.
    fn type_to_string(&self, ty: &Self::Type) -> String;

    // -- symbols --

    fn symbol_name(&self, symbol: &Self::Symbol) -> String;
    fn symbol_flags(&self, symbol: &Self::Symbol) -> SymbolFlags;
    fn has_value_declaration(&self, symbol: &Self::Symbol) -> bool;
    /// Declared type of a property or parameter symbol.
    fn type_of_symbol(&self, symbol: &Self::Symbol) -> Option<Self::Type>;
    /// Combined modifiers of the symbol's first declaration.
    fn modifier_flags(&self, symbol: &Self::Symbol) -> ModifierFlags;
    /// Initializer of a property declaration or parameter, if written.
    fn initializer(&self, symbol: &Self::Symbol) -> Option<Expr>;
    /// Construct signatures of a class symbol.
    fn construct_signatures(&self, class: &Self::Symbol) -> Vec<ConstructSignature<Self::Symbol>>;
    /// Target of an alias (import) symbol.
    fn aliased_symbol(&self, symbol: &Self::Symbol) -> Option<Self::Symbol>;

    /// Property name as written at the declaration.
    fn property_name(&self, symbol: &Self::Symbol) -> String {
        self.symbol_name(symbol)
    }
}
