//! The reflected-type tree.
//!
//! Nodes are shared: every position whose host type has the same identity
//! holds the same `Rc`. A node is created as an empty *shell* and registered
//! in the identity cache before its children are reflected, then filled
//! exactly once. A recursive type therefore reaches its own shell and the
//! finished tree contains a genuine reference cycle.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use tsr_common::{Expr, ModifierFlags, TypeId};

/// Shared handle to a reflected node.
pub type TypeRef = Rc<ReflectedType>;

/// Stable numeric tag of each node kind, emitted as the literal's `kind`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeKind {
    Any = 1,
    String = 2,
    Number = 3,
    Boolean = 4,
    StringLiteral = 5,
    NumberLiteral = 6,
    TrueLiteral = 7,
    FalseLiteral = 8,
    Void = 9,
    Undefined = 10,
    Null = 11,
    Never = 12,
    Unknown = 13,
    /// A host type shape the reflector does not understand
    Unknown2 = 14,
    ESSymbol = 15,
    Function = 16,
    Tuple = 17,
    Union = 18,
    Reference = 19,
    Object = 20,
    Class = 21,
}

impl TypeKind {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// String and number literal kinds.
    pub const fn is_literal(self) -> bool {
        matches!(self, Self::StringLiteral | Self::NumberLiteral)
    }

    /// Members of the boolean family collapsed by union normalization.
    pub const fn is_boolean_like(self) -> bool {
        matches!(self, Self::Boolean | Self::TrueLiteral | Self::FalseLiteral)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named data member.
#[derive(Clone, Debug)]
pub struct Property {
    pub name: String,
    pub modifiers: ModifierFlags,
    pub ty: TypeRef,
    /// `() => <initializer>`
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub modifiers: ModifierFlags,
    pub ty: TypeRef,
    /// `() => <default value>`
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct Constructor {
    pub modifiers: ModifierFlags,
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, Debug)]
pub struct ClassData {
    pub name: String,
    /// Own data properties, declaration order
    pub properties: Vec<Property>,
    pub constructors: Vec<Constructor>,
    /// First declared base only
    pub extends: Option<TypeRef>,
}

/// Payload of a reflected node.
#[derive(Clone, Debug)]
pub enum TypeData {
    Any,
    String,
    Number,
    Boolean,
    StringLiteral(String),
    NumberLiteral(f64),
    TrueLiteral,
    FalseLiteral,
    Void,
    Undefined,
    Null,
    Never,
    Unknown,
    Unknown2,
    ESSymbol,
    Function,
    Tuple {
        element_types: Vec<TypeRef>,
    },
    Union {
        types: Vec<TypeRef>,
    },
    Reference {
        /// Identifier naming the referenced declaration
        name: Expr,
        arguments: Vec<TypeRef>,
    },
    Object {
        name: Option<String>,
        properties: Vec<Property>,
    },
    Class(ClassData),
}

impl TypeData {
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Any => TypeKind::Any,
            Self::String => TypeKind::String,
            Self::Number => TypeKind::Number,
            Self::Boolean => TypeKind::Boolean,
            Self::StringLiteral(_) => TypeKind::StringLiteral,
            Self::NumberLiteral(_) => TypeKind::NumberLiteral,
            Self::TrueLiteral => TypeKind::TrueLiteral,
            Self::FalseLiteral => TypeKind::FalseLiteral,
            Self::Void => TypeKind::Void,
            Self::Undefined => TypeKind::Undefined,
            Self::Null => TypeKind::Null,
            Self::Never => TypeKind::Never,
            Self::Unknown => TypeKind::Unknown,
            Self::Unknown2 => TypeKind::Unknown2,
            Self::ESSymbol => TypeKind::ESSymbol,
            Self::Function => TypeKind::Function,
            Self::Tuple { .. } => TypeKind::Tuple,
            Self::Union { .. } => TypeKind::Union,
            Self::Reference { .. } => TypeKind::Reference,
            Self::Object { .. } => TypeKind::Object,
            Self::Class(_) => TypeKind::Class,
        }
    }
}

/// A node of the reflected-type tree.
pub struct ReflectedType {
    id: TypeId,
    data: OnceCell<TypeData>,
}

impl ReflectedType {
    /// A finished node.
    pub fn new(id: TypeId, data: TypeData) -> TypeRef {
        Rc::new(Self {
            id,
            data: OnceCell::from(data),
        })
    }

    /// An unfilled node, to be registered before its children are reflected.
    pub(crate) fn shell(id: TypeId) -> TypeRef {
        Rc::new(Self {
            id,
            data: OnceCell::new(),
        })
    }

    /// Fill a shell. Returns `false` if it was already filled.
    pub(crate) fn fill(&self, data: TypeData) -> bool {
        self.data.set(data).is_ok()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// `None` while the node is still being reflected, or if its reflection
    /// was aborted.
    pub fn data(&self) -> Option<&TypeData> {
        self.data.get()
    }

    pub fn kind(&self) -> Option<TypeKind> {
        self.data().map(TypeData::kind)
    }

    pub fn is_complete(&self) -> bool {
        self.data.get().is_some()
    }

    /// Properties of an object or class node.
    pub fn properties(&self) -> &[Property] {
        match self.data() {
            Some(TypeData::Object { properties, .. }) => properties,
            Some(TypeData::Class(class)) => &class.properties,
            _ => &[],
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|p| p.name == name)
    }

    /// Members of a union node.
    pub fn union_types(&self) -> &[TypeRef] {
        match self.data() {
            Some(TypeData::Union { types }) => types,
            _ => &[],
        }
    }
}

// Children are printed by id only; the tree may be cyclic.
impl fmt::Debug for ReflectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{kind}#{}", self.id),
            None => write!(f, "<shell>#{}", self.id),
        }
    }
}
