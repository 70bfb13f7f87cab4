//! An in-memory [`TypeHost`] described by JSON.
//!
//! A fixture lists types by id and symbols by key. Symbol keys are free-form;
//! the symbol's name defaults to the part after the last `.`, so
//! `"Recursive.prop"` declares a symbol named `prop`.
//!
//! ```json
//! {
//!   "types": [
//!     { "id": 10, "kind": "class", "symbol": "Recursive",
//!       "properties": ["Recursive.prop"] }
//!   ],
//!   "symbols": {
//!     "Recursive": { "kind": "class" },
//!     "Recursive.prop": { "kind": "property", "type": 10 }
//!   }
//! }
//! ```
//!
//! Every id and key a fixture mentions is checked when it is loaded, so the
//! host never has to guess.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tsr_common::{Expr, ModifierFlags, TypeId};

use crate::host::{ConstructSignature, ObjectFlags, SymbolFlags, TypeFlags, TypeHost};

/// Display nesting beyond this prints as `...`.
const MAX_DISPLAY_DEPTH: u32 = 8;

// =============================================================================
// Serialized form
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default)]
    pub types: Vec<FixtureType>,
    #[serde(default)]
    pub symbols: IndexMap<String, FixtureSymbol>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureType {
    pub id: TypeId,
    #[serde(flatten)]
    pub shape: TypeShape,
    /// Key of the type's symbol
    #[serde(default)]
    pub symbol: Option<String>,
    /// Overrides the derived display form
    #[serde(default)]
    pub display: Option<String>,
    /// Overrides the name printed in type-reference position
    #[serde(default)]
    pub reference_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TypeShape {
    Any,
    Unknown,
    String,
    Number,
    Boolean,
    Void,
    Undefined,
    Null,
    Never,
    EsSymbol,
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    Union {
        types: Vec<TypeId>,
    },
    Intersection {
        types: Vec<TypeId>,
    },
    TypeParameter,
    /// Anonymous object type or non-generic interface instance
    Object {
        #[serde(default)]
        anonymous: bool,
        #[serde(default)]
        call_signatures: usize,
        #[serde(default)]
        properties: Vec<String>,
    },
    /// Declared class or interface type
    Class {
        #[serde(default)]
        interface: bool,
        #[serde(default)]
        properties: Vec<String>,
        #[serde(default)]
        bases: Vec<TypeId>,
    },
    /// Instantiation of a generic target
    Reference {
        target: TypeId,
        #[serde(default)]
        arguments: Vec<TypeId>,
    },
    /// Generic target of tuple references
    TupleTarget,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSymbol {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: SymbolKind,
    #[serde(rename = "type", default)]
    pub ty: Option<TypeId>,
    /// Modifier keywords (`"readonly"`, `"private"`, ...)
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Initializer source text
    #[serde(default)]
    pub initializer: Option<String>,
    /// Overrides the per-kind default
    #[serde(default)]
    pub value_declaration: Option<bool>,
    /// Key of the symbol an alias resolves to
    #[serde(default)]
    pub alias_of: Option<String>,
    /// Constructors of a class. A class without any gets one implicit
    /// parameterless constructor.
    #[serde(default)]
    pub constructors: Vec<FixtureConstructor>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Property,
    Method,
    Accessor,
    Parameter,
    Class,
    Interface,
    TypeLiteral,
    Enum,
    Function,
    Alias,
    TypeAlias,
}

impl SymbolKind {
    fn flags(self) -> SymbolFlags {
        match self {
            Self::Property => SymbolFlags::PROPERTY,
            Self::Method => SymbolFlags::METHOD,
            Self::Accessor => SymbolFlags::GET_ACCESSOR,
            Self::Parameter => SymbolFlags::FUNCTION_SCOPED_VARIABLE,
            Self::Class => SymbolFlags::CLASS,
            Self::Interface => SymbolFlags::INTERFACE,
            Self::TypeLiteral => SymbolFlags::TYPE_LITERAL,
            Self::Enum => SymbolFlags::REGULAR_ENUM,
            Self::Function => SymbolFlags::FUNCTION,
            Self::Alias => SymbolFlags::ALIAS,
            Self::TypeAlias => SymbolFlags::TYPE_ALIAS,
        }
    }

    fn has_value_declaration(self) -> bool {
        !matches!(
            self,
            Self::Interface | Self::TypeLiteral | Self::Alias | Self::TypeAlias
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureConstructor {
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Parameter symbol keys, in order
    #[serde(default)]
    pub parameters: Vec<String>,
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("type {id} is declared twice")]
    DuplicateType { id: TypeId },

    #[error("{context} refers to unknown type {id}")]
    UnknownType { id: TypeId, context: String },

    #[error("{context} refers to unknown symbol `{key}`")]
    UnknownSymbol { key: String, context: String },

    #[error("symbol `{key}` has unknown modifier `{keyword}`")]
    UnknownModifier { key: String, keyword: String },

    #[error("type {id} inherits from itself")]
    CyclicBases { id: TypeId },
}

// =============================================================================
// Host
// =============================================================================

/// Handle to a fixture symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

struct SymbolEntry {
    key: String,
    name: String,
    symbol: FixtureSymbol,
    modifiers: ModifierFlags,
}

/// A [`TypeHost`] over a loaded [`Fixture`].
pub struct FixtureHost {
    types: FxHashMap<TypeId, FixtureType>,
    symbols: Vec<SymbolEntry>,
    symbol_index: FxHashMap<String, SymbolId>,
}

impl FixtureHost {
    pub fn from_json_str(text: &str) -> Result<Self, FixtureError> {
        Self::from_fixture(serde_json::from_str(text)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, FixtureError> {
        Self::from_fixture(serde_json::from_value(value)?)
    }

    pub fn from_fixture(fixture: Fixture) -> Result<Self, FixtureError> {
        let mut symbols = Vec::with_capacity(fixture.symbols.len());
        let mut symbol_index = FxHashMap::default();
        for (i, (key, symbol)) in fixture.symbols.into_iter().enumerate() {
            let mut modifiers = ModifierFlags::empty();
            for keyword in &symbol.modifiers {
                modifiers |= parse_modifier(&key, keyword)?;
            }
            let name = symbol
                .name
                .clone()
                .unwrap_or_else(|| key.rsplit('.').next().unwrap_or(&key).to_owned());
            symbol_index.insert(key.clone(), SymbolId(i as u32));
            symbols.push(SymbolEntry {
                key,
                name,
                symbol,
                modifiers,
            });
        }

        let mut types = FxHashMap::default();
        for ty in fixture.types {
            let id = ty.id;
            if types.insert(id, ty).is_some() {
                return Err(FixtureError::DuplicateType { id });
            }
        }

        let host = Self {
            types,
            symbols,
            symbol_index,
        };
        host.validate()?;
        Ok(host)
    }

    fn validate(&self) -> Result<(), FixtureError> {
        let none: &[String] = &[];
        for ty in self.types.values() {
            let context = format!("type {}", ty.id);
            if let Some(key) = &ty.symbol {
                self.check_symbol(key, &context)?;
            }
            let (type_refs, symbol_refs): (Vec<TypeId>, &[String]) = match &ty.shape {
                TypeShape::Union { types } | TypeShape::Intersection { types } => {
                    (types.clone(), none)
                }
                TypeShape::Object { properties, .. } => (Vec::new(), properties),
                TypeShape::Class {
                    properties, bases, ..
                } => (bases.clone(), properties),
                TypeShape::Reference { target, arguments } => {
                    let mut refs = vec![*target];
                    refs.extend(arguments);
                    (refs, none)
                }
                _ => (Vec::new(), none),
            };
            for id in type_refs {
                self.check_type(id, &context)?;
            }
            for key in symbol_refs {
                self.check_symbol(key, &context)?;
            }
        }

        let mut marks = FxHashMap::default();
        for id in self.types.keys() {
            self.check_inheritance(*id, &mut marks)?;
        }

        for entry in &self.symbols {
            let context = format!("symbol `{}`", entry.key);
            if let Some(id) = entry.symbol.ty {
                self.check_type(id, &context)?;
            }
            if let Some(key) = &entry.symbol.alias_of {
                self.check_symbol(key, &context)?;
            }
            for constructor in &entry.symbol.constructors {
                for key in &constructor.parameters {
                    self.check_symbol(key, &context)?;
                }
                for keyword in &constructor.modifiers {
                    parse_modifier(&entry.key, keyword)?;
                }
            }
        }
        Ok(())
    }

    /// Base lists and reference targets must not loop back. `marks` holds
    /// `false` while a type's chain is being walked and `true` once it is done.
    fn check_inheritance(
        &self,
        id: TypeId,
        marks: &mut FxHashMap<TypeId, bool>,
    ) -> Result<(), FixtureError> {
        match marks.get(&id) {
            Some(true) => return Ok(()),
            Some(false) => return Err(FixtureError::CyclicBases { id }),
            None => {}
        }
        marks.insert(id, false);
        match self.shape(id) {
            Some(TypeShape::Class { bases, .. }) => {
                for base in bases {
                    self.check_inheritance(*base, marks)?;
                }
            }
            Some(TypeShape::Reference { target, .. }) => self.check_inheritance(*target, marks)?,
            _ => {}
        }
        marks.insert(id, true);
        Ok(())
    }

    fn check_type(&self, id: TypeId, context: &str) -> Result<(), FixtureError> {
        if self.types.contains_key(&id) {
            Ok(())
        } else {
            Err(FixtureError::UnknownType {
                id,
                context: context.to_owned(),
            })
        }
    }

    fn check_symbol(&self, key: &str, context: &str) -> Result<(), FixtureError> {
        if self.symbol_index.contains_key(key) {
            Ok(())
        } else {
            Err(FixtureError::UnknownSymbol {
                key: key.to_owned(),
                context: context.to_owned(),
            })
        }
    }

    /// Handle of the symbol declared under `key`.
    pub fn symbol(&self, key: &str) -> Option<SymbolId> {
        self.symbol_index.get(key).copied()
    }

    pub fn symbol_key(&self, symbol: SymbolId) -> &str {
        self.entry(symbol).map_or("", |e| e.key.as_str())
    }

    /// The class or interface type declared by the symbol named `name`.
    pub fn declared_type(&self, name: &str) -> Option<TypeId> {
        let mut found: Vec<TypeId> = self
            .types
            .values()
            .filter(|ty| matches!(ty.shape, TypeShape::Class { .. }))
            .filter(|ty| {
                ty.symbol
                    .as_deref()
                    .and_then(|key| self.symbol(key))
                    .and_then(|s| self.entry(s))
                    .is_some_and(|e| e.name == name)
            })
            .map(|ty| ty.id)
            .collect();
        found.sort();
        found.first().copied()
    }

    /// Ids of every declared class, ascending.
    pub fn classes(&self) -> Vec<TypeId> {
        let mut ids: Vec<TypeId> = self
            .types
            .values()
            .filter(|ty| matches!(ty.shape, TypeShape::Class { interface: false, .. }))
            .map(|ty| ty.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn contains_type(&self, id: TypeId) -> bool {
        self.types.contains_key(&id)
    }

    fn ty(&self, id: TypeId) -> Option<&FixtureType> {
        self.types.get(&id)
    }

    fn shape(&self, id: TypeId) -> Option<&TypeShape> {
        self.ty(id).map(|ty| &ty.shape)
    }

    fn entry(&self, symbol: SymbolId) -> Option<&SymbolEntry> {
        self.symbols.get(symbol.0 as usize)
    }

    fn symbols_of(&self, keys: &[String]) -> Vec<SymbolId> {
        keys.iter().filter_map(|key| self.symbol(key)).collect()
    }

    fn display(&self, id: TypeId, depth: u32) -> String {
        let Some(ty) = self.ty(id) else {
            return format!("<missing {id}>");
        };
        if let Some(display) = &ty.display {
            return display.clone();
        }
        if depth > MAX_DISPLAY_DEPTH {
            return "...".to_owned();
        }
        let named = || self.symbol_of_type(&id).map(|s| self.symbol_name(&s));
        let join = |types: &[TypeId], sep: &str| {
            types
                .iter()
                .map(|t| self.display(*t, depth + 1))
                .collect::<Vec<_>>()
                .join(sep)
        };
        match &ty.shape {
            TypeShape::Any => "any".into(),
            TypeShape::Unknown => "unknown".into(),
            TypeShape::String => "string".into(),
            TypeShape::Number => "number".into(),
            TypeShape::Boolean => "boolean".into(),
            TypeShape::Void => "void".into(),
            TypeShape::Undefined => "undefined".into(),
            TypeShape::Null => "null".into(),
            TypeShape::Never => "never".into(),
            TypeShape::EsSymbol => "symbol".into(),
            TypeShape::StringLiteral { value } => serde_json::Value::from(value.as_str()).to_string(),
            TypeShape::NumberLiteral { value } => value.to_string(),
            TypeShape::BooleanLiteral { value } => value.to_string(),
            TypeShape::Union { types } => join(types, " | "),
            TypeShape::Intersection { types } => join(types, " & "),
            TypeShape::TypeParameter => named().unwrap_or_else(|| "T".into()),
            TypeShape::Object { anonymous, .. } if *anonymous => "{ ... }".into(),
            TypeShape::Object { .. } | TypeShape::Class { .. } | TypeShape::TupleTarget => {
                named().unwrap_or_else(|| "{ ... }".into())
            }
            TypeShape::Reference { target, arguments } => {
                if matches!(self.shape(*target), Some(TypeShape::TupleTarget)) {
                    format!("[{}]", join(arguments, ", "))
                } else if arguments.is_empty() {
                    self.display(*target, depth + 1)
                } else {
                    format!("{}<{}>", self.display(*target, depth + 1), join(arguments, ", "))
                }
            }
        }
    }
}

fn parse_modifier(key: &str, keyword: &str) -> Result<ModifierFlags, FixtureError> {
    ModifierFlags::from_keyword(keyword).ok_or_else(|| FixtureError::UnknownModifier {
        key: key.to_owned(),
        keyword: keyword.to_owned(),
    })
}

impl TypeHost for FixtureHost {
    type Type = TypeId;
    type Symbol = SymbolId;

    fn type_id(&self, ty: &TypeId) -> TypeId {
        *ty
    }

    fn type_flags(&self, ty: &TypeId) -> TypeFlags {
        let Some(shape) = self.shape(*ty) else {
            return TypeFlags::empty();
        };
        match shape {
            TypeShape::Any => TypeFlags::ANY,
            TypeShape::Unknown => TypeFlags::UNKNOWN,
            TypeShape::String => TypeFlags::STRING,
            TypeShape::Number => TypeFlags::NUMBER,
            TypeShape::Boolean => TypeFlags::BOOLEAN,
            TypeShape::Void => TypeFlags::VOID,
            TypeShape::Undefined => TypeFlags::UNDEFINED,
            TypeShape::Null => TypeFlags::NULL,
            TypeShape::Never => TypeFlags::NEVER,
            TypeShape::EsSymbol => TypeFlags::ES_SYMBOL,
            TypeShape::StringLiteral { .. } => TypeFlags::STRING_LITERAL,
            TypeShape::NumberLiteral { .. } => TypeFlags::NUMBER_LITERAL,
            TypeShape::BooleanLiteral { .. } => TypeFlags::BOOLEAN_LITERAL,
            TypeShape::Union { .. } => TypeFlags::UNION,
            TypeShape::Intersection { .. } => TypeFlags::INTERSECTION,
            TypeShape::TypeParameter => TypeFlags::TYPE_PARAMETER,
            TypeShape::Object { .. }
            | TypeShape::Class { .. }
            | TypeShape::Reference { .. }
            | TypeShape::TupleTarget => TypeFlags::OBJECT,
        }
    }

    fn object_flags(&self, ty: &TypeId) -> ObjectFlags {
        match self.shape(*ty) {
            Some(TypeShape::Object {
                anonymous: true, ..
            }) => ObjectFlags::ANONYMOUS,
            Some(TypeShape::Class {
                interface: true, ..
            }) => ObjectFlags::INTERFACE,
            Some(TypeShape::Class { .. }) => ObjectFlags::CLASS,
            Some(TypeShape::Reference { .. }) => ObjectFlags::REFERENCE,
            Some(TypeShape::TupleTarget) => ObjectFlags::TUPLE,
            _ => ObjectFlags::empty(),
        }
    }

    fn string_literal_value(&self, ty: &TypeId) -> Option<String> {
        match self.shape(*ty) {
            Some(TypeShape::StringLiteral { value }) => Some(value.clone()),
            _ => None,
        }
    }

    fn number_literal_value(&self, ty: &TypeId) -> Option<f64> {
        match self.shape(*ty) {
            Some(TypeShape::NumberLiteral { value }) => Some(*value),
            _ => None,
        }
    }

    fn boolean_literal_value(&self, ty: &TypeId) -> Option<bool> {
        match self.shape(*ty) {
            Some(TypeShape::BooleanLiteral { value }) => Some(*value),
            _ => None,
        }
    }

    fn union_members(&self, ty: &TypeId) -> Vec<TypeId> {
        match self.shape(*ty) {
            Some(TypeShape::Union { types } | TypeShape::Intersection { types }) => types.clone(),
            _ => Vec::new(),
        }
    }

    fn type_arguments(&self, ty: &TypeId) -> Vec<TypeId> {
        match self.shape(*ty) {
            Some(TypeShape::Reference { arguments, .. }) => arguments.clone(),
            _ => Vec::new(),
        }
    }

    fn reference_target(&self, ty: &TypeId) -> Option<TypeId> {
        match self.shape(*ty) {
            Some(TypeShape::Reference { target, .. }) => Some(*target),
            _ => None,
        }
    }

    fn symbol_of_type(&self, ty: &TypeId) -> Option<SymbolId> {
        let fixture = self.ty(*ty)?;
        match (&fixture.symbol, &fixture.shape) {
            (Some(key), _) => self.symbol(key),
            (None, TypeShape::Reference { target, .. }) => self.symbol_of_type(target),
            (None, _) => None,
        }
    }

    fn call_signature_count(&self, ty: &TypeId) -> usize {
        match self.shape(*ty) {
            Some(TypeShape::Object {
                call_signatures, ..
            }) => *call_signatures,
            _ => 0,
        }
    }

    fn properties_of_type(&self, ty: &TypeId) -> Vec<SymbolId> {
        match self.shape(*ty) {
            Some(TypeShape::Object { properties, .. }) => self.symbols_of(properties),
            Some(TypeShape::Class {
                properties, bases, ..
            }) => {
                let mut out = self.symbols_of(properties);
                for base in bases {
                    for inherited in self.properties_of_type(base) {
                        let name = self.symbol_name(&inherited);
                        if !out.iter().any(|s| self.symbol_name(s) == name) {
                            out.push(inherited);
                        }
                    }
                }
                out
            }
            Some(TypeShape::Reference { target, .. }) => self.properties_of_type(target),
            _ => Vec::new(),
        }
    }

    fn declared_properties(&self, ty: &TypeId) -> Vec<SymbolId> {
        match self.shape(*ty) {
            Some(TypeShape::Object { properties, .. } | TypeShape::Class { properties, .. }) => {
                self.symbols_of(properties)
            }
            _ => Vec::new(),
        }
    }

    fn base_types(&self, ty: &TypeId) -> Vec<TypeId> {
        match self.shape(*ty) {
            Some(TypeShape::Class { bases, .. }) => bases.clone(),
            _ => Vec::new(),
        }
    }

    fn type_reference_name(&self, ty: &TypeId) -> Option<String> {
        let fixture = self.ty(*ty)?;
        if let Some(name) = &fixture.reference_name {
            return Some(name.clone());
        }
        match fixture.shape {
            TypeShape::Class { .. } | TypeShape::Reference { .. } => {
                self.symbol_of_type(ty).map(|s| self.symbol_name(&s))
            }
            _ => None,
        }
    }

    fn type_to_string(&self, ty: &TypeId) -> String {
        self.display(*ty, 0)
    }

    fn symbol_name(&self, symbol: &SymbolId) -> String {
        self.entry(*symbol).map(|e| e.name.clone()).unwrap_or_default()
    }

    fn symbol_flags(&self, symbol: &SymbolId) -> SymbolFlags {
        self.entry(*symbol)
            .map_or(SymbolFlags::empty(), |e| e.symbol.kind.flags())
    }

    fn has_value_declaration(&self, symbol: &SymbolId) -> bool {
        self.entry(*symbol).is_some_and(|e| {
            e.symbol
                .value_declaration
                .unwrap_or_else(|| e.symbol.kind.has_value_declaration())
        })
    }

    fn type_of_symbol(&self, symbol: &SymbolId) -> Option<TypeId> {
        self.entry(*symbol).and_then(|e| e.symbol.ty)
    }

    fn modifier_flags(&self, symbol: &SymbolId) -> ModifierFlags {
        self.entry(*symbol).map_or(ModifierFlags::empty(), |e| e.modifiers)
    }

    fn initializer(&self, symbol: &SymbolId) -> Option<Expr> {
        self.entry(*symbol)
            .and_then(|e| e.symbol.initializer.as_deref())
            .map(Expr::source)
    }

    fn construct_signatures(&self, class: &SymbolId) -> Vec<ConstructSignature<SymbolId>> {
        let Some(entry) = self.entry(*class) else {
            return Vec::new();
        };
        if entry.symbol.kind != SymbolKind::Class {
            return Vec::new();
        }
        if entry.symbol.constructors.is_empty() {
            return vec![ConstructSignature {
                modifiers: ModifierFlags::empty(),
                parameters: Vec::new(),
            }];
        }
        entry
            .symbol
            .constructors
            .iter()
            .map(|constructor| ConstructSignature {
                modifiers: constructor
                    .modifiers
                    .iter()
                    .filter_map(|k| ModifierFlags::from_keyword(k))
                    .fold(ModifierFlags::empty(), |acc, m| acc | m),
                parameters: self.symbols_of(&constructor.parameters),
            })
            .collect()
    }

    fn aliased_symbol(&self, symbol: &SymbolId) -> Option<SymbolId> {
        self.entry(*symbol)
            .and_then(|e| e.symbol.alias_of.as_deref())
            .and_then(|key| self.symbol(key))
    }
}
