//! Reflected-type trees to literal trees.
//!
//! Generation runs in three steps:
//!
//! 1. Build literal *data* (a [`Value`] graph) from the reflected tree. The
//!    data keeps the sharing of the reflected tree: a node reached twice is
//!    the same data object, so a recursive type produces a cyclic graph.
//! 2. Decycle the data, turning repeated objects into `{ $ref }` tokens.
//! 3. Convert the acyclic data into [`LiteralNode`]s.
//!
//! Verbatim expressions (initializers, reference names) travel through the
//! data as `Exempt(Extern(expr))` so the codec copies them untouched and the
//! conversion emits them as written.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tsr_common::{DepthCounter, Expr, ModifierFlags, RecursionProfile, TypeId};
use tsr_cycle::{CodecOptions, Decycler, Value};
use tsr_reflect::{ClassData, Constructor, Property, TypeData, TypeKind, TypeRef};

use crate::error::LiteralError;
use crate::literal::LiteralNode;

/// Literal data: codec values whose opaque leaves are verbatim expressions.
pub type LiteralData = Value<Expr>;

type LiteralResult<T> = Result<T, LiteralError>;

/// Limits for one generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiteralOptions {
    pub max_depth: u32,
    pub codec: CodecOptions,
}

impl Default for LiteralOptions {
    fn default() -> Self {
        Self {
            max_depth: RecursionProfile::LiteralGeneration.max_depth(),
            codec: CodecOptions::default(),
        }
    }
}

/// Generate the literal for `ty` with default limits.
///
/// `modifiers` are the declaration modifiers of the position `ty` is
/// reflected for; they are omitted from the output when absent.
pub fn make_literal(ty: &TypeRef, modifiers: Option<ModifierFlags>) -> LiteralResult<LiteralNode> {
    LiteralGenerator::new(LiteralOptions::default()).make_literal(ty, modifiers)
}

/// Where a type appears: the modifiers and initializer of that position.
#[derive(Clone, Copy, Debug, Default)]
pub struct Position<'a> {
    pub modifiers: Option<ModifierFlags>,
    pub initializer: Option<&'a Expr>,
}

impl<'a> Position<'a> {
    fn of_property(property: &'a Property) -> Self {
        Self {
            modifiers: Some(property.modifiers),
            initializer: property.initializer.as_ref(),
        }
    }
}

/// Builds literal data for one generation.
///
/// Literal data is cached by `(type id, kind)`. For every kind but the string
/// and number literal kinds, the object is cached before its children are
/// built and a cache hit returns the same object, which is what lets the
/// codec see cycles. Literal kinds are recorded separately and always handed
/// out wrapped in [`Value::Exempt`], so they are copied rather than
/// back-referenced.
///
/// On a cache hit the cached object keeps the `modifiers` and `initializer`
/// of the position that built it.
pub struct LiteralGenerator {
    cache: FxHashMap<(TypeId, TypeKind), LiteralData>,
    scalars: FxHashMap<(TypeId, TypeKind), LiteralData>,
    depth: DepthCounter,
    codec: CodecOptions,
}

impl LiteralGenerator {
    pub fn new(options: LiteralOptions) -> Self {
        Self {
            cache: FxHashMap::default(),
            scalars: FxHashMap::default(),
            depth: DepthCounter::new(options.max_depth),
            codec: options.codec,
        }
    }

    /// Build, decycle and convert the literal for `ty`.
    pub fn make_literal(
        mut self,
        ty: &TypeRef,
        modifiers: Option<ModifierFlags>,
    ) -> LiteralResult<LiteralNode> {
        debug!(type_id = %ty.id(), "make_literal");
        let data = self.literal_data(
            ty,
            Position {
                modifiers,
                initializer: None,
            },
        )?;
        let acyclic = Decycler::new(self.codec).decycle(&data)?;
        to_literal_node(&acyclic, &mut self.depth)
    }

    /// Literal data for `ty` at `position`, sharing this generator's caches.
    pub fn literal_data(&mut self, ty: &TypeRef, position: Position<'_>) -> LiteralResult<LiteralData> {
        let data = ty.data().ok_or(LiteralError::IncompleteType { type_id: ty.id() })?;
        let kind = data.kind();
        let key = (ty.id(), kind);

        if kind.is_literal() {
            if let Some(hit) = self.scalars.get(&key) {
                trace!(type_id = %ty.id(), %kind, "literal: scalar hit");
                return Ok(Value::exempt(hit.clone()));
            }
        } else if let Some(hit) = self.cache.get(&key) {
            trace!(type_id = %ty.id(), %kind, "literal: cache hit");
            return Ok(hit.clone());
        }

        let literal = Value::object([
            ("kind", Value::Number(f64::from(kind.code()))),
            ("modifiers", modifiers_value(position.modifiers)),
            (
                "initializer",
                position.initializer.map_or(Value::Undefined, verbatim),
            ),
        ]);
        if kind.is_literal() {
            self.scalars.insert(key, literal.clone());
        } else {
            self.cache.insert(key, literal.clone());
        }

        if !self.depth.enter() {
            return Err(LiteralError::DepthExceeded {
                limit: self.depth.max_depth(),
            });
        }
        let result = self.fill(&literal, data);
        self.depth.leave();
        result?;

        if kind.is_literal() {
            Ok(Value::exempt(literal))
        } else {
            Ok(literal)
        }
    }

    fn fill(&mut self, literal: &LiteralData, data: &TypeData) -> LiteralResult<()> {
        match data {
            TypeData::Object { name, properties } => {
                let name = name.as_deref().map_or(Value::Undefined, Value::string);
                literal.insert("name", name);
                literal.insert("properties", self.properties(properties)?);
            }
            TypeData::Class(class) => self.fill_class(literal, class)?,
            TypeData::Tuple { element_types } => {
                literal.insert("elementTypes", self.list(element_types)?);
            }
            TypeData::Union { types } => {
                literal.insert("types", self.list(types)?);
            }
            TypeData::StringLiteral(value) => {
                literal.insert("value", Value::string(value.as_str()));
            }
            TypeData::NumberLiteral(value) => {
                literal.insert("value", Value::Number(*value));
            }
            TypeData::Reference { name, arguments } => {
                literal.insert("type", verbatim(name));
                literal.insert("arguments", self.list(arguments)?);
            }
            _ => {}
        }
        Ok(())
    }

    fn fill_class(&mut self, literal: &LiteralData, class: &ClassData) -> LiteralResult<()> {
        literal.insert("name", Value::string(class.name.as_str()));
        literal.insert("properties", self.properties(&class.properties)?);

        let mut constructors = Vec::with_capacity(class.constructors.len());
        for constructor in &class.constructors {
            constructors.push(self.constructor(constructor)?);
        }
        literal.insert("constructors", Value::array(constructors));

        if let Some(base) = &class.extends {
            let base = self.literal_data(base, Position::default())?;
            literal.insert("extends", base);
        }
        Ok(())
    }

    fn properties(&mut self, properties: &[Property]) -> LiteralResult<LiteralData> {
        let out = Value::empty_object();
        for property in properties {
            let value = self.literal_data(&property.ty, Position::of_property(property))?;
            out.insert(property.name.as_str(), value);
        }
        Ok(out)
    }

    fn constructor(&mut self, constructor: &Constructor) -> LiteralResult<LiteralData> {
        let mut parameters = Vec::with_capacity(constructor.parameters.len());
        for parameter in &constructor.parameters {
            let ty = self.literal_data(
                &parameter.ty,
                Position {
                    modifiers: None,
                    initializer: parameter.initializer.as_ref(),
                },
            )?;
            parameters.push(Value::object([
                ("name", Value::string(parameter.name.as_str())),
                ("modifiers", modifiers_value(Some(parameter.modifiers))),
                ("type", ty),
            ]));
        }
        Ok(Value::object([
            ("modifiers", modifiers_value(Some(constructor.modifiers))),
            ("parameters", Value::array(parameters)),
        ]))
    }

    fn list(&mut self, types: &[TypeRef]) -> LiteralResult<LiteralData> {
        let mut out = Vec::with_capacity(types.len());
        for ty in types {
            out.push(self.literal_data(ty, Position::default())?);
        }
        Ok(Value::array(out))
    }
}

fn modifiers_value(modifiers: Option<ModifierFlags>) -> LiteralData {
    modifiers.map_or(Value::Undefined, |m| Value::Number(f64::from(m.bits())))
}

fn verbatim(expr: &Expr) -> LiteralData {
    Value::exempt(Value::Extern(expr.clone()))
}

// =============================================================================
// Conversion
// =============================================================================

/// Convert acyclic literal data into a literal tree.
///
/// Objects drop `undefined` properties; arrays keep `undefined` elements.
/// Exempt values are unwrapped and converted as themselves, and opaque leaves
/// become [`LiteralNode::Verbatim`].
pub fn to_literal_node(value: &LiteralData, depth: &mut DepthCounter) -> LiteralResult<LiteralNode> {
    use tsr_cycle::Primitive;

    let node = match value {
        Value::Undefined => LiteralNode::Undefined,
        Value::Null => LiteralNode::Null,
        Value::Bool(b) | Value::Boxed(Primitive::Bool(b)) => LiteralNode::Boolean(*b),
        Value::Number(n) | Value::Boxed(Primitive::Number(n)) => LiteralNode::Number(*n),
        Value::String(s) | Value::Boxed(Primitive::String(s)) => LiteralNode::String(s.clone()),
        Value::BigInt(digits) => LiteralNode::BigInt(digits.clone()),
        Value::Date(_) | Value::RegExp { .. } => LiteralNode::Object(Vec::new()),
        Value::Extern(expr) => LiteralNode::Verbatim(expr.clone()),
        Value::Exempt(inner) => return to_literal_node(inner, depth),
        Value::Array(_) | Value::Set(_) | Value::Object(_) | Value::Map(_) => {
            if !depth.enter() {
                return Err(LiteralError::DepthExceeded {
                    limit: depth.max_depth(),
                });
            }
            let result = container_to_literal(value, depth);
            depth.leave();
            result?
        }
    };
    Ok(node)
}

fn container_to_literal(value: &LiteralData, depth: &mut DepthCounter) -> LiteralResult<LiteralNode> {
    let node = match value {
        Value::Array(items) | Value::Set(items) => {
            let items = items.borrow();
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(to_literal_node(item, depth)?);
            }
            LiteralNode::Array(out)
        }
        Value::Object(props) => {
            let props = props.borrow();
            let mut out = Vec::with_capacity(props.len());
            for (key, item) in props.iter() {
                if !is_undefined(item) {
                    out.push((key.clone(), to_literal_node(item, depth)?));
                }
            }
            LiteralNode::Object(out)
        }
        Value::Map(entries) => {
            let entries = entries.borrow();
            let mut out = Vec::with_capacity(entries.len());
            for (key, item) in entries.iter() {
                if !is_undefined(item) {
                    out.push((key.property_key(), to_literal_node(item, depth)?));
                }
            }
            LiteralNode::Object(out)
        }
        _ => LiteralNode::Null,
    };
    Ok(node)
}

fn is_undefined(value: &LiteralData) -> bool {
    match value {
        Value::Exempt(inner) => is_undefined(inner),
        other => matches!(other, Value::Undefined),
    }
}
