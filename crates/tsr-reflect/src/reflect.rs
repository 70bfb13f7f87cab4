//! Host types to reflected-type trees.
//!
//! The [`Reflector`] owns the identity cache for one reflection pass. Every
//! type id except string and number literals maps to exactly one node; the
//! node is registered as an empty shell before any child is reflected, so a
//! type that reaches itself reuses the shell instead of recursing forever.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tsr_common::{DepthCounter, Expr, RecursionProfile, TypeId};

use crate::context::ReflectContext;
use crate::error::ReflectError;
use crate::host::{ObjectFlags, SymbolFlags, TypeFlags, TypeHost};
use crate::normalize::normalize_union;
use crate::types::{
    ClassData, Constructor, Parameter, Property, ReflectedType, TypeData, TypeKind, TypeRef,
};

/// Limits for one reflector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReflectOptions {
    pub max_depth: u32,
}

impl Default for ReflectOptions {
    fn default() -> Self {
        Self {
            max_depth: RecursionProfile::Reflection.max_depth(),
        }
    }
}

type ReflectResult<T> = Result<T, ReflectError>;

/// Reflects host types into shared [`ReflectedType`] nodes.
///
/// The cache lives as long as the reflector. Reflecting several roots with
/// one reflector shares nodes between them; call [`reset`](Self::reset) to
/// start an independent pass.
pub struct Reflector<'h, H: TypeHost> {
    host: &'h H,
    cache: FxHashMap<TypeId, TypeRef>,
    /// Cache insertions of the current entry-point call, with the entry each
    /// one displaced. Undone when the call fails.
    journal: Vec<(TypeId, Option<TypeRef>)>,
    depth: DepthCounter,
}

impl<'h, H: TypeHost> Reflector<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self::with_options(host, ReflectOptions::default())
    }

    pub fn with_options(host: &'h H, options: ReflectOptions) -> Self {
        Self {
            host,
            cache: FxHashMap::default(),
            journal: Vec::new(),
            depth: DepthCounter::new(options.max_depth),
        }
    }

    pub fn host(&self) -> &'h H {
        self.host
    }

    /// Drop every cached node.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.journal.clear();
        self.depth.reset();
    }

    /// The node cached for `id`, if any.
    pub fn cached(&self, id: TypeId) -> Option<TypeRef> {
        self.cache.get(&id).cloned()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Reflect any type.
    pub fn reflect_type(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
    ) -> ReflectResult<TypeRef> {
        let id = self.host.type_id(ty);
        debug!(type_id = %id, "reflect_type");
        self.journal.clear();
        let result = self.reflect(ctx, ty);
        self.settle(result)
    }

    /// Reflect a declared class: first base type, own data properties and
    /// constructor signatures.
    ///
    /// The class node is registered under the class type's id before its
    /// members are reflected, so a property typed as the class itself yields
    /// this very node. A previously cached non-class node for the same id is
    /// replaced.
    pub fn reflect_class(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
    ) -> ReflectResult<TypeRef> {
        let id = self.host.type_id(ty);
        debug!(type_id = %id, "reflect_class");
        if let Some(hit) = self.cache.get(&id) {
            if matches!(hit.kind(), Some(TypeKind::Class) | None) {
                return Ok(hit.clone());
            }
        }

        self.journal.clear();
        self.enter()?;
        let shell = ReflectedType::shell(id);
        self.register(id, shell.clone());
        let result = self.class_data(ctx, ty, id);
        self.depth.leave();
        let result = self.finish(id, shell, result);
        self.settle(result)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn reflect(&mut self, ctx: &mut ReflectContext<'_, H::Symbol>, ty: &H::Type) -> ReflectResult<TypeRef> {
        let id = self.host.type_id(ty);
        if let Some(hit) = self.cache.get(&id) {
            trace!(type_id = %id, kind = ?hit.kind(), "reflect: cache hit");
            return Ok(hit.clone());
        }

        let flags = self.host.type_flags(ty);
        if flags.intersects(TypeFlags::UNCACHED) && !flags.contains(TypeFlags::ANY) {
            let data = self.literal_data(ctx, ty, flags);
            return Ok(ReflectedType::new(id, data));
        }

        self.enter()?;
        let shell = ReflectedType::shell(id);
        self.register(id, shell.clone());
        let result = self.type_data(ctx, ty, id, flags);
        self.depth.leave();
        self.finish(id, shell, result)
    }

    fn register(&mut self, id: TypeId, node: TypeRef) {
        let previous = self.cache.insert(id, node);
        self.journal.push((id, previous));
    }

    /// End an entry-point call. A failed call leaves the cache as it was
    /// before the call: every node registered during it may reach the shell
    /// that was never filled.
    fn settle(&mut self, result: ReflectResult<TypeRef>) -> ReflectResult<TypeRef> {
        if result.is_err() {
            trace!(entries = self.journal.len(), "reflect: rolling back cache");
            while let Some((id, previous)) = self.journal.pop() {
                match previous {
                    Some(previous) => self.cache.insert(id, previous),
                    None => self.cache.remove(&id),
                };
            }
        }
        self.journal.clear();
        result
    }

    fn enter(&mut self) -> ReflectResult<()> {
        if self.depth.enter() {
            Ok(())
        } else {
            Err(ReflectError::DepthExceeded {
                limit: self.depth.max_depth(),
            })
        }
    }

    /// Fill a registered shell. On failure the shell stays registered until
    /// [`settle`](Self::settle) rolls the whole call back.
    fn finish(
        &self,
        id: TypeId,
        shell: TypeRef,
        result: ReflectResult<TypeData>,
    ) -> ReflectResult<TypeRef> {
        let data = result?;
        trace!(type_id = %id, kind = %data.kind(), "reflect: filled");
        shell.fill(data);
        Ok(shell)
    }

    fn literal_data(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
        flags: TypeFlags,
    ) -> TypeData {
        let data = if flags.contains(TypeFlags::STRING_LITERAL) {
            self.host.string_literal_value(ty).map(TypeData::StringLiteral)
        } else {
            self.host.number_literal_value(ty).map(TypeData::NumberLiteral)
        };
        data.unwrap_or_else(|| self.unsupported(ctx, ty))
    }

    fn type_data(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
        id: TypeId,
        flags: TypeFlags,
    ) -> ReflectResult<TypeData> {
        let data = if flags.contains(TypeFlags::ANY) {
            TypeData::Any
        } else if flags.contains(TypeFlags::STRING) {
            TypeData::String
        } else if flags.contains(TypeFlags::NUMBER) {
            TypeData::Number
        } else if flags.contains(TypeFlags::BOOLEAN) {
            TypeData::Boolean
        } else if flags.contains(TypeFlags::BOOLEAN_LITERAL) {
            match self.host.boolean_literal_value(ty) {
                Some(true) => TypeData::TrueLiteral,
                Some(false) => TypeData::FalseLiteral,
                None => self.unsupported(ctx, ty),
            }
        } else if flags.contains(TypeFlags::ES_SYMBOL) {
            TypeData::ESSymbol
        } else if flags.contains(TypeFlags::VOID) {
            TypeData::Void
        } else if flags.contains(TypeFlags::UNDEFINED) {
            TypeData::Undefined
        } else if flags.contains(TypeFlags::NULL) {
            TypeData::Null
        } else if flags.contains(TypeFlags::NEVER) {
            TypeData::Never
        } else if flags.contains(TypeFlags::UNKNOWN) {
            TypeData::Unknown
        } else if flags.contains(TypeFlags::OBJECT) {
            self.object_data(ctx, ty, id)?
        } else if flags.contains(TypeFlags::UNION) {
            let mut types = Vec::new();
            for member in self.host.union_members(ty) {
                types.push(self.reflect(ctx, &member)?);
            }
            TypeData::Union {
                types: normalize_union(types),
            }
        } else {
            self.unsupported(ctx, ty)
        };
        Ok(data)
    }

    fn unsupported(&mut self, ctx: &mut ReflectContext<'_, H::Symbol>, ty: &H::Type) -> TypeData {
        let type_text = self.host.type_to_string(ty);
        debug!(type_id = %self.host.type_id(ty), %type_text, "reflect: unsupported type");
        ctx.report_unknown_type(&type_text);
        TypeData::Unknown2
    }

    // =========================================================================
    // Objects
    // =========================================================================

    fn object_data(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
        id: TypeId,
    ) -> ReflectResult<TypeData> {
        let object_flags = self.host.object_flags(ty);
        if object_flags.contains(ObjectFlags::REFERENCE) {
            return self.reference_data(ctx, ty, id);
        }

        let symbol = self.symbol_of(ty, id)?;
        if self.host.symbol_flags(&symbol).contains(SymbolFlags::METHOD) {
            return Ok(TypeData::Function);
        }
        if self.host.has_value_declaration(&symbol) {
            return Ok(TypeData::Reference {
                name: self.identifier_for(ctx, ty, id)?,
                arguments: Vec::new(),
            });
        }

        if self.host.call_signature_count(ty) > 0 {
            return Ok(TypeData::Function);
        }
        let name = (!object_flags.contains(ObjectFlags::ANONYMOUS))
            .then(|| self.host.symbol_name(&symbol));
        let mut properties = Vec::new();
        for property in self.host.properties_of_type(ty) {
            properties.push(self.property(ctx, &property, id)?);
        }
        Ok(TypeData::Object { name, properties })
    }

    fn reference_data(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
        id: TypeId,
    ) -> ReflectResult<TypeData> {
        let mut arguments = Vec::new();
        for argument in self.host.type_arguments(ty) {
            arguments.push(self.reflect(ctx, &argument)?);
        }

        let target = self
            .host
            .reference_target(ty)
            .ok_or(ReflectError::MissingHostData {
                what: "reference target",
                type_id: id,
            })?;
        if self.host.object_flags(&target).contains(ObjectFlags::TUPLE) {
            return Ok(TypeData::Tuple {
                element_types: arguments,
            });
        }

        let symbol = self.symbol_of(&target, id)?;
        if !self.host.has_value_declaration(&symbol) {
            return Ok(TypeData::Object {
                name: Some(self.host.symbol_name(&symbol)),
                properties: Vec::new(),
            });
        }
        Ok(TypeData::Reference {
            name: self.identifier_for(ctx, &target, id)?,
            arguments,
        })
    }

    /// Identifier for the declaration `ty` names.
    ///
    /// When the host prints `ty` as a type reference, the referenced symbol
    /// (through any alias) is reported to the context as used.
    fn identifier_for(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
        id: TypeId,
    ) -> ReflectResult<Expr> {
        let symbol = self.symbol_of(ty, id)?;
        let name = match self.host.type_reference_name(ty) {
            Some(name) => {
                let referenced = if self.host.symbol_flags(&symbol).contains(SymbolFlags::ALIAS) {
                    self.host.aliased_symbol(&symbol).unwrap_or(symbol)
                } else {
                    symbol
                };
                ctx.mark_referenced(&referenced);
                name
            }
            None => self.host.symbol_name(&symbol),
        };
        Ok(Expr::id(name, ctx.scope))
    }

    fn symbol_of(&self, ty: &H::Type, id: TypeId) -> ReflectResult<H::Symbol> {
        self.host
            .symbol_of_type(ty)
            .ok_or(ReflectError::MissingHostData {
                what: "symbol",
                type_id: id,
            })
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn property(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        symbol: &H::Symbol,
        owner: TypeId,
    ) -> ReflectResult<Property> {
        let ty = self
            .host
            .type_of_symbol(symbol)
            .ok_or(ReflectError::MissingHostData {
                what: "property type",
                type_id: owner,
            })?;
        Ok(Property {
            name: self.host.property_name(symbol),
            modifiers: self.host.modifier_flags(symbol),
            ty: self.reflect(ctx, &ty)?,
            initializer: self.host.initializer(symbol).map(Expr::deferred),
        })
    }

    fn class_data(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        ty: &H::Type,
        id: TypeId,
    ) -> ReflectResult<TypeData> {
        let extends = match self.host.base_types(ty).first() {
            Some(base) => Some(self.reflect(ctx, base)?),
            None => None,
        };

        let symbol = self.symbol_of(ty, id)?;
        let mut properties = Vec::new();
        for member in self.host.declared_properties(ty) {
            if self.host.symbol_flags(&member).contains(SymbolFlags::PROPERTY) {
                properties.push(self.property(ctx, &member, id)?);
            }
        }

        let mut constructors = Vec::new();
        for signature in self.host.construct_signatures(&symbol) {
            let mut parameters = Vec::with_capacity(signature.parameters.len());
            for parameter in &signature.parameters {
                parameters.push(self.parameter(ctx, parameter, id)?);
            }
            constructors.push(Constructor {
                modifiers: signature.modifiers,
                parameters,
            });
        }

        Ok(TypeData::Class(ClassData {
            name: self.host.symbol_name(&symbol),
            properties,
            constructors,
            extends,
        }))
    }

    fn parameter(
        &mut self,
        ctx: &mut ReflectContext<'_, H::Symbol>,
        symbol: &H::Symbol,
        owner: TypeId,
    ) -> ReflectResult<Parameter> {
        let ty = self
            .host
            .type_of_symbol(symbol)
            .ok_or(ReflectError::MissingHostData {
                what: "parameter type",
                type_id: owner,
            })?;
        Ok(Parameter {
            name: self.host.symbol_name(symbol),
            modifiers: self.host.modifier_flags(symbol),
            ty: self.reflect(ctx, &ty)?,
            initializer: self.host.initializer(symbol).map(Expr::deferred),
        })
    }
}
