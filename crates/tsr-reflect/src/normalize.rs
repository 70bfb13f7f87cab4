//! Union member normalization.

use smallvec::SmallVec;
use tsr_common::TypeId;

use crate::types::{ReflectedType, TypeData, TypeKind, TypeRef};

/// Collapse the boolean family of a union.
///
/// Members are split into boolean-like (`true`, `false`, `boolean`) and the
/// rest. The boolean-like part becomes a single `boolean` when it contains
/// `boolean` itself or both literals; the result is the other members in
/// their original order followed by the boolean part.
pub fn normalize_union(types: Vec<TypeRef>) -> Vec<TypeRef> {
    let mut booleans: SmallVec<[TypeRef; 3]> = SmallVec::new();
    let mut out = Vec::with_capacity(types.len());
    for ty in types {
        if ty.kind().is_some_and(TypeKind::is_boolean_like) {
            booleans.push(ty);
        } else {
            out.push(ty);
        }
    }

    let has = |kind| booleans.iter().any(|ty| ty.kind() == Some(kind));
    let collapse = has(TypeKind::Boolean) || (has(TypeKind::TrueLiteral) && has(TypeKind::FalseLiteral));

    if collapse {
        let boolean = booleans
            .iter()
            .find(|ty| ty.kind() == Some(TypeKind::Boolean))
            .cloned()
            .unwrap_or_else(|| ReflectedType::new(TypeId::SYNTHETIC, TypeData::Boolean));
        out.push(boolean);
    } else {
        out.extend(booleans);
    }
    out
}
