//! Per-variable, per-instruction type ledger (C8), plus the `Type` values it
//! stores. Used by class-definition instance/constructor types and by
//! downstream consumers (lifter, mutation engine) to make type-directed
//! choices; this crate only maintains the ledger, it never interprets types
//! dynamically (§1 Non-goals).

use std::collections::BTreeMap;

use crate::variable::{Variable, VariableMap};

/// A function/method signature: ordered parameter types and a result type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Signature {
    pub parameters: Vec<Type>,
    pub result: Box<Type>,
}

impl Signature {
    pub fn new(parameters: Vec<Type>, result: Type) -> Self {
        Self {
            parameters,
            result: Box::new(result),
        }
    }
}

/// A statically- or runtime-observed JavaScript value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Unknown,
    Undefined,
    Null,
    Boolean,
    Integer,
    Float,
    BigInt,
    String,
    Function(Signature),
    Object {
        properties: BTreeMap<String, Type>,
        methods: BTreeMap<String, Signature>,
    },
    /// The join of two or more incompatible types.
    Union(Vec<Type>),
}

impl Type {
    pub fn object(properties: BTreeMap<String, Type>, methods: BTreeMap<String, Signature>) -> Self {
        Type::Object { properties, methods }
    }

    /// Two object types are compatible for joining iff they agree on the
    /// type of every property/method name they have in common.
    fn compatible_with(&self, other: &Type) -> bool {
        match (self, other) {
            (
                Type::Object { properties: pa, methods: ma },
                Type::Object { properties: pb, methods: mb },
            ) => {
                pa.iter().all(|(k, v)| pb.get(k).is_none_or(|w| v == w))
                    && ma.iter().all(|(k, v)| mb.get(k).is_none_or(|w| v == w))
            }
            (a, b) => a == b,
        }
    }

    /// Joins `self` with `other`, guarded by [`Type::compatible_with`]:
    /// compatible object types merge their property/method maps; everything
    /// else that differs becomes a `Union`.
    pub fn join(self, other: Type) -> Type {
        if self == other {
            return self;
        }
        if self.compatible_with(&other) {
            if let (
                Type::Object { properties: mut pa, methods: mut ma },
                Type::Object { properties: pb, methods: mb },
            ) = (self.clone(), other.clone())
            {
                pa.extend(pb);
                ma.extend(mb);
                return Type::Object { properties: pa, methods: ma };
            }
        }
        Type::Union(vec![self, other])
    }
}

/// Whether a recorded type was inferred statically or observed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TypeQuality {
    Inferred,
    Runtime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct TypeEntry {
    instr_index: usize,
    ty: Type,
    quality: TypeQuality,
}

/// Mapping `variable -> ordered-by-index list of (instrIndex, Type, quality)`.
///
/// The effective type of `v` *after* instruction `i` is the type with the
/// greatest `instrIndex <= i`, or [`Type::Unknown`] if none exists. This
/// crate fixes the "after instruction i" convention (see DESIGN.md for why
/// the alternative "at instruction i" reading was rejected).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProgramTypes {
    entries: VariableMap<Vec<TypeEntry>>,
}

impl ProgramTypes {
    pub fn new() -> Self {
        Self {
            entries: VariableMap::new(),
        }
    }

    /// Records that `v` has type `ty` (of the given `quality`) from
    /// `after_index` onward. Overwrites an existing entry at the same index;
    /// otherwise inserts so the list stays sorted by `instrIndex`.
    pub fn set_type(&mut self, v: Variable, ty: Type, after_index: usize, quality: TypeQuality) {
        let list = self.entries.get_mut(v);
        let list = if let Some(list) = list {
            list
        } else {
            self.entries.insert(v, Vec::new());
            self.entries.get_mut(v).unwrap()
        };

        match list.binary_search_by_key(&after_index, |e| e.instr_index) {
            Ok(pos) => {
                list[pos] = TypeEntry {
                    instr_index: after_index,
                    ty,
                    quality,
                };
            }
            Err(pos) => list.insert(
                pos,
                TypeEntry {
                    instr_index: after_index,
                    ty,
                    quality,
                },
            ),
        }
    }

    /// The type of `v` effective after instruction `after_index`, or
    /// [`Type::Unknown`] if nothing has been recorded at or before it.
    pub fn get_type(&self, v: Variable, after_index: usize) -> Type {
        let Some(list) = self.entries.get(v) else {
            return Type::Unknown;
        };
        match list.binary_search_by_key(&after_index, |e| e.instr_index) {
            Ok(pos) => list[pos].ty.clone(),
            Err(0) => Type::Unknown,
            Err(pos) => list[pos - 1].ty.clone(),
        }
    }

    /// All entries across all variables whose quality is `Runtime`.
    pub fn only_runtime_types(&self) -> Vec<(Variable, usize, Type)> {
        let mut out = Vec::new();
        for (v, list) in self.entries.iter() {
            for entry in list {
                if entry.quality == TypeQuality::Runtime {
                    out.push((v, entry.instr_index, entry.ty.clone()));
                }
            }
        }
        out
    }

    /// For each instruction index in `0..size`, the `(variable, type)` pairs
    /// whose entry index equals that instruction. Used by downstream tooling
    /// to locate "type changes at this instruction".
    pub fn indexed_by_instruction(&self, size: usize) -> Vec<Vec<(Variable, Type)>> {
        let mut out = vec![Vec::new(); size];
        for (v, list) in self.entries.iter() {
            for entry in list {
                if entry.instr_index < size {
                    out[entry.instr_index].push((v, entry.ty.clone()));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_type_before_any_entry_is_unknown() {
        let types = ProgramTypes::new();
        assert_eq!(types.get_type(Variable::new(0), 5), Type::Unknown);
    }

    #[test]
    fn set_type_then_get_type_holds_until_next_entry() {
        let mut types = ProgramTypes::new();
        types.set_type(Variable::new(0), Type::Integer, 2, TypeQuality::Inferred);
        types.set_type(Variable::new(0), Type::String, 5, TypeQuality::Inferred);

        assert_eq!(types.get_type(Variable::new(0), 1), Type::Unknown);
        assert_eq!(types.get_type(Variable::new(0), 2), Type::Integer);
        assert_eq!(types.get_type(Variable::new(0), 4), Type::Integer);
        assert_eq!(types.get_type(Variable::new(0), 5), Type::String);
        assert_eq!(types.get_type(Variable::new(0), 100), Type::String);
    }

    #[test]
    fn set_type_overwrites_same_index() {
        let mut types = ProgramTypes::new();
        types.set_type(Variable::new(1), Type::Integer, 3, TypeQuality::Inferred);
        types.set_type(Variable::new(1), Type::Float, 3, TypeQuality::Runtime);

        assert_eq!(types.get_type(Variable::new(1), 3), Type::Float);
    }

    #[test]
    fn only_runtime_types_filters_by_quality() {
        let mut types = ProgramTypes::new();
        types.set_type(Variable::new(0), Type::Integer, 0, TypeQuality::Inferred);
        types.set_type(Variable::new(1), Type::String, 1, TypeQuality::Runtime);

        let runtime = types.only_runtime_types();
        assert_eq!(runtime.len(), 1);
        assert_eq!(runtime[0].0, Variable::new(1));
    }

    #[test]
    fn join_merges_compatible_objects() {
        let mut props_a = BTreeMap::new();
        props_a.insert("x".to_string(), Type::Integer);
        let a = Type::object(props_a, BTreeMap::new());

        let mut props_b = BTreeMap::new();
        props_b.insert("y".to_string(), Type::String);
        let b = Type::object(props_b, BTreeMap::new());

        match a.join(b) {
            Type::Object { properties, .. } => {
                assert_eq!(properties.len(), 2);
            }
            other => panic!("expected merged object, got {other:?}"),
        }
    }

    #[test]
    fn join_unions_incompatible_types() {
        let joined = Type::Integer.join(Type::String);
        assert!(matches!(joined, Type::Union(_)));
    }
}
