//! Tracks nested class bodies during validation (C7) to enforce that a class
//! declares exactly the methods it later defines (V8).

use crate::types::{Signature, Type};
use crate::variable::Stack;

/// State for one open `BeginClass ... EndClass` block-group.
///
/// The declared method list is stored reversed so [`ClassDefinition::next_method`]
/// pops from the tail, yielding methods in declaration order as `BeginMethod`
/// instructions consume them one at a time.
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    instance_properties: Vec<String>,
    pending_methods: Vec<(String, Signature)>,
    instance_type: Type,
    constructor_signature: Signature,
}

impl ClassDefinition {
    pub fn new(
        instance_properties: Vec<String>,
        declared_methods: Vec<(String, Signature)>,
        constructor_signature: Signature,
        super_type: Option<Type>,
    ) -> Self {
        let properties = instance_properties
            .iter()
            .cloned()
            .map(|name| (name, Type::Unknown))
            .collect();
        let methods = declared_methods.iter().cloned().collect();
        let own_type = Type::object(properties, methods);

        let instance_type = match super_type {
            Some(super_type) => own_type.join(super_type),
            None => own_type,
        };

        let mut pending_methods = declared_methods;
        pending_methods.reverse();

        Self {
            instance_properties,
            pending_methods,
            instance_type,
            constructor_signature,
        }
    }

    pub fn instance_properties(&self) -> &[String] {
        &self.instance_properties
    }

    pub fn instance_type(&self) -> &Type {
        &self.instance_type
    }

    pub fn constructor_signature(&self) -> &Signature {
        &self.constructor_signature
    }

    pub fn has_pending_methods(&self) -> bool {
        !self.pending_methods.is_empty()
    }

    /// Consumes the next method in declaration order, as seen by a
    /// `BeginMethod` instruction.
    pub fn next_method(&mut self) -> Option<(String, Signature)> {
        self.pending_methods.pop()
    }

    /// Names still awaiting a `BeginMethod`, in declaration order — used to
    /// build the "missing method definitions for [...]" validation error.
    pub fn pending_method_names(&self) -> Vec<String> {
        self.pending_methods
            .iter()
            .rev()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

pub type ClassDefinitionStack = Stack<ClassDefinition>;
