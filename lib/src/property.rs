//! The typed, validating, multi-valued container holding one entity's values
//! for one property.

use std::collections::hash_set;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use oxigraph::model::NamedNode;

use crate::errors::TypeMismatchError;
use crate::registry::TypeRegistry;
use crate::schema::PropertyDescriptor;

/// One member of a property set: a literal scalar or a reference to another
/// entity, keyed by that entity's URI.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Float(f64),
    Ref(String),
}

impl PropertyValue {
    pub fn is_literal(&self) -> bool {
        !matches!(self, PropertyValue::Ref(_))
    }

    pub fn as_ref_uri(&self) -> Option<&str> {
        match self {
            PropertyValue::Ref(uri) => Some(uri),
            _ => None,
        }
    }

    /// Short description of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Str(_) => "string literal",
            PropertyValue::Int(_) => "integer literal",
            PropertyValue::Float(_) => "float literal",
            PropertyValue::Ref(_) => "entity reference",
        }
    }
}

// Floats compare and hash by bit pattern so values can live in a HashSet.
impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyValue::Str(a), PropertyValue::Str(b)) => a == b,
            (PropertyValue::Int(a), PropertyValue::Int(b)) => a == b,
            (PropertyValue::Float(a), PropertyValue::Float(b)) => a.to_bits() == b.to_bits(),
            (PropertyValue::Ref(a), PropertyValue::Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PropertyValue {}

impl Hash for PropertyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            PropertyValue::Str(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            PropertyValue::Int(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            PropertyValue::Float(x) => {
                2u8.hash(state);
                x.to_bits().hash(state);
            }
            PropertyValue::Ref(uri) => {
                3u8.hash(state);
                uri.hash(state);
            }
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Str(s) => write!(f, "{}", s),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::Ref(uri) => write!(f, "<{}>", uri),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

/// The set of values one entity holds for one property, validating every
/// insertion against the property's compiled constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySet {
    short_name: String,
    property_uri: NamedNode,
    value_types: Vec<NamedNode>,
    allows_literals: bool,
    values: HashSet<PropertyValue>,
}

impl PropertySet {
    pub fn new(descriptor: &PropertyDescriptor) -> Self {
        PropertySet {
            short_name: descriptor.short_name.clone(),
            property_uri: descriptor.uri.clone(),
            value_types: descriptor.value_types.clone(),
            allows_literals: descriptor.allows_literals,
            values: HashSet::new(),
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn property_uri(&self) -> &NamedNode {
        &self.property_uri
    }

    pub fn allows_literals(&self) -> bool {
        self.allows_literals
    }

    pub fn value_types(&self) -> &[NamedNode] {
        &self.value_types
    }

    /// Inserts a value. For entity references the caller supplies the
    /// referenced entity's runtime class; it must be a subtype of some
    /// allowed type unless the allowed set is empty. Duplicate inserts are
    /// no-ops.
    pub fn insert(
        &mut self,
        value: PropertyValue,
        value_class: Option<&NamedNode>,
        registry: &TypeRegistry,
    ) -> Result<(), TypeMismatchError> {
        self.check(&value, value_class, registry)?;
        self.values.insert(value);
        Ok(())
    }

    /// Clears all members, then inserts the value. This is how
    /// conventionally-single-valued properties are modelled; the container
    /// itself never limits multiplicity.
    pub fn replace(
        &mut self,
        value: PropertyValue,
        value_class: Option<&NamedNode>,
        registry: &TypeRegistry,
    ) -> Result<(), TypeMismatchError> {
        self.check(&value, value_class, registry)?;
        self.values.clear();
        self.values.insert(value);
        Ok(())
    }

    fn check(
        &self,
        value: &PropertyValue,
        value_class: Option<&NamedNode>,
        registry: &TypeRegistry,
    ) -> Result<(), TypeMismatchError> {
        let accepted = match value {
            PropertyValue::Ref(_) => {
                self.value_types.is_empty()
                    || value_class.is_some_and(|class| {
                        self.value_types
                            .iter()
                            .any(|allowed| registry.is_subtype_of(class.as_ref(), allowed.as_ref()))
                    })
            }
            _ => self.allows_literals,
        };
        if accepted {
            return Ok(());
        }
        let actual = match (value, value_class) {
            (PropertyValue::Ref(_), Some(class)) => class.to_string(),
            (PropertyValue::Ref(uri), None) => format!("reference to <{}>", uri),
            _ => value.kind().to_string(),
        };
        let mut expected: Vec<String> = self.value_types.iter().map(|t| t.to_string()).collect();
        if self.allows_literals {
            expected.push("literal".to_string());
        }
        Err(TypeMismatchError {
            property: self.short_name.clone(),
            expected,
            actual,
        })
    }

    pub fn remove(&mut self, value: &PropertyValue) -> bool {
        self.values.remove(value)
    }

    pub fn contains(&self, value: &PropertyValue) -> bool {
        self.values.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, PropertyValue> {
        self.values.iter()
    }

    pub fn values(&self) -> &HashSet<PropertyValue> {
        &self.values
    }

    /// Redirects every reference to `from` onto `to`. Used by the object
    /// graph when an anonymous entity turns out to alias another.
    pub(crate) fn rewrite_ref(&mut self, from: &str, to: &str) {
        let old = PropertyValue::Ref(from.to_string());
        if self.values.remove(&old) {
            self.values.insert(PropertyValue::Ref(to.to_string()));
        }
    }

    /// Unions the other set's members in without validation; only safe when
    /// both sets were built from the same descriptor.
    pub(crate) fn absorb(&mut self, other: &PropertySet) {
        for value in other.values.iter() {
            self.values.insert(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_value_equality() {
        assert_eq!(PropertyValue::from("a"), PropertyValue::from("a"));
        assert_ne!(PropertyValue::from("1"), PropertyValue::from(1i64));
        assert_eq!(PropertyValue::from(1.5), PropertyValue::from(1.5));
        assert_eq!(
            PropertyValue::Ref("anon:x".into()),
            PropertyValue::Ref("anon:x".into())
        );
    }

    #[test]
    fn test_value_set_semantics() {
        let mut set: HashSet<PropertyValue> = HashSet::new();
        set.insert(PropertyValue::from("Dave Mustaine"));
        set.insert(PropertyValue::from("Dave Mustaine"));
        set.insert(PropertyValue::from(3.25));
        set.insert(PropertyValue::from(3.25));
        assert_eq!(set.len(), 2);
    }
}
