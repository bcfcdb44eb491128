//! An instance of a registered class: a URI (stable or anonymous), a runtime
//! class, and a fixed set of named property containers.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use oxigraph::model::{NamedNode, NamedNodeRef};

use crate::consts::{fresh_anonymous_uri, is_anonymous_uri};
use crate::property::{PropertySet, PropertyValue};
use crate::registry::TypeRegistry;

/// A typed entity. The key set of `props` is established from the class
/// descriptor's flattened property closure at construction and never
/// changes afterwards; only the contained values do.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    uri: String,
    class_uri: NamedNode,
    short_name: String,
    props: HashMap<String, PropertySet>,
}

impl Entity {
    /// Constructs an entity of a compiled class. Without a URI the entity is
    /// anonymous and receives a fresh synthetic identifier.
    pub fn new(registry: &TypeRegistry, class: NamedNodeRef, uri: Option<&str>) -> Result<Self> {
        let descriptor = registry
            .class(class)
            .ok_or_else(|| anyhow!("Class {} is not in the compiled schema", class))?;
        let mut props: HashMap<String, PropertySet> = HashMap::new();
        for property in &descriptor.properties {
            if let Some(property_descriptor) = registry.property(property.as_ref()) {
                props.insert(
                    property_descriptor.short_name.clone(),
                    PropertySet::new(property_descriptor),
                );
            }
        }
        Ok(Entity {
            uri: uri.map(str::to_string).unwrap_or_else(fresh_anonymous_uri),
            class_uri: class.into_owned(),
            short_name: descriptor.short_name.clone(),
            props,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub(crate) fn set_uri(&mut self, uri: String) {
        self.uri = uri;
    }

    /// The runtime class. A merge may leave a population holding a more
    /// specific class for this URI than the one constructed here.
    pub fn class_uri(&self) -> &NamedNode {
        &self.class_uri
    }

    /// The class's short name; the object graph's secondary index key.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn is_anonymous(&self) -> bool {
        is_anonymous_uri(&self.uri)
    }

    pub fn prop(&self, name: &str) -> Option<&PropertySet> {
        self.props.get(name)
    }

    /// The property container for a short name; referencing a name the class
    /// does not carry is an error, not a mutation.
    pub fn prop_mut(&mut self, name: &str) -> Result<&mut PropertySet> {
        let class = self.class_uri.clone();
        self.props
            .get_mut(name)
            .ok_or_else(|| anyhow!("No property {} on class {}", name, class))
    }

    pub fn props(&self) -> &HashMap<String, PropertySet> {
        &self.props
    }

    pub(crate) fn props_mut(&mut self) -> &mut HashMap<String, PropertySet> {
        &mut self.props
    }

    pub(crate) fn insert_prop_set(&mut self, name: String, set: PropertySet) {
        self.props.insert(name, set);
    }

    /// Replaces the property's members with one literal value.
    pub fn set_scalar(
        &mut self,
        name: &str,
        value: impl Into<PropertyValue>,
        registry: &TypeRegistry,
    ) -> Result<()> {
        self.prop_mut(name)?.replace(value.into(), None, registry)?;
        Ok(())
    }

    /// Adds one literal value to the property's members.
    pub fn add_scalar(
        &mut self,
        name: &str,
        value: impl Into<PropertyValue>,
        registry: &TypeRegistry,
    ) -> Result<()> {
        self.prop_mut(name)?.insert(value.into(), None, registry)?;
        Ok(())
    }

    /// Replaces the property's members with a reference to another entity.
    pub fn set_link(&mut self, name: &str, target: &Entity, registry: &TypeRegistry) -> Result<()> {
        let class = target.class_uri.clone();
        self.prop_mut(name)?.replace(
            PropertyValue::Ref(target.uri.clone()),
            Some(&class),
            registry,
        )?;
        Ok(())
    }

    /// Adds a reference to another entity to the property's members.
    pub fn add_link(&mut self, name: &str, target: &Entity, registry: &TypeRegistry) -> Result<()> {
        let class = target.class_uri.clone();
        self.prop_mut(name)?.insert(
            PropertyValue::Ref(target.uri.clone()),
            Some(&class),
            registry,
        )?;
        Ok(())
    }

    /// Structural equality used to decide whether two anonymous entities of
    /// the same class describe the same resource: every property name
    /// present on either side holds identical contents.
    pub fn contents_equal(&self, other: &Entity) -> bool {
        let mut names: Vec<&str> = self.props.keys().map(String::as_str).collect();
        names.extend(other.props.keys().map(String::as_str));
        names.sort_unstable();
        names.dedup();
        for name in names {
            match (self.props.get(name), other.props.get(name)) {
                (Some(a), Some(b)) => {
                    if a.values() != b.values() {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-- {}", self.short_name)?;
        if !self.is_anonymous() {
            write!(f, " @ {}", self.uri)?;
        }
        writeln!(f, " --")?;
        let mut names: Vec<&String> = self.props.keys().collect();
        names.sort();
        for name in names {
            for value in self.props[name].iter() {
                writeln!(f, "{} : {}", name, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::TripleCollection;
    use oxigraph::io::RdfFormat;

    const SCHEMA: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/schema/> .

ex:Artist a owl:Class .
ex:Group a owl:Class ; rdfs:subClassOf ex:Artist .
ex:name a rdf:Property ; rdfs:domain ex:Artist ; rdfs:range rdfs:Literal .
ex:member_of a rdf:Property ; rdfs:domain ex:Artist ; rdfs:range ex:Group .
"#;

    fn registry() -> TypeRegistry {
        let collection = TripleCollection::read_str(SCHEMA, RdfFormat::Turtle).unwrap();
        TypeRegistry::compile(&collection).unwrap()
    }

    fn class(s: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/schema/{}", s)).unwrap()
    }

    #[test]
    fn test_fixed_property_keys() {
        let reg = registry();
        let mut artist = Entity::new(&reg, class("Artist").as_ref(), None).unwrap();
        assert!(artist.prop("name").is_some());
        assert!(artist.prop("member_of").is_some());
        assert!(artist.prop("homepage").is_none());
        assert!(artist.prop_mut("homepage").is_err());
        assert!(artist.is_anonymous());
    }

    #[test]
    fn test_replace_semantics() {
        let reg = registry();
        let mut artist =
            Entity::new(&reg, class("Artist").as_ref(), Some("http://example.org/a")).unwrap();
        artist.set_scalar("name", "Dave", &reg).unwrap();
        artist.set_scalar("name", "Davy Crockett", &reg).unwrap();
        assert_eq!(artist.prop("name").unwrap().len(), 1);
        artist.add_scalar("name", "Dave", &reg).unwrap();
        assert_eq!(artist.prop("name").unwrap().len(), 2);
        // duplicate inserts are no-ops
        artist.add_scalar("name", "Dave", &reg).unwrap();
        assert_eq!(artist.prop("name").unwrap().len(), 2);
    }

    #[test]
    fn test_contents_equal() {
        let reg = registry();
        let mut a = Entity::new(&reg, class("Artist").as_ref(), None).unwrap();
        let mut b = Entity::new(&reg, class("Artist").as_ref(), None).unwrap();
        a.set_scalar("name", "ALL", &reg).unwrap();
        assert!(!a.contents_equal(&b));
        b.set_scalar("name", "ALL", &reg).unwrap();
        assert!(a.contents_equal(&b));
    }
}
