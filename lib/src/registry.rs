//! The flattened, queryable result of schema compilation: descriptors by
//! URI, a valid construction order, the subtype relation, schema-declared
//! instances and the namespace table. Built once, immutable afterwards.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::Result;
use chrono::prelude::*;
use log::{debug, info};
use oxigraph::model::{NamedNode, NamedNodeRef, SubjectRef};
use petgraph::graph::{Graph as DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use crate::consts::{RESOURCE, THING, TYPE};
use crate::errors::SchemaResolutionError;
use crate::schema::{
    declared_classes, declared_properties, is_deprecated, namednode_vec_de, namednode_vec_ser,
    ClassDescriptor, PropertyDescriptor,
};
use crate::util::TripleCollection;

// custom derive for descriptor maps as plain vecs
fn classes_ser<S>(classes: &HashMap<NamedNode, ClassDescriptor>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut vec: Vec<&ClassDescriptor> = classes.values().collect();
    vec.sort_by(|a, b| a.uri.cmp(&b.uri));
    vec.serialize(s)
}

fn classes_de<'de, D>(d: D) -> Result<HashMap<NamedNode, ClassDescriptor>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let vec: Vec<ClassDescriptor> = Vec::deserialize(d)?;
    Ok(vec.into_iter().map(|c| (c.uri.clone(), c)).collect())
}

fn properties_ser<S>(
    properties: &HashMap<NamedNode, PropertyDescriptor>,
    s: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut vec: Vec<&PropertyDescriptor> = properties.values().collect();
    vec.sort_by(|a, b| a.uri.cmp(&b.uri));
    vec.serialize(s)
}

fn properties_de<'de, D>(d: D) -> Result<HashMap<NamedNode, PropertyDescriptor>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let vec: Vec<PropertyDescriptor> = Vec::deserialize(d)?;
    Ok(vec.into_iter().map(|p| (p.uri.clone(), p)).collect())
}

fn instances_ser<S>(instances: &HashMap<NamedNode, NamedNode>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut vec: Vec<(&str, &str)> = instances
        .iter()
        .map(|(uri, class)| (uri.as_str(), class.as_str()))
        .collect();
    vec.sort();
    vec.serialize(s)
}

fn instances_de<'de, D>(d: D) -> Result<HashMap<NamedNode, NamedNode>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let vec: Vec<(String, String)> = Vec::deserialize(d)?;
    vec.into_iter()
        .map(|(uri, class)| {
            Ok((
                NamedNode::new(uri).map_err(serde::de::Error::custom)?,
                NamedNode::new(class).map_err(serde::de::Error::custom)?,
            ))
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TypeRegistry {
    #[serde(serialize_with = "classes_ser", deserialize_with = "classes_de")]
    classes: HashMap<NamedNode, ClassDescriptor>,
    #[serde(serialize_with = "properties_ser", deserialize_with = "properties_de")]
    properties: HashMap<NamedNode, PropertyDescriptor>,
    #[serde(
        serialize_with = "namednode_vec_ser",
        deserialize_with = "namednode_vec_de"
    )]
    build_order: Vec<NamedNode>,
    #[serde(serialize_with = "instances_ser", deserialize_with = "instances_de")]
    instances: HashMap<NamedNode, NamedNode>,
    namespaces: HashMap<String, String>,
    pub compiled_at: DateTime<Utc>,
    // reflexive-transitive parent closure; rebuilt after deserialization
    #[serde(skip)]
    ancestors: HashMap<NamedNode, HashSet<NamedNode>>,
}

impl TypeRegistry {
    /// Compiles the class and property declarations in the collection into a
    /// registry. Fails on cyclic class dependencies, unsupported anonymous
    /// schema nodes and unknown literal datatypes.
    pub fn compile(collection: &TripleCollection) -> Result<Self> {
        let graph = &collection.graph;

        let mut class_uris = declared_classes(graph);
        // the orphan rule needs the universal ancestors to exist even when
        // the schema does not declare them
        for root in [THING, RESOURCE] {
            if !class_uris.iter().any(|c| c.as_ref() == root) {
                class_uris.push(root.into_owned());
            }
        }
        class_uris.sort();

        let mut classes: HashMap<NamedNode, ClassDescriptor> = HashMap::new();
        for class in &class_uris {
            debug!("Resolving class {}", class);
            let descriptor = ClassDescriptor::from_graph(graph, class.as_ref())?;
            classes.insert(class.clone(), descriptor);
        }

        // every declared property, plus anything a class picked up through
        // an inverse link that is not itself declared
        let mut property_uris: HashSet<NamedNode> =
            declared_properties(graph).into_iter().collect();
        for descriptor in classes.values() {
            property_uris.extend(descriptor.properties.iter().cloned());
        }
        let mut properties: HashMap<NamedNode, PropertyDescriptor> = HashMap::new();
        for property in &property_uris {
            debug!("Resolving property {}", property);
            let descriptor = PropertyDescriptor::from_graph(graph, property.as_ref())?;
            properties.insert(property.clone(), descriptor);
        }

        let build_order = resolve_build_order(&classes)?;

        // flatten inherited properties along the build order; parents are
        // always finalized before their children
        for class in &build_order {
            let parents = classes[class].parents.clone();
            let mut flattened: HashSet<NamedNode> =
                classes[class].properties.iter().cloned().collect();
            for parent in &parents {
                if let Some(parent_descriptor) = classes.get(parent) {
                    flattened.extend(parent_descriptor.properties.iter().cloned());
                }
            }
            let mut flattened: Vec<NamedNode> = flattened.into_iter().collect();
            flattened.sort();
            classes.get_mut(class).unwrap().properties = flattened;
        }

        let ancestors = compute_ancestors(&classes);
        let instances = harvest_instances(graph, &classes, &properties);

        info!(
            "Compiled {} classes and {} properties",
            classes.len(),
            properties.len()
        );

        Ok(TypeRegistry {
            classes,
            properties,
            build_order,
            instances,
            namespaces: collection.namespaces().clone(),
            compiled_at: Utc::now(),
            ancestors,
        })
    }

    pub fn class(&self, uri: NamedNodeRef) -> Option<&ClassDescriptor> {
        self.classes.get(&uri.into_owned())
    }

    pub fn property(&self, uri: NamedNodeRef) -> Option<&PropertyDescriptor> {
        self.properties.get(&uri.into_owned())
    }

    pub fn classes(&self) -> &HashMap<NamedNode, ClassDescriptor> {
        &self.classes
    }

    pub fn properties(&self) -> &HashMap<NamedNode, PropertyDescriptor> {
        &self.properties
    }

    /// Classes in a valid construction order: every parent precedes all of
    /// its children.
    pub fn build_order(&self) -> &[NamedNode] {
        &self.build_order
    }

    /// The class a schema-declared instance URI belongs to.
    pub fn instance_class(&self, uri: NamedNodeRef) -> Option<&NamedNode> {
        self.instances.get(&uri.into_owned())
    }

    pub fn namespaces(&self) -> &HashMap<String, String> {
        &self.namespaces
    }

    /// Reflexive-transitive subtype check over the flattened parent edges.
    pub fn is_subtype_of(&self, class: NamedNodeRef, ancestor: NamedNodeRef) -> bool {
        self.ancestors
            .get(&class.into_owned())
            .is_some_and(|set| set.contains(&ancestor.into_owned()))
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn num_properties(&self) -> usize {
        self.properties.len()
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        info!("Saving compiled registry to: {:?}", file);
        let registry_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(registry_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut registry: TypeRegistry = serde_json::from_reader(reader)?;
        registry.ancestors = compute_ancestors(&registry.classes);
        Ok(registry)
    }

    /// Returns the GraphViz dot representation of the class hierarchy
    /// (edges point from a class to its parents).
    pub fn hierarchy_to_dot(&self) -> String {
        let mut graph: DiGraph<NamedNode, ()> = DiGraph::new();
        let mut indexes: HashMap<&NamedNode, NodeIndex> = HashMap::new();
        for class in self.build_order.iter() {
            let index = graph.add_node(class.clone());
            indexes.insert(class, index);
        }
        for (class, descriptor) in self.classes.iter() {
            let index = match indexes.get(class) {
                Some(index) => *index,
                None => continue,
            };
            for parent in &descriptor.parents {
                if let Some(parent_index) = indexes.get(parent) {
                    graph.add_edge(index, *parent_index, ());
                }
            }
        }
        let dot = petgraph::dot::Dot::with_config(&graph, &[]);
        format!("{:?}", dot)
    }

    /// Prints the registry in a clear and readable way for command line
    /// output.
    pub fn dump(&self) {
        let mut sorted_classes: Vec<&NamedNode> = self.classes.keys().collect();
        sorted_classes.sort();
        for class in sorted_classes {
            let descriptor = self.classes.get(class).unwrap();
            println!("┌ Class: {}", class);
            for parent in &descriptor.parents {
                println!("├─ Parent: {}", parent);
            }
            for property in &descriptor.properties {
                match self.properties.get(property) {
                    Some(p) if p.allows_literals && p.value_types.is_empty() => {
                        println!("│ ├─ {} : literal", p.short_name)
                    }
                    Some(p) if p.is_unconstrained() => {
                        println!("│ ├─ {} : any", p.short_name)
                    }
                    Some(p) => {
                        let mut kinds: Vec<String> =
                            p.value_types.iter().map(|t| t.to_string()).collect();
                        if p.allows_literals {
                            kinds.push("literal".to_string());
                        }
                        println!("│ ├─ {} : {}", p.short_name, kinds.join(" | "))
                    }
                    None => println!("│ ├─ {} : ?", property),
                }
            }
            println!("└────────────────────────────────────────────────────────────────────────");
        }
    }
}

/// The repeated-peel ordering: every pass finalizes the classes whose
/// pending parent set is empty and strikes them from everyone else's set. A
/// pass that finalizes nothing while classes remain is a dependency cycle.
fn resolve_build_order(classes: &HashMap<NamedNode, ClassDescriptor>) -> Result<Vec<NamedNode>> {
    let mut pending: BTreeMap<NamedNode, HashSet<NamedNode>> = classes
        .iter()
        .map(|(uri, descriptor)| (uri.clone(), descriptor.parents.iter().cloned().collect()))
        .collect();
    let mut order: Vec<NamedNode> = Vec::new();

    while !pending.is_empty() {
        let ready: Vec<NamedNode> = pending
            .iter()
            .filter(|(_, parents)| parents.is_empty())
            .map(|(uri, _)| uri.clone())
            .collect();
        if ready.is_empty() {
            let stuck: Vec<String> = pending.keys().map(|uri| uri.as_str().to_string()).collect();
            return Err(SchemaResolutionError::DependencyCycle { stuck }.into());
        }
        for class in ready {
            pending.remove(&class);
            for parents in pending.values_mut() {
                parents.remove(&class);
            }
            order.push(class);
        }
    }
    Ok(order)
}

/// Reflexive-transitive ancestor sets, computed by BFS over the parent
/// edges.
fn compute_ancestors(
    classes: &HashMap<NamedNode, ClassDescriptor>,
) -> HashMap<NamedNode, HashSet<NamedNode>> {
    let mut graph: DiGraph<NamedNode, ()> = DiGraph::new();
    let mut indexes: HashMap<&NamedNode, NodeIndex> = HashMap::new();
    for class in classes.keys() {
        let index = graph.add_node(class.clone());
        indexes.insert(class, index);
    }
    for (class, descriptor) in classes.iter() {
        let index = indexes[class];
        for parent in &descriptor.parents {
            if let Some(parent_index) = indexes.get(parent) {
                graph.add_edge(index, *parent_index, ());
            }
        }
    }
    let mut ancestors: HashMap<NamedNode, HashSet<NamedNode>> = HashMap::new();
    for (class, index) in indexes.iter() {
        let mut reachable: HashSet<NamedNode> = HashSet::new();
        let mut bfs = Bfs::new(&graph, *index);
        while let Some(node) = bfs.next(&graph) {
            reachable.insert(graph[node].clone());
        }
        ancestors.insert((*class).clone(), reachable);
    }
    ancestors
}

/// Schema-declared individuals: non-anonymous subjects typed with a compiled
/// class that are not themselves classes or properties.
fn harvest_instances(
    graph: &oxigraph::model::Graph,
    classes: &HashMap<NamedNode, ClassDescriptor>,
    properties: &HashMap<NamedNode, PropertyDescriptor>,
) -> HashMap<NamedNode, NamedNode> {
    let mut instances: HashMap<NamedNode, NamedNode> = HashMap::new();
    let mut sorted_classes: Vec<&NamedNode> = classes.keys().collect();
    sorted_classes.sort();
    for class in sorted_classes {
        for subject in graph.subjects_for_predicate_object(TYPE, class.as_ref()) {
            let subject = match subject {
                SubjectRef::NamedNode(n) => n.into_owned(),
                _ => continue,
            };
            if classes.contains_key(&subject) || properties.contains_key(&subject) {
                continue;
            }
            if is_deprecated(graph, subject.as_ref()) {
                continue;
            }
            instances.insert(subject, class.clone());
        }
    }
    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchemaResolutionError;
    use oxigraph::io::RdfFormat;
    use tempdir::TempDir;

    const DIAMOND: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/schema/> .

ex:A a owl:Class .
ex:B a owl:Class ; rdfs:subClassOf ex:A .
ex:C a owl:Class ; rdfs:subClassOf ex:A .
ex:D a owl:Class ; rdfs:subClassOf ex:B, ex:C .

ex:label a rdf:Property ; rdfs:domain ex:A ; rdfs:range rdfs:Literal .
ex:partner a rdf:Property ; rdfs:domain ex:D ; rdfs:range ex:A .
"#;

    fn registry(schema: &str) -> Result<TypeRegistry> {
        let collection = TripleCollection::read_str(schema, RdfFormat::Turtle)?;
        TypeRegistry::compile(&collection)
    }

    fn uri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    #[test]
    fn test_diamond_build_order() {
        let reg = registry(DIAMOND).unwrap();
        let order = reg.build_order();
        let pos = |name: &str| {
            order
                .iter()
                .position(|c| c.as_str() == format!("http://example.org/schema/{}", name))
                .unwrap()
        };
        assert!(pos("A") < pos("B"));
        assert!(pos("A") < pos("C"));
        assert!(pos("B") < pos("D"));
        assert!(pos("C") < pos("D"));
    }

    #[test]
    fn test_cycle_detection_names_stuck_classes() {
        let schema = r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/schema/> .
ex:X a owl:Class ; rdfs:subClassOf ex:Y .
ex:Y a owl:Class ; rdfs:subClassOf ex:X .
"#;
        let err = registry(schema).unwrap_err();
        match err.downcast_ref::<SchemaResolutionError>() {
            Some(SchemaResolutionError::DependencyCycle { stuck }) => {
                assert!(stuck.contains(&"http://example.org/schema/X".to_string()));
                assert!(stuck.contains(&"http://example.org/schema/Y".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_subtype_relation() {
        let reg = registry(DIAMOND).unwrap();
        let a = uri("http://example.org/schema/A");
        let d = uri("http://example.org/schema/D");
        assert!(reg.is_subtype_of(d.as_ref(), a.as_ref()));
        assert!(reg.is_subtype_of(d.as_ref(), d.as_ref()));
        assert!(!reg.is_subtype_of(a.as_ref(), d.as_ref()));
        // everything reaches the universal root through the orphan rule
        assert!(reg.is_subtype_of(d.as_ref(), THING));
    }

    #[test]
    fn test_inherited_property_closure() {
        let reg = registry(DIAMOND).unwrap();
        let d = reg
            .class(uri("http://example.org/schema/D").as_ref())
            .unwrap();
        let props: Vec<&str> = d.properties.iter().map(|p| p.as_str()).collect();
        assert!(props.contains(&"http://example.org/schema/label"));
        assert!(props.contains(&"http://example.org/schema/partner"));
        let a = reg
            .class(uri("http://example.org/schema/A").as_ref())
            .unwrap();
        let props: Vec<&str> = a.properties.iter().map(|p| p.as_str()).collect();
        assert!(props.contains(&"http://example.org/schema/label"));
        assert!(!props.contains(&"http://example.org/schema/partner"));
    }

    #[test]
    fn test_declared_instances() {
        let schema = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/schema/> .
ex:ReleaseStatus a owl:Class .
ex:official a ex:ReleaseStatus .
"#;
        let reg = registry(schema).unwrap();
        let official = uri("http://example.org/schema/official");
        assert_eq!(
            reg.instance_class(official.as_ref()).map(|c| c.as_str()),
            Some("http://example.org/schema/ReleaseStatus")
        );
    }

    #[test]
    fn test_registry_persistence_round_trip() {
        let dir = TempDir::new("ontomap").unwrap();
        let path = dir.path().join("registry.json");
        let reg = registry(DIAMOND).unwrap();
        reg.save_to_file(&path).unwrap();

        let reloaded = TypeRegistry::from_file(&path).unwrap();
        assert_eq!(reloaded.num_classes(), reg.num_classes());
        assert_eq!(reloaded.num_properties(), reg.num_properties());
        assert_eq!(reloaded.build_order(), reg.build_order());
        // the skipped closure is rebuilt on load
        let a = uri("http://example.org/schema/A");
        let d = uri("http://example.org/schema/D");
        assert!(reloaded.is_subtype_of(d.as_ref(), a.as_ref()));
    }
}
