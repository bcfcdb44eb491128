//! Defines the compiled, flattened representations of schema classes and
//! properties (`ClassDescriptor`, `PropertyDescriptor`) and the resolution
//! rules that read them out of a declaration graph.

use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::Result;
use lazy_static::lazy_static;
use log::warn;
use oxigraph::model::{Graph, NamedNode, NamedNodeRef, SubjectRef, Term, TermRef, TripleRef};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::errors::{SchemaResolutionError, UnknownDatatypeError};

// custom derive for NamedNode
pub(crate) fn namednode_ser<S>(namednode: &NamedNode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(namednode.as_str())
}

pub(crate) fn namednode_de<'de, D>(deserializer: D) -> Result<NamedNode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NamedNode::new(s).map_err(serde::de::Error::custom)
}

pub(crate) fn namednode_vec_ser<S>(
    nodes: &Vec<NamedNode>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let strings: Vec<&str> = nodes.iter().map(|n| n.as_str()).collect();
    strings.serialize(serializer)
}

pub(crate) fn namednode_vec_de<'de, D>(deserializer: D) -> Result<Vec<NamedNode>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let strings: Vec<String> = Vec::deserialize(deserializer)?;
    strings
        .into_iter()
        .map(|s| NamedNode::new(s).map_err(serde::de::Error::custom))
        .collect()
}

/// The scalar shape a literal datatype coerces to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
}

lazy_static! {
    static ref XSD_SCALAR_KINDS: HashMap<&'static str, ScalarKind> = {
        let mut m = HashMap::new();
        m.insert("http://www.w3.org/2001/XMLSchema#string", ScalarKind::Str);
        m.insert("http://www.w3.org/2001/XMLSchema#integer", ScalarKind::Int);
        m.insert("http://www.w3.org/2001/XMLSchema#int", ScalarKind::Int);
        m.insert(
            "http://www.w3.org/2001/XMLSchema#nonNegativeInteger",
            ScalarKind::Int,
        );
        m.insert("http://www.w3.org/2001/XMLSchema#decimal", ScalarKind::Float);
        m.insert("http://www.w3.org/2001/XMLSchema#float", ScalarKind::Float);
        m.insert("http://www.w3.org/2001/XMLSchema#double", ScalarKind::Float);
        m.insert("http://www.w3.org/2001/XMLSchema#duration", ScalarKind::Str);
        m.insert("http://www.w3.org/2001/XMLSchema#date", ScalarKind::Str);
        m.insert("http://www.w3.org/2001/XMLSchema#dateTime", ScalarKind::Str);
        m.insert("http://www.w3.org/2001/XMLSchema#gYear", ScalarKind::Int);
        m.insert(
            "http://www.w3.org/2001/XMLSchema#gYearMonth",
            ScalarKind::Str,
        );
        m.insert("http://www.w3.org/2001/XMLSchema#gMonth", ScalarKind::Int);
        m.insert("http://www.w3.org/2001/XMLSchema#gDay", ScalarKind::Int);
        m
    };
}

/// The scalar kind a datatype IRI coerces to, if the table covers it.
pub fn scalar_kind(datatype: &str) -> Option<ScalarKind> {
    XSD_SCALAR_KINDS.get(datatype).copied()
}

/// A schema class after parent and property resolution. `properties` holds
/// the full inherited closure once the registry has flattened the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassDescriptor {
    #[serde(serialize_with = "namednode_ser", deserialize_with = "namednode_de")]
    pub uri: NamedNode,
    pub short_name: String,
    pub namespace: String,
    pub doc: String,
    #[serde(
        serialize_with = "namednode_vec_ser",
        deserialize_with = "namednode_vec_de"
    )]
    pub parents: Vec<NamedNode>,
    #[serde(
        serialize_with = "namednode_vec_ser",
        deserialize_with = "namednode_vec_de"
    )]
    pub properties: Vec<NamedNode>,
}

impl ClassDescriptor {
    /// Resolves the descriptor for one declared class: direct and
    /// equivalence-contributed parents, the orphan rule, and the property
    /// association rules. Inherited properties are flattened later, once a
    /// build order exists.
    pub fn from_graph(graph: &Graph, class: NamedNodeRef) -> Result<Self> {
        let (namespace, short_name) = split_uri(class.as_str());
        let mut visited = HashSet::new();
        let parents = resolve_parents(graph, class, &mut visited)?;
        let mut visited = HashSet::new();
        let properties = resolve_properties(graph, class, &mut visited)?;
        Ok(ClassDescriptor {
            uri: class.into_owned(),
            short_name: short_name.to_string(),
            namespace: namespace.to_string(),
            doc: comment_text(graph, class),
            parents,
            properties,
        })
    }
}

/// A schema property after value-type resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyDescriptor {
    #[serde(serialize_with = "namednode_ser", deserialize_with = "namednode_de")]
    pub uri: NamedNode,
    pub short_name: String,
    #[serde(
        serialize_with = "namednode_vec_ser",
        deserialize_with = "namednode_vec_de"
    )]
    pub value_types: Vec<NamedNode>,
    pub allows_literals: bool,
    pub doc: String,
}

impl PropertyDescriptor {
    pub fn from_graph(graph: &Graph, property: NamedNodeRef) -> Result<Self> {
        let (_, short_name) = split_uri(property.as_str());
        let (value_types, allows_literals) = resolve_value_types(graph, property)?;
        Ok(PropertyDescriptor {
            uri: property.into_owned(),
            short_name: short_name.to_string(),
            value_types,
            allows_literals,
            doc: comment_text(graph, property),
        })
    }

    /// An empty allowed-type set with no literal flag accepts any reference.
    pub fn is_unconstrained(&self) -> bool {
        self.value_types.is_empty() && !self.allows_literals
    }
}

/// All non-anonymous declared classes, deduplicated and sorted; deprecated
/// classes are dropped.
pub fn declared_classes(graph: &Graph) -> Vec<NamedNode> {
    let mut classes: HashSet<NamedNode> = HashSet::new();
    for class_term in [OWL_CLASS, CLASS] {
        for subject in graph.subjects_for_predicate_object(TYPE, class_term) {
            if let SubjectRef::NamedNode(n) = subject {
                if !is_deprecated(graph, n) {
                    classes.insert(n.into_owned());
                }
            }
        }
    }
    let mut classes: Vec<NamedNode> = classes.into_iter().collect();
    classes.sort();
    classes
}

/// All declared properties: subjects typed rdf:Property, plus subjects typed
/// with any declared subclass of rdf:Property (owl:ObjectProperty and
/// friends declare themselves that way).
pub fn declared_properties(graph: &Graph) -> Vec<NamedNode> {
    let mut property_types: Vec<NamedNode> = vec![PROPERTY.into_owned()];
    for subject in graph.subjects_for_predicate_object(SUB_CLASS_OF, PROPERTY) {
        if let SubjectRef::NamedNode(n) = subject {
            property_types.push(n.into_owned());
        }
    }
    let mut properties: HashSet<NamedNode> = HashSet::new();
    for ptype in &property_types {
        for subject in graph.subjects_for_predicate_object(TYPE, ptype.as_ref()) {
            if let SubjectRef::NamedNode(n) = subject {
                if !is_deprecated(graph, n) {
                    properties.insert(n.into_owned());
                }
            }
        }
    }
    let mut properties: Vec<NamedNode> = properties.into_iter().collect();
    properties.sort();
    properties
}

/// True when the term carries a "deprecated" vocab status.
pub fn is_deprecated(graph: &Graph, term: NamedNodeRef) -> bool {
    graph
        .objects_for_subject_predicate(term, TERM_STATUS)
        .any(|status| matches!(status, TermRef::Literal(lit) if lit.value() == "deprecated"))
}

/// Every class linked to `class` by owl:sameAs in either triple direction.
fn equivalent_classes(graph: &Graph, class: NamedNodeRef) -> Vec<NamedNode> {
    let mut linked: HashSet<NamedNode> = HashSet::new();
    for object in graph.objects_for_subject_predicate(class, SAME_AS) {
        if let TermRef::NamedNode(n) = object {
            linked.insert(n.into_owned());
        }
    }
    for subject in graph.subjects_for_predicate_object(SAME_AS, class) {
        if let SubjectRef::NamedNode(n) = subject {
            linked.insert(n.into_owned());
        }
    }
    let mut linked: Vec<NamedNode> = linked.into_iter().collect();
    linked.sort();
    linked
}

/// Walks an rdf:List from its head term to rdf:nil.
pub(crate) fn read_list(graph: &Graph, head: TermRef) -> Vec<Term> {
    let mut items = Vec::new();
    let mut seen: HashSet<Term> = HashSet::new();
    let mut cursor = head;
    loop {
        let subject: SubjectRef = match cursor {
            TermRef::NamedNode(n) if n == NIL => break,
            TermRef::NamedNode(n) => n.into(),
            TermRef::BlankNode(b) => b.into(),
            _ => break,
        };
        if !seen.insert(cursor.into()) {
            break;
        }
        if let Some(first) = graph.object_for_subject_predicate(subject, FIRST) {
            items.push(first.into());
        }
        match graph.object_for_subject_predicate(subject, REST) {
            Some(rest) => cursor = rest,
            None => break,
        }
    }
    items
}

/// Resolved parents of one class: direct subClassOf objects (restriction
/// parents skipped, union parents rejected), equivalence contributions, the
/// orphan rule, then dedup and a deterministic sort.
pub(crate) fn resolve_parents(
    graph: &Graph,
    class: NamedNodeRef,
    visited: &mut HashSet<NamedNode>,
) -> Result<Vec<NamedNode>> {
    visited.insert(class.into_owned());
    let mut parents: Vec<NamedNode> = Vec::new();

    for parent in graph.objects_for_subject_predicate(class, SUB_CLASS_OF) {
        match parent {
            TermRef::NamedNode(n) => parents.push(n.into_owned()),
            TermRef::BlankNode(b) => {
                if graph.object_for_subject_predicate(b, UNION_OF).is_some() {
                    return Err(SchemaResolutionError::UnionOfClassesParent {
                        class: class.as_str().to_string(),
                    }
                    .into());
                }
                let is_restriction = graph
                    .objects_for_subject_predicate(b, TYPE)
                    .any(|t| t == TermRef::NamedNode(RESTRICTION));
                if is_restriction {
                    warn!("Ignoring restriction parent of {}", class);
                    continue;
                }
                return Err(SchemaResolutionError::UnsupportedAnonymousNode {
                    context: format!("parents of {}", class),
                }
                .into());
            }
            _ => continue,
        }
    }

    for equivalent in equivalent_classes(graph, class) {
        if visited.contains(&equivalent) {
            continue;
        }
        let theirs = resolve_parents(graph, equivalent.as_ref(), visited)?;
        // an equivalent whose only parent is the universal root adds nothing
        if theirs.len() == 1 && theirs[0].as_ref() == RESOURCE {
            continue;
        }
        parents.extend(theirs);
    }

    if parents.is_empty() && class != THING {
        if class == RESOURCE {
            parents.push(THING.into_owned());
        } else {
            parents.push(RESOURCE.into_owned());
        }
    }

    parents.retain(|p| !is_deprecated(graph, p.as_ref()));
    parents.sort();
    parents.dedup();
    Ok(parents)
}

/// Properties associated to one class: explicit domain, inverse links
/// through the class's position in a range, union domains containing the
/// class, transitive sub-properties of anything found, and equivalence
/// contributions. Deduplicated and sorted.
pub(crate) fn resolve_properties(
    graph: &Graph,
    class: NamedNodeRef,
    visited: &mut HashSet<NamedNode>,
) -> Result<Vec<NamedNode>> {
    visited.insert(class.into_owned());
    let mut found: Vec<NamedNode> = Vec::new();

    for property in declared_properties(graph) {
        let property_ref = property.as_ref();
        // named explicitly in the property's domain
        if graph.contains(TripleRef::new(property_ref, DOMAIN, class)) {
            found.push(property.clone());
        }
        // named in the property's range with a known inverse property
        if graph.contains(TripleRef::new(property_ref, RANGE, class)) {
            for object in graph.objects_for_subject_predicate(property_ref, INVERSE_OF) {
                if let TermRef::NamedNode(n) = object {
                    found.push(n.into_owned());
                }
            }
            for subject in graph.subjects_for_predicate_object(INVERSE_OF, property_ref) {
                if let SubjectRef::NamedNode(n) = subject {
                    found.push(n.into_owned());
                }
            }
        }
        // named in a union-of-classes collection in the property's domain
        for domain in graph.objects_for_subject_predicate(property_ref, DOMAIN) {
            if let TermRef::BlankNode(b) = domain {
                let union = graph.object_for_subject_predicate(b, UNION_OF).ok_or(
                    SchemaResolutionError::UnsupportedAnonymousNode {
                        context: format!("domain of {}", property),
                    },
                )?;
                let members = read_list(graph, union);
                if members
                    .iter()
                    .any(|m| matches!(m, Term::NamedNode(n) if n.as_ref() == class))
                {
                    found.push(property.clone());
                }
            }
        }
    }

    // transitively include declared sub-properties of anything found
    let mut queue: VecDeque<NamedNode> = found.iter().cloned().collect();
    let mut known: HashSet<NamedNode> = found.iter().cloned().collect();
    while let Some(property) = queue.pop_front() {
        for child in graph.subjects_for_predicate_object(SUB_PROPERTY_OF, property.as_ref()) {
            if let SubjectRef::NamedNode(n) = child {
                let child = n.into_owned();
                if known.insert(child.clone()) {
                    found.push(child.clone());
                    queue.push_back(child);
                }
            }
        }
    }

    for equivalent in equivalent_classes(graph, class) {
        if visited.contains(&equivalent) {
            continue;
        }
        found.extend(resolve_properties(graph, equivalent.as_ref(), visited)?);
    }

    found.retain(|p| !is_deprecated(graph, p.as_ref()));
    found.sort();
    found.dedup();
    Ok(found)
}

/// Resolved value constraint of one property: declared ranges, ranges of
/// transitive super-properties, domains of inverse properties, union ranges
/// expanded. rdfs:Literal and coercible XSD datatypes fold into the literal
/// flag; an XSD datatype outside the coercion table fails compilation.
pub(crate) fn resolve_value_types(
    graph: &Graph,
    property: NamedNodeRef,
) -> Result<(Vec<NamedNode>, bool)> {
    let mut range_terms: Vec<Term> = graph
        .objects_for_subject_predicate(property, RANGE)
        .map(Term::from)
        .collect();

    // ranges of every transitive super-property
    let mut queue: VecDeque<NamedNode> = VecDeque::new();
    let mut seen: HashSet<NamedNode> = HashSet::new();
    queue.push_back(property.into_owned());
    while let Some(current) = queue.pop_front() {
        for parent in graph.objects_for_subject_predicate(current.as_ref(), SUB_PROPERTY_OF) {
            if let TermRef::NamedNode(n) = parent {
                let parent = n.into_owned();
                if seen.insert(parent.clone()) {
                    range_terms.extend(
                        graph
                            .objects_for_subject_predicate(parent.as_ref(), RANGE)
                            .map(Term::from),
                    );
                    queue.push_back(parent);
                }
            }
        }
    }

    // domains of inverse properties, either declaration direction
    let mut inverses: Vec<NamedNode> = Vec::new();
    for object in graph.objects_for_subject_predicate(property, INVERSE_OF) {
        if let TermRef::NamedNode(n) = object {
            inverses.push(n.into_owned());
        }
    }
    for subject in graph.subjects_for_predicate_object(INVERSE_OF, property) {
        if let SubjectRef::NamedNode(n) = subject {
            inverses.push(n.into_owned());
        }
    }
    for inverse in inverses {
        range_terms.extend(
            graph
                .objects_for_subject_predicate(inverse.as_ref(), DOMAIN)
                .map(Term::from),
        );
    }

    let mut types: HashSet<NamedNode> = HashSet::new();
    let mut allows_literals = false;
    let mut classify = |node: NamedNodeRef| -> Result<()> {
        if node == LITERAL {
            allows_literals = true;
        } else if node.as_str().starts_with(XSD_PREFIX) {
            if scalar_kind(node.as_str()).is_none() {
                return Err(UnknownDatatypeError {
                    datatype: node.as_str().to_string(),
                }
                .into());
            }
            allows_literals = true;
        } else {
            types.insert(node.into_owned());
        }
        Ok(())
    };

    for term in &range_terms {
        match term {
            Term::NamedNode(n) => classify(n.as_ref())?,
            Term::BlankNode(b) => {
                let union = graph
                    .object_for_subject_predicate(b.as_ref(), UNION_OF)
                    .ok_or(SchemaResolutionError::UnsupportedAnonymousNode {
                        context: format!("range of {}", property),
                    })?;
                for member in read_list(graph, union) {
                    if let Term::NamedNode(n) = member {
                        classify(n.as_ref())?;
                    }
                }
            }
            _ => continue,
        }
    }

    let mut types: Vec<NamedNode> = types.into_iter().collect();
    types.sort();
    Ok((types, allows_literals))
}

/// The concatenated rdfs:comment text of a schema term.
fn comment_text(graph: &Graph, subject: NamedNodeRef) -> String {
    let mut comments: Vec<String> = graph
        .objects_for_subject_predicate(subject, COMMENT)
        .filter_map(|t| match t {
            TermRef::Literal(lit) => Some(lit.value().to_string()),
            _ => None,
        })
        .collect();
    comments.sort();
    comments.join("\n")
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
@prefix vs: <http://www.w3.org/2003/06/sw-vocab-status/ns#> .
@prefix ex: <http://example.org/schema/> .

ex:Agent a owl:Class ; rdfs:comment "An agent." .
ex:Person a owl:Class ; rdfs:subClassOf ex:Agent .
ex:Relic a owl:Class ; vs:term_status "deprecated" .

ex:name a rdf:Property ; rdfs:domain ex:Agent ; rdfs:range rdfs:Literal .
ex:knows a rdf:Property ; rdfs:domain [ owl:unionOf ( ex:Person ex:Agent ) ] ;
    rdfs:range ex:Agent .
ex:nickname a rdf:Property ; rdfs:subPropertyOf ex:name .
"#;

    fn graph() -> Graph {
        TripleCollection::read_str(SCHEMA, RdfFormat::Turtle)
            .unwrap()
            .graph
    }

    #[test]
    fn test_declared_classes_drop_deprecated() {
        let g = graph();
        let classes = declared_classes(&g);
        let names: Vec<&str> = classes.iter().map(|c| c.as_str()).collect();
        assert!(names.contains(&"http://example.org/schema/Agent"));
        assert!(names.contains(&"http://example.org/schema/Person"));
        assert!(!names.contains(&"http://example.org/schema/Relic"));
    }

    #[test]
    fn test_orphan_rule() {
        let g = graph();
        let agent = NamedNodeRef::new("http://example.org/schema/Agent").unwrap();
        let mut visited = HashSet::new();
        let parents = resolve_parents(&g, agent, &mut visited).unwrap();
        assert_eq!(parents, vec![RESOURCE.into_owned()]);
    }

    #[test]
    fn test_union_domain_and_subproperties() {
        let g = graph();
        let person = NamedNodeRef::new("http://example.org/schema/Person").unwrap();
        let mut visited = HashSet::new();
        let props = resolve_properties(&g, person, &mut visited).unwrap();
        let names: Vec<&str> = props.iter().map(|p| p.as_str()).collect();
        // ex:knows through the union domain; nothing else has Person in its domain
        assert!(names.contains(&"http://example.org/schema/knows"));
        assert!(!names.contains(&"http://example.org/schema/name"));

        let agent = NamedNodeRef::new("http://example.org/schema/Agent").unwrap();
        let mut visited = HashSet::new();
        let props = resolve_properties(&g, agent, &mut visited).unwrap();
        let names: Vec<&str> = props.iter().map(|p| p.as_str()).collect();
        // nickname rides in as a sub-property of name
        assert!(names.contains(&"http://example.org/schema/name"));
        assert!(names.contains(&"http://example.org/schema/nickname"));
    }

    #[test]
    fn test_value_types() {
        let g = graph();
        let name = NamedNodeRef::new("http://example.org/schema/name").unwrap();
        let (types, allows) = resolve_value_types(&g, name).unwrap();
        assert!(types.is_empty());
        assert!(allows);

        let knows = NamedNodeRef::new("http://example.org/schema/knows").unwrap();
        let (types, allows) = resolve_value_types(&g, knows).unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].as_str(), "http://example.org/schema/Agent");
        assert!(!allows);

        // sub-properties inherit their parents' ranges
        let nickname = NamedNodeRef::new("http://example.org/schema/nickname").unwrap();
        let (_, allows) = resolve_value_types(&g, nickname).unwrap();
        assert!(allows);
    }

    #[test]
    fn test_unknown_datatype_is_fatal() {
        let schema = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix ex: <http://example.org/schema/> .
ex:blob a rdf:Property ; rdfs:range xsd:base64Binary .
"#;
        let g = TripleCollection::read_str(schema, RdfFormat::Turtle)
            .unwrap()
            .graph;
        let blob = NamedNodeRef::new("http://example.org/schema/blob").unwrap();
        let err = resolve_value_types(&g, blob).unwrap_err();
        assert!(err.downcast_ref::<UnknownDatatypeError>().is_some());
    }

    #[test]
    fn test_union_parent_is_rejected() {
        let schema = r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/schema/> .
ex:A a owl:Class .
ex:B a owl:Class .
ex:C a owl:Class ; rdfs:subClassOf [ owl:unionOf ( ex:A ex:B ) ] .
"#;
        let g = TripleCollection::read_str(schema, RdfFormat::Turtle)
            .unwrap()
            .graph;
        let c = NamedNodeRef::new("http://example.org/schema/C").unwrap();
        let mut visited = HashSet::new();
        let err = resolve_parents(&g, c, &mut visited).unwrap_err();
        match err.downcast_ref::<SchemaResolutionError>() {
            Some(SchemaResolutionError::UnionOfClassesParent { class }) => {
                assert_eq!(class, "http://example.org/schema/C");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_restriction_parent_is_skipped() {
        let schema = r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/schema/> .
ex:A a owl:Class ; rdfs:subClassOf [ a owl:Restriction ] .
"#;
        let g = TripleCollection::read_str(schema, RdfFormat::Turtle)
            .unwrap()
            .graph;
        let a = NamedNodeRef::new("http://example.org/schema/A").unwrap();
        let mut visited = HashSet::new();
        let parents = resolve_parents(&g, a, &mut visited).unwrap();
        // restriction dropped, orphan rule kicks in
        assert_eq!(parents, vec![RESOURCE.into_owned()]);
    }

    #[test]
    fn test_same_as_contributes_parents() {
        let schema = r#"
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix ex: <http://example.org/schema/> .
ex:Base a owl:Class .
ex:A a owl:Class ; rdfs:subClassOf ex:Base .
ex:B a owl:Class ; owl:sameAs ex:A .
"#;
        let g = TripleCollection::read_str(schema, RdfFormat::Turtle)
            .unwrap()
            .graph;
        let b = NamedNodeRef::new("http://example.org/schema/B").unwrap();
        let mut visited = HashSet::new();
        let parents = resolve_parents(&g, b, &mut visited).unwrap();
        let names: Vec<&str> = parents.iter().map(|p| p.as_str()).collect();
        assert!(names.contains(&"http://example.org/schema/Base"));
    }
}
