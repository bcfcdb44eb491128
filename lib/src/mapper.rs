//! The pipelines between triple collections and typed object populations:
//! import (triples → ObjectGraph) and export (ObjectGraph → triples), both
//! driven by a compiled TypeRegistry.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use log::{error, info, warn};
use oxigraph::model::{
    BlankNode, Graph, Literal, LiteralRef, NamedNode, Subject, SubjectRef, Term, TermRef, TripleRef,
};

use crate::consts::{is_anonymous_uri, RESOURCE, TYPE};
use crate::entity::Entity;
use crate::errors::{ExportError, ImportError};
use crate::graph::ObjectGraph;
use crate::options::Strictness;
use crate::property::PropertyValue;
use crate::registry::TypeRegistry;
use crate::schema::{scalar_kind, ScalarKind};
use crate::transform::stabilize_blank_nodes;
use crate::util::TripleCollection;

/// Imports a triple collection into an object graph.
///
/// In strict mode any subject, property or value the registry cannot model
/// fails the import; in lenient mode the offending triple or subject is
/// logged and skipped.
pub fn import_collection(
    collection: &TripleCollection,
    registry: &TypeRegistry,
    strictness: Strictness,
) -> Result<ObjectGraph> {
    let mut graph = collection.graph.clone();
    stabilize_blank_nodes(&mut graph);

    let mut subjects: Vec<NamedNode> = graph
        .iter()
        .filter_map(|t| match t.subject {
            SubjectRef::NamedNode(n) => Some(n.into_owned()),
            _ => None,
        })
        .collect::<HashSet<NamedNode>>()
        .into_iter()
        .collect();
    subjects.sort();

    // instantiate an entity per typed subject
    let mut entities: HashMap<String, Entity> = HashMap::new();
    for subject in &subjects {
        let mut types: Vec<NamedNode> = graph
            .objects_for_subject_predicate(subject.as_ref(), TYPE)
            .filter_map(|t| match t {
                TermRef::NamedNode(n) => Some(n.into_owned()),
                _ => None,
            })
            .collect();
        types.sort();
        if types.is_empty() {
            if strictness.is_strict() {
                return Err(ImportError {
                    message: format!("No type specified for {}", subject),
                }
                .into());
            }
            error!("No type specified for {}; ignoring", subject);
            continue;
        }
        match types.iter().find(|t| registry.class(t.as_ref()).is_some()) {
            Some(class) => {
                let entity = Entity::new(registry, class.as_ref(), Some(subject.as_str()))?;
                entities.insert(subject.as_str().to_string(), entity);
            }
            None => {
                if strictness.is_strict() {
                    return Err(ImportError {
                        message: format!(
                            "No class to model type {} of URI {}",
                            types[0], subject
                        ),
                    }
                    .into());
                }
                error!(
                    "No class to model type {} of URI {}; ignoring",
                    types[0], subject
                );
                continue;
            }
        }
    }

    // assign property values
    for subject in &subjects {
        if !entities.contains_key(subject.as_str()) {
            continue;
        }
        for triple in graph.triples_for_subject(subject.as_ref()) {
            if triple.predicate == TYPE {
                continue;
            }
            // the predicate must resolve to a property on the subject's class
            let prop_name: Option<String> = entities[subject.as_str()]
                .props()
                .iter()
                .find(|(_, set)| set.property_uri().as_ref() == triple.predicate)
                .map(|(name, _)| name.clone());
            let prop_name = match prop_name {
                Some(name) => name,
                None => {
                    if strictness.is_strict() {
                        return Err(ImportError {
                            message: format!(
                                "No property to model {} in class {}",
                                triple.predicate,
                                entities[subject.as_str()].class_uri()
                            ),
                        }
                        .into());
                    }
                    error!(
                        "No property to model {} in class {}; ignoring",
                        triple.predicate,
                        entities[subject.as_str()].class_uri()
                    );
                    continue;
                }
            };

            let (value, value_class) = match triple.object {
                TermRef::NamedNode(object) => {
                    let class = resolve_reference(object.into_owned(), &mut entities, registry)?;
                    (PropertyValue::Ref(object.as_str().to_string()), Some(class))
                }
                TermRef::Literal(lit) => match coerce_literal(lit) {
                    Ok(value) => (value, None),
                    Err(err) => {
                        if strictness.is_strict() {
                            return Err(err.into());
                        }
                        warn!("{}; ignoring", err);
                        continue;
                    }
                },
                other => {
                    if strictness.is_strict() {
                        return Err(ImportError {
                            message: format!(
                                "Object {} of {} is neither a resource nor a literal",
                                other, subject
                            ),
                        }
                        .into());
                    }
                    error!(
                        "Object {} of {} is neither a resource nor a literal; ignoring",
                        other, subject
                    );
                    continue;
                }
            };

            let entity = entities.get_mut(subject.as_str()).unwrap();
            if let Err(err) = entity
                .prop_mut(&prop_name)?
                .insert(value, value_class.as_ref(), registry)
            {
                if strictness.is_strict() {
                    return Err(ImportError {
                        message: format!("Cannot add value to {}: {}", subject, err),
                    }
                    .into());
                }
                warn!("Cannot add value to {}: {}; ignoring", subject, err);
            }
        }
    }

    // collect everything into one object graph, merging as needed; when an
    // anonymous entity turns out to alias an earlier one, entities still
    // waiting to be added must have their references redirected too
    let mut object_graph = ObjectGraph::new();
    object_graph.merge_namespaces(registry.namespaces());
    let mut aliases: HashMap<String, String> = HashMap::new();
    let mut uris: Vec<String> = entities.keys().cloned().collect();
    uris.sort();
    for uri in uris {
        let mut entity = entities.remove(&uri).unwrap();
        for (alias, canonical) in &aliases {
            for set in entity.props_mut().values_mut() {
                set.rewrite_ref(alias, canonical);
            }
        }
        let canonical = object_graph.add(entity, None, registry)?;
        if canonical != uri {
            aliases.insert(uri, canonical);
        }
    }
    object_graph.merge_namespaces(collection.namespaces());
    Ok(object_graph)
}

/// The class of a reference object, instantiating the referent if needed:
/// an already-imported subject, a schema-declared instance, or failing
/// those a placeholder resource.
fn resolve_reference(
    object: NamedNode,
    entities: &mut HashMap<String, Entity>,
    registry: &TypeRegistry,
) -> Result<NamedNode> {
    if let Some(entity) = entities.get(object.as_str()) {
        return Ok(entity.class_uri().clone());
    }
    if let Some(class) = registry.instance_class(object.as_ref()) {
        let class = class.clone();
        let entity = Entity::new(registry, class.as_ref(), Some(object.as_str()))?;
        entities.insert(object.as_str().to_string(), entity);
        return Ok(class);
    }
    warn!(
        "Unknown URI {} used as an object; modelling it as a plain resource",
        object
    );
    let placeholder = Entity::new(registry, RESOURCE, Some(object.as_str()))?;
    entities.insert(object.as_str().to_string(), placeholder);
    Ok(RESOURCE.into_owned())
}

/// Coerces a literal through the fixed datatype table. Datatypes outside
/// the table are carried as strings.
fn coerce_literal(lit: LiteralRef) -> Result<PropertyValue, ImportError> {
    match scalar_kind(lit.datatype().as_str()) {
        Some(ScalarKind::Int) => lit
            .value()
            .parse::<i64>()
            .map(PropertyValue::Int)
            .map_err(|e| ImportError {
                message: format!("Cannot coerce literal {} to an integer: {}", lit.value(), e),
            }),
        Some(ScalarKind::Float) => lit
            .value()
            .parse::<f64>()
            .map(PropertyValue::Float)
            .map_err(|e| ImportError {
                message: format!("Cannot coerce literal {} to a float: {}", lit.value(), e),
            }),
        Some(ScalarKind::Str) | None => Ok(PropertyValue::Str(lit.value().to_string())),
    }
}

/// Exports an object graph back to triples. Every entity's class and every
/// populated property must be part of the compiled schema; data outside it
/// cannot be serialized.
pub fn export_graph(
    object_graph: &ObjectGraph,
    registry: &TypeRegistry,
) -> Result<TripleCollection> {
    let mut graph = Graph::new();

    let mut uris: Vec<&String> = object_graph.entities().keys().collect();
    uris.sort();

    // allocate a fresh graph node for every anonymous identity, including
    // ones that only appear as property values
    let mut bnodes: HashMap<String, BlankNode> = HashMap::new();
    for uri in &uris {
        let entity = &object_graph.entities()[*uri];
        if entity.is_anonymous() {
            bnodes.entry((*uri).clone()).or_default();
        }
        for set in entity.props().values() {
            for value in set.iter() {
                if let Some(ref_uri) = value.as_ref_uri() {
                    if is_anonymous_uri(ref_uri) {
                        bnodes.entry(ref_uri.to_string()).or_default();
                    }
                }
            }
        }
    }

    for uri in uris {
        let entity = &object_graph.entities()[uri];
        if registry.class(entity.class_uri().as_ref()).is_none() {
            return Err(ExportError {
                message: format!(
                    "Entity {} has class {} which is not in the compiled schema",
                    uri,
                    entity.class_uri()
                ),
            }
            .into());
        }
        let subject = subject_node(uri, &bnodes)?;
        graph.insert(TripleRef::new(
            subject.as_ref(),
            TYPE,
            entity.class_uri().as_ref(),
        ));

        let mut names: Vec<&String> = entity.props().keys().collect();
        names.sort();
        for name in names {
            let set = &entity.props()[name];
            if set.is_empty() {
                continue;
            }
            if registry.property(set.property_uri().as_ref()).is_none() {
                return Err(ExportError {
                    message: format!(
                        "Property {} on entity {} is not in the compiled schema",
                        set.property_uri(),
                        uri
                    ),
                }
                .into());
            }
            for value in set.iter() {
                let object: Term = match value {
                    PropertyValue::Str(s) => Literal::from(s.as_str()).into(),
                    PropertyValue::Int(i) => Literal::from(*i).into(),
                    PropertyValue::Float(x) => Literal::from(*x).into(),
                    PropertyValue::Ref(ref_uri) => term_node(ref_uri, &bnodes)?,
                };
                graph.insert(TripleRef::new(
                    subject.as_ref(),
                    set.property_uri().as_ref(),
                    object.as_ref(),
                ));
            }
        }
        info!("Added {} @ {}", entity.short_name(), uri);
    }

    let mut collection = TripleCollection::from_graph(graph);
    for (prefix, base) in object_graph.namespaces() {
        collection.bind(prefix, base);
    }
    Ok(collection)
}

fn subject_node(uri: &str, bnodes: &HashMap<String, BlankNode>) -> Result<Subject> {
    if let Some(bnode) = bnodes.get(uri) {
        return Ok(Subject::BlankNode(bnode.clone()));
    }
    Ok(Subject::NamedNode(NamedNode::new(uri)?))
}

fn term_node(uri: &str, bnodes: &HashMap<String, BlankNode>) -> Result<Term> {
    if let Some(bnode) = bnodes.get(uri) {
        return Ok(Term::BlankNode(bnode.clone()));
    }
    Ok(Term::NamedNode(NamedNode::new(uri)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::io::RdfFormat;

    const SCHEMA: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix ex: <http://example.org/schema/> .

ex:Track a owl:Class .
ex:title a rdf:Property ; rdfs:domain ex:Track ; rdfs:range rdfs:Literal .
ex:track_number a rdf:Property ; rdfs:domain ex:Track ; rdfs:range xsd:int .
"#;

    fn registry() -> TypeRegistry {
        let collection = TripleCollection::read_str(SCHEMA, RdfFormat::Turtle).unwrap();
        TypeRegistry::compile(&collection).unwrap()
    }

    #[test]
    fn test_literal_coercion() {
        let reg = registry();
        let data = r#"
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix ex: <http://example.org/schema/> .
<http://example.org/t1> a ex:Track ;
    ex:title "Worlds on Heroin" ;
    ex:track_number "1"^^xsd:int .
"#;
        let collection = TripleCollection::read_str(data, RdfFormat::Turtle).unwrap();
        let graph = import_collection(&collection, &reg, Strictness::Strict).unwrap();
        let track = graph.get("http://example.org/t1").unwrap();
        assert!(track
            .prop("title")
            .unwrap()
            .contains(&PropertyValue::from("Worlds on Heroin")));
        assert!(track
            .prop("track_number")
            .unwrap()
            .contains(&PropertyValue::from(1i64)));
    }

    #[test]
    fn test_missing_type_strictness() {
        let reg = registry();
        let data = r#"
@prefix ex: <http://example.org/schema/> .
<http://example.org/t1> ex:title "No type" .
"#;
        let collection = TripleCollection::read_str(data, RdfFormat::Turtle).unwrap();
        let err = import_collection(&collection, &reg, Strictness::Strict).unwrap_err();
        assert!(err.downcast_ref::<ImportError>().is_some());

        let graph = import_collection(&collection, &reg, Strictness::Lenient).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_unknown_property_strictness() {
        let reg = registry();
        let data = r#"
@prefix ex: <http://example.org/schema/> .
<http://example.org/t1> a ex:Track ; ex:color "red" .
"#;
        let collection = TripleCollection::read_str(data, RdfFormat::Turtle).unwrap();
        let err = import_collection(&collection, &reg, Strictness::Strict).unwrap_err();
        assert!(err.downcast_ref::<ImportError>().is_some());

        let graph = import_collection(&collection, &reg, Strictness::Lenient).unwrap();
        let track = graph.get("http://example.org/t1").unwrap();
        assert!(track.prop("title").unwrap().is_empty());
    }

    #[test]
    fn test_export_rejects_unknown_property() {
        let reg = registry();
        // a registry compiled from a wider schema than this export target
        let wide_schema = format!(
            "{}\nex:bonus a rdf:Property ; rdfs:domain ex:Track ; rdfs:range rdfs:Literal .",
            SCHEMA
        );
        let wide = TypeRegistry::compile(
            &TripleCollection::read_str(&wide_schema, RdfFormat::Turtle).unwrap(),
        )
        .unwrap();
        let mut entity = Entity::new(
            &wide,
            NamedNode::new("http://example.org/schema/Track").unwrap().as_ref(),
            Some("http://example.org/t1"),
        )
        .unwrap();
        entity.set_scalar("bonus", "x", &wide).unwrap();
        let mut graph = ObjectGraph::new();
        graph.add(entity, None, &wide).unwrap();
        let err = export_graph(&graph, &reg).unwrap_err();
        assert!(err.downcast_ref::<ExportError>().is_some());
    }
}
