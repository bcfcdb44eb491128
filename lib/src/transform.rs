//! Graph rewrites applied before mapping. The import pipeline only reasons
//! about named resources, so every blank node is stabilized to a synthetic
//! named identifier first.

use oxigraph::model::{Graph, NamedNode, Subject, SubjectRef, Term, TermRef, Triple};

use crate::consts::anonymous_uri_from_label;

/// Rewrites every blank subject and object, in place, to a named node under
/// the anonymous URI scheme. The label is reused, so the rewrite is stable
/// within one collection. Must run before any identity comparison.
pub fn stabilize_blank_nodes(graph: &mut Graph) {
    let mut to_remove: Vec<Triple> = vec![];
    let mut to_add: Vec<Triple> = vec![];
    for triple in graph.iter() {
        let mut rewritten = false;
        let subject: Subject = match triple.subject {
            SubjectRef::BlankNode(b) => {
                rewritten = true;
                Subject::NamedNode(NamedNode::new_unchecked(anonymous_uri_from_label(
                    b.as_str(),
                )))
            }
            s => s.into_owned(),
        };
        let object: Term = match triple.object {
            TermRef::BlankNode(b) => {
                rewritten = true;
                Term::NamedNode(NamedNode::new_unchecked(anonymous_uri_from_label(
                    b.as_str(),
                )))
            }
            o => o.into_owned(),
        };
        if rewritten {
            to_remove.push(triple.into());
            to_add.push(Triple::new(subject, triple.predicate.into_owned(), object));
        }
    }
    // apply all changes
    for triple in to_remove {
        graph.remove(triple.as_ref());
    }
    for triple in to_add {
        graph.insert(triple.as_ref());
    }
}
