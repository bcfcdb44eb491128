//! Defines constant NamedNodeRefs for the RDF terms the schema compiler and
//! the mapper interpret, primarily from the RDF, RDFS, OWL and XSD vocabularies.

use oxigraph::model::NamedNodeRef;

pub const TYPE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
pub const PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#Property");
pub const FIRST: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#first");
pub const REST: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#rest");
pub const NIL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#nil");

// rdfs
pub const CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Class");
pub const SUB_CLASS_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subClassOf");
pub const SUB_PROPERTY_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subPropertyOf");
pub const DOMAIN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#domain");
pub const RANGE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#range");
pub const COMMENT: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#comment");
pub const LITERAL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Literal");
pub const RESOURCE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Resource");

// owl
pub const OWL_CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
pub const THING: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");
pub const UNION_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#unionOf");
pub const RESTRICTION: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Restriction");
pub const INVERSE_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#inverseOf");
pub const SAME_AS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#sameAs");

// sw-vocab-status; terms marked "deprecated" are dropped during compilation
pub const TERM_STATUS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2003/06/sw-vocab-status/ns#term_status");

pub const XSD_PREFIX: &str = "http://www.w3.org/2001/XMLSchema#";

/// Prefix bindings every collection starts from. Schema and data documents
/// routinely lose their prefix declarations on load, so these are bound up
/// front and callers add the rest explicitly.
pub const WELL_KNOWN_PREFIXES: [(&str, &str); 6] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
];

/// URI scheme marking entities without a stable external identity.
pub const ANON_PREFIX: &str = "anon:";

/// True if the URI names an anonymous entity rather than a stable resource.
pub fn is_anonymous_uri(uri: &str) -> bool {
    uri.starts_with(ANON_PREFIX)
}

/// Anonymous URI derived from a blank-node label, stable within one import.
pub fn anonymous_uri_from_label(label: &str) -> String {
    format!("{}{}", ANON_PREFIX, label)
}

/// Freshly generated anonymous URI carrying a random 64-bit token.
pub fn fresh_anonymous_uri() -> String {
    format!("{}{:016x}", ANON_PREFIX, rand::random::<u64>())
}

/// Splits a URI into (namespace, local name) at the fragment or last path
/// separator, mirroring how qnames are formed.
pub fn split_uri(uri: &str) -> (&str, &str) {
    if let Some(idx) = uri.rfind('#') {
        uri.split_at(idx + 1)
    } else if let Some(idx) = uri.rfind('/') {
        uri.split_at(idx + 1)
    } else {
        ("", uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_uri() {
        assert_eq!(
            split_uri("http://purl.org/ontology/mo/MusicArtist"),
            ("http://purl.org/ontology/mo/", "MusicArtist")
        );
        assert_eq!(
            split_uri("http://xmlns.com/foaf/0.1/#name"),
            ("http://xmlns.com/foaf/0.1/#", "name")
        );
        assert_eq!(split_uri("name"), ("", "name"));
    }

    #[test]
    fn test_anonymous_uris() {
        let fresh = fresh_anonymous_uri();
        assert!(is_anonymous_uri(&fresh));
        assert_eq!(fresh.len(), ANON_PREFIX.len() + 16);
        assert_eq!(anonymous_uri_from_label("b0"), "anon:b0");
        assert!(!is_anonymous_uri("http://example.org/a"));
    }
}
