//! The triple-source boundary: reading, holding and serializing collections
//! of triples through oxigraph. The rest of the crate never touches a
//! concrete RDF syntax.

use anyhow::Result;

use std::collections::HashMap;
use std::path::Path;

use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::graph::Graph as OxigraphGraph;
use oxigraph::model::Triple;

use std::io::BufReader;

use log::debug;

use crate::consts::WELL_KNOWN_PREFIXES;

/// A set of triples plus the namespace-prefix bindings that travel with it.
///
/// Prefix declarations routinely get lost between documents, so every
/// collection starts from the well-known bindings and callers `bind` the
/// rest explicitly. The serializers do not re-emit prefixes; bindings are
/// carried as data for downstream consumers.
#[derive(Debug, Clone)]
pub struct TripleCollection {
    pub graph: OxigraphGraph,
    namespaces: HashMap<String, String>,
}

impl Default for TripleCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl TripleCollection {
    pub fn new() -> Self {
        Self::from_graph(OxigraphGraph::new())
    }

    pub fn from_graph(graph: OxigraphGraph) -> Self {
        let namespaces = WELL_KNOWN_PREFIXES
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect();
        TripleCollection { graph, namespaces }
    }

    /// Reads a collection from a file, picking the format from the extension
    /// and defaulting to Turtle.
    pub fn read_file(file: &Path) -> Result<Self> {
        debug!("Reading file: {}", file.display());
        let format = format_for_extension(file.extension().and_then(|ext| ext.to_str()));
        let handle = std::fs::File::open(file)?;
        let content: BufReader<_> = BufReader::new(handle);
        let mut graph = OxigraphGraph::new();
        let parser = RdfParser::from_format(format).for_reader(content);
        for quad in parser {
            let quad = quad?;
            let triple = Triple::new(quad.subject, quad.predicate, quad.object);
            graph.insert(&triple);
        }
        Ok(Self::from_graph(graph))
    }

    /// Parses a collection from an in-memory document.
    pub fn read_str(data: &str, format: RdfFormat) -> Result<Self> {
        let mut graph = OxigraphGraph::new();
        let parser = RdfParser::from_format(format).for_reader(data.as_bytes());
        for quad in parser {
            let quad = quad?;
            let triple = Triple::new(quad.subject, quad.predicate, quad.object);
            graph.insert(&triple);
        }
        Ok(Self::from_graph(graph))
    }

    /// Binds a namespace prefix, replacing any previous binding of the same
    /// prefix.
    pub fn bind(&mut self, prefix: &str, base: &str) {
        self.namespaces.insert(prefix.to_string(), base.to_string());
    }

    pub fn namespaces(&self) -> &HashMap<String, String> {
        &self.namespaces
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Unions another collection into this one. Existing prefix bindings win
    /// on conflict.
    pub fn extend(&mut self, other: &TripleCollection) {
        for triple in other.graph.iter() {
            self.graph.insert(triple);
        }
        for (prefix, base) in other.namespaces.iter() {
            self.namespaces
                .entry(prefix.clone())
                .or_insert_with(|| base.clone());
        }
    }

    /// Serializes the collection to bytes in the given format.
    pub fn serialize(&self, format: RdfFormat) -> Result<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        let mut serializer = RdfSerializer::from_format(format).for_writer(&mut out);
        for triple in self.graph.iter() {
            serializer.serialize_triple(triple)?;
        }
        serializer.finish()?;
        Ok(out)
    }

    /// Writes the collection to a file, picking the format from the extension.
    pub fn write_file(&self, file: &Path) -> Result<()> {
        debug!(
            "Writing collection to file: {} with length {}",
            file.display(),
            self.graph.len()
        );
        let format = format_for_extension(file.extension().and_then(|ext| ext.to_str()));
        let bytes = self.serialize(format)?;
        std::fs::write(file, bytes)?;
        Ok(())
    }
}

fn format_for_extension(ext: Option<&str>) -> RdfFormat {
    let format = ext.and_then(|ext| match ext {
        "ttl" => Some(RdfFormat::Turtle),
        "xml" => Some(RdfFormat::RdfXml),
        "n3" => Some(RdfFormat::Turtle),
        "nt" => Some(RdfFormat::NTriples),
        _ => None,
    });
    format.unwrap_or(RdfFormat::Turtle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    const MODEL: &str = r#"
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
<http://example.org/a> rdf:type foaf:Person .
<http://example.org/a> foaf:name "A" .
"#;

    #[test]
    fn test_read_str() {
        let c = TripleCollection::read_str(MODEL, RdfFormat::Turtle).unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.namespaces().contains_key("rdf"));
    }

    #[test]
    fn test_bind_and_extend() {
        let mut a = TripleCollection::read_str(MODEL, RdfFormat::Turtle).unwrap();
        a.bind("mo", "http://purl.org/ontology/mo/");
        let mut b = TripleCollection::new();
        b.bind("mo", "http://example.org/other/");
        b.extend(&a);
        // existing binding wins
        assert_eq!(
            b.namespaces().get("mo").map(String::as_str),
            Some("http://example.org/other/")
        );
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_serialize_round_trip() {
        let c = TripleCollection::read_str(MODEL, RdfFormat::Turtle).unwrap();
        let bytes = c.serialize(RdfFormat::NTriples).unwrap();
        let back =
            TripleCollection::read_str(std::str::from_utf8(&bytes).unwrap(), RdfFormat::NTriples)
                .unwrap();
        assert_eq!(back.graph, c.graph);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new("ontomap").unwrap();
        let path = dir.path().join("model.ttl");
        let c = TripleCollection::read_str(MODEL, RdfFormat::Turtle).unwrap();
        c.write_file(&path).unwrap();
        let back = TripleCollection::read_file(&path).unwrap();
        assert_eq!(back.graph, c.graph);

        // reading a non-existent file should return an error
        let result = TripleCollection::read_file(Path::new("fixtures/non-existent.ttl"));
        assert!(result.is_err());
    }
}
