//! RDF/XML input.
//!
//! Parses a serialized document with oxigraph's streaming parser and flattens
//! the quads into owned `Triple`s in document order. Graph names are dropped.
//! The `xmlns:` prefixes the document declares are kept alongside, so
//! qualified names can use the document's own vocabulary prefixes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Quad, Subject, Term as OxTerm};
use tracing::debug;

use crate::errors::{ImportError, Result};
use crate::graph::{Term, Triple};

const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// Parsed input document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RdfDocument {
    pub triples: Vec<Triple>,
    /// Declared (prefix, namespace) pairs, first declaration of a prefix wins
    pub prefixes: Vec<(String, String)>,
}

impl RdfDocument {
    fn declare(&mut self, prefix: &str, namespace: &str) {
        if !self.prefixes.iter().any(|(p, _)| p == prefix) {
            self.prefixes.push((prefix.to_string(), namespace.to_string()));
        }
    }
}

/// Read the RDF/XML file at `path`.
///
/// Relative IRIs resolve against the file's own `file://` URL.
pub fn read_rdf_xml<P: AsRef<Path>>(path: P) -> Result<RdfDocument> {
    let path = path.as_ref();
    let absolute = std::fs::canonicalize(path)?;
    let base = format!("file://{}", absolute.display());

    let file = File::open(&absolute)?;
    let document = parse_rdf_xml(BufReader::new(file), Some(&base))?;

    debug!(
        path = %path.display(),
        triples = document.triples.len(),
        prefixes = document.prefixes.len(),
        "parsed RDF/XML input"
    );
    Ok(document)
}

/// Parse RDF/XML from any reader
pub fn parse_rdf_xml<R: Read>(reader: R, base: Option<&str>) -> Result<RdfDocument> {
    let mut parser = RdfParser::from_format(RdfFormat::RdfXml);

    if let Some(base_iri) = base {
        parser = parser
            .with_base_iri(base_iri)
            .map_err(|e| ImportError::RdfParse(format!("Invalid base IRI: {}", e)))?;
    }

    let mut quads = parser.for_reader(reader);
    let mut document = RdfDocument::default();

    while let Some(quad) = quads.next() {
        let quad = quad.map_err(|e| ImportError::RdfParse(e.to_string()))?;
        document.triples.push(convert_quad(quad)?);

        // declarations leave scope with their element
        for (prefix, namespace) in quads.prefixes() {
            document.declare(prefix, namespace);
        }
    }

    Ok(document)
}

fn convert_quad(quad: Quad) -> Result<Triple> {
    let subject = match quad.subject {
        Subject::NamedNode(node) => Term::Iri(node.into_string()),
        Subject::BlankNode(node) => Term::Blank(node.into_string()),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(ImportError::RdfParse(
                "quoted triples are not supported as subjects".to_string(),
            ))
        }
    };

    let object = match quad.object {
        OxTerm::NamedNode(node) => Term::Iri(node.into_string()),
        OxTerm::BlankNode(node) => Term::Blank(node.into_string()),
        OxTerm::Literal(literal) => {
            let language = literal.language().map(str::to_string);
            let datatype = literal.datatype().as_str();
            Term::Literal {
                value: literal.value().to_string(),
                datatype: (datatype != RDF_LANG_STRING).then(|| datatype.to_string()),
                language,
            }
        }
        #[allow(unreachable_patterns)]
        _ => {
            return Err(ImportError::RdfParse(
                "quoted triples are not supported as objects".to_string(),
            ))
        }
    };

    Ok(Triple::new(subject, quad.predicate.into_string(), object))
}
