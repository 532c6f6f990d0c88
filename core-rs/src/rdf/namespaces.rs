//! Namespace bindings and namespace-qualified rendering of graph terms.
//!
//! Qualified names (`rdf:type`, `crm:P1_is_identified_by`) are the property
//! keys of outgoing payloads and the lookup keys of the class index, so the
//! rendering must be stable: the longest bound namespace wins, and an IRI whose
//! remainder is not a valid local name is kept in `<...>` form.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::Term;

/// RDF namespace
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// RDF Schema namespace
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// XML Schema namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// OWL namespace
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

/// Dublin Core elements namespace
pub const DC: &str = "http://purl.org/dc/elements/1.1/";

/// Dublin Core terms namespace
pub const DCTERMS: &str = "http://purl.org/dc/terms/";

/// SKOS namespace
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";

/// FOAF namespace
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";

/// CIDOC-CRM namespace
pub const CRM: &str = "http://www.cidoc-crm.org/cidoc-crm/";

/// Qualified name of the type predicate
pub const RDF_TYPE: &str = "rdf:type";

/// Qualified name of the label predicate
pub const RDFS_LABEL: &str = "rdfs:label";

/// Qualified name of the catalog's title property
pub const DCTERMS_TITLE: &str = "dcterms:title";

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

static LOCAL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]([A-Za-z0-9_.\-]*[A-Za-z0-9_\-])?$").expect("valid local name pattern")
});

/// Prefix -> namespace bindings
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    bindings: Vec<(String, String)>,
}

impl PrefixTable {
    /// Empty table; every IRI renders as `<iri>`
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the common vocabularies plus `crm`
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (prefix, namespace) in [
            ("rdf", RDF),
            ("rdfs", RDFS),
            ("xsd", XSD),
            ("owl", OWL),
            ("dc", DC),
            ("dcterms", DCTERMS),
            ("skos", SKOS),
            ("foaf", FOAF),
            ("crm", CRM),
        ] {
            table.bind(prefix, namespace);
        }
        table
    }

    /// Bind `prefix` to `namespace`, replacing an earlier binding of the same prefix
    pub fn bind(&mut self, prefix: &str, namespace: &str) {
        match self.bindings.iter_mut().find(|(p, _)| p == prefix) {
            Some(binding) => binding.1 = namespace.to_string(),
            None => self
                .bindings
                .push((prefix.to_string(), namespace.to_string())),
        }
    }

    /// Bind a prefix declared by an input document.
    ///
    /// The default namespace (empty prefix) and namespaces that already have
    /// a prefix are ignored, so catalog terms such as `crm:E5_Event` keep
    /// their prefix. Returns whether the binding was added.
    pub fn bind_declared(&mut self, prefix: &str, namespace: &str) -> bool {
        if prefix.is_empty() || self.bindings.iter().any(|(_, ns)| ns == namespace) {
            return false;
        }
        self.bind(prefix, namespace);
        true
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// `prefix:local` for `iri`, if some binding covers it
    pub fn shorten(&self, iri: &str) -> Option<String> {
        self.bindings
            .iter()
            .filter_map(|(prefix, namespace)| {
                let local = iri.strip_prefix(namespace.as_str())?;
                LOCAL_NAME
                    .is_match(local)
                    .then_some((namespace.len(), prefix, local))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, prefix, local)| format!("{}:{}", prefix, local))
    }

    /// Qualified name of `iri`, falling back to `<iri>`
    pub fn qualify(&self, iri: &str) -> String {
        self.shorten(iri).unwrap_or_else(|| format!("<{}>", iri))
    }

    /// Compact textual form of any term
    pub fn render(&self, term: &Term) -> String {
        match term {
            Term::Iri(iri) => self.qualify(iri),
            Term::Blank(id) => format!("_:{}", id),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                let quoted = format!("{:?}", value);
                match (language, datatype) {
                    (Some(lang), _) => format!("{}@{}", quoted, lang),
                    (None, Some(dt)) if dt != XSD_STRING => {
                        format!("{}^^{}", quoted, self.qualify(dt))
                    }
                    _ => quoted,
                }
            }
        }
    }
}
