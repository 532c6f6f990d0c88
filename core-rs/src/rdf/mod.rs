//! RDF input and namespace handling
//!
//! - `reader`: RDF/XML document -> triples plus declared prefixes
//! - `namespaces`: prefix table used to render qualified names

pub mod namespaces;
mod reader;

pub use namespaces::PrefixTable;
pub use reader::{parse_rdf_xml, read_rdf_xml, RdfDocument};
