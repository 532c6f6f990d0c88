//! # crm-import - CIDOC-CRM to Omeka S importer
//!
//! Reads an RDF/XML document describing cultural-heritage objects in
//! CIDOC-CRM terms and materializes it as linked items of an Omeka S
//! catalog through the catalog's HTTP resource API.
//!
//! ## Pipeline
//!
//! ```text
//! RDF/XML ──► triples ──► SubjectTable ──► pass one: create ──► pass two: patch
//!                              ▲               (remote ids)       (resource links)
//!                    ClassIndex (catalog classes)
//! ```
//!
//! Pass one gives every data subject a catalog id. Pass two sends each
//! subject's properties; an object that is itself a subject of the same
//! document becomes a link to that subject's item rather than a bare IRI.

pub mod errors;
pub mod config;
pub mod rdf;
pub mod graph;
pub mod catalog;
pub mod classes;
pub mod classify;
pub mod materialize;
pub mod diagnostics;
pub mod import;

pub use errors::{ImportError, Result};
pub use config::{ConfigState, FailurePolicy, ImportConfig, UnresolvedClassPolicy};
pub use rdf::PrefixTable;
pub use graph::{group_triples, GroupedSubject, SubjectTable, Term, Triple};
pub use catalog::{CatalogApi, ClassAssignment, HttpCatalog, PropertyBag, ValueDescriptor};
pub use classes::{fetch_class_index, ClassIndex};
pub use materialize::{CommittedTable, ImportReport, MaterializeOptions, Materializer, Phase};
pub use diagnostics::Diagnostics;
pub use import::run_import;

/// Importer version reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
