//! Resource class index.
//!
//! The catalog truncates listings to a default page size, so the resolver
//! first reads the total with a small page, then fetches every class in one
//! page of exactly that size. Any failure here is fatal to the import: a
//! partial index would silently drop classes from created items.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::catalog::CatalogApi;
use crate::errors::{ImportError, Result};
use crate::graph::GroupedSubject;
use crate::rdf::namespaces::RDF_TYPE;
use crate::rdf::PrefixTable;

/// Qualified class term -> catalog class id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassIndex {
    classes: HashMap<String, u64>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, term: impl Into<String>, id: u64) {
        self.classes.insert(term.into(), id);
    }

    pub fn resolve(&self, term: &str) -> Option<u64> {
        self.classes.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<(String, u64)> for ClassIndex {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            classes: iter.into_iter().collect(),
        }
    }
}

/// Class chosen for a subject at creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassChoice {
    /// First `rdf:type` resolved to this catalog class
    Resolved { term: String, id: u64 },
    /// First `rdf:type` has no catalog class
    Unresolved { term: String },
    /// Subject has no `rdf:type`
    Untyped,
}

impl ClassChoice {
    pub fn class_id(&self) -> Option<u64> {
        match self {
            ClassChoice::Resolved { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Pick the class of `subject`. Only the first `rdf:type` object is consulted.
pub fn choose_class(subject: &GroupedSubject, index: &ClassIndex, prefixes: &PrefixTable) -> ClassChoice {
    let Some(first) = subject.objects(RDF_TYPE).first() else {
        return ClassChoice::Untyped;
    };

    let term = prefixes.render(first);
    match index.resolve(&term) {
        Some(id) => ClassChoice::Resolved { term, id },
        None => ClassChoice::Unresolved { term },
    }
}

/// Fetch every resource class of the catalog.
///
/// `count_page_size` is the page size of the first, count-only request.
pub async fn fetch_class_index<C: CatalogApi>(catalog: &C, count_page_size: u32) -> Result<ClassIndex> {
    let first_page = catalog
        .list_resource_classes(count_page_size)
        .await
        .map_err(|e| ImportError::ClassLookup(e.to_string()))?;

    let total = u32::try_from(first_page.total)
        .map_err(|_| ImportError::ClassLookup(format!("implausible class count {}", first_page.total)))?;
    debug!(total, "resource class count");

    let page = if total as usize <= first_page.classes.len() {
        first_page
    } else {
        catalog
            .list_resource_classes(total)
            .await
            .map_err(|e| ImportError::ClassLookup(e.to_string()))?
    };

    if (page.classes.len() as u64) < page.total {
        return Err(ImportError::ClassLookup(format!(
            "catalog returned {} of {} resource classes",
            page.classes.len(),
            page.total
        )));
    }

    let index: ClassIndex = page
        .classes
        .into_iter()
        .map(|class| (class.term, class.id))
        .collect();

    info!(classes = index.len(), "resource class index loaded");
    Ok(index)
}
