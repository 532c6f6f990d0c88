//! Graph model for the importer
//!
//! - `Term` / `Triple`: the parsed RDF statements, owned and immutable
//! - `SubjectTable`: triples grouped by subject (see `grouper`)

mod grouper;

pub use grouper::{group_triples, GroupedSubject, PredicateValues, SubjectTable};

use std::borrow::Cow;

/// Node or value in a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(String),
    /// Blank node label without the `_:` marker
    Blank(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Plain literal with no datatype or language
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Identity under which a node is grouped as a subject.
    /// Literals can never be subjects.
    pub fn node_key(&self) -> Option<Cow<'_, str>> {
        match self {
            Term::Iri(iri) => Some(Cow::Borrowed(iri)),
            Term::Blank(id) => Some(Cow::Owned(format!("_:{}", id))),
            Term::Literal { .. } => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }
}

/// A single (subject, predicate, object) statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: Term,
    /// Full predicate IRI
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}
