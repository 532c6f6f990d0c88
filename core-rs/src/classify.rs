//! Object value classification for patch payloads.
//!
//! An object that names a subject of the current import becomes a resource
//! link to that subject's catalog item. Other IRIs stay external `uri`
//! values and everything else is a literal.
//!
//! A subject with no remote id (its create failed, or it was never created)
//! cannot be linked; its references fall back to the plain IRI and are
//! flagged as degraded so the caller can report them.

use crate::catalog::{PropertyBag, ValueDescriptor};
use crate::graph::{SubjectTable, Term};

/// Descriptor chosen for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub descriptor: ValueDescriptor,
    /// Object is an import-local subject that has no remote id
    pub degraded: bool,
}

impl Classified {
    fn exact(descriptor: ValueDescriptor) -> Self {
        Self {
            descriptor,
            degraded: false,
        }
    }
}

/// Decide the descriptor for `object`
pub fn classify(object: &Term, subjects: &SubjectTable) -> Classified {
    let known = object
        .node_key()
        .and_then(|key| subjects.get(&key).map(|subject| subject.remote_id()));

    match (known, object) {
        (Some(Some(remote_id)), _) => Classified::exact(ValueDescriptor::Resource(remote_id)),
        (known, Term::Iri(iri)) => Classified {
            descriptor: ValueDescriptor::Uri(iri.clone()),
            degraded: known.is_some(),
        },
        (known, Term::Blank(id)) => Classified {
            descriptor: ValueDescriptor::Literal(format!("_:{}", id)),
            degraded: known.is_some(),
        },
        (_, Term::Literal { value, .. }) => Classified::exact(ValueDescriptor::Literal(value.clone())),
    }
}

/// Append the descriptor for `object` to `property` in `bag`.
///
/// Returns the classification so callers can account for degraded links.
pub fn append_value(bag: &mut PropertyBag, property: &str, object: &Term, subjects: &SubjectTable) -> Classified {
    let classified = classify(object, subjects);
    bag.push(property, classified.descriptor.clone());
    classified
}
