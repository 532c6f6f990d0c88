//! Groups the triple stream by subject.
//!
//! The resulting `SubjectTable` is an arena: subjects live in a vector in
//! first-encounter order and are found through a key index. Each entry keeps
//! its predicates (by qualified name) in first-encounter order, and each
//! predicate keeps every object in triple order, duplicates included.
//!
//! The remote id slot of an entry is written once, by the create pass of the
//! materializer, and only read afterwards.

use std::collections::HashMap;

use super::{Term, Triple};
use crate::rdf::PrefixTable;

/// Objects of one predicate, in encounter order
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateValues {
    /// Namespace-qualified predicate name
    pub name: String,
    pub objects: Vec<Term>,
}

/// All statements about one subject
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSubject {
    key: String,
    remote_id: Option<u64>,
    predicates: Vec<PredicateValues>,
}

impl GroupedSubject {
    fn new(key: String) -> Self {
        Self {
            key,
            remote_id: None,
            predicates: Vec::new(),
        }
    }

    /// Subject IRI, or `_:label` for blank nodes
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn remote_id(&self) -> Option<u64> {
        self.remote_id
    }

    pub fn predicates(&self) -> &[PredicateValues] {
        &self.predicates
    }

    /// Objects of the predicate with qualified name `name`
    pub fn objects(&self, name: &str) -> &[Term] {
        self.predicates
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.objects.as_slice())
            .unwrap_or(&[])
    }

    fn push(&mut self, predicate: String, object: Term) {
        match self.predicates.iter_mut().find(|p| p.name == predicate) {
            Some(values) => values.objects.push(object),
            None => self.predicates.push(PredicateValues {
                name: predicate,
                objects: vec![object],
            }),
        }
    }
}

/// Subjects of one import run, keyed by subject identity
#[derive(Debug, Clone, Default)]
pub struct SubjectTable {
    entries: Vec<GroupedSubject>,
    index: HashMap<String, usize>,
}

impl SubjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&GroupedSubject> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Subjects in first-encounter order
    pub fn iter(&self) -> impl Iterator<Item = &GroupedSubject> {
        self.entries.iter()
    }

    /// Slot of `key` in the arena
    pub(crate) fn slot(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Record the catalog id of the subject in `slot`.
    ///
    /// Returns `false` and leaves the entry untouched if an id was already
    /// assigned.
    pub(crate) fn assign_remote_id(&mut self, slot: usize, remote_id: u64) -> bool {
        let entry = &mut self.entries[slot];
        if entry.remote_id.is_some() {
            return false;
        }
        entry.remote_id = Some(remote_id);
        true
    }

    /// Append one statement. The predicate is stored under its qualified name.
    pub fn insert(&mut self, triple: Triple, prefixes: &PrefixTable) {
        let Some(key) = triple.subject.node_key().map(|k| k.into_owned()) else {
            return;
        };

        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push(GroupedSubject::new(key.clone()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let predicate = prefixes.qualify(&triple.predicate);
        self.entries[slot].push(predicate, triple.object);
    }
}

/// Build the subject table from the full triple sequence
pub fn group_triples<I>(triples: I, prefixes: &PrefixTable) -> SubjectTable
where
    I: IntoIterator<Item = Triple>,
{
    let mut table = SubjectTable::new();
    for triple in triples {
        table.insert(triple, prefixes);
    }
    table
}
