//! Contract tests for materialization invariants
//!
//! These hold for any input graph, so each contract is checked over a batch
//! of generated graphs:
//! 1. Grouping keeps every subject once, objects in order, duplicates included
//! 2. All creates happen before any patch
//! 3. Objects naming a created subject are always resource links
//! 4. `dcterms:title` mirrors `rdfs:label`
//! 5. Ontology-namespace subjects never generate calls
//! 6. Create payloads carry the class of the first type, or null

use crm_import::catalog::{ClassAssignment, PropertyBag, ResourceClassPage};
use crm_import::rdf::namespaces::{CRM, RDF, RDFS};
use crm_import::{
    group_triples, CatalogApi, ClassIndex, Materializer, PrefixTable, Result, Term, Triple,
    ValueDescriptor,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Call {
    Create(Option<u64>),
    Patch(u64, PropertyBag),
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl CatalogApi for Recorder {
    async fn list_resource_classes(&self, _per_page: u32) -> Result<ResourceClassPage> {
        Ok(ResourceClassPage { total: 0, classes: Vec::new() })
    }

    async fn create_item(&self, assignment: &ClassAssignment) -> Result<u64> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(Call::Create(assignment.class_id));
        // ids unrelated to encounter order
        Ok(1000 + 7 * calls.len() as u64)
    }

    async fn patch_item(&self, id: u64, properties: &PropertyBag) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Patch(id, properties.clone()));
        Ok(())
    }
}

/// Small deterministic generator; no external randomness needed
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn subject_iri(n: u64) -> String {
    format!("http://example.org/object/{}", n)
}

const CLASSES: [&str; 3] = ["E22_Human-Made_Object", "E21_Person", "E999_Not_In_Catalog"];

fn generate(seed: u64) -> Vec<Triple> {
    let mut rng = Lcg(seed);
    let subjects = 2 + rng.next(6);
    let mut triples = Vec::new();

    for _ in 0..(10 + rng.next(30)) {
        let s = Term::iri(subject_iri(rng.next(subjects)));
        let triple = match rng.next(5) {
            0 => Triple::new(s, format!("{}type", RDF), Term::iri(format!("{}{}", CRM, CLASSES[rng.next(3) as usize]))),
            1 => Triple::new(s, format!("{}label", RDFS), Term::literal(format!("label {}", rng.next(3)))),
            2 => Triple::new(s, format!("{}P46i_forms_part_of", CRM), Term::iri(subject_iri(rng.next(subjects)))),
            3 => Triple::new(s, format!("{}P2_has_type", CRM), Term::iri(format!("http://vocab.getty.edu/aat/{}", rng.next(4)))),
            _ => Triple::new(s, format!("{}P3_has_note", CRM), Term::literal("note")),
        };
        triples.push(triple);
    }

    // an ontology subject referenced by data
    triples.push(Triple::new(
        Term::iri(format!("{}E21_Person", CRM)),
        format!("{}label", RDFS),
        Term::literal("Person"),
    ));
    triples.push(Triple::new(
        Term::iri(subject_iri(0)),
        format!("{}P2_has_type", CRM),
        Term::iri(format!("{}E21_Person", CRM)),
    ));
    triples
}

fn class_index() -> ClassIndex {
    vec![
        ("crm:E22_Human-Made_Object".to_string(), 105),
        ("crm:E21_Person".to_string(), 101),
    ]
    .into_iter()
    .collect()
}

const SEEDS: std::ops::Range<u64> = 1..40;

#[test]
fn contract_grouping_preserves_order_and_multiplicity() {
    let prefixes = PrefixTable::with_defaults();
    for seed in SEEDS {
        let triples = generate(seed);
        let table = group_triples(triples.clone(), &prefixes);

        let mut expected: HashMap<(String, String), Vec<Term>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for t in &triples {
            let key = t.subject.node_key().unwrap().into_owned();
            if !order.contains(&key) {
                order.push(key.clone());
            }
            expected
                .entry((key, prefixes.qualify(&t.predicate)))
                .or_default()
                .push(t.object.clone());
        }

        let keys: Vec<&str> = table.iter().map(|s| s.key()).collect();
        assert_eq!(keys, order, "seed {}", seed);

        let mut seen = 0;
        for subject in table.iter() {
            for predicate in subject.predicates() {
                let want = &expected[&(subject.key().to_string(), predicate.name.clone())];
                assert_eq!(&predicate.objects, want, "seed {}", seed);
                seen += predicate.objects.len();
            }
        }
        assert_eq!(seen, triples.len(), "seed {}", seed);
    }
}

#[tokio::test]
async fn contract_all_creates_precede_all_patches() {
    let prefixes = PrefixTable::with_defaults();
    let classes = class_index();

    for seed in SEEDS {
        let catalog = Recorder::default();
        let table = group_triples(generate(seed), &prefixes);
        Materializer::new(&catalog, &classes, &prefixes).run(table).await.unwrap();

        let calls = catalog.calls();
        let first_patch = calls.iter().position(|c| matches!(c, Call::Patch(..))).unwrap();
        assert!(
            calls[first_patch..].iter().all(|c| matches!(c, Call::Patch(..))),
            "seed {}: create after patch",
            seed
        );
    }
}

#[tokio::test]
async fn contract_internal_references_are_resource_links() {
    let prefixes = PrefixTable::with_defaults();
    let classes = class_index();

    for seed in SEEDS {
        let catalog = Recorder::default();
        let table = group_triples(generate(seed), &prefixes);
        let (committed, _) = Materializer::new(&catalog, &classes, &prefixes).run(table).await.unwrap();

        let remote: HashMap<&str, u64> = committed
            .subjects()
            .iter()
            .filter_map(|s| s.remote_id().map(|id| (s.key(), id)))
            .collect();

        for call in catalog.calls() {
            let Call::Patch(_, bag) = call else { continue };
            for value in bag.values() {
                if let ValueDescriptor::Uri(iri) = value {
                    assert!(
                        !remote.contains_key(iri.as_str()),
                        "seed {}: created subject {} sent as uri",
                        seed,
                        iri
                    );
                }
                if let ValueDescriptor::Resource(id) = value {
                    assert!(remote.values().any(|v| v == id), "seed {}: dangling id {}", seed, id);
                }
            }
        }
    }
}

#[tokio::test]
async fn contract_title_mirrors_label() {
    let prefixes = PrefixTable::with_defaults();
    let classes = class_index();

    for seed in SEEDS {
        let catalog = Recorder::default();
        let table = group_triples(generate(seed), &prefixes);
        Materializer::new(&catalog, &classes, &prefixes).run(table).await.unwrap();

        for call in catalog.calls() {
            let Call::Patch(_, bag) = call else { continue };
            assert_eq!(bag.get("dcterms:title"), bag.get("rdfs:label"), "seed {}", seed);
        }
    }
}

#[tokio::test]
async fn contract_excluded_subjects_generate_no_calls() {
    let prefixes = PrefixTable::with_defaults();
    let classes = class_index();

    for seed in SEEDS {
        let catalog = Recorder::default();
        let table = group_triples(generate(seed), &prefixes);
        let data_subjects = table
            .iter()
            .filter(|s| !s.key().starts_with("http://www.cidoc-crm.org/"))
            .count();

        let (committed, report) = Materializer::new(&catalog, &classes, &prefixes).run(table).await.unwrap();

        let creates = catalog.calls().iter().filter(|c| matches!(c, Call::Create(_))).count();
        assert_eq!(creates, data_subjects, "seed {}", seed);
        assert_eq!(report.excluded, 1, "seed {}", seed);
        assert_eq!(
            committed.subjects().get(&format!("{}E21_Person", CRM)).unwrap().remote_id(),
            None
        );
    }
}

#[tokio::test]
async fn contract_create_carries_first_type_class() {
    let prefixes = PrefixTable::with_defaults();
    let classes = class_index();

    for seed in SEEDS {
        let catalog = Recorder::default();
        let table = group_triples(generate(seed), &prefixes);
        let expected: Vec<Option<u64>> = table
            .iter()
            .filter(|s| !s.key().starts_with("http://www.cidoc-crm.org/"))
            .map(|s| {
                s.objects("rdf:type")
                    .first()
                    .and_then(|t| classes.resolve(&prefixes.render(t)))
            })
            .collect();

        Materializer::new(&catalog, &classes, &prefixes).run(table).await.unwrap();

        let created: Vec<Option<u64>> = catalog
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(class) => Some(class),
                Call::Patch(..) => None,
            })
            .collect();
        assert_eq!(created, expected, "seed {}", seed);
    }
}
