//! Two-pass item materialization.
//!
//! Per subject: `UNCREATED -> CREATED(remote id) -> PATCHED`.
//!
//! 1. `create_all` creates one bare item per eligible subject, carrying only
//!    its class, and records the returned remote id in the subject table.
//! 2. `patch_all` builds every subject's property payload and submits it.
//!    Objects naming another subject resolve to that subject's remote id.
//!
//! Reference resolution in pass two needs every remote id from pass one, so
//! `patch_all` only accepts the `CommittedTable` that `create_all` returns.
//! Calls are issued one at a time, in subject encounter order.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogApi, ClassAssignment, PropertyBag};
use crate::classes::{choose_class, ClassChoice, ClassIndex};
use crate::classify::append_value;
use crate::config::{FailurePolicy, ImportSettings, UnresolvedClassPolicy};
use crate::diagnostics::Diagnostics;
use crate::errors::{ImportError, Result};
use crate::graph::{GroupedSubject, SubjectTable};
use crate::rdf::namespaces::{DCTERMS_TITLE, RDFS_LABEL, RDF_TYPE};
use crate::rdf::PrefixTable;

/// Knobs of the materializer, usually taken from the `import` settings section
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeOptions {
    /// Subjects under this namespace are never created or patched.
    /// Empty disables the filter.
    pub excluded_namespace: String,
    pub unresolved_class: UnresolvedClassPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self::from(&ImportSettings::default())
    }
}

impl From<&ImportSettings> for MaterializeOptions {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            excluded_namespace: settings.excluded_namespace.clone(),
            unresolved_class: settings.unresolved_class,
            failure_policy: settings.failure_policy,
        }
    }
}

impl MaterializeOptions {
    pub fn is_excluded(&self, key: &str) -> bool {
        !self.excluded_namespace.is_empty() && key.starts_with(&self.excluded_namespace)
    }
}

/// Subject table after pass one: every remote id that will ever be assigned
/// has been assigned. Only `Materializer::create_all` produces one.
#[derive(Debug, Clone)]
pub struct CommittedTable {
    subjects: SubjectTable,
}

impl CommittedTable {
    pub(crate) fn new(subjects: SubjectTable) -> Self {
        Self { subjects }
    }

    pub fn subjects(&self) -> &SubjectTable {
        &self.subjects
    }

    pub fn into_subjects(self) -> SubjectTable {
        self.subjects
    }
}

/// Pass in which a remote call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Create,
    Patch,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Create => "create",
            Phase::Patch => "patch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFailure {
    pub subject: String,
    pub phase: Phase,
    pub reason: String,
}

/// Outcome of one import run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Subjects in the grouped table, excluded ones included
    pub subjects: usize,
    pub excluded: usize,
    pub created: usize,
    pub patched: usize,
    /// Subjects whose first type had no catalog class: (subject, term)
    pub unresolved_classes: Vec<(String, String)>,
    /// Subjects not created because of the `skip` class policy
    pub skipped: Vec<String>,
    /// References to local subjects emitted as plain IRIs for lack of a remote id
    pub degraded_links: usize,
    pub failures: Vec<SubjectFailure>,
}

impl Default for ImportReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            subjects: 0,
            excluded: 0,
            created: 0,
            patched: 0,
            unresolved_classes: Vec::new(),
            skipped: Vec::new(),
            degraded_links: 0,
            failures: Vec::new(),
        }
    }

    /// True when every remote call succeeded and every link resolved
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.degraded_links == 0
    }

    pub fn failures_in(&self, phase: Phase) -> impl Iterator<Item = &SubjectFailure> {
        self.failures.iter().filter(move |f| f.phase == phase)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

/// Patch payload of one subject plus the local references it could not link
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPayload {
    pub properties: PropertyBag,
    /// Keys of local subjects referenced without a remote id
    pub degraded: Vec<String>,
}

/// Build the patch payload of `subject`.
///
/// Every predicate except `rdf:type` becomes a property with one descriptor
/// per object, in order. `rdfs:label` values are mirrored onto
/// `dcterms:title`, which is placed right after the label property.
pub fn build_patch(subject: &GroupedSubject, committed: &CommittedTable) -> PatchPayload {
    let subjects = committed.subjects();
    let mut properties = PropertyBag::new();
    let mut degraded = Vec::new();

    for predicate in subject.predicates() {
        if predicate.name == RDF_TYPE {
            continue;
        }

        let is_label = predicate.name == RDFS_LABEL;
        properties.property_mut(&predicate.name);
        if is_label {
            properties.property_mut(DCTERMS_TITLE);
        }

        for object in &predicate.objects {
            let classified = append_value(&mut properties, &predicate.name, object, subjects);
            if is_label {
                append_value(&mut properties, DCTERMS_TITLE, object, subjects);
            }
            if classified.degraded {
                if let Some(key) = object.node_key() {
                    degraded.push(key.into_owned());
                }
            }
        }
    }

    PatchPayload { properties, degraded }
}

/// Drives both passes against a catalog
pub struct Materializer<'a, C> {
    catalog: &'a C,
    classes: &'a ClassIndex,
    prefixes: &'a PrefixTable,
    options: MaterializeOptions,
    diagnostics: Diagnostics,
}

impl<'a, C: CatalogApi> Materializer<'a, C> {
    pub fn new(catalog: &'a C, classes: &'a ClassIndex, prefixes: &'a PrefixTable) -> Self {
        Self {
            catalog,
            classes,
            prefixes,
            options: MaterializeOptions::default(),
            diagnostics: Diagnostics::disabled(),
        }
    }

    pub fn with_options(mut self, options: MaterializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Run both passes
    pub async fn run(&mut self, subjects: SubjectTable) -> Result<(CommittedTable, ImportReport)> {
        let mut report = ImportReport::new();
        let committed = self.create_all(subjects, &mut report).await?;
        self.patch_all(&committed, &mut report).await?;
        report.finish();
        Ok((committed, report))
    }

    /// Pass one: create a bare item for every eligible subject
    pub async fn create_all(&mut self, mut subjects: SubjectTable, report: &mut ImportReport) -> Result<CommittedTable> {
        info!(subjects = subjects.len(), "pass one: creating items");
        report.subjects = subjects.len();

        let pending: Vec<(String, ClassChoice)> = subjects
            .iter()
            .filter(|subject| !self.options.is_excluded(subject.key()))
            .map(|subject| {
                let choice = choose_class(subject, self.classes, self.prefixes);
                (subject.key().to_string(), choice)
            })
            .collect();
        report.excluded = subjects.len() - pending.len();

        for (key, choice) in pending {
            let class_id = match choice {
                ClassChoice::Resolved { id, .. } => Some(id),
                ClassChoice::Untyped => None,
                ClassChoice::Unresolved { term } => match self.options.unresolved_class {
                    UnresolvedClassPolicy::Absent => {
                        warn!(subject = %key, term = %term, "no resource class, creating without class");
                        report.unresolved_classes.push((key.clone(), term));
                        None
                    }
                    UnresolvedClassPolicy::Skip => {
                        warn!(subject = %key, term = %term, "no resource class, skipping subject");
                        report.unresolved_classes.push((key.clone(), term));
                        report.skipped.push(key);
                        continue;
                    }
                    UnresolvedClassPolicy::Fail => {
                        return Err(ImportError::UnresolvedClass { subject: key, term });
                    }
                },
            };

            let assignment = ClassAssignment { class_id };
            match self.catalog.create_item(&assignment).await {
                Ok(remote_id) => {
                    if let Some(slot) = subjects.slot(&key) {
                        subjects.assign_remote_id(slot, remote_id);
                    }
                    report.created += 1;
                    debug!(subject = %key, remote_id, class_id = ?class_id, "created");
                }
                Err(e) => self.record_failure(report, &key, Phase::Create, e)?,
            }
        }

        info!(created = report.created, excluded = report.excluded, "pass one complete");
        Ok(CommittedTable::new(subjects))
    }

    /// Pass two: submit the property payload of every created subject
    pub async fn patch_all(&mut self, committed: &CommittedTable, report: &mut ImportReport) -> Result<()> {
        info!("pass two: patching items");

        for subject in committed.subjects().iter() {
            if self.options.is_excluded(subject.key()) {
                continue;
            }
            let Some(remote_id) = subject.remote_id() else {
                debug!(subject = %subject.key(), "not created, nothing to patch");
                continue;
            };

            self.diagnostics.remote_id(remote_id);

            let payload = build_patch(subject, committed);
            for target in &payload.degraded {
                if !self.options.is_excluded(target) {
                    warn!(subject = %subject.key(), target = %target, "reference has no remote id, sent as uri");
                    report.degraded_links += 1;
                }
            }

            match self.catalog.patch_item(remote_id, &payload.properties).await {
                Ok(()) => {
                    report.patched += 1;
                    debug!(subject = %subject.key(), remote_id, "patched");
                }
                Err(e) => self.record_failure(report, subject.key(), Phase::Patch, e)?,
            }

            self.diagnostics
                .item(&payload.properties, subject, self.classes, self.prefixes);
        }

        info!(patched = report.patched, failures = report.failures.len(), "pass two complete");
        Ok(())
    }

    fn record_failure(&self, report: &mut ImportReport, subject: &str, phase: Phase, error: ImportError) -> Result<()> {
        let reason = error.to_string();
        if self.options.failure_policy == FailurePolicy::FailFast {
            return Err(ImportError::RemoteCall {
                operation: phase.as_str(),
                subject: subject.to_string(),
                reason,
            });
        }

        warn!(subject = %subject, phase = phase.as_str(), error = %reason, "remote call failed");
        report.failures.push(SubjectFailure {
            subject: subject.to_string(),
            phase,
            reason,
        });
        Ok(())
    }
}
