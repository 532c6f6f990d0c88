//! Verbose dumps of grouped subjects and item payloads.
//!
//! Purely observational: nothing here mutates the table or the payloads.
//! Output goes to an injectable writer (stdout in the CLI) and is skipped
//! entirely when verbosity is off. Write errors are logged, never raised.

use std::io::{self, Write};

use tracing::warn;

use crate::catalog::PropertyBag;
use crate::classes::ClassIndex;
use crate::graph::{GroupedSubject, SubjectTable, Term};
use crate::rdf::namespaces::RDF_TYPE;
use crate::rdf::PrefixTable;

pub struct Diagnostics {
    enabled: bool,
    out: Box<dyn Write + Send>,
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Diagnostics {
    pub fn disabled() -> Self {
        Self::to_writer(false, io::sink())
    }

    pub fn stdout(enabled: bool) -> Self {
        Self::to_writer(enabled, io::stdout())
    }

    pub fn to_writer<W: Write + Send + 'static>(enabled: bool, out: W) -> Self {
        Self {
            enabled,
            out: Box::new(out),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Dump every grouped subject with its predicates and objects
    pub fn grouped(&mut self, table: &SubjectTable, classes: &ClassIndex, prefixes: &PrefixTable) {
        if !self.enabled {
            return;
        }
        let result = table.iter().try_for_each(|subject| {
            writeln!(self.out, "{}", render_key(subject.key(), prefixes))?;
            write_predicates(&mut self.out, subject, classes, prefixes)
        });
        self.report(result);
    }

    /// Announce the item about to be patched
    pub fn remote_id(&mut self, remote_id: u64) {
        if !self.enabled {
            return;
        }
        let result = writeln!(self.out, "{}", remote_id);
        self.report(result);
    }

    /// Dump a submitted patch payload followed by the subject's source statements
    pub fn item(
        &mut self,
        payload: &PropertyBag,
        subject: &GroupedSubject,
        classes: &ClassIndex,
        prefixes: &PrefixTable,
    ) {
        if !self.enabled {
            return;
        }
        let result = (|| {
            let json = serde_json::to_string_pretty(payload).map_err(io::Error::other)?;
            writeln!(self.out, "{}", json)?;
            write_predicates(&mut self.out, subject, classes, prefixes)
        })();
        self.report(result);
    }

    fn report(&mut self, result: io::Result<()>) {
        let result = result.and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "failed to write diagnostics");
        }
    }
}

fn render_key(key: &str, prefixes: &PrefixTable) -> String {
    if key.starts_with("_:") {
        key.to_string()
    } else {
        prefixes.qualify(key)
    }
}

/// Type objects print as their catalog class id, everything else as its
/// qualified form
fn write_predicates(
    out: &mut dyn Write,
    subject: &GroupedSubject,
    classes: &ClassIndex,
    prefixes: &PrefixTable,
) -> io::Result<()> {
    for predicate in subject.predicates() {
        writeln!(out, "  {}", predicate.name)?;
        for object in &predicate.objects {
            if predicate.name == RDF_TYPE {
                writeln!(out, "    {}", render_class(object, classes, prefixes))?;
            } else {
                writeln!(out, "    {}", prefixes.render(object))?;
            }
        }
    }
    Ok(())
}

fn render_class(object: &Term, classes: &ClassIndex, prefixes: &PrefixTable) -> String {
    match classes.resolve(&prefixes.render(object)) {
        Some(id) => id.to_string(),
        None => "None".to_string(),
    }
}
