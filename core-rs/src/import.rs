//! Import pipeline
//!
//! validate settings -> parse RDF/XML -> fetch class index -> group by
//! subject -> create pass -> patch pass.
//!
//! Nothing touches the network until the settings validate and the input
//! parses.

use tracing::info;

use crate::catalog::CatalogApi;
use crate::classes::fetch_class_index;
use crate::config::{ImportConfig, ImportSettings};
use crate::diagnostics::Diagnostics;
use crate::errors::Result;
use crate::graph::group_triples;
use crate::materialize::{ImportReport, MaterializeOptions, Materializer};
use crate::rdf::{read_rdf_xml, PrefixTable};

/// Prefix table of one run.
///
/// Default bindings, then the prefixes `declared` by the input document, then
/// `import.prefixes`, which override both.
pub fn prefix_table(settings: &ImportSettings, declared: &[(String, String)]) -> PrefixTable {
    let mut prefixes = PrefixTable::with_defaults();
    for (prefix, namespace) in declared {
        prefixes.bind_declared(prefix, namespace);
    }
    for (prefix, namespace) in &settings.prefixes {
        prefixes.bind(prefix, namespace);
    }
    prefixes
}

/// Run one import of `config.rdf.input_file` into `catalog`
pub async fn run_import<C: CatalogApi>(
    config: &ImportConfig,
    catalog: &C,
    mut diagnostics: Diagnostics,
) -> Result<ImportReport> {
    config.validate()?;

    let input = config.input_path();
    let document = read_rdf_xml(&input)?;
    info!(
        input = %input.display(),
        triples = document.triples.len(),
        "input parsed"
    );

    let prefixes = prefix_table(&config.import, &document.prefixes);
    let classes = fetch_class_index(catalog, config.api.class_count_page_size).await?;

    let subjects = group_triples(document.triples, &prefixes);
    info!(subjects = subjects.len(), "triples grouped by subject");
    diagnostics.grouped(&subjects, &classes, &prefixes);

    let (_, report) = Materializer::new(catalog, &classes, &prefixes)
        .with_options(MaterializeOptions::from(&config.import))
        .with_diagnostics(diagnostics)
        .run(subjects)
        .await?;

    Ok(report)
}
