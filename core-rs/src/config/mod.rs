/**
 * config/mod.rs
 * Importer settings file (YAML format)
 *
 * Format:
 * ```yaml
 * authentication:
 *   key_identity: abc
 *   key_credential: def
 * rdf:
 *   input_file: data/objects.rdf
 * debug:
 *   verbose: true
 * ```
 *
 * The `api` and `import` sections are optional and fall back to defaults.
 * INI `config.ini` files of earlier releases are not read; bootstrap points
 * at one when it sits beside the new template.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ImportError, Result};

/// Default settings file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// INI settings file of earlier releases
pub const LEGACY_CONFIG_FILE: &str = "config.ini";

/// Default Omeka S API root
pub const DEFAULT_BASE_URL: &str = "http://70.34.242.54/api";

/// Namespace of the CIDOC-CRM ontology itself; subjects under it are schema
/// artifacts, not data
pub const DEFAULT_EXCLUDED_NAMESPACE: &str = "http://www.cidoc-crm.org/";

/// Full importer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ImportConfig {
    pub authentication: Authentication,
    pub rdf: RdfSource,
    pub debug: DebugSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub import: ImportSettings,
}

/// API key pair, sent as query parameters on every request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Authentication {
    pub key_identity: String,
    pub key_credential: String,
}

impl Authentication {
    /// Query parameters in the form the catalog expects
    pub fn as_query(&self) -> [(&'static str, &str); 2] {
        [
            ("key_identity", self.key_identity.as_str()),
            ("key_credential", self.key_credential.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RdfSource {
    pub input_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugSettings {
    pub verbose: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        DebugSettings { verbose: true }
    }
}

/// Remote catalog connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Page size of the lightweight request that reads the class count
    pub class_count_page_size: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            class_count_page_size: 10,
        }
    }
}

/// What to do with a subject whose first `rdf:type` has no catalog class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedClassPolicy {
    /// Create the item with a null class
    #[default]
    Absent,
    /// Do not create the item at all
    Skip,
    /// Abort the import
    Fail,
}

/// Reaction to a failed create or patch call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure in the report and carry on
    #[default]
    BestEffort,
    /// Abort at the first failure
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportSettings {
    pub excluded_namespace: String,
    pub unresolved_class: UnresolvedClassPolicy,
    pub failure_policy: FailurePolicy,
    /// Extra prefix -> namespace bindings for qualified names
    pub prefixes: BTreeMap<String, String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            excluded_namespace: DEFAULT_EXCLUDED_NAMESPACE.to_string(),
            unresolved_class: UnresolvedClassPolicy::default(),
            failure_policy: FailurePolicy::default(),
            prefixes: BTreeMap::new(),
        }
    }
}

/// Result of looking for the settings file
#[derive(Debug)]
pub enum ConfigState {
    Loaded(ImportConfig),
    /// File was absent; a template was written at this path
    Bootstrapped(PathBuf),
}

/// Earlier-release `config.ini` in the directory of `path`, if there is one
pub fn legacy_config_beside(path: &Path) -> Option<PathBuf> {
    let legacy = path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(LEGACY_CONFIG_FILE);
    legacy.is_file().then_some(legacy)
}

impl ImportConfig {
    /// Load settings from `path`
    ///
    /// # Example
    /// ```no_run
    /// use crm_import::config::ImportConfig;
    ///
    /// let config = ImportConfig::load("config.yaml").unwrap();
    /// config.validate().unwrap();
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ImportError::ConfigMissing(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config: ImportConfig = serde_yaml::from_str(&content)?;

        Ok(config)
    }

    /// Load settings, writing a blank template when the file does not exist
    pub fn load_or_bootstrap<P: AsRef<Path>>(path: P) -> Result<ConfigState> {
        let path = path.as_ref();

        if !path.exists() {
            ImportConfig::default().save(path)?;
            return Ok(ConfigState::Bootstrapped(path.to_path_buf()));
        }

        Ok(ConfigState::Loaded(Self::load(path)?))
    }

    /// Save settings to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    /// Check the settings before any input is read or any request is sent
    ///
    /// Ensures:
    /// - both authentication keys are non-empty
    /// - `rdf.input_file` names an existing file
    pub fn validate(&self) -> Result<()> {
        if self.authentication.key_identity.is_empty()
            || self.authentication.key_credential.is_empty()
        {
            return Err(ImportError::ConfigInvalid(
                "Authentication variables must be set".to_string(),
            ));
        }

        if !self.input_path().is_file() {
            return Err(ImportError::ConfigInvalid(
                "input_file does not exist.".to_string(),
            ));
        }

        Ok(())
    }

    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(&self.rdf.input_file)
    }
}
