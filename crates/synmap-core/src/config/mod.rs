//! Mapping configuration
//!
//! Business constants that vary between deployments live here rather than in
//! rule code:
//! - `categories`: which classification scheme URIs belong to which category
//!   (e.g. which corporate-sector schemes a regulator publishes)
//! - `synonyms`: extra spellings for enumeration codes
//! - `unmappedMessage`: diagnostic placed on facts nothing has claimed
//! - `pairing`: how reference and role facts of nested repeating groups are
//!   paired (`byKey` or `adjacent`)
//!
//! ## Example Configuration (synmap.yaml)
//!
//! ```yaml
//! categories:
//!   ESMA:
//!     - http://www.fpml.org/coding-scheme/esma-emir-corporate-sector
//!   FCA:
//!     - http://www.fpml.org/coding-scheme/fca-emir-corporate-sector
//! synonyms:
//!   CounterpartyRoleEnum:
//!     ReportingParty: Party1
//! unmappedMessage: No mapping found
//! pairing: byKey
//! ```
//!
//! A scheme URI belongs to exactly one category.

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::MappingError;
use crate::mapping::DEFAULT_UNMAPPED_ERROR;
use crate::result::Result;
use crate::synonym::SynonymTables;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Configuration shared by all rules of a mapping pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    /// Category → recognized classification scheme URIs, in evaluation order
    #[serde(default)]
    pub categories: IndexMap<String, Vec<String>>,

    /// Enumeration name → (synonym → canonical code)
    #[serde(default)]
    pub synonyms: HashMap<String, HashMap<String, String>>,

    /// Diagnostic placed on facts no rule has claimed
    #[serde(default = "default_unmapped_message")]
    pub unmapped_message: String,

    /// Pairing of reference and role facts in nested repeating groups
    #[serde(default)]
    pub pairing: PairingStrategy,
}

/// How reference and role facts of one inner occurrence are paired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PairingStrategy {
    /// Pair facts that share the same parent path
    #[default]
    ByKey,
    /// Pair the n-th reference fact with the n-th role fact
    Adjacent,
}

fn default_unmapped_message() -> String {
    DEFAULT_UNMAPPED_ERROR.to_string()
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            categories: IndexMap::new(),
            synonyms: HashMap::new(),
            unmapped_message: default_unmapped_message(),
            pairing: PairingStrategy::default(),
        }
    }
}

impl MappingConfig {
    /// Load configuration from a YAML, JSON or TOML file, chosen by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MappingError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                MappingError::config_error(format!("{}: {e}", path.display()))
            })?,
            Some("toml") => toml::from_str(&content).map_err(|e| {
                MappingError::config_error(format!("{}: {e}", path.display()))
            })?,
            _ => {
                return Err(MappingError::config_error(format!(
                    "Unsupported file extension for '{}' (expected .yaml, .yml, .json or .toml)",
                    path.display()
                )));
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| MappingError::config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values no rule could use
    pub fn validate(&self) -> Result<()> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (category, schemes) in &self.categories {
            if category.trim().is_empty() {
                return Err(MappingError::config_error("Category name must not be empty"));
            }
            if schemes.is_empty() {
                return Err(MappingError::config_error(format!(
                    "Category '{category}' lists no schemes"
                )));
            }
            if schemes.iter().any(|s| s.trim().is_empty()) {
                return Err(MappingError::config_error(format!(
                    "Category '{category}' contains an empty scheme"
                )));
            }
            for scheme in schemes {
                match owners.insert(scheme.as_str(), category.as_str()) {
                    Some(owner) if owner != category.as_str() => {
                        return Err(MappingError::config_error(format!(
                            "Scheme '{scheme}' is listed under both '{owner}' and '{category}'"
                        )));
                    }
                    _ => {}
                }
            }
        }

        if self.unmapped_message.trim().is_empty() {
            return Err(MappingError::config_error("unmappedMessage must not be empty"));
        }

        Ok(())
    }

    /// Recognized schemes for one category
    pub fn schemes_for(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Build synonym tables from the `synonyms` section
    pub fn synonym_tables(&self) -> SynonymTables {
        let mut tables = SynonymTables::new();
        tables.extend(&self.synonyms);
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const YAML: &str = r#"
categories:
  ESMA:
    - http://www.fpml.org/coding-scheme/esma-emir-corporate-sector
  FCA:
    - http://www.fpml.org/coding-scheme/fca-emir-corporate-sector
    - http://www.fpml.org/coding-scheme/fca-corporate-sector
synonyms:
  CounterpartyRoleEnum:
    ReportingParty: Party1
"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_from_yaml_str() {
        let config = MappingConfig::from_yaml_str(YAML).unwrap();

        let categories: Vec<_> = config.categories.keys().cloned().collect();
        assert_eq!(categories, vec!["ESMA", "FCA"]);
        assert_eq!(config.schemes_for("FCA").map(<[String]>::len), Some(2));
        assert!(config.schemes_for("CFTC").is_none());
        assert_eq!(config.unmapped_message, DEFAULT_UNMAPPED_ERROR);
    }

    #[test]
    fn test_synonym_tables() {
        let config = MappingConfig::from_yaml_str(YAML).unwrap();
        let tables = config.synonym_tables();
        let table = tables.table("CounterpartyRoleEnum").unwrap();
        assert_eq!(table.get("ReportingParty").map(String::as_str), Some("Party1"));
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "synmap.json",
            r#"{"categories": {"ESMA": ["scheme-a"]}, "unmappedMessage": "Not mapped"}"#,
        );

        let config = MappingConfig::load(&path).unwrap();
        assert_eq!(config.unmapped_message, "Not mapped");
        assert_eq!(config.schemes_for("ESMA"), Some(&["scheme-a".to_string()][..]));
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            ".synmaprc.toml",
            "[categories]\nESMA = [\"scheme-a\"]\n\n[synonyms.CounterpartyRoleEnum]\nRP = \"Party1\"\n",
        );

        let config = MappingConfig::load(&path).unwrap();
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.synonyms["CounterpartyRoleEnum"]["RP"], "Party1");
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "synmap.ini", "categories=");
        let err = MappingConfig::load(&path).unwrap_err();
        assert!(matches!(err, MappingError::ConfigError { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MappingConfig::load(Path::new("/nonexistent/synmap.yaml")).unwrap_err();
        assert!(matches!(err, MappingError::IoError { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_scheme_list() {
        let err = MappingConfig::from_yaml_str("categories:\n  ESMA: []\n").unwrap_err();
        assert!(err.to_string().contains("ESMA"));
    }

    #[test]
    fn test_validate_rejects_scheme_in_two_categories() {
        let err = MappingConfig::from_yaml_str(
            "categories:\n  ESMA:\n    - shared\n  FCA:\n    - fca-only\n    - shared\n",
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::ConfigError { .. }));
        assert!(err.to_string().contains("'ESMA' and 'FCA'"));

        // Repeating a scheme within one category is harmless
        assert!(MappingConfig::from_yaml_str("categories:\n  ESMA: [a, a]\n").is_ok());
    }

    #[test]
    fn test_pairing_defaults_to_by_key() {
        assert_eq!(MappingConfig::default().pairing, PairingStrategy::ByKey);
        let config = MappingConfig::from_yaml_str("pairing: adjacent\n").unwrap();
        assert_eq!(config.pairing, PairingStrategy::Adjacent);
        assert!(MappingConfig::from_yaml_str("pairing: zipped\n").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_message() {
        let err = MappingConfig::from_yaml_str("unmappedMessage: ''\n").unwrap_err();
        assert!(matches!(err, MappingError::ConfigError { .. }));
    }
}
