//! Configuration file discovery and loading

use super::MappingConfig;
use crate::error::MappingError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// Config file names in priority order
const CONFIG_FILE_NAMES: &[&str] = &[
    ".synmaprc.toml",
    ".synmaprc.json",
    "synmap.yaml",
    "synmap.yml",
    "synmap.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    ///
    /// Searches each directory for, in order: `.synmaprc.toml`,
    /// `.synmaprc.json`, `synmap.yaml`, `synmap.yml`, `synmap.json`, and moves
    /// up the directory tree until one is found or the filesystem root is
    /// reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| MappingError::io_error(start_path, e))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<MappingConfig> {
        MappingConfig::load(path)
    }

    /// Load config from `custom_path`, or auto-discover from `start_dir`
    ///
    /// Without a custom path and without a discoverable file the default
    /// configuration is returned.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<MappingConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(MappingError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!(
                    "No config file found from {}, using defaults",
                    search_dir.display()
                );
                Ok(MappingConfig::default())
            }
        }
    }
}
