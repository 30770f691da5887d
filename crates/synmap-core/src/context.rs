//! Fact table for one document pass
//!
//! A [`MappingContext`] holds every fact the decoder extracted from one source
//! document, in document order, together with the synonym tables rules use to
//! decode raw codes. Rules read it, and annotate facts through the `mark_*`
//! operations; nothing else mutates it.

use crate::config::MappingConfig;
use crate::error::MappingError;
use crate::mapping::{ClaimOutcome, DEFAULT_UNMAPPED_ERROR, Mapping, MappingId};
use crate::path::Path;
use crate::result::Result;
use crate::stats::{FieldStatus, ResolutionStats};
use crate::synonym::{SynonymEnum, SynonymTables};
use tracing::{debug, warn};

/// Facts and lookup tables for a single document pass
#[derive(Debug, Default)]
pub struct MappingContext {
    mappings: Vec<Mapping>,
    synonyms: SynonymTables,
}

impl MappingContext {
    /// Create a context over `mappings` with empty synonym tables
    pub fn new(mappings: impl IntoIterator<Item = Mapping>) -> Self {
        Self::with_synonyms(mappings, SynonymTables::new())
    }

    /// Create a context with explicit synonym tables
    pub fn with_synonyms(
        mappings: impl IntoIterator<Item = Mapping>,
        synonyms: SynonymTables,
    ) -> Self {
        let mut context = Self {
            mappings: Vec::new(),
            synonyms,
        };
        for mapping in mappings {
            context.push(mapping);
        }
        context
    }

    /// Create a context using the synonyms and diagnostic text from `config`
    ///
    /// Facts still carrying the built-in diagnostic get the configured one.
    pub fn from_config(
        mappings: impl IntoIterator<Item = Mapping>,
        config: &MappingConfig,
    ) -> Self {
        let message = config.unmapped_message.as_str();
        let relabel = message != DEFAULT_UNMAPPED_ERROR;
        Self::with_synonyms(
            mappings.into_iter().map(|mapping| {
                if relabel && mapping.error() == Some(DEFAULT_UNMAPPED_ERROR) {
                    mapping.with_error(message)
                } else {
                    mapping
                }
            }),
            config.synonym_tables(),
        )
    }

    /// Append a fact and return its id
    pub fn push(&mut self, mut mapping: Mapping) -> MappingId {
        let id = MappingId(self.mappings.len());
        mapping.id = id;
        self.mappings.push(mapping);
        id
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn get(&self, id: MappingId) -> Option<&Mapping> {
        self.mappings.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn synonyms(&self) -> &SynonymTables {
        &self.synonyms
    }

    /// Facts whose source path ends with `suffix`, in document order
    pub fn find_by_suffix<S: AsRef<str>>(&self, suffix: &[S]) -> Vec<&Mapping> {
        self.mappings
            .iter()
            .filter(|m| m.source_path().ends_with(suffix))
            .collect()
    }

    /// Value of the first fact at exactly `path` that has a value
    pub fn value_of(&self, path: &Path) -> Option<&str> {
        self.mappings
            .iter()
            .filter(|m| m.source_path() == path)
            .find_map(Mapping::source_value)
    }

    /// Decode a raw code through the synonym tables
    pub fn lookup<E: SynonymEnum>(&self, raw: &str) -> Option<E> {
        self.synonyms.lookup(raw)
    }

    /// Claim a fact for `target`
    ///
    /// Claims are never overwritten: claiming an already claimed fact for the
    /// same target is a no-op, and for a different target it keeps the first
    /// claim and reports a conflict.
    pub fn mark_resolved(&mut self, id: MappingId, target: &Path) -> Result<ClaimOutcome> {
        self.claim(id, target, false)
    }

    /// Claim a fact whose value was only partly used
    pub fn mark_partial(&mut self, id: MappingId, target: &Path) -> Result<ClaimOutcome> {
        self.claim(id, target, true)
    }

    /// Replace the diagnostic of an unclaimed fact
    ///
    /// Returns `false` (and changes nothing) if the fact was already claimed.
    pub fn mark_unresolved(&mut self, id: MappingId, reason: &str) -> Result<bool> {
        let mapping = self.mapping_mut(id)?;
        let updated = mapping.set_unresolved(reason);
        if !updated {
            debug!(
                "Ignoring diagnostic for claimed fact {} ({})",
                id,
                mapping.source_path()
            );
        }
        Ok(updated)
    }

    /// Reporting status of the source field at `path`
    ///
    /// Resolved if any fact at the path was claimed, unresolved if facts
    /// exist but none was claimed, absent otherwise.
    pub fn status_of(&self, path: &Path) -> FieldStatus {
        let mut status = FieldStatus::Absent;
        for mapping in self.mappings.iter().filter(|m| m.source_path() == path) {
            if mapping.is_success() {
                return FieldStatus::Resolved;
            }
            status = FieldStatus::Unresolved;
        }
        status
    }

    pub fn stats(&self) -> ResolutionStats {
        ResolutionStats::from_mappings(&self.mappings)
    }

    pub fn into_mappings(self) -> Vec<Mapping> {
        self.mappings
    }

    fn claim(&mut self, id: MappingId, target: &Path, partial: bool) -> Result<ClaimOutcome> {
        let mapping = self.mapping_mut(id)?;
        let outcome = mapping.claim(target, partial);
        match &outcome {
            ClaimOutcome::Claimed => {
                debug!("Resolved {} {} -> {}", id, mapping.source_path(), target)
            }
            ClaimOutcome::AlreadyClaimed => {}
            ClaimOutcome::Conflict { existing } => warn!(
                "Fact {} ({}) already resolved to {}, not re-targeting to {}",
                id,
                mapping.source_path(),
                existing,
                target
            ),
        }
        Ok(outcome)
    }

    fn mapping_mut(&mut self, id: MappingId) -> Result<&mut Mapping> {
        let count = self.mappings.len();
        self.mappings.get_mut(id.0).ok_or_else(|| {
            MappingError::internal_error(format!(
                "fact {id} does not belong to this context ({count} facts)"
            ))
        })
    }
}
