//! Source facts and their resolution state
//!
//! Tracks whether each fact has been claimed by a rule so the same value is
//! never projected twice and downstream reporting can tell resolved facts from
//! unresolved ones.

use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic placed on facts no rule has claimed yet
pub const DEFAULT_UNMAPPED_ERROR: &str = "No mapping found";

/// Position of a fact in its [`MappingContext`](crate::MappingContext)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingId(pub(crate) usize);

impl MappingId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolution state of a fact
///
/// A fact either still carries its diagnostic or has a target path, never
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Resolution {
    Unresolved {
        error: String,
    },
    Resolved {
        target: Path,
        /// The value was only partly used by the claiming rule
        #[serde(default)]
        partial: bool,
    },
}

/// Outcome of an attempt to claim a fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The fact was unresolved and now points at the target
    Claimed,
    /// The fact was already claimed for the same target
    AlreadyClaimed,
    /// The fact was claimed earlier for a different target; the earlier claim
    /// is kept
    Conflict { existing: Path },
}

impl ClaimOutcome {
    /// True when the fact ends up pointing at the requested target
    pub fn is_claimed(&self) -> bool {
        matches!(self, ClaimOutcome::Claimed | ClaimOutcome::AlreadyClaimed)
    }
}

/// One fact extracted from a source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    #[serde(skip)]
    pub(crate) id: MappingId,
    source_path: Path,
    #[serde(default)]
    source_value: Option<String>,
    #[serde(default = "default_resolution")]
    resolution: Resolution,
}

fn default_resolution() -> Resolution {
    Resolution::Unresolved {
        error: DEFAULT_UNMAPPED_ERROR.to_string(),
    }
}

impl Mapping {
    /// Create an unresolved fact with the default diagnostic
    pub fn new(source_path: Path, source_value: Option<String>) -> Self {
        Self {
            id: MappingId::default(),
            source_path,
            source_value,
            resolution: default_resolution(),
        }
    }

    /// Create an unresolved fact carrying a value
    pub fn with_value(source_path: Path, source_value: impl Into<String>) -> Self {
        Self::new(source_path, Some(source_value.into()))
    }

    /// Replace the initial diagnostic
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.resolution = Resolution::Unresolved {
            error: error.into(),
        };
        self
    }

    pub fn id(&self) -> MappingId {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source_value(&self) -> Option<&str> {
        self.source_value.as_deref()
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Target path, set once the fact is claimed
    pub fn target_path(&self) -> Option<&Path> {
        match &self.resolution {
            Resolution::Resolved { target, .. } => Some(target),
            Resolution::Unresolved { .. } => None,
        }
    }

    /// Diagnostic, present until the fact is claimed
    pub fn error(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::Unresolved { error } => Some(error),
            Resolution::Resolved { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved { .. })
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved { partial: true, .. })
    }

    pub(crate) fn claim(&mut self, target: &Path, partial: bool) -> ClaimOutcome {
        if let Resolution::Resolved {
            target: existing, ..
        } = &self.resolution
        {
            return if existing == target {
                ClaimOutcome::AlreadyClaimed
            } else {
                ClaimOutcome::Conflict {
                    existing: existing.clone(),
                }
            };
        }
        self.resolution = Resolution::Resolved {
            target: target.clone(),
            partial,
        };
        ClaimOutcome::Claimed
    }

    /// Replace the diagnostic of an unclaimed fact; claimed facts are left alone
    pub(crate) fn set_unresolved(&mut self, reason: &str) -> bool {
        match &mut self.resolution {
            Resolution::Unresolved { error } => {
                *error = reason.to_string();
                true
            }
            Resolution::Resolved { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(path: &str, value: &str) -> Mapping {
        Mapping::with_value(Path::parse(path).unwrap(), value)
    }

    #[test]
    fn test_new_fact_is_unresolved() {
        let mapping = fact("trade.flag", "true");
        assert_eq!(mapping.error(), Some(DEFAULT_UNMAPPED_ERROR));
        assert!(mapping.target_path().is_none());
        assert!(!mapping.is_success());
        assert!(!mapping.is_partial());
    }

    #[test]
    fn test_claim_clears_error() {
        let mut mapping = fact("trade.flag", "true");
        let target = Path::parse("Trade.flag").unwrap();

        assert_eq!(mapping.claim(&target, false), ClaimOutcome::Claimed);
        assert_eq!(mapping.target_path(), Some(&target));
        assert!(mapping.error().is_none());
        assert!(mapping.is_success());
    }

    #[test]
    fn test_claim_is_idempotent() {
        let mut mapping = fact("trade.flag", "true");
        let target = Path::parse("Trade.flag").unwrap();

        mapping.claim(&target, false);
        let snapshot = mapping.clone();
        assert_eq!(mapping.claim(&target, false), ClaimOutcome::AlreadyClaimed);
        assert_eq!(mapping, snapshot);
    }

    #[test]
    fn test_claim_never_overwrites() {
        let mut mapping = fact("trade.flag", "true");
        let first = Path::parse("Trade.first").unwrap();
        let second = Path::parse("Trade.second").unwrap();

        mapping.claim(&first, false);
        let outcome = mapping.claim(&second, true);

        assert_eq!(
            outcome,
            ClaimOutcome::Conflict {
                existing: first.clone()
            }
        );
        assert!(!outcome.is_claimed());
        assert_eq!(mapping.target_path(), Some(&first));
        assert!(!mapping.is_partial());
    }

    #[test]
    fn test_set_unresolved_only_on_unclaimed() {
        let mut mapping = fact("trade.flag", "maybe");
        assert!(mapping.set_unresolved("unrecognised scheme"));
        assert_eq!(mapping.error(), Some("unrecognised scheme"));

        mapping.claim(&Path::parse("Trade.flag").unwrap(), false);
        assert!(!mapping.set_unresolved("late diagnostic"));
        assert!(mapping.error().is_none());
    }

    #[test]
    fn test_deserialize_defaults_to_unresolved() {
        let mapping: Mapping =
            serde_json::from_str(r#"{"sourcePath": "a[0].b", "sourceValue": "x"}"#).unwrap();
        assert_eq!(mapping.source_value(), Some("x"));
        assert_eq!(mapping.error(), Some(DEFAULT_UNMAPPED_ERROR));
    }
}
