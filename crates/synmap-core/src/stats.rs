//! Resolution statistics for downstream reporting

use crate::mapping::Mapping;
use serde::Serialize;
use std::fmt;

/// What a report should show for one source field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldStatus {
    /// No fact exists for the field
    Absent,
    /// A fact exists and still carries its diagnostic
    Unresolved,
    /// A fact exists and was claimed by a rule
    Resolved,
}

/// Counts of resolved and unresolved facts after a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    /// Number of facts in the table
    pub total: usize,
    /// Number of claimed facts (including partial claims)
    pub resolved: usize,
    /// Number of claimed facts whose value was only partly used
    pub partial: usize,
    /// Number of facts still carrying a diagnostic
    pub unresolved: usize,
}

impl ResolutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally a sequence of facts
    pub fn from_mappings<'a>(mappings: impl IntoIterator<Item = &'a Mapping>) -> Self {
        let mut stats = Self::new();
        for mapping in mappings {
            stats.record(mapping);
        }
        stats
    }

    pub fn record(&mut self, mapping: &Mapping) {
        self.total += 1;
        if mapping.is_success() {
            self.resolved += 1;
            if mapping.is_partial() {
                self.partial += 1;
            }
        } else {
            self.unresolved += 1;
        }
    }

    /// Fold another pass's statistics into this one
    pub fn merge(&mut self, other: &ResolutionStats) {
        self.total += other.total;
        self.resolved += other.resolved;
        self.partial += other.partial;
        self.unresolved += other.unresolved;
    }

    /// Share of facts resolved, in percent
    pub fn resolved_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.resolved as f64 * 100.0 / self.total as f64
    }
}

impl fmt::Display for ResolutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} facts resolved ({:.1}%)",
            self.resolved,
            self.total,
            self.resolved_percent()
        )?;
        if self.partial > 0 {
            write!(f, ", {} partial", self.partial)?;
        }
        if self.unresolved > 0 {
            write!(f, ", {} unresolved", self.unresolved)?;
        }
        Ok(())
    }
}
