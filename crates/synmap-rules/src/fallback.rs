//! Priority-ordered fallback between two independent boolean signals
//!
//! The primary signal is a [`SchemeSignal`]. As soon as any primary candidate
//! carries the recognized scheme, the primary signal decides, even when it
//! decides `false` or cannot decide at all. Only when no primary candidate
//! carries the recognized scheme is the secondary signal consulted: a field
//! whose value equals a sentinel literal sets the flag to `true`.

use crate::scheme::{SchemeOutcome, SchemeSignal, field_suffix, require_field};
use synmap_core::{MappingContext, MappingId, MappingRule, Path, Result};
use tracing::debug;

/// A source field compared against a sentinel literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelSignal {
    field: Vec<String>,
    sentinel: String,
}

impl SentinelSignal {
    pub fn new(field: &str, sentinel: impl Into<String>) -> Self {
        Self {
            field: field_suffix(field),
            sentinel: sentinel.into(),
        }
    }

    /// First fact in document order whose value equals the sentinel
    pub fn evaluate(&self, context: &MappingContext) -> Option<MappingId> {
        context
            .find_by_suffix(&self.field)
            .into_iter()
            .find(|m| m.source_value() == Some(self.sentinel.as_str()))
            .map(|m| m.id())
    }
}

/// Which signal decided a [`PriorityFallbackRule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Primary { value: bool, source: MappingId },
    Fallback { source: MappingId },
    /// The primary signal matched the scheme without a boolean value
    PrimaryInconclusive,
    Unset,
}

impl Decision {
    pub fn value(&self) -> Option<bool> {
        match self {
            Decision::Primary { value, .. } => Some(*value),
            Decision::Fallback { .. } => Some(true),
            Decision::PrimaryInconclusive | Decision::Unset => None,
        }
    }
}

/// Sets a boolean target field from a primary scheme signal, falling back to
/// a sentinel signal
pub struct PriorityFallbackRule<B> {
    id: String,
    primary: SchemeSignal,
    fallback: SentinelSignal,
    setter: fn(&mut B, bool),
}

impl<B> PriorityFallbackRule<B> {
    pub fn new(
        id: impl Into<String>,
        primary: SchemeSignal,
        fallback: SentinelSignal,
        setter: fn(&mut B, bool),
    ) -> Self {
        Self {
            id: id.into(),
            primary,
            fallback,
            setter,
        }
    }

    /// Evaluate both signals in precedence order without touching the target
    pub fn decide(&self, context: &MappingContext) -> Result<Decision> {
        let decision = match self.primary.evaluate(context)? {
            SchemeOutcome::Definitive { value, source } => Decision::Primary { value, source },
            SchemeOutcome::Inconclusive => Decision::PrimaryInconclusive,
            SchemeOutcome::NoMatch => match self.fallback.evaluate(context) {
                Some(source) => Decision::Fallback { source },
                None => Decision::Unset,
            },
        };
        Ok(decision)
    }
}

impl<B> MappingRule for PriorityFallbackRule<B> {
    type Target = B;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(
        &self,
        synonym_path: &Path,
        target: &mut B,
        context: &mut MappingContext,
    ) -> Result<()> {
        require_field(&self.id, "primary", self.primary.field())?;
        require_field(&self.id, "fallback", &self.fallback.field)?;

        let decision = self.decide(context)?;
        debug!("[{}] {} decided by {:?}", self.id, synonym_path, decision);

        match decision {
            Decision::Primary { value, source } => {
                (self.setter)(target, value);
                context.mark_resolved(source, synonym_path)?;
            }
            Decision::Fallback { source } => {
                (self.setter)(target, true);
                context.mark_resolved(source, synonym_path)?;
            }
            Decision::PrimaryInconclusive | Decision::Unset => {}
        }
        Ok(())
    }
}
