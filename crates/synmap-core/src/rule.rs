//! Mapping rule contract
//!
//! A driver walking the target model invokes a rule at each position the rule
//! is registered for. The rule reads the fact table, writes into the target
//! builder it was handed, and may claim the facts it consumed. Rules never
//! call other rules; they coordinate only through the context and builders.

use crate::context::MappingContext;
use crate::path::Path;
use crate::result::Result;

/// A unit of mapping logic invoked at one or more target positions
pub trait MappingRule {
    /// Builder the rule writes into
    ///
    /// Single-valued positions use the parent builder; list-valued positions
    /// use a [`BuilderList`](crate::BuilderList) of child builders.
    type Target;

    /// Stable identifier used in logs and errors
    fn id(&self) -> &str;

    /// Resolve the rule at `synonym_path`
    ///
    /// Returning `Ok(())` does not mean anything was set: rules leave the
    /// target untouched when no fact matches. Errors are reserved for
    /// structural faults such as malformed paths.
    fn apply(
        &self,
        synonym_path: &Path,
        target: &mut Self::Target,
        context: &mut MappingContext,
    ) -> Result<()>;
}
