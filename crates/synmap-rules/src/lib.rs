//! synmap rules
//!
//! Reusable [`MappingRule`](synmap_core::MappingRule) implementations:
//!
//! - [`SchemeFlagRule`]: boolean flag qualified by a classification scheme
//! - [`PriorityFallbackRule`]: primary scheme signal with a sentinel fallback
//! - [`CategoryClassificationRule`]: per-category classification with ordinal
//!   tagging
//! - [`RoleCorrelationRule`]: reference/role pairs correlated across two
//!   nested repeating groups
//!
//! [`model`] holds a small reference target model the rules are exercised
//! against.

pub mod category;
pub mod correlation;
pub mod fallback;
pub mod model;
pub mod scheme;

pub use category::{CategorisedEntry, CategoryClassificationRule, Classification, OrdinalValue};
pub use correlation::{CorrelationScope, OccurrenceKey, RoleCorrelationRule, RoleEntry, ScopePhase};
pub use fallback::{Decision, PriorityFallbackRule, SentinelSignal};
pub use scheme::{SchemeFlagRule, SchemeOutcome, SchemeSignal, parse_tristate};
pub use synmap_core::PairingStrategy;
