//! Two-level index correlation across nested repeating groups
//!
//! Source documents nest an inner repeating group inside an outer one, e.g.
//!
//! ```text
//! trade.party[0].relatedParty[0].partyReference
//! trade.party[0].relatedParty[0].role
//! trade.party[0].relatedParty[1].partyReference
//! trade.party[1].relatedParty[0].partyReference
//! ```
//!
//! Each inner occurrence holds a reference id and a role code. The target is a
//! flat list with one builder per inner occurrence, in document order. The
//! (outer, inner) position of an occurrence is read from the path, never from
//! list position, because outer groups can have different inner sizes.
//!
//! A [`CorrelationScope`] suppresses pairs that revisit an occurrence already
//! processed, while letting the same inner index recur under a new outer
//! group.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::marker::PhantomData;
use synmap_core::{
    BuilderList, Mapping, MappingConfig, MappingContext, MappingId, MappingRule, PairingStrategy,
    Path, Result, SynonymEnum,
};
use tracing::{debug, trace};

use crate::scheme::{field_suffix, require_field};

/// A target list entry holding a reference and the roles it plays
pub trait RoleEntry: Default {
    type Role: SynonymEnum;

    fn roles(&self) -> &[Self::Role];

    fn add_role(&mut self, role: Self::Role);

    fn set_reference(&mut self, reference: String);
}

/// Position of one inner occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceKey {
    pub outer: usize,
    pub inner: usize,
}

impl OccurrenceKey {
    pub fn new(outer: usize, inner: usize) -> Self {
        Self { outer, inner }
    }

    /// Read the key from a leaf field path
    ///
    /// The inner index is the index of the leaf's parent, the outer index the
    /// index of the element two levels up. A non-repeated element counts as
    /// index 0.
    pub fn from_leaf(path: &Path) -> Result<Self> {
        Ok(Self {
            outer: path.index_from_end(2)?.unwrap_or(0),
            inner: path.index_from_end(1)?.unwrap_or(0),
        })
    }
}

/// Where a [`CorrelationScope`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePhase {
    NoOuterSeen,
    /// One outer group seen; inner de-duplication spans everything so far
    SingleOuter,
    /// Several outer groups seen; inner de-duplication restarts per new group
    MultipleOuter,
}

/// Duplicate-suppression state for one rule invocation
#[derive(Debug, Clone, Default)]
pub struct CorrelationScope {
    seen_outer: HashSet<usize>,
    seen_inner_in_scope: HashSet<usize>,
    outer_observed: usize,
}

impl CorrelationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this occurrence was already processed in the current scope
    pub fn is_duplicate(&self, key: OccurrenceKey) -> bool {
        self.seen_outer.contains(&key.outer) && self.seen_inner_in_scope.contains(&key.inner)
    }

    /// Record a processed occurrence
    ///
    /// When the outer set grows and more than one outer group has been
    /// observed, the inner scope restarts with just this inner index.
    pub fn record(&mut self, key: OccurrenceKey) {
        let new_outer = self.seen_outer.insert(key.outer);
        self.seen_inner_in_scope.insert(key.inner);

        if new_outer {
            self.outer_observed += 1;
            if self.outer_observed > 1 {
                self.seen_inner_in_scope.clear();
                self.seen_inner_in_scope.insert(key.inner);
            }
        }
    }

    pub fn phase(&self) -> ScopePhase {
        match self.outer_observed {
            0 => ScopePhase::NoOuterSeen,
            1 => ScopePhase::SingleOuter,
            _ => ScopePhase::MultipleOuter,
        }
    }
}

/// One (reference, role) pair of facts
#[derive(Debug, Clone)]
struct FactPair {
    reference_id: MappingId,
    reference_path: Path,
    role_id: MappingId,
    role_path: Path,
}

impl FactPair {
    fn new(reference: &Mapping, role: &Mapping) -> Self {
        Self {
            reference_id: reference.id(),
            reference_path: reference.source_path().clone(),
            role_id: role.id(),
            role_path: role.source_path().clone(),
        }
    }
}

/// Builds one target entry per inner occurrence from paired reference and
/// role facts
pub struct RoleCorrelationRule<E> {
    id: String,
    reference_field: Vec<String>,
    role_field: Vec<String>,
    pairing: PairingStrategy,
    _entry: PhantomData<fn() -> E>,
}

impl<E> RoleCorrelationRule<E> {
    /// `reference_field` and `role_field` are dotted suffixes ending in the
    /// inner group's leaf fields
    pub fn new(id: impl Into<String>, reference_field: &str, role_field: &str) -> Self {
        Self {
            id: id.into(),
            reference_field: field_suffix(reference_field),
            role_field: field_suffix(role_field),
            pairing: PairingStrategy::default(),
            _entry: PhantomData,
        }
    }

    /// Create a rule using the pairing strategy of `config`
    pub fn from_config(
        id: impl Into<String>,
        reference_field: &str,
        role_field: &str,
        config: &MappingConfig,
    ) -> Self {
        Self::new(id, reference_field, role_field).with_pairing(config.pairing)
    }

    pub fn with_pairing(mut self, pairing: PairingStrategy) -> Self {
        self.pairing = pairing;
        self
    }

    fn pairs(&self, context: &MappingContext) -> Vec<FactPair> {
        let references = context.find_by_suffix(&self.reference_field);
        let roles = context.find_by_suffix(&self.role_field);

        match self.pairing {
            PairingStrategy::Adjacent => references
                .iter()
                .zip(roles.iter())
                .map(|(reference, role)| FactPair::new(reference, role))
                .collect(),
            PairingStrategy::ByKey => {
                let mut used = vec![false; roles.len()];
                let mut pairs = Vec::new();
                for reference in &references {
                    let parent = reference.source_path().parent();
                    let found = roles.iter().enumerate().find(|(i, role)| {
                        !used[*i] && role.source_path().parent() == parent
                    });
                    match found {
                        Some((i, role)) => {
                            used[i] = true;
                            pairs.push(FactPair::new(reference, role));
                        }
                        None => trace!("no role fact next to {}", reference.source_path()),
                    }
                }
                pairs
            }
        }
    }
}

impl<E: RoleEntry> MappingRule for RoleCorrelationRule<E> {
    type Target = BuilderList<E>;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(
        &self,
        synonym_path: &Path,
        entries: &mut BuilderList<E>,
        context: &mut MappingContext,
    ) -> Result<()> {
        require_field(&self.id, "reference", &self.reference_field)?;
        require_field(&self.id, "role", &self.role_field)?;

        let mut scope = CorrelationScope::new();
        let mut slots: IndexMap<OccurrenceKey, usize> = IndexMap::new();

        for pair in self.pairs(context) {
            let key = OccurrenceKey::from_leaf(&pair.reference_path)?;
            if scope.is_duplicate(key) {
                debug!("[{}] skipping revisited occurrence {:?}", self.id, key);
                continue;
            }

            let Some(reference) = context.value_of(&pair.reference_path).map(str::to_string)
            else {
                trace!("[{}] {} has no value", self.id, pair.reference_path);
                continue;
            };
            let Some(role) = context
                .value_of(&pair.role_path)
                .and_then(|raw| context.lookup::<E::Role>(raw))
            else {
                debug!("[{}] cannot decode role at {}", self.id, pair.role_path);
                continue;
            };

            let next_slot = slots.len();
            let slot = *slots.entry(key).or_insert(next_slot);
            let entry = entries.get_or_append(slot);
            if !entry.roles().contains(&role) {
                entry.add_role(role);
                entry.set_reference(reference);
            }

            let target = synonym_path.with_last_index(slot)?;
            context.mark_resolved(pair.reference_id, &target)?;
            context.mark_resolved(pair.role_id, &target)?;

            scope.record(key);
            trace!("[{}] {:?} -> slot {} ({:?})", self.id, key, slot, scope.phase());
        }

        Ok(())
    }
}
