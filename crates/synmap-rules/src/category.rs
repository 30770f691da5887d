//! Per-category classification with ordinal tagging
//!
//! Target list entries are tagged with a category (e.g. a regulator). Source
//! classification facts carry a raw code and a scheme URI; each recognized
//! scheme belongs to one category. For every category, in configuration
//! order:
//!
//! 1. Select the entry tagged with the category. Without one the category is
//!    skipped; entries are never created here.
//! 2. For each fact whose scheme belongs to the category, decode the code as
//!    the primary enumeration, or failing that as the secondary enumeration
//!    tagged with ordinal = declared position + 1.
//! 3. Attach the last decodable classification to the entry and claim the
//!    fact it came from. Undecodable and superseded facts keep their original
//!    diagnostic.
//!
//! Categories without a matching fact get no classification at all. Each
//! scheme belongs to one category only.

use indexmap::IndexMap;
use std::marker::PhantomData;
use synmap_core::{
    BuilderList, MappingConfig, MappingContext, MappingError, MappingId, MappingRule, Path, Result,
    SynonymEnum,
};
use tracing::{debug, warn};

use crate::scheme::{field_suffix, require_field};

/// A secondary code together with its fixed ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdinalValue<S> {
    pub value: S,
    /// Declared position of `value` plus one
    pub ordinal: usize,
}

impl<S: SynonymEnum> OrdinalValue<S> {
    pub fn new(value: S) -> Self {
        Self {
            value,
            ordinal: value.ordinal() + 1,
        }
    }
}

/// Decoded classification attached to a category entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<P, S> {
    Primary(P),
    Secondary(OrdinalValue<S>),
}

impl<P: SynonymEnum, S: SynonymEnum> Classification<P, S> {
    /// Decode `raw` as `P`, falling back to `S`
    pub fn decode(context: &MappingContext, raw: &str) -> Option<Self> {
        if let Some(primary) = context.lookup::<P>(raw) {
            return Some(Classification::Primary(primary));
        }
        context
            .lookup::<S>(raw)
            .map(|secondary| Classification::Secondary(OrdinalValue::new(secondary)))
    }
}

/// A target list entry tagged with a category
pub trait CategorisedEntry {
    type Primary: SynonymEnum;
    type Secondary: SynonymEnum;

    fn category(&self) -> Option<&str>;

    fn set_classification(
        &mut self,
        classification: Classification<Self::Primary, Self::Secondary>,
    );
}

/// One classification fact with its scheme
struct Candidate {
    id: MappingId,
    scheme: String,
    value: Option<String>,
}

/// Distributes classification facts to category-tagged list entries
pub struct CategoryClassificationRule<E> {
    id: String,
    field: Vec<String>,
    scheme_attribute: String,
    categories: IndexMap<String, Vec<String>>,
    _entry: PhantomData<fn() -> E>,
}

impl<E> CategoryClassificationRule<E> {
    pub fn new(id: impl Into<String>, field: &str, scheme_attribute: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field: field_suffix(field),
            scheme_attribute: scheme_attribute.into(),
            categories: IndexMap::new(),
            _entry: PhantomData,
        }
    }

    /// Create a rule recognizing the categories of `config`
    pub fn from_config(
        id: impl Into<String>,
        field: &str,
        scheme_attribute: impl Into<String>,
        config: &MappingConfig,
    ) -> Self {
        let mut rule = Self::new(id, field, scheme_attribute);
        for (category, schemes) in &config.categories {
            rule = rule.with_category(category.clone(), schemes.iter().cloned());
        }
        rule
    }

    /// Recognize `schemes` as belonging to `category`
    ///
    /// A scheme already registered for another category moves to `category`.
    pub fn with_category<I, S>(mut self, category: impl Into<String>, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let category = category.into();
        self.categories.entry(category.clone()).or_default();

        for scheme in schemes.into_iter().map(Into::into) {
            for (owner, owned) in self.categories.iter_mut() {
                if *owner != category && owned.contains(&scheme) {
                    debug!(
                        "[{}] scheme {} moves from {} to {}",
                        self.id, scheme, owner, category
                    );
                    owned.retain(|s| *s != scheme);
                }
            }
            let owned = self.categories.entry(category.clone()).or_default();
            if !owned.contains(&scheme) {
                owned.push(scheme);
            }
        }
        self
    }

    /// Category that owns `scheme`
    pub fn category_of(&self, scheme: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, schemes)| schemes.iter().any(|s| s == scheme))
            .map(|(category, _)| category.as_str())
    }

    fn candidates(&self, context: &MappingContext) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for mapping in context.find_by_suffix(&self.field) {
            let element = mapping.source_path().last_element()?;
            if let Some(scheme) = element.attribute(&self.scheme_attribute) {
                candidates.push(Candidate {
                    id: mapping.id(),
                    scheme: scheme.to_string(),
                    value: mapping.source_value().map(str::to_string),
                });
            }
        }
        Ok(candidates)
    }
}

impl<E: CategorisedEntry> MappingRule for CategoryClassificationRule<E> {
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
        require_field(&self.id, "classification", &self.field)?;
        if self.scheme_attribute.is_empty() {
            return Err(MappingError::rule_error(&self.id, "scheme attribute name is empty"));
        }
        let candidates = self.candidates(context)?;

        for (category, schemes) in &self.categories {
            let Some((index, entry)) =
                entries.find_mut(|e| e.category() == Some(category.as_str()))
            else {
                debug!("[{}] no entry for category {}", self.id, category);
                continue;
            };
            let target = synonym_path.with_last_index(index)?;

            let mut winner = None;
            for candidate in candidates.iter().filter(|c| schemes.contains(&c.scheme)) {
                let Some(raw) = candidate.value.as_deref() else {
                    continue;
                };
                match Classification::<E::Primary, E::Secondary>::decode(context, raw) {
                    Some(classification) => {
                        let previous = winner.replace((classification, candidate.id));
                        if let Some((_, superseded)) = previous {
                            debug!("[{}] {} superseded by {}", self.id, superseded, candidate.id);
                        }
                    }
                    None => warn!(
                        "[{}] cannot decode '{}' for category {}",
                        self.id, raw, category
                    ),
                }
            }

            if let Some((classification, source)) = winner {
                debug!("[{}] {} classified as {:?}", self.id, category, classification);
                entry.set_classification(classification);
                context.mark_resolved(source, &target)?;
            }
        }

        Ok(())
    }
}
