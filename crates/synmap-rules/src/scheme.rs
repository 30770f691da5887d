//! Scheme-qualified boolean flags
//!
//! Sets a boolean target field from one of several candidate source facts.
//! A candidate only counts when it carries the classification scheme the rule
//! recognizes; its value is then read as a tri-state boolean.
//!
//! Candidates are evaluated in document order:
//! - no scheme attribute: inconclusive, try the next candidate
//! - unrecognized scheme: inconclusive, try the next candidate
//! - recognized scheme, value `"true"` / `"false"`: definitive, stop
//! - recognized scheme, any other value: inconclusive, try the next candidate
//!
//! When nothing is definitive the target field stays unset, which is not the
//! same as `false`.

use synmap_core::{MappingContext, MappingError, MappingId, MappingRule, Path, Result};
use tracing::{debug, trace};

/// Result of evaluating a [`SchemeSignal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeOutcome {
    /// A candidate with the recognized scheme had a boolean value
    Definitive { value: bool, source: MappingId },
    /// Candidates carried the recognized scheme but none had a boolean value
    Inconclusive,
    /// No candidate carried the recognized scheme
    NoMatch,
}

impl SchemeOutcome {
    /// The boolean value, if the signal was definitive
    pub fn value(&self) -> Option<bool> {
        match self {
            SchemeOutcome::Definitive { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Whether any candidate carried the recognized scheme
    pub fn matched_scheme(&self) -> bool {
        !matches!(self, SchemeOutcome::NoMatch)
    }
}

/// Read a source value as a tri-state boolean
pub fn parse_tristate(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Split a dotted field suffix into element names
pub(crate) fn field_suffix(field: &str) -> Vec<String> {
    field
        .split('.')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reject an empty field suffix, which would match every fact
pub(crate) fn require_field(rule_id: &str, what: &str, field: &[String]) -> Result<()> {
    if field.is_empty() {
        return Err(MappingError::rule_error(
            rule_id,
            format!("{what} field suffix is empty"),
        ));
    }
    Ok(())
}

/// A boolean source field qualified by a classification scheme attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeSignal {
    field: Vec<String>,
    scheme_attribute: String,
    recognized_scheme: String,
}

impl SchemeSignal {
    /// `field` is a dotted suffix of the candidate source paths
    pub fn new(
        field: &str,
        scheme_attribute: impl Into<String>,
        recognized_scheme: impl Into<String>,
    ) -> Self {
        Self {
            field: field_suffix(field),
            scheme_attribute: scheme_attribute.into(),
            recognized_scheme: recognized_scheme.into(),
        }
    }

    pub fn field(&self) -> &[String] {
        &self.field
    }

    pub fn recognized_scheme(&self) -> &str {
        &self.recognized_scheme
    }

    /// Evaluate all candidates in document order
    pub fn evaluate(&self, context: &MappingContext) -> Result<SchemeOutcome> {
        let mut matched = false;

        for mapping in context.find_by_suffix(&self.field) {
            let element = mapping.source_path().last_element()?;

            let Some(scheme) = element.attribute(&self.scheme_attribute) else {
                trace!("{} has no {} attribute", mapping.source_path(), self.scheme_attribute);
                continue;
            };
            if scheme != self.recognized_scheme {
                trace!("{} has unrecognized scheme '{}'", mapping.source_path(), scheme);
                continue;
            }

            matched = true;
            match mapping.source_value().and_then(parse_tristate) {
                Some(value) => {
                    return Ok(SchemeOutcome::Definitive {
                        value,
                        source: mapping.id(),
                    });
                }
                None => trace!(
                    "{} has recognized scheme but value {:?}",
                    mapping.source_path(),
                    mapping.source_value()
                ),
            }
        }

        Ok(if matched {
            SchemeOutcome::Inconclusive
        } else {
            SchemeOutcome::NoMatch
        })
    }
}

/// Sets a boolean target field from a scheme-qualified source field
pub struct SchemeFlagRule<B> {
    id: String,
    signal: SchemeSignal,
    setter: fn(&mut B, bool),
}

impl<B> SchemeFlagRule<B> {
    pub fn new(id: impl Into<String>, signal: SchemeSignal, setter: fn(&mut B, bool)) -> Self {
        Self {
            id: id.into(),
            signal,
            setter,
        }
    }

    pub fn signal(&self) -> &SchemeSignal {
        &self.signal
    }
}

impl<B> MappingRule for SchemeFlagRule<B> {
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
        require_field(&self.id, "flag", self.signal.field())?;

        match self.signal.evaluate(context)? {
            SchemeOutcome::Definitive { value, source } => {
                debug!("[{}] {} = {}", self.id, synonym_path, value);
                (self.setter)(target, value);
                context.mark_resolved(source, synonym_path)?;
            }
            outcome => debug!("[{}] {} left unset ({:?})", self.id, synonym_path, outcome),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TradeFlagsBuilder;
    use synmap_core::Mapping;

    const SCHEME: &str = "http://www.fpml.org/coding-scheme/intragroup";
    const OTHER_SCHEME: &str = "http://example.com/other";

    fn fact(path: &str, value: &str) -> Mapping {
        Mapping::with_value(Path::parse(path).unwrap(), value)
    }

    fn flag(scheme: Option<&str>, index: usize, value: &str) -> Mapping {
        let path = match scheme {
            Some(scheme) => format!("trade.indicator[{index}].intragroup(scheme={scheme})"),
            None => format!("trade.indicator[{index}].intragroup"),
        };
        fact(&path, value)
    }

    fn rule() -> SchemeFlagRule<TradeFlagsBuilder> {
        SchemeFlagRule::new(
            "intragroup",
            SchemeSignal::new("indicator.intragroup", "scheme", SCHEME),
            TradeFlagsBuilder::set_intragroup,
        )
    }

    fn run(facts: Vec<Mapping>) -> (TradeFlagsBuilder, MappingContext) {
        let mut ctx = MappingContext::new(facts);
        let mut flags = TradeFlagsBuilder::default();
        rule()
            .apply(&Path::parse("Trade.intragroup").unwrap(), &mut flags, &mut ctx)
            .unwrap();
        (flags, ctx)
    }

    #[test]
    fn test_parse_tristate() {
        assert_eq!(parse_tristate("true"), Some(true));
        assert_eq!(parse_tristate("false"), Some(false));
        assert_eq!(parse_tristate("TRUE"), None);
        assert_eq!(parse_tristate("yes"), None);
    }

    #[test]
    fn test_recognized_true() {
        let (flags, ctx) = run(vec![flag(Some(SCHEME), 0, "true")]);
        assert_eq!(flags.intragroup, Some(true));
        assert!(ctx.mappings()[0].is_success());
    }

    #[test]
    fn test_recognized_false_is_not_unset() {
        let (flags, _) = run(vec![flag(Some(SCHEME), 0, "false")]);
        assert_eq!(flags.intragroup, Some(false));
    }

    #[test]
    fn test_unrecognized_scheme_leaves_unset() {
        let (flags, ctx) = run(vec![flag(Some(OTHER_SCHEME), 0, "true")]);
        assert_eq!(flags.intragroup, None);
        assert!(!ctx.mappings()[0].is_success());
    }

    #[test]
    fn test_missing_scheme_leaves_unset() {
        let (flags, _) = run(vec![flag(None, 0, "true")]);
        assert_eq!(flags.intragroup, None);
    }

    #[test]
    fn test_no_candidates_leaves_unset() {
        let (flags, _) = run(vec![fact("trade.tradeId", "T-1")]);
        assert_eq!(flags, TradeFlagsBuilder::default());
    }

    #[test]
    fn test_candidate_without_scheme_does_not_stop_evaluation() {
        let (flags, ctx) = run(vec![
            flag(None, 0, "true"),
            flag(Some(OTHER_SCHEME), 1, "true"),
            flag(Some(SCHEME), 2, "false"),
        ]);
        assert_eq!(flags.intragroup, Some(false));
        assert!(ctx.mappings()[2].is_success());
        assert!(!ctx.mappings()[0].is_success());
    }

    #[test]
    fn test_first_definitive_candidate_wins() {
        let (flags, _) = run(vec![
            flag(Some(SCHEME), 0, "unknown"),
            flag(Some(SCHEME), 1, "true"),
            flag(Some(SCHEME), 2, "false"),
        ]);
        assert_eq!(flags.intragroup, Some(true));
    }

    #[test]
    fn test_empty_field_is_a_rule_error() {
        let rule = SchemeFlagRule::new(
            "intragroup",
            SchemeSignal::new("", "scheme", SCHEME),
            TradeFlagsBuilder::set_intragroup,
        );
        let mut ctx = MappingContext::new(vec![flag(Some(SCHEME), 0, "true")]);
        let mut flags = TradeFlagsBuilder::default();

        let err = rule
            .apply(&Path::parse("Trade.intragroup").unwrap(), &mut flags, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, MappingError::RuleError { .. }));
        assert!(err.is_recoverable());
        assert_eq!(flags.intragroup, None);
    }

    #[test]
    fn test_outcomes() {
        let signal = SchemeSignal::new("intragroup", "scheme", SCHEME);

        let ctx = MappingContext::new(vec![flag(Some(SCHEME), 0, "n/a")]);
        let outcome = signal.evaluate(&ctx).unwrap();
        assert_eq!(outcome, SchemeOutcome::Inconclusive);
        assert!(outcome.matched_scheme());
        assert_eq!(outcome.value(), None);

        let ctx = MappingContext::new(vec![flag(None, 0, "true")]);
        assert_eq!(signal.evaluate(&ctx).unwrap(), SchemeOutcome::NoMatch);
    }
}
