//! Document passes
//!
//! A [`MappingContext`] lives exactly as long as one pass: [`MappingPass::run`]
//! builds it from the decoded facts, hands it to the driver closure, and
//! consumes it into a [`PassReport`]. Independent documents can be mapped in
//! parallel with [`MappingPass::run_batch`]; each worker owns its own context
//! and builders, so no state is shared between documents.

use crate::config::MappingConfig;
use crate::context::MappingContext;
use crate::mapping::Mapping;
use crate::result::Result;
use crate::stats::ResolutionStats;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Decoded facts of one source document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Name used in logs and reports (file name, message id, ...)
    pub name: String,
    pub mappings: Vec<Mapping>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, mappings: Vec<Mapping>) -> Self {
        Self {
            name: name.into(),
            mappings,
        }
    }
}

/// Result of a completed pass
#[derive(Debug)]
pub struct PassReport<T> {
    /// Whatever the driver built (usually the finished target record)
    pub output: T,
    /// Facts with their final resolution state
    pub mappings: Vec<Mapping>,
    pub stats: ResolutionStats,
}

/// Outcome of one document in a batch
#[derive(Debug)]
pub struct DocumentOutcome<T> {
    pub name: String,
    pub result: Result<PassReport<T>>,
}

impl<T> DocumentOutcome<T> {
    /// Whether the pass failed with an error that is not specific to this
    /// document (configuration, I/O or internal faults)
    pub fn is_fatal(&self) -> bool {
        matches!(&self.result, Err(err) if !err.is_recoverable())
    }
}

/// Runs mapping passes against a shared configuration
pub struct MappingPass<'a> {
    config: &'a MappingConfig,
}

impl<'a> MappingPass<'a> {
    pub fn new(config: &'a MappingConfig) -> Self {
        Self { config }
    }

    /// Run one pass over `mappings`
    ///
    /// An error from `driver` aborts this pass only.
    pub fn run<T, F>(&self, mappings: Vec<Mapping>, driver: F) -> Result<PassReport<T>>
    where
        F: FnOnce(&mut MappingContext) -> Result<T>,
    {
        let mut context = MappingContext::from_config(mappings, self.config);
        let output = driver(&mut context)?;
        let stats = context.stats();
        debug!("Pass finished: {}", stats);
        Ok(PassReport {
            output,
            mappings: context.into_mappings(),
            stats,
        })
    }

    /// Run independent passes in parallel, keeping input order
    ///
    /// Every document is attempted. Failures caused by the document itself
    /// (malformed paths, rule misuse) are logged as warnings, anything else as
    /// an error.
    pub fn run_batch<T, F>(
        &self,
        documents: Vec<SourceDocument>,
        driver: F,
    ) -> Vec<DocumentOutcome<T>>
    where
        F: Fn(&mut MappingContext) -> Result<T> + Sync,
        T: Send,
    {
        let start_time = Instant::now();
        let total = documents.len();

        let outcomes: Vec<DocumentOutcome<T>> = documents
            .into_par_iter()
            .map(|document| {
                let _span =
                    tracing::debug_span!("mapping_pass", document = %document.name).entered();
                let result = self.run(document.mappings, &driver);
                match &result {
                    Err(err) if err.is_recoverable() => {
                        warn!("Mapping pass for '{}' failed: {}", document.name, err)
                    }
                    Err(err) => error!("Mapping pass for '{}' aborted: {}", document.name, err),
                    Ok(_) => {}
                }
                DocumentOutcome {
                    name: document.name,
                    result,
                }
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        let fatal = outcomes.iter().filter(|o| o.is_fatal()).count();
        info!(
            "Completed {} mapping passes in {:?} ({} failed, {} fatal)",
            total,
            start_time.elapsed(),
            failed,
            fatal
        );
        outcomes
    }
}

/// Sum the statistics of every successful pass in a batch
pub fn batch_stats<T>(outcomes: &[DocumentOutcome<T>]) -> ResolutionStats {
    let mut total = ResolutionStats::new();
    for outcome in outcomes {
        if let Ok(report) = &outcome.result {
            total.merge(&report.stats);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;
    use crate::path::Path;

    fn document(name: &str, values: &[&str]) -> SourceDocument {
        let mappings = values
            .iter()
            .enumerate()
            .map(|(i, v)| Mapping::with_value(Path::parse(&format!("doc.item[{i}]")).unwrap(), *v))
            .collect();
        SourceDocument::new(name, mappings)
    }

    #[test]
    fn test_run_returns_report() {
        let config = MappingConfig::default();
        let report = MappingPass::new(&config)
            .run(document("a", &["x", "y"]).mappings, |ctx| {
                let id = ctx.mappings()[0].id();
                ctx.mark_resolved(id, &Path::parse("Doc.first").unwrap())?;
                Ok(ctx.len())
            })
            .unwrap();

        assert_eq!(report.output, 2);
        assert_eq!(report.stats.resolved, 1);
        assert_eq!(report.stats.unresolved, 1);
        assert!(report.mappings[0].is_success());
    }

    #[test]
    fn test_run_propagates_driver_error() {
        let config = MappingConfig::default();
        let result: Result<PassReport<()>> = MappingPass::new(&config)
            .run(Vec::new(), |_| Err(MappingError::malformed_path("", "empty")));
        assert!(result.is_err());
    }

    #[test]
    fn test_run_batch_keeps_order_and_isolates_failures() {
        let config = MappingConfig::default();
        let documents = vec![
            document("first", &["1"]),
            document("broken", &[]),
            document("third", &["1", "2", "3"]),
        ];

        let outcomes = MappingPass::new(&config).run_batch(documents, |ctx| {
            if ctx.is_empty() {
                return Err(MappingError::malformed_path("", "no facts"));
            }
            let ids: Vec<_> = ctx.mappings().iter().map(Mapping::id).collect();
            for id in ids {
                ctx.mark_resolved(id, &Path::parse("Doc.item").unwrap())?;
            }
            Ok(ctx.len())
        });

        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["first", "broken", "third"]);
        assert!(outcomes[1].result.is_err());
        assert!(!outcomes[1].is_fatal());
        assert_eq!(outcomes[2].result.as_ref().unwrap().output, 3);

        let stats = batch_stats(&outcomes);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.resolved, 4);
    }

    #[test]
    fn test_run_batch_classifies_failures() {
        let config = MappingConfig::default();
        let documents = vec![
            document("misused-rule", &["rule"]),
            document("internal", &["internal"]),
            document("fine", &["ok"]),
        ];

        let outcomes = MappingPass::new(&config).run_batch(documents, |ctx| {
            match ctx.mappings()[0].source_value() {
                Some("rule") => Err(MappingError::rule_error("copy", "empty field suffix")),
                Some("internal") => Err(MappingError::internal_error("fact table out of sync")),
                _ => Ok(()),
            }
        });

        assert!(outcomes[0].result.is_err());
        assert!(!outcomes[0].is_fatal());
        assert!(outcomes[1].is_fatal());
        assert!(outcomes[2].result.is_ok());
        assert!(!outcomes[2].is_fatal());
    }
}
