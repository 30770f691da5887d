//! synmap core
//!
//! Data model and rule contract for projecting a flattened, path-addressed
//! source document into a typed target record.
//!
//! - [`Path`] addresses one field occurrence in the source document
//! - [`Mapping`] is one extracted fact with its resolution state
//! - [`MappingContext`] is the fact table of one document pass
//! - [`MappingRule`] is the contract rules implement for the driver
//! - [`MappingPass`] scopes a context to a single pass and runs batches

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod mapping;
pub mod pass;
pub mod path;
pub mod result;
pub mod rule;
pub mod stats;
pub mod synonym;

pub use builder::BuilderList;
pub use config::{ConfigLoader, MappingConfig, PairingStrategy};
pub use context::MappingContext;
pub use error::{ErrorKind, MappingError};
pub use mapping::{ClaimOutcome, DEFAULT_UNMAPPED_ERROR, Mapping, MappingId, Resolution};
pub use pass::{DocumentOutcome, MappingPass, PassReport, SourceDocument, batch_stats};
pub use path::{Path, PathElement};
pub use result::Result;
pub use rule::MappingRule;
pub use stats::{FieldStatus, ResolutionStats};
pub use synonym::{SynonymEnum, SynonymTables};

/// Initialize the tracing subscriber for logging
///
/// Filter defaults to `synmap=info` unless `RUST_LOG` is set.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("synmap=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
