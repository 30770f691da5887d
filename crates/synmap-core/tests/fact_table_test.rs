//! Integration tests for the fact table and pass lifecycle
//!
//! This test suite covers:
//! - Loading decoded facts from JSON
//! - Claiming facts through a pass and reading back reporting status
//! - Configuration discovery feeding synonym tables into a pass

use std::fs;
use synmap_core::{
    ConfigLoader, FieldStatus, Mapping, MappingConfig, MappingContext, MappingPass, Path,
    ResolutionStats, SynonymEnum,
};
use tempfile::TempDir;

synmap_core::synonym_enum! {
    enum Side: "SideEnum" {
        Buy => "B",
        Sell => "S",
    }
}

const FACTS_JSON: &str = r#"[
    {"sourcePath": "trade.tradeId", "sourceValue": "T-1"},
    {"sourcePath": "trade.side", "sourceValue": "BUY"},
    {"sourcePath": "trade.venue"},
    {"sourcePath": "trade.notional", "sourceValue": "1000000", "resolution": {"state": "unresolved", "error": "Amount without currency"}}
]"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("synmap_core=debug")
        .try_init();
}

fn path(s: &str) -> Path {
    Path::parse(s).unwrap()
}

fn facts() -> Vec<Mapping> {
    serde_json::from_str(FACTS_JSON).unwrap()
}

#[test]
fn test_facts_load_from_json() {
    let ctx = MappingContext::new(facts());
    assert_eq!(ctx.len(), 4);
    assert_eq!(ctx.value_of(&path("trade.venue")), None);
    assert_eq!(
        ctx.get(ctx.mappings()[3].id()).unwrap().error(),
        Some("Amount without currency")
    );
}

#[test]
fn test_pass_distinguishes_absent_unresolved_resolved() {
    init_tracing();
    let config = MappingConfig::from_yaml_str("synonyms:\n  SideEnum:\n    BUY: B\n").unwrap();

    let report = MappingPass::new(&config)
        .run(facts(), |ctx| {
            let side = ctx
                .find_by_suffix(&["side"])
                .first()
                .map(|m| (m.id(), m.source_value().map(str::to_string)));
            let mut decoded = None;
            if let Some((id, Some(raw))) = side {
                decoded = ctx.lookup::<Side>(&raw);
                if decoded.is_some() {
                    ctx.mark_resolved(id, &path("Trade.side"))?;
                }
            }

            assert_eq!(ctx.status_of(&path("trade.side")), FieldStatus::Resolved);
            assert_eq!(ctx.status_of(&path("trade.notional")), FieldStatus::Unresolved);
            assert_eq!(ctx.status_of(&path("trade.clearing")), FieldStatus::Absent);
            Ok(decoded)
        })
        .unwrap();

    assert_eq!(report.output, Some(Side::Buy));
    assert_eq!(report.output.map(|s| s.ordinal()), Some(0));
    assert_eq!(
        report.stats,
        ResolutionStats {
            total: 4,
            resolved: 1,
            partial: 0,
            unresolved: 3,
        }
    );

    for mapping in &report.mappings {
        assert_eq!(
            mapping.target_path().is_some(),
            mapping.error().is_none(),
            "resolved and errored must be exclusive for {}",
            mapping.source_path()
        );
    }
}

#[test]
fn test_discovered_config_drives_pass() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("synmap.yaml"),
        "unmappedMessage: Field not mapped\nsynonyms:\n  SideEnum:\n    SELL: S\n",
    )
    .unwrap();

    let config = ConfigLoader::load(None, Some(temp_dir.path())).unwrap();
    let report = MappingPass::new(&config)
        .run(facts(), |ctx| Ok(ctx.lookup::<Side>("SELL")))
        .unwrap();

    assert_eq!(report.output, Some(Side::Sell));
    assert_eq!(report.mappings[0].error(), Some("Field not mapped"));
    assert_eq!(report.mappings[3].error(), Some("Amount without currency"));
}
