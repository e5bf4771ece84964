//! Verification probe against seeded and unseeded stores.

use anyhow::Result;
use eventhive::migration::catalog::CATALOG;
use eventhive::migration::resolver::resolve_order;
use eventhive::seeds::{dataset, seed_all};
use eventhive::verify::{PROBED_ENTITIES, probe};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{count_rows, setup_test_db};

#[tokio::test]
async fn reports_counts_and_bounded_samples() -> Result<()> {
    let db = setup_test_db().await?;
    seed_all(&db, &resolve_order(CATALOG)?, &dataset()).await?;

    let report = probe(&db, PROBED_ENTITIES, 2).await;
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(report.row_count("users"), Some(3));
    assert_eq!(report.row_count("events"), Some(3));
    assert_eq!(report.row_count("tickets"), Some(5));

    for entity in &report.entities {
        assert_eq!(entity.samples.len(), 2, "{}", entity.entity);
    }
    let first_user = &report.entities[0].samples[0];
    assert_eq!(first_user["username"], "admin");
    Ok(())
}

#[tokio::test]
async fn empty_entities_and_failed_queries_become_warnings() -> Result<()> {
    let db = setup_test_db().await?;

    let report = probe(&db, &["users", "no_such_table"], 5).await;
    assert_eq!(report.row_count("users"), Some(0));
    assert_eq!(report.row_count("no_such_table"), None);

    let warned: Vec<_> = report.warnings.iter().map(|w| w.entity.as_str()).collect();
    assert_eq!(warned, vec!["users", "no_such_table"]);
    Ok(())
}

#[tokio::test]
async fn probing_never_writes() -> Result<()> {
    let db = setup_test_db().await?;
    probe(&db, PROBED_ENTITIES, 5).await;
    for table in PROBED_ENTITIES {
        assert_eq!(count_rows(&db, table).await?, 0);
    }
    Ok(())
}
