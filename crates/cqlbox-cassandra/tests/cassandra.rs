//! Docker-gated integration tests for the Cassandra harness
//!
//! These start real containers and are ignored by default; run them with
//! `cargo test -- --ignored` on a machine with a Docker daemon.

use cqlbox_cassandra::{CassandraConfig, CassandraContainer};
use cqlbox_common::CqlboxError;
use serial_test::serial;
use std::time::Duration;

fn init_tracing() {
    cqlbox_common::logging::init_test_logging();
}

/// Run a query expected to return one row with a single text column.
async fn query_single_string(container: &CassandraContainer, cql: &str) -> Option<String> {
    let result = container
        .session()
        .query_unpaged(cql, ())
        .await
        .expect("query failed");
    let rows = result.into_rows_result().expect("expected rows");
    let (value,): (Option<String>,) = rows.single_row().expect("expected a single row");
    value
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn starts_with_defaults() {
    init_tracing();

    let cassandra = CassandraContainer::start().await.expect("startup failed");

    let version = query_single_string(&cassandra, "SELECT release_version FROM system.local")
        .await
        .expect("release_version should be present");
    assert!(!version.is_empty());
    assert_eq!(cassandra.username(), "cassandra");
    assert_eq!(cassandra.password(), "cassandra");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn configuration_override_changes_cluster_name() {
    init_tracing();

    let cassandra = CassandraContainer::start_with_config(
        CassandraConfig::default().with_configuration_override("cassandra-test-configuration"),
    )
    .await
    .expect("startup with override failed");

    let cluster_name = query_single_string(&cassandra, "SELECT cluster_name FROM system.local")
        .await
        .expect("cluster_name should be present");
    assert_eq!(cluster_name, "Integration Test Cluster");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn empty_configuration_override_fails_after_attempts() {
    init_tracing();

    let err = CassandraContainer::start_with_config(
        CassandraConfig::default()
            .with_configuration_override("cassandra-empty-configuration")
            .with_startup_attempts(2)
            .with_startup_timeout(Duration::from_secs(60))
            .with_ready_timeout(Duration::from_secs(30)),
    )
    .await
    .expect_err("an override without cassandra.yaml must not start");

    match err {
        CqlboxError::Launch { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected Launch, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn init_script_seeds_exactly_one_row() {
    init_tracing();

    let cassandra = CassandraContainer::start_with_config(
        CassandraConfig::default().with_init_script("initial.cql"),
    )
    .await
    .expect("startup with init script failed");

    let result = cassandra
        .session()
        .query_unpaged("SELECT id, name FROM harness_test.catalog_category", ())
        .await
        .expect("seeded table should be queryable");
    let rows_result = result.into_rows_result().expect("expected rows");
    let rows: Vec<(i64, Option<String>)> = rows_result
        .rows::<(i64, Option<String>)>()
        .expect("row typing")
        .collect::<Result<_, _>>()
        .expect("row decoding");

    assert_eq!(rows.len(), 1, "init script must run exactly once");
    assert_eq!(rows[0].0, 1);
    assert_eq!(rows[0].1.as_deref(), Some("test_category"));
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn missing_init_script_fails_with_load_error() {
    init_tracing();

    let err = CassandraContainer::start_with_config(
        CassandraConfig::default()
            .with_init_script("no-such-script.cql")
            .with_startup_attempts(1),
    )
    .await
    .expect_err("a missing init script must abort startup");

    assert!(
        matches!(err, CqlboxError::ResourceNotFound(ref id) if id == "no-such-script.cql"),
        "expected ResourceNotFound, got {err:?}"
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn invalid_statement_surfaces_execution_error() {
    init_tracing();

    let err = CassandraContainer::start_with_config(
        CassandraConfig::default()
            .with_init_script("invalid.cql")
            .with_startup_attempts(1),
    )
    .await
    .expect_err("a malformed statement must abort startup");

    match err {
        CqlboxError::ScriptExecution {
            script,
            index,
            source,
        } => {
            assert_eq!(script, "invalid.cql");
            assert_eq!(index, 1, "the first statement is valid and must pass");
            assert!(
                matches!(*source, CqlboxError::Statement(_)),
                "expected Statement, got {source:?}"
            );
        }
        other => panic!("expected ScriptExecution, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn fresh_session_connects_to_mapped_port() {
    init_tracing();

    let cassandra = CassandraContainer::start().await.expect("startup failed");

    let session = cassandra
        .new_session()
        .await
        .expect("fresh session should connect");
    session
        .query_unpaged("SELECT release_version FROM system.local", ())
        .await
        .expect("query over fresh session failed");
}
