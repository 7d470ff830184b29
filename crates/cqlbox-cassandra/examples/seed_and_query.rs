//! Start a Cassandra container, seed it, and read the seeded row back.
//!
//! Requires a running Docker daemon:
//! `cargo run --example seed_and_query`

use cqlbox_cassandra::{CassandraConfig, CassandraContainer};
use cqlbox_common::logging::{init_logging, LogConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::from_env()?)?;

    let cassandra = CassandraContainer::start_with_config(
        CassandraConfig::from_env().with_init_script("initial.cql"),
    )
    .await?;
    info!(contact_point = %cassandra.contact_point(), "Cassandra is ready");

    let result = cassandra
        .session()
        .query_unpaged("SELECT id, name FROM harness_test.catalog_category", ())
        .await?;
    let rows = result.into_rows_result()?;
    for row in rows.rows::<(i64, Option<String>)>()? {
        let (id, name) = row?;
        info!(id, name = name.as_deref().unwrap_or(""), "Seeded row");
    }

    Ok(())
}
