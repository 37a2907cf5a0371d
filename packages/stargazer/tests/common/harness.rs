//! Test harness with testcontainers for PostgreSQL store tests.
//!
//! One container is started on first use and shared by every test; each
//! test uses its own repository paths.

use anyhow::{Context, Result};
use stargazer_core::PostgresStore;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        super::init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!("postgresql://postgres:postgres@{host}:{port}/postgres");

        // Run migrations once on the shared database
        let store = PostgresStore::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;
        store.migrate().await.context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// A store connected to the shared, migrated database.
pub async fn postgres_store() -> PostgresStore {
    let infra = SharedTestInfra::get().await;
    PostgresStore::connect(&infra.db_url)
        .await
        .expect("Failed to connect to test database")
}
