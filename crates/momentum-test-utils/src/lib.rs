//! Throwaway PostgreSQL databases for integration tests.
//!
//! Every test gets a freshly migrated database of its own on one server
//! shared by the whole test binary. The server is `MOMENTUM_TEST_PG_URL`
//! when that is set, otherwise a Postgres container started on first use.

use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use momentum_db::config::DbConfig;
use momentum_db::pool;

/// Environment variable naming an existing server to test against.
pub const PG_URL_ENV: &str = "MOMENTUM_TEST_PG_URL";

const POSTGRES_TAG: &str = "17";

enum TestServer {
    External(String),
    /// The container is stopped when the handle drops, so it lives here.
    Container {
        url: String,
        _handle: ContainerAsync<Postgres>,
    },
}

impl TestServer {
    async fn start() -> Self {
        if let Ok(url) = std::env::var(PG_URL_ENV) {
            return Self::External(url.trim_end_matches('/').to_owned());
        }

        let handle = Postgres::default()
            .with_tag(POSTGRES_TAG)
            .start()
            .await
            .expect("postgres container should start");
        let host = handle.get_host().await.expect("container host");
        let port = handle
            .get_host_port_ipv4(5432)
            .await
            .expect("container port mapping");

        Self::Container {
            url: format!("postgresql://postgres:postgres@{host}:{port}"),
            _handle: handle,
        }
    }

    fn url(&self) -> &str {
        match self {
            Self::External(url) | Self::Container { url, .. } => url,
        }
    }
}

static SERVER: OnceCell<TestServer> = OnceCell::const_new();

/// Server URL without a database path, e.g. `postgresql://host:port`.
pub async fn pg_url() -> &'static str {
    SERVER.get_or_init(TestServer::start).await.url()
}

fn config_for(base_url: &str, db_name: &str) -> DbConfig {
    DbConfig::new(format!("{base_url}/{db_name}"))
}

/// Create and migrate a database with a unique name.
///
/// Returns the pool and the name to hand to [`drop_test_db`].
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("momentum_test_{}", Uuid::new_v4().simple());
    let config = config_for(pg_url().await, &db_name);

    pool::ensure_database_exists(&config)
        .await
        .unwrap_or_else(|e| panic!("creating {db_name}: {e:#}"));
    let db = pool::create_pool(&config)
        .await
        .unwrap_or_else(|e| panic!("connecting to {db_name}: {e:#}"));
    pool::run_migrations(&db)
        .await
        .unwrap_or_else(|e| panic!("migrating {db_name}: {e:#}"));

    (db, db_name)
}

/// Drop a database made by [`create_test_db`], disconnecting any sessions
/// still attached to it. Missing databases are ignored.
pub async fn drop_test_db(db_name: &str) {
    let admin_url = config_for(pg_url().await, db_name).maintenance_url();
    let admin = PgPool::connect(&admin_url)
        .await
        .expect("connecting to maintenance database");

    sqlx::query(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
         WHERE datname = $1 AND pid <> pg_backend_pid()",
    )
    .bind(db_name)
    .execute(&admin)
    .await
    .expect("terminating test database sessions");

    // Names are generated as `momentum_*` plus hex, so they need no quoting.
    let stmt = format!("DROP DATABASE IF EXISTS {db_name}");
    admin
        .execute(stmt.as_str())
        .await
        .unwrap_or_else(|e| panic!("dropping {db_name}: {e:#}"));
    admin.close().await;
}
