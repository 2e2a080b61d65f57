mod files;
mod messages;
mod projects;
mod schema;
mod users;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres};
use std::str::FromStr;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::db::{Message, Project, RecordStore, Sender, UploadedFile, User};
use crate::error::{StoreError, StoreResult};

/// Connection pool bounds and the per-statement timeout.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    pub command_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            command_timeout: Duration::from_secs(60),
        }
    }
}

/// Postgres-backed store.
///
/// Values of this type only exist once the schema bootstrap has committed,
/// so no operation can run against a half-created schema.
#[derive(Clone)]
pub struct PooledRelationalStore {
    pool: PgPool,
}

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Foreign-key violations become `InvalidReference`; everything else means
/// the backend could not serve the request.
pub(crate) fn map_write_error(err: sqlx::Error, reference: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            StoreError::InvalidReference(reference.to_string())
        }
        _ => StoreError::BackendUnavailable(err),
    }
}

impl PooledRelationalStore {
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> StoreResult<Self> {
        let statement_timeout_ms = settings.command_timeout.as_millis().to_string();
        let options = PgConnectOptions::from_str(database_url)?
            .options([("statement_timeout", statement_timeout_ms)]);

        let pool = PgPoolOptions::new()
            .min_connections(settings.min_connections)
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.command_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to database");
                e
            })?;

        let store = Self::from_pool(pool).await?;

        tracing::info!(
            min_connections = settings.min_connections,
            max_connections = settings.max_connections,
            command_timeout_secs = settings.command_timeout.as_secs(),
            "Connected to database"
        );

        Ok(store)
    }

    /// Wrap an existing pool, bootstrapping the schema first.
    pub async fn from_pool(pool: PgPool) -> StoreResult<Self> {
        bootstrap(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check out a connection. It goes back to the pool when dropped, on
    /// every exit path of the caller.
    pub(crate) async fn acquire(&self) -> StoreResult<PoolConnection<Postgres>> {
        let start = Instant::now();
        match self.pool.acquire().await {
            Ok(conn) => {
                let elapsed = start.elapsed();
                if elapsed.as_millis() > 10 {
                    tracing::warn!(
                        acquisition_time_ms = elapsed.as_millis(),
                        "Slow connection acquisition detected"
                    );
                }
                Ok(conn)
            }
            Err(e) => {
                tracing::error!(
                    acquisition_time_ms = start.elapsed().as_millis(),
                    error = %e,
                    "Failed to acquire connection"
                );
                Err(e.into())
            }
        }
    }

    pub fn log_pool_metrics(&self) {
        let size = self.pool.size();
        let num_idle = self.pool.num_idle();
        let active = size.saturating_sub(num_idle as u32);

        tracing::debug!(
            pool_size = size,
            idle_connections = num_idle,
            active_connections = active,
            "Connection pool metrics"
        );
    }
}

async fn bootstrap(pool: &PgPool) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(schema::BOOTSTRAP_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for statement in schema::STATEMENTS {
        sqlx::query(*statement).execute(&mut *tx).await.map_err(|e| {
            tracing::error!(error = %e, "Schema bootstrap failed");
            e
        })?;
    }

    tx.commit().await?;
    tracing::info!("Schema bootstrap complete");
    Ok(())
}

#[async_trait]
impl RecordStore for PooledRelationalStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        self.log_pool_metrics();
        Ok(())
    }

    async fn create_user(&self, identity: &str, password_hash: &str) -> StoreResult<User> {
        self.insert_user(identity, password_hash).await
    }

    async fn get_user_by_identity(&self, identity: &str) -> StoreResult<Option<User>> {
        self.find_user_by_email(identity).await
    }

    async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.find_user_by_id(id).await
    }

    async fn create_project(
        &self,
        name: &str,
        description: &str,
        owner_identity: &str,
    ) -> StoreResult<Project> {
        self.insert_project(name, description, owner_identity).await
    }

    async fn get_projects_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<Project>> {
        self.list_projects_by_owner(owner_identity).await
    }

    async fn create_message(
        &self,
        content: &str,
        sender: Sender,
        project_id: Option<&str>,
    ) -> StoreResult<Message> {
        self.insert_message(content, sender, project_id).await
    }

    async fn get_messages(&self, project_id: Option<&str>) -> StoreResult<Vec<Message>> {
        self.list_messages(project_id).await
    }

    async fn create_file(
        &self,
        filename: &str,
        size: i64,
        owner_identity: &str,
    ) -> StoreResult<UploadedFile> {
        self.insert_file(filename, size, owner_identity).await
    }

    async fn get_files_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<UploadedFile>> {
        self.list_files_by_owner(owner_identity).await
    }
}
