pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::VolatileStore;
pub use models::*;
pub use postgres::{PoolSettings, PooledRelationalStore};

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StoreResult;

/// Data-access contract shared by every backend.
///
/// Lookups return `Ok(None)` on absence; errors are reserved for conflicts and
/// backend failures.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend label used in logs and `/health`.
    fn backend_name(&self) -> &'static str;

    async fn health_check(&self) -> StoreResult<()>;

    async fn create_user(&self, identity: &str, password_hash: &str) -> StoreResult<User>;

    async fn get_user_by_identity(&self, identity: &str) -> StoreResult<Option<User>>;

    async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    async fn create_project(
        &self,
        name: &str,
        description: &str,
        owner_identity: &str,
    ) -> StoreResult<Project>;

    async fn get_projects_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<Project>>;

    async fn create_message(
        &self,
        content: &str,
        sender: Sender,
        project_id: Option<&str>,
    ) -> StoreResult<Message>;

    /// All messages, or only those of `project_id`, in ascending timestamp order.
    async fn get_messages(&self, project_id: Option<&str>) -> StoreResult<Vec<Message>>;

    async fn create_file(
        &self,
        filename: &str,
        size: i64,
        owner_identity: &str,
    ) -> StoreResult<UploadedFile>;

    async fn get_files_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<UploadedFile>>;
}

/// Pick the backend once at startup: a database URL selects Postgres, no URL
/// selects the in-process store.
pub async fn connect(
    database_url: Option<&str>,
    settings: &PoolSettings,
) -> StoreResult<Arc<dyn RecordStore>> {
    match database_url {
        Some(url) => {
            let store = PooledRelationalStore::connect(url, settings).await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Ok(Arc::new(VolatileStore::new()))
        }
    }
}
