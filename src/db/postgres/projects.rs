// Project-related database operations
use super::{map_write_error, new_id, PooledRelationalStore};
use crate::db::models::{now, Project};
use crate::error::StoreResult;

impl PooledRelationalStore {
    pub(super) async fn insert_project(
        &self,
        name: &str,
        description: &str,
        owner_identity: &str,
    ) -> StoreResult<Project> {
        let mut conn = self.acquire().await?;
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, name, description, owner_identity, created_at)
       VALUES ($1, $2, $3, $4, $5)
       RETURNING id, name, description, owner_identity, created_at",
        )
        .bind(new_id("project"))
        .bind(name)
        .bind(description)
        .bind(owner_identity)
        .bind(now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, &format!("owner {}", owner_identity)))?;
        Ok(project)
    }

    pub(super) async fn list_projects_by_owner(
        &self,
        owner_identity: &str,
    ) -> StoreResult<Vec<Project>> {
        let mut conn = self.acquire().await?;
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, owner_identity, created_at
       FROM projects
       WHERE owner_identity = $1
       ORDER BY created_at ASC, id ASC",
        )
        .bind(owner_identity)
        .fetch_all(&mut *conn)
        .await?;
        Ok(projects)
    }
}
