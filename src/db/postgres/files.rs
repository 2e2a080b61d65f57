// Uploaded file metadata operations
use super::{map_write_error, new_id, PooledRelationalStore};
use crate::db::models::{now, UploadedFile};
use crate::error::StoreResult;

impl PooledRelationalStore {
    pub(super) async fn insert_file(
        &self,
        filename: &str,
        size: i64,
        owner_identity: &str,
    ) -> StoreResult<UploadedFile> {
        let mut conn = self.acquire().await?;
        let file = sqlx::query_as::<_, UploadedFile>(
            "INSERT INTO files (id, filename, size, owner_identity, created_at)
       VALUES ($1, $2, $3, $4, $5)
       RETURNING id, filename, size, owner_identity, created_at",
        )
        .bind(new_id("file"))
        .bind(filename)
        .bind(size)
        .bind(owner_identity)
        .bind(now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, &format!("owner {}", owner_identity)))?;
        Ok(file)
    }

    pub(super) async fn list_files_by_owner(
        &self,
        owner_identity: &str,
    ) -> StoreResult<Vec<UploadedFile>> {
        let mut conn = self.acquire().await?;
        let files = sqlx::query_as::<_, UploadedFile>(
            "SELECT id, filename, size, owner_identity, created_at
       FROM files
       WHERE owner_identity = $1
       ORDER BY created_at ASC, id ASC",
        )
        .bind(owner_identity)
        .fetch_all(&mut *conn)
        .await?;
        Ok(files)
    }
}
