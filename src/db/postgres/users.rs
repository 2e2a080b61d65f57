// User database operations
use super::{new_id, PooledRelationalStore};
use crate::db::models::{now, User};
use crate::error::{StoreError, StoreResult};

impl PooledRelationalStore {
    pub(super) async fn insert_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut conn = self.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, created_at)
       VALUES ($1, $2, $3, $4)
       ON CONFLICT (email) DO NOTHING
       RETURNING id, email, password_hash, created_at",
        )
        .bind(new_id("user"))
        .bind(email)
        .bind(password_hash)
        .bind(now())
        .fetch_optional(&mut *conn)
        .await?;

        user.ok_or_else(|| StoreError::DuplicateIdentity(email.to_string()))
    }

    pub(super) async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at
       FROM users
       WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    pub(super) async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let mut conn = self.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at
       FROM users
       WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }
}
