// Chat message database operations
use super::{map_write_error, new_id, PooledRelationalStore};
use crate::db::models::{now, Message, Sender};
use crate::error::StoreResult;

impl PooledRelationalStore {
    pub(super) async fn insert_message(
        &self,
        content: &str,
        sender: Sender,
        project_id: Option<&str>,
    ) -> StoreResult<Message> {
        let mut conn = self.acquire().await?;
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, content, sender, project_id, \"timestamp\")
       VALUES ($1, $2, $3, $4, $5)
       RETURNING id, content, sender, project_id, \"timestamp\"",
        )
        .bind(new_id("msg"))
        .bind(content)
        .bind(sender.as_str())
        .bind(project_id)
        .bind(now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, &format!("project {}", project_id.unwrap_or(""))))?;
        Ok(message)
    }

    pub(super) async fn list_messages(&self, project_id: Option<&str>) -> StoreResult<Vec<Message>> {
        let mut conn = self.acquire().await?;
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, content, sender, project_id, \"timestamp\"
       FROM messages
       WHERE $1::TEXT IS NULL OR project_id = $1
       ORDER BY \"timestamp\" ASC, seq ASC",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(messages)
    }
}
