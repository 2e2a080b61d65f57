// In-process record store
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::db::{
    models::{now, Message, Project, Sender, UploadedFile, User},
    RecordStore,
};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    messages: Vec<Message>,
    files: Vec<UploadedFile>,
    next_user: u64,
    next_project: u64,
    next_message: u64,
    next_file: u64,
}

fn next_id(counter: &mut u64, prefix: &str) -> String {
    *counter += 1;
    format!("{}_{}", prefix, counter)
}

/// Records held in memory for the lifetime of the process.
///
/// One mutex guards every table. It is never held across an `.await`, and
/// callers only ever receive clones.
#[derive(Default)]
pub struct VolatileStore {
    tables: Mutex<Tables>,
}

impl VolatileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Each operation leaves the tables consistent before it can panic,
        // so a poisoned lock still guards valid data.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for VolatileStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, identity: &str, password_hash: &str) -> StoreResult<User> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email == identity) {
            return Err(StoreError::DuplicateIdentity(identity.to_string()));
        }

        let user = User {
            id: next_id(&mut tables.next_user, "user"),
            email: identity.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_identity(&self, identity: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.email == identity)
            .cloned())
    }

    async fn get_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_project(
        &self,
        name: &str,
        description: &str,
        owner_identity: &str,
    ) -> StoreResult<Project> {
        let mut tables = self.tables();
        let project = Project {
            id: next_id(&mut tables.next_project, "project"),
            name: name.to_string(),
            description: description.to_string(),
            owner_identity: owner_identity.to_string(),
            created_at: now(),
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn get_projects_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<Project>> {
        Ok(self
            .tables()
            .projects
            .iter()
            .filter(|p| p.owner_identity == owner_identity)
            .cloned()
            .collect())
    }

    async fn create_message(
        &self,
        content: &str,
        sender: Sender,
        project_id: Option<&str>,
    ) -> StoreResult<Message> {
        let mut tables = self.tables();
        let message = Message {
            id: next_id(&mut tables.next_message, "msg"),
            content: content.to_string(),
            sender,
            project_id: project_id.map(str::to_string),
            timestamp: now(),
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn get_messages(&self, project_id: Option<&str>) -> StoreResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .tables()
            .messages
            .iter()
            .filter(|m| project_id.is_none() || m.project_id.as_deref() == project_id)
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order.
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn create_file(
        &self,
        filename: &str,
        size: i64,
        owner_identity: &str,
    ) -> StoreResult<UploadedFile> {
        let mut tables = self.tables();
        let file = UploadedFile {
            id: next_id(&mut tables.next_file, "file"),
            filename: filename.to_string(),
            size,
            owner_identity: owner_identity.to_string(),
            created_at: now(),
        };
        tables.files.push(file.clone());
        Ok(file)
    }

    async fn get_files_by_owner(&self, owner_identity: &str) -> StoreResult<Vec<UploadedFile>> {
        Ok(self
            .tables()
            .files
            .iter()
            .filter(|f| f.owner_identity == owner_identity)
            .cloned()
            .collect())
    }
}
