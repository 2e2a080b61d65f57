// Integration tests for the in-memory store
use std::collections::HashSet;
use std::sync::Arc;

use projectmanager_api::db::{RecordStore, VolatileStore};

use super::contract;

#[tokio::test]
async fn test_memory_store_contract() {
  let store = VolatileStore::new();
  contract::run_all(&store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_project_creation() {
  let store: Arc<dyn RecordStore> = Arc::new(VolatileStore::new());
  let owner = "a@x.com";
  let n = 128;

  let handles: Vec<_> = (0..n)
    .map(|i| {
      let store = store.clone();
      tokio::spawn(async move {
        store
          .create_project(&format!("P{}", i), "concurrent", owner)
          .await
          .expect("Failed to create project")
      })
    })
    .collect();

  let mut created = Vec::with_capacity(n);
  for handle in handles {
    created.push(handle.await.expect("Task panicked"));
  }

  let ids: HashSet<_> = created.iter().map(|p| p.id.clone()).collect();
  assert_eq!(ids.len(), n);

  let stored = store
    .get_projects_by_owner(owner)
    .await
    .expect("Failed to list projects");
  assert_eq!(stored.len(), n);
  let names: HashSet<_> = stored.iter().map(|p| p.name.clone()).collect();
  assert_eq!(names.len(), n);
}

#[tokio::test]
async fn test_separate_stores_do_not_share_records() {
  let first = VolatileStore::new();
  let second = VolatileStore::new();

  first
    .create_user("a@x.com", "h")
    .await
    .expect("Failed to create user");

  assert!(second
    .get_user_by_identity("a@x.com")
    .await
    .expect("Lookup failed")
    .is_none());
  assert_eq!(
    second
      .create_user("a@x.com", "h")
      .await
      .expect("Failed to create user")
      .id,
    "user_1"
  );
}
