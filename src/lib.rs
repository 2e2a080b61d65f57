// Library entry point for the binary and the integration tests
pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod storage;

use std::sync::Arc;

pub use crypto::CredentialService;
pub use db::RecordStore;
pub use storage::FileStorage;

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub credentials: CredentialService,
    pub files: FileStorage,
}
