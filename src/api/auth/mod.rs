pub mod handlers;
pub mod middleware;

pub use handlers::{login, me, register};
pub use middleware::{require_bearer_token, CurrentIdentity};
