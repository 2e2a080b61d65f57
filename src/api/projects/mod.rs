pub mod handlers;

pub use handlers::{create_project, get_projects};
