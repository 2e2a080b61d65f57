pub mod handlers;

pub use handlers::{list_uploads, upload_file};
