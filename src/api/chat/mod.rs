pub mod handlers;

pub use handlers::{get_messages, send_message};
