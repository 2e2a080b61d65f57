// HTTP API integration tests module
pub mod auth_test;
pub mod uploads_test;
