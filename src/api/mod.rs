pub mod auth;
pub mod client;
pub mod dashboard;
pub mod projects;
pub mod tasks;
pub mod users;

pub use auth::CallbackParams;
pub use client::{ApiClient, ClientConfig};
