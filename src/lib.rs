pub mod api;
pub mod app;
pub mod autosave;
pub mod config;
pub mod error;
pub mod form;
pub mod kanban_board;
pub mod models;
pub mod notify;
pub mod session;
pub mod task;
pub mod ui;
pub mod worker;

pub use api::ApiClient;
pub use config::AppConfig;
pub use error::{ApiError, Result};
