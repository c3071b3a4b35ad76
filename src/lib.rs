pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;
pub mod visitors;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
