pub mod app;
pub mod category;
pub mod clipboard;
pub mod config;
pub mod errors;
pub mod form;
pub mod format;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;
pub mod visitor;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::load_data;
