pub mod app;
pub mod catalog;
pub mod config;
pub mod seller_handlers;

pub use app::AppState;
