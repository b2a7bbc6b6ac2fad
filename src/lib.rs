pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod store;

pub use api::{AppState, build_router, run_http_server};
pub use error::{Error, Result};
