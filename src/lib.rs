pub mod app;
pub mod cli;
pub mod config;
pub(crate) mod constants;
pub mod engine;
pub mod knowledge;
pub mod model;
pub mod prompt;
pub mod router;
pub mod slack;
pub mod utils;
pub mod value;
pub mod vector_store;

pub use app::App;
pub use config::{BotConfig, StartupError};
