pub mod cli;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::{BootstrapPeer, Config, LogFormat};
pub use error::ConfigError;
