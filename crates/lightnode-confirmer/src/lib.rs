//! Confirmer: polls pending transactions against the Chain Oracle, prunes
//! expired ones, and promotes confirmed ones through the Dispatcher.

pub mod config;
pub mod confirmer;
pub mod error;

pub use config::ConfirmerConfig;
pub use confirmer::Confirmer;
pub use error::ConfirmerError;
