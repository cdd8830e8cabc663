//! Dispatcher/Client: fans a promoted or read request out to a set of
//! Darknode peers, retrying per-peer with a bounded worker pool, and
//! resolves the caller once the configured aggregation policy is satisfied.

mod aggregator;
pub mod dispatcher;
pub mod error;
pub mod quorum;
pub mod types;
mod worker;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use types::{AggregationPolicy, DispatchRequest};
