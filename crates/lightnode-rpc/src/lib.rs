pub mod error;
pub mod router;
pub mod server;

pub use error::error_code_for;
pub use router::RpcRouter;
pub use server::{serve, ServerError};
