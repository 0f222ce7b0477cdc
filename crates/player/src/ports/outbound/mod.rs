//! Outbound ports - Interfaces for external services
//!
//! The socket side is concrete (see `infrastructure::messaging`); only the
//! HTTP lobby endpoints sit behind a trait.

pub mod query_port;

#[cfg(any(test, feature = "testing"))]
pub use query_port::MockQueryPort;
pub use query_port::{QueryError, QueryPort};
