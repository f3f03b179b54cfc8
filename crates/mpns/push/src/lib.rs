//! MPNS Push Delivery
//!
//! Queue-based delivery of MPNS notifications over an injected HTTP transport.

mod config;
mod dispatcher;
mod error;
mod http;
mod protocol;
mod traits;

pub use config::*;
pub use dispatcher::*;
pub use error::*;
pub use http::*;
pub use protocol::*;
pub use traits::*;

// Re-export for convenience
pub use mpns_core;
