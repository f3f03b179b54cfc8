//! MPNS Core Types
//!
//! Notification kinds, messages and payload rendering for the Microsoft Push
//! Notification Service (Windows Phone).

mod kind;
mod message;
mod response;
mod xml;

pub use kind::*;
pub use message::*;
pub use response::*;
