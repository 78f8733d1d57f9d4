//! Shared types and error hierarchy for ndtail.

pub mod connector;
pub mod error;
pub mod message;

pub use connector::{Connector, DataStream};
pub use error::StreamError;
pub use message::*;
