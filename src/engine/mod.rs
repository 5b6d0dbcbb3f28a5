//! Client side of the process engine's REST API.

pub mod client;
pub mod error;
pub mod types;

pub use client::*;
pub use error::*;
pub use types::*;
