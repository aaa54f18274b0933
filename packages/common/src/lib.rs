//! Shared building blocks for the campaign builder crates: id generation,
//! the `campaign.config.json` loader and the common error type.

pub mod config;
pub mod error;
pub mod id_generator;
pub mod result;

pub use config::*;
pub use error::*;
pub use id_generator::*;
pub use result::*;
