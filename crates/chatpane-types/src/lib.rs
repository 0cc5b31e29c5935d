//! Shared types for the chatpane browser client
//!
//! Wire payloads for the chat API, the embedded history format, the
//! cross-component events, the error taxonomy and client configuration.

pub mod config;
pub mod error;
pub mod protocol;
pub mod text;

pub use config::{ClientConfig, UiStrings};
pub use error::{ClientError, ErrorKind, Result};
pub use protocol::*;
