//! Kobo Core - Foundation types shared by the KoboToolbox client crates.
//!
//! - Client configuration (base URLs, API key, version selector)
//! - The `KoboError` taxonomy
//! - Structured logging with tracing
//! - Client-wide constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

// Re-export commonly used items at the crate root
pub use config::{ClientConfig, ResolvedConfig};
pub use error::{KoboError, KoboResult};
pub use logging::{init_console_logging, init_from_config, init_logging};
