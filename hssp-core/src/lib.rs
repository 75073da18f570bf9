//! Core utilities and types shared across the HSSP crates

pub mod config;
pub mod diagnostics;
pub mod error;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use diagnostics::Diagnostics;
pub use error::{HsspError, HsspResult};

/// Version information for the HSSP tools
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
