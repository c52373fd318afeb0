//! Logging setup.
//!
//! Everything logs through the `log` facade; `init_logging` installs
//! `env_logger` as the backend for binaries.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
