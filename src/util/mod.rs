//! Utility modules for pyshim

pub mod logging;

pub use logging::{init_logging, log_ignorable, LoggingConfig};
