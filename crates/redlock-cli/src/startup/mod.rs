//! Startup wiring for the CLI
//!
//! - `logging`: tracing subscriber with console and rolling file output
//! - `stores`: one in-process store per configured endpoint

pub mod logging;
pub mod stores;

pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
pub use stores::memory_stores;
