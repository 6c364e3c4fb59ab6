//! Logging sink abstraction.
//!
//! Cache and locator components report through a [`Logger`] rather than
//! calling a logging backend directly, so the host decides where messages go.
//! Every message carries a short category (`"cache"`, `"locator"`, ...) in
//! addition to its level.
//!
//! - `Logger` trait: the interface components hold as `Arc<dyn Logger>`
//! - `TracingLogger`: production adapter that forwards to `tracing`
//! - `NoOpLogger`: silent logger for tests and embedding
//!
//! ```
//! use tilecache::log::{Logger, NoOpLogger};
//! use tilecache::{log_debug, log_info};
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_info!(logger, "cache", "sweep started");
//! log_debug!(logger, "cache", "{} candidates", 42);
//! ```
//!
//! Logging is best-effort: implementations must never panic and callers never
//! depend on a message being delivered.

mod noop;
mod tracing_adapter;
mod r#trait;

pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
