//! Logging abstraction layer.
//!
//! Library components never reach for a process-wide logging facility.
//! Anything that wants to report diagnostics (the scheduler, the
//! compression pipeline, configuration resolution) receives an
//! `Arc<dyn Logger>` from its caller.
//!
//! - `Logger` trait: the interface components log through
//! - `TracingLogger`: production adapter that delegates to `tracing`
//! - `NoOpLogger`: silent logger for tests and benchmarks
//!
//! ```
//! use etcpak::log::{Logger, NoOpLogger};
//! use etcpak::{log_debug, log_info};
//! use std::sync::Arc;
//!
//! struct Stage {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl Stage {
//!     fn run(&self) {
//!         log_info!(self.logger, "Stage starting");
//!         log_debug!(self.logger, "Stage finished");
//!     }
//! }
//!
//! Stage { logger: Arc::new(NoOpLogger) }.run();
//! ```

mod noop;
mod tracing_adapter;
mod r#trait;

pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
