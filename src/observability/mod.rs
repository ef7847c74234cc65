//! Observability for the store
//!
//! Log events are emitted through the injected [`Logger`]:
//! - debug/trace while validating descriptors and generating the model
//! - warn on validation failure, snapshot pin failure and decode recovery
//! - error on engine failures and corrupt records
//!
//! # Usage
//!
//! ```ignore
//! use docstore::observability::{init_tracing, Logger, TracingLogger};
//!
//! init_tracing();
//! TracingLogger.info("STORE_OPENED", &[("identifier", "main")]);
//! ```

mod logger;

pub use logger::{init_tracing, LogLevel, LogRecord, Logger, NoLogger, RecordingLogger, TracingLogger};
