//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, stderr)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → terminal / log capture
//!     → Prometheus textfile snapshot (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::{init_metrics, MetricsSnapshot};
