//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → correlation.rs (adopt/generate id, bind to task)
//!     → handlers, registry, any depth
//!     → logging.rs (every line stamped with the current id)
//!     → tracer.rs (operation start/complete/failure events)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Correlation id flows through task-local storage, never a shared field
//! - One `TracingLogger` instance, injected rather than looked up globally
//! - Metrics are cheap and optional

pub mod correlation;
pub mod logging;
pub mod metrics;
pub mod tracer;

pub use correlation::CorrelationId;
pub use tracer::TracingLogger;
