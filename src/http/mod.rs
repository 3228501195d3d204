//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (establish correlation id, echo it back)
//!     → response.rs (exchange log, envelope)
//!     → mounted handler groups (host.rs)
//!     → Send to client
//! ```

pub mod host;
pub mod request;
pub mod response;
pub mod server;

pub use host::AxumHost;
pub use request::X_CORRELATION_ID;
pub use response::{ApiResponse, ResponseResult};
pub use server::HubServer;
