//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (assign request ID)
//!     → server.rs (trace span, timeout, body limit)
//!     → middleware/access_control.rs (route access decision)
//!         Reject / Redirect → respond immediately
//!         Forward ↓
//!     → server.rs forward handler (rewrite URI, send upstream)
//!     → response.rs (strip hop-by-hop headers)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{GatewayServer, ServerError};
