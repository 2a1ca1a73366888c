//! Access control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, headers)
//!     → rules.rs (excluded? api-gated? public? webhook? protected?)
//!     → api_key.rs (key presence on gated routes)
//!     → session resolver (only when no earlier rule decided)
//!     → controller.rs → Decision { Forward | Reject | Redirect }
//!     → decision.rs (render as HTTP response)
//! ```
//!
//! # Design Decisions
//! - Rule sets are static; the controller owns no mutable state
//! - First match wins, API gating before every exemption
//! - Overlapping sets are the operator's responsibility

pub mod api_key;
pub mod controller;
pub mod decision;
pub mod rules;

pub use api_key::{ApiKeyValidator, HeaderPresence};
pub use controller::{AccessController, AccessRequest};
pub use decision::Decision;
pub use rules::{RouteMembership, RouteRules, RouteSet};
