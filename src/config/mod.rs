//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks, overlap report)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; route rules never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{finalize, load_config, read_config, ConfigError};
pub use schema::{
    AdminConfig, AuthConfig, FailurePolicy, GatewayConfig, ListenerConfig, LogFormat, MatchMode,
    ObservabilityConfig, RoutesConfig, SessionConfig, UpstreamConfig,
};
