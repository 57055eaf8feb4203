//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or built-in defaults
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → AggregatorConfig (validated, immutable)
//!     → consumed once at startup to build clients and the location set
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_default, ConfigError};
pub use schema::AggregatorConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ScheduleConfig;
pub use schema::StoreConfig;
pub use schema::TimeoutConfig;
pub use schema::UpstreamConfig;
