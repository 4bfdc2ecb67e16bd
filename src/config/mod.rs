//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → AppConfig (immutable)
//!     → pool construction (broken entries skipped with a warning)
//!
//! On SIGHUP:
//!     supervisor tears the pools down
//!     → loader.rs loads fresh configuration
//!     → pools rebuilt, process keeps running
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a reload
//! - All optional fields have defaults to allow minimal configs
//! - Only an unreadable or unparseable file escalates; broken pools,
//!   nodes and checks are skipped individually

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, CheckConfig, DegradeAction, NodeConfig, PoolConfig};
