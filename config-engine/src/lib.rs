//! Configuration for Apteka Engine
//!
//! Sources, lowest precedence first:
//!
//! - **Defaults**: [`EngineConfig::default`]
//! - **File**: optional TOML or YAML (`--config apteka.toml`)
//! - **Environment**: `APTEKA_` prefix with `__` between section and key,
//!   plus the conventional `DATABASE_URL`
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::EngineConfig;
//!
//! // APTEKA_MATCHING__THRESHOLD=0.75 APTEKA_DISPATCH__INTERVAL_MS=1500
//! let config = EngineConfig::load(None).expect("valid configuration");
//! assert!(config.matching.threshold <= 1.0);
//! ```

pub mod engine;
pub mod error;
pub mod settings;

pub use engine::*;
pub use error::*;
pub use settings::*;
