//! Process-level composition
//!
//! [`EngineConfig`] holds tunable rules constants. [`ServiceRegistry`] is the
//! single place where the store, notifier, identity resolver and oracle are
//! wired together before an [`crate::Engine`] is built.

pub mod config;
pub mod error;
pub mod registry;

pub use config::{EngineConfig, TacticBonuses};
pub use error::ConfigError;
pub use registry::ServiceRegistry;
