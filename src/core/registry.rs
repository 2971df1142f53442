//! Service registry
//!
//! Built once at the process's composition point and handed to the engine.
//! Nothing in the crate reaches for a global; every collaborator arrives
//! through here.
//!
//! # Examples
//!
//! ```rust,ignore
//! let seats = Arc::new(SeatTable::new());
//! let registry = ServiceRegistry::builder()
//!     .identity(seats.clone())
//!     .config(EngineConfig::default())
//!     .build()?;
//! let engine = Engine::new(registry);
//! ```

use super::config::EngineConfig;
use super::error::{ConfigError, ConfigResult};
use crate::networking::{
    BroadcastNotifier, GameStore, IdentityResolver, InMemoryStore, Notifier,
};
use chess_rules::{MoveOracle, StandardOracle};
use std::sync::Arc;

#[derive(Clone)]
pub struct ServiceRegistry {
    pub store: Arc<dyn GameStore>,
    pub notifier: Arc<dyn Notifier>,
    pub identity: Arc<dyn IdentityResolver>,
    pub oracle: Arc<dyn MoveOracle>,
    pub config: EngineConfig,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }
}

/// Store, notifier, oracle and config have in-process defaults; identity
/// must be supplied.
#[derive(Default)]
pub struct ServiceRegistryBuilder {
    store: Option<Arc<dyn GameStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    identity: Option<Arc<dyn IdentityResolver>>,
    oracle: Option<Arc<dyn MoveOracle>>,
    config: Option<EngineConfig>,
}

impl ServiceRegistryBuilder {
    pub fn store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn oracle(mut self, oracle: Arc<dyn MoveOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> ConfigResult<ServiceRegistry> {
        let identity = self.identity.ok_or(ConfigError::MissingService {
            service: "identity resolver",
        })?;
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let store: Arc<dyn GameStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryStore::new()),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(BroadcastNotifier::default()),
        };
        let oracle: Arc<dyn MoveOracle> = match self.oracle {
            Some(oracle) => oracle,
            None => Arc::new(StandardOracle),
        };
        Ok(ServiceRegistry {
            store,
            notifier,
            identity,
            oracle,
            config,
        })
    }
}
