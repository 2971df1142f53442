//! Engine configuration
//!
//! Loads [`EngineConfig`] from a JSON file. Every field has a default, so a
//! partial file only overrides what it names.
//!
//! # Resolution order
//!
//! 1. An explicit path (the backend's `--config` flag)
//! 2. The `DUELCHESS_CONFIG` environment variable (`.env` files are honoured
//!    by the binary through `dotenvy`)
//! 3. Built-in defaults
//!
//! A path that does not exist falls back to defaults with a log line. A file
//! that exists but does not parse is an error.

use super::error::{ConfigError, ConfigResult};
use crate::game::tactics::TacticKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "DUELCHESS_CONFIG";

/// BP awarded per tactic kind created by a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticBonuses {
    pub check: u32,
    pub fork: u32,
    pub pin: u32,
    pub skewer: u32,
    pub discovered_attack: u32,
    pub discovered_check: u32,
}

impl Default for TacticBonuses {
    fn default() -> Self {
        Self {
            check: 2,
            fork: 3,
            pin: 2,
            skewer: 2,
            discovered_attack: 2,
            discovered_check: 3,
        }
    }
}

impl TacticBonuses {
    pub fn bonus_for(&self, kind: TacticKind) -> u32 {
        match kind {
            TacticKind::Check => self.check,
            TacticKind::Fork => self.fork,
            TacticKind::Pin => self.pin,
            TacticKind::Skewer => self.skewer,
            TacticKind::DiscoveredAttack => self.discovered_attack,
            TacticKind::DiscoveredCheck => self.discovered_check,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pool size for both players when a game is created
    pub starting_bp: u32,
    /// Credited to the mover after every completed ply
    pub base_regeneration: u32,
    /// Upper bound on a single duel allocation
    pub max_allocation_per_duel: u32,
    pub tactic_bonuses: TacticBonuses,
    /// How long an untouched game survives in the store
    pub state_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_bp: 39,
            base_regeneration: 1,
            max_allocation_per_duel: 10,
            tactic_bonuses: TacticBonuses::default(),
            state_ttl_secs: 86_400,
        }
    }
}

impl EngineConfig {
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_allocation_per_duel == 0 {
            return Err(ConfigError::Invalid {
                message: "max_allocation_per_duel must be at least 1".to_string(),
            });
        }
        if self.state_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "state_ttl_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load and validate a config file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            warn!("[CONFIG] No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        info!("[CONFIG] Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Resolve the config path from an explicit flag or `DUELCHESS_CONFIG`
    pub fn resolve(explicit: Option<PathBuf>) -> ConfigResult<Self> {
        let path = explicit.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
        match path {
            Some(path) => Self::load(&path),
            None => {
                info!("[CONFIG] No config path given, using defaults");
                Ok(Self::default())
            }
        }
    }
}
