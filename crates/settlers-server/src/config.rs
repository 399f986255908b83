//! Server configuration read from the environment.
//!
//! - `SERVER_ADDR`: listen address, default `0.0.0.0:8080`
//! - `SETTLERS_RULES`: `standard` (default) or `permissive`
//! - `SETTLERS_BOARD_SEED`: optional seed used for boards created without one
//!
//! `RUST_LOG` is read separately by the tracing subscriber in `main`.

use anyhow::Context;
use settlers_core::{Permissive, PlacementValidator, StandardRules};
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown rules mode '{0}', expected 'standard' or 'permissive'")]
pub struct UnknownRulesMode(String);

/// Which placement validator new games are created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RulesMode {
    #[default]
    Standard,
    /// Accepts every move; useful for scripted setups and demos
    Permissive,
}

impl RulesMode {
    pub fn validator(&self) -> &'static (dyn PlacementValidator + Send + Sync) {
        match self {
            RulesMode::Standard => &StandardRules,
            RulesMode::Permissive => &Permissive,
        }
    }
}

impl FromStr for RulesMode {
    type Err = UnknownRulesMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(RulesMode::Standard),
            "permissive" => Ok(RulesMode::Permissive),
            other => Err(UnknownRulesMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub rules: RulesMode,
    pub board_seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse()
            .context("SERVER_ADDR is not a socket address")?;

        let rules = match lookup("SETTLERS_RULES") {
            Some(value) => value.parse()?,
            None => RulesMode::default(),
        };

        let board_seed = lookup("SETTLERS_BOARD_SEED")
            .map(|value| value.parse::<u64>())
            .transpose()
            .context("SETTLERS_BOARD_SEED is not an unsigned integer")?;

        Ok(Self {
            addr,
            rules,
            board_seed,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            rules: RulesMode::default(),
            board_seed: None,
        }
    }
}
