//! Protocol configuration.
//!
//! The EIP-712 domain (name, version, chain id, verifying contract) binds every
//! order hash to one deployment. Changing any of these invalidates all
//! previously issued signatures.
//!
//! ## Environment
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `LOP_DOMAIN_NAME` | `name` | `Limit Order Protocol` |
//! | `LOP_DOMAIN_VERSION` | `version` | `2` |
//! | `LOP_CHAIN_ID` | `chain_id` | `1` |
//! | `LOP_VERIFYING_CONTRACT` | `verifying_contract` | zero address |
//! | `LOP_MAX_PREDICATE_DEPTH` | `max_predicate_depth` | `16` |

use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default EIP-712 domain name
pub const DEFAULT_DOMAIN_NAME: &str = "Limit Order Protocol";

/// Default EIP-712 domain version
pub const DEFAULT_DOMAIN_VERSION: &str = "2";

/// Default bound on nested `and`/`or`/`not`/comparison predicates
pub const DEFAULT_MAX_PREDICATE_DEPTH: usize = 16;

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable holds an unparsable value.
    #[error("invalid value for {key}: {value}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
    },
}

/// Deployment parameters of one protocol instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// EIP-712 domain name
    pub name: String,
    /// EIP-712 domain version
    pub version: String,
    /// Chain id the signatures are bound to
    pub chain_id: u64,
    /// Address of the exchange (also the self-call target)
    pub verifying_contract: Address,
    /// Maximum nesting of predicate helper calls
    pub max_predicate_depth: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DOMAIN_NAME.to_string(),
            version: DEFAULT_DOMAIN_VERSION.to_string(),
            chain_id: 1,
            verifying_contract: Address::ZERO,
            max_predicate_depth: DEFAULT_MAX_PREDICATE_DEPTH,
        }
    }
}

impl ProtocolConfig {
    /// Config for a deployment at `verifying_contract` on `chain_id`
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id,
            verifying_contract,
            ..Self::default()
        }
    }

    /// Load from `LOP_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("LOP_DOMAIN_NAME") {
            config.name = name;
        }
        if let Some(version) = lookup("LOP_DOMAIN_VERSION") {
            config.version = version;
        }
        if let Some(value) = lookup("LOP_CHAIN_ID") {
            config.chain_id = parse("LOP_CHAIN_ID", value)?;
        }
        if let Some(value) = lookup("LOP_VERIFYING_CONTRACT") {
            config.verifying_contract = parse("LOP_VERIFYING_CONTRACT", value)?;
        }
        if let Some(value) = lookup("LOP_MAX_PREDICATE_DEPTH") {
            config.max_predicate_depth = parse("LOP_MAX_PREDICATE_DEPTH", value)?;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

// ============================================================================
// Unit Tests
// ============================================================================
