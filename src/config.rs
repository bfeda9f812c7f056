//! Engine configuration.
//!
//! Deserialized from a `candymint.toml` file with per-field defaults, so the
//! engine runs with a minimal or absent config file. The structure mirrors the
//! environment knobs the presentation layer historically exposed: cluster
//! selection (explorer links only), payment-token display parameters, and the
//! submit/poll timing envelope.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Network identifier. Only affects explorer-link formatting; the ledger
/// endpoint itself comes from `rpc_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Mainnet,
    Devnet,
    Testnet,
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::Mainnet
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::Mainnet => write!(f, "mainnet-beta"),
            Cluster::Devnet => write!(f, "devnet"),
            Cluster::Testnet => write!(f, "testnet"),
        }
    }
}

/// The main configuration structure for the engine and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    // -- Core settings --
    /// Address of the on-chain sale-configuration account.
    #[serde(default)]
    pub candy_machine_id: String,
    /// Path to the buyer keypair JSON file; empty means no wallet connected.
    #[serde(default)]
    pub keypair_path: String,

    // -- Network settings --
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default)]
    pub cluster: Cluster,

    // -- Payment token display --
    /// Decimal precision of the payment token.
    #[serde(default = "default_payment_token_decimals")]
    pub payment_token_decimals: u8,
    /// Display label for the payment token.
    #[serde(default = "default_payment_token_label")]
    pub payment_token_label: String,

    // -- Confirmation polling envelope --
    /// First poll delay; later delays back off exponentially.
    #[serde(default = "default_poll_base_delay_ms")]
    pub poll_base_delay_ms: u64,
    /// Ceiling for a single backoff delay.
    #[serde(default = "default_poll_max_delay_ms")]
    pub poll_max_delay_ms: u64,
    /// Overall deadline for confirming one attempt.
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candy_machine_id: String::new(),
            keypair_path: String::new(),
            rpc_url: default_rpc_url(),
            cluster: Cluster::default(),
            payment_token_decimals: default_payment_token_decimals(),
            payment_token_label: default_payment_token_label(),
            poll_base_delay_ms: default_poll_base_delay_ms(),
            poll_max_delay_ms: default_poll_max_delay_ms(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the given TOML file, falling back to default
    /// values when the file is missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using default values.", path.display(), e);
                    EngineConfig::default()
                }
            },
            Err(_) => {
                warn!("{} not found. Using default values.", path.display());
                EngineConfig::default()
            }
        }
    }
}

// --- Default value functions for serde ---

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}
fn default_payment_token_decimals() -> u8 {
    9
}
fn default_payment_token_label() -> String {
    "TOKEN".to_string()
}
fn default_poll_base_delay_ms() -> u64 {
    1_000
}
fn default_poll_max_delay_ms() -> u64 {
    8_000
}
fn default_confirmation_timeout_ms() -> u64 {
    60_000
}
