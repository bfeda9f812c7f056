//! Presentation-layer derivations.
//!
//! The renderer consumes a single tagged [`PresentationState`] derived from
//! the view, instead of recombining boolean flags itself; exhaustive matching
//! over this enum is what keeps the flag-combination bugs out. Display
//! helpers for price and explorer links live here too since they are pure
//! formatting.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::config::Cluster;
use crate::types::DerivedView;

/// Decimals and label of the native currency.
pub const NATIVE_DECIMALS: u8 = 9;
pub const NATIVE_LABEL: &str = "SOL";

/// What the mint surface should present right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresentationState {
    /// No wallet connected; prompt for one.
    ConnectPrompt,
    /// Whitelist-only sale and this wallet holds no whitelist token.
    PrivateMintLocked,
    /// Nothing left to mint, or the sale has ended.
    SoldOut,
    /// Sale not yet open for this wallet; show a countdown when a start time
    /// is configured.
    CountdownToLive { go_live_time: Option<i64> },
    /// Ready, but a gatekeeper proof must be acquired as part of the attempt.
    GatekeeperRequired,
    ReadyToMint,
}

impl PresentationState {
    /// Derives the presentation state from the current view.
    pub fn derive(
        view: &DerivedView,
        wallet_connected: bool,
        gatekeeper_configured: bool,
    ) -> Self {
        if !wallet_connected {
            return PresentationState::ConnectPrompt;
        }
        if view.is_whitelist_only && view.wallet_whitelist_balance == 0 {
            return PresentationState::PrivateMintLocked;
        }
        if view.is_sold_out || view.is_ended {
            return PresentationState::SoldOut;
        }
        if view.is_active {
            if gatekeeper_configured {
                return PresentationState::GatekeeperRequired;
            }
            return PresentationState::ReadyToMint;
        }
        PresentationState::CountdownToLive {
            go_live_time: view.go_live_time,
        }
    }
}

/// Renders a base-unit amount with the token's decimal precision and label.
pub fn format_price(base_units: u64, decimals: u8, label: &str) -> String {
    let divisor = 10u64.pow(decimals as u32);
    let whole = base_units / divisor;
    let frac = base_units % divisor;
    if frac == 0 {
        return format!("{whole} {label}");
    }
    let frac = format!("{frac:0width$}", width = decimals as usize);
    format!("{whole}.{} {label}", frac.trim_end_matches('0'))
}

/// Explorer link for a minted token. Non-mainnet clusters get an explicit
/// cluster query parameter.
pub fn explorer_token_url(cluster: Cluster, mint: &Pubkey) -> String {
    match cluster {
        Cluster::Mainnet => format!("https://solscan.io/token/{mint}"),
        other => format!("https://solscan.io/token/{mint}?cluster={other}"),
    }
}
