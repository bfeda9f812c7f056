//! Core data model for the candymint engine.
//!
//! `SaleConfig` is the typed snapshot of the on-chain sale record; it is
//! produced by the decoder, replaced wholesale on every refresh, and never
//! mutated in place. `DerivedView` is the presentation-ready projection the
//! evaluator recomputes from a snapshot.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

/// Serialize display-able keys/signatures as base58 strings instead of byte
/// arrays, so view dumps stay readable.
pub(crate) mod as_display {
    use serde::Serializer;
    use std::fmt::Display;

    pub fn serialize<T: Display, S: Serializer>(
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }
}

/// How a sale decides it is over, beyond running out of supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCondition {
    /// Sale ends at a fixed unix timestamp.
    Date(i64),
    /// Sale ends once this many items have been redeemed, even if more exist.
    ItemLimit(u64),
}

/// Whether holding the whitelist token is consumed per mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistMode {
    /// One whitelist token is burned on every mint.
    BurnEveryTime,
    /// Holding the token grants eligibility without consuming it.
    NeverBurn,
}

/// Whitelist gating rules attached to a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistConfig {
    /// Mint address of the token that grants whitelist access.
    pub mint: Pubkey,
    pub mode: WhitelistMode,
    /// When set, the whitelist only opens a presale window; the public sale
    /// still starts at `go_live_time`.
    pub presale_only: bool,
    /// Discounted price for whitelist holders, in the sale's base units.
    pub discount_price: Option<u64>,
}

/// Typed snapshot of the on-chain sale-configuration record.
///
/// Immutable by convention: the decoder builds one per refresh and the engine
/// swaps it in atomically. The only sanctioned mutation is the projector's
/// optimistic bump of `items_redeemed` after a confirmed mint.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleConfig {
    /// Update authority of the sale record.
    pub authority: Pubkey,
    /// Treasury account that receives mint payments.
    pub treasury_wallet: Pubkey,
    /// SPL mint used for payment; `None` means native SOL.
    pub payment_mint: Option<Pubkey>,
    pub items_available: u64,
    pub items_redeemed: u64,
    /// Price in base units of the payment mint (lamports for SOL).
    pub price: u64,
    /// Sale start as a unix timestamp; `None` means not yet configured.
    pub go_live_time: Option<i64>,
    pub end_condition: Option<EndCondition>,
    pub whitelist: Option<WhitelistConfig>,
    /// Gatekeeper network requiring a proof-of-personhood token per mint.
    pub gatekeeper: Option<Pubkey>,
}

impl SaleConfig {
    /// Items available after applying an `ItemLimit` end condition clamp.
    pub fn effective_items_available(&self) -> u64 {
        match self.end_condition {
            Some(EndCondition::ItemLimit(limit)) => limit.min(self.items_available),
            _ => self.items_available,
        }
    }
}

/// Presentation-ready eligibility/price/supply snapshot.
///
/// Recomputed wholesale by the evaluator; the projector republishes it after
/// applying the post-mint delta. Nothing else writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedView {
    pub is_active: bool,
    pub is_ended: bool,
    pub is_sold_out: bool,
    /// Effective supply ceiling (post item-limit clamp), for progress display.
    pub items_available: u64,
    pub items_redeemed: u64,
    pub items_remaining: u64,
    /// Price the connected wallet would actually pay, in base units.
    pub effective_price: u64,
    /// Sale is restricted to whitelist holders with no public price.
    pub is_whitelist_only: bool,
    pub wallet_whitelist_balance: u64,
    /// Configured start time, surfaced for countdown rendering.
    pub go_live_time: Option<i64>,
    /// Configured end date, when the sale ends by calendar.
    pub end_date: Option<i64>,
}
