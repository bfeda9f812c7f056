//! Error taxonomy for the mint engine.
//!
//! Every failure class the engine can surface has its own type so callers can
//! react precisely: decode failures keep the previous view, builder failures
//! never touch the network, signing rejections are never retried, and gateway
//! failures carry whatever structured program error the ledger reported.

use solana_client::client_error::ClientError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// The on-chain sale record could not be interpreted.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("account data too short for a sale record: {len} bytes")]
    TooShort { len: usize },

    #[error("account discriminator does not match a sale record")]
    DiscriminatorMismatch,

    #[error("sale record layout mismatch: {0}")]
    Layout(#[from] borsh::io::Error),

    #[error("sale record violates supply invariant: {redeemed} redeemed of {available}")]
    SupplyInvariant { redeemed: u64, available: u64 },
}

/// Local precondition failure while composing a mint request. No network
/// call has been made when one of these surfaces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("no buyer wallet available")]
    MissingWallet,

    #[error("sale is not currently active for this wallet")]
    NotEligible,
}

/// The external signer declined to sign. Must not be retried automatically.
#[derive(Debug, Error)]
#[error("signing rejected: {reason}")]
pub struct SigningRejected {
    pub reason: String,
}

impl SigningRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure at the network boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("rpc request failed: {0}")]
    Rpc(#[from] ClientError),

    /// The ledger rejected the transaction at submission time. When the
    /// rejection carried a structured program error it rides along for the
    /// classifier.
    #[error("transaction rejected on submission: {message}")]
    Rejected {
        message: String,
        program_error: Option<TransactionError>,
    },

    #[error("gateway transport failure: {0}")]
    Transport(String),
}

/// Umbrella error for the engine's public surface.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("another mint attempt is already in flight")]
    AttemptInFlight,

    #[error("no sale configuration loaded; call refresh() first")]
    NoSaleConfig,

    #[error("sale account {0} does not exist on the ledger")]
    SaleAccountMissing(Pubkey),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
