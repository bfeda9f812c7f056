//! candymint - client-side engine for limited-supply candy-machine drops.
//!
//! Mirrors the on-chain sale configuration, derives eligibility and pricing
//! for the connected wallet, and drives mint attempts from composition
//! through signing, submission, confirmation polling and outcome
//! classification, tolerating flaky networks along the way.

pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod gateway;
pub mod signer;
pub mod types;

// Re-export the main surface for convenience
pub use engine::{MintEngine, Outcome, PresentationState};
pub use types::{DerivedView, EndCondition, SaleConfig, WhitelistConfig, WhitelistMode};
