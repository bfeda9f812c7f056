//! Outcome classification.
//!
//! Terminal attempt results collapse into a closed, user-presentable outcome
//! set. Classification tiers, strongest first:
//!
//! 1. structured program error codes reported by the ledger (authoritative);
//! 2. substring matching on transport error text (best-effort fallback for
//!    errors that carry no structured code);
//! 3. generic transport failure, treated as an ambiguous timeout.
//!
//! Unknown program codes are surfaced raw as `UnknownFailure` so they can be
//! diagnosed; they are never coerced into a known category.

use serde::Serialize;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::TransactionError;
use tracing::warn;

use crate::errors::GatewayError;
use crate::gateway::AttemptStatus;
use crate::types::as_display;

use super::submitter::{MintAttempt, SubmitFailure};

// Program error codes of the sale program (Anchor custom-error space).
const CODE_NOT_ENOUGH_TOKENS: u32 = 0x133; // 307: payment-token balance too low
const CODE_NOT_ENOUGH_SOL: u32 = 0x135; // 309: lamport balance too low
const CODE_SOLD_OUT: u32 = 0x137; // 311: machine empty
const CODE_NOT_LIVE: u32 = 0x138; // 312: sale not started

/// Closed set of user-facing mint outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        #[serde(with = "as_display")]
        mint: Pubkey,
        #[serde(with = "as_display")]
        signature: Signature,
    },
    SoldOut,
    NotYetLive,
    InsufficientFunds,
    UserRejectedSigning,
    /// Ambiguous: the attempt may still land. Callers must present this as
    /// "status unknown", never as a clear success or failure.
    NetworkTimeout,
    UnknownFailure {
        detail: String,
    },
}

impl Outcome {
    /// Human-readable message category for the presentation layer.
    pub fn message(&self) -> String {
        match self {
            Outcome::Success { .. } => "Congratulations! Mint succeeded!".to_string(),
            Outcome::SoldOut => "SOLD OUT!".to_string(),
            Outcome::NotYetLive => "Minting period hasn't started yet.".to_string(),
            Outcome::InsufficientFunds => {
                "Insufficient funds to mint. Please fund your wallet.".to_string()
            }
            Outcome::UserRejectedSigning => "Signing request was declined.".to_string(),
            Outcome::NetworkTimeout => {
                "Transaction status unknown. Check the ledger before retrying.".to_string()
            }
            Outcome::UnknownFailure { detail } => format!("Mint failed: {detail}"),
        }
    }
}

/// Classifies a terminal [`MintAttempt`].
pub fn classify_attempt(attempt: &MintAttempt) -> Outcome {
    match &attempt.status {
        AttemptStatus::Confirmed => Outcome::Success {
            mint: attempt.mint,
            signature: attempt.signature,
        },
        AttemptStatus::Failed(err) => classify_transaction_error(err),
        AttemptStatus::TimedOut => Outcome::NetworkTimeout,
        // A pending attempt is not terminal; treat it as unknown rather than
        // inventing a result.
        AttemptStatus::Pending => Outcome::NetworkTimeout,
    }
}

/// Classifies a pre-terminal failure from the signing/submission phase.
pub fn classify_submit_failure(failure: &SubmitFailure) -> Outcome {
    match failure {
        SubmitFailure::Signing(_) => Outcome::UserRejectedSigning,
        SubmitFailure::Submission(err) => classify_gateway_error(err),
    }
}

/// Tier 1: structured program error codes.
pub fn classify_transaction_error(err: &TransactionError) -> Outcome {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => match *code {
            CODE_SOLD_OUT => Outcome::SoldOut,
            CODE_NOT_LIVE => Outcome::NotYetLive,
            CODE_NOT_ENOUGH_SOL | CODE_NOT_ENOUGH_TOKENS => Outcome::InsufficientFunds,
            other => {
                warn!("Unrecognized program error code 0x{:x}", other);
                Outcome::UnknownFailure {
                    detail: format!("program error 0x{other:x}"),
                }
            }
        },
        TransactionError::InsufficientFundsForFee => Outcome::InsufficientFunds,
        other => Outcome::UnknownFailure {
            detail: other.to_string(),
        },
    }
}

fn classify_gateway_error(err: &GatewayError) -> Outcome {
    match err {
        GatewayError::Rejected {
            program_error: Some(program_error),
            ..
        } => classify_transaction_error(program_error),
        GatewayError::Rejected { message, .. } => classify_message(message),
        GatewayError::Rpc(_) | GatewayError::Transport(_) => Outcome::NetworkTimeout,
    }
}

/// Tier 2: substring matching on error text. Codes `0x137` and `0x135` have
/// stable meanings; `0x138` is intentionally NOT matched here and falls
/// through with its raw text for diagnosis.
fn classify_message(message: &str) -> Outcome {
    if message.contains("0x137") {
        Outcome::SoldOut
    } else if message.contains("0x135") {
        Outcome::InsufficientFunds
    } else {
        Outcome::UnknownFailure {
            detail: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SigningRejected;

    fn custom_error(code: u32) -> TransactionError {
        TransactionError::InstructionError(0, InstructionError::Custom(code))
    }

    fn attempt_with(status: AttemptStatus) -> MintAttempt {
        MintAttempt {
            mint: Pubkey::new_unique(),
            signature: Signature::default(),
            submitted_at: 0,
            status,
        }
    }

    #[test]
    fn sold_out_code_is_authoritative() {
        let attempt = attempt_with(AttemptStatus::Failed(custom_error(0x137)));
        assert_eq!(classify_attempt(&attempt), Outcome::SoldOut);
    }

    #[test]
    fn not_live_code_maps_structurally() {
        assert_eq!(
            classify_transaction_error(&custom_error(0x138)),
            Outcome::NotYetLive
        );
    }

    #[test]
    fn funds_codes_map_to_insufficient_funds() {
        assert_eq!(
            classify_transaction_error(&custom_error(0x135)),
            Outcome::InsufficientFunds
        );
        assert_eq!(
            classify_transaction_error(&custom_error(0x133)),
            Outcome::InsufficientFunds
        );
    }

    #[test]
    fn unknown_code_surfaces_raw() {
        let outcome = classify_transaction_error(&custom_error(0x1999));
        match outcome {
            Outcome::UnknownFailure { detail } => assert!(detail.contains("0x1999")),
            other => panic!("expected UnknownFailure, got {other:?}"),
        }
    }

    #[test]
    fn confirmed_attempt_is_success_with_identity() {
        let attempt = attempt_with(AttemptStatus::Confirmed);
        match classify_attempt(&attempt) {
            Outcome::Success { mint, .. } => assert_eq!(mint, attempt.mint),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[test]
    fn timeout_stays_ambiguous() {
        let attempt = attempt_with(AttemptStatus::TimedOut);
        assert_eq!(classify_attempt(&attempt), Outcome::NetworkTimeout);
    }

    #[test]
    fn signing_rejection_classifies_without_retry_hint() {
        let failure = SubmitFailure::Signing(SigningRejected::new("user closed prompt"));
        assert_eq!(classify_submit_failure(&failure), Outcome::UserRejectedSigning);
    }

    #[test]
    fn structured_code_beats_message_text() {
        let failure = SubmitFailure::Submission(GatewayError::Rejected {
            message: "something mentioning 0x135".to_string(),
            program_error: Some(custom_error(0x137)),
        });
        assert_eq!(classify_submit_failure(&failure), Outcome::SoldOut);
    }

    #[test]
    fn message_tier_matches_stable_codes() {
        let failure = SubmitFailure::Submission(GatewayError::Rejected {
            message: "custom program error: 0x137".to_string(),
            program_error: None,
        });
        assert_eq!(classify_submit_failure(&failure), Outcome::SoldOut);
    }

    #[test]
    fn message_tier_leaves_not_live_code_unmapped() {
        // This code has no message-tier mapping on purpose; it surfaces raw
        // for diagnosis instead of being silently swallowed.
        let failure = SubmitFailure::Submission(GatewayError::Rejected {
            message: "custom program error: 0x138".to_string(),
            program_error: None,
        });
        match classify_submit_failure(&failure) {
            Outcome::UnknownFailure { detail } => assert!(detail.contains("0x138")),
            other => panic!("expected UnknownFailure, got {other:?}"),
        }
    }

    #[test]
    fn bare_transport_error_is_ambiguous_timeout() {
        let failure =
            SubmitFailure::Submission(GatewayError::Transport("connection reset".to_string()));
        assert_eq!(classify_submit_failure(&failure), Outcome::NetworkTimeout);
    }
}
