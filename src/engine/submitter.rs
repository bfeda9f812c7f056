//! Transaction submission and confirmation polling.
//!
//! One [`MintAttempt`] walks `Built -> Signed -> Submitted` and then a poll
//! loop drives it to a terminal status: `Confirmed`, `Failed`, or `TimedOut`
//! when the deadline passes. Timeout is deliberately ambiguous; the attempt
//! may still land on the ledger afterwards, so a timed-out identity is never
//! resubmitted.
//!
//! The poller queries first and sleeps after, so at least one status check
//! always lands before the configured deadline, however short.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::errors::{GatewayError, SigningRejected};
use crate::gateway::{AttemptStatus, LedgerGateway};
use crate::signer::TransactionSigner;

/// Ephemeral record of one submitted mint attempt. Owned by this module
/// until a terminal status is reached, then handed to the classifier and
/// discarded.
#[derive(Debug, Clone)]
pub struct MintAttempt {
    /// The one-time mint identity this attempt would consume.
    pub mint: Pubkey,
    /// Attempt identifier on the ledger.
    pub signature: Signature,
    /// Unix timestamp at submission.
    pub submitted_at: i64,
    pub status: AttemptStatus,
}

/// Pre-terminal failure: the attempt never reached the polling phase.
#[derive(Debug)]
pub enum SubmitFailure {
    /// The external signer declined. Never retried.
    Signing(SigningRejected),
    /// The ledger rejected the submission outright. The engine may rebuild
    /// with a fresh identity and resubmit once.
    Submission(GatewayError),
}

/// Backoff and deadline parameters for the confirmation poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollTiming {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub timeout_ms: u64,
}

impl From<&EngineConfig> for PollTiming {
    fn from(config: &EngineConfig) -> Self {
        Self {
            base_delay_ms: config.poll_base_delay_ms,
            max_delay_ms: config.poll_max_delay_ms,
            timeout_ms: config.confirmation_timeout_ms,
        }
    }
}

/// Signs and submits one built transaction: the engine-held one-time mint
/// keypair co-signs first, then the external signer adds the fee-payer
/// signature, then the bytes go out.
pub async fn sign_and_submit(
    gateway: &dyn LedgerGateway,
    signer: &dyn TransactionSigner,
    mint_keypair: &Keypair,
    mut transaction: Transaction,
    now: i64,
) -> Result<MintAttempt, SubmitFailure> {
    let blockhash = gateway
        .latest_blockhash()
        .await
        .map_err(SubmitFailure::Submission)?;

    transaction
        .try_partial_sign(&[mint_keypair], blockhash)
        .map_err(|e| {
            SubmitFailure::Submission(GatewayError::Transport(format!(
                "one-time identity signing failed: {e}"
            )))
        })?;

    let signed = signer
        .sign_transaction(transaction)
        .await
        .map_err(SubmitFailure::Signing)?;

    let signature = gateway
        .submit(&signed)
        .await
        .map_err(SubmitFailure::Submission)?;

    info!(
        "Mint attempt submitted: signature {} for identity {}",
        signature,
        mint_keypair.pubkey()
    );

    Ok(MintAttempt {
        mint: mint_keypair.pubkey(),
        signature,
        submitted_at: now,
        status: AttemptStatus::Pending,
    })
}

/// Polls the attempt to a terminal status with exponential backoff, or marks
/// it `TimedOut` at the deadline. Cancellation (via `cancel` flipping to
/// `true`) also resolves as `TimedOut`: the outcome is unknown, never
/// fabricated.
pub async fn await_confirmation(
    gateway: &dyn LedgerGateway,
    attempt: &mut MintAttempt,
    timing: PollTiming,
    mut cancel: watch::Receiver<bool>,
) {
    let deadline = Instant::now() + Duration::from_millis(timing.timeout_ms);
    let max_delay = Duration::from_millis(timing.max_delay_ms);
    let mut backoff = ExponentialBackoff::from_millis(timing.base_delay_ms)
        .max_delay(max_delay)
        .map(jitter);

    loop {
        match gateway.attempt_status(&attempt.signature).await {
            Ok(status) if status.is_terminal() => {
                debug!("Attempt {} resolved: {:?}", attempt.signature, status);
                attempt.status = status;
                return;
            }
            Ok(_) => {}
            // Transient status-query failures keep the loop alive; only the
            // deadline decides when to give up.
            Err(e) => warn!("Status query failed for {}: {}", attempt.signature, e),
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!(
                "Confirmation deadline passed for {}; outcome unknown",
                attempt.signature
            );
            attempt.status = AttemptStatus::TimedOut;
            return;
        }

        let delay = backoff.next().unwrap_or(max_delay).min(remaining);
        tokio::select! {
            _ = sleep(delay) => {}
            changed = cancel.changed() => {
                if changed.is_ok() && *cancel.borrow() {
                    warn!(
                        "Confirmation polling cancelled for {}; outcome unknown",
                        attempt.signature
                    );
                    attempt.status = AttemptStatus::TimedOut;
                    return;
                }
                if changed.is_err() {
                    // Cancel handle gone; fall back to plain backoff.
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solana_sdk::hash::Hash;
    use solana_sdk::transaction::TransactionError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Gateway stub that replays a scripted sequence of poll responses.
    struct ScriptedGateway {
        statuses: Mutex<VecDeque<AttemptStatus>>,
    }

    impl ScriptedGateway {
        fn new(statuses: Vec<AttemptStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
            }
        }
    }

    #[async_trait]
    impl LedgerGateway for ScriptedGateway {
        async fn get_account(&self, _address: &Pubkey) -> Result<Option<Vec<u8>>, GatewayError> {
            Ok(None)
        }
        async fn get_balance(&self, _address: &Pubkey) -> Result<u64, GatewayError> {
            Ok(0)
        }
        async fn get_token_balance(
            &self,
            _owner: &Pubkey,
            _mint: &Pubkey,
        ) -> Result<u64, GatewayError> {
            Ok(0)
        }
        async fn latest_blockhash(&self) -> Result<Hash, GatewayError> {
            Ok(Hash::default())
        }
        async fn submit(&self, _transaction: &Transaction) -> Result<Signature, GatewayError> {
            Ok(Signature::default())
        }
        async fn attempt_status(
            &self,
            _signature: &Signature,
        ) -> Result<AttemptStatus, GatewayError> {
            let mut statuses = self.statuses.lock().unwrap();
            // Past the end of the script the attempt just stays pending.
            Ok(statuses.pop_front().unwrap_or(AttemptStatus::Pending))
        }
    }

    fn pending_attempt() -> MintAttempt {
        MintAttempt {
            mint: Pubkey::new_unique(),
            signature: Signature::default(),
            submitted_at: 0,
            status: AttemptStatus::Pending,
        }
    }

    fn fast_timing(timeout_ms: u64) -> PollTiming {
        PollTiming {
            base_delay_ms: 1,
            max_delay_ms: 5,
            timeout_ms,
        }
    }

    #[tokio::test]
    async fn resolves_confirmed_after_pending_polls() {
        let gateway = ScriptedGateway::new(vec![
            AttemptStatus::Pending,
            AttemptStatus::Pending,
            AttemptStatus::Confirmed,
        ]);
        let (_tx, rx) = watch::channel(false);
        let mut attempt = pending_attempt();

        await_confirmation(&gateway, &mut attempt, fast_timing(5_000), rx).await;
        assert_eq!(attempt.status, AttemptStatus::Confirmed);
    }

    #[tokio::test]
    async fn resolves_failed_with_ledger_error() {
        let err = TransactionError::InstructionError(
            0,
            solana_sdk::instruction::InstructionError::Custom(0x137),
        );
        let gateway = ScriptedGateway::new(vec![AttemptStatus::Failed(err.clone())]);
        let (_tx, rx) = watch::channel(false);
        let mut attempt = pending_attempt();

        await_confirmation(&gateway, &mut attempt, fast_timing(5_000), rx).await;
        assert_eq!(attempt.status, AttemptStatus::Failed(err));
    }

    #[tokio::test]
    async fn times_out_when_never_terminal() {
        let gateway = ScriptedGateway::new(vec![]);
        let (_tx, rx) = watch::channel(false);
        let mut attempt = pending_attempt();

        await_confirmation(&gateway, &mut attempt, fast_timing(20), rx).await;
        assert_eq!(attempt.status, AttemptStatus::TimedOut);
    }

    #[tokio::test]
    async fn polls_at_least_once_even_with_zero_deadline() {
        let gateway = ScriptedGateway::new(vec![AttemptStatus::Confirmed]);
        let (_tx, rx) = watch::channel(false);
        let mut attempt = pending_attempt();

        await_confirmation(&gateway, &mut attempt, fast_timing(0), rx).await;
        // The first poll happens before the deadline check, so a ready status
        // still wins.
        assert_eq!(attempt.status, AttemptStatus::Confirmed);
    }

    #[tokio::test]
    async fn cancellation_yields_timeout_not_failure() {
        let gateway = ScriptedGateway::new(vec![]);
        let (tx, rx) = watch::channel(false);
        let mut attempt = pending_attempt();

        let poll = tokio::spawn(async move {
            let gateway = gateway;
            let mut attempt = attempt;
            await_confirmation(
                &gateway,
                &mut attempt,
                PollTiming {
                    base_delay_ms: 60_000,
                    max_delay_ms: 60_000,
                    timeout_ms: 120_000,
                },
                rx,
            )
            .await;
            attempt
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();
        attempt = poll.await.unwrap();
        assert_eq!(attempt.status, AttemptStatus::TimedOut);
    }
}
