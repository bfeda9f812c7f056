//! The mint engine: orchestrates refresh cycles and mint attempts.
//!
//! Data flows one direction per attempt: decoder -> evaluator -> builder ->
//! submitter/poller -> classifier -> projector -> updated view. The view is
//! published through a `watch` channel; the evaluator replaces it wholesale on
//! refresh and the projector republishes it after a confirmed mint. Nothing
//! else writes it.
//!
//! Only one attempt may be in the signed/submitted phase at a time per
//! engine; a busy flag is taken on entry and released by an RAII guard after
//! the terminal outcome is classified and projected.

pub mod builder;
pub mod classifier;
pub mod decoder;
pub mod eligibility;
pub mod presentation;
pub mod projector;
pub mod submitter;

pub use classifier::Outcome;
pub use presentation::PresentationState;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use spl_associated_token_account::get_associated_token_address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::errors::{BuilderError, EngineError};
use crate::gateway::LedgerGateway;
use crate::signer::TransactionSigner;
use crate::types::{DerivedView, SaleConfig};

use builder::BuildContext;
use submitter::{MintAttempt, PollTiming, SubmitFailure};

/// Session-scoped mutual exclusion for the submit/poll phase. Released on
/// drop, which only happens after classification and projection complete.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        // Construct the guard only on a won exchange; a discarded guard would
        // release a flag someone else holds.
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(Self { flag })
        } else {
            None
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct EngineState {
    /// Latest decoded snapshot; replaced atomically on refresh, bumped only
    /// by the projector.
    sale: Option<SaleConfig>,
    wallet_whitelist_balance: u64,
}

/// Client-side mint engine for one sale.
pub struct MintEngine {
    candy_machine_id: Pubkey,
    config: EngineConfig,
    gateway: Arc<dyn LedgerGateway>,
    signer: Option<Arc<dyn TransactionSigner>>,
    clock: Arc<dyn Clock>,
    state: RwLock<EngineState>,
    view_tx: watch::Sender<DerivedView>,
    busy: AtomicBool,
    cancel_tx: watch::Sender<bool>,
}

impl MintEngine {
    pub fn new(
        candy_machine_id: Pubkey,
        config: EngineConfig,
        gateway: Arc<dyn LedgerGateway>,
        signer: Option<Arc<dyn TransactionSigner>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (view_tx, _) = watch::channel(DerivedView::default());
        let (cancel_tx, _) = watch::channel(false);
        Self {
            candy_machine_id,
            config,
            gateway,
            signer,
            clock,
            state: RwLock::new(EngineState {
                sale: None,
                wallet_whitelist_balance: 0,
            }),
            view_tx,
            busy: AtomicBool::new(false),
            cancel_tx,
        }
    }

    /// Public identity of the connected buyer, if any.
    pub fn buyer(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|s| s.pubkey())
    }

    /// Read-only subscription to view changes.
    pub fn subscribe(&self) -> watch::Receiver<DerivedView> {
        self.view_tx.subscribe()
    }

    /// Latest published view.
    pub fn current_view(&self) -> DerivedView {
        self.view_tx.borrow().clone()
    }

    /// Tagged presentation state derived from the latest view.
    pub async fn presentation_state(&self) -> PresentationState {
        let gatekeeper_configured = self
            .state
            .read()
            .await
            .sale
            .as_ref()
            .map(|sale| sale.gatekeeper.is_some())
            .unwrap_or(false);
        let view = self.current_view();
        PresentationState::derive(&view, self.signer.is_some(), gatekeeper_configured)
    }

    /// Whether the sale charges in an SPL token rather than native currency.
    /// Drives which decimals/label the price display uses.
    pub async fn uses_token_payment(&self) -> bool {
        self.state
            .read()
            .await
            .sale
            .as_ref()
            .map(|sale| sale.payment_mint.is_some())
            .unwrap_or(false)
    }

    /// Native balance of the connected buyer, for display.
    pub async fn wallet_balance(&self) -> Result<u64, EngineError> {
        match self.buyer() {
            Some(buyer) => Ok(self.gateway.get_balance(&buyer).await?),
            None => Ok(0),
        }
    }

    /// Fetches and decodes the sale account, re-reads the whitelist balance,
    /// and publishes a freshly evaluated view. On failure the previous view
    /// is retained untouched.
    pub async fn refresh(&self) -> Result<DerivedView, EngineError> {
        let data = self
            .gateway
            .get_account(&self.candy_machine_id)
            .await?
            .ok_or(EngineError::SaleAccountMissing(self.candy_machine_id))?;
        let sale = decoder::decode_sale_config(&data)?;

        let wallet_whitelist_balance = match (&sale.whitelist, self.buyer()) {
            (Some(whitelist), Some(buyer)) => {
                match self.gateway.get_token_balance(&buyer, &whitelist.mint).await {
                    Ok(balance) => balance,
                    Err(e) => {
                        // A missing token account and a transport blip look
                        // the same here; both read as "no whitelist access".
                        warn!("Whitelist balance query failed, assuming 0: {e}");
                        0
                    }
                }
            }
            _ => 0,
        };

        let now = self.clock.unix_timestamp();
        let view = eligibility::evaluate(&sale, wallet_whitelist_balance, now);

        let mut state = self.state.write().await;
        state.sale = Some(sale);
        state.wallet_whitelist_balance = wallet_whitelist_balance;
        self.view_tx.send_replace(view.clone());
        info!(
            "Sale refreshed: {}/{} redeemed, active={}, ended={}",
            view.items_redeemed, view.items_available, view.is_active, view.is_ended
        );
        Ok(view)
    }

    /// Runs one complete mint attempt and returns its classified outcome.
    ///
    /// A second call while an attempt is in flight fails with
    /// [`EngineError::AttemptInFlight`]. One automatic rebuild-and-resubmit
    /// is performed on submission rejection, always with a freshly generated
    /// one-time identity; a timed-out attempt is never resubmitted.
    pub async fn attempt_mint(&self) -> Result<Outcome, EngineError> {
        let guard =
            BusyGuard::try_acquire(&self.busy).ok_or(EngineError::AttemptInFlight)?;
        self.cancel_tx.send_replace(false);

        let signer = match &self.signer {
            Some(signer) => Arc::clone(signer),
            None => return Err(BuilderError::MissingWallet.into()),
        };
        let buyer = signer.pubkey();

        let sale = self
            .state
            .read()
            .await
            .sale
            .clone()
            .ok_or(EngineError::NoSaleConfig)?;
        let view = self.current_view();

        let submitted = match self.submit_once(signer.as_ref(), &sale, &view, buyer).await? {
            Ok(attempt) => Ok(attempt),
            Err(SubmitFailure::Submission(err)) => {
                warn!("Submission rejected ({err}); rebuilding once with a fresh identity");
                self.submit_once(signer.as_ref(), &sale, &view, buyer).await?
            }
            Err(signing) => Err(signing),
        };

        let outcome = match submitted {
            Ok(mut attempt) => {
                submitter::await_confirmation(
                    self.gateway.as_ref(),
                    &mut attempt,
                    PollTiming::from(&self.config),
                    self.cancel_tx.subscribe(),
                )
                .await;
                classifier::classify_attempt(&attempt)
            }
            Err(failure) => classifier::classify_submit_failure(&failure),
        };

        if matches!(outcome, Outcome::Success { .. }) {
            // Must happen before the busy guard clears so no refresh can
            // observe a stale "still active" view alongside a confirmed mint.
            self.project_success().await;
        }

        drop(guard);
        Ok(outcome)
    }

    /// Cancels the confirmation poll of the in-flight attempt, resolving it
    /// as unknown/timed-out. No-op when nothing is polling.
    pub fn cancel_confirmation(&self) {
        self.cancel_tx.send_replace(true);
    }

    /// Builds, signs and submits with a fresh one-time identity. Outer error:
    /// local failures that abort the attempt; inner result: the submission
    /// phase outcome.
    async fn submit_once(
        &self,
        signer: &dyn TransactionSigner,
        sale: &SaleConfig,
        view: &DerivedView,
        buyer: Pubkey,
    ) -> Result<Result<MintAttempt, SubmitFailure>, EngineError> {
        let mint_keypair = Keypair::new();
        let receiving_account = get_associated_token_address(&buyer, &mint_keypair.pubkey());
        let receiving_account_exists = self
            .gateway
            .get_account(&receiving_account)
            .await?
            .is_some();

        let ctx = BuildContext {
            candy_machine: self.candy_machine_id,
            sale,
            view,
            buyer: Some(buyer),
            mint: mint_keypair.pubkey(),
            receiving_account_exists,
        };
        let transaction = builder::build_mint_transaction(&ctx)?;

        let now = self.clock.unix_timestamp();
        Ok(submitter::sign_and_submit(
            self.gateway.as_ref(),
            signer,
            &mint_keypair,
            transaction,
            now,
        )
        .await)
    }

    /// Applies the confirmed mint's deterministic deltas and republishes the
    /// view. Superseded by the next full refresh.
    async fn project_success(&self) {
        let now = self.clock.unix_timestamp();
        let mut state = self.state.write().await;
        let EngineState {
            sale,
            wallet_whitelist_balance,
        } = &mut *state;
        if let Some(sale) = sale.as_mut() {
            let view = projector::apply_confirmed_mint(sale, wallet_whitelist_balance, now);
            self.view_tx.send_replace(view);
        }
    }
}
