//! Ledger access boundary.
//!
//! Everything the engine needs from the network lives behind the
//! [`LedgerGateway`] trait: account reads, token balances, blockhashes,
//! transaction submission and status queries. The production implementation
//! wraps the nonblocking RPC client; tests substitute in-memory fakes.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use solana_transaction_status::TransactionConfirmationStatus;
use std::sync::Arc;
use tracing::debug;

use crate::errors::GatewayError;

/// Status of one submitted mint attempt.
///
/// The ledger only ever reports the first three variants; `TimedOut` is
/// assigned by the confirmation poller when the deadline passes, and is
/// explicitly ambiguous: the transaction may still land later.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    Pending,
    Confirmed,
    Failed(TransactionError),
    TimedOut,
}

impl AttemptStatus {
    /// Terminal statuses stop the poll loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptStatus::Pending)
    }
}

/// Read/submit capability against the ledger.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Raw bytes of an account, or `None` if it does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, GatewayError>;

    /// Native balance of an account, in lamports.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, GatewayError>;

    /// Balance of `owner`'s associated token account for `mint`, in base
    /// units. Zero when the token account does not exist.
    async fn get_token_balance(&self, owner: &Pubkey, mint: &Pubkey)
        -> Result<u64, GatewayError>;

    /// A recent blockhash for transaction assembly.
    async fn latest_blockhash(&self) -> Result<Hash, GatewayError>;

    /// Sends a signed transaction, returning the attempt identifier.
    async fn submit(&self, transaction: &Transaction) -> Result<Signature, GatewayError>;

    /// Current status of a previously submitted attempt.
    async fn attempt_status(&self, signature: &Signature) -> Result<AttemptStatus, GatewayError>;
}

/// [`LedgerGateway`] backed by a Solana JSON-RPC endpoint.
pub struct RpcGateway {
    client: Arc<RpcClient>,
}

impl RpcGateway {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let client = RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed());
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl LedgerGateway for RpcGateway {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, GatewayError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, GatewayError> {
        Ok(self.client.get_balance(address).await?)
    }

    async fn get_token_balance(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<u64, GatewayError> {
        let token_account = spl_associated_token_account::get_associated_token_address(owner, mint);
        // A missing token account surfaces as an RPC error; callers treat any
        // failure here as a zero balance, matching on-chain semantics.
        let balance = self.client.get_token_account_balance(&token_account).await?;
        let amount = balance.amount.parse::<u64>().unwrap_or(0);
        debug!("Token balance for {} of mint {}: {}", owner, mint, amount);
        Ok(amount)
    }

    async fn latest_blockhash(&self) -> Result<Hash, GatewayError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn submit(&self, transaction: &Transaction) -> Result<Signature, GatewayError> {
        match self.client.send_transaction(transaction).await {
            Ok(signature) => Ok(signature),
            Err(err) => {
                // Preflight rejections carry the structured program error the
                // classifier prefers over message text.
                let program_error = err.get_transaction_error();
                Err(GatewayError::Rejected {
                    message: err.to_string(),
                    program_error,
                })
            }
        }
    }

    async fn attempt_status(&self, signature: &Signature) -> Result<AttemptStatus, GatewayError> {
        let response = self.client.get_signature_statuses(&[*signature]).await?;
        let status = match response.value.into_iter().next().flatten() {
            Some(status) => status,
            // Not yet observed by the cluster.
            None => return Ok(AttemptStatus::Pending),
        };

        if let Some(err) = status.err {
            return Ok(AttemptStatus::Failed(err));
        }
        match status.confirmation_status {
            Some(TransactionConfirmationStatus::Confirmed)
            | Some(TransactionConfirmationStatus::Finalized) => Ok(AttemptStatus::Confirmed),
            _ => Ok(AttemptStatus::Pending),
        }
    }
}
