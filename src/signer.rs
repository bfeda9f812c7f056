//! Transaction signing boundary.
//!
//! The engine never holds key material itself; it consumes a
//! [`TransactionSigner`] capability. The bundled implementation loads a
//! keypair from the standard JSON array file and signs locally. A wallet
//! frontend would substitute its own implementation and surface the approval
//! prompt to the user.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use std::fs;
use tracing::info;

use crate::errors::SigningRejected;

/// Capability to sign a mint transaction as the fee-paying buyer.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Public identity of the buyer.
    fn pubkey(&self) -> Pubkey;

    /// Adds the buyer's signature. A declined request is terminal for the
    /// attempt and must not be retried automatically.
    async fn sign_transaction(&self, transaction: Transaction)
        -> Result<Transaction, SigningRejected>;
}

/// [`TransactionSigner`] backed by a local keypair file.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    /// Loads the keypair from a JSON byte-array file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let bytes: Vec<u8> = serde_json::from_str(&contents)?;
        let keypair = Keypair::try_from(&bytes[..])
            .map_err(|e| anyhow::anyhow!("invalid keypair file {}: {}", path, e))?;
        info!("Wallet loaded: {}", keypair.pubkey());
        Ok(Self { keypair })
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, SigningRejected> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| SigningRejected::new(e.to_string()))?;
        Ok(transaction)
    }
}
