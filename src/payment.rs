//! Payment processor capability.
//!
//! Card details never reach this backend: the client tokenizes the card with
//! the processor and sends the resulting token as `source`. The backend only
//! asks the processor to charge that token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub source: String,
    /// Minor currency units.
    pub amount: u64,
    pub description: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub id: String,
    pub amount: u64,
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge(&self, charge: Charge) -> Result<ChargeReceipt, Error>;
}

/// Processor that settles charges into an in-memory ledger.
///
/// Used when no hosted processor is configured, e.g. local runs and tests.
#[derive(Default)]
pub struct LedgerProcessor {
    charges: Mutex<Vec<Charge>>,
}

impl LedgerProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn charges(&self) -> Vec<Charge> {
        self.charges.lock().await.clone()
    }
}

#[async_trait]
impl PaymentProcessor for LedgerProcessor {
    async fn charge(&self, charge: Charge) -> Result<ChargeReceipt, Error> {
        if charge.source.trim().is_empty() {
            return Err(Error::PaymentDeclined(
                "No payment source was provided.".to_string(),
            ));
        }
        if charge.amount == 0 {
            return Err(Error::PaymentDeclined(
                "Charge amount must be greater than zero.".to_string(),
            ));
        }

        let receipt = ChargeReceipt {
            id: format!("ch_{}", Uuid::new_v4().simple()),
            amount: charge.amount,
        };
        info!(
            receipt = %receipt.id,
            amount = charge.amount,
            currency = %charge.currency,
            "charge settled"
        );
        self.charges.lock().await.push(charge);
        Ok(receipt)
    }
}
