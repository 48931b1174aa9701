use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config,
    payment::{LedgerProcessor, PaymentProcessor},
    stores::NotesStore,
};

/// Everything a handler body may touch, passed in explicitly.
pub struct AppState {
    pub config: Config,
    pub notes: RwLock<NotesStore>,
    pub payments: Arc<dyn PaymentProcessor>,
}

impl AppState {
    pub fn new(config: Config, payments: Arc<dyn PaymentProcessor>) -> Arc<Self> {
        Arc::new(Self {
            config,
            notes: RwLock::new(NotesStore::new()),
            payments,
        })
    }

    /// State backed by the in-memory ledger processor.
    pub fn with_ledger(config: Config) -> Arc<Self> {
        Self::new(config, Arc::new(LedgerProcessor::new()))
    }
}
