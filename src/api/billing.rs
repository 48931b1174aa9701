use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::status_ok;
use crate::{
    cost::parse_storage,
    handler::{ApiRequest, Context, HandlerResult},
    payment::Charge,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct BillingRequest {
    /// Validated by [`parse_storage`]; kept raw so strings from form inputs
    /// are accepted too.
    pub storage: Value,
    pub source: String,
}

/// Charges the caller for the requested amount of storage.
pub async fn bill(state: Arc<AppState>, request: ApiRequest, context: Context) -> HandlerResult {
    let billing: BillingRequest = request.json_body()?;
    let storage = parse_storage(&billing.storage)?;
    let amount = state.config.pricing.cost(storage);

    let receipt = state
        .payments
        .charge(Charge {
            source: billing.source,
            amount,
            description: state.config.charge_description.clone(),
            currency: state.config.currency.clone(),
        })
        .await?;

    info!(
        request_id = %context.request_id,
        storage,
        amount,
        receipt = %receipt.id,
        "storage purchased"
    );
    Ok(status_ok()?)
}
