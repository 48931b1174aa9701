use std::error::Error;
use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::{
    cost::PricingModel,
    csv_utils::{read_csv, write_csv},
    dto::{Quote, QuoteRequest},
};

/// Quotes every `customer,storage` row of `input_path` under `pricing` and
/// writes `customer,storage,cost,amount` rows to `writer`.
///
/// Fails on an unreadable file, a malformed record or a write error. Rows
/// with an invalid storage quantity are skipped with a warning.
pub fn run<P, W>(input_path: P, writer: W, pricing: PricingModel) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut quotes: Vec<Quote> = Vec::new();

    for request in read_csv::<QuoteRequest, _>(input_path)? {
        let request = request?;
        let customer = request.customer.clone();
        // A bad quantity only drops its own row
        match request.quote(pricing) {
            Ok(quote) => quotes.push(quote),
            Err(err) => warn!(%customer, error = %err, "skipping quote request"),
        }
    }

    write_csv(writer, quotes.into_iter())?;
    Ok(())
}
