use std::error::Error;
use std::io::Write;
use std::path::Path;

use crate::{
    cost::PricingModel,
    csv_utils::write_csv,
    dto::{Quote, QuoteRequest},
};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::warn;

const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Async counterpart of [`crate::runner::run`], with identical output.
///
/// One task streams `customer,storage` rows out of the file while a second
/// one prices them as they arrive. Quotes are written once the file is
/// exhausted. A malformed CSV record aborts the run; a row whose storage is
/// not a non-negative integer is logged and left out.
pub async fn run<P, W>(input_path: P, writer: W, pricing: PricingModel) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader = tokio::spawn(stream_rows(input_path, tx));
    let pricer = tokio::spawn(price_rows(rx, pricing));

    reader.await??;
    let quotes = pricer.await?;

    write_csv(writer, quotes.into_iter())?;
    Ok(())
}

async fn stream_rows(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<QuoteRequest>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut rows = reader.deserialize::<QuoteRequest>();
    while let Some(row) = rows.next().await {
        if tx.send(row?).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Quotes come out in the order rows went in.
async fn price_rows(mut rx: mpsc::Receiver<QuoteRequest>, pricing: PricingModel) -> Vec<Quote> {
    let mut quotes = Vec::new();
    while let Some(row) = rx.recv().await {
        let customer = row.customer.clone();
        match row.quote(pricing) {
            Ok(quote) => quotes.push(quote),
            Err(err) => warn!(%customer, error = %err, "skipping quote request"),
        }
    }
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_example_input() -> Result<()> {
        let mut output = Vec::new();
        run("data/example_quotes.csv", &mut output, PricingModel::Progressive).await?;

        let expected = "customer,storage,cost,amount
alice,10,4000,40.00
bob,100,22000,220.00
carol,101,22100,221.00
erin,0,0,0.00
";
        assert_eq!(String::from_utf8(output)?, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_matches_sync_runner() -> Result<()> {
        let mut async_output = Vec::new();
        run("data/example_quotes.csv", &mut async_output, PricingModel::Flat).await?;

        let mut sync_output = Vec::new();
        crate::runner::run("data/example_quotes.csv", &mut sync_output, PricingModel::Flat)
            .map_err(|e| e.to_string())?;

        assert_eq!(async_output, sync_output);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file() {
        let mut output = Vec::new();
        let result = run("data/does_not_exist.csv", &mut output, PricingModel::Progressive).await;
        assert!(result.is_err());
    }
}
