use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cost::{parse_storage_str, to_major_units, PricingModel};
use crate::Error;

/// Input row of a batch quote: `customer,storage`.
///
/// Storage stays textual here so a bad quantity fails one row instead of
/// the whole file.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QuoteRequest {
    pub customer: String,
    pub storage: String,
}

/// Output row of a batch quote: `customer,storage,cost,amount`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub customer: String,
    pub storage: u64,
    /// Minor currency units.
    pub cost: u64,
    /// Major currency units, two decimal places.
    pub amount: Decimal,
}

impl QuoteRequest {
    pub fn quote(self, pricing: PricingModel) -> Result<Quote, Error> {
        let storage = parse_storage_str(&self.storage)?;
        let cost = pricing.cost(storage);
        Ok(Quote {
            customer: self.customer,
            storage,
            cost,
            amount: to_major_units(cost),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_csv_row(row: &str) -> Result<QuoteRequest, csv::Error> {
        let data_with_header = format!("customer,storage\n{}", row);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data_with_header.as_bytes());
        reader.deserialize().next().unwrap()
    }

    #[test]
    fn test_parse_request() {
        assert_eq!(
            parse_csv_row("alice, 12").unwrap(),
            QuoteRequest {
                customer: "alice".to_string(),
                storage: "12".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_missing_column() {
        assert!(parse_csv_row("alice").is_err());
    }

    #[test]
    fn test_quote() {
        let request = parse_csv_row("alice,12").unwrap();
        assert_eq!(
            request.quote(PricingModel::Progressive).unwrap(),
            Quote {
                customer: "alice".to_string(),
                storage: 12,
                cost: 4400,
                amount: dec!(44.00),
            }
        );
    }

    #[test]
    fn test_quote_invalid_storage() {
        for storage in ["-1", "1.5", "ten", ""] {
            let request = QuoteRequest {
                customer: "alice".to_string(),
                storage: storage.to_string(),
            };
            assert!(matches!(
                request.quote(PricingModel::Progressive),
                Err(Error::InvalidStorage(_))
            ));
        }
    }

    #[test]
    fn test_quote_amount_matches_cost_for_huge_storage() {
        let request = parse_csv_row("zed,184467440737095516").unwrap();
        let quote = request.quote(PricingModel::Progressive).unwrap();
        assert_eq!(quote.cost, u64::MAX);
        assert_eq!(quote.amount * dec!(100), Decimal::from(quote.cost));
    }

    #[test]
    fn test_quote_serializes_two_decimal_places() {
        let quote = Quote {
            customer: "bob".to_string(),
            storage: 100,
            cost: 22000,
            amount: to_major_units(22000),
        };
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(quote).unwrap();
        let output = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(output, "customer,storage,cost,amount\nbob,100,22000,220.00\n");
    }
}
