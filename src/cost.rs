//! Storage billing.
//!
//! Storage is billed on a progressive schedule: every unit is charged at the
//! rate of the band it falls into, so the first ten notes always cost the
//! first-tier rate no matter how many are bought in total.
//!
//! The flat schedule, where the whole quantity is billed at the rate of the
//! band the total lands in, is kept for quotes that must match prices issued
//! before the progressive schedule. It is not monotonic: 101 items cost less
//! than 100.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// One band of the pricing schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingTier {
    /// Inclusive upper bound of the band, `None` for the open-ended last band.
    pub up_to: Option<u64>,
    /// Minor currency units per stored item.
    pub rate: u64,
}

/// Tiers in ascending order of bound.
pub const TIERS: [BillingTier; 3] = [
    BillingTier {
        up_to: Some(10),
        rate: 400,
    },
    BillingTier {
        up_to: Some(100),
        rate: 200,
    },
    BillingTier {
        up_to: None,
        rate: 100,
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingModel {
    #[default]
    Progressive,
    Flat,
}

impl PricingModel {
    pub fn cost(self, storage: u64) -> u64 {
        match self {
            PricingModel::Progressive => calculate_cost(storage),
            PricingModel::Flat => flat_cost(storage),
        }
    }
}

impl FromStr for PricingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "progressive" => Ok(PricingModel::Progressive),
            "flat" => Ok(PricingModel::Flat),
            other => Err(format!("unknown pricing model {other:?}")),
        }
    }
}

/// Returns the cost, in minor currency units, of storing `storage` items.
///
/// Saturates at `u64::MAX` instead of wrapping.
pub fn calculate_cost(storage: u64) -> u64 {
    let mut cost: u64 = 0;
    let mut lower = 0;

    for tier in TIERS {
        if storage <= lower {
            break;
        }
        let upper = tier.up_to.map_or(storage, |bound| bound.min(storage));
        let units = upper - lower;
        cost = cost.saturating_add(units.saturating_mul(tier.rate));
        lower = upper;
    }

    cost
}

/// Bills every item at the rate of the band `storage` falls into.
pub fn flat_cost(storage: u64) -> u64 {
    let tier = TIERS
        .iter()
        .find(|tier| match tier.up_to {
            Some(bound) => storage <= bound,
            None => true,
        })
        .unwrap_or(&TIERS[TIERS.len() - 1]);
    storage.saturating_mul(tier.rate)
}

/// Validates a storage quantity taken from a request body.
///
/// Accepts JSON integers and strings of decimal digits (HTML number inputs
/// submit strings). Negative, fractional and non-numeric values are rejected.
pub fn parse_storage(value: &Value) -> Result<u64, Error> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| Error::InvalidStorage(n.to_string())),
        Value::String(s) => parse_storage_str(s),
        other => Err(Error::InvalidStorage(other.to_string())),
    }
}

pub fn parse_storage_str(s: &str) -> Result<u64, Error> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidStorage(format!("{s:?}")));
    }
    trimmed
        .parse()
        .map_err(|_| Error::InvalidStorage(format!("{s:?}")))
}

/// Converts minor units to major units, e.g. `4000` cents to `40.00`.
///
/// Exact for every `u64`, the 96-bit mantissa holds it without narrowing.
pub fn to_major_units(cost: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(cost), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_zero_storage_is_free() {
        assert_eq!(calculate_cost(0), 0);
        assert_eq!(flat_cost(0), 0);
    }

    #[test]
    fn test_lowest_tier() {
        assert_eq!(calculate_cost(1), 400);
        assert_eq!(calculate_cost(10), 4000);
    }

    #[test]
    fn test_middle_tier() {
        assert_eq!(calculate_cost(11), 4200);
        assert_eq!(calculate_cost(100), 22000);
    }

    #[test]
    fn test_highest_tier() {
        assert_eq!(calculate_cost(101), 22100);
        assert_eq!(calculate_cost(200), 32000);
    }

    #[test]
    fn test_continuity_at_boundaries() {
        assert_eq!(calculate_cost(11), calculate_cost(10) + 200);
        assert_eq!(calculate_cost(101), calculate_cost(100) + 100);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = 0;
        for storage in 0..=1000 {
            let cost = calculate_cost(storage);
            assert!(cost >= previous, "cost dropped at {storage}");
            previous = cost;
        }
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        assert_eq!(calculate_cost(u64::MAX), u64::MAX);
        assert_eq!(flat_cost(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_flat_schedule() {
        assert_eq!(flat_cost(10), 4000);
        assert_eq!(flat_cost(100), 20000);
        assert_eq!(flat_cost(101), 10100);
    }

    #[test]
    fn test_pricing_model_dispatch() {
        assert_eq!(PricingModel::default(), PricingModel::Progressive);
        assert_eq!(PricingModel::Progressive.cost(101), 22100);
        assert_eq!(PricingModel::Flat.cost(101), 10100);
    }

    #[test]
    fn test_pricing_model_from_str() {
        assert_eq!("flat".parse::<PricingModel>(), Ok(PricingModel::Flat));
        assert_eq!(
            " Progressive ".parse::<PricingModel>(),
            Ok(PricingModel::Progressive)
        );
        assert!("tiered".parse::<PricingModel>().is_err());
    }

    #[test]
    fn test_parse_storage_accepts_integers() {
        assert_eq!(parse_storage(&json!(5)).unwrap(), 5);
        assert_eq!(parse_storage(&json!("5")).unwrap(), 5);
        assert_eq!(parse_storage(&json!(" 42 ")).unwrap(), 42);
        assert_eq!(parse_storage(&json!(0)).unwrap(), 0);
    }

    #[test]
    fn test_parse_storage_rejects_negative() {
        assert!(matches!(
            parse_storage(&json!(-1)),
            Err(Error::InvalidStorage(_))
        ));
        assert!(matches!(
            parse_storage(&json!("-1")),
            Err(Error::InvalidStorage(_))
        ));
    }

    #[test]
    fn test_parse_storage_rejects_fractions() {
        assert!(parse_storage(&json!(1.5)).is_err());
        assert!(parse_storage(&json!("1.5")).is_err());
    }

    #[test]
    fn test_parse_storage_rejects_other_values() {
        assert!(parse_storage(&json!("abc")).is_err());
        assert!(parse_storage(&json!("")).is_err());
        assert!(parse_storage(&json!(null)).is_err());
        assert!(parse_storage(&json!(true)).is_err());
    }

    #[test]
    fn test_parse_storage_overflow() {
        assert!(parse_storage_str("18446744073709551616").is_err()); // u64::MAX + 1
    }

    #[test]
    fn test_to_major_units() {
        assert_eq!(to_major_units(4000), dec!(40.00));
        assert_eq!(to_major_units(20000), dec!(200.00));
        assert_eq!(to_major_units(0), dec!(0));
    }

    #[test]
    fn test_to_major_units_keeps_full_range() {
        let cost = calculate_cost(u64::MAX);
        assert_eq!(to_major_units(cost) * dec!(100), Decimal::from(cost));
        assert_eq!(
            to_major_units(u64::MAX).to_string(),
            "184467440737095516.15"
        );
    }
}
