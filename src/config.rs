use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::{cost::PricingModel, Error};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub charge_description: String,
    pub currency: String,
    pub pricing: PricingModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            charge_description: "Scratch charge".to_string(),
            currency: "usd".to_string(),
            pricing: PricingModel::Progressive,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to
    /// defaults for missing keys.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, Error>
    where
        L: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "NOTES_PORT", "3000")?,
            charge_description: try_load(&lookup, "NOTES_CHARGE_DESCRIPTION", "Scratch charge")?,
            currency: try_load(&lookup, "NOTES_CURRENCY", "usd")?,
            pricing: try_load(&lookup, "NOTES_PRICING", "progressive")?,
        })
    }
}

fn try_load<T, L>(lookup: &L, key: &'static str, default: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
    L: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            Error::Config {
                key,
                reason: e.to_string(),
            }
        })
}
