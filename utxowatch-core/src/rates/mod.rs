//! Simulated exchange rates.
//!
//! A fixed eight-currency table seeded with the reference values and
//! perturbed in place on its own cadence. The key set never changes.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod convert;

pub use convert::{
    ConversionMode, Converter, SATS_PER_BTC, fiat_to_sats, sats_to_fiat,
};

/// Errors from the exchange-rate subsystem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatesError {
    /// The drifting table pushed a rate to zero or below; converting
    /// against it would divide by a non-positive number.
    #[error("exchange rate for {currency} is not positive: {rate}")]
    NonPositiveRate { currency: Currency, rate: f64 },

    #[error("amount must not be negative: {amount}")]
    NegativeAmount { amount: f64 },

    #[error("unknown currency code: {code}")]
    UnknownCurrency { code: String },
}

/// Supported fiat currencies. The set is fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cad,
    Aud,
    Chf,
    Cny,
}

impl Currency {
    /// All supported currencies, in display order.
    pub const ALL: [Currency; 8] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cad,
        Currency::Aud,
        Currency::Chf,
        Currency::Cny,
    ];

    /// Currency symbol for display.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
            Currency::Chf => "CHF",
            Currency::Cny => "¥",
        }
    }

    /// Full display name.
    pub fn name(self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "British Pound",
            Currency::Jpy => "Japanese Yen",
            Currency::Cad => "Canadian Dollar",
            Currency::Aud => "Australian Dollar",
            Currency::Chf => "Swiss Franc",
            Currency::Cny => "Chinese Yuan",
        }
    }

    /// Full span of the per-tick additive jitter for this currency.
    ///
    /// A tick adds `(r - 0.5) * span`, so the step magnitude is at most
    /// half the span. Spans mirror the reference table.
    fn jitter_span(self) -> f64 {
        match self {
            Currency::Usd => 100.0,
            Currency::Eur => 90.0,
            Currency::Gbp => 80.0,
            Currency::Jpy => 10_000.0,
            Currency::Cad => 120.0,
            Currency::Aud => 130.0,
            Currency::Chf => 85.0,
            Currency::Cny => 600.0,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
            Currency::Cny => "CNY",
        };
        write!(f, "{code}")
    }
}

impl std::str::FromStr for Currency {
    type Err = RatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "JPY" => Ok(Currency::Jpy),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            "CHF" => Ok(Currency::Chf),
            "CNY" => Ok(Currency::Cny),
            _ => Err(RatesError::UnknownCurrency {
                code: s.to_string(),
            }),
        }
    }
}

/// One BTC priced in each supported fiat currency.
///
/// Mutated in place by [`RateTable::perturb`]; rates are assumed
/// positive in practice but not floored, matching the reference. The
/// conversion functions reject non-positive rates explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct RateTable {
    pub usd: f64,
    pub eur: f64,
    pub gbp: f64,
    pub jpy: f64,
    pub cad: f64,
    pub aud: f64,
    pub chf: f64,
    pub cny: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            usd: 45_234.67,
            eur: 41_250.32,
            gbp: 35_678.90,
            jpy: 6_789_012.45,
            cad: 61_234.56,
            aud: 67_890.12,
            chf: 40_123.45,
            cny: 325_678.90,
        }
    }
}

impl RateTable {
    /// Current rate for a currency.
    pub fn rate(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd,
            Currency::Eur => self.eur,
            Currency::Gbp => self.gbp,
            Currency::Jpy => self.jpy,
            Currency::Cad => self.cad,
            Currency::Aud => self.aud,
            Currency::Chf => self.chf,
            Currency::Cny => self.cny,
        }
    }

    fn rate_mut(&mut self, currency: Currency) -> &mut f64 {
        match currency {
            Currency::Usd => &mut self.usd,
            Currency::Eur => &mut self.eur,
            Currency::Gbp => &mut self.gbp,
            Currency::Jpy => &mut self.jpy,
            Currency::Cad => &mut self.cad,
            Currency::Aud => &mut self.aud,
            Currency::Chf => &mut self.chf,
            Currency::Cny => &mut self.cny,
        }
    }

    /// Applies one independent additive jitter step per currency.
    pub fn perturb<R: Rng>(&mut self, rng: &mut R) {
        for currency in Currency::ALL {
            let step = (rng.random::<f64>() - 0.5) * currency.jitter_span();
            *self.rate_mut(currency) += step;
        }
    }

    /// Verifies the rate is usable for conversion.
    ///
    /// # Errors
    /// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
    pub fn checked_rate(&self, currency: Currency) -> Result<f64, RatesError> {
        let rate = self.rate(currency);
        if rate > 0.0 {
            Ok(rate)
        } else {
            Err(RatesError::NonPositiveRate { currency, rate })
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_currency_round_trips_through_str() {
        for currency in Currency::ALL {
            let code = currency.to_string();
            assert_eq!(code.parse::<Currency>().unwrap(), currency);
        }
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!(matches!(
            "XXX".parse::<Currency>(),
            Err(RatesError::UnknownCurrency { .. })
        ));
    }

    #[test]
    fn test_default_table_matches_reference() {
        let table = RateTable::default();
        assert_eq!(table.rate(Currency::Usd), 45_234.67);
        assert_eq!(table.rate(Currency::Jpy), 6_789_012.45);
        assert_eq!(table.rate(Currency::Cny), 325_678.90);
    }

    #[test]
    fn test_perturb_steps_are_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut table = RateTable::default();

        for _ in 0..100 {
            let before = table.clone();
            table.perturb(&mut rng);

            for currency in Currency::ALL {
                let step = (table.rate(currency) - before.rate(currency)).abs();
                assert!(
                    step <= currency.jitter_span() / 2.0 + 1e-9,
                    "{currency} stepped {step}"
                );
            }
        }
    }

    #[test]
    fn test_perturb_deterministic_per_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        let mut table_a = RateTable::default();
        let mut table_b = RateTable::default();

        table_a.perturb(&mut a);
        table_b.perturb(&mut b);
        assert_eq!(table_a, table_b);
    }

    #[test]
    fn test_checked_rate_rejects_non_positive() {
        let mut table = RateTable::default();
        table.usd = 0.0;

        assert!(matches!(
            table.checked_rate(Currency::Usd),
            Err(RatesError::NonPositiveRate { .. })
        ));
        assert!(table.checked_rate(Currency::Eur).is_ok());
    }
}
