//! Currency conversion engine.
//!
//! Pure bidirectional conversion between satoshis and fiat, plus the
//! stateful [`Converter`] that models the dashboard widget: one field is
//! authoritative depending on the mode, the other is recomputed from it.

use serde::{Deserialize, Serialize};

use super::{Currency, RateTable, RatesError};

/// Base units per display unit (satoshis per BTC).
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Converts satoshis to a fiat amount: `(sats / 1e8) * rate`.
///
/// # Errors
/// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
pub fn sats_to_fiat(sats: u64, currency: Currency, rates: &RateTable) -> Result<f64, RatesError> {
    let rate = rates.checked_rate(currency)?;
    let btc = sats as f64 / SATS_PER_BTC as f64;
    Ok(btc * rate)
}

/// Converts a fiat amount to satoshis: `round((amount / rate) * 1e8)`.
///
/// # Errors
/// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
/// - `RatesError::NegativeAmount` - Fiat amount is negative
pub fn fiat_to_sats(amount: f64, currency: Currency, rates: &RateTable) -> Result<u64, RatesError> {
    if amount < 0.0 {
        return Err(RatesError::NegativeAmount { amount });
    }
    let rate = rates.checked_rate(currency)?;
    let btc = amount / rate;
    Ok((btc * SATS_PER_BTC as f64).round() as u64)
}

/// Which input field is authoritative for recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionMode {
    SatsToFiat,
    FiatToSats,
}

impl ConversionMode {
    pub fn toggled(self) -> Self {
        match self {
            ConversionMode::SatsToFiat => ConversionMode::FiatToSats,
            ConversionMode::FiatToSats => ConversionMode::SatsToFiat,
        }
    }
}

/// Stateful converter widget model.
///
/// Holds both field values and the selected currency. Setting the
/// authoritative field recomputes the dependent one; setting the
/// dependent field only stores it. Switching mode or currency triggers
/// one recomputation of the dependent field from the authoritative one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Converter {
    mode: ConversionMode,
    currency: Currency,
    sats: u64,
    fiat: f64,
}

impl Converter {
    /// Creates a converter holding 1 BTC, in sats-to-fiat mode, with the
    /// dependent field computed from the given table.
    ///
    /// # Errors
    /// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
    pub fn new(currency: Currency, rates: &RateTable) -> Result<Self, RatesError> {
        let mut converter = Self {
            mode: ConversionMode::SatsToFiat,
            currency,
            sats: SATS_PER_BTC,
            fiat: 0.0,
        };
        converter.recompute(rates)?;
        Ok(converter)
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn sats(&self) -> u64 {
        self.sats
    }

    pub fn fiat(&self) -> f64 {
        self.fiat
    }

    /// Sets the satoshi field. Recomputes fiat when sats are authoritative.
    ///
    /// # Errors
    /// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
    pub fn set_sats(&mut self, sats: u64, rates: &RateTable) -> Result<(), RatesError> {
        self.sats = sats;
        if self.mode == ConversionMode::SatsToFiat {
            self.fiat = sats_to_fiat(self.sats, self.currency, rates)?;
        }
        Ok(())
    }

    /// Sets the fiat field. Recomputes sats when fiat is authoritative.
    ///
    /// # Errors
    /// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
    /// - `RatesError::NegativeAmount` - Fiat amount is negative
    pub fn set_fiat(&mut self, fiat: f64, rates: &RateTable) -> Result<(), RatesError> {
        self.fiat = fiat;
        if self.mode == ConversionMode::FiatToSats {
            self.sats = fiat_to_sats(self.fiat, self.currency, rates)?;
        }
        Ok(())
    }

    /// Switches currency and recomputes the dependent field.
    ///
    /// # Errors
    /// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
    /// - `RatesError::NegativeAmount` - Stored fiat amount is negative
    pub fn set_currency(
        &mut self,
        currency: Currency,
        rates: &RateTable,
    ) -> Result<(), RatesError> {
        self.currency = currency;
        self.recompute(rates)
    }

    /// Flips the conversion direction and recomputes the dependent field
    /// from the new authoritative one.
    ///
    /// # Errors
    /// - `RatesError::NonPositiveRate` - Rate has drifted to zero or below
    /// - `RatesError::NegativeAmount` - Stored fiat amount is negative
    pub fn toggle_mode(&mut self, rates: &RateTable) -> Result<ConversionMode, RatesError> {
        self.mode = self.mode.toggled();
        self.recompute(rates)?;
        Ok(self.mode)
    }

    /// Recomputes the dependent field from the authoritative one.
    fn recompute(&mut self, rates: &RateTable) -> Result<(), RatesError> {
        match self.mode {
            ConversionMode::SatsToFiat => {
                self.fiat = sats_to_fiat(self.sats, self.currency, rates)?;
            }
            ConversionMode::FiatToSats => {
                self.sats = fiat_to_sats(self.fiat, self.currency, rates)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_btc_at_reference_rate() {
        let rates = RateTable::default();
        let fiat = sats_to_fiat(100_000_000, Currency::Usd, &rates).unwrap();
        assert_eq!(fiat, 45_234.67);
    }

    #[test]
    fn test_zero_sats_is_zero_fiat() {
        let rates = RateTable::default();
        for currency in Currency::ALL {
            assert_eq!(sats_to_fiat(0, currency, &rates).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_round_trip_within_one_sat() {
        let rates = RateTable::default();
        for currency in Currency::ALL {
            for sats in [1u64, 1_000, 54_321, 100_000_000, 2_100_000_000_000_000] {
                let fiat = sats_to_fiat(sats, currency, &rates).unwrap();
                let back = fiat_to_sats(fiat, currency, &rates).unwrap();
                assert!(
                    back.abs_diff(sats) <= 1,
                    "{sats} sats -> {fiat} {currency} -> {back} sats"
                );
            }
        }
    }

    #[test]
    fn test_exact_round_trip_of_one_btc() {
        let rates = RateTable::default();
        let fiat = sats_to_fiat(100_000_000, Currency::Usd, &rates).unwrap();
        assert_eq!(fiat_to_sats(fiat, Currency::Usd, &rates).unwrap(), 100_000_000);
    }

    #[test]
    fn test_non_positive_rate_is_rejected() {
        let mut rates = RateTable::default();
        rates.usd = -12.5;

        assert!(sats_to_fiat(1, Currency::Usd, &rates).is_err());
        assert!(fiat_to_sats(1.0, Currency::Usd, &rates).is_err());
    }

    #[test]
    fn test_negative_fiat_is_rejected() {
        let rates = RateTable::default();
        assert!(matches!(
            fiat_to_sats(-1.0, Currency::Usd, &rates),
            Err(RatesError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_converter_starts_at_one_btc() {
        let rates = RateTable::default();
        let converter = Converter::new(Currency::Usd, &rates).unwrap();

        assert_eq!(converter.mode(), ConversionMode::SatsToFiat);
        assert_eq!(converter.sats(), 100_000_000);
        assert_eq!(converter.fiat(), 45_234.67);
    }

    #[test]
    fn test_authoritative_field_drives_dependent() {
        let rates = RateTable::default();
        let mut converter = Converter::new(Currency::Usd, &rates).unwrap();

        // Sats are authoritative: setting them recomputes fiat
        converter.set_sats(50_000_000, &rates).unwrap();
        assert!((converter.fiat() - 22_617.335).abs() < 1e-9);

        // Fiat is dependent: setting it only stores the value
        converter.set_fiat(999.0, &rates).unwrap();
        assert_eq!(converter.sats(), 50_000_000);
    }

    #[test]
    fn test_toggle_recomputes_from_new_authority() {
        let rates = RateTable::default();
        let mut converter = Converter::new(Currency::Usd, &rates).unwrap();

        converter.set_fiat(45_234.67, &rates).unwrap();
        let mode = converter.toggle_mode(&rates).unwrap();

        assert_eq!(mode, ConversionMode::FiatToSats);
        assert_eq!(converter.sats(), 100_000_000);
    }

    #[test]
    fn test_currency_switch_recomputes() {
        let rates = RateTable::default();
        let mut converter = Converter::new(Currency::Usd, &rates).unwrap();

        converter.set_currency(Currency::Eur, &rates).unwrap();
        assert_eq!(converter.fiat(), 41_250.32);
    }
}
