//! Property tests for the currency conversion engine.

use proptest::prelude::*;
use utxowatch_core::rates::{
    Currency, RateTable, RatesError, SATS_PER_BTC, fiat_to_sats, sats_to_fiat,
};

/// Largest satoshi amount ever in circulation (21M BTC).
const MAX_SATS: u64 = 21_000_000 * SATS_PER_BTC;

fn any_currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

/// Rate tables whose entries stay positive, like a real drifted table.
fn positive_rate_table() -> impl Strategy<Value = RateTable> {
    let rate = 0.01f64..10_000_000.0;
    (
        rate.clone(),
        rate.clone(),
        rate.clone(),
        rate.clone(),
        rate.clone(),
        rate.clone(),
        rate.clone(),
        rate,
    )
        .prop_map(|(usd, eur, gbp, jpy, cad, aud, chf, cny)| RateTable {
            usd,
            eur,
            gbp,
            jpy,
            cad,
            aud,
            chf,
            cny,
        })
}

proptest! {
    #[test]
    fn round_trip_is_lossless_within_one_sat(
        sats in 0..=MAX_SATS,
        currency in any_currency(),
    ) {
        let rates = RateTable::default();
        let fiat = sats_to_fiat(sats, currency, &rates).unwrap();
        let back = fiat_to_sats(fiat, currency, &rates).unwrap();

        prop_assert!(back.abs_diff(sats) <= 1, "{sats} -> {fiat} -> {back}");
    }

    #[test]
    fn round_trip_holds_for_any_positive_table(
        sats in 0..=MAX_SATS,
        currency in any_currency(),
        rates in positive_rate_table(),
    ) {
        let fiat = sats_to_fiat(sats, currency, &rates).unwrap();
        let back = fiat_to_sats(fiat, currency, &rates).unwrap();

        // Extreme rates widen the representable gap between adjacent
        // satoshi values; allow proportional slack.
        let rate = match currency {
            Currency::Usd => rates.usd,
            Currency::Eur => rates.eur,
            Currency::Gbp => rates.gbp,
            Currency::Jpy => rates.jpy,
            Currency::Cad => rates.cad,
            Currency::Aud => rates.aud,
            Currency::Chf => rates.chf,
            Currency::Cny => rates.cny,
        };
        let ulp_slack = (fiat / rate * SATS_PER_BTC as f64).abs() * f64::EPSILON * 4.0;
        let tolerance = 1 + ulp_slack.ceil() as u64;
        prop_assert!(
            back.abs_diff(sats) <= tolerance,
            "{sats} -> {fiat} -> {back} (tolerance {tolerance})"
        );
    }

    #[test]
    fn fiat_conversion_scales_linearly(
        sats in 1..=MAX_SATS,
        currency in any_currency(),
    ) {
        let rates = RateTable::default();
        let one = sats_to_fiat(sats, currency, &rates).unwrap();
        let double = sats_to_fiat(sats.saturating_mul(2).min(MAX_SATS * 2), currency, &rates).unwrap();

        prop_assert!(one > 0.0);
        prop_assert!(double >= one);
    }

    #[test]
    fn negative_fiat_is_always_rejected(
        amount in -1_000_000.0f64..-f64::MIN_POSITIVE,
        currency in any_currency(),
    ) {
        let rates = RateTable::default();
        prop_assert!(matches!(
            fiat_to_sats(amount, currency, &rates),
            Err(RatesError::NegativeAmount { .. })
        ), "expected NegativeAmount error");
    }

    #[test]
    fn non_positive_rates_are_always_rejected(
        sats in 0..=MAX_SATS,
        bad_rate in -10_000.0f64..=0.0,
    ) {
        let mut rates = RateTable::default();
        rates.usd = bad_rate;

        prop_assert!(matches!(
            sats_to_fiat(sats, Currency::Usd, &rates),
            Err(RatesError::NonPositiveRate { .. })
        ), "expected NonPositiveRate error");
        prop_assert!(matches!(
            fiat_to_sats(1.0, Currency::Usd, &rates),
            Err(RatesError::NonPositiveRate { .. })
        ), "expected NonPositiveRate error");
    }
}
