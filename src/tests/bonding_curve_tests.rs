//! Bonding curve trading and pricing tests

use super::*;
use crate::{CurveCalculator, CurveConfig, CurveError};
use proptest::prelude::*;

/// `a_eth / a_tok < b_eth / b_tok`, compared exactly
fn price_lt(a: &TokenReserveState, b: &TokenReserveState) -> bool {
    let a_eth = a.effective_eth_reserve().unwrap();
    let a_tok = a.effective_token_reserve().unwrap();
    let b_eth = b.effective_eth_reserve().unwrap();
    let b_tok = b.effective_token_reserve().unwrap();
    a_eth * b_tok < b_eth * a_tok
}

#[cfg(test)]
mod curve_pricing_tests {
    use super::*;

    #[test]
    fn test_buy_return_reference_scenario() {
        // 0.01 ETH in, 1% platform + 1% creator fee
        let eth_in = U256::from(10_000_000_000_000_000u128);
        let quote = CurveCalculator::quote_buy(&fresh_state(), eth_in, &CurveConfig::default()).unwrap();

        // 2% of 0.01 ETH divides exactly: 0.0098 ETH reaches the curve
        assert_eq!(quote.platform_fee, U256::from(100_000_000_000_000u128));
        assert_eq!(quote.creator_fee, U256::from(100_000_000_000_000u128));
        let eth_after_fees = U256::from(9_800_000_000_000_000u128);
        assert_eq!(quote.next_state.real_eth_reserve, eth_after_fees);

        // tokens_out = 1_000_000e18 - k / (1e18 + 0.0098e18), with the
        // remainder of k / new_eth kept by the curve
        let k = wad(1) * wad(1_000_000);
        let (floor_reserve, remainder) = k.div_mod(wad(1) + eth_after_fees);
        assert!(!remainder.is_zero());
        let truncated_out = wad(1_000_000) - floor_reserve;
        assert_eq!(quote.amount_out, truncated_out - U256::one());

        let direct = CurveCalculator::calculate_buy_return(&fresh_state(), eth_in, 100, 100).unwrap();
        assert_eq!(direct, quote.amount_out);
    }

    #[test]
    fn test_virtual_tokens_are_not_for_sale() {
        let result = CurveCalculator::calculate_buy_return(&virtual_only_state(), wad(1) / 100, 100, 100);
        assert_eq!(result, Err(CurveError::InsufficientLiquidity));
    }

    #[test]
    fn test_buy_rejects_zero_amount() {
        let result = CurveCalculator::calculate_buy_return(&fresh_state(), U256::zero(), 100, 100);
        assert_eq!(result, Err(CurveError::InvalidAmount));
    }

    #[test]
    fn test_buy_cannot_exceed_real_inventory() {
        // 10 ETH would pull ~909k tokens, more than the 800k the curve holds
        let result = CurveCalculator::calculate_buy_return(&fresh_state(), wad(10), 0, 0);
        assert_eq!(result, Err(CurveError::InsufficientLiquidity));

        // 3 ETH pulls 750k and fits
        let tokens = CurveCalculator::calculate_buy_return(&fresh_state(), wad(3), 0, 0).unwrap();
        assert_eq!(tokens, wad(750_000));
    }

    #[test]
    fn test_fee_rate_of_100_percent_is_rejected() {
        let result = CurveCalculator::calculate_buy_return(&fresh_state(), wad(1), 5_000, 5_000);
        assert_eq!(result, Err(CurveError::InvalidFee(10_000)));
    }

    #[test]
    fn test_sell_on_fresh_curve_has_no_real_eth() {
        let result = CurveCalculator::calculate_sell_return(&fresh_state(), wad(1_000), 100, 100);
        assert_eq!(result, Err(CurveError::InsufficientLiquidity));
    }

    #[test]
    fn test_sell_rejects_zero_amount() {
        let state = CurveCalculator::apply_buy(&fresh_state(), wad(1), &CurveConfig::default()).unwrap();
        let result = CurveCalculator::calculate_sell_return(&state, U256::zero(), 100, 100);
        assert_eq!(result, Err(CurveError::InvalidAmount));
    }

    #[test]
    fn test_sell_after_buy_returns_eth_and_updates_reserves() {
        let config = CurveConfig::default();
        let bought = CurveCalculator::quote_buy(&fresh_state(), wad(1), &config).unwrap();
        let after_buy = bought.next_state;

        let half = bought.amount_out / 2;
        let sold = CurveCalculator::quote_sell(&after_buy, half, &config).unwrap();
        let gross = sold.amount_out + sold.platform_fee + sold.creator_fee;

        assert!(sold.amount_out > U256::zero());
        assert!(sold.price_after < sold.price_before);
        assert_eq!(sold.next_state.real_eth_reserve, after_buy.real_eth_reserve - gross);
        assert_eq!(sold.next_state.real_token_reserve, after_buy.real_token_reserve + half);
        assert_eq!(sold.next_state.total_tokens_traded, after_buy.total_tokens_traded + half);
    }

    #[test]
    fn test_sell_of_everything_bought_is_within_real_eth() {
        let config = CurveConfig::dev();
        let bought = CurveCalculator::quote_buy(&fresh_state(), wad(2), &config).unwrap();
        let sold = CurveCalculator::quote_sell(&bought.next_state, bought.amount_out, &config).unwrap();
        assert!(sold.amount_out <= bought.next_state.real_eth_reserve);
        assert!(sold.amount_out <= wad(2));
    }

    #[test]
    fn test_market_cap() {
        // 1e12 wei per token * 1B tokens = 1000 ETH
        let cap = CurveCalculator::calculate_market_cap(&fresh_state(), wad(1_000_000_000)).unwrap();
        assert_eq!(cap, wad(1_000));
    }

    #[test]
    fn test_zero_token_reserve_is_division_by_zero() {
        let state = TokenReserveState::new(wad(1), U256::zero(), U256::zero());
        assert_eq!(CurveCalculator::get_price(&state), Err(CurveError::DivisionByZero));
        assert_eq!(
            CurveCalculator::calculate_market_cap(&state, wad(1)),
            Err(CurveError::DivisionByZero)
        );
    }

    #[test]
    fn test_slippage_protection() {
        let config = CurveConfig::default();
        let state = fresh_state();
        let expected = CurveCalculator::calculate_buy_return(&state, wad(1), 100, 100).unwrap();

        let min_out = CurveCalculator::min_out_with_slippage(expected, 100).unwrap();
        assert!(CurveCalculator::buy_with_min_out(&state, wad(1), &config, min_out).is_ok());

        // Someone else bought first: the same ETH now yields fewer tokens
        let front_run = CurveCalculator::apply_buy(&state, wad(1), &config).unwrap();
        let result = CurveCalculator::buy_with_min_out(&front_run, wad(1), &config, min_out);
        assert!(matches!(result, Err(CurveError::SlippageExceeded { .. })));
    }

    #[test]
    fn test_min_out_with_slippage() {
        assert_eq!(
            CurveCalculator::min_out_with_slippage(U256::from(1_000u64), 500).unwrap(),
            U256::from(950u64)
        );
        assert!(CurveCalculator::min_out_with_slippage(U256::from(1_000u64), 9_000).is_err());
    }

    #[test]
    fn test_sell_with_min_out() {
        let config = CurveConfig::default();
        let bought = CurveCalculator::quote_buy(&fresh_state(), wad(1), &config).unwrap();
        let result = CurveCalculator::sell_with_min_out(&bought.next_state, bought.amount_out, &config, wad(1));
        assert!(matches!(result, Err(CurveError::SlippageExceeded { .. })));
    }

    #[test]
    fn test_reserve_state_json_round_trip_keeps_precision() {
        let state = CurveCalculator::apply_buy(&fresh_state(), wad(1) / 3, &CurveConfig::default()).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"virtual_token_reserve\":\"200000000000000000000000\""));
        let back: TokenReserveState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}

#[cfg(test)]
mod curve_property_tests {
    use super::*;

    proptest! {
        #[test]
        fn price_rises_after_buy(eth_in in 1_000_000_000_000u128..3_000_000_000_000_000_000u128,
                                 platform in 0u16..500, creator in 0u16..500) {
            let config = CurveConfig { platform_fee_bps: platform, creator_fee_bps: creator, ..CurveConfig::dev() };
            let state = fresh_state();
            let next = CurveCalculator::apply_buy(&state, U256::from(eth_in), &config).unwrap();
            prop_assert!(price_lt(&state, &next));
            prop_assert!(CurveCalculator::get_price(&next).unwrap() >= CurveCalculator::get_price(&state).unwrap());
        }

        #[test]
        fn price_falls_after_sell(eth_in in 100_000_000_000_000_000u128..2_000_000_000_000_000_000u128,
                                  sell_pct in 1u64..=100) {
            let config = CurveConfig::default();
            let bought = CurveCalculator::quote_buy(&fresh_state(), U256::from(eth_in), &config).unwrap();
            let tokens_in = bought.amount_out * U256::from(sell_pct) / U256::from(100u64);
            let next = CurveCalculator::apply_sell(&bought.next_state, tokens_in, &config).unwrap();
            prop_assert!(price_lt(&next, &bought.next_state));
        }

        #[test]
        fn round_trip_never_profits(eth_in in 1_000_000_000_000u128..3_000_000_000_000_000_000u128,
                                    platform in 0u16..300, creator in 0u16..300) {
            let state = fresh_state();
            let tokens_out = CurveCalculator::calculate_buy_return(&state, U256::from(eth_in), platform, creator).unwrap();
            let config = CurveConfig { platform_fee_bps: platform, creator_fee_bps: creator, ..CurveConfig::dev() };
            let after_buy = CurveCalculator::apply_buy(&state, U256::from(eth_in), &config).unwrap();
            match CurveCalculator::calculate_sell_return(&after_buy, tokens_out, platform, creator) {
                Ok(eth_out) => prop_assert!(eth_out <= U256::from(eth_in)),
                // Dust trades may round to nothing on the way back
                Err(e) => prop_assert_eq!(e, CurveError::InsufficientLiquidity),
            }
        }

        #[test]
        fn invariant_never_shrinks(eth_in in 1_000_000_000_000u128..3_000_000_000_000_000_000u128,
                                   sell_pct in 1u64..=100) {
            let config = CurveConfig::default();
            let state = fresh_state();
            let k0 = state.invariant().unwrap();
            let bought = CurveCalculator::quote_buy(&state, U256::from(eth_in), &config).unwrap();
            let k1 = bought.next_state.invariant().unwrap();
            prop_assert!(k1 >= k0);

            let tokens_in = bought.amount_out * U256::from(sell_pct) / U256::from(100u64);
            if let Ok(next) = CurveCalculator::apply_sell(&bought.next_state, tokens_in, &config) {
                prop_assert!(next.invariant().unwrap() >= k1);
            }
        }
    }
}
