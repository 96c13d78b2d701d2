//! Graduation preview
//!
//! A curve graduates once its market cap reaches the USD threshold, after
//! which trading moves to an external AMM pool. The flip of `graduated` happens
//! on-chain; this module only previews it:
//! - Bonding progress toward the threshold
//! - The graduation predicate itself
//! - The liquidity that would seed the AMM pool at the current curve price

use crate::bonding_curve::{CurveCalculator, TokenReserveState};
use crate::constants::{BPS_SCALE, MIGRATION_ETH_RATIO_BPS, WAD};
use crate::error::CurveError;
use crate::math::{self, Rounding, U256};
use serde::{Deserialize, Serialize};

/// Progress toward graduation in basis points, capped at 10,000 (100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BondingProgress {
    pub bps: u32,
}

impl BondingProgress {
    pub const COMPLETE: BondingProgress = BondingProgress { bps: BPS_SCALE as u32 };

    /// Percentage for display only
    pub fn percent(&self) -> f64 {
        f64::from(self.bps) / 100.0
    }

    pub fn is_complete(&self) -> bool {
        *self >= Self::COMPLETE
    }
}

/// Reserves that would seed the AMM pool on graduation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationLiquidity {
    #[serde(with = "math::serde_u256")]
    pub eth_amount: U256,
    #[serde(with = "math::serde_u256")]
    pub token_amount: U256,
}

pub struct GraduationCalculator;

impl GraduationCalculator {
    /// `min(100%, market_cap_eth * eth_usd_price / graduation_threshold_usd)`.
    ///
    /// `graduation_threshold_usd` and `eth_usd_price` must share one USD unit
    /// (whole dollars, cents, 8-decimal feed answers...). Rounded down, so a
    /// curve short of the threshold never reports 100%.
    pub fn bonding_progress(
        state: &TokenReserveState,
        total_supply: U256,
        graduation_threshold_usd: U256,
        eth_usd_price: U256,
    ) -> Result<BondingProgress, CurveError> {
        let (market_cap_usd, threshold) =
            Self::usd_terms(state, total_supply, graduation_threshold_usd, eth_usd_price)?;
        let progress = math::mul_div(market_cap_usd, U256::from(BPS_SCALE), threshold, Rounding::Down)?;
        let bps = progress.min(U256::from(BPS_SCALE)).low_u32();
        Ok(BondingProgress { bps })
    }

    /// True once bonding progress reaches 100%
    pub fn check_graduation(
        state: &TokenReserveState,
        total_supply: U256,
        graduation_threshold_usd: U256,
        eth_usd_price: U256,
    ) -> Result<bool, CurveError> {
        let (market_cap_usd, threshold) =
            Self::usd_terms(state, total_supply, graduation_threshold_usd, eth_usd_price)?;
        Ok(market_cap_usd >= threshold)
    }

    /// Liquidity for the AMM pool at the current curve price.
    ///
    /// All real ETH moves to the pool, matched by tokens at spot price. Tokens
    /// are capped by what the curve still holds.
    pub fn migration_liquidity(state: &TokenReserveState) -> Result<MigrationLiquidity, CurveError> {
        let eth_amount = math::mul_div(
            state.real_eth_reserve,
            U256::from(MIGRATION_ETH_RATIO_BPS),
            U256::from(BPS_SCALE),
            Rounding::Down,
        )?;
        let price = CurveCalculator::get_price(state)?;
        let token_amount = math::mul_div(eth_amount, U256::from(WAD), price, Rounding::Down)?
            .min(state.real_token_reserve);

        Ok(MigrationLiquidity {
            eth_amount,
            token_amount,
        })
    }

    /// Market cap and threshold expressed in the same scale: `wei * usd` on
    /// both sides, so no precision is lost to an intermediate division.
    fn usd_terms(
        state: &TokenReserveState,
        total_supply: U256,
        graduation_threshold_usd: U256,
        eth_usd_price: U256,
    ) -> Result<(U256, U256), CurveError> {
        if graduation_threshold_usd.is_zero() {
            return Err(CurveError::InvalidConfig(
                "graduation threshold must be positive".to_string(),
            ));
        }
        let market_cap = CurveCalculator::calculate_market_cap(state, total_supply)?;
        let market_cap_usd = math::checked_mul(market_cap, eth_usd_price)?;
        let threshold = math::checked_mul(graduation_threshold_usd, U256::from(WAD))?;
        Ok((market_cap_usd, threshold))
    }
}
