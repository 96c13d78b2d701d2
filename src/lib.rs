//! Launchpad Core
//!
//! Pricing and settlement logic for a token launchpad, kept free of any chain,
//! database or HTTP concerns so the API and indexing layers can share it.
//!
//! This crate provides:
//! - Constant-product (x*y=k) bonding curve pricing over virtual + real reserves
//! - Buy/sell previews with platform and creator fees and slippage protection
//! - Market cap, bonding progress and graduation checks
//! - Configurable trade limits replacing per-variant curve contracts
//! - Escrow milestone validation, release and reconciliation
//!
//! Every operation takes an explicit snapshot and returns a new value.
//! Persistence, locking and chain writes belong to the caller.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod bonding_curve;
pub mod constants;
pub mod error;
pub mod escrow;
pub mod factory;
pub mod graduation;
pub mod math;
pub mod trade_limits;
#[cfg(test)]
pub mod tests;

pub use bonding_curve::{CurveCalculator, TokenReserveState, TradeQuote};
pub use error::{CurveError, EscrowError, TradeLimitError};
pub use escrow::{Escrow, EscrowDrift, EscrowReconciler, EscrowStatus, Milestone};
pub use factory::{CurveFactory, LaunchedCurve, TokenLaunchParams};
pub use graduation::{BondingProgress, GraduationCalculator, MigrationLiquidity};
pub use math::U256;
pub use trade_limits::{TradeContext, TradeLimits};

use constants::*;

/// Fee and trade-limit configuration for a bonding curve.
///
/// One record covers every curve variant the launchpad deploys (dev, low fee,
/// secure, ultra secure). Zero for `max_trade_wei` or `max_tokens_per_user`
/// means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub platform_fee_bps: u16,
    pub creator_fee_bps: u16,
    #[serde(with = "math::serde_u256")]
    pub min_trade_wei: U256,
    #[serde(with = "math::serde_u256")]
    pub max_trade_wei: U256,
    pub cooldown_seconds: u64,
    #[serde(with = "math::serde_u256")]
    pub max_tokens_per_user: U256,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            platform_fee_bps: STANDARD_PLATFORM_FEE_BPS,
            creator_fee_bps: STANDARD_CREATOR_FEE_BPS,
            min_trade_wei: U256::from(MIN_TRADE_WEI),
            max_trade_wei: U256::zero(),
            cooldown_seconds: 0,
            max_tokens_per_user: U256::zero(),
        }
    }
}

impl CurveConfig {
    /// Fee-free, unlimited curve for local testing
    pub fn dev() -> Self {
        Self {
            platform_fee_bps: 0,
            creator_fee_bps: 0,
            min_trade_wei: U256::zero(),
            max_trade_wei: U256::zero(),
            cooldown_seconds: 0,
            max_tokens_per_user: U256::zero(),
        }
    }

    pub fn low_fee() -> Self {
        Self {
            platform_fee_bps: LOW_PLATFORM_FEE_BPS,
            creator_fee_bps: LOW_CREATOR_FEE_BPS,
            ..Self::default()
        }
    }

    pub fn secure_low_fee() -> Self {
        Self {
            max_trade_wei: U256::from(SECURE_MAX_TRADE_WEI),
            cooldown_seconds: SECURE_COOLDOWN_SECONDS,
            max_tokens_per_user: U256::from(SECURE_MAX_TOKENS_PER_USER),
            ..Self::low_fee()
        }
    }

    pub fn ultra_secure() -> Self {
        Self {
            max_trade_wei: U256::from(ULTRA_SECURE_MAX_TRADE_WEI),
            cooldown_seconds: ULTRA_SECURE_COOLDOWN_SECONDS,
            max_tokens_per_user: U256::from(ULTRA_SECURE_MAX_TOKENS_PER_USER),
            ..Self::default()
        }
    }

    /// Combined fee rate in basis points
    pub fn total_fee_bps(&self) -> u32 {
        u32::from(self.platform_fee_bps) + u32::from(self.creator_fee_bps)
    }

    pub fn validate(&self) -> std::result::Result<(), error::CurveError> {
        if self.total_fee_bps() >= BPS_SCALE as u32 {
            return Err(error::CurveError::InvalidFee(self.total_fee_bps()));
        }
        if !self.max_trade_wei.is_zero() && self.min_trade_wei > self.max_trade_wei {
            return Err(error::CurveError::InvalidConfig(format!(
                "min_trade_wei {} exceeds max_trade_wei {}",
                self.min_trade_wei, self.max_trade_wei
            )));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CurveConfig = serde_json::from_str(json)
            .map_err(|e| anyhow!("Failed to deserialize curve config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read curve config: {}", path.display()))?;
        Self::from_json_str(&data)
            .with_context(|| format!("Invalid curve config in: {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize curve config: {}", e))
    }
}
