//! Test suite for the launchpad core
//!
//! Tests cover:
//! - Constant-product pricing, fees and rounding direction
//! - Graduation progress and migration liquidity
//! - Curve launch parameters and configuration presets
//! - Trade limits and rounding-exploit edge cases
//! - Escrow milestone release and reconciliation

pub mod bonding_curve_tests;

use crate::constants::WAD;
use crate::{Escrow, TokenReserveState, U256};
use chrono::{DateTime, TimeZone, Utc};

/// `n` whole units in 18-decimal base units
pub fn wad(n: u128) -> U256 {
    U256::from(n) * U256::from(WAD)
}

/// Effective reserves of 1 ETH / 1M tokens, 800k of them real inventory
pub fn fresh_state() -> TokenReserveState {
    TokenReserveState::new(wad(1), wad(200_000), wad(800_000))
}

/// Curve seeded only with virtual reserves: nothing can actually be bought
pub fn virtual_only_state() -> TokenReserveState {
    TokenReserveState::new(wad(1), wad(1_000_000), U256::zero())
}

/// Escrow with milestones [100, 200, 300]
pub fn sample_escrow() -> Escrow {
    Escrow::new("kol-deal-1", 600, &[100, 200, 300]).unwrap()
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}
