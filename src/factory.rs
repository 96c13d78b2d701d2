//! Bonding Curve Factory
//!
//! Turns user-supplied launch parameters into the initial reserve snapshot and
//! curve configuration of a new token. Anything left unset falls back to the
//! platform defaults in `constants.rs`.

use crate::bonding_curve::TokenReserveState;
use crate::constants::*;
use crate::error::CurveError;
use crate::math::{self, U256};
use crate::CurveConfig;
use log::info;
use serde::{Deserialize, Serialize};

/// Token launch parameters provided by users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLaunchParams {
    // Token identity
    pub name: String,
    pub symbol: String,

    // Economics (with defaults)
    #[serde(default)]
    pub virtual_eth_reserve: Option<u128>,
    #[serde(default)]
    pub virtual_token_reserve: Option<u128>,
    #[serde(default)]
    pub total_supply: Option<u128>,
    #[serde(default)]
    pub curve_allocation: Option<u128>,     // tokens sold through the curve
    #[serde(default)]
    pub graduation_threshold_usd: Option<u128>,

    // Platform settings
    #[serde(default)]
    pub config: CurveConfig,
}

impl Default for TokenLaunchParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            virtual_eth_reserve: Some(DEFAULT_VIRTUAL_ETH_RESERVE),
            virtual_token_reserve: Some(DEFAULT_VIRTUAL_TOKEN_RESERVE),
            total_supply: Some(DEFAULT_TOTAL_SUPPLY),
            curve_allocation: Some(DEFAULT_CURVE_ALLOCATION),
            graduation_threshold_usd: Some(DEFAULT_GRADUATION_THRESHOLD_USD),
            config: CurveConfig::default(),
        }
    }
}

/// A validated launch: initial reserves plus the parameters trading runs with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchedCurve {
    pub name: String,
    pub symbol: String,
    #[serde(with = "math::serde_u256")]
    pub total_supply: U256,
    #[serde(with = "math::serde_u256")]
    pub graduation_threshold_usd: U256,
    pub state: TokenReserveState,
    pub config: CurveConfig,
}

pub struct CurveFactory;

impl CurveFactory {
    pub fn launch(params: TokenLaunchParams) -> Result<LaunchedCurve, CurveError> {
        let name = params.name.trim().to_string();
        let symbol = params.symbol.trim().to_uppercase();
        if name.is_empty() || symbol.is_empty() {
            return Err(CurveError::InvalidLaunchParams(
                "name and symbol are required".to_string(),
            ));
        }

        let virtual_eth = params.virtual_eth_reserve.unwrap_or(DEFAULT_VIRTUAL_ETH_RESERVE);
        let virtual_token = params.virtual_token_reserve.unwrap_or(DEFAULT_VIRTUAL_TOKEN_RESERVE);
        let total_supply = params.total_supply.unwrap_or(DEFAULT_TOTAL_SUPPLY);
        let curve_allocation = params.curve_allocation.unwrap_or(DEFAULT_CURVE_ALLOCATION);
        let threshold = params
            .graduation_threshold_usd
            .unwrap_or(DEFAULT_GRADUATION_THRESHOLD_USD);

        // Virtual reserves keep the effective reserves non-zero for the curve's lifetime
        if virtual_eth == 0 || virtual_token == 0 {
            return Err(CurveError::InvalidLaunchParams(
                "virtual reserves must be non-zero".to_string(),
            ));
        }
        if curve_allocation == 0 {
            return Err(CurveError::InvalidLaunchParams(
                "curve allocation must be non-zero".to_string(),
            ));
        }
        if curve_allocation > total_supply {
            return Err(CurveError::InvalidLaunchParams(format!(
                "curve allocation {} exceeds total supply {}",
                curve_allocation, total_supply
            )));
        }
        if threshold == 0 {
            return Err(CurveError::InvalidLaunchParams(
                "graduation threshold must be non-zero".to_string(),
            ));
        }
        params.config.validate()?;

        let state = TokenReserveState::new(
            U256::from(virtual_eth),
            U256::from(virtual_token),
            U256::from(curve_allocation),
        );

        info!(
            "launching {} ({}): supply={} curve_allocation={} fees={}bps",
            name,
            symbol,
            math::format_units(U256::from(total_supply), WAD_DECIMALS),
            math::format_units(U256::from(curve_allocation), WAD_DECIMALS),
            params.config.total_fee_bps()
        );

        Ok(LaunchedCurve {
            name,
            symbol,
            total_supply: U256::from(total_supply),
            graduation_threshold_usd: U256::from(threshold),
            state,
            config: params.config,
        })
    }
}
