//! Bonding Curve Implementation
//!
//! Constant-product pricing over virtual + real reserves:
//! - Spot price and market cap in 18-decimal fixed point
//! - Buy/sell previews with platform and creator fees
//! - Slippage-checked trades and next-state snapshots
//!
//! Rounding always favours the curve. Fees round up, and the reserve the curve
//! keeps after a trade (`k / new_reserve`) rounds up, so `tokens_out` and
//! `eth_out` round down and `k` never shrinks.

use crate::constants::{BPS_SCALE, MAX_SLIPPAGE_BPS, WAD};
use crate::error::CurveError;
use crate::math::{self, Rounding, U256};
use crate::CurveConfig;
use log::{debug, error};
use serde::{Deserialize, Serialize};

/// Reserve snapshot of one token's bonding curve, as read from chain.
///
/// `real_token_reserve` is the token inventory the curve actually holds for
/// sale; `virtual_*` reserves only shape the price and can never leave the
/// curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReserveState {
    #[serde(with = "math::serde_u256")]
    pub virtual_eth_reserve: U256,
    #[serde(with = "math::serde_u256")]
    pub virtual_token_reserve: U256,
    #[serde(with = "math::serde_u256")]
    pub real_eth_reserve: U256,
    #[serde(with = "math::serde_u256")]
    pub real_token_reserve: U256,
    #[serde(with = "math::serde_u256")]
    pub total_eth_traded: U256,
    #[serde(with = "math::serde_u256")]
    pub total_tokens_traded: U256,
    pub graduated: bool,
}

impl TokenReserveState {
    /// State of a freshly launched curve: no ETH raised, full sale allocation held.
    pub fn new(virtual_eth_reserve: U256, virtual_token_reserve: U256, curve_allocation: U256) -> Self {
        Self {
            virtual_eth_reserve,
            virtual_token_reserve,
            real_eth_reserve: U256::zero(),
            real_token_reserve: curve_allocation,
            total_eth_traded: U256::zero(),
            total_tokens_traded: U256::zero(),
            graduated: false,
        }
    }

    pub fn effective_eth_reserve(&self) -> Result<U256, CurveError> {
        math::checked_add(self.virtual_eth_reserve, self.real_eth_reserve)
    }

    pub fn effective_token_reserve(&self) -> Result<U256, CurveError> {
        math::checked_add(self.virtual_token_reserve, self.real_token_reserve)
    }

    /// Constant product `k = effective_eth * effective_token`
    pub fn invariant(&self) -> Result<U256, CurveError> {
        math::checked_mul(self.effective_eth_reserve()?, self.effective_token_reserve()?)
    }

    fn ensure_tradeable(&self) -> Result<(), CurveError> {
        if self.graduated {
            return Err(CurveError::Graduated);
        }
        Ok(())
    }
}

/// Full preview of a single trade against the curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeQuote {
    /// ETH paid for a buy, tokens paid for a sell
    pub amount_in: U256,
    /// Tokens received for a buy, net ETH received for a sell
    pub amount_out: U256,
    pub platform_fee: U256,
    pub creator_fee: U256,
    pub price_before: U256,
    pub price_after: U256,
    pub next_state: TokenReserveState,
}

struct FeeSplit {
    platform: U256,
    creator: U256,
    net: U256,
}

fn split_fees(amount: U256, platform_fee_bps: u16, creator_fee_bps: u16) -> Result<FeeSplit, CurveError> {
    let total_bps = u32::from(platform_fee_bps) + u32::from(creator_fee_bps);
    if total_bps >= BPS_SCALE as u32 {
        return Err(CurveError::InvalidFee(total_bps));
    }
    let platform = math::bps_fee(amount, platform_fee_bps)?;
    let creator = math::bps_fee(amount, creator_fee_bps)?;
    // Two ceilings can overshoot a dust amount; nothing is left for the trader then
    let net = amount
        .checked_sub(math::checked_add(platform, creator)?)
        .unwrap_or_else(U256::zero);
    Ok(FeeSplit { platform, creator, net })
}

/// Bonding curve pricing engine
pub struct CurveCalculator;

impl CurveCalculator {
    /// Spot price in wei per whole token: `effective_eth * 1e18 / effective_token`,
    /// rounded down.
    pub fn get_price(state: &TokenReserveState) -> Result<U256, CurveError> {
        let eth = state.effective_eth_reserve()?;
        let tokens = state.effective_token_reserve()?;
        if tokens.is_zero() {
            error!(
                "effective token reserve is zero (virtual={}, real={})",
                state.virtual_token_reserve, state.real_token_reserve
            );
            return Err(CurveError::DivisionByZero);
        }
        math::mul_div(eth, U256::from(WAD), tokens, Rounding::Down)
    }

    /// Tokens received for `eth_in`, after fees.
    pub fn calculate_buy_return(
        state: &TokenReserveState,
        eth_in: U256,
        platform_fee_bps: u16,
        creator_fee_bps: u16,
    ) -> Result<U256, CurveError> {
        Self::simulate_buy(state, eth_in, platform_fee_bps, creator_fee_bps).map(|q| q.amount_out)
    }

    /// ETH received for `tokens_in`, after fees.
    pub fn calculate_sell_return(
        state: &TokenReserveState,
        tokens_in: U256,
        platform_fee_bps: u16,
        creator_fee_bps: u16,
    ) -> Result<U256, CurveError> {
        Self::simulate_sell(state, tokens_in, platform_fee_bps, creator_fee_bps).map(|q| q.amount_out)
    }

    /// Market cap in wei: `price * total_supply / 1e18`, rounded down.
    pub fn calculate_market_cap(state: &TokenReserveState, total_supply: U256) -> Result<U256, CurveError> {
        let price = Self::get_price(state)?;
        math::mul_div(price, total_supply, U256::from(WAD), Rounding::Down)
    }

    pub fn quote_buy(state: &TokenReserveState, eth_in: U256, config: &CurveConfig) -> Result<TradeQuote, CurveError> {
        Self::simulate_buy(state, eth_in, config.platform_fee_bps, config.creator_fee_bps)
    }

    pub fn quote_sell(state: &TokenReserveState, tokens_in: U256, config: &CurveConfig) -> Result<TradeQuote, CurveError> {
        Self::simulate_sell(state, tokens_in, config.platform_fee_bps, config.creator_fee_bps)
    }

    /// Reserve state after a buy, mirroring the on-chain mutation
    pub fn apply_buy(state: &TokenReserveState, eth_in: U256, config: &CurveConfig) -> Result<TokenReserveState, CurveError> {
        Self::quote_buy(state, eth_in, config).map(|q| q.next_state)
    }

    /// Reserve state after a sell, mirroring the on-chain mutation
    pub fn apply_sell(state: &TokenReserveState, tokens_in: U256, config: &CurveConfig) -> Result<TokenReserveState, CurveError> {
        Self::quote_sell(state, tokens_in, config).map(|q| q.next_state)
    }

    /// Lowest acceptable output for `expected` at `slippage_bps` tolerance
    pub fn min_out_with_slippage(expected: U256, slippage_bps: u16) -> Result<U256, CurveError> {
        if slippage_bps > MAX_SLIPPAGE_BPS {
            return Err(CurveError::InvalidConfig(format!(
                "slippage of {} bps exceeds the {} bps cap",
                slippage_bps, MAX_SLIPPAGE_BPS
            )));
        }
        let keep_bps = U256::from(BPS_SCALE - u64::from(slippage_bps));
        math::mul_div(expected, keep_bps, U256::from(BPS_SCALE), Rounding::Down)
    }

    pub fn buy_with_min_out(
        state: &TokenReserveState,
        eth_in: U256,
        config: &CurveConfig,
        min_tokens_out: U256,
    ) -> Result<TradeQuote, CurveError> {
        let quote = Self::quote_buy(state, eth_in, config)?;
        if quote.amount_out < min_tokens_out {
            return Err(CurveError::SlippageExceeded {
                actual: quote.amount_out,
                minimum: min_tokens_out,
            });
        }
        Ok(quote)
    }

    pub fn sell_with_min_out(
        state: &TokenReserveState,
        tokens_in: U256,
        config: &CurveConfig,
        min_eth_out: U256,
    ) -> Result<TradeQuote, CurveError> {
        let quote = Self::quote_sell(state, tokens_in, config)?;
        if quote.amount_out < min_eth_out {
            return Err(CurveError::SlippageExceeded {
                actual: quote.amount_out,
                minimum: min_eth_out,
            });
        }
        Ok(quote)
    }

    fn simulate_buy(
        state: &TokenReserveState,
        eth_in: U256,
        platform_fee_bps: u16,
        creator_fee_bps: u16,
    ) -> Result<TradeQuote, CurveError> {
        state.ensure_tradeable()?;
        if eth_in.is_zero() {
            return Err(CurveError::InvalidAmount);
        }

        let fees = split_fees(eth_in, platform_fee_bps, creator_fee_bps)?;
        let eth_reserve = state.effective_eth_reserve()?;
        let token_reserve = state.effective_token_reserve()?;
        let k = math::checked_mul(eth_reserve, token_reserve)?;

        // new_token = ceil(k / new_eth): the curve keeps the remainder
        let new_eth_reserve = math::checked_add(eth_reserve, fees.net)?;
        let new_token_reserve = math::div_rounding(k, new_eth_reserve, Rounding::Up)?;
        let tokens_out = math::checked_sub(token_reserve, new_token_reserve)?;

        if tokens_out.is_zero() || tokens_out > state.real_token_reserve {
            return Err(CurveError::InsufficientLiquidity);
        }

        let next_state = TokenReserveState {
            real_eth_reserve: math::checked_add(state.real_eth_reserve, fees.net)?,
            real_token_reserve: math::checked_sub(state.real_token_reserve, tokens_out)?,
            total_eth_traded: math::checked_add(state.total_eth_traded, eth_in)?,
            total_tokens_traded: math::checked_add(state.total_tokens_traded, tokens_out)?,
            ..state.clone()
        };

        let quote = TradeQuote {
            amount_in: eth_in,
            amount_out: tokens_out,
            platform_fee: fees.platform,
            creator_fee: fees.creator,
            price_before: Self::get_price(state)?,
            price_after: Self::get_price(&next_state)?,
            next_state,
        };
        debug!(
            "buy quote: eth_in={} fees={}+{} tokens_out={} price {} -> {}",
            eth_in, quote.platform_fee, quote.creator_fee, tokens_out, quote.price_before, quote.price_after
        );
        Ok(quote)
    }

    fn simulate_sell(
        state: &TokenReserveState,
        tokens_in: U256,
        platform_fee_bps: u16,
        creator_fee_bps: u16,
    ) -> Result<TradeQuote, CurveError> {
        state.ensure_tradeable()?;
        if tokens_in.is_zero() {
            return Err(CurveError::InvalidAmount);
        }

        let eth_reserve = state.effective_eth_reserve()?;
        let token_reserve = state.effective_token_reserve()?;
        let k = math::checked_mul(eth_reserve, token_reserve)?;

        // new_eth = ceil(k / new_token): the curve keeps the remainder
        let new_token_reserve = math::checked_add(token_reserve, tokens_in)?;
        let new_eth_reserve = math::div_rounding(k, new_token_reserve, Rounding::Up)?;
        let eth_out_before_fees = math::checked_sub(eth_reserve, new_eth_reserve)?;

        // Virtual ETH is never withdrawable
        if eth_out_before_fees > state.real_eth_reserve {
            return Err(CurveError::InsufficientLiquidity);
        }

        let fees = split_fees(eth_out_before_fees, platform_fee_bps, creator_fee_bps)?;
        if fees.net.is_zero() {
            return Err(CurveError::InsufficientLiquidity);
        }

        let next_state = TokenReserveState {
            real_eth_reserve: math::checked_sub(state.real_eth_reserve, eth_out_before_fees)?,
            real_token_reserve: math::checked_add(state.real_token_reserve, tokens_in)?,
            total_eth_traded: math::checked_add(state.total_eth_traded, eth_out_before_fees)?,
            total_tokens_traded: math::checked_add(state.total_tokens_traded, tokens_in)?,
            ..state.clone()
        };

        let quote = TradeQuote {
            amount_in: tokens_in,
            amount_out: fees.net,
            platform_fee: fees.platform,
            creator_fee: fees.creator,
            price_before: Self::get_price(state)?,
            price_after: Self::get_price(&next_state)?,
            next_state,
        };
        debug!(
            "sell quote: tokens_in={} eth_gross={} eth_out={} price {} -> {}",
            tokens_in, eth_out_before_fees, quote.amount_out, quote.price_before, quote.price_after
        );
        Ok(quote)
    }
}
