//! Trade guards for the configurable curve variants.
//!
//! The secure variants cap single trades, enforce a per-wallet cooldown and
//! limit how many tokens one wallet may accumulate from the curve. The chain
//! enforces these too; running them off-chain rejects doomed trades before a
//! transaction is built.

use crate::error::TradeLimitError;
use crate::math::U256;
use crate::CurveConfig;
use log::debug;

/// Per-wallet facts needed to check one trade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeContext {
    /// ETH value of the trade in wei (input for buys, gross output for sells)
    pub trade_wei: U256,
    /// Unix time of the wallet's previous trade on this curve
    pub last_trade_at: Option<u64>,
    /// Current unix time
    pub now: u64,
    /// Wallet token balance after the trade settles
    pub balance_after: U256,
    pub is_buy: bool,
}

pub struct TradeLimits;

impl TradeLimits {
    pub fn check(config: &CurveConfig, ctx: &TradeContext) -> Result<(), TradeLimitError> {
        if ctx.trade_wei < config.min_trade_wei {
            return Err(TradeLimitError::BelowMinimum {
                amount: ctx.trade_wei,
                minimum: config.min_trade_wei,
            });
        }

        if !config.max_trade_wei.is_zero() && ctx.trade_wei > config.max_trade_wei {
            return Err(TradeLimitError::AboveMaximum {
                amount: ctx.trade_wei,
                maximum: config.max_trade_wei,
            });
        }

        if let Some(last) = ctx.last_trade_at {
            let elapsed = ctx.now.saturating_sub(last);
            if elapsed < config.cooldown_seconds {
                return Err(TradeLimitError::CooldownActive {
                    remaining_seconds: config.cooldown_seconds - elapsed,
                });
            }
        }

        // Sells only shrink a wallet, so the cap applies to buys
        if ctx.is_buy
            && !config.max_tokens_per_user.is_zero()
            && ctx.balance_after > config.max_tokens_per_user
        {
            return Err(TradeLimitError::WalletLimitExceeded {
                balance: ctx.balance_after,
                limit: config.max_tokens_per_user,
            });
        }

        debug!("trade of {} wei passes limits", ctx.trade_wei);
        Ok(())
    }
}
