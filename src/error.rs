use crate::escrow::EscrowStatus;
use crate::math::U256;
use thiserror::Error;

/// Errors raised by the bonding curve pricing engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    /// Zero input amount
    #[error("Trade amount must be greater than zero")]
    InvalidAmount,

    /// Trade would exceed the real reserves held by the curve
    #[error("Insufficient liquidity on the bonding curve")]
    InsufficientLiquidity,

    /// Effective reserve of zero; the virtual reserves make this unreachable
    /// for any state produced by the factory
    #[error("Division by zero: reserve invariant violated")]
    DivisionByZero,

    /// The curve has graduated and no longer trades
    #[error("Bonding curve has graduated")]
    Graduated,

    /// Combined fee rate of 100% or more
    #[error("Invalid fee configuration: {0} bps total")]
    InvalidFee(u32),

    #[error("Slippage exceeded: got {actual}, expected at least {minimum}")]
    SlippageExceeded { actual: U256, minimum: U256 },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid curve configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid launch parameters: {0}")]
    InvalidLaunchParams(String),
}

/// Errors raised by trade guard checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeLimitError {
    #[error("Trade of {amount} wei is below the minimum of {minimum} wei")]
    BelowMinimum { amount: U256, minimum: U256 },

    #[error("Trade of {amount} wei is above the maximum of {maximum} wei")]
    AboveMaximum { amount: U256, maximum: U256 },

    #[error("Wallet is cooling down for another {remaining_seconds}s")]
    CooldownActive { remaining_seconds: u64 },

    #[error("Wallet would hold {balance} tokens, limit is {limit}")]
    WalletLimitExceeded { balance: U256, limit: U256 },
}

/// Errors raised by the escrow milestone reconciler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    #[error("Milestone {0} not found")]
    MilestoneNotFound(u32),

    #[error("Milestone {0} already released")]
    AlreadyReleased(u32),

    #[error("Escrow is not active (status: {0})")]
    EscrowNotActive(EscrowStatus),

    /// Released milestones add up to more than the escrow total
    #[error("Released amount {released} exceeds escrow total {total}")]
    ReleasedExceedsTotal { released: u128, total: u128 },

    #[error("Escrow must have at least one milestone")]
    NoMilestones,

    #[error("Milestone amounts sum to {sum}, escrow total is {total}")]
    MilestoneSumMismatch { sum: u128, total: u128 },

    #[error("Duplicate milestone index {0}")]
    DuplicateMilestone(u32),

    #[error("Invalid escrow transition from {from} to {to}")]
    InvalidTransition { from: EscrowStatus, to: EscrowStatus },

    #[error("Arithmetic overflow")]
    Overflow,
}
