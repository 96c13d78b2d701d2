// Fixed-point scales
pub const BPS_SCALE: u64 = 10_000;                   // 10,000 bps = 100%
pub const WAD_DECIMALS: usize = 18;                  // price and token base-unit decimals
pub const WAD: u128 = 1_000_000_000_000_000_000;     // 1e18

// Virtual reserves seeding every curve
pub const DEFAULT_VIRTUAL_ETH_RESERVE: u128 = WAD;                   // 1 ETH
pub const DEFAULT_VIRTUAL_TOKEN_RESERVE: u128 = 1_000_000 * WAD;     // 1M tokens

// Token economics
pub const DEFAULT_TOTAL_SUPPLY: u128 = 1_000_000_000 * WAD;          // 1B tokens
pub const DEFAULT_CURVE_ALLOCATION: u128 = 800_000_000 * WAD;        // 80% sold through the curve

// Graduation, in whole USD
pub const DEFAULT_GRADUATION_THRESHOLD_USD: u128 = 69_000;           // $69k market cap

// Fee presets
pub const STANDARD_PLATFORM_FEE_BPS: u16 = 100;      // 1%
pub const STANDARD_CREATOR_FEE_BPS: u16 = 100;       // 1%
pub const LOW_PLATFORM_FEE_BPS: u16 = 25;            // 0.25%
pub const LOW_CREATOR_FEE_BPS: u16 = 25;             // 0.25%

// Trade limits
pub const MIN_TRADE_WEI: u128 = 1_000_000_000_000;   // 0.000001 ETH
pub const SECURE_MAX_TRADE_WEI: u128 = 5 * WAD;      // 5 ETH per trade
pub const ULTRA_SECURE_MAX_TRADE_WEI: u128 = WAD;    // 1 ETH per trade
pub const SECURE_COOLDOWN_SECONDS: u64 = 30;
pub const ULTRA_SECURE_COOLDOWN_SECONDS: u64 = 300;  // 5 minute lock window
pub const SECURE_MAX_TOKENS_PER_USER: u128 = 20_000_000 * WAD;      // 2% of supply
pub const ULTRA_SECURE_MAX_TOKENS_PER_USER: u128 = 10_000_000 * WAD; // 1% of supply

// Slippage
pub const MAX_SLIPPAGE_BPS: u16 = 5_000;             // 50% hard cap on caller tolerance

// AMM migration
pub const MIGRATION_ETH_RATIO_BPS: u64 = 10_000;     // all real ETH seeds the pool
