pub use rise_math::{ONE, SECONDS_PER_YEAR};

pub const DEFAULT_OPTIMAL_UTILIZATION: u128 = 900_000_000_000_000_000; // 90%
pub const DEFAULT_INTEREST_SLOPE_1: u128 = 200_000_000_000_000_000; // 20% APR
pub const DEFAULT_INTEREST_SLOPE_2: u128 = 600_000_000_000_000_000; // 60% APR
pub const DEFAULT_MAX_BORROW_RATE_PER_SECOND: u128 = 50_735_667_174; // 160% APR
pub const DEFAULT_PERFORMANCE_FEE: u128 = 100_000_000_000_000_000; // 10%

pub const RISE_TOKEN_DECIMALS: u32 = 18;
pub const REBALANCE_INTERVAL: u64 = 24 * 60 * 60;
