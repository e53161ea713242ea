//! Two-slope borrow curve.
//!
//! Below the optimal utilization the annual rate climbs linearly to `slope1`;
//! past it the remaining headroom is priced with `slope2`. Rates are converted
//! to per-second values and capped by `max_borrow_rate_per_second`.

use rise_math::{checked_add, checked_sub, mul_div_floor, mul_fixed};
use soroban_sdk::Env;

use crate::constants::{ONE, SECONDS_PER_YEAR};
use crate::errors::Error;
use crate::storage::VaultParams;

/// debt / (debt + cash), zero for an empty pool.
pub fn utilization(env: &Env, cash: u128, debt: u128) -> Result<u128, Error> {
    let total = checked_add(cash, debt)?;
    if total == 0 {
        return Ok(0);
    }
    Ok(mul_div_floor(env, debt, ONE, total)?)
}

pub fn annual_borrow_rate(env: &Env, params: &VaultParams, utilization: u128) -> Result<u128, Error> {
    let optimal = params.optimal_utilization;
    if utilization <= optimal {
        return Ok(mul_div_floor(env, params.interest_slope_1, utilization, optimal)?);
    }
    let excess = mul_div_floor(
        env,
        checked_sub(utilization, optimal)?,
        ONE,
        checked_sub(ONE, optimal)?,
    )?;
    Ok(checked_add(
        params.interest_slope_1,
        mul_fixed(env, params.interest_slope_2, excess)?,
    )?)
}

pub fn borrow_rate_per_second(
    env: &Env,
    params: &VaultParams,
    utilization: u128,
) -> Result<u128, Error> {
    let per_second = annual_borrow_rate(env, params, utilization)? / SECONDS_PER_YEAR;
    Ok(per_second.min(params.max_borrow_rate_per_second))
}

/// What lenders earn per second once the performance fee is taken.
pub fn supply_rate_per_second(
    env: &Env,
    params: &VaultParams,
    utilization: u128,
    borrow_rate_per_second: u128,
) -> Result<u128, Error> {
    let gross = mul_fixed(env, borrow_rate_per_second, utilization)?;
    Ok(mul_fixed(
        env,
        gross,
        checked_sub(ONE, params.performance_fee)?,
    )?)
}

pub fn validate(params: &VaultParams) -> Result<(), Error> {
    if params.optimal_utilization == 0 || params.optimal_utilization >= ONE {
        return Err(Error::InvalidParameter);
    }
    if params.interest_slope_1 > ONE
        || params.interest_slope_2 > ONE
        || params.performance_fee > ONE
        || params.max_borrow_rate_per_second > ONE
    {
        return Err(Error::InvalidParameter);
    }
    Ok(())
}
