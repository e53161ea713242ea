//! Pool accounting shared by the lending endpoints and the leveraged-token engine.
//!
//! Borrower debt is a share of one global pool: each borrower holds debt
//! proportion units and owns `proportion * total_outstanding_debt /
//! total_debt_proportion`. Accrual only grows `total_outstanding_debt`, so
//! interest reaches every borrower without iterating over them.

use rise_math::{checked_add, checked_mul, checked_sub, mul_div_floor, mul_fixed};
use soroban_sdk::{Address, Env};

use crate::constants::ONE;
use crate::errors::Error;
use crate::events::{Borrow, InterestAccrued, Repay};
use crate::helpers::token_balance;
use crate::rate_model;
use crate::storage::*;

/// Vault state brought forward to the current ledger timestamp.
pub(crate) struct Accrual {
    pub state: VaultState,
    pub interest: u128,
    pub fee: u128,
    pub rate_per_second: u128,
}

/// Underlying held by the vault that is not owed to the fee receiver.
pub(crate) fn available_cash(
    env: &Env,
    underlying: &Address,
    state: &VaultState,
) -> Result<u128, Error> {
    let balance = token_balance(env, underlying, &env.current_contract_address())?;
    Ok(balance.saturating_sub(state.total_pending_fees))
}

pub(crate) fn current_utilization(
    env: &Env,
    underlying: &Address,
    state: &VaultState,
) -> Result<u128, Error> {
    let cash = available_cash(env, underlying, state)?;
    rate_model::utilization(env, cash, state.total_outstanding_debt)
}

/// Computes the accrual since the last checkpoint without persisting it.
pub(crate) fn project(env: &Env, underlying: &Address) -> Result<Accrual, Error> {
    let mut state = read_state(env)?;
    let now = env.ledger().timestamp();
    if now <= state.last_accrual_timestamp {
        return Ok(Accrual {
            state,
            interest: 0,
            fee: 0,
            rate_per_second: 0,
        });
    }
    let elapsed = (now - state.last_accrual_timestamp) as u128;
    state.last_accrual_timestamp = now;
    if state.total_outstanding_debt == 0 {
        return Ok(Accrual {
            state,
            interest: 0,
            fee: 0,
            rate_per_second: 0,
        });
    }

    let params = read_params(env)?;
    let utilization = current_utilization(env, underlying, &state)?;
    let rate_per_second = rate_model::borrow_rate_per_second(env, &params, utilization)?;
    let interest = mul_fixed(
        env,
        state.total_outstanding_debt,
        checked_mul(rate_per_second, elapsed)?,
    )?;
    let fee = mul_fixed(env, interest, params.performance_fee)?;

    // Borrowers owe the full interest; the fee slice is carved out of cash for the protocol.
    state.total_outstanding_debt = checked_add(state.total_outstanding_debt, interest)?;
    state.total_pending_fees = checked_add(state.total_pending_fees, fee)?;
    Ok(Accrual {
        state,
        interest,
        fee,
        rate_per_second,
    })
}

/// Checkpoints interest up to now. A second call in the same timestamp changes nothing.
pub(crate) fn accrue_interest(env: &Env) -> Result<VaultState, Error> {
    let underlying = ensure_initialized(env)?;
    let accrual = project(env, &underlying)?;
    write_state(env, &accrual.state);
    if accrual.interest > 0 {
        InterestAccrued {
            interest: accrual.interest,
            fee: accrual.fee,
            borrow_rate_per_second: accrual.rate_per_second,
            total_outstanding_debt: accrual.state.total_outstanding_debt,
        }
        .publish(env);
    }
    Ok(accrual.state)
}

/// Underlying value of one vault share, scaled by 1e18.
pub(crate) fn exchange_rate(
    env: &Env,
    underlying: &Address,
    state: &VaultState,
) -> Result<u128, Error> {
    let supply = total_shares(env);
    if supply == 0 {
        return Ok(ONE);
    }
    let cash = available_cash(env, underlying, state)?;
    let assets = checked_add(cash, state.total_outstanding_debt)?;
    Ok(mul_div_floor(env, assets, ONE, supply)?)
}

pub(crate) fn debt_of(env: &Env, state: &VaultState, borrower: &Address) -> Result<u128, Error> {
    let proportion = read_debt_proportion(env, borrower);
    if proportion == 0 || state.total_debt_proportion == 0 {
        return Ok(0);
    }
    Ok(mul_div_floor(
        env,
        proportion,
        state.total_outstanding_debt,
        state.total_debt_proportion,
    )?)
}

/// Books `amount` of new debt against `borrower`. The caller moves the funds
/// and persists `state`.
pub(crate) fn record_borrow(
    env: &Env,
    state: &mut VaultState,
    borrower: &Address,
    amount: u128,
) -> Result<u128, Error> {
    let units = if state.total_debt_proportion == 0 || state.total_outstanding_debt == 0 {
        amount
    } else {
        mul_div_floor(
            env,
            amount,
            state.total_debt_proportion,
            state.total_outstanding_debt,
        )?
    };
    if units == 0 {
        return Err(Error::ZeroAmount);
    }
    let proportion = checked_add(read_debt_proportion(env, borrower), units)?;
    state.total_outstanding_debt = checked_add(state.total_outstanding_debt, amount)?;
    state.total_debt_proportion = checked_add(state.total_debt_proportion, units)?;
    write_debt_proportion(env, borrower, proportion);

    Borrow {
        borrower: borrower.clone(),
        amount,
        debt_proportion: proportion,
        total_outstanding_debt: state.total_outstanding_debt,
    }
    .publish(env);
    Ok(units)
}

/// Clears up to `amount` of `borrower`'s debt and returns what was actually
/// repaid. Repaying the whole debt retires every proportion unit so no dust
/// is left behind. The caller moves the funds and persists `state`.
pub(crate) fn record_repay(
    env: &Env,
    state: &mut VaultState,
    borrower: &Address,
    amount: u128,
) -> Result<u128, Error> {
    let debt = debt_of(env, state, borrower)?;
    if debt == 0 || amount == 0 {
        return Ok(0);
    }
    let repaid = amount.min(debt);
    let proportion = read_debt_proportion(env, borrower);
    let units = if repaid == debt {
        proportion
    } else {
        mul_div_floor(
            env,
            repaid,
            state.total_debt_proportion,
            state.total_outstanding_debt,
        )?
        .min(proportion)
    };
    let remaining = checked_sub(proportion, units)?;
    state.total_outstanding_debt = checked_sub(state.total_outstanding_debt, repaid)?;
    state.total_debt_proportion = checked_sub(state.total_debt_proportion, units)?;
    write_debt_proportion(env, borrower, remaining);

    Repay {
        borrower: borrower.clone(),
        amount: repaid,
        debt_proportion: remaining,
        total_outstanding_debt: state.total_outstanding_debt,
    }
    .publish(env);
    Ok(repaid)
}
