//! Leveraged token engine.
//!
//! Every RISE token borrows from the vault under its own address. Minting
//! matches each unit of deposited collateral with a unit bought on borrowed
//! underlying, so a fresh position starts at roughly 2x. Rebalancing walks the
//! leverage ratio back into `[min_leverage_ratio, max_leverage_ratio]` in
//! steps capped by `max_rebalance_value`.

use rise_math::{checked_add, checked_mul, checked_sub, mul_div_floor, mul_fixed, pow10};
use soroban_sdk::{token, Address, Env, IntoVal, Vec};

use crate::constants::{ONE, REBALANCE_INTERVAL, RISE_TOKEN_DECIMALS};
use crate::errors::Error;
use crate::events::*;
use crate::helpers::*;
use crate::ledger;
use crate::storage::*;

/// Snapshot of a RISE token's balance sheet at the oracle price.
pub(crate) struct Position {
    pub price: u128,
    /// Collateral backing the shares, pending fees excluded.
    pub collateral: u128,
    pub value: u128,
    pub debt: u128,
    pub supply: u128,
}

impl Position {
    fn equity(&self) -> Result<u128, Error> {
        if self.value <= self.debt {
            return Err(Error::NavCollapsed);
        }
        Ok(self.value - self.debt)
    }
}

pub(crate) fn validate_params(params: &RiseTokenParams) -> Result<(), Error> {
    if params.min_leverage_ratio <= ONE || params.max_leverage_ratio <= params.min_leverage_ratio {
        return Err(Error::InvalidParameter);
    }
    if params.fee > ONE || params.max_slippage > ONE {
        return Err(Error::InvalidParameter);
    }
    if params.rebalancing_step == 0 || params.rebalancing_step > ONE {
        return Err(Error::InvalidParameter);
    }
    if params.max_rebalance_value == 0 {
        return Err(Error::InvalidParameter);
    }
    Ok(())
}

pub(crate) fn create(env: &Env, underlying: &Address, config: RiseTokenConfig) -> Result<(), Error> {
    if has_rise_token(env, &config.token) {
        return Err(Error::RiseTokenAlreadyExists);
    }
    validate_params(&config.params)?;
    if config.initial_price == 0 || config.collateral == *underlying {
        return Err(Error::InvalidParameter);
    }
    if config.is_native != (config.collateral == read_native_asset(env)?) {
        return Err(Error::InvalidParameter);
    }
    if RiseShareClient::new(env, &config.token).decimals() != RISE_TOKEN_DECIMALS {
        return Err(Error::InvalidParameter);
    }
    let collateral_decimals = token::Client::new(env, &config.collateral).decimals();
    pow10(collateral_decimals)?;

    let metadata = RiseTokenMetadata {
        is_native: config.is_native,
        token: config.token.clone(),
        collateral: config.collateral.clone(),
        oracle: config.oracle,
        swap: config.swap,
        collateral_decimals,
        initial_price: config.initial_price,
        params: config.params,
        total_collateral: 0,
        total_pending_fees: 0,
        last_rebalance_timestamp: 0,
        partial_rebalance: false,
    };
    write_rise_token(env, &metadata);

    RiseTokenCreated {
        token: config.token,
        collateral: config.collateral,
        is_native: config.is_native,
        initial_price: config.initial_price,
    }
    .publish(env);
    Ok(())
}

pub(crate) fn read_price(env: &Env, oracle: &Address) -> Result<u128, Error> {
    let price: u128 = try_call_contract(env, oracle, "get_price", Vec::new(env))
        .map_err(|_| Error::InvalidPrice)?;
    if price == 0 {
        return Err(Error::InvalidPrice);
    }
    Ok(price)
}

/// Underlying value of `amount` collateral at `price`.
fn collateral_value(
    env: &Env,
    metadata: &RiseTokenMetadata,
    amount: u128,
    price: u128,
) -> Result<u128, Error> {
    Ok(mul_div_floor(
        env,
        amount,
        price,
        pow10(metadata.collateral_decimals)?,
    )?)
}

/// Collateral worth `value` underlying at `price`.
fn collateral_for_value(
    env: &Env,
    metadata: &RiseTokenMetadata,
    value: u128,
    price: u128,
) -> Result<u128, Error> {
    Ok(mul_div_floor(
        env,
        value,
        pow10(metadata.collateral_decimals)?,
        price,
    )?)
}

pub(crate) fn position(
    env: &Env,
    metadata: &RiseTokenMetadata,
    state: &VaultState,
) -> Result<Position, Error> {
    let price = read_price(env, &metadata.oracle)?;
    let collateral = checked_sub(metadata.total_collateral, metadata.total_pending_fees)?;
    Ok(Position {
        price,
        collateral,
        value: collateral_value(env, metadata, collateral, price)?,
        debt: ledger::debt_of(env, state, &metadata.token)?,
        supply: to_u128(RiseShareClient::new(env, &metadata.token).total_supply())?,
    })
}

/// Net asset value per whole RISE token; the initial price before the first mint.
pub(crate) fn nav(env: &Env, metadata: &RiseTokenMetadata, position: &Position) -> Result<u128, Error> {
    if position.supply == 0 {
        return Ok(metadata.initial_price);
    }
    Ok(mul_div_floor(env, position.equity()?, ONE, position.supply)?)
}

/// Gross collateral value over equity, scaled by 1e18. An empty position reports 1x.
pub(crate) fn leverage_ratio(env: &Env, position: &Position) -> Result<u128, Error> {
    if position.value == 0 && position.debt == 0 {
        return Ok(ONE);
    }
    Ok(mul_div_floor(env, position.value, ONE, position.equity()?)?)
}

/// Buys exactly `amount_out` of `token_out`, spending at most `max_amount_in`
/// of the vault's `token_in`. The router only holds an allowance for the
/// duration of the call.
fn swap_exact_out(
    env: &Env,
    router: &Address,
    token_in: &Address,
    token_out: &Address,
    max_amount_in: u128,
    amount_out: u128,
) -> Result<u128, Error> {
    let vault = env.current_contract_address();
    let asset = token::Client::new(env, token_in);
    let expiration = env.ledger().sequence();
    asset.approve(&vault, router, &to_i128(max_amount_in)?, &expiration);
    let result: Result<u128, CallErrorKind> = try_call_contract(
        env,
        router,
        "swap",
        (
            vault.clone(),
            token_in.clone(),
            token_out.clone(),
            max_amount_in,
            amount_out,
        )
            .into_val(env),
    );
    asset.approve(&vault, router, &0, &expiration);

    let amount_in = result.map_err(|_| Error::SlippageTooHigh)?;
    if amount_in > max_amount_in {
        return Err(Error::SlippageTooHigh);
    }
    Ok(amount_in)
}

pub(crate) fn mint(
    env: &Env,
    token: &Address,
    minter: &Address,
    recipient: &Address,
    amount: u128,
    native: bool,
) -> Result<u128, Error> {
    let underlying = ensure_initialized(env)?;
    minter.require_auth();
    let mut metadata = read_rise_token(env, token)?;
    if metadata.is_native != native {
        return Err(Error::WrongAssetType);
    }
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    if token_balance(env, &metadata.collateral, minter)? < amount {
        return Err(Error::InsufficientBalance);
    }

    let mut state = ledger::accrue_interest(env)?;
    let before = position(env, &metadata, &state)?;
    let nav = nav(env, &metadata, &before)?;

    let fee = mul_fixed(env, amount, metadata.params.fee)?;
    let net = checked_sub(amount, fee)?;
    if net == 0 {
        return Err(Error::ZeroAmount);
    }
    let net_value = collateral_value(env, &metadata, net, before.price)?;
    let max_amount_in = with_slippage(env, net_value, metadata.params.max_slippage)?;
    if max_amount_in > ledger::available_cash(env, &underlying, &state)? {
        return Err(Error::InsufficientLiquidity);
    }

    let vault = env.current_contract_address();
    token::Client::new(env, &metadata.collateral).transfer(minter, &vault, &to_i128(amount)?);
    let borrowed = swap_exact_out(
        env,
        &metadata.swap,
        &underlying,
        &metadata.collateral,
        max_amount_in,
        net,
    )?;
    if borrowed > 0 {
        ledger::record_borrow(env, &mut state, token, borrowed)?;
    }
    write_state(env, &state);

    // Deposit plus the matching purchase, minus what the purchase put on the books.
    let gross_value = collateral_value(env, &metadata, checked_mul(net, 2)?, before.price)?;
    let invested = checked_sub(gross_value, borrowed).map_err(|_| Error::SlippageTooHigh)?;
    let shares = mul_div_floor(env, invested, ONE, nav)?;
    if shares == 0 {
        return Err(Error::ZeroAmount);
    }

    metadata.total_collateral = checked_add(metadata.total_collateral, checked_add(amount, net)?)?;
    metadata.total_pending_fees = checked_add(metadata.total_pending_fees, fee)?;
    write_rise_token(env, &metadata);

    RiseShareClient::new(env, token).mint(recipient, &to_i128(shares)?);

    RiseTokenMinted {
        token: token.clone(),
        recipient: recipient.clone(),
        collateral_amount: amount,
        borrowed,
        shares,
        nav,
    }
    .publish(env);
    Ok(shares)
}

pub(crate) fn redeem(
    env: &Env,
    token: &Address,
    redeemer: &Address,
    recipient: &Address,
    shares: u128,
) -> Result<u128, Error> {
    let underlying = ensure_initialized(env)?;
    redeemer.require_auth();
    let mut metadata = read_rise_token(env, token)?;
    if shares == 0 {
        return Err(Error::ZeroAmount);
    }
    let rise = RiseShareClient::new(env, token);
    if to_u128(rise.balance(redeemer))? < shares {
        return Err(Error::InsufficientBalance);
    }

    let mut state = ledger::accrue_interest(env)?;
    let before = position(env, &metadata, &state)?;
    before.equity()?;

    let collateral_share = mul_div_floor(env, before.collateral, shares, before.supply)?;
    let debt_share = mul_div_floor(env, before.debt, shares, before.supply)?;
    rise.burn(redeemer, &to_i128(shares)?);

    let mut sold = 0u128;
    let mut repaid = 0u128;
    if debt_share > 0 {
        let needed = collateral_for_value(env, &metadata, debt_share, before.price)?;
        let max_amount_in =
            with_slippage(env, needed, metadata.params.max_slippage)?.min(collateral_share);
        sold = swap_exact_out(
            env,
            &metadata.swap,
            &metadata.collateral,
            &underlying,
            max_amount_in,
            debt_share,
        )?;
        repaid = ledger::record_repay(env, &mut state, token, debt_share)?;
    }
    write_state(env, &state);

    let remaining = checked_sub(collateral_share, sold)?;
    let fee = mul_fixed(env, remaining, metadata.params.fee)?;
    let collateral_out = checked_sub(remaining, fee)?;

    // The fee stays behind as collateral until it is swept.
    metadata.total_collateral = checked_sub(
        metadata.total_collateral,
        checked_sub(collateral_share, fee)?,
    )?;
    metadata.total_pending_fees = checked_add(metadata.total_pending_fees, fee)?;
    write_rise_token(env, &metadata);

    if collateral_out > 0 {
        token::Client::new(env, &metadata.collateral).transfer(
            &env.current_contract_address(),
            recipient,
            &to_i128(collateral_out)?,
        );
    }

    RiseTokenRedeemed {
        token: token.clone(),
        recipient: recipient.clone(),
        shares,
        collateral_sold: sold,
        repaid,
        collateral_out,
        fee,
    }
    .publish(env);
    Ok(collateral_out)
}

pub(crate) fn rebalance(env: &Env, token: &Address) -> Result<(), Error> {
    let underlying = ensure_initialized(env)?;
    let mut metadata = read_rise_token(env, token)?;
    let mut state = ledger::accrue_interest(env)?;
    let before = position(env, &metadata, &state)?;
    if before.supply == 0 {
        return Err(Error::RebalanceNotNeeded);
    }
    let leverage = leverage_ratio(env, &before)?;
    let params = metadata.params.clone();
    if leverage >= params.min_leverage_ratio && leverage <= params.max_leverage_ratio {
        return Err(Error::RebalanceNotNeeded);
    }

    let now = env.ledger().timestamp();
    let last = metadata.last_rebalance_timestamp;
    if !metadata.partial_rebalance && last != 0 && now < last.saturating_add(REBALANCE_INTERVAL) {
        return Err(Error::RebalanceTooSoon);
    }

    let leverage_up = leverage < params.min_leverage_ratio;
    let step = mul_fixed(env, before.equity()?, params.rebalancing_step)?;
    let partial = step > params.max_rebalance_value;
    let mut step_value = step.min(params.max_rebalance_value);
    if !leverage_up {
        step_value = step_value.min(before.debt);
    }
    let collateral_amount = collateral_for_value(env, &metadata, step_value, before.price)?;
    if step_value == 0 || collateral_amount == 0 {
        return Err(Error::RebalanceNotNeeded);
    }

    let (collateral_moved, debt_change) = if leverage_up {
        // Borrow underlying and add collateral.
        let max_amount_in = with_slippage(env, step_value, params.max_slippage)?;
        if max_amount_in > ledger::available_cash(env, &underlying, &state)? {
            return Err(Error::InsufficientLiquidity);
        }
        let borrowed = swap_exact_out(
            env,
            &metadata.swap,
            &underlying,
            &metadata.collateral,
            max_amount_in,
            collateral_amount,
        )?;
        if borrowed > 0 {
            ledger::record_borrow(env, &mut state, token, borrowed)?;
        }
        metadata.total_collateral = checked_add(metadata.total_collateral, collateral_amount)?;
        (collateral_amount, borrowed)
    } else {
        // Sell collateral and pay down debt.
        let max_amount_in =
            with_slippage(env, collateral_amount, params.max_slippage)?.min(before.collateral);
        let sold = swap_exact_out(
            env,
            &metadata.swap,
            &metadata.collateral,
            &underlying,
            max_amount_in,
            step_value,
        )?;
        let repaid = ledger::record_repay(env, &mut state, token, step_value)?;
        metadata.total_collateral = checked_sub(metadata.total_collateral, sold)?;
        (sold, repaid)
    };
    write_state(env, &state);

    metadata.last_rebalance_timestamp = now;
    metadata.partial_rebalance = partial;
    write_rise_token(env, &metadata);

    Rebalanced {
        token: token.clone(),
        leverage_up,
        leverage_before: leverage,
        collateral_amount: collateral_moved,
        debt_change,
        partial,
    }
    .publish(env);
    Ok(())
}

/// Sends the collateral fees accumulated by `token` to the fee receiver.
pub(crate) fn collect_fees(env: &Env, token: &Address) -> Result<u128, Error> {
    ensure_initialized(env)?;
    let mut metadata = read_rise_token(env, token)?;
    let amount = metadata.total_pending_fees;
    if amount == 0 {
        return Ok(0);
    }
    let receiver = read_fee_receiver(env)?;
    metadata.total_collateral = checked_sub(metadata.total_collateral, amount)?;
    metadata.total_pending_fees = 0;
    write_rise_token(env, &metadata);

    token::Client::new(env, &metadata.collateral).transfer(
        &env.current_contract_address(),
        &receiver,
        &to_i128(amount)?,
    );
    RiseTokenFeesCollected {
        token: token.clone(),
        receiver,
        amount,
    }
    .publish(env);
    Ok(amount)
}

pub(crate) fn set_params(env: &Env, token: &Address, params: RiseTokenParams) -> Result<(), Error> {
    let mut metadata = read_rise_token(env, token)?;
    validate_params(&params)?;
    RiseTokenParametersUpdated {
        token: token.clone(),
        fee: params.fee,
        min_leverage_ratio: params.min_leverage_ratio,
        max_leverage_ratio: params.max_leverage_ratio,
        max_rebalance_value: params.max_rebalance_value,
        rebalancing_step: params.rebalancing_step,
        max_slippage: params.max_slippage,
    }
    .publish(env);
    metadata.params = params;
    write_rise_token(env, &metadata);
    Ok(())
}
