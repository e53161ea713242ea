use soroban_sdk::{contracttype, Address, Env};
use stellar_tokens::fungible::Base as TokenBase;

use crate::errors::Error;

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[soroban_sdk::contractclient(name = "RiseShareClient")]
pub trait RiseShare {
    fn mint(env: Env, to: Address, amount: i128);
    fn burn(env: Env, from: Address, amount: i128);
    fn total_supply(env: Env) -> i128;
    fn balance(env: Env, id: Address) -> i128;
    fn decimals(env: Env) -> u32;
}

#[contracttype]
pub enum DataKey {
    Initialized,
    Governor,
    FeeReceiver,
    UnderlyingToken,
    NativeAsset,
    Params,                  // VaultParams
    State,                   // VaultState
    Borrower(Address),       // bool capability flag
    DebtProportion(Address), // u128 share of State.total_debt_proportion
    RiseToken(Address),      // RiseTokenMetadata keyed by the RISE token address
    Locked,                  // instance storage, set while an operation is in flight
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultState {
    pub total_outstanding_debt: u128,
    pub total_debt_proportion: u128,
    pub total_pending_fees: u128,
    pub last_accrual_timestamp: u64,
}

/// Interest curve and fee settings, all scaled by 1e18.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultParams {
    pub optimal_utilization: u128,
    pub interest_slope_1: u128,
    pub interest_slope_2: u128,
    pub max_borrow_rate_per_second: u128,
    pub performance_fee: u128,
}

/// Governor-tunable economics of a RISE token, all scaled by 1e18 except
/// `max_rebalance_value` which is in underlying units.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenParams {
    pub fee: u128,
    pub min_leverage_ratio: u128,
    pub max_leverage_ratio: u128,
    pub max_rebalance_value: u128,
    pub rebalancing_step: u128,
    pub max_slippage: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenConfig {
    pub is_native: bool,
    pub token: Address,
    pub collateral: Address,
    pub oracle: Address,
    pub swap: Address,
    pub initial_price: u128,
    pub params: RiseTokenParams,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenMetadata {
    pub is_native: bool,
    pub token: Address,
    pub collateral: Address,
    pub oracle: Address,
    pub swap: Address,
    pub collateral_decimals: u32,
    pub initial_price: u128,
    pub params: RiseTokenParams,
    /// Collateral held for this token, fees not yet swept included.
    pub total_collateral: u128,
    pub total_pending_fees: u128,
    pub last_rebalance_timestamp: u64,
    /// Set when the last rebalance was capped by `max_rebalance_value`.
    pub partial_rebalance: bool,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get::<_, bool>(&DataKey::Initialized)
        .unwrap_or(false)
}

/// Returns the underlying asset once the vault has been set up.
pub fn ensure_initialized(env: &Env) -> Result<Address, Error> {
    if !is_initialized(env) {
        return Err(Error::NotInitialized);
    }
    bump_core_ttl(env);
    env.storage()
        .persistent()
        .get(&DataKey::UnderlyingToken)
        .ok_or(Error::NotInitialized)
}

pub fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    for key in [
        DataKey::Initialized,
        DataKey::Governor,
        DataKey::FeeReceiver,
        DataKey::UnderlyingToken,
        DataKey::NativeAsset,
        DataKey::Params,
        DataKey::State,
    ] {
        if persistent.has(&key) {
            persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
    }
}

fn bump_ttl(env: &Env, key: &DataKey) {
    let persistent = env.storage().persistent();
    if persistent.has(key) {
        persistent.extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

fn read_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
    env.storage()
        .persistent()
        .get(key)
        .ok_or(Error::NotInitialized)
}

pub fn read_governor(env: &Env) -> Result<Address, Error> {
    read_address(env, &DataKey::Governor)
}

pub fn write_governor(env: &Env, governor: &Address) {
    env.storage().persistent().set(&DataKey::Governor, governor);
}

pub fn read_fee_receiver(env: &Env) -> Result<Address, Error> {
    read_address(env, &DataKey::FeeReceiver)
}

pub fn write_fee_receiver(env: &Env, receiver: &Address) {
    env.storage().persistent().set(&DataKey::FeeReceiver, receiver);
}

pub fn read_native_asset(env: &Env) -> Result<Address, Error> {
    read_address(env, &DataKey::NativeAsset)
}

pub fn read_state(env: &Env) -> Result<VaultState, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)
}

pub fn write_state(env: &Env, state: &VaultState) {
    env.storage().persistent().set(&DataKey::State, state);
    bump_ttl(env, &DataKey::State);
}

pub fn read_params(env: &Env) -> Result<VaultParams, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Params)
        .ok_or(Error::NotInitialized)
}

pub fn write_params(env: &Env, params: &VaultParams) {
    env.storage().persistent().set(&DataKey::Params, params);
    bump_ttl(env, &DataKey::Params);
}

pub fn is_borrower(env: &Env, borrower: &Address) -> bool {
    let key = DataKey::Borrower(borrower.clone());
    bump_ttl(env, &key);
    env.storage().persistent().get(&key).unwrap_or(false)
}

pub fn write_borrower(env: &Env, borrower: &Address, allowed: bool) {
    let key = DataKey::Borrower(borrower.clone());
    if allowed {
        env.storage().persistent().set(&key, &true);
        bump_ttl(env, &key);
    } else {
        env.storage().persistent().remove(&key);
    }
}

pub fn read_debt_proportion(env: &Env, borrower: &Address) -> u128 {
    let key = DataKey::DebtProportion(borrower.clone());
    bump_ttl(env, &key);
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn write_debt_proportion(env: &Env, borrower: &Address, proportion: u128) {
    let key = DataKey::DebtProportion(borrower.clone());
    if proportion == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &proportion);
        bump_ttl(env, &key);
    }
}

pub fn has_rise_token(env: &Env, token: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::RiseToken(token.clone()))
}

pub fn read_rise_token(env: &Env, token: &Address) -> Result<RiseTokenMetadata, Error> {
    let key = DataKey::RiseToken(token.clone());
    bump_ttl(env, &key);
    env.storage()
        .persistent()
        .get(&key)
        .ok_or(Error::RiseTokenNotFound)
}

pub fn write_rise_token(env: &Env, metadata: &RiseTokenMetadata) {
    let key = DataKey::RiseToken(metadata.token.clone());
    env.storage().persistent().set(&key, metadata);
    bump_ttl(env, &key);
}

pub fn share_balance(env: &Env, owner: &Address) -> u128 {
    TokenBase::balance(env, owner).max(0) as u128
}

pub fn total_shares(env: &Env) -> u128 {
    TokenBase::total_supply(env).max(0) as u128
}
