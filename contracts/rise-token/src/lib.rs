#![no_std]
//! Share token for a single leveraged position.
//!
//! Supply is controlled entirely by the owner (the Rise vault): it mints on
//! issuance and burns on redemption. Holders can move balances freely.

use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, String};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::Base as TokenBase;

pub const RISE_DECIMALS: u32 = 18;

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[contracttype]
pub enum DataKey {
    Owner,
}

#[contract]
pub struct RiseToken;

#[contractimpl]
impl RiseToken {
    pub fn initialize(env: Env, owner: Address, name: String, symbol: String) {
        if env
            .storage()
            .persistent()
            .get::<_, Address>(&DataKey::Owner)
            .is_some()
        {
            panic!("already initialized");
        }
        TokenBase::set_metadata(&env, RISE_DECIMALS, name, symbol);
        env.storage().persistent().set(&DataKey::Owner, &owner);
        bump_owner_ttl(&env);
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        TokenBase::balance(&env, &id)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        TokenBase::allowance(&env, &owner, &spender)
    }

    pub fn approve(env: Env, owner: Address, spender: Address, amount: i128, live_until_ledger: u32) {
        if amount < 0 {
            panic!("bad amount");
        }
        TokenBase::approve(&env, &owner, &spender, amount, live_until_ledger);
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        if amount <= 0 {
            panic!("bad amount");
        }
        TokenBase::transfer(&env, &from, &to, amount);
    }

    pub fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        if amount <= 0 {
            panic!("bad amount");
        }
        TokenBase::transfer_from(&env, &spender, &from, &to, amount);
    }

    /// Owner only.
    pub fn mint(env: Env, to: Address, amount: i128) {
        require_owner(&env);
        if amount <= 0 {
            panic!("bad amount");
        }
        TokenBase::mint(&env, &to, amount);
    }

    /// Owner only. Holders redeem through the owner rather than burning directly.
    pub fn burn(env: Env, from: Address, amount: i128) {
        require_owner(&env);
        if amount <= 0 {
            panic!("bad amount");
        }
        if TokenBase::balance(&env, &from) < amount {
            panic!("insufficient balance");
        }
        TokenBase::update(&env, Some(&from), None, amount);
        emit_burn(&env, &from, amount);
    }

    pub fn owner(env: Env) -> Address {
        bump_owner_ttl(&env);
        env.storage()
            .persistent()
            .get(&DataKey::Owner)
            .expect("no owner")
    }

    pub fn set_owner(env: Env, new_owner: Address) {
        require_owner(&env);
        env.storage().persistent().set(&DataKey::Owner, &new_owner);
        bump_owner_ttl(&env);
    }
}

fn require_owner(env: &Env) -> Address {
    let owner: Address = env
        .storage()
        .persistent()
        .get(&DataKey::Owner)
        .expect("no owner");
    owner.require_auth();
    bump_owner_ttl(env);
    owner
}

fn bump_owner_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    if persistent.has(&DataKey::Owner) {
        persistent.extend_ttl(&DataKey::Owner, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
