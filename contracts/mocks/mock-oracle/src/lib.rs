#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, Env};

#[contracttype]
enum OracleKey {
    Price,
}

/// Single-feed oracle quoting collateral in underlying units per whole collateral token.
#[contract]
pub struct MockOracle;

#[contractimpl]
impl MockOracle {
    pub fn set_price(env: Env, price: u128) {
        env.storage().persistent().set(&OracleKey::Price, &price);
    }

    pub fn get_price(env: Env) -> u128 {
        env.storage()
            .persistent()
            .get(&OracleKey::Price)
            .expect("price not set")
    }
}
