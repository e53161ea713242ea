#![no_std]

use rise_math::mul_div_floor;
use soroban_sdk::{contract, contractimpl, contracttype, token, Address, Env};

#[contracttype]
enum SwapKey {
    Rate(Address, Address),
}

/// Price of one unit of `token_out` expressed in `token_in` units,
/// as `numerator / denominator`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapRate {
    pub numerator: u128,
    pub denominator: u128,
}

/// Exact-output router that fills orders from its own inventory at a fixed rate.
#[contract]
pub struct MockSwap;

#[contractimpl]
impl MockSwap {
    pub fn set_rate(
        env: Env,
        token_in: Address,
        token_out: Address,
        numerator: u128,
        denominator: u128,
    ) {
        if denominator == 0 {
            panic!("bad rate");
        }
        env.storage().persistent().set(
            &SwapKey::Rate(token_in, token_out),
            &SwapRate {
                numerator,
                denominator,
            },
        );
    }

    pub fn quote(env: Env, token_in: Address, token_out: Address, amount_out: u128) -> u128 {
        let rate: SwapRate = env
            .storage()
            .persistent()
            .get(&SwapKey::Rate(token_in, token_out))
            .expect("rate not set");
        mul_div_floor(&env, amount_out, rate.numerator, rate.denominator).expect("rate overflow")
    }

    /// Pulls the input from `from` through its allowance and delivers exactly `amount_out`.
    pub fn swap(
        env: Env,
        from: Address,
        token_in: Address,
        token_out: Address,
        max_amount_in: u128,
        amount_out: u128,
    ) -> u128 {
        from.require_auth();
        let amount_in = Self::quote(env.clone(), token_in.clone(), token_out.clone(), amount_out);
        if amount_in > max_amount_in {
            panic!("excessive input amount");
        }
        let router = env.current_contract_address();
        if amount_in > 0 {
            token::Client::new(&env, &token_in).transfer_from(
                &router,
                &from,
                &router,
                &(amount_in as i128),
            );
        }
        token::Client::new(&env, &token_out).transfer(&router, &from, &(amount_out as i128));
        amount_in
    }
}
