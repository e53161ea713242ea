#![no_std]
//! 18-decimal fixed-point helpers shared by the Rise contracts.
//!
//! Every operation rounds toward zero and reports overflow instead of wrapping.
//! Products that do not fit in `u128` are retried on the host's 256-bit integers.

use soroban_sdk::{Env, U256};

pub const ONE: u128 = 1_000_000_000_000_000_000u128; // 1e18
pub const SECONDS_PER_YEAR: u128 = 365 * 24 * 60 * 60;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MathError {
    Overflow,
    DivisionByZero,
}

/// floor(a * b / denominator)
pub fn mul_div_floor(env: &Env, a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    if a == 0 || b == 0 {
        return Ok(0);
    }
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }
    let wide = U256::from_u128(env, a)
        .mul(&U256::from_u128(env, b))
        .div(&U256::from_u128(env, denominator));
    wide.to_u128().ok_or(MathError::Overflow)
}

/// floor(a * b / 1e18)
pub fn mul_fixed(env: &Env, a: u128, b: u128) -> Result<u128, MathError> {
    mul_div_floor(env, a, b, ONE)
}

/// floor(a * 1e18 / b)
pub fn div_fixed(env: &Env, a: u128, b: u128) -> Result<u128, MathError> {
    mul_div_floor(env, a, ONE, b)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_sub(b).ok_or(MathError::Overflow)
}

pub fn checked_mul(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

/// 10^decimals, used to scale token amounts by their precision.
pub fn pow10(decimals: u32) -> Result<u128, MathError> {
    10u128.checked_pow(decimals).ok_or(MathError::Overflow)
}
