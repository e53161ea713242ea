use rise_math::{checked_add, mul_fixed};
use soroban_sdk::{token, Address, Env, InvokeError, Symbol, TryFromVal, Val, Vec};

use crate::errors::Error;
use crate::storage::{read_governor, DataKey};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CallErrorKind {
    ContractRevert,
    HostError,
}

/// Invokes `func` on an untrusted collaborator without letting its failure abort the caller.
pub(crate) fn try_call_contract<T>(
    env: &Env,
    contract: &Address,
    func: &str,
    args: Vec<Val>,
) -> Result<T, CallErrorKind>
where
    T: TryFromVal<Env, Val>,
{
    let symbol = Symbol::new(env, func);
    match env.try_invoke_contract::<T, InvokeError>(contract, &symbol, args) {
        Ok(Ok(val)) => Ok(val),
        Ok(Err(_)) => Err(CallErrorKind::ContractRevert),
        Err(Ok(_)) | Err(Err(_)) => Err(CallErrorKind::HostError),
    }
}

pub fn to_i128(amount: u128) -> Result<i128, Error> {
    i128::try_from(amount).map_err(|_| Error::ArithmeticError)
}

pub fn to_u128(amount: i128) -> Result<u128, Error> {
    u128::try_from(amount).map_err(|_| Error::ArithmeticError)
}

pub fn token_balance(env: &Env, asset: &Address, owner: &Address) -> Result<u128, Error> {
    to_u128(token::Client::new(env, asset).balance(owner))
}

/// `value` widened by the slippage tolerance.
pub fn with_slippage(env: &Env, value: u128, max_slippage: u128) -> Result<u128, Error> {
    Ok(checked_add(value, mul_fixed(env, value, max_slippage)?)?)
}

pub fn require_governor(env: &Env, caller: &Address) -> Result<(), Error> {
    let governor = read_governor(env)?;
    if governor != *caller {
        return Err(Error::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}

/// Runs `f` with the vault locked against nested entry.
pub fn non_reentrant<T>(env: &Env, f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    if env
        .storage()
        .instance()
        .get::<_, bool>(&DataKey::Locked)
        .unwrap_or(false)
    {
        return Err(Error::Reentrant);
    }
    env.storage().instance().set(&DataKey::Locked, &true);
    let result = f();
    env.storage().instance().remove(&DataKey::Locked);
    result
}
