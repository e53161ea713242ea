#![no_std]

mod constants;
mod contract;
mod engine;
mod errors;
mod events;
mod helpers;
mod ledger;
mod rate_model;
mod storage;

pub use contract::{RiseVault, RiseVaultClient};
pub use errors::Error;
pub use storage::{RiseTokenConfig, RiseTokenMetadata, RiseTokenParams, VaultParams, VaultState};

#[cfg(test)]
mod test_rise;
