use rise_math::{div_fixed, mul_div_floor, mul_fixed};
use soroban_sdk::{contract, contractimpl, token, Address, Env, String};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::Base as TokenBase;

use crate::constants::*;
use crate::engine;
use crate::errors::Error;
use crate::events::*;
use crate::helpers::*;
use crate::ledger;
use crate::rate_model;
use crate::storage::*;

#[contract]
pub struct RiseVault;

#[contractimpl]
impl RiseVault {
    /// Sets up the pool for `underlying`. Vault shares inherit the underlying's decimals.
    pub fn initialize(
        env: Env,
        governor: Address,
        underlying: Address,
        fee_receiver: Address,
        native_asset: Address,
        name: String,
        symbol: String,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        governor.require_auth();
        let decimals = token::Client::new(&env, &underlying).decimals();

        let storage = env.storage().persistent();
        storage.set(&DataKey::Initialized, &true);
        storage.set(&DataKey::UnderlyingToken, &underlying);
        storage.set(&DataKey::NativeAsset, &native_asset);
        write_governor(&env, &governor);
        write_fee_receiver(&env, &fee_receiver);
        write_params(
            &env,
            &VaultParams {
                optimal_utilization: DEFAULT_OPTIMAL_UTILIZATION,
                interest_slope_1: DEFAULT_INTEREST_SLOPE_1,
                interest_slope_2: DEFAULT_INTEREST_SLOPE_2,
                max_borrow_rate_per_second: DEFAULT_MAX_BORROW_RATE_PER_SECOND,
                performance_fee: DEFAULT_PERFORMANCE_FEE,
            },
        );
        write_state(
            &env,
            &VaultState {
                total_outstanding_debt: 0,
                total_debt_proportion: 0,
                total_pending_fees: 0,
                last_accrual_timestamp: env.ledger().timestamp(),
            },
        );
        TokenBase::set_metadata(&env, decimals, name, symbol);
        bump_core_ttl(&env);
        Ok(())
    }

    // Lending

    /// Deposit underlying and receive vault shares at the current exchange rate.
    pub fn supply(env: Env, lender: Address, amount: u128) -> Result<u128, Error> {
        non_reentrant(&env, || {
            let underlying = ensure_initialized(&env)?;
            lender.require_auth();
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            let state = ledger::accrue_interest(&env)?;
            if token_balance(&env, &underlying, &lender)? < amount {
                return Err(Error::InsufficientBalance);
            }
            let rate = ledger::exchange_rate(&env, &underlying, &state)?;
            let shares = div_fixed(&env, amount, rate)?;
            if shares == 0 {
                return Err(Error::ZeroAmount);
            }

            token::Client::new(&env, &underlying).transfer(
                &lender,
                &env.current_contract_address(),
                &to_i128(amount)?,
            );
            TokenBase::mint(&env, &lender, to_i128(shares)?);

            Supply {
                lender: lender.clone(),
                amount,
                shares,
            }
            .publish(&env);
            Ok(shares)
        })
    }

    /// Burn vault shares for underlying at the current exchange rate.
    pub fn withdraw(env: Env, lender: Address, shares: u128) -> Result<u128, Error> {
        non_reentrant(&env, || {
            let underlying = ensure_initialized(&env)?;
            lender.require_auth();
            if shares == 0 {
                return Err(Error::ZeroAmount);
            }
            let state = ledger::accrue_interest(&env)?;
            if share_balance(&env, &lender) < shares {
                return Err(Error::InsufficientBalance);
            }
            let rate = ledger::exchange_rate(&env, &underlying, &state)?;
            let amount = mul_fixed(&env, shares, rate)?;
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            if amount > ledger::available_cash(&env, &underlying, &state)? {
                return Err(Error::InsufficientLiquidity);
            }

            let shares_i128 = to_i128(shares)?;
            TokenBase::update(&env, Some(&lender), None, shares_i128);
            emit_burn(&env, &lender, shares_i128);
            token::Client::new(&env, &underlying).transfer(
                &env.current_contract_address(),
                &lender,
                &to_i128(amount)?,
            );

            Withdraw {
                lender: lender.clone(),
                amount,
                shares,
            }
            .publish(&env);
            Ok(amount)
        })
    }

    /// Borrowers granted by the governor draw underlying against the pool.
    pub fn borrow(env: Env, borrower: Address, amount: u128) -> Result<(), Error> {
        non_reentrant(&env, || {
            let underlying = ensure_initialized(&env)?;
            borrower.require_auth();
            if !is_borrower(&env, &borrower) {
                return Err(Error::Unauthorized);
            }
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            let mut state = ledger::accrue_interest(&env)?;
            if amount > ledger::available_cash(&env, &underlying, &state)? {
                return Err(Error::InsufficientLiquidity);
            }
            ledger::record_borrow(&env, &mut state, &borrower, amount)?;
            write_state(&env, &state);

            token::Client::new(&env, &underlying).transfer(
                &env.current_contract_address(),
                &borrower,
                &to_i128(amount)?,
            );
            Ok(())
        })
    }

    /// Repays up to `amount`; anything above the outstanding debt is not pulled.
    pub fn repay(env: Env, borrower: Address, amount: u128) -> Result<u128, Error> {
        non_reentrant(&env, || {
            let underlying = ensure_initialized(&env)?;
            borrower.require_auth();
            if !is_borrower(&env, &borrower) {
                return Err(Error::Unauthorized);
            }
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            let mut state = ledger::accrue_interest(&env)?;
            let debt = ledger::debt_of(&env, &state, &borrower)?;
            if token_balance(&env, &underlying, &borrower)? < amount.min(debt) {
                return Err(Error::InsufficientBalance);
            }
            let repaid = ledger::record_repay(&env, &mut state, &borrower, amount)?;
            write_state(&env, &state);

            if repaid > 0 {
                token::Client::new(&env, &underlying).transfer(
                    &borrower,
                    &env.current_contract_address(),
                    &to_i128(repaid)?,
                );
            }
            Ok(repaid)
        })
    }

    /// Checkpoints interest. Anyone may call it.
    pub fn accrue_interest(env: Env) -> Result<(), Error> {
        ledger::accrue_interest(&env)?;
        Ok(())
    }

    /// Sweeps the protocol's share of interest to the fee receiver.
    pub fn collect_pending_fees(env: Env) -> Result<u128, Error> {
        non_reentrant(&env, || {
            let underlying = ensure_initialized(&env)?;
            let mut state = ledger::accrue_interest(&env)?;
            let amount = state.total_pending_fees;
            if amount == 0 {
                return Ok(0);
            }
            let vault = env.current_contract_address();
            if token_balance(&env, &underlying, &vault)? < amount {
                return Err(Error::InsufficientLiquidity);
            }
            let receiver = read_fee_receiver(&env)?;
            state.total_pending_fees = 0;
            write_state(&env, &state);

            token::Client::new(&env, &underlying).transfer(&vault, &receiver, &to_i128(amount)?);
            FeesCollected { receiver, amount }.publish(&env);
            Ok(amount)
        })
    }

    // Governance

    pub fn set_governor(env: Env, governor: Address, new_governor: Address) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_governor(&env, &governor)?;
        write_governor(&env, &new_governor);
        GovernorUpdated {
            governor: new_governor,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_as_borrower(
        env: Env,
        governor: Address,
        borrower: Address,
        allowed: bool,
    ) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_governor(&env, &governor)?;
        write_borrower(&env, &borrower, allowed);
        BorrowerUpdated { borrower, allowed }.publish(&env);
        Ok(())
    }

    /// Interest already earned is settled under the old curve before the new one applies.
    pub fn set_vault_parameters(
        env: Env,
        governor: Address,
        params: VaultParams,
    ) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_governor(&env, &governor)?;
        rate_model::validate(&params)?;
        ledger::accrue_interest(&env)?;
        write_params(&env, &params);
        VaultParametersUpdated {
            optimal_utilization: params.optimal_utilization,
            interest_slope_1: params.interest_slope_1,
            interest_slope_2: params.interest_slope_2,
            max_borrow_rate_per_second: params.max_borrow_rate_per_second,
            performance_fee: params.performance_fee,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_fee_receiver(env: Env, governor: Address, receiver: Address) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_governor(&env, &governor)?;
        write_fee_receiver(&env, &receiver);
        FeeReceiverUpdated { receiver }.publish(&env);
        Ok(())
    }

    // Vault views

    pub fn get_exchange_rate(env: Env) -> Result<u128, Error> {
        let underlying = ensure_initialized(&env)?;
        let accrual = ledger::project(&env, &underlying)?;
        ledger::exchange_rate(&env, &underlying, &accrual.state)
    }

    pub fn get_total_available_cash(env: Env) -> Result<u128, Error> {
        let underlying = ensure_initialized(&env)?;
        let accrual = ledger::project(&env, &underlying)?;
        ledger::available_cash(&env, &underlying, &accrual.state)
    }

    pub fn get_utilization_rate(env: Env) -> Result<u128, Error> {
        let underlying = ensure_initialized(&env)?;
        let accrual = ledger::project(&env, &underlying)?;
        ledger::current_utilization(&env, &underlying, &accrual.state)
    }

    pub fn get_borrow_rate_per_second(env: Env) -> Result<u128, Error> {
        let underlying = ensure_initialized(&env)?;
        let accrual = ledger::project(&env, &underlying)?;
        let utilization = ledger::current_utilization(&env, &underlying, &accrual.state)?;
        rate_model::borrow_rate_per_second(&env, &read_params(&env)?, utilization)
    }

    pub fn get_supply_rate_per_second(env: Env) -> Result<u128, Error> {
        let underlying = ensure_initialized(&env)?;
        let accrual = ledger::project(&env, &underlying)?;
        let params = read_params(&env)?;
        let utilization = ledger::current_utilization(&env, &underlying, &accrual.state)?;
        let borrow_rate = rate_model::borrow_rate_per_second(&env, &params, utilization)?;
        rate_model::supply_rate_per_second(&env, &params, utilization, borrow_rate)
    }

    pub fn get_outstanding_debt(env: Env, borrower: Address) -> Result<u128, Error> {
        let underlying = ensure_initialized(&env)?;
        let accrual = ledger::project(&env, &underlying)?;
        ledger::debt_of(&env, &accrual.state, &borrower)
    }

    pub fn get_debt_proportion(env: Env, borrower: Address) -> u128 {
        read_debt_proportion(&env, &borrower)
    }

    /// Stored state brought forward to the current timestamp.
    pub fn get_vault_state(env: Env) -> Result<VaultState, Error> {
        let underlying = ensure_initialized(&env)?;
        Ok(ledger::project(&env, &underlying)?.state)
    }

    pub fn get_vault_parameters(env: Env) -> Result<VaultParams, Error> {
        read_params(&env)
    }

    pub fn get_governor(env: Env) -> Result<Address, Error> {
        read_governor(&env)
    }

    pub fn get_fee_receiver(env: Env) -> Result<Address, Error> {
        read_fee_receiver(&env)
    }

    pub fn get_underlying_token(env: Env) -> Result<Address, Error> {
        ensure_initialized(&env)
    }

    pub fn is_borrower(env: Env, borrower: Address) -> bool {
        crate::storage::is_borrower(&env, &borrower)
    }

    /// Underlying redeemable for `lender`'s shares right now.
    pub fn get_lender_value(env: Env, lender: Address) -> Result<u128, Error> {
        let rate = Self::get_exchange_rate(env.clone())?;
        Ok(mul_fixed(&env, share_balance(&env, &lender), rate)?)
    }

    pub fn get_share_balance(env: Env, lender: Address) -> u128 {
        share_balance(&env, &lender)
    }

    pub fn get_total_shares(env: Env) -> u128 {
        total_shares(&env)
    }

    // Vault share token

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn total_supply(env: Env) -> u128 {
        total_shares(&env)
    }

    pub fn balance(env: Env, id: Address) -> u128 {
        share_balance(&env, &id)
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> u128 {
        TokenBase::allowance(&env, &owner, &spender).max(0) as u128
    }

    /// The allowance lapses after `live_until_ledger`.
    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        amount: u128,
        live_until_ledger: u32,
    ) -> Result<(), Error> {
        let now = env.ledger();
        if live_until_ledger > now.max_live_until_ledger()
            || (amount > 0 && live_until_ledger < now.sequence())
        {
            return Err(Error::InvalidParameter);
        }
        TokenBase::approve(&env, &owner, &spender, to_i128(amount)?, live_until_ledger);
        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: u128) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }
        if share_balance(&env, &from) < amount {
            return Err(Error::InsufficientBalance);
        }
        TokenBase::transfer(&env, &from, &to, to_i128(amount)?);
        Ok(())
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        owner: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), Error> {
        if amount == 0 {
            return Ok(());
        }
        if share_balance(&env, &owner) < amount {
            return Err(Error::InsufficientBalance);
        }
        TokenBase::transfer_from(&env, &spender, &owner, &to, to_i128(amount)?);
        Ok(())
    }

    // Leveraged tokens

    /// Registers a RISE token whose supply this vault controls.
    pub fn create(env: Env, governor: Address, config: RiseTokenConfig) -> Result<(), Error> {
        let underlying = ensure_initialized(&env)?;
        require_governor(&env, &governor)?;
        engine::create(&env, &underlying, config)
    }

    /// Mint against a token collateral. `minter` pays, `recipient` receives the shares.
    pub fn mint(
        env: Env,
        token: Address,
        minter: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<u128, Error> {
        non_reentrant(&env, || {
            engine::mint(&env, &token, &minter, &recipient, amount, false)
        })
    }

    /// Mint against the native asset.
    pub fn mint_native(
        env: Env,
        token: Address,
        minter: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<u128, Error> {
        non_reentrant(&env, || {
            engine::mint(&env, &token, &minter, &recipient, amount, true)
        })
    }

    /// Burn shares for their slice of collateral after repaying their slice of debt.
    pub fn redeem(
        env: Env,
        token: Address,
        redeemer: Address,
        recipient: Address,
        shares: u128,
    ) -> Result<u128, Error> {
        non_reentrant(&env, || {
            engine::redeem(&env, &token, &redeemer, &recipient, shares)
        })
    }

    /// Permissionless. Nudges leverage back into the configured band.
    pub fn rebalance(env: Env, token: Address) -> Result<(), Error> {
        non_reentrant(&env, || engine::rebalance(&env, &token))
    }

    pub fn collect_rise_token_fees(env: Env, token: Address) -> Result<u128, Error> {
        non_reentrant(&env, || engine::collect_fees(&env, &token))
    }

    pub fn set_rise_token_parameters(
        env: Env,
        governor: Address,
        token: Address,
        params: RiseTokenParams,
    ) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_governor(&env, &governor)?;
        engine::set_params(&env, &token, params)
    }

    // Leveraged token views

    pub fn get_rise_token(env: Env, token: Address) -> Result<RiseTokenMetadata, Error> {
        read_rise_token(&env, &token)
    }

    pub fn get_nav(env: Env, token: Address) -> Result<u128, Error> {
        let (metadata, position) = Self::project_position(&env, &token)?;
        engine::nav(&env, &metadata, &position)
    }

    pub fn get_leverage_ratio(env: Env, token: Address) -> Result<u128, Error> {
        let (_, position) = Self::project_position(&env, &token)?;
        engine::leverage_ratio(&env, &position)
    }

    pub fn get_collateral_per_share(env: Env, token: Address) -> Result<u128, Error> {
        let (_, position) = Self::project_position(&env, &token)?;
        if position.supply == 0 {
            return Ok(0);
        }
        Ok(mul_div_floor(&env, position.collateral, ONE, position.supply)?)
    }

    pub fn get_debt_per_share(env: Env, token: Address) -> Result<u128, Error> {
        let (_, position) = Self::project_position(&env, &token)?;
        if position.supply == 0 {
            return Ok(0);
        }
        Ok(mul_div_floor(&env, position.debt, ONE, position.supply)?)
    }

    /// Collateral value minus debt for the whole token, in underlying units.
    pub fn get_rise_token_equity(env: Env, token: Address) -> Result<u128, Error> {
        let (_, position) = Self::project_position(&env, &token)?;
        Ok(position.value.saturating_sub(position.debt))
    }
}

impl RiseVault {
    fn project_position(
        env: &Env,
        token: &Address,
    ) -> Result<(RiseTokenMetadata, engine::Position), Error> {
        let underlying = ensure_initialized(env)?;
        let metadata = read_rise_token(env, token)?;
        let accrual = ledger::project(env, &underlying)?;
        let position = engine::position(env, &metadata, &accrual.state)?;
        Ok((metadata, position))
    }
}
