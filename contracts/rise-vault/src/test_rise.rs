#![cfg(test)]

use super::*;
use crate::constants::*;
use crate::test::{advance, create_asset};
use mock_asset::MockAssetClient;
use mock_oracle::{MockOracle, MockOracleClient};
use mock_swap::{MockSwap, MockSwapClient};
use rise_token::{RiseToken, RiseTokenClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{Address, Env, String};

const START: u64 = 1_700_000_000;
const DAY: u64 = 86_400;
const WETH: u128 = 1_000_000_000_000_000_000;
const LIQUIDITY: u128 = 1_000_000_000_000;
const INITIAL_PRICE: u128 = 100_000_000;

const FIRST_MINT_SHARES: u128 = 39_764_215_980_000_000_000;
const FIRST_MINT_DEBT: u128 = 4_015_578_402;

struct RiseFixture<'a> {
    vault: RiseVaultClient<'a>,
    usdc: MockAssetClient<'a>,
    weth: MockAssetClient<'a>,
    native: MockAssetClient<'a>,
    oracle: MockOracleClient<'a>,
    swap: MockSwapClient<'a>,
    rise: RiseTokenClient<'a>,
    governor: Address,
    fee_receiver: Address,
    lender: Address,
}

fn default_params() -> RiseTokenParams {
    RiseTokenParams {
        fee: 1_000_000_000_000_000,
        min_leverage_ratio: 1_700_000_000_000_000_000,
        max_leverage_ratio: 2_300_000_000_000_000_000,
        max_rebalance_value: 1_000_000_000_000,
        rebalancing_step: 200_000_000_000_000_000,
        max_slippage: 10_000_000_000_000_000,
    }
}

fn deploy_rise<'a>(env: &'a Env, owner: &Address, symbol: &str) -> RiseTokenClient<'a> {
    let id = env.register(RiseToken, ());
    let client = RiseTokenClient::new(env, &id);
    client.initialize(
        owner,
        &String::from_str(env, symbol),
        &String::from_str(env, symbol),
    );
    client
}

fn deploy_oracle(env: &Env) -> MockOracleClient<'_> {
    let id = env.register(MockOracle, ());
    MockOracleClient::new(env, &id)
}

fn config(f: &RiseFixture, token: &Address) -> RiseTokenConfig {
    RiseTokenConfig {
        is_native: false,
        token: token.clone(),
        collateral: f.weth.address.clone(),
        oracle: f.oracle.address.clone(),
        swap: f.swap.address.clone(),
        initial_price: INITIAL_PRICE,
        params: default_params(),
    }
}

/// A funded vault with an ETH 2x token registered at 4000 USDC per WETH.
fn setup(env: &Env) -> RiseFixture<'_> {
    env.mock_all_auths();
    env.ledger().with_mut(|l| l.timestamp = START);
    let governor = Address::generate(env);
    let fee_receiver = Address::generate(env);
    let native = create_asset(env, "XLM", 7);
    let usdc = create_asset(env, "USDC", 6);
    let weth = create_asset(env, "WETH", 18);

    let id = env.register(RiseVault, ());
    let vault = RiseVaultClient::new(env, &id);
    vault.initialize(
        &governor,
        &usdc.address,
        &fee_receiver,
        &native.address,
        &String::from_str(env, "Rise Vault USDC"),
        &String::from_str(env, "rvUSDC"),
    );

    let lender = Address::generate(env);
    usdc.mint(&lender, &(LIQUIDITY as i128));
    vault.supply(&lender, &LIQUIDITY);

    let oracle = deploy_oracle(env);
    oracle.set_price(&4_000_000_000);

    let swap_id = env.register(MockSwap, ());
    let swap = MockSwapClient::new(env, &swap_id);
    weth.mint(&swap.address, &(1_000 * WETH as i128));
    usdc.mint(&swap.address, &1_000_000_000_000);
    // 0.49% over the oracle price when buying WETH.
    swap.set_rate(&usdc.address, &weth.address, &4_019_598_001, &WETH);

    let rise = deploy_rise(env, &vault.address, "ETHRISE");
    let f = RiseFixture {
        vault,
        usdc,
        weth,
        native,
        oracle,
        swap,
        rise,
        governor,
        fee_receiver,
        lender,
    };
    f.vault.create(&f.governor, &config(&f, &f.rise.address));
    f
}

fn minter_with(env: &Env, f: &RiseFixture, amount: u128) -> Address {
    let minter = Address::generate(env);
    f.weth.mint(&minter, &(amount as i128));
    minter
}

fn first_mint(env: &Env, f: &RiseFixture) -> Address {
    let minter = minter_with(env, f, WETH);
    f.vault.mint(&f.rise.address, &minter, &minter, &WETH);
    minter
}

#[test]
fn test_create_registers_token() {
    let env = Env::default();
    let f = setup(&env);

    let metadata = f.vault.get_rise_token(&f.rise.address);
    assert!(!metadata.is_native);
    assert_eq!(metadata.collateral, f.weth.address);
    assert_eq!(metadata.collateral_decimals, 18);
    assert_eq!(metadata.params, default_params());
    assert_eq!(metadata.total_collateral, 0);
    assert_eq!(metadata.last_rebalance_timestamp, 0);
    assert!(!metadata.partial_rebalance);

    assert_eq!(f.vault.get_nav(&f.rise.address), INITIAL_PRICE);
    assert_eq!(f.vault.get_leverage_ratio(&f.rise.address), ONE);
    assert_eq!(f.vault.get_collateral_per_share(&f.rise.address), 0);
    assert_eq!(f.vault.get_rise_token_equity(&f.rise.address), 0);

    let unknown = Address::generate(&env);
    assert_eq!(
        f.vault.try_get_rise_token(&unknown),
        Err(Ok(Error::RiseTokenNotFound))
    );
}

#[test]
fn test_create_validation() {
    let env = Env::default();
    let f = setup(&env);
    let fresh = deploy_rise(&env, &f.vault.address, "BTCRISE");

    let stranger = Address::generate(&env);
    assert_eq!(
        f.vault.try_create(&stranger, &config(&f, &fresh.address)),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(
        f.vault.try_create(&f.governor, &config(&f, &f.rise.address)),
        Err(Ok(Error::RiseTokenAlreadyExists))
    );

    let mut flat = config(&f, &fresh.address);
    flat.params.min_leverage_ratio = ONE;
    assert_eq!(
        f.vault.try_create(&f.governor, &flat),
        Err(Ok(Error::InvalidParameter))
    );

    let mut inverted = config(&f, &fresh.address);
    inverted.params.max_leverage_ratio = inverted.params.min_leverage_ratio;
    assert_eq!(
        f.vault.try_create(&f.governor, &inverted),
        Err(Ok(Error::InvalidParameter))
    );

    let mut unpriced = config(&f, &fresh.address);
    unpriced.initial_price = 0;
    assert_eq!(
        f.vault.try_create(&f.governor, &unpriced),
        Err(Ok(Error::InvalidParameter))
    );

    let mut self_backed = config(&f, &fresh.address);
    self_backed.collateral = f.usdc.address.clone();
    assert_eq!(
        f.vault.try_create(&f.governor, &self_backed),
        Err(Ok(Error::InvalidParameter))
    );

    let mut not_native = config(&f, &fresh.address);
    not_native.is_native = true;
    assert_eq!(
        f.vault.try_create(&f.governor, &not_native),
        Err(Ok(Error::InvalidParameter))
    );

    let mut undeclared_native = config(&f, &fresh.address);
    undeclared_native.collateral = f.native.address.clone();
    assert_eq!(
        f.vault.try_create(&f.governor, &undeclared_native),
        Err(Ok(Error::InvalidParameter))
    );

    // Share tokens must carry 18 decimals.
    let six_decimals = create_asset(&env, "FAKE", 6);
    assert_eq!(
        f.vault.try_create(&f.governor, &config(&f, &six_decimals.address)),
        Err(Ok(Error::InvalidParameter))
    );

    f.vault.create(&f.governor, &config(&f, &fresh.address));
    assert_eq!(f.vault.get_rise_token(&fresh.address).token, fresh.address);
}

#[test]
fn test_first_mint() {
    let env = Env::default();
    let f = setup(&env);
    let minter = minter_with(&env, &f, WETH);
    let recipient = Address::generate(&env);

    let shares = f.vault.mint(&f.rise.address, &minter, &recipient, &WETH);
    assert_eq!(shares, FIRST_MINT_SHARES);
    assert_eq!(f.rise.balance(&recipient), FIRST_MINT_SHARES as i128);
    assert_eq!(f.rise.balance(&minter), 0);
    assert_eq!(f.weth.balance(&minter), 0);

    assert_eq!(f.vault.get_outstanding_debt(&f.rise.address), FIRST_MINT_DEBT);
    assert_eq!(
        f.vault.get_total_available_cash(),
        LIQUIDITY - FIRST_MINT_DEBT
    );

    let metadata = f.vault.get_rise_token(&f.rise.address);
    assert_eq!(metadata.total_collateral, 1_999_000_000_000_000_000);
    assert_eq!(metadata.total_pending_fees, 1_000_000_000_000_000);
    assert_eq!(
        f.weth.balance(&f.vault.address) as u128,
        metadata.total_collateral
    );

    assert_eq!(f.vault.get_nav(&f.rise.address), INITIAL_PRICE);
    assert_eq!(
        f.vault.get_leverage_ratio(&f.rise.address),
        2_009_847_246_584_641_450
    );
    assert_eq!(
        f.vault.get_collateral_per_share(&f.rise.address),
        50_246_181_164_616_036
    );
    assert_eq!(f.vault.get_debt_per_share(&f.rise.address), 100_984_724);
    // Router allowance is cleared after the swap.
    assert_eq!(f.usdc.allowance(&f.vault.address, &f.swap.address), 0);
}

#[test]
fn test_nav_follows_price() {
    let env = Env::default();
    let f = setup(&env);
    first_mint(&env, &f);

    f.oracle.set_price(&4_200_000_000);
    assert_eq!(f.vault.get_nav(&f.rise.address), 110_049_236);
    f.oracle.set_price(&4_100_000_000);
    assert_eq!(f.vault.get_nav(&f.rise.address), 105_024_618);
    f.oracle.set_price(&4_000_000_000);
    assert_eq!(f.vault.get_nav(&f.rise.address), INITIAL_PRICE);
}

#[test]
fn test_second_mint_prices_shares_at_nav() {
    let env = Env::default();
    let f = setup(&env);
    first_mint(&env, &f);

    f.oracle.set_price(&4_200_000_000);
    f.swap
        .set_rate(&f.usdc.address, &f.weth.address, &4_220_577_900, &WETH);
    let second = minter_with(&env, &f, WETH);
    let shares = f.vault.mint(&f.rise.address, &second, &second, &WETH);
    assert_eq!(shares, 37_939_769_777_229_530_244);
    assert!(shares < FIRST_MINT_SHARES);
    assert_eq!(
        f.vault.get_outstanding_debt(&f.rise.address),
        FIRST_MINT_DEBT + 4_216_357_322
    );

    // The second mint books 4216.357322 of debt against 1.998 WETH, so equity
    // at 4100 is 16383.6 - 8231.935724 over 77.70398575722953 shares; a
    // 104.946579 figure only comes out if that debt is left off the books.
    f.oracle.set_price(&4_100_000_000);
    let nav_4100 = f.vault.get_nav(&f.rise.address);
    assert_eq!(nav_4100, 104_906_642);
    f.oracle.set_price(&4_000_000_000);
    let nav_4000 = f.vault.get_nav(&f.rise.address);
    f.oracle.set_price(&4_200_000_000);
    let nav_4200 = f.vault.get_nav(&f.rise.address);
    assert!(nav_4000 < nav_4100 && nav_4100 < nav_4200);
}

#[test]
fn test_mint_rejections() {
    let env = Env::default();
    let f = setup(&env);
    let minter = minter_with(&env, &f, WETH);

    assert_eq!(
        f.vault.try_mint(&f.rise.address, &minter, &minter, &0),
        Err(Ok(Error::ZeroAmount))
    );
    assert_eq!(
        f.vault.try_mint_native(&f.rise.address, &minter, &minter, &WETH),
        Err(Ok(Error::WrongAssetType))
    );
    assert_eq!(
        f.vault.try_mint(&f.rise.address, &minter, &minter, &(2 * WETH)),
        Err(Ok(Error::InsufficientBalance))
    );
    let unknown = Address::generate(&env);
    assert_eq!(
        f.vault.try_mint(&unknown, &minter, &minter, &WETH),
        Err(Ok(Error::RiseTokenNotFound))
    );
}

#[test]
fn test_mint_slippage_leaves_state_untouched() {
    let env = Env::default();
    let f = setup(&env);
    let minter = minter_with(&env, &f, WETH);
    // 2.5% over the oracle, past the 1% tolerance.
    f.swap
        .set_rate(&f.usdc.address, &f.weth.address, &4_100_000_000, &WETH);

    assert_eq!(
        f.vault.try_mint(&f.rise.address, &minter, &minter, &WETH),
        Err(Ok(Error::SlippageTooHigh))
    );
    assert_eq!(f.weth.balance(&minter), WETH as i128);
    assert_eq!(f.rise.total_supply(), 0);
    assert_eq!(f.vault.get_outstanding_debt(&f.rise.address), 0);
    assert_eq!(f.vault.get_total_available_cash(), LIQUIDITY);
    assert_eq!(f.vault.get_rise_token(&f.rise.address).total_collateral, 0);
}

#[test]
fn test_mint_needs_vault_liquidity() {
    let env = Env::default();
    let f = setup(&env);
    f.vault.withdraw(&f.lender, &(LIQUIDITY - 1_000_000_000));
    let minter = minter_with(&env, &f, WETH);

    assert_eq!(
        f.vault.try_mint(&f.rise.address, &minter, &minter, &WETH),
        Err(Ok(Error::InsufficientLiquidity))
    );
}

#[test]
fn test_mint_without_price() {
    let env = Env::default();
    let f = setup(&env);
    let token = deploy_rise(&env, &f.vault.address, "BTCRISE");
    let mut unpriced = config(&f, &token.address);
    unpriced.oracle = deploy_oracle(&env).address;
    f.vault.create(&f.governor, &unpriced);

    let minter = minter_with(&env, &f, WETH);
    assert_eq!(
        f.vault.try_mint(&token.address, &minter, &minter, &WETH),
        Err(Ok(Error::InvalidPrice))
    );
}

#[test]
fn test_native_collateral() {
    let env = Env::default();
    let f = setup(&env);
    let token = deploy_rise(&env, &f.vault.address, "XLMRISE");
    let xlm_oracle = deploy_oracle(&env);
    // 0.10 USDC per XLM.
    xlm_oracle.set_price(&100_000);
    f.native.mint(&f.swap.address, &1_000_000_000_000);
    f.swap
        .set_rate(&f.usdc.address, &f.native.address, &100_200, &10_000_000);
    f.vault.create(
        &f.governor,
        &RiseTokenConfig {
            is_native: true,
            token: token.address.clone(),
            collateral: f.native.address.clone(),
            oracle: xlm_oracle.address.clone(),
            swap: f.swap.address.clone(),
            initial_price: 1_000_000,
            params: default_params(),
        },
    );
    assert_eq!(f.vault.get_rise_token(&token.address).collateral_decimals, 7);

    let minter = Address::generate(&env);
    f.native.mint(&minter, &10_000_000_000);
    assert_eq!(
        f.vault
            .try_mint(&token.address, &minter, &minter, &10_000_000_000),
        Err(Ok(Error::WrongAssetType))
    );

    let shares = f
        .vault
        .mint_native(&token.address, &minter, &minter, &10_000_000_000);
    assert_eq!(shares, 99_700_200_000_000_000_000);
    assert_eq!(f.vault.get_outstanding_debt(&token.address), 100_099_800);
    assert_eq!(f.vault.get_nav(&token.address), 1_000_000);
    assert_eq!(
        f.vault.get_rise_token(&token.address).total_collateral,
        19_990_000_000
    );
}

#[test]
fn test_redeem_everything() {
    let env = Env::default();
    let f = setup(&env);
    let minter = first_mint(&env, &f);
    // Selling WETH costs 0.5% over the oracle.
    f.swap.set_rate(
        &f.weth.address,
        &f.usdc.address,
        &1_005_000_000_000_000_000,
        &4_000_000_000,
    );
    let recipient = Address::generate(&env);

    let out = f
        .vault
        .redeem(&f.rise.address, &minter, &recipient, &FIRST_MINT_SHARES);
    assert_eq!(out, 988_096_840_571_002_500);
    assert_eq!(f.weth.balance(&recipient), out as i128);
    assert_eq!(f.rise.total_supply(), 0);
    assert_eq!(f.vault.get_outstanding_debt(&f.rise.address), 0);
    assert_eq!(f.vault.get_debt_proportion(&f.rise.address), 0);
    assert_eq!(f.vault.get_total_available_cash(), LIQUIDITY);

    let metadata = f.vault.get_rise_token(&f.rise.address);
    assert_eq!(metadata.total_pending_fees, 1_989_085_926_497_500);
    assert_eq!(metadata.total_collateral, metadata.total_pending_fees);
    assert_eq!(
        f.weth.balance(&f.vault.address) as u128,
        metadata.total_collateral
    );
    assert_eq!(f.vault.get_nav(&f.rise.address), INITIAL_PRICE);
}

#[test]
fn test_redeem_rejections() {
    let env = Env::default();
    let f = setup(&env);
    let minter = first_mint(&env, &f);

    assert_eq!(
        f.vault.try_redeem(&f.rise.address, &minter, &minter, &0),
        Err(Ok(Error::ZeroAmount))
    );
    assert_eq!(
        f.vault
            .try_redeem(&f.rise.address, &minter, &minter, &(FIRST_MINT_SHARES + 1)),
        Err(Ok(Error::InsufficientBalance))
    );

    // No sell route configured: the router call fails and nothing moves.
    assert_eq!(
        f.vault
            .try_redeem(&f.rise.address, &minter, &minter, &FIRST_MINT_SHARES),
        Err(Ok(Error::SlippageTooHigh))
    );
    assert_eq!(f.rise.balance(&minter), FIRST_MINT_SHARES as i128);
    assert_eq!(
        f.vault.get_outstanding_debt(&f.rise.address),
        FIRST_MINT_DEBT
    );
}

#[test]
fn test_rebalance_inside_band() {
    let env = Env::default();
    let f = setup(&env);
    assert_eq!(
        f.vault.try_rebalance(&f.rise.address),
        Err(Ok(Error::RebalanceNotNeeded))
    );

    first_mint(&env, &f);
    assert_eq!(
        f.vault.try_rebalance(&f.rise.address),
        Err(Ok(Error::RebalanceNotNeeded))
    );
    assert_eq!(
        f.vault.get_rise_token(&f.rise.address).last_rebalance_timestamp,
        0
    );
}

#[test]
fn test_rebalance_up_after_rally() {
    let env = Env::default();
    let f = setup(&env);
    first_mint(&env, &f);
    f.oracle.set_price(&5_000_000_000);
    f.swap
        .set_rate(&f.usdc.address, &f.weth.address, &5_005_000_000, &WETH);
    assert_eq!(
        f.vault.get_leverage_ratio(&f.rise.address),
        1_672_128_395_382_116_453
    );

    f.vault.rebalance(&f.rise.address);

    assert_eq!(f.vault.get_outstanding_debt(&f.rise.address), 5_211_657_605);
    let metadata = f.vault.get_rise_token(&f.rise.address);
    assert_eq!(metadata.total_collateral, 2_237_976_863_800_000_000);
    assert_eq!(metadata.last_rebalance_timestamp, START);
    assert!(!metadata.partial_rebalance);
    assert_eq!(
        f.vault.get_leverage_ratio(&f.rise.address),
        1_872_502_895_760_671_440
    );

    // Further rally within the same day has to wait.
    f.oracle.set_price(&6_000_000_000);
    f.swap
        .set_rate(&f.usdc.address, &f.weth.address, &6_006_000_000, &WETH);
    let stale = f.vault.get_leverage_ratio(&f.rise.address);
    assert!(stale < default_params().min_leverage_ratio);
    assert_eq!(
        f.vault.try_rebalance(&f.rise.address),
        Err(Ok(Error::RebalanceTooSoon))
    );

    advance(&env, DAY);
    f.vault.rebalance(&f.rise.address);
    assert!(f.vault.get_leverage_ratio(&f.rise.address) > stale);
    assert_eq!(
        f.vault.get_rise_token(&f.rise.address).last_rebalance_timestamp,
        START + DAY
    );
}

#[test]
fn test_rebalance_down_after_drop() {
    let env = Env::default();
    let f = setup(&env);
    first_mint(&env, &f);
    f.oracle.set_price(&3_500_000_000);
    f.swap.set_rate(
        &f.weth.address,
        &f.usdc.address,
        &1_002_000_000_000_000_000,
        &3_500_000_000,
    );
    assert_eq!(
        f.vault.get_leverage_ratio(&f.rise.address),
        2_348_676_453_713_291_025
    );

    f.vault.rebalance(&f.rise.address);

    assert_eq!(f.vault.get_outstanding_debt(&f.rise.address), 3_420_094_083);
    let metadata = f.vault.get_rise_token(&f.rise.address);
    assert_eq!(metadata.total_collateral, 1_828_521_346_389_142_858);
    assert_eq!(
        f.weth.balance(&f.vault.address) as u128,
        metadata.total_collateral
    );
    assert_eq!(
        f.vault.get_leverage_ratio(&f.rise.address),
        2_149_136_108_497_457_439
    );

    f.oracle.set_price(&3_000_000_000);
    f.swap.set_rate(
        &f.weth.address,
        &f.usdc.address,
        &1_002_000_000_000_000_000,
        &3_000_000_000,
    );
    assert_eq!(
        f.vault.try_rebalance(&f.rise.address),
        Err(Ok(Error::RebalanceTooSoon))
    );
    advance(&env, DAY);
    let before = f.vault.get_leverage_ratio(&f.rise.address);
    f.vault.rebalance(&f.rise.address);
    assert!(f.vault.get_leverage_ratio(&f.rise.address) < before);
}

#[test]
fn test_partial_rebalance_continues_immediately() {
    let env = Env::default();
    let f = setup(&env);
    first_mint(&env, &f);
    let mut params = default_params();
    params.max_rebalance_value = 100_000_000;
    f.vault
        .set_rise_token_parameters(&f.governor, &f.rise.address, &params);
    f.oracle.set_price(&5_000_000_000);
    f.swap
        .set_rate(&f.usdc.address, &f.weth.address, &5_005_000_000, &WETH);

    f.vault.rebalance(&f.rise.address);
    assert!(f.vault.get_rise_token(&f.rise.address).partial_rebalance);
    assert_eq!(
        f.vault.get_outstanding_debt(&f.rise.address),
        FIRST_MINT_DEBT + 100_100_000
    );
    assert_eq!(
        f.vault.get_leverage_ratio(&f.rise.address),
        1_688_894_686_114_284_402
    );

    f.vault.rebalance(&f.rise.address);
    assert_eq!(
        f.vault.get_leverage_ratio(&f.rise.address),
        1_705_661_538_134_327_504
    );
    assert_eq!(
        f.vault.try_rebalance(&f.rise.address),
        Err(Ok(Error::RebalanceNotNeeded))
    );
}

#[test]
fn test_rebalance_slippage_reverts() {
    let env = Env::default();
    let f = setup(&env);
    first_mint(&env, &f);
    f.oracle.set_price(&5_000_000_000);
    f.swap
        .set_rate(&f.usdc.address, &f.weth.address, &5_100_000_000, &WETH);

    assert_eq!(
        f.vault.try_rebalance(&f.rise.address),
        Err(Ok(Error::SlippageTooHigh))
    );
    assert_eq!(
        f.vault.get_outstanding_debt(&f.rise.address),
        FIRST_MINT_DEBT
    );
    let metadata = f.vault.get_rise_token(&f.rise.address);
    assert_eq!(metadata.total_collateral, 1_999_000_000_000_000_000);
    assert_eq!(metadata.last_rebalance_timestamp, 0);
}

#[test]
fn test_collapsed_position() {
    let env = Env::default();
    let f = setup(&env);
    let minter = first_mint(&env, &f);
    f.oracle.set_price(&2_000_000_000);

    assert_eq!(
        f.vault.try_get_nav(&f.rise.address),
        Err(Ok(Error::NavCollapsed))
    );
    assert_eq!(f.vault.get_rise_token_equity(&f.rise.address), 0);
    assert_eq!(
        f.vault
            .try_redeem(&f.rise.address, &minter, &minter, &FIRST_MINT_SHARES),
        Err(Ok(Error::NavCollapsed))
    );
    assert_eq!(
        f.vault.try_rebalance(&f.rise.address),
        Err(Ok(Error::NavCollapsed))
    );
    let late = minter_with(&env, &f, WETH);
    assert_eq!(
        f.vault.try_mint(&f.rise.address, &late, &late, &WETH),
        Err(Ok(Error::NavCollapsed))
    );
}

#[test]
fn test_collect_rise_token_fees() {
    let env = Env::default();
    let f = setup(&env);
    assert_eq!(f.vault.collect_rise_token_fees(&f.rise.address), 0);
    first_mint(&env, &f);

    let collected = f.vault.collect_rise_token_fees(&f.rise.address);
    assert_eq!(collected, 1_000_000_000_000_000);
    assert_eq!(f.weth.balance(&f.fee_receiver), collected as i128);
    let metadata = f.vault.get_rise_token(&f.rise.address);
    assert_eq!(metadata.total_pending_fees, 0);
    assert_eq!(metadata.total_collateral, 1_998_000_000_000_000_000);
    assert_eq!(f.vault.get_nav(&f.rise.address), INITIAL_PRICE);
}

#[test]
fn test_set_rise_token_parameters() {
    let env = Env::default();
    let f = setup(&env);
    let mut params = default_params();
    params.fee = 2_000_000_000_000_000;
    params.rebalancing_step = 100_000_000_000_000_000;

    let stranger = Address::generate(&env);
    assert_eq!(
        f.vault
            .try_set_rise_token_parameters(&stranger, &f.rise.address, &params),
        Err(Ok(Error::Unauthorized))
    );

    let mut zero_step = params.clone();
    zero_step.rebalancing_step = 0;
    assert_eq!(
        f.vault
            .try_set_rise_token_parameters(&f.governor, &f.rise.address, &zero_step),
        Err(Ok(Error::InvalidParameter))
    );

    let unknown = Address::generate(&env);
    assert_eq!(
        f.vault
            .try_set_rise_token_parameters(&f.governor, &unknown, &params),
        Err(Ok(Error::RiseTokenNotFound))
    );

    f.vault
        .set_rise_token_parameters(&f.governor, &f.rise.address, &params);
    assert_eq!(f.vault.get_rise_token(&f.rise.address).params, params);
}

#[test]
fn test_rise_debt_accrues_to_lenders() {
    let env = Env::default();
    let f = setup(&env);
    first_mint(&env, &f);
    advance(&env, 30 * DAY);

    let debt = f.vault.get_outstanding_debt(&f.rise.address);
    assert!(debt > FIRST_MINT_DEBT);
    assert!(f.vault.get_lender_value(&f.lender) > LIQUIDITY);
    // Interest lowers equity, so NAV drifts under the initial price at a flat oracle.
    assert!(f.vault.get_nav(&f.rise.address) < INITIAL_PRICE);
}
