use soroban_sdk::{contractevent, Address};

/// Lender deposited underlying and received vault shares.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Supply {
    #[topic]
    pub lender: Address,
    pub amount: u128,
    pub shares: u128,
}

/// Lender burned vault shares for underlying.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    #[topic]
    pub lender: Address,
    pub amount: u128,
    pub shares: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Borrow {
    #[topic]
    pub borrower: Address,
    pub amount: u128,
    pub debt_proportion: u128,
    pub total_outstanding_debt: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repay {
    #[topic]
    pub borrower: Address,
    pub amount: u128,
    pub debt_proportion: u128,
    pub total_outstanding_debt: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterestAccrued {
    pub interest: u128,
    pub fee: u128,
    pub borrow_rate_per_second: u128,
    pub total_outstanding_debt: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeesCollected {
    #[topic]
    pub receiver: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultParametersUpdated {
    pub optimal_utilization: u128,
    pub interest_slope_1: u128,
    pub interest_slope_2: u128,
    pub max_borrow_rate_per_second: u128,
    pub performance_fee: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeReceiverUpdated {
    #[topic]
    pub receiver: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BorrowerUpdated {
    #[topic]
    pub borrower: Address,
    pub allowed: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovernorUpdated {
    #[topic]
    pub governor: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenCreated {
    #[topic]
    pub token: Address,
    pub collateral: Address,
    pub is_native: bool,
    pub initial_price: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenParametersUpdated {
    #[topic]
    pub token: Address,
    pub fee: u128,
    pub min_leverage_ratio: u128,
    pub max_leverage_ratio: u128,
    pub max_rebalance_value: u128,
    pub rebalancing_step: u128,
    pub max_slippage: u128,
}

/// `borrowed` is the underlying spent on the leveraged leg; `nav` is the price paid per share.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenMinted {
    #[topic]
    pub token: Address,
    #[topic]
    pub recipient: Address,
    pub collateral_amount: u128,
    pub borrowed: u128,
    pub shares: u128,
    pub nav: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenRedeemed {
    #[topic]
    pub token: Address,
    #[topic]
    pub recipient: Address,
    pub shares: u128,
    pub collateral_sold: u128,
    pub repaid: u128,
    pub collateral_out: u128,
    pub fee: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rebalanced {
    #[topic]
    pub token: Address,
    pub leverage_up: bool,
    pub leverage_before: u128,
    pub collateral_amount: u128,
    pub debt_change: u128,
    pub partial: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiseTokenFeesCollected {
    #[topic]
    pub token: Address,
    #[topic]
    pub receiver: Address,
    pub amount: u128,
}
