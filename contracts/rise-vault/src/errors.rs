use rise_math::MathError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    ArithmeticError = 4,
    InsufficientBalance = 5,
    InsufficientLiquidity = 6,
    ZeroAmount = 7,
    SlippageTooHigh = 8,
    RebalanceNotNeeded = 9,
    RebalanceTooSoon = 10,
    WrongAssetType = 11,
    RiseTokenNotFound = 12,
    RiseTokenAlreadyExists = 13,
    InvalidParameter = 14,
    NavCollapsed = 15,
    InvalidPrice = 16,
    Reentrant = 17,
}

impl From<MathError> for Error {
    fn from(_: MathError) -> Self {
        Error::ArithmeticError
    }
}
