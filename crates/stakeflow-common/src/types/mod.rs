//! Common data types used throughout the stakeflow system

pub mod account;
pub mod amount;
pub mod chain;
pub mod keys;
pub mod pool;

pub use account::{AccountAddress, AccountBalances, PendingChange, StakeBaseline};
pub use amount::StakeAmount;
pub use chain::ChainParameters;
pub use keys::ValidatorKeys;
pub use pool::{
    CommissionRange, CommissionRanges, CommissionRate, CommissionRates, DelegationTarget,
    OpenStatus, PoolInfo,
};

/// Numeric id a validator is known by on chain.
pub type ValidatorId = u64;
