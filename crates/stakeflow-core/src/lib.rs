//! Staking and delegation transaction preparation for the wallet
//! Tracks staged configuration changes, prices and validates them, and
//! assembles the transaction handed to the signer

pub mod collaborators;
pub mod cost;
pub mod entries;
pub mod flow;
pub mod handler;
pub mod kind;
pub mod pool_settings;
pub mod transfer;
pub mod validation;
pub mod warnings;

#[cfg(test)]
mod tests;

pub use collaborators::{
    DryRunSubmitter, FixedCostEstimator, StakingDataSource, StaticDataSource, SubmissionHash,
    TransactionSubmitter, TransferCostEstimator,
};
pub use cost::{CostParameter, TransferCost};
pub use entries::{
    AmountEntry, CommissionEntry, DisplayRow, Entry, EntryStore, Field, FieldEntry, KeysEntry,
    MetadataUrlEntry, OpenStatusEntry, PoolTargetEntry, RestakeEntry, StagedEntry, ValidatorIdEntry,
};
pub use flow::{FlowError, QuoteRequest, StakeFlow};
pub use handler::DataHandler;
pub use kind::TransactionKind;
pub use pool_settings::PoolSettingsError;
pub use transfer::StakeTransfer;
pub use validation::{maximum_from_capital_bound, AmountValidatorConfig, StakeError};
pub use warnings::{StakeWarning, WarningAction};
