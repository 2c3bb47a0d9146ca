//! The finished transaction description handed to the signer

use {
    serde::{Deserialize, Serialize},
    stakeflow_common::{
        AccountAddress, CommissionRates, DelegationTarget, OpenStatus, StakeAmount, ValidatorKeys,
    },
};

use crate::kind::TransactionKind;

/// Everything needed to sign and submit one staking transaction.
///
/// Fields a kind does not use stay `None` and are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeTransfer {
    pub kind: TransactionKind,
    pub sender: AccountAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<StakeAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restake: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<DelegationTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_status: Option<OpenStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commissions: Option<CommissionRates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<ValidatorKeys>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    pub cost: StakeAmount,
    pub energy: u64,
}
