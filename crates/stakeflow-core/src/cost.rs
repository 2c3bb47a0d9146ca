//! Fee estimation inputs and outputs

use {
    serde::{Deserialize, Serialize},
    stakeflow_common::{AccountAddress, CommissionRate, OpenStatus, StakeAmount, ValidatorId},
};

/// One typed input of a fee-estimation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum CostParameter {
    Sender(AccountAddress),
    Amount(StakeAmount),
    Restake(bool),
    PassivePool,
    Target(ValidatorId),
    OpenStatus(OpenStatus),
    TransactionCommission(CommissionRate),
    BakingCommission(CommissionRate),
    FinalizationCommission(CommissionRate),
    MetadataSize(usize),
    Keys,
    Suspended(bool),
}

impl CostParameter {
    /// Query key the fee service expects.
    pub fn key(&self) -> &'static str {
        match self {
            CostParameter::Sender(_) => "sender",
            CostParameter::Amount(_) => "amount",
            CostParameter::Restake(_) => "restake",
            CostParameter::PassivePool => "passive",
            CostParameter::Target(_) => "target",
            CostParameter::OpenStatus(_) => "openStatus",
            CostParameter::TransactionCommission(_) => "transactionCommission",
            CostParameter::BakingCommission(_) => "bakingRewardCommission",
            CostParameter::FinalizationCommission(_) => "finalizationRewardCommission",
            CostParameter::MetadataSize(_) => "metadataSize",
            CostParameter::Keys => "keys",
            CostParameter::Suspended(_) => "suspended",
        }
    }

    /// Query value; flags without payload are sent as an empty value.
    pub fn value(&self) -> String {
        match self {
            CostParameter::Sender(address) => address.to_string(),
            CostParameter::Amount(amount) => amount.micro().to_string(),
            CostParameter::Restake(flag) | CostParameter::Suspended(flag) => flag.to_string(),
            CostParameter::PassivePool | CostParameter::Keys => String::new(),
            CostParameter::Target(id) => id.to_string(),
            CostParameter::OpenStatus(status) => status.as_str().to_string(),
            CostParameter::TransactionCommission(rate)
            | CostParameter::BakingCommission(rate)
            | CostParameter::FinalizationCommission(rate) => rate.parts_per_100k().to_string(),
            CostParameter::MetadataSize(size) => size.to_string(),
        }
    }

    pub fn as_pair(&self) -> (&'static str, String) {
        (self.key(), self.value())
    }
}

/// A fee quote: what the transaction costs and the energy it may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCost {
    pub cost: StakeAmount,
    pub energy: u64,
}
