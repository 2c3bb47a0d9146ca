//! Pool types: delegation targets, pool settings and pool state

use {
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display, Formatter},
};

use crate::types::{amount::StakeAmount, ValidatorId};

/// Where delegated stake goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DelegationTarget {
    Passive,
    Validator(ValidatorId),
}

impl DelegationTarget {
    pub fn validator_id(&self) -> Option<ValidatorId> {
        match self {
            DelegationTarget::Passive => None,
            DelegationTarget::Validator(id) => Some(*id),
        }
    }
}

impl Display for DelegationTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DelegationTarget::Passive => f.write_str("Passive"),
            DelegationTarget::Validator(id) => write!(f, "Validator {}", id),
        }
    }
}

/// Whether a validator pool accepts delegators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenStatus {
    OpenForAll,
    ClosedForNew,
    ClosedForAll,
}

impl OpenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenStatus::OpenForAll => "openForAll",
            OpenStatus::ClosedForNew => "closedForNew",
            OpenStatus::ClosedForAll => "closedForAll",
        }
    }
}

impl Display for OpenStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpenStatus::OpenForAll => "Open for all",
            OpenStatus::ClosedForNew => "Closed for new",
            OpenStatus::ClosedForAll => "Closed for all",
        })
    }
}

/// A commission rate in parts per 100 000.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionRate(pub u32);

impl CommissionRate {
    pub const MAX: CommissionRate = CommissionRate(100_000);

    pub fn parts_per_100k(&self) -> u32 {
        self.0
    }
}

impl Display for CommissionRate {
    /// Percentage with three decimals, e.g. `5.000%`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}%", self.0 / 1000, self.0 % 1000)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRates {
    pub transaction: CommissionRate,
    pub baking: CommissionRate,
    pub finalization: CommissionRate,
}

/// Inclusive bounds the chain allows for one commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRange {
    pub min: CommissionRate,
    pub max: CommissionRate,
}

impl CommissionRange {
    pub fn contains(&self, rate: CommissionRate) -> bool {
        self.min <= rate && rate <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRanges {
    pub transaction: CommissionRange,
    pub baking: CommissionRange,
    pub finalization: CommissionRange,
}

/// State of a validator pool as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub validator_id: ValidatorId,
    pub delegated_capital: StakeAmount,
    pub delegated_capital_cap: StakeAmount,
    pub open_status: OpenStatus,
}

impl PoolInfo {
    /// Room left before the pool reaches its cap.
    pub fn remaining_capacity(&self) -> StakeAmount {
        self.delegated_capital_cap.saturating_sub(self.delegated_capital)
    }
}
