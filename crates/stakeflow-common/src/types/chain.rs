//! Chain parameters relevant to staking

use serde::{Deserialize, Serialize};

use crate::types::{amount::StakeAmount, pool::CommissionRanges};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParameters {
    /// Smallest stake a validator may register with.
    pub minimum_equity_capital: StakeAmount,
    /// Largest share of total stake one pool may hold, in parts per 100 000.
    pub capital_bound: u32,
    pub commission_ranges: CommissionRanges,
}

impl ChainParameters {
    /// Capacity the capital bound allows one pool out of `total_staked`.
    pub fn capital_bound_of(&self, total_staked: StakeAmount) -> StakeAmount {
        total_staked.scale_parts_per_100k(self.capital_bound)
    }
}
