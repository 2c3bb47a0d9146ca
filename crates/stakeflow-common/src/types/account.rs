//! Account data types
//!
//! This module defines the account-side inputs of a staking flow: the
//! sender address, its balances, and the staking configuration it
//! currently has on chain.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display, Formatter},
};

use crate::{
    errors::{Error, Result},
    types::{
        amount::StakeAmount,
        pool::{CommissionRates, DelegationTarget, OpenStatus},
        ValidatorId,
    },
    utils,
};

/// Version byte prefixed to account addresses before Base58Check encoding.
const ADDRESS_VERSION: u8 = 1;
const ADDRESS_LEN: usize = 32;

/// Base58Check encoded account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        if address.is_empty() {
            return Err(Error::Address("address is empty".into()));
        }
        let decoded = bs58::decode(&address)
            .with_check(Some(ADDRESS_VERSION))
            .into_vec()
            .map_err(|e| Error::Address(format!("'{}' is not a valid address: {}", address, e)))?;
        // The decoded bytes still carry the version byte.
        if decoded.len() != ADDRESS_LEN + 1 {
            return Err(Error::Address(format!(
                "'{}' decodes to {} bytes, expected {}",
                address,
                decoded.len() - 1,
                ADDRESS_LEN
            )));
        }
        Ok(Self(address))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AccountAddress> for String {
    fn from(address: AccountAddress) -> Self {
        address.0
    }
}

impl Display for AccountAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Balances of the sending account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalances {
    /// Everything the account holds, staked and locked amounts included.
    pub total: StakeAmount,
    /// Spendable: not staked and not locked by a release schedule.
    pub at_disposal: StakeAmount,
    /// Still locked by a release schedule.
    #[serde(default)]
    pub release_schedule_locked: StakeAmount,
}

/// A stake reduction or removal waiting out its cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum PendingChange {
    #[serde(rename_all = "camelCase")]
    ReduceStake {
        new_stake: StakeAmount,
        effective_time: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveStake { effective_time: DateTime<Utc> },
}

impl PendingChange {
    pub fn effective_time(&self) -> DateTime<Utc> {
        match self {
            PendingChange::ReduceStake { effective_time, .. }
            | PendingChange::RemoveStake { effective_time } => *effective_time,
        }
    }
}

/// The staking configuration an account currently has on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum StakeBaseline {
    #[serde(rename_all = "camelCase")]
    Validator {
        id: ValidatorId,
        staked: StakeAmount,
        restake: bool,
        open_status: OpenStatus,
        commissions: CommissionRates,
        #[serde(default)]
        metadata_url: String,
        #[serde(default)]
        suspended: bool,
        #[serde(default)]
        pending_change: Option<PendingChange>,
    },
    #[serde(rename_all = "camelCase")]
    Delegator {
        staked: StakeAmount,
        restake: bool,
        target: DelegationTarget,
        #[serde(default)]
        pending_change: Option<PendingChange>,
    },
}

impl StakeBaseline {
    pub fn staked(&self) -> StakeAmount {
        match self {
            StakeBaseline::Validator { staked, .. } | StakeBaseline::Delegator { staked, .. } => *staked,
        }
    }

    pub fn pending_change(&self) -> Option<&PendingChange> {
        match self {
            StakeBaseline::Validator { pending_change, .. }
            | StakeBaseline::Delegator { pending_change, .. } => pending_change.as_ref(),
        }
    }

    /// Whether a pending change has yet to take effect.
    pub fn is_in_cooldown(&self) -> bool {
        self.pending_change()
            .map_or(false, |change| !utils::has_taken_effect(change, utils::current_timestamp()))
    }

    /// The pool this baseline's stake currently sits in.
    pub fn target(&self) -> DelegationTarget {
        match self {
            StakeBaseline::Validator { id, .. } => DelegationTarget::Validator(*id),
            StakeBaseline::Delegator { target, .. } => *target,
        }
    }
}
