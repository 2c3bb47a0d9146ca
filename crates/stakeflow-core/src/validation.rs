//! Stake amount validation
//!
//! A candidate amount is checked against a snapshot of everything that
//! constrains it: stake bounds, the account's balances, the target pool's
//! capacity and a pending cooldown. Checks run in a fixed order and the
//! first violated rule is reported.

use {
    serde::Serialize,
    stakeflow_common::{
        AccountBalances, ChainParameters, DelegationTarget, PoolInfo, StakeAmount, StakeBaseline,
    },
    thiserror::Error,
    tracing::debug,
};

/// A blocking problem with the entered amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "camelCase")]
pub enum StakeError {
    #[error("amount is below the minimum of {minimum} CCD")]
    AmountTooSmall { minimum: StakeAmount },

    #[error("amount is above the maximum of {maximum} CCD")]
    AmountTooLarge { maximum: StakeAmount },

    #[error("insufficient funds to stake this amount and pay the {fee} CCD fee")]
    InsufficientFunds { fee: StakeAmount },

    #[error("the pool cannot take more than {limit} CCD")]
    PoolLimitReached { limit: StakeAmount },

    #[error("the amount could not be validated")]
    InternalError,
}

impl StakeError {
    /// The caller should highlight the pool limit next to the amount field.
    pub fn highlights_pool_limit(&self) -> bool {
        matches!(self, StakeError::PoolLimitReached { .. })
    }
}

/// Everything a single validation call depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AmountValidatorConfig {
    /// Zero for edits of an existing stake; registrations start at the floor.
    pub minimum_value: StakeAmount,
    pub maximum_value: Option<StakeAmount>,
    /// Total balance of the account, release-schedule locked funds included.
    pub balance: Option<StakeAmount>,
    pub at_disposal: Option<StakeAmount>,
    pub release_schedule: StakeAmount,
    /// What this account has staked already, in its current pool.
    pub previously_staked: StakeAmount,
    /// Capital already delegated to the target pool.
    pub current_pool: Option<StakeAmount>,
    pub pool_limit: Option<StakeAmount>,
    pub is_in_cooldown: bool,
    pub old_pool: Option<DelegationTarget>,
    pub new_pool: Option<DelegationTarget>,
}

/// Largest stake the capital bound allows once capacity committed elsewhere is deducted.
pub fn maximum_from_capital_bound(capital_bound: StakeAmount, committed_elsewhere: StakeAmount) -> StakeAmount {
    capital_bound.saturating_sub(committed_elsewhere)
}

impl AmountValidatorConfig {
    fn with_balances(mut self, balances: &AccountBalances) -> Self {
        self.balance = Some(balances.total);
        self.at_disposal = Some(balances.at_disposal);
        self.release_schedule = balances.release_schedule_locked;
        self
    }

    /// Validator registration or stake update. Own stake is never capped by a pool.
    ///
    /// A new validator must stake at least the chain's minimum equity capital
    /// and never less than `registration_floor`; an existing one may lower
    /// its stake freely.
    pub fn for_validator(
        baseline: Option<&StakeBaseline>,
        balances: &AccountBalances,
        chain: &ChainParameters,
        maximum_value: Option<StakeAmount>,
        registration_floor: StakeAmount,
    ) -> Self {
        let minimum_value = match baseline {
            None => chain.minimum_equity_capital.max(registration_floor),
            Some(_) => StakeAmount::ZERO,
        };
        Self {
            minimum_value,
            maximum_value,
            previously_staked: baseline.map(StakeBaseline::staked).unwrap_or_default(),
            is_in_cooldown: baseline.map_or(false, StakeBaseline::is_in_cooldown),
            ..Self::default()
        }
        .with_balances(balances)
    }

    /// Delegation to `new_pool`; `pool` is the target pool's state when it is a validator pool.
    pub fn for_delegation(
        baseline: Option<&StakeBaseline>,
        balances: &AccountBalances,
        new_pool: DelegationTarget,
        pool: Option<&PoolInfo>,
        registration_floor: StakeAmount,
    ) -> Self {
        let targeted = pool.filter(|pool| new_pool.validator_id() == Some(pool.validator_id));
        Self {
            minimum_value: if baseline.is_none() {
                registration_floor
            } else {
                StakeAmount::ZERO
            },
            maximum_value: None,
            previously_staked: baseline.map(StakeBaseline::staked).unwrap_or_default(),
            current_pool: targeted.map(|pool| pool.delegated_capital),
            pool_limit: targeted.map(|pool| pool.delegated_capital_cap),
            is_in_cooldown: baseline.map_or(false, StakeBaseline::is_in_cooldown),
            old_pool: baseline.map(StakeBaseline::target),
            new_pool: Some(new_pool),
            ..Self::default()
        }
        .with_balances(balances)
    }

    /// Returns `amount` unchanged when it passes every check.
    pub fn validate(&self, amount: StakeAmount, fee: StakeAmount) -> Result<StakeAmount, StakeError> {
        let result = self.check(amount, fee);
        debug!(%amount, %fee, ?result, "validated stake amount");
        result.map(|_| amount)
    }

    fn check(&self, amount: StakeAmount, fee: StakeAmount) -> Result<(), StakeError> {
        if self.is_in_cooldown {
            return self.check_during_cooldown(amount, fee);
        }
        self.check_minimum(amount)?;
        self.check_maximum(amount)?;
        self.check_funds(amount, fee)?;
        self.check_pool_limit(amount)
    }

    // The amount is locked while a change is pending; only the fee can still fail.
    fn check_during_cooldown(&self, amount: StakeAmount, fee: StakeAmount) -> Result<(), StakeError> {
        if amount != self.previously_staked {
            return Err(StakeError::InternalError);
        }
        let at_disposal = self.at_disposal.ok_or(StakeError::InternalError)?;
        if fee > at_disposal {
            return Err(StakeError::InsufficientFunds { fee });
        }
        Ok(())
    }

    fn check_minimum(&self, amount: StakeAmount) -> Result<(), StakeError> {
        if amount < self.minimum_value {
            return Err(StakeError::AmountTooSmall {
                minimum: self.minimum_value,
            });
        }
        Ok(())
    }

    fn check_maximum(&self, amount: StakeAmount) -> Result<(), StakeError> {
        match self.maximum_value {
            Some(maximum) if amount > maximum => Err(StakeError::AmountTooLarge { maximum }),
            _ => Ok(()),
        }
    }

    fn check_funds(&self, amount: StakeAmount, fee: StakeAmount) -> Result<(), StakeError> {
        let (balance, at_disposal) = match (self.balance, self.at_disposal) {
            (Some(balance), Some(at_disposal)) => (balance, at_disposal),
            _ => return Err(StakeError::InternalError),
        };
        let insufficient = StakeError::InsufficientFunds { fee };

        if fee > at_disposal {
            return Err(insufficient);
        }

        // Stake already in place stays locked; only the increase has to come from spendable funds.
        let moved = amount.saturating_sub(self.previously_staked);
        match moved.checked_add(fee) {
            Some(needed) if needed <= at_disposal => {}
            _ => return Err(insufficient),
        }

        // `balance` already counts funds locked by a release schedule.
        match amount.checked_add(fee) {
            Some(needed) if needed <= balance => Ok(()),
            _ => Err(insufficient),
        }
    }

    fn check_pool_limit(&self, amount: StakeAmount) -> Result<(), StakeError> {
        let (current_pool, limit) = match (self.current_pool, self.pool_limit) {
            (Some(current_pool), Some(limit)) => (current_pool, limit),
            _ => return Ok(()),
        };

        let same_pool = self.old_pool.is_some() && self.old_pool == self.new_pool;
        let base = if same_pool {
            current_pool.saturating_sub(self.previously_staked)
        } else {
            current_pool
        };

        match base.checked_add(amount) {
            Some(total) if total <= limit => Ok(()),
            _ => Err(StakeError::PoolLimitReached { limit }),
        }
    }
}
