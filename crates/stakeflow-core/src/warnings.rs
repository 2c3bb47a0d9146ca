//! Advisory conditions a user confirms before submitting

use {
    serde::Serialize,
    stakeflow_common::StakeAmount,
    std::fmt::{self, Display, Formatter},
    tracing::debug,
};

use crate::{
    entries::{AmountEntry, EntryStore},
    kind::TransactionKind,
};

/// Share of the available balance above which staking asks for confirmation.
pub const DEFAULT_WARNING_THRESHOLD_PERCENT: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "camelCase")]
pub enum StakeWarning {
    NoChanges,
    AmountZero,
    #[serde(rename_all = "camelCase")]
    StakeLowered {
        current: StakeAmount,
        new: StakeAmount,
        delegation: bool,
    },
    #[serde(rename_all = "camelCase")]
    ExceedsBalanceShare { percent: u8 },
}

/// What the confirmation dialog offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningAction {
    Dismiss,
    Continue,
    RemoveStake,
    Cancel,
}

impl StakeWarning {
    pub fn actions(&self) -> &'static [WarningAction] {
        match self {
            StakeWarning::NoChanges => &[WarningAction::Dismiss],
            StakeWarning::AmountZero => &[WarningAction::RemoveStake, WarningAction::Cancel],
            StakeWarning::StakeLowered { .. } | StakeWarning::ExceedsBalanceShare { .. } => {
                &[WarningAction::Continue, WarningAction::Cancel]
            }
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            StakeWarning::NoChanges => {
                "You have not made any changes, so there is no transaction to submit.".to_string()
            }
            StakeWarning::AmountZero => {
                "A stake of zero removes it entirely. Do you want to stop staking instead?".to_string()
            }
            StakeWarning::StakeLowered { current, new, delegation } => {
                let role = if *delegation { "delegation" } else { "validator stake" };
                format!(
                    "Lowering your {} from {} to {} CCD starts a cooldown period, \
                     during which the amount cannot be changed again.",
                    role, current, new
                )
            }
            StakeWarning::ExceedsBalanceShare { percent } => format!(
                "You are about to stake more than {}% of your available balance, \
                 which may leave too little to pay future transaction fees.",
                percent
            ),
        }
    }
}

impl Display for StakeWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prompt())
    }
}

/// Inputs of one warning evaluation.
#[derive(Debug, Clone, Copy)]
pub struct WarningInputs<'a> {
    pub kind: TransactionKind,
    pub current: &'a EntryStore,
    pub new: &'a EntryStore,
    pub at_disposal: StakeAmount,
    pub release_schedule_locked: StakeAmount,
    pub threshold_percent: u8,
}

/// Picks the single most important warning for a staged change set.
pub fn evaluate(inputs: WarningInputs<'_>) -> Option<StakeWarning> {
    let warning = classify(&inputs);
    debug!(kind = %inputs.kind, ?warning, "evaluated stake warning");
    warning
}

fn classify(inputs: &WarningInputs<'_>) -> Option<StakeWarning> {
    let WarningInputs { kind, current, new, .. } = *inputs;

    if kind.is_update() && !current.is_empty() && !new.differs_from(current) {
        return Some(StakeWarning::NoChanges);
    }

    let new_amount = new.get::<AmountEntry>().map(|entry| entry.0)?;
    let current_amount = current.get::<AmountEntry>().map(|entry| entry.0);

    if kind.removal_counterpart().is_some() && new_amount.is_zero() {
        return Some(StakeWarning::AmountZero);
    }

    if let Some(current_amount) = current_amount {
        if !current_amount.is_zero() && new_amount < current_amount {
            return Some(StakeWarning::StakeLowered {
                current: current_amount,
                new: new_amount,
                delegation: kind.is_delegation(),
            });
        }
    }

    let available = inputs
        .at_disposal
        .saturating_add(inputs.release_schedule_locked);
    if new_amount.exceeds_share_of(available, inputs.threshold_percent) {
        return Some(StakeWarning::ExceedsBalanceShare {
            percent: inputs.threshold_percent,
        });
    }

    None
}
