//! Staking transaction kinds and the fields each one carries

use {
    serde::{Deserialize, Serialize},
    std::fmt::{self, Display, Formatter},
};

use crate::entries::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    RegisterValidator,
    UpdateValidatorStake,
    UpdateValidatorPool,
    UpdateValidatorKeys,
    RemoveValidator,
    SuspendValidator,
    ResumeValidator,
    AddDelegation,
    UpdateDelegation,
    RemoveDelegation,
}

impl TransactionKind {
    /// Fields that feed the fee estimate and the payload, in field order.
    pub fn relevant_fields(&self) -> &'static [Field] {
        match self {
            TransactionKind::RegisterValidator => &[
                Field::Amount,
                Field::Restake,
                Field::OpenStatus,
                Field::Commissions,
                Field::MetadataUrl,
                Field::Keys,
            ],
            TransactionKind::UpdateValidatorStake => &[Field::Amount, Field::Restake],
            TransactionKind::UpdateValidatorPool => {
                &[Field::OpenStatus, Field::Commissions, Field::MetadataUrl]
            }
            TransactionKind::UpdateValidatorKeys => &[Field::Keys],
            TransactionKind::RemoveValidator | TransactionKind::RemoveDelegation => &[Field::Amount],
            TransactionKind::SuspendValidator | TransactionKind::ResumeValidator => &[],
            TransactionKind::AddDelegation | TransactionKind::UpdateDelegation => {
                &[Field::Amount, Field::Restake, Field::PoolTarget]
            }
        }
    }

    pub fn is_relevant(&self, field: Field) -> bool {
        self.relevant_fields().contains(&field)
    }

    pub fn is_delegation(&self) -> bool {
        matches!(
            self,
            TransactionKind::AddDelegation
                | TransactionKind::UpdateDelegation
                | TransactionKind::RemoveDelegation
        )
    }

    /// Creates a role the account does not have yet.
    pub fn is_registration(&self) -> bool {
        matches!(self, TransactionKind::RegisterValidator | TransactionKind::AddDelegation)
    }

    /// Edits an existing configuration field by field.
    pub fn is_update(&self) -> bool {
        matches!(
            self,
            TransactionKind::UpdateValidatorStake
                | TransactionKind::UpdateValidatorPool
                | TransactionKind::UpdateValidatorKeys
                | TransactionKind::UpdateDelegation
        )
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, TransactionKind::RemoveValidator | TransactionKind::RemoveDelegation)
    }

    /// The kind a zero stake turns this one into, if any.
    pub fn removal_counterpart(&self) -> Option<TransactionKind> {
        match self {
            TransactionKind::UpdateValidatorStake => Some(TransactionKind::RemoveValidator),
            TransactionKind::UpdateDelegation => Some(TransactionKind::RemoveDelegation),
            _ => None,
        }
    }

    /// Suspension flag the payload carries, for suspend and resume.
    pub fn suspended_flag(&self) -> Option<bool> {
        match self {
            TransactionKind::SuspendValidator => Some(true),
            TransactionKind::ResumeValidator => Some(false),
            _ => None,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionKind::RegisterValidator => "register validator",
            TransactionKind::UpdateValidatorStake => "update validator stake",
            TransactionKind::UpdateValidatorPool => "update validator pool",
            TransactionKind::UpdateValidatorKeys => "update validator keys",
            TransactionKind::RemoveValidator => "remove validator",
            TransactionKind::SuspendValidator => "suspend validator",
            TransactionKind::ResumeValidator => "resume validator",
            TransactionKind::AddDelegation => "add delegation",
            TransactionKind::UpdateDelegation => "update delegation",
            TransactionKind::RemoveDelegation => "remove delegation",
        })
    }
}
