//! Typed staking configuration fields
//!
//! Every piece of configuration a staking transaction can carry is a
//! separate entry type. Entries are kept in an [`EntryStore`] keyed by
//! their [`Field`], so a store holds at most one entry of each type and
//! adding an entry replaces the previous one.

use {
    serde::{Deserialize, Serialize},
    std::{any::Any, collections::BTreeMap, fmt::Debug},
    stakeflow_common::{
        CommissionRates, DelegationTarget, OpenStatus, StakeAmount, ValidatorId, ValidatorKeys,
    },
};

use crate::cost::CostParameter;

/// Field kinds, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Amount,
    ValidatorId,
    Restake,
    PoolTarget,
    OpenStatus,
    Commissions,
    MetadataUrl,
    Keys,
}

/// One (label, value) line of a summary screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub label: &'static str,
    pub value: String,
}

impl DisplayRow {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// A concrete entry type.
pub trait Entry: Any + Clone + PartialEq + Debug + Send + Sync {
    const FIELD: Field;

    fn display_rows(&self) -> Vec<DisplayRow>;

    fn cost_parameters(&self) -> Vec<CostParameter> {
        Vec::new()
    }
}

/// Object-safe view of an [`Entry`] so stores can hold mixed entry types.
pub trait FieldEntry: Debug + Send + Sync {
    fn field(&self) -> Field;
    fn display_rows(&self) -> Vec<DisplayRow>;
    fn cost_parameters(&self) -> Vec<CostParameter>;
    fn same_as(&self, other: &dyn FieldEntry) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Entry> FieldEntry for T {
    fn field(&self) -> Field {
        T::FIELD
    }

    fn display_rows(&self) -> Vec<DisplayRow> {
        Entry::display_rows(self)
    }

    fn cost_parameters(&self) -> Vec<CostParameter> {
        Entry::cost_parameters(self)
    }

    fn same_as(&self, other: &dyn FieldEntry) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// At most one entry per field.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: BTreeMap<Field, Box<dyn FieldEntry>>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Entry>(&mut self, entry: T) {
        self.entries.insert(T::FIELD, Box::new(entry));
    }

    pub fn insert_boxed(&mut self, entry: Box<dyn FieldEntry>) {
        self.entries.insert(entry.field(), entry);
    }

    pub fn get<T: Entry>(&self) -> Option<&T> {
        self.entries
            .get(&T::FIELD)
            .and_then(|entry| entry.as_any().downcast_ref::<T>())
    }

    pub fn get_field(&self, field: Field) -> Option<&dyn FieldEntry> {
        self.entries.get(&field).map(|entry| entry.as_ref())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.entries.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in field order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn FieldEntry> {
        self.entries.values().map(|entry| entry.as_ref())
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.entries.keys().copied()
    }

    /// Whether this store holds `entry`'s field with an equal value.
    pub fn matches(&self, entry: &dyn FieldEntry) -> bool {
        self.get_field(entry.field())
            .map_or(false, |existing| existing.same_as(entry))
    }

    /// Whether any entry here is missing from, or differs in, `baseline`.
    pub fn differs_from(&self, baseline: &EntryStore) -> bool {
        self.iter().any(|entry| !baseline.matches(entry))
    }

    pub fn display_rows(&self) -> Vec<DisplayRow> {
        self.iter().flat_map(|entry| entry.display_rows()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountEntry(pub StakeAmount);

impl Entry for AmountEntry {
    const FIELD: Field = Field::Amount;

    fn display_rows(&self) -> Vec<DisplayRow> {
        vec![DisplayRow::new("Stake amount", format!("{} CCD", self.0))]
    }

    fn cost_parameters(&self) -> Vec<CostParameter> {
        vec![CostParameter::Amount(self.0)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorIdEntry(pub ValidatorId);

impl Entry for ValidatorIdEntry {
    const FIELD: Field = Field::ValidatorId;

    fn display_rows(&self) -> Vec<DisplayRow> {
        vec![DisplayRow::new("Validator ID", self.0.to_string())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestakeEntry(pub bool);

impl Entry for RestakeEntry {
    const FIELD: Field = Field::Restake;

    fn display_rows(&self) -> Vec<DisplayRow> {
        let value = if self.0 {
            "Added to stake"
        } else {
            "Added to public balance"
        };
        vec![DisplayRow::new("Rewards will be", value)]
    }

    fn cost_parameters(&self) -> Vec<CostParameter> {
        vec![CostParameter::Restake(self.0)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTargetEntry(pub DelegationTarget);

impl Entry for PoolTargetEntry {
    const FIELD: Field = Field::PoolTarget;

    fn display_rows(&self) -> Vec<DisplayRow> {
        vec![DisplayRow::new("Target pool", self.0.to_string())]
    }

    fn cost_parameters(&self) -> Vec<CostParameter> {
        match self.0 {
            DelegationTarget::Passive => vec![CostParameter::PassivePool],
            DelegationTarget::Validator(id) => vec![CostParameter::Target(id)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenStatusEntry(pub OpenStatus);

impl Entry for OpenStatusEntry {
    const FIELD: Field = Field::OpenStatus;

    fn display_rows(&self) -> Vec<DisplayRow> {
        vec![DisplayRow::new("Pool status", self.0.to_string())]
    }

    fn cost_parameters(&self) -> Vec<CostParameter> {
        vec![CostParameter::OpenStatus(self.0)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionEntry(pub CommissionRates);

impl Entry for CommissionEntry {
    const FIELD: Field = Field::Commissions;

    fn display_rows(&self) -> Vec<DisplayRow> {
        vec![
            DisplayRow::new("Transaction fee commission", self.0.transaction.to_string()),
            DisplayRow::new("Block reward commission", self.0.baking.to_string()),
            DisplayRow::new("Finalization reward commission", self.0.finalization.to_string()),
        ]
    }

    fn cost_parameters(&self) -> Vec<CostParameter> {
        vec![
            CostParameter::TransactionCommission(self.0.transaction),
            CostParameter::BakingCommission(self.0.baking),
            CostParameter::FinalizationCommission(self.0.finalization),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUrlEntry(pub String);

impl Entry for MetadataUrlEntry {
    const FIELD: Field = Field::MetadataUrl;

    fn display_rows(&self) -> Vec<DisplayRow> {
        let value = if self.0.is_empty() {
            "None".to_string()
        } else {
            self.0.clone()
        };
        vec![DisplayRow::new("Metadata URL", value)]
    }

    // The energy cost depends on the URL length only.
    fn cost_parameters(&self) -> Vec<CostParameter> {
        vec![CostParameter::MetadataSize(self.0.len())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysEntry(pub ValidatorKeys);

impl Entry for KeysEntry {
    const FIELD: Field = Field::Keys;

    fn display_rows(&self) -> Vec<DisplayRow> {
        self.0
            .labelled()
            .into_iter()
            .map(|(label, key)| DisplayRow::new(label, key))
            .collect()
    }

    fn cost_parameters(&self) -> Vec<CostParameter> {
        vec![CostParameter::Keys]
    }
}

/// Serialized form of a staged edit, as the CLI reads it from a scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum StagedEntry {
    Amount(StakeAmount),
    ValidatorId(ValidatorId),
    Restake(bool),
    PoolTarget(DelegationTarget),
    OpenStatus(OpenStatus),
    Commissions(CommissionRates),
    MetadataUrl(String),
    Keys(ValidatorKeys),
}

impl StagedEntry {
    pub fn into_entry(self) -> Box<dyn FieldEntry> {
        match self {
            StagedEntry::Amount(amount) => Box::new(AmountEntry(amount)),
            StagedEntry::ValidatorId(id) => Box::new(ValidatorIdEntry(id)),
            StagedEntry::Restake(restake) => Box::new(RestakeEntry(restake)),
            StagedEntry::PoolTarget(target) => Box::new(PoolTargetEntry(target)),
            StagedEntry::OpenStatus(status) => Box::new(OpenStatusEntry(status)),
            StagedEntry::Commissions(rates) => Box::new(CommissionEntry(rates)),
            StagedEntry::MetadataUrl(url) => Box::new(MetadataUrlEntry(url)),
            StagedEntry::Keys(keys) => Box::new(KeysEntry(keys)),
        }
    }
}
