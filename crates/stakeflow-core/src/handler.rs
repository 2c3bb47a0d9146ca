//! Staged staking configuration
//!
//! [`DataHandler`] keeps the account's on-chain configuration (`current`)
//! next to the edits the user has made so far (`new`). Everything the rest
//! of the flow needs, from the fee-estimation inputs to the final payload,
//! is derived from those two stores on demand.

use {
    stakeflow_common::{AccountAddress, StakeAmount, StakeBaseline},
    std::collections::BTreeSet,
    tracing::trace,
};

use crate::{
    cost::CostParameter,
    entries::{
        AmountEntry, CommissionEntry, DisplayRow, Entry, EntryStore, Field, FieldEntry, KeysEntry,
        MetadataUrlEntry, OpenStatusEntry, PoolTargetEntry, RestakeEntry, ValidatorIdEntry,
    },
    kind::TransactionKind,
    transfer::StakeTransfer,
    warnings::{self, StakeWarning, WarningInputs, DEFAULT_WARNING_THRESHOLD_PERCENT},
};

#[derive(Debug)]
pub struct DataHandler {
    kind: TransactionKind,
    sender: AccountAddress,
    current: EntryStore,
    new: EntryStore,
    warning_threshold_percent: u8,
}

impl DataHandler {
    /// Starts a flow for `sender`; `baseline` is its current on-chain configuration, if any.
    pub fn new(kind: TransactionKind, sender: AccountAddress, baseline: Option<&StakeBaseline>) -> Self {
        Self::with_current(kind, sender, baseline.map(baseline_entries).unwrap_or_default())
    }

    pub fn with_current(kind: TransactionKind, sender: AccountAddress, current: EntryStore) -> Self {
        Self {
            kind,
            sender,
            current,
            new: EntryStore::new(),
            warning_threshold_percent: DEFAULT_WARNING_THRESHOLD_PERCENT,
        }
    }

    pub fn with_warning_threshold(mut self, percent: u8) -> Self {
        self.warning_threshold_percent = percent;
        self
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn sender(&self) -> &AccountAddress {
        &self.sender
    }

    /// Stages `entry`, replacing any earlier edit of the same field.
    pub fn add<T: Entry>(&mut self, entry: T) {
        trace!(field = ?T::FIELD, "staging entry");
        self.new.insert(entry);
    }

    pub fn add_boxed(&mut self, entry: Box<dyn FieldEntry>) {
        trace!(field = ?entry.field(), "staging entry");
        self.new.insert_boxed(entry);
    }

    pub fn get_current_entry<T: Entry>(&self) -> Option<&T> {
        self.current.get::<T>()
    }

    pub fn get_new_entry<T: Entry>(&self) -> Option<&T> {
        self.new.get::<T>()
    }

    /// The staged value if there is one, otherwise the current one.
    pub fn get_entry<T: Entry>(&self) -> Option<&T> {
        self.new.get::<T>().or_else(|| self.current.get::<T>())
    }

    pub fn current(&self) -> &EntryStore {
        &self.current
    }

    pub fn staged(&self) -> &EntryStore {
        &self.new
    }

    /// True when editing or removing an existing role rather than registering.
    pub fn has_current_data(&self) -> bool {
        !self.current.is_empty()
    }

    pub fn contains_changes(&self) -> bool {
        self.new.differs_from(&self.current)
    }

    pub fn is_new_amount_zero(&self) -> bool {
        self.get_new_entry::<AmountEntry>()
            .map_or(false, |entry| entry.0.is_zero())
    }

    pub fn is_lowering_stake(&self) -> bool {
        match (
            self.get_new_entry::<AmountEntry>(),
            self.get_current_entry::<AmountEntry>(),
        ) {
            (Some(new), Some(current)) => new.0 < current.0,
            _ => false,
        }
    }

    /// The kind actually submitted: a zero stake on an update becomes a removal.
    pub fn resolved_kind(&self) -> TransactionKind {
        match self.kind.removal_counterpart() {
            Some(removal) if self.is_new_amount_zero() => removal,
            _ => self.kind,
        }
    }

    /// Fee-estimation inputs for exactly the staged changes relevant to this transaction.
    pub fn get_cost_parameters(&self) -> Vec<CostParameter> {
        let kind = self.resolved_kind();
        let mut parameters = vec![CostParameter::Sender(self.sender.clone())];

        if kind.is_removal() {
            parameters.push(CostParameter::Amount(StakeAmount::ZERO));
        } else if let Some(suspended) = kind.suspended_flag() {
            parameters.push(CostParameter::Suspended(suspended));
        } else {
            parameters.extend(
                self.changed_entries(kind)
                    .flat_map(|entry| entry.cost_parameters()),
            );
        }

        trace!(%kind, count = parameters.len(), "derived cost parameters");
        parameters
    }

    /// Display rows of the on-chain configuration.
    pub fn get_current_ordered(&self) -> Vec<DisplayRow> {
        self.current.display_rows()
    }

    /// Display rows of the configuration as it will be after submission.
    pub fn get_all_ordered(&self) -> Vec<DisplayRow> {
        let fields: BTreeSet<Field> = self.current.fields().chain(self.new.fields()).collect();
        fields
            .into_iter()
            .filter_map(|field| self.new.get_field(field).or_else(|| self.current.get_field(field)))
            .flat_map(|entry| entry.display_rows())
            .collect()
    }

    pub fn get_current_warning(
        &self,
        at_disposal: StakeAmount,
        release_schedule_locked: StakeAmount,
    ) -> Option<StakeWarning> {
        warnings::evaluate(WarningInputs {
            kind: self.kind,
            current: &self.current,
            new: &self.new,
            at_disposal,
            release_schedule_locked,
            threshold_percent: self.warning_threshold_percent,
        })
    }

    /// Builds the payload for the resolved kind.
    ///
    /// Only staged values that differ from the baseline are carried, so the
    /// payload holds exactly the fields [`Self::get_cost_parameters`] priced.
    pub fn get_transfer_object(&self, cost: StakeAmount, energy: u64) -> StakeTransfer {
        let kind = self.resolved_kind();
        let amount = if kind.is_removal() {
            Some(StakeAmount::ZERO)
        } else {
            self.changed_entry::<AmountEntry>(kind).map(|entry| entry.0)
        };

        StakeTransfer {
            kind,
            sender: self.sender.clone(),
            amount,
            restake: self
                .changed_entry::<RestakeEntry>(kind)
                .map(|entry| entry.0),
            target: self
                .changed_entry::<PoolTargetEntry>(kind)
                .map(|entry| entry.0),
            open_status: self
                .changed_entry::<OpenStatusEntry>(kind)
                .map(|entry| entry.0),
            commissions: self
                .changed_entry::<CommissionEntry>(kind)
                .map(|entry| entry.0),
            metadata_url: self
                .changed_entry::<MetadataUrlEntry>(kind)
                .map(|entry| entry.0.clone()),
            keys: self
                .changed_entry::<KeysEntry>(kind)
                .map(|entry| entry.0.clone()),
            suspended: kind.suspended_flag(),
            cost,
            energy,
        }
    }

    /// Staged entries the resolved kind carries that change the baseline, in field order.
    fn changed_entries(&self, kind: TransactionKind) -> impl Iterator<Item = &dyn FieldEntry> + '_ {
        self.new
            .iter()
            .filter(move |entry| kind.is_relevant(entry.field()))
            .filter(move |entry| !self.current.matches(*entry))
    }

    fn changed_entry<T: Entry>(&self, kind: TransactionKind) -> Option<&T> {
        if kind.is_removal() || !kind.is_relevant(T::FIELD) {
            return None;
        }
        self.new
            .get::<T>()
            .filter(|entry| !self.current.matches(*entry))
    }
}

fn baseline_entries(baseline: &StakeBaseline) -> EntryStore {
    let mut store = EntryStore::new();
    match baseline {
        StakeBaseline::Validator {
            id,
            staked,
            restake,
            open_status,
            commissions,
            metadata_url,
            ..
        } => {
            store.insert(AmountEntry(*staked));
            store.insert(ValidatorIdEntry(*id));
            store.insert(RestakeEntry(*restake));
            store.insert(OpenStatusEntry(*open_status));
            store.insert(CommissionEntry(*commissions));
            store.insert(MetadataUrlEntry(metadata_url.clone()));
        }
        StakeBaseline::Delegator {
            staked,
            restake,
            target,
            ..
        } => {
            store.insert(AmountEntry(*staked));
            store.insert(RestakeEntry(*restake));
            store.insert(PoolTargetEntry(*target));
        }
    }
    store
}
