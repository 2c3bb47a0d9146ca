//! The staking pipeline around a [`DataHandler`]
//!
//! A flow stages edits, derives cost parameters, fetches a fee quote,
//! validates, and finally submits. Fee quotes are tied to the parameters
//! they were requested for: once a newer edit changes those parameters the
//! quote is stale and is neither accepted nor used for submission.

use {
    stakeflow_common::{
        AccountAddress, AccountBalances, ChainParameters, DelegationTarget, FlowConfig, PoolInfo,
        utils, StakeAmount, StakeBaseline, ValidatorId,
    },
    std::sync::Arc,
    thiserror::Error,
    tracing::{debug, info, warn},
};

use crate::{
    collaborators::{StakingDataSource, SubmissionHash, TransactionSubmitter, TransferCostEstimator},
    cost::{CostParameter, TransferCost},
    entries::{
        AmountEntry, CommissionEntry, Entry, FieldEntry, KeysEntry, MetadataUrlEntry,
        PoolTargetEntry,
    },
    handler::DataHandler,
    kind::TransactionKind,
    pool_settings::{self, PoolSettingsError},
    transfer::StakeTransfer,
    validation::{AmountValidatorConfig, StakeError},
    warnings::StakeWarning,
};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error(transparent)]
    PoolSettings(#[from] PoolSettingsError),

    #[error(transparent)]
    Collaborator(#[from] stakeflow_common::Error),

    #[error("no fee quote has been received yet")]
    MissingQuote,

    #[error("the fee quote no longer matches the staged changes")]
    StaleQuote,

    #[error("chain parameters have not been loaded")]
    MissingChainParameters,

    #[error("pool data for validator {0} has not been loaded")]
    MissingPoolData(ValidatorId),
}

/// A pending fee request: the parameters it was built from and the state it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub kind: TransactionKind,
    pub parameters: Vec<CostParameter>,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct AcceptedQuote {
    cost: TransferCost,
    generation: u64,
}

pub struct StakeFlow {
    handler: DataHandler,
    baseline: Option<StakeBaseline>,
    config: FlowConfig,
    estimator: Arc<dyn TransferCostEstimator>,
    submitter: Arc<dyn TransactionSubmitter>,
    chain: Option<ChainParameters>,
    pool: Option<PoolInfo>,
    maximum_stake: Option<StakeAmount>,
    parameters: Vec<CostParameter>,
    generation: u64,
    quote: Option<AcceptedQuote>,
}

impl StakeFlow {
    pub fn new(
        kind: TransactionKind,
        sender: AccountAddress,
        baseline: Option<StakeBaseline>,
        config: FlowConfig,
        estimator: Arc<dyn TransferCostEstimator>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        let handler = DataHandler::new(kind, sender, baseline.as_ref())
            .with_warning_threshold(config.warning_threshold_percent);
        let parameters = handler.get_cost_parameters();
        info!(%kind, existing = handler.has_current_data(), "starting staking flow");
        if let Some(change) = baseline.as_ref().and_then(StakeBaseline::pending_change) {
            let remaining = utils::cooldown_remaining(change, utils::current_timestamp());
            info!(
                effective = %utils::format_timestamp(change.effective_time()),
                remaining_secs = remaining.as_secs(),
                "stake change pending"
            );
        }

        Self {
            handler,
            baseline,
            config,
            estimator,
            submitter,
            chain: None,
            pool: None,
            maximum_stake: None,
            parameters,
            generation: 0,
            quote: None,
        }
    }

    pub fn handler(&self) -> &DataHandler {
        &self.handler
    }

    pub fn cost_parameters(&self) -> &[CostParameter] {
        &self.parameters
    }

    pub fn quote(&self) -> Option<TransferCost> {
        self.quote.map(|quote| quote.cost)
    }

    /// Upper bound for the stake, derived by the caller from the capital bound.
    pub fn set_maximum_stake(&mut self, maximum: Option<StakeAmount>) {
        self.maximum_stake = maximum;
    }

    /// Stages an edit. Returns whether the fee needs to be quoted again.
    pub fn stage<T: Entry>(&mut self, entry: T) -> bool {
        self.handler.add(entry);
        self.forget_other_pool();
        self.refresh_parameters()
    }

    pub fn stage_boxed(&mut self, entry: Box<dyn FieldEntry>) -> bool {
        self.handler.add_boxed(entry);
        self.forget_other_pool();
        self.refresh_parameters()
    }

    fn target_validator(&self) -> Option<ValidatorId> {
        self.handler
            .get_entry::<PoolTargetEntry>()
            .and_then(|entry| entry.0.validator_id())
    }

    // Loaded pool data only describes the pool that was targeted at load time.
    fn forget_other_pool(&mut self) {
        let target = self.target_validator();
        if let Some(pool) = self.pool {
            if target != Some(pool.validator_id) {
                debug!(validator = pool.validator_id, "target pool changed, dropping its pool data");
                self.pool = None;
            }
        }
    }

    /// State of the targeted validator pool; `None` when delegating passively.
    fn target_pool(&self) -> Result<Option<&PoolInfo>, FlowError> {
        match self.target_validator() {
            None => Ok(None),
            Some(validator) => self
                .pool
                .as_ref()
                .filter(|pool| pool.validator_id == validator)
                .map(Some)
                .ok_or(FlowError::MissingPoolData(validator)),
        }
    }

    fn refresh_parameters(&mut self) -> bool {
        let parameters = self.handler.get_cost_parameters();
        if parameters == self.parameters {
            return false;
        }
        self.parameters = parameters;
        self.generation += 1;
        debug!(generation = self.generation, "cost parameters changed");
        true
    }

    /// Snapshot to send to the fee service for the current staged state.
    pub fn quote_request(&self) -> QuoteRequest {
        QuoteRequest {
            kind: self.handler.resolved_kind(),
            parameters: self.parameters.clone(),
            generation: self.generation,
        }
    }

    /// Accepts a quote unless edits made since `request` have superseded it.
    pub fn accept_quote(&mut self, request: &QuoteRequest, cost: TransferCost) -> Result<(), FlowError> {
        if request.generation != self.generation {
            warn!(
                requested = request.generation,
                current = self.generation,
                "discarding stale fee quote"
            );
            return Err(FlowError::StaleQuote);
        }
        info!(cost = %cost.cost, energy = cost.energy, "fee quote accepted");
        self.quote = Some(AcceptedQuote {
            cost,
            generation: self.generation,
        });
        Ok(())
    }

    /// Requests and accepts a fee quote for the current staged state.
    pub async fn refresh_cost(&mut self) -> Result<TransferCost, FlowError> {
        let request = self.quote_request();
        let cost = self
            .estimator
            .estimate(request.kind, &request.parameters)
            .await?;
        self.accept_quote(&request, cost)?;
        Ok(cost)
    }

    /// Loads chain parameters and, for delegation to a validator pool, that pool's state.
    pub async fn load_chain_data(&mut self, source: &dyn StakingDataSource) -> Result<(), FlowError> {
        let (chain, pool) = match self.target_validator() {
            Some(validator) if self.handler.kind().is_delegation() => {
                let (chain, pool) =
                    futures::try_join!(source.chain_parameters(), source.pool_info(validator))?;
                (chain, Some(pool))
            }
            _ => (source.chain_parameters().await?, None),
        };
        self.chain = Some(chain);
        self.pool = pool;
        debug!(pool = ?self.pool.map(|pool| pool.validator_id), "chain data loaded");
        Ok(())
    }

    fn fresh_quote(&self) -> Result<TransferCost, FlowError> {
        match self.quote {
            None => Err(FlowError::MissingQuote),
            Some(quote) if quote.generation != self.generation => Err(FlowError::StaleQuote),
            Some(quote) => Ok(quote.cost),
        }
    }

    /// Validation snapshot for the current state; `None` for kinds that stake nothing.
    pub fn amount_config(&self, balances: &AccountBalances) -> Result<Option<AmountValidatorConfig>, FlowError> {
        let kind = self.handler.resolved_kind();
        if kind.is_removal() || !kind.is_relevant(AmountEntry::FIELD) {
            return Ok(None);
        }

        let baseline = self.baseline.as_ref();
        let floor = self.config.registration_floor;
        let config = if kind.is_delegation() {
            let target = self
                .handler
                .get_entry::<PoolTargetEntry>()
                .map(|entry| entry.0)
                .ok_or(StakeError::InternalError)?;
            AmountValidatorConfig::for_delegation(baseline, balances, target, self.target_pool()?, floor)
        } else {
            let chain = self.chain.as_ref().ok_or(FlowError::MissingChainParameters)?;
            AmountValidatorConfig::for_validator(baseline, balances, chain, self.maximum_stake, floor)
        };
        Ok(Some(config))
    }

    /// Validates the staged amount against the current fee quote.
    pub fn validate_amount(&self, balances: &AccountBalances) -> Result<Option<StakeAmount>, FlowError> {
        let fee = self.fresh_quote()?.cost;
        let config = match self.amount_config(balances)? {
            Some(config) => config,
            None => return Ok(None),
        };
        let amount = self
            .handler
            .get_entry::<AmountEntry>()
            .map(|entry| entry.0)
            .ok_or(StakeError::InternalError)?;

        Ok(Some(config.validate(amount, fee)?))
    }

    /// Checks pool settings, keys and target pool openness for the resolved kind.
    pub fn validate_settings(&self) -> Result<(), FlowError> {
        let kind = self.handler.resolved_kind();

        if kind.is_relevant(CommissionEntry::FIELD) {
            let chain = self.chain.as_ref().ok_or(FlowError::MissingChainParameters)?;
            if let Some(entry) = self.handler.get_entry::<CommissionEntry>() {
                pool_settings::check_commissions(&entry.0, &chain.commission_ranges)?;
            }
        }

        if kind.is_relevant(MetadataUrlEntry::FIELD) {
            if let Some(entry) = self.handler.get_entry::<MetadataUrlEntry>() {
                pool_settings::check_metadata_url(&entry.0, self.config.metadata_url_max_len)?;
            }
        }

        if kind.is_relevant(KeysEntry::FIELD) {
            match self.handler.get_entry::<KeysEntry>() {
                Some(entry) if entry.0.is_complete() => {}
                _ => return Err(PoolSettingsError::MissingKeys.into()),
            }
        }

        if kind.is_relevant(PoolTargetEntry::FIELD) {
            if let Some(pool) = self.target_pool()? {
                let joining = self.baseline.as_ref().map(StakeBaseline::target)
                    != Some(DelegationTarget::Validator(pool.validator_id));
                pool_settings::check_pool_open(pool, joining)?;
            }
        }

        Ok(())
    }

    pub fn warning(&self, balances: &AccountBalances) -> Option<StakeWarning> {
        self.handler
            .get_current_warning(balances.at_disposal, balances.release_schedule_locked)
    }

    /// The payload that `submit` would send, priced with the current quote.
    pub fn transfer(&self) -> Result<StakeTransfer, FlowError> {
        let quote = self.fresh_quote()?;
        Ok(self.handler.get_transfer_object(quote.cost, quote.energy))
    }

    /// Validates everything once more and hands the payload to the submitter.
    pub async fn submit(&self, balances: &AccountBalances) -> Result<SubmissionHash, FlowError> {
        self.validate_settings()?;
        self.validate_amount(balances)?;
        let transfer = self.transfer()?;

        let hash = self.submitter.submit(&transfer).await?;
        info!(kind = %transfer.kind, %hash, "staking transaction submitted");
        Ok(hash)
    }
}
