//! Services the staking flow depends on but does not implement
//!
//! Fee estimation, chain data and transaction submission all live behind
//! these traits so a flow is constructed with its collaborators instead
//! of looking them up.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    stakeflow_common::{ChainParameters, Error, PoolInfo, Result, ValidatorId},
    std::{
        collections::HashMap,
        fmt::{self, Display, Formatter},
        sync::Mutex,
    },
    tracing::info,
};

#[cfg(test)]
use mockall::automock;

use crate::{
    cost::{CostParameter, TransferCost},
    kind::TransactionKind,
    transfer::StakeTransfer,
};

/// Hash the node assigns to a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionHash(pub String);

impl Display for SubmissionHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quotes the cost of a transaction described by cost parameters.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransferCostEstimator: Send + Sync + 'static {
    async fn estimate(&self, kind: TransactionKind, parameters: &[CostParameter]) -> Result<TransferCost>;
}

/// Signs and broadcasts a finished transaction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransactionSubmitter: Send + Sync + 'static {
    async fn submit(&self, transfer: &StakeTransfer) -> Result<SubmissionHash>;
}

/// Chain and pool state the validation rules depend on.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StakingDataSource: Send + Sync + 'static {
    async fn chain_parameters(&self) -> Result<ChainParameters>;

    async fn pool_info(&self, validator: ValidatorId) -> Result<PoolInfo>;
}

/// Answers every request with the same quote.
#[derive(Debug, Clone, Copy)]
pub struct FixedCostEstimator {
    cost: TransferCost,
}

impl FixedCostEstimator {
    pub fn new(cost: TransferCost) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl TransferCostEstimator for FixedCostEstimator {
    async fn estimate(&self, _kind: TransactionKind, _parameters: &[CostParameter]) -> Result<TransferCost> {
        Ok(self.cost)
    }
}

/// Records transfers instead of broadcasting them.
#[derive(Debug, Default)]
pub struct DryRunSubmitter {
    submitted: Mutex<Vec<StakeTransfer>>,
}

impl DryRunSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<StakeTransfer> {
        self.submitted
            .lock()
            .map(|submitted| submitted.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TransactionSubmitter for DryRunSubmitter {
    async fn submit(&self, transfer: &StakeTransfer) -> Result<SubmissionHash> {
        let payload = serde_json::to_vec(transfer)?;
        let mut submitted = self
            .submitted
            .lock()
            .map_err(|_| Error::Other("dry-run log poisoned".into()))?;
        submitted.push(transfer.clone());

        let hash = SubmissionHash(format!("dry-run-{}-{}", submitted.len(), payload.len()));
        info!(kind = %transfer.kind, %hash, "dry-run submission recorded");
        Ok(hash)
    }
}

/// Chain data held in memory, e.g. loaded from a scenario file.
#[derive(Debug, Clone)]
pub struct StaticDataSource {
    chain: ChainParameters,
    pools: HashMap<ValidatorId, PoolInfo>,
}

impl StaticDataSource {
    pub fn new(chain: ChainParameters, pools: impl IntoIterator<Item = PoolInfo>) -> Self {
        Self {
            chain,
            pools: pools.into_iter().map(|pool| (pool.validator_id, pool)).collect(),
        }
    }
}

#[async_trait]
impl StakingDataSource for StaticDataSource {
    async fn chain_parameters(&self) -> Result<ChainParameters> {
        Ok(self.chain)
    }

    async fn pool_info(&self, validator: ValidatorId) -> Result<PoolInfo> {
        self.pools
            .get(&validator)
            .copied()
            .ok_or_else(|| Error::Network(format!("pool {} not found", validator)))
    }
}
