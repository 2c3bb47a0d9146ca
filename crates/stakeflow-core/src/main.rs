// crates/stakeflow-core/src/main.rs

use {
    anyhow::{Context, Result},
    clap::Parser,
    serde::Deserialize,
    serde_json::json,
    stakeflow_common::{
        AccountAddress, AccountBalances, ChainParameters, FlowConfig, PoolInfo, StakeAmount,
        StakeBaseline,
    },
    stakeflow_core::{
        maximum_from_capital_bound, DryRunSubmitter, FixedCostEstimator, StagedEntry, StakeFlow,
        StaticDataSource, TransactionKind, TransferCost,
    },
    std::{
        fs,
        path::{Path, PathBuf},
        sync::Arc,
    },
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, FmtSubscriber},
};

#[derive(Parser, Debug)]
#[command(
    name = "stakeflow",
    about = "Prepare, price and validate a staking transaction from a scenario file",
    version
)]
struct Cli {
    /// Scenario describing the account, the staged edits and the chain state
    #[arg(long)]
    scenario: PathBuf,

    /// Flow configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    kind: TransactionKind,
    sender: AccountAddress,
    #[serde(default)]
    baseline: Option<StakeBaseline>,
    #[serde(default)]
    staged: Vec<StagedEntry>,
    balances: AccountBalances,
    chain: ChainParameters,
    #[serde(default)]
    pools: Vec<PoolInfo>,
    fee: TransferCost,
    /// Total stake on chain, used to derive the capital bound for validators.
    #[serde(default)]
    total_staked: Option<StakeAmount>,
    #[serde(default)]
    committed_elsewhere: StakeAmount,
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    serde_json::from_str(&contents).context("Failed to parse scenario")
}

fn init_tracing(config: &FlowConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FlowConfig::from_file(path).context("Failed to load configuration")?,
        None => FlowConfig::default(),
    };
    init_tracing(&config)?;

    let scenario = load_scenario(&cli.scenario)?;
    info!(kind = %scenario.kind, sender = %scenario.sender, "loaded scenario");

    let submitter = Arc::new(DryRunSubmitter::new());
    let mut flow = StakeFlow::new(
        scenario.kind,
        scenario.sender,
        scenario.baseline,
        config,
        Arc::new(FixedCostEstimator::new(scenario.fee)),
        submitter.clone(),
    );
    for entry in scenario.staged {
        flow.stage_boxed(entry.into_entry());
    }

    if let Some(total) = scenario.total_staked {
        if !scenario.kind.is_delegation() {
            let bound = scenario.chain.capital_bound_of(total);
            flow.set_maximum_stake(Some(maximum_from_capital_bound(bound, scenario.committed_elsewhere)));
        }
    }

    let source = StaticDataSource::new(scenario.chain, scenario.pools);
    flow.load_chain_data(&source)
        .await
        .context("Failed to load chain data")?;
    let cost = flow.refresh_cost().await.context("Failed to estimate transaction cost")?;

    let validation = flow
        .validate_settings()
        .and_then(|_| flow.validate_amount(&scenario.balances));
    let submission = match &validation {
        Ok(_) => Some(flow.submit(&scenario.balances).await.context("Submission failed")?),
        Err(e) => {
            error!("Validation failed: {}", e);
            None
        }
    };

    let handler = flow.handler();
    let report = json!({
        "kind": handler.resolved_kind(),
        "currentRows": handler.get_current_ordered(),
        "rows": handler.get_all_ordered(),
        "costParameters": flow.cost_parameters(),
        "cost": cost,
        "validation": validation.as_ref().map(|_| "ok".to_string()).unwrap_or_else(|e| e.to_string()),
        "warning": flow.warning(&scenario.balances).map(|warning| json!({
            "message": warning.prompt(),
            "actions": warning.actions(),
        })),
        "transfer": flow.transfer().ok(),
        "submission": submission,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(submitted = submitter.submitted().len(), "scenario finished");
    Ok(())
}
