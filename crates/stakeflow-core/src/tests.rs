//! End-to-end tests for staking flows
//!
//! These drive the handler, validator and flow together the way the wallet does.

#[cfg(test)]
mod tests {
    use {
        std::sync::Arc,
        stakeflow_common::{
            AccountAddress, AccountBalances, ChainParameters, CommissionRange, CommissionRanges,
            CommissionRate, CommissionRates, DelegationTarget, Error, FlowConfig, OpenStatus,
            PendingChange, PoolInfo, StakeAmount, StakeBaseline, ValidatorKeys,
        },
    };

    use crate::{
        collaborators::{
            DryRunSubmitter, FixedCostEstimator, MockTransferCostEstimator, MockTransactionSubmitter,
            StaticDataSource,
        },
        AmountEntry, AmountValidatorConfig, CommissionEntry, CostParameter, DataHandler, FlowError,
        KeysEntry, MetadataUrlEntry, OpenStatusEntry, PoolSettingsError, PoolTargetEntry,
        RestakeEntry, StakeError, StakeFlow, StakeWarning, TransactionKind, TransferCost,
        maximum_from_capital_bound,
    };

    fn micro(value: u64) -> StakeAmount {
        StakeAmount::from_micro(value)
    }

    fn sender() -> AccountAddress {
        AccountAddress::new("3kBx2h5Y2veb4hZgAJWPrr8RyQESKm5TjzF3ti1QQ4VSYLwK1G").unwrap()
    }

    fn balances(at_disposal: u64) -> AccountBalances {
        AccountBalances {
            total: micro(at_disposal),
            at_disposal: micro(at_disposal),
            release_schedule_locked: StakeAmount::ZERO,
        }
    }

    fn chain(minimum_equity_capital: u64) -> ChainParameters {
        let range = |min, max| CommissionRange {
            min: CommissionRate(min),
            max: CommissionRate(max),
        };
        ChainParameters {
            minimum_equity_capital: micro(minimum_equity_capital),
            capital_bound: 10_000,
            commission_ranges: CommissionRanges {
                transaction: range(5_000, 10_000),
                baking: range(5_000, 10_000),
                finalization: range(100_000, 100_000),
            },
        }
    }

    fn pool(validator_id: u64, capital: u64, cap: u64) -> PoolInfo {
        PoolInfo {
            validator_id,
            delegated_capital: micro(capital),
            delegated_capital_cap: micro(cap),
            open_status: OpenStatus::OpenForAll,
        }
    }

    fn delegator(staked: u64, target: DelegationTarget) -> StakeBaseline {
        StakeBaseline::Delegator {
            staked: micro(staked),
            restake: true,
            target,
            pending_change: None,
        }
    }

    fn fixed_cost(cost: u64, energy: u64) -> Arc<FixedCostEstimator> {
        Arc::new(FixedCostEstimator::new(TransferCost {
            cost: micro(cost),
            energy,
        }))
    }

    #[test]
    fn test_fresh_registration_rejects_zero() {
        let config = AmountValidatorConfig::for_validator(None, &balances(1_000_000), &chain(0), None, micro(1));
        assert_eq!(config.minimum_value, micro(1));
        assert_eq!(
            config.validate(StakeAmount::ZERO, micro(100)),
            Err(StakeError::AmountTooSmall { minimum: micro(1) })
        );
    }

    #[test]
    fn test_zero_stake_routes_to_removal() {
        let baseline = StakeBaseline::Validator {
            id: 3,
            staked: micro(1000),
            restake: false,
            open_status: OpenStatus::OpenForAll,
            commissions: CommissionRates::default(),
            metadata_url: String::new(),
            suspended: false,
            pending_change: None,
        };
        let mut handler = DataHandler::new(TransactionKind::UpdateValidatorStake, sender(), Some(&baseline));
        handler.add(AmountEntry(StakeAmount::ZERO));

        assert!(handler.is_new_amount_zero());
        assert_eq!(handler.resolved_kind(), TransactionKind::RemoveValidator);

        let transfer = handler.get_transfer_object(micro(5), 1);
        assert_eq!(transfer.kind, TransactionKind::RemoveValidator);
        assert_eq!(transfer.amount, Some(StakeAmount::ZERO));
        assert_eq!(transfer.restake, None);
    }

    #[test]
    fn test_new_delegator_against_pool_limit() {
        let target_pool = pool(5, 9_500, 10_000);
        let config = AmountValidatorConfig::for_delegation(
            None,
            &balances(1_000_000),
            DelegationTarget::Validator(5),
            Some(&target_pool),
            micro(1),
        );
        assert_eq!(
            config.validate(micro(600), micro(10)),
            Err(StakeError::PoolLimitReached { limit: micro(10_000) })
        );
        assert_eq!(config.validate(micro(400), micro(10)), Ok(micro(400)));
    }

    #[test]
    fn test_switching_pools_does_not_count_prior_stake() {
        let baseline = delegator(2_000, DelegationTarget::Validator(1));
        let target_pool = pool(2, 7_000, 10_000);
        let config = AmountValidatorConfig::for_delegation(
            Some(&baseline),
            &balances(1_000_000),
            DelegationTarget::Validator(2),
            Some(&target_pool),
            micro(1),
        );
        assert_eq!(config.validate(micro(3_000), micro(10)), Ok(micro(3_000)));

        // Had the 2000 already been in pool 2, the same capital would leave room for 5000.
        let counted = AmountValidatorConfig {
            old_pool: Some(DelegationTarget::Validator(2)),
            ..config
        };
        assert_eq!(counted.validate(micro(5_000), micro(10)), Ok(micro(5_000)));
    }

    #[test]
    fn test_passive_delegation_skips_pool_limit() {
        let full_pool = pool(5, 10_000, 10_000);
        let config = AmountValidatorConfig::for_delegation(
            None,
            &balances(1_000_000),
            DelegationTarget::Passive,
            Some(&full_pool),
            micro(1),
        );
        assert_eq!(config.pool_limit, None);
        assert_eq!(config.validate(micro(50_000), micro(10)), Ok(micro(50_000)));
    }

    #[test]
    fn test_lowering_then_restoring_stake() {
        let baseline = delegator(5000, DelegationTarget::Passive);
        let mut handler = DataHandler::new(TransactionKind::UpdateDelegation, sender(), Some(&baseline));

        handler.add(AmountEntry(micro(4000)));
        assert!(matches!(
            handler.get_current_warning(micro(1_000_000), StakeAmount::ZERO),
            Some(StakeWarning::StakeLowered { .. })
        ));

        handler.add(AmountEntry(micro(5000)));
        assert_eq!(
            handler.get_current_warning(micro(1_000_000), StakeAmount::ZERO),
            Some(StakeWarning::NoChanges)
        );
    }

    #[test]
    fn test_below_minimum_regardless_of_fee_and_balance() {
        for (fee, at_disposal) in [(0, 0), (1, 1_000_000), (1_000_000, 0), (u64::MAX, u64::MAX)] {
            let config = AmountValidatorConfig::for_validator(None, &balances(at_disposal), &chain(500), None, micro(1));
            for amount in [0, 1, 499] {
                assert_eq!(
                    config.validate(micro(amount), micro(fee)),
                    Err(StakeError::AmountTooSmall { minimum: micro(500) })
                );
            }
        }
    }

    #[test]
    fn test_insufficient_funds_for_registration() {
        for (amount, fee, at_disposal) in [(100, 1, 100), (50, 51, 100), (1, 0, 0), (u64::MAX, 1, u64::MAX)] {
            let config = AmountValidatorConfig::for_validator(None, &balances(at_disposal), &chain(0), None, micro(1));
            assert_eq!(
                config.validate(micro(amount), micro(fee)),
                Err(StakeError::InsufficientFunds { fee: micro(fee) }),
                "amount {} fee {} at disposal {}",
                amount,
                fee,
                at_disposal
            );
        }
    }

    #[test]
    fn test_adding_twice_is_idempotent() {
        let baseline = delegator(5000, DelegationTarget::Passive);
        let mut handler = DataHandler::new(TransactionKind::UpdateDelegation, sender(), Some(&baseline));
        assert!(!handler.contains_changes());

        handler.add(PoolTargetEntry(DelegationTarget::Validator(8)));
        let parameters = handler.get_cost_parameters();
        let rows = handler.get_all_ordered();
        assert!(handler.contains_changes());

        handler.add(PoolTargetEntry(DelegationTarget::Validator(8)));
        assert_eq!(handler.staged().len(), 1);
        assert_eq!(handler.get_cost_parameters(), parameters);
        assert_eq!(handler.get_cost_parameters(), handler.get_cost_parameters());
        assert_eq!(handler.get_all_ordered(), rows);
        assert!(handler.contains_changes());
    }

    #[test]
    fn test_stale_quote_is_discarded() {
        let mut flow = StakeFlow::new(
            TransactionKind::AddDelegation,
            sender(),
            None,
            FlowConfig::default(),
            Arc::new(MockTransferCostEstimator::new()),
            Arc::new(DryRunSubmitter::new()),
        );
        assert!(flow.stage(AmountEntry(micro(1_000))));
        let request = flow.quote_request();

        assert!(flow.stage(AmountEntry(micro(2_000))));
        let cost = TransferCost { cost: micro(10), energy: 300 };
        assert!(matches!(flow.accept_quote(&request, cost), Err(FlowError::StaleQuote)));
        assert_eq!(flow.quote(), None);

        let request = flow.quote_request();
        assert!(flow.accept_quote(&request, cost).is_ok());
        // Restaging the same value does not invalidate the quote.
        assert!(!flow.stage(AmountEntry(micro(2_000))));
        assert!(flow.transfer().is_ok());
    }

    #[tokio::test]
    async fn test_delegation_pipeline_submits_payload() {
        let mut estimator = MockTransferCostEstimator::new();
        estimator
            .expect_estimate()
            .withf(|kind, parameters| {
                *kind == TransactionKind::AddDelegation
                    && parameters.contains(&CostParameter::Target(5))
                    && parameters.len() == 4
            })
            .times(1)
            .returning(|_, _| Ok(TransferCost { cost: micro(2_500), energy: 600 }));

        let submitter = Arc::new(DryRunSubmitter::new());
        let mut flow = StakeFlow::new(
            TransactionKind::AddDelegation,
            sender(),
            None,
            FlowConfig::default(),
            Arc::new(estimator),
            submitter.clone(),
        );
        flow.stage(AmountEntry(micro(400)));
        flow.stage(RestakeEntry(true));
        flow.stage(PoolTargetEntry(DelegationTarget::Validator(5)));

        let source = StaticDataSource::new(chain(0), vec![pool(5, 9_500, 10_000)]);
        flow.load_chain_data(&source).await.unwrap();
        let cost = flow.refresh_cost().await.unwrap();
        assert_eq!(cost.energy, 600);

        let balances = balances(1_000_000);
        assert_eq!(flow.validate_amount(&balances).unwrap(), Some(micro(400)));
        assert_eq!(flow.warning(&balances), None);

        let hash = flow.submit(&balances).await.unwrap();
        assert!(hash.0.starts_with("dry-run-1"));

        let submitted = submitter.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].amount, Some(micro(400)));
        assert_eq!(submitted[0].target, Some(DelegationTarget::Validator(5)));
        assert_eq!(submitted[0].cost, micro(2_500));
    }

    #[tokio::test]
    async fn test_pool_limit_blocks_submission() {
        let mut submitter = MockTransactionSubmitter::new();
        submitter.expect_submit().never();

        let mut flow = StakeFlow::new(
            TransactionKind::AddDelegation,
            sender(),
            None,
            FlowConfig::default(),
            fixed_cost(10, 300),
            Arc::new(submitter),
        );
        flow.stage(AmountEntry(micro(600)));
        flow.stage(PoolTargetEntry(DelegationTarget::Validator(5)));
        flow.load_chain_data(&StaticDataSource::new(chain(0), vec![pool(5, 9_500, 10_000)]))
            .await
            .unwrap();
        flow.refresh_cost().await.unwrap();

        match flow.submit(&balances(1_000_000)).await {
            Err(FlowError::Stake(error)) => assert!(error.highlights_pool_limit()),
            other => panic!("expected pool limit error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_pool_rejects_new_delegator() {
        let mut closed = pool(5, 0, 10_000);
        closed.open_status = OpenStatus::ClosedForNew;

        let mut flow = StakeFlow::new(
            TransactionKind::AddDelegation,
            sender(),
            None,
            FlowConfig::default(),
            fixed_cost(10, 300),
            Arc::new(DryRunSubmitter::new()),
        );
        flow.stage(AmountEntry(micro(100)));
        flow.stage(PoolTargetEntry(DelegationTarget::Validator(5)));
        flow.load_chain_data(&StaticDataSource::new(chain(0), vec![closed]))
            .await
            .unwrap();
        flow.refresh_cost().await.unwrap();

        assert!(matches!(
            flow.submit(&balances(1_000_000)).await,
            Err(FlowError::PoolSettings(PoolSettingsError::PoolClosed(5)))
        ));
    }

    #[tokio::test]
    async fn test_fee_service_failure_passes_through() {
        let mut estimator = MockTransferCostEstimator::new();
        estimator
            .expect_estimate()
            .returning(|_, _| Err(Error::Network("connection reset".into())));

        let mut flow = StakeFlow::new(
            TransactionKind::RemoveDelegation,
            sender(),
            Some(delegator(100, DelegationTarget::Passive)),
            FlowConfig::default(),
            Arc::new(estimator),
            Arc::new(DryRunSubmitter::new()),
        );

        match flow.refresh_cost().await {
            Err(FlowError::Collaborator(error)) => assert!(error.is_retryable()),
            other => panic!("expected collaborator error, got {:?}", other),
        }
        assert!(matches!(
            flow.submit(&balances(100)).await,
            Err(FlowError::MissingQuote)
        ));
    }

    #[tokio::test]
    async fn test_registration_checks_pool_settings() {
        let mut flow = StakeFlow::new(
            TransactionKind::RegisterValidator,
            sender(),
            None,
            FlowConfig::default(),
            fixed_cost(10, 300),
            Arc::new(DryRunSubmitter::new()),
        );
        flow.stage(AmountEntry(micro(50_000)));
        flow.stage(RestakeEntry(true));
        flow.stage(OpenStatusEntry(OpenStatus::OpenForAll));
        flow.stage(CommissionEntry(CommissionRates {
            transaction: CommissionRate(10_000),
            baking: CommissionRate(20_000),
            finalization: CommissionRate(100_000),
        }));
        flow.stage(MetadataUrlEntry("https://validator.example".into()));
        flow.stage(KeysEntry(ValidatorKeys {
            signature_verify_key: "01".into(),
            signature_proof: "5151".into(),
            election_verify_key: "02".into(),
            election_proof: "e1e1".into(),
            aggregation_verify_key: "03".into(),
            aggregation_proof: "a9a9".into(),
        }));

        let balances = balances(1_000_000);
        assert!(matches!(
            flow.submit(&balances).await,
            Err(FlowError::MissingChainParameters)
        ));

        flow.load_chain_data(&StaticDataSource::new(chain(10_000), vec![])).await.unwrap();
        flow.refresh_cost().await.unwrap();
        assert!(matches!(
            flow.submit(&balances).await,
            Err(FlowError::PoolSettings(PoolSettingsError::CommissionOutOfRange { .. }))
        ));

        // Fixing the commission changes the parameters, so the old quote is stale.
        flow.stage(CommissionEntry(CommissionRates {
            transaction: CommissionRate(10_000),
            baking: CommissionRate(10_000),
            finalization: CommissionRate(100_000),
        }));
        assert!(matches!(flow.submit(&balances).await, Err(FlowError::StaleQuote)));

        flow.refresh_cost().await.unwrap();
        assert!(flow.submit(&balances).await.is_ok());
    }

    #[tokio::test]
    async fn test_cooldown_keeps_amount_locked() {
        let baseline = StakeBaseline::Delegator {
            staked: micro(1_000),
            restake: true,
            target: DelegationTarget::Passive,
            pending_change: Some(PendingChange::ReduceStake {
                new_stake: micro(500),
                effective_time: chrono::Utc::now() + chrono::Duration::days(14),
            }),
        };
        let mut flow = StakeFlow::new(
            TransactionKind::UpdateDelegation,
            sender(),
            Some(baseline),
            FlowConfig::default(),
            fixed_cost(10, 300),
            Arc::new(DryRunSubmitter::new()),
        );
        flow.stage(RestakeEntry(false));
        flow.refresh_cost().await.unwrap();

        let balances = balances(50);
        assert_eq!(flow.validate_amount(&balances).unwrap(), Some(micro(1_000)));

        flow.stage(AmountEntry(micro(900)));
        flow.refresh_cost().await.unwrap();
        assert!(matches!(
            flow.validate_amount(&balances),
            Err(FlowError::Stake(StakeError::InternalError))
        ));
    }

    fn validator(staked: u64) -> StakeBaseline {
        StakeBaseline::Validator {
            id: 11,
            staked: micro(staked),
            restake: true,
            open_status: OpenStatus::OpenForAll,
            commissions: CommissionRates::default(),
            metadata_url: String::new(),
            suspended: false,
            pending_change: None,
        }
    }

    #[tokio::test]
    async fn test_retargeting_requires_fresh_pool_data() {
        let mut closed = pool(6, 9_500, 10_000);
        closed.open_status = OpenStatus::ClosedForAll;
        let source = StaticDataSource::new(chain(0), vec![pool(5, 0, 10_000), closed]);

        let mut flow = StakeFlow::new(
            TransactionKind::AddDelegation,
            sender(),
            None,
            FlowConfig::default(),
            fixed_cost(10, 300),
            Arc::new(DryRunSubmitter::new()),
        );
        flow.stage(AmountEntry(micro(600)));
        flow.stage(PoolTargetEntry(DelegationTarget::Validator(5)));
        flow.load_chain_data(&source).await.unwrap();

        flow.stage(PoolTargetEntry(DelegationTarget::Validator(6)));
        flow.refresh_cost().await.unwrap();
        let balances = balances(1_000_000);
        assert!(matches!(
            flow.validate_amount(&balances),
            Err(FlowError::MissingPoolData(6))
        ));
        assert!(matches!(
            flow.submit(&balances).await,
            Err(FlowError::MissingPoolData(6))
        ));

        flow.load_chain_data(&source).await.unwrap();
        assert!(matches!(
            flow.validate_amount(&balances),
            Err(FlowError::Stake(StakeError::PoolLimitReached { .. }))
        ));
        assert!(matches!(
            flow.submit(&balances).await,
            Err(FlowError::PoolSettings(PoolSettingsError::PoolClosed(6)))
        ));
    }

    #[tokio::test]
    async fn test_capital_bound_caps_registration() {
        let chain = chain(10_000);
        let mut flow = StakeFlow::new(
            TransactionKind::RegisterValidator,
            sender(),
            None,
            FlowConfig::default(),
            fixed_cost(10, 300),
            Arc::new(DryRunSubmitter::new()),
        );
        // 10% of 1_000_000 total stake, less 40_000 committed elsewhere.
        let bound = chain.capital_bound_of(micro(1_000_000));
        assert_eq!(bound, micro(100_000));
        flow.set_maximum_stake(Some(maximum_from_capital_bound(bound, micro(40_000))));

        flow.stage(AmountEntry(micro(60_001)));
        flow.load_chain_data(&StaticDataSource::new(chain, vec![])).await.unwrap();
        flow.refresh_cost().await.unwrap();
        let balances = balances(1_000_000);
        assert!(matches!(
            flow.validate_amount(&balances),
            Err(FlowError::Stake(StakeError::AmountTooLarge { maximum })) if maximum == micro(60_000)
        ));

        flow.stage(AmountEntry(micro(60_000)));
        flow.refresh_cost().await.unwrap();
        assert_eq!(flow.validate_amount(&balances).unwrap(), Some(micro(60_000)));
    }

    #[tokio::test]
    async fn test_validator_may_lower_below_registration_minimum() {
        let mut flow = StakeFlow::new(
            TransactionKind::UpdateValidatorStake,
            sender(),
            Some(validator(20_000)),
            FlowConfig::default(),
            fixed_cost(10, 300),
            Arc::new(DryRunSubmitter::new()),
        );
        flow.stage(AmountEntry(micro(5_000)));
        flow.load_chain_data(&StaticDataSource::new(chain(14_000), vec![])).await.unwrap();
        flow.refresh_cost().await.unwrap();

        let balances = AccountBalances {
            total: micro(21_000),
            at_disposal: micro(1_000),
            release_schedule_locked: StakeAmount::ZERO,
        };
        assert_eq!(flow.validate_amount(&balances).unwrap(), Some(micro(5_000)));
        assert!(matches!(flow.warning(&balances), Some(StakeWarning::StakeLowered { .. })));

        // Zero turns the update into a removal, which stakes nothing.
        flow.stage(AmountEntry(StakeAmount::ZERO));
        flow.refresh_cost().await.unwrap();
        assert_eq!(flow.validate_amount(&balances).unwrap(), None);
        assert_eq!(flow.warning(&balances), Some(StakeWarning::AmountZero));
    }

    #[test]
    fn test_balance_share_includes_release_schedule() {
        let mut handler = DataHandler::new(TransactionKind::AddDelegation, sender(), None);
        handler.add(AmountEntry(micro(940)));
        handler.add(PoolTargetEntry(DelegationTarget::Passive));

        // 95% of 600 + 400 is 950.
        assert_eq!(handler.get_current_warning(micro(600), micro(400)), None);
        assert_eq!(
            handler.get_current_warning(micro(600), StakeAmount::ZERO),
            Some(StakeWarning::ExceedsBalanceShare { percent: 95 })
        );

        handler.add(AmountEntry(micro(960)));
        assert_eq!(
            handler.get_current_warning(micro(600), micro(400)),
            Some(StakeWarning::ExceedsBalanceShare { percent: 95 })
        );

        let mut strict =
            DataHandler::new(TransactionKind::AddDelegation, sender(), None).with_warning_threshold(90);
        strict.add(AmountEntry(micro(940)));
        assert_eq!(
            strict.get_current_warning(micro(600), micro(400)),
            Some(StakeWarning::ExceedsBalanceShare { percent: 90 })
        );
    }
}
