//! # Pool Funding Integration Flows
//!
//! Drives the full service (store, bank, registry, publisher) through the
//! lifecycles a chain would: funders join, bundles are charged, slots are
//! contested and funders leave.

#[cfg(test)]
mod tests {
    use super::super::init_tracing;
    use primitive_types::U256;
    use qc_18_pool_funding::adapters::{
        topic_of, topics, InMemoryBank, InMemoryKVStore, InMemoryPoolRegistry,
        RecordingPublisher,
    };
    use qc_18_pool_funding::test_utils::{
        addr, addr_u32, native, register_funded, test_service, test_service_with, TestService,
    };
    use qc_18_pool_funding::{
        ErrorKind, FundersParams, FundingConfig, FundingError, FundingEvent, FundingQueryApi,
        FundingService, FundingStatus, GenesisState, PageRequest, PoolFundingApi, PoolStatus,
        Weight, WhitelistEntry,
    };
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use shared_types::{Address, Coins, NATIVE_DENOM};
    use std::collections::BTreeSet;

    const POOL: u64 = 0;
    const USDC: &str = "uusdc";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Native at weight 1, USDC at weight 2.5, `cap` slots.
    fn two_coin_config(cap: usize) -> FundingConfig {
        let mut config = FundingConfig::for_testing();
        config.params.coin_whitelist.push(WhitelistEntry {
            denom: USDC.to_string(),
            min_funding_amount: U256::one(),
            min_funding_amount_per_bundle: U256::one(),
            coin_weight: "2.5".parse::<Weight>().unwrap(),
        });
        config.params.max_active_funders = cap;
        config
    }

    fn usdc(amount: u64) -> Coins {
        Coins::single(USDC, amount)
    }

    fn active_set(service: &TestService, pool_id: u64) -> Vec<Address> {
        service.funding_state(pool_id).unwrap().active_funders
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[test]
    fn test_pool_lifecycle_until_out_of_funds() {
        init_tracing();
        let mut service = test_service([POOL]);
        register_funded(&mut service, addr(1), 1_000).unwrap();
        register_funded(&mut service, addr(2), 1_000).unwrap();

        service
            .fund_pool(addr(1), POOL, native(100), native(1))
            .unwrap();
        service
            .fund_pool(addr(2), POOL, native(50), native(10))
            .unwrap();

        let mut payouts = Coins::new();
        let mut bundles = 0;
        while !active_set(&service, POOL).is_empty() {
            let result = service.charge_bundle(POOL).unwrap();
            payouts = payouts.checked_add(&result.total_payout).unwrap();
            bundles += 1;
        }

        // B lasts 5 bundles, A 100 bundles
        assert_eq!(bundles, 100);
        assert_eq!(payouts, native(150));
        assert_eq!(service.bank().escrow(), &native(150));

        let events = service.events().events();
        let out_of_funds: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, FundingEvent::PoolOutOfFunds { .. }))
            .collect();
        assert_eq!(out_of_funds.len(), 1);

        let stats = service.get_funder(&addr(2)).unwrap().stats;
        assert_eq!(stats.total_used, native(50));
        assert!(stats.pools_funded.is_empty());
    }

    #[test]
    fn test_refund_and_rejoin() {
        let mut service = test_service([POOL]);
        register_funded(&mut service, addr(1), 1_000).unwrap();
        service
            .fund_pool(addr(1), POOL, native(300), native(3))
            .unwrap();
        service.charge_bundle(POOL).unwrap();

        let removed = service.defund_pool(addr(1), POOL, native(10_000)).unwrap();
        assert_eq!(removed, native(297));
        assert!(active_set(&service, POOL).is_empty());
        assert_eq!(service.bank().balance_of(&addr(1)), native(997));

        service
            .fund_pool(addr(1), POOL, native(50), native(1))
            .unwrap();
        let funding = service.get_funding(&addr(1), POOL).unwrap();
        assert_eq!(funding.balances, native(50));
        assert_eq!(funding.total_charged, native(3));
        assert_eq!(active_set(&service, POOL), vec![addr(1)]);
    }

    #[test]
    fn test_funder_across_pools() {
        let mut service = test_service([1, 2, 3]);
        register_funded(&mut service, addr(1), 1_000).unwrap();
        for pool_id in [1, 2, 3] {
            service
                .fund_pool(addr(1), pool_id, native(100), native(pool_id))
                .unwrap();
        }
        service.charge_bundle(2).unwrap();
        service.defund_pool(addr(1), 3, native(100)).unwrap();

        let stats = service.get_funder(&addr(1)).unwrap().stats;
        assert_eq!(stats.pools_funded, vec![1, 2]);
        assert_eq!(stats.total_allocated, native(198));
        assert_eq!(stats.total_per_bundle, native(3));

        let active = service
            .fundings_by_funder(&addr(1), FundingStatus::Active, PageRequest::default())
            .unwrap();
        assert_eq!(active.total, 2);
    }

    #[test]
    fn test_weighted_currency_displaces_native() {
        let mut service = test_service_with(two_coin_config(3), [POOL]);
        for n in 1..=3 {
            register_funded(&mut service, addr(n), 1_000).unwrap();
            service
                .fund_pool(addr(n), POOL, native(1_000), native(1))
                .unwrap();
        }
        let newcomer = addr(9);
        register_funded(&mut service, newcomer, 0).unwrap();
        service.bank_mut().mint(newcomer, &usdc(1_000));

        // 400 * 2.5 = 1000 ties the lowest: rejected
        let err = service
            .fund_pool(newcomer, POOL, usdc(400), usdc(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);

        // 401 * 2.5 > 1000
        let outcome = service
            .fund_pool(newcomer, POOL, usdc(401), usdc(1))
            .unwrap();
        assert_eq!(outcome.evicted, Some(addr(1)));
        assert_eq!(active_set(&service, POOL), vec![addr(2), addr(3), newcomer]);
        assert_eq!(service.bank().balance_of(&addr(1)), native(1_000));

        let result = service.charge_bundle(POOL).unwrap();
        assert_eq!(
            result.total_payout,
            native(2).checked_add(&usdc(1)).unwrap()
        );
    }

    #[test]
    fn test_mixed_currency_funding() {
        let mut service = test_service_with(two_coin_config(50), [POOL]);
        register_funded(&mut service, addr(1), 100).unwrap();
        service.bank_mut().mint(addr(1), &usdc(100));

        let deposit = native(20).checked_add(&usdc(30)).unwrap();
        let rate = native(2).checked_add(&usdc(3)).unwrap();
        service
            .fund_pool(addr(1), POOL, deposit.clone(), rate.clone())
            .unwrap();

        let result = service.charge_bundle(POOL).unwrap();
        assert_eq!(result.total_payout, rate);

        // Defunding all USDC drops its rate, native keeps going
        service.defund_pool(addr(1), POOL, usdc(1_000)).unwrap();
        let funding = service.get_funding(&addr(1), POOL).unwrap();
        assert_eq!(funding.balances, native(18));
        assert_eq!(funding.per_bundle_rate, native(2));
        assert_eq!(
            service.bank().balance_of(&addr(1)),
            native(80).checked_add(&usdc(97)).unwrap()
        );
    }

    #[test]
    fn test_rate_for_unfunded_currency_rejected() {
        let mut service = test_service_with(two_coin_config(50), [POOL]);
        register_funded(&mut service, addr(1), 100).unwrap();
        let result = service.fund_pool(addr(1), POOL, native(10), usdc(1));
        assert!(matches!(result, Err(FundingError::InvalidRate { .. })));
    }

    #[test]
    fn test_disabled_pool_keeps_balances_until_reenabled() {
        let mut service = test_service([POOL]);
        register_funded(&mut service, addr(1), 100).unwrap();
        service
            .fund_pool(addr(1), POOL, native(10), native(5))
            .unwrap();

        service.pools_mut().set_status(POOL, PoolStatus::Disabled);
        for _ in 0..3 {
            assert!(service.charge_bundle(POOL).unwrap().charged.is_empty());
        }
        service.pools_mut().set_status(POOL, PoolStatus::Active);
        assert_eq!(service.charge_bundle(POOL).unwrap().total_payout, native(5));
    }

    #[test]
    fn test_event_topics() {
        let mut service = test_service([POOL]);
        register_funded(&mut service, addr(1), 100).unwrap();
        service
            .fund_pool(addr(1), POOL, native(10), native(10))
            .unwrap();
        service.charge_bundle(POOL).unwrap();

        let published: Vec<&str> = service.events().events().iter().map(topic_of).collect();
        assert_eq!(
            published,
            vec![topics::FUNDER, topics::FUNDING, topics::POOL_OUT_OF_FUNDS]
        );
    }

    // =============================================================================
    // DETERMINISM
    // =============================================================================

    /// 80 funders with distinct deposits compete for 50 slots.
    fn run_in_order(order: &[u32]) -> (Vec<Address>, Vec<(Address, Coins)>) {
        let mut service = test_service([POOL]);
        for n in order {
            register_funded(&mut service, addr_u32(*n), 10_000).unwrap();
        }
        for n in order {
            let deposit = native(1_000 + u64::from(*n));
            match service.fund_pool(addr_u32(*n), POOL, deposit, native(1)) {
                Ok(_) | Err(FundingError::InsufficientToDisplace { .. }) => {}
                Err(e) => panic!("unexpected error {}", e),
            }
        }
        service.charge_bundle(POOL).unwrap();

        let active = active_set(&service, POOL);
        let mut banks: Vec<_> = order
            .iter()
            .map(|n| (addr_u32(*n), service.bank().balance_of(&addr_u32(*n))))
            .collect();
        banks.sort_by_key(|(address, _)| *address);
        (active, banks)
    }

    #[test]
    fn test_admission_independent_of_arrival_order() {
        let ids: Vec<u32> = (1..=80).collect();
        let baseline = run_in_order(&ids);

        // The 50 largest deposits hold the slots
        let expected: Vec<Address> = (31..=80).map(addr_u32).collect();
        assert_eq!(baseline.0, expected);

        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        for _ in 0..5 {
            let mut shuffled = ids.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(run_in_order(&shuffled), baseline);
        }
    }

    // =============================================================================
    // GENESIS & CONFIG
    // =============================================================================

    #[test]
    fn test_genesis_json_restart() {
        let mut service = test_service([POOL, 1]);
        for n in 1..=4 {
            register_funded(&mut service, addr(n), 1_000).unwrap();
            service
                .fund_pool(addr(n), POOL, native(100 * u64::from(n)), native(7))
                .unwrap();
        }
        service.charge_bundle(POOL).unwrap();
        service.defund_pool(addr(2), POOL, native(1_000)).unwrap();

        let json = service.export_genesis().unwrap().to_json().unwrap();
        let genesis = GenesisState::from_json(&json).unwrap();
        let mut restored = FundingService::from_genesis(
            genesis,
            InMemoryKVStore::new(),
            InMemoryBank::new(),
            InMemoryPoolRegistry::with_pools([POOL, 1]),
            RecordingPublisher::new(),
        )
        .unwrap();

        assert_eq!(
            restored.funding_state(POOL).unwrap().active_funders,
            vec![addr(1), addr(3), addr(4)]
        );
        assert_eq!(restored.funding_state(1).unwrap().size, 0);
        let result = restored.charge_bundle(POOL).unwrap();
        assert_eq!(result.total_payout, native(21));
    }

    #[test]
    fn test_genesis_rejects_inconsistent_state() {
        let mut service = test_service([POOL]);
        register_funded(&mut service, addr(1), 1_000).unwrap();
        service
            .fund_pool(addr(1), POOL, native(100), native(1))
            .unwrap();
        let mut genesis = service.export_genesis().unwrap();
        genesis.funding_states.clear();

        let result = FundingService::from_genesis(
            genesis,
            InMemoryKVStore::new(),
            InMemoryBank::new(),
            InMemoryPoolRegistry::new(),
            RecordingPublisher::new(),
        );
        assert!(matches!(result, Err(FundingError::InvalidGenesis(_))));
    }

    #[test]
    fn test_config_overrides_cap_admission() {
        let config = FundingConfig::for_testing()
            .with_overrides(|key| match key {
                "QC_FUNDERS_MAX_ACTIVE_FUNDERS" => Some("2".to_string()),
                _ => None,
            })
            .unwrap();
        let mut service = test_service_with(config, [POOL]);
        for n in 1..=3 {
            register_funded(&mut service, addr(n), 1_000).unwrap();
        }
        service.fund_pool(addr(1), POOL, native(10), native(1)).unwrap();
        service.fund_pool(addr(2), POOL, native(20), native(1)).unwrap();
        let outcome = service.fund_pool(addr(3), POOL, native(30), native(1)).unwrap();

        assert_eq!(outcome.evicted, Some(addr(1)));
        assert_eq!(service.funding_state(POOL).unwrap().capacity, 2);
    }

    #[test]
    fn test_default_params_reject_dust() {
        let config = FundingConfig::new(FundersParams::default());
        let mut service = test_service_with(config, [POOL]);
        register_funded(&mut service, addr(1), 10_000_000_000).unwrap();

        let result = service.fund_pool(addr(1), POOL, native(1_000), native(100_000));
        assert!(matches!(result, Err(FundingError::InvalidDeposit { .. })));

        // 2e9 at 100_000 per bundle covers the default 20 bundles
        service
            .fund_pool(addr(1), POOL, native(2_000_000_000), native(100_000))
            .unwrap();
        let denoms: BTreeSet<_> = service
            .get_funding(&addr(1), POOL)
            .unwrap()
            .balances
            .denoms()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(denoms, BTreeSet::from([NATIVE_DENOM.to_string()]));
    }
}
