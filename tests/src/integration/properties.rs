//! # Ledger Properties
//!
//! Random sequences of fund / defund / charge against a small pool, checking
//! after every step that:
//!
//! - the active set never exceeds capacity and holds exactly the fundings
//!   with a positive balance
//! - every coin is accounted for: escrow = Σ balances + Σ payouts, and each
//!   funder's wallet + balance + total charged equals what it was minted
//! - `total_charged` never decreases
//! - a rejected operation changes neither the tables nor the bank

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use qc_18_pool_funding::test_utils::{
        addr, native, register_funded, test_service_with, TestService,
    };
    use qc_18_pool_funding::{FundingConfig, FundingError, PoolFundingApi};
    use shared_types::{Address, Coins};
    use std::collections::{BTreeMap, BTreeSet};

    const POOL: u64 = 0;
    const CAPACITY: usize = 3;
    const FUNDERS: u8 = 6;
    const MINTED: u64 = 1_000_000;

    #[derive(Clone, Debug)]
    enum Op {
        Fund { funder: u8, amount: u64, rate: u64 },
        Defund { funder: u8, amount: u64 },
        Charge,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (1..=FUNDERS, 1u64..2_000, 1u64..50)
                .prop_map(|(funder, amount, rate)| Op::Fund { funder, amount, rate }),
            2 => (1..=FUNDERS, 1u64..3_000)
                .prop_map(|(funder, amount)| Op::Defund { funder, amount }),
            3 => Just(Op::Charge),
        ]
    }

    fn new_service() -> TestService {
        let mut config = FundingConfig::for_testing();
        config.params.max_active_funders = CAPACITY;
        let mut service = test_service_with(config, [POOL]);
        for n in 1..=FUNDERS {
            register_funded(&mut service, addr(n), MINTED).unwrap();
        }
        service
    }

    /// Tables plus every wallet and the escrow.
    fn snapshot(service: &TestService) -> (String, Vec<Coins>, Coins) {
        let tables = service.export_genesis().unwrap().to_json().unwrap();
        let wallets = (1..=FUNDERS)
            .map(|n| service.bank().balance_of(&addr(n)))
            .collect();
        (tables, wallets, service.bank().escrow().clone())
    }

    fn apply(service: &mut TestService, op: &Op) -> Result<Coins, FundingError> {
        match op {
            Op::Fund {
                funder,
                amount,
                rate,
            } => service
                .fund_pool(addr(*funder), POOL, native(*amount), native(*rate))
                .map(|_| Coins::new()),
            Op::Defund { funder, amount } => service
                .defund_pool(addr(*funder), POOL, native(*amount))
                .map(|_| Coins::new()),
            Op::Charge => service.charge_bundle(POOL).map(|result| result.total_payout),
        }
    }

    fn check_invariants(
        service: &TestService,
        payouts: &Coins,
        charged_before: &mut BTreeMap<Address, Coins>,
    ) -> Result<(), TestCaseError> {
        let genesis = service.export_genesis().unwrap();
        let state = genesis
            .funding_states
            .iter()
            .find(|s| s.pool_id == POOL)
            .unwrap();

        prop_assert!(state.len() <= CAPACITY);
        let active: BTreeSet<Address> = state.iter().copied().collect();
        let positive: BTreeSet<Address> = genesis
            .fundings
            .iter()
            .filter(|f| !f.balances.is_zero())
            .map(|f| f.funder)
            .collect();
        prop_assert_eq!(&active, &positive);

        let mut balances = Coins::new();
        for funding in &genesis.fundings {
            balances = balances.checked_add(&funding.balances).unwrap();

            let wallet = service.bank().balance_of(&funding.funder);
            let accounted = wallet
                .checked_add(&funding.balances)
                .unwrap()
                .checked_add(&funding.total_charged)
                .unwrap();
            prop_assert_eq!(accounted, native(MINTED));

            let before = charged_before
                .insert(funding.funder, funding.total_charged.clone())
                .unwrap_or_default();
            prop_assert!(before.is_all_lte(&funding.total_charged));
        }
        prop_assert_eq!(
            service.bank().escrow(),
            &balances.checked_add(payouts).unwrap()
        );
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_ledger_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let mut service = new_service();
            let mut payouts = Coins::new();
            let mut charged = BTreeMap::new();

            for op in &ops {
                let before = snapshot(&service);
                match apply(&mut service, op) {
                    Ok(payout) => payouts = payouts.checked_add(&payout).unwrap(),
                    Err(e) => {
                        prop_assert!(!e.is_fatal(), "fatal error {} on {:?}", e, op);
                        prop_assert_eq!(&snapshot(&service), &before);
                    }
                }
                check_invariants(&service, &payouts, &mut charged)?;
            }
        }

        #[test]
        fn prop_eviction_requires_strictly_higher_score(
            seats in prop::collection::vec(100u64..1_000, CAPACITY),
            offer in 50u64..1_200,
        ) {
            let mut service = new_service();
            for (i, amount) in seats.iter().enumerate() {
                service
                    .fund_pool(addr(i as u8 + 1), POOL, native(*amount), native(1))
                    .unwrap();
            }
            let lowest = *seats.iter().min().unwrap();
            let before = snapshot(&service);

            let result = service.fund_pool(addr(FUNDERS), POOL, native(offer), native(1));
            if offer > lowest {
                let outcome = result.unwrap();
                prop_assert!(outcome.evicted.is_some());
            } else {
                let is_capacity = matches!(result, Err(FundingError::InsufficientToDisplace { .. }));
                prop_assert!(is_capacity);
                prop_assert_eq!(snapshot(&service), before);
            }
        }
    }
}
