//! Property-based checks of the clearing invariants.

use std::collections::HashSet;

use backlay::engine::NoopObserver;
use backlay::{Exchange, ExchangeError, Side};
use proptest::prelude::*;

/// (is_back, odds in fixed-point, stake in fixed-point)
fn order_strategy() -> impl Strategy<Value = (bool, u64, u64)> {
    (
        any::<bool>(),
        100_000_001u64..=1_000_000_000,
        1u64..=10_000_000_000,
    )
}

fn build(orders: &[(bool, u64, u64)]) -> (Exchange<NoopObserver>, u64) {
    let mut exchange = Exchange::with_observer(NoopObserver);
    let agent = exchange.create_agent(0);
    let event = exchange.create_event(50_000_000).unwrap();
    for &(is_back, odds, stake) in orders {
        let side = if is_back { Side::Back } else { Side::Lay };
        exchange.issue_order(agent, event, side, odds, stake).unwrap();
    }
    (exchange, event)
}

proptest! {
    #[test]
    fn prop_every_order_lands_in_one_partition(
        orders in prop::collection::vec(order_strategy(), 0..60),
    ) {
        let (mut exchange, event) = build(&orders);
        let result = exchange.run_match(event).unwrap();

        let backs: Vec<u64> = result.matched_back.iter()
            .chain(&result.unmatched_back)
            .map(|o| o.id())
            .collect();
        let lays: Vec<u64> = result.matched_lay.iter()
            .chain(&result.unmatched_lay)
            .map(|o| o.id())
            .collect();

        prop_assert_eq!(backs.len(), orders.iter().filter(|o| o.0).count());
        prop_assert_eq!(lays.len(), orders.iter().filter(|o| !o.0).count());

        let unique: HashSet<u64> = backs.iter().chain(&lays).copied().collect();
        prop_assert_eq!(unique.len(), orders.len());
        prop_assert!(result.matched_back.iter().all(|o| o.side() == Side::Back));
        prop_assert!(result.matched_lay.iter().all(|o| o.side() == Side::Lay));
    }

    #[test]
    fn prop_matched_orders_respect_clearing_odds(
        orders in prop::collection::vec(order_strategy(), 0..60),
    ) {
        let (mut exchange, event) = build(&orders);
        let result = exchange.run_match(event).unwrap();

        match (result.bettor_odds, result.layer_odds) {
            (Some(bettor), Some(layer)) => {
                prop_assert!(result.matched_back.iter().all(|o| o.limit_odds() <= bettor));
                prop_assert!(result.matched_lay.iter().all(|o| o.limit_odds() >= layer));
            }
            (None, None) => prop_assert!(!result.has_matches()),
            _ => prop_assert!(false, "clearing odds must be set together"),
        }
    }

    #[test]
    fn prop_repeated_runs_are_idempotent(
        orders in prop::collection::vec(order_strategy(), 0..40),
    ) {
        let (mut exchange, event) = build(&orders);
        let first = exchange.run_match(event).unwrap();
        let second = exchange.run_match(event).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_invalid_orders_leave_no_trace(
        odds in 0u64..=100_000_000,
        stake in 0u64..10_000_000_000,
        is_back in any::<bool>(),
    ) {
        let (mut exchange, event) = build(&[(true, 200_000_000, 100_000_000)]);
        let side = if is_back { Side::Back } else { Side::Lay };

        let err = exchange.issue_order(1, event, side, odds, stake).unwrap_err();
        let is_validation_error = matches!(
            err,
            ExchangeError::InvalidOdds { .. } | ExchangeError::InvalidStake { .. }
        );
        prop_assert!(is_validation_error);

        let agent = exchange.agent(1).unwrap();
        prop_assert_eq!(agent.capital(), -100_000_000);
        prop_assert_eq!(agent.open_orders().len(), 1);
        prop_assert_eq!(exchange.event(event).unwrap().book().len(), 1);
    }
}
