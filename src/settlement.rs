//! Settlement boundary.
//!
//! The exchange does not pay anyone out. After matching, it exposes the
//! partition and clearing odds of an event as a [`SettlementInput`] and hands
//! it to a [`Settlement`] collaborator, then marks the event settled.
//!
//! ## Payout contract
//!
//! | Order | Event happened | Event did not happen |
//! |-------|----------------|----------------------|
//! | Matched back | `stake * (1 + bettor_odds)` | 0 |
//! | Matched lay | 0 | `stake * (1 + 1 / layer_odds)` |
//! | Unmatched | `stake` | `stake` |
//!
//! [`PayoutSchedule`] computes exactly this table; it does not credit agents.

use rand::Rng;
use rust_decimal::Decimal;

use crate::error::{ExchangeError, Result};
use crate::types::odds::{decimal_to_fixed, fixed_to_decimal, SCALE};
use crate::types::{Order, Side, Status};

/// How a binary event resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Happened,
    DidNotHappen,
}

impl Outcome {
    pub fn from_bool(happened: bool) -> Self {
        if happened {
            Outcome::Happened
        } else {
            Outcome::DidNotHappen
        }
    }

    /// Sample an outcome from a fixed-point probability in `[0, 1]`
    ///
    /// ```
    /// use backlay::settlement::Outcome;
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(7);
    /// assert_eq!(Outcome::draw(100_000_000, &mut rng), Outcome::Happened);
    /// assert_eq!(Outcome::draw(0, &mut rng), Outcome::DidNotHappen);
    /// ```
    pub fn draw<R: Rng + ?Sized>(true_probability: u64, rng: &mut R) -> Self {
        Self::from_bool(rng.gen_range(0..SCALE) < true_probability)
    }
}

/// Everything settlement may read about one event.
#[derive(Debug)]
pub struct SettlementInput<'a> {
    pub event_id: u64,
    pub bettor_odds: Option<u64>,
    pub layer_odds: Option<u64>,
    /// Back side, then lay side, in book sequence order
    pub orders: Vec<(&'a Order, Status)>,
}

/// External collaborator that turns a matched book into payouts.
pub trait Settlement {
    type Output;

    fn settle(&mut self, input: &SettlementInput<'_>, outcome: Outcome) -> Self::Output;
}

/// Amount owed to an agent for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub order_id: u64,
    pub agent_id: u64,
    pub side: Side,
    pub status: Status,
    /// Fixed-point amount returned to the agent
    pub amount: u64,
}

/// Reference settlement computing the payout contract per order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayoutSchedule;

impl Settlement for PayoutSchedule {
    type Output = Result<Vec<Payout>>;

    fn settle(&mut self, input: &SettlementInput<'_>, outcome: Outcome) -> Self::Output {
        input
            .orders
            .iter()
            .map(|&(order, status)| -> Result<Payout> {
                let amount = payout(order, status, input.bettor_odds, input.layer_odds, outcome)
                    .ok_or(ExchangeError::PayoutOverflow {
                        order_id: order.id(),
                    })?;
                Ok(Payout {
                    order_id: order.id(),
                    agent_id: order.agent_id(),
                    side: order.side(),
                    status,
                    amount,
                })
            })
            .collect()
    }
}

/// Payout for a single order under the contract
///
/// Returns `None` only if the amount does not fit the fixed-point range.
/// A matched order without clearing odds is treated as unmatched.
pub fn payout(
    order: &Order,
    status: Status,
    bettor_odds: Option<u64>,
    layer_odds: Option<u64>,
    outcome: Outcome,
) -> Option<u64> {
    let stake = fixed_to_decimal(order.stake());

    let amount = match (status, bettor_odds.zip(layer_odds)) {
        (Status::Matched, Some((bettor, layer))) => match (order.side(), outcome) {
            (Side::Back, Outcome::Happened) => {
                stake.checked_mul(Decimal::ONE + fixed_to_decimal(bettor))?
            }
            (Side::Lay, Outcome::DidNotHappen) => {
                let per_unit = Decimal::ONE + Decimal::ONE.checked_div(fixed_to_decimal(layer))?;
                stake.checked_mul(per_unit)?
            }
            _ => Decimal::ZERO,
        },
        _ => stake,
    };

    decimal_to_fixed(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::odds::to_fixed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn order(side: Side, stake: &str) -> Order {
        Order::new(1, 1, 1, side, to_fixed("2.0").unwrap(), to_fixed(stake).unwrap()).unwrap()
    }

    const BETTOR: Option<u64> = Some(200_000_000);
    const LAYER: Option<u64> = Some(250_000_000);

    #[test]
    fn test_matched_back_payouts() {
        let back = order(Side::Back, "10");
        assert_eq!(
            payout(&back, Status::Matched, BETTOR, LAYER, Outcome::Happened),
            to_fixed("30")
        );
        assert_eq!(
            payout(&back, Status::Matched, BETTOR, LAYER, Outcome::DidNotHappen),
            Some(0)
        );
    }

    #[test]
    fn test_matched_lay_payouts() {
        let lay = order(Side::Lay, "10");
        // 10 * (1 + 1/2.5) = 14
        assert_eq!(
            payout(&lay, Status::Matched, BETTOR, LAYER, Outcome::DidNotHappen),
            to_fixed("14")
        );
        assert_eq!(
            payout(&lay, Status::Matched, BETTOR, LAYER, Outcome::Happened),
            Some(0)
        );
    }

    #[test]
    fn test_unmatched_returns_stake() {
        for side in [Side::Back, Side::Lay] {
            let o = order(side, "7.5");
            for outcome in [Outcome::Happened, Outcome::DidNotHappen] {
                assert_eq!(payout(&o, Status::Unmatched, BETTOR, LAYER, outcome), to_fixed("7.5"));
                assert_eq!(payout(&o, Status::Unmatched, None, None, outcome), to_fixed("7.5"));
            }
        }
    }

    #[test]
    fn test_payout_schedule() {
        let back = Order::new(1, 10, 1, Side::Back, 200_000_000, 1_000_000_000).unwrap();
        let lay = Order::new(2, 20, 1, Side::Lay, 250_000_000, 800_000_000).unwrap();
        let input = SettlementInput {
            event_id: 1,
            bettor_odds: BETTOR,
            layer_odds: LAYER,
            orders: vec![(&back, Status::Unmatched), (&lay, Status::Matched)],
        };

        let payouts = PayoutSchedule.settle(&input, Outcome::DidNotHappen).unwrap();
        assert_eq!(payouts.len(), 2);
        assert_eq!(payouts[0].amount, 1_000_000_000);
        assert_eq!(payouts[0].agent_id, 10);
        // 8 * 1.4 = 11.2
        assert_eq!(payouts[1].amount, 1_120_000_000);
        assert_eq!(payouts[1].side, Side::Lay);
    }

    #[test]
    fn test_outcome_draw_is_seeded() {
        let draws = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..32)
                .map(|_| Outcome::draw(50_000_000, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(1), draws(1));
        assert!(draws(1).contains(&Outcome::Happened));
        assert!(draws(1).contains(&Outcome::DidNotHappen));
    }
}
