//! Greedy volume-balancing clearing for one event's order book.
//!
//! ## Algorithm
//!
//! 1. **Rank**: back orders ascending by limit odds (lowest floor first), lay
//!    orders descending (highest ceiling first). Equal odds keep arrival order.
//! 2. **Walk**: while both sides still hold more than one order, compare the
//!    accumulated back liability `acc_back * back_odds` against the lay cover
//!    `acc_lay / lay_odds`. The lighter side is topped up by consuming its head,
//!    provided the side's *second* order is still compatible with the opposite
//!    head. The first incompatibility ends the walk; nothing is revisited.
//! 3. **Finalize**: the remaining heads quote the clearing odds.
//!
//! A book where either side holds a single order never enters the walk. Its
//! two heads are checked once (`lay_head >= back_head`) and either both match
//! or neither does; the heads quote the clearing odds either way.

use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::book::{BookSnapshot, ClearingOdds, OrderBook, OrderSlot, Partition};
use crate::engine::trace::{MatchObserver, MatchStep, StopReason, TracingObserver};
use crate::types::odds::SCALE;
use crate::types::Side;

/// A book entry as the walk sees it.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    key: usize,
    order_id: u64,
    arrival: u64,
    odds: u64,
    stake: u64,
}

impl Candidate {
    fn new(key: usize, slot: &OrderSlot) -> Self {
        Self {
            key,
            order_id: slot.order_id(),
            arrival: slot.arrival,
            odds: slot.limit_odds(),
            stake: slot.stake(),
        }
    }
}

/// How a clearing run reached its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The greedy walk ran `rounds` times before `stop`
    Walk { rounds: usize, stop: StopReason },
    /// At least one side held a single order
    SinglePair { accepted: bool },
}

/// Engine output for a book with orders on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clearing {
    pub back: Partition,
    pub lay: Partition,
    pub odds: ClearingOdds,
    pub resolution: Resolution,
}

/// Result of one matching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A side was empty; the book must be left untouched
    EmptyBook { back: usize, lay: usize },
    Cleared(Clearing),
}

impl MatchOutcome {
    pub fn clearing(&self) -> Option<&Clearing> {
        match self {
            MatchOutcome::Cleared(clearing) => Some(clearing),
            MatchOutcome::EmptyBook { .. } => None,
        }
    }

    pub fn status(&self) -> MatchStatus {
        match self {
            MatchOutcome::EmptyBook { .. } => MatchStatus::EmptyBook,
            MatchOutcome::Cleared(c) => match c.resolution {
                Resolution::Walk { rounds, stop } => MatchStatus::Walked { rounds, stop },
                Resolution::SinglePair { accepted } => MatchStatus::SinglePair { accepted },
            },
        }
    }
}

/// Caller-facing summary of how a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// No match possible: a side had no orders
    EmptyBook,
    /// The one-order-per-side case, resolved by a single compatibility check
    SinglePair { accepted: bool },
    Walked { rounds: usize, stop: StopReason },
}

/// Greedy back/lay clearing engine.
///
/// ## Example
///
/// ```
/// use backlay::book::OrderBook;
/// use backlay::engine::{MatchingEngine, MatchOutcome};
/// use backlay::types::{Order, Side};
///
/// let mut book = OrderBook::new();
/// book.add(Order::new(1, 1, 1, Side::Back, 200_000_000, 1_000_000_000).unwrap());
/// book.add(Order::new(2, 2, 1, Side::Lay, 250_000_000, 800_000_000).unwrap());
///
/// let mut engine = MatchingEngine::new();
/// let outcome = engine.match_book(&mut book);
///
/// let clearing = outcome.clearing().unwrap();
/// assert_eq!(clearing.odds.bettor_odds, 200_000_000);
/// assert_eq!(clearing.odds.layer_odds, 250_000_000);
/// assert_eq!(book.matched_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MatchingEngine<O = TracingObserver> {
    observer: O,
    runs: u64,
}

impl MatchingEngine<TracingObserver> {
    /// Engine reporting decisions through `tracing`
    pub fn new() -> Self {
        Self::with_observer(TracingObserver)
    }
}

impl<O: MatchObserver> MatchingEngine<O> {
    pub fn with_observer(observer: O) -> Self {
        Self { observer, runs: 0 }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Number of runs performed, including empty-book runs
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Snapshot `book`, clear it, and write the result back
    ///
    /// The `&mut` borrow spans the whole run, so no order can be appended
    /// between the snapshot and the replace.
    pub fn match_book(&mut self, book: &mut OrderBook) -> MatchOutcome {
        let outcome = self.run(&book.snapshot());
        if let MatchOutcome::Cleared(clearing) = &outcome {
            book.replace(&clearing.back, &clearing.lay, clearing.odds);
        }
        outcome
    }

    /// Compute a clearing for `snapshot` without touching the book
    pub fn run(&mut self, snapshot: &BookSnapshot<'_>) -> MatchOutcome {
        self.runs += 1;

        let (back_len, lay_len) = (snapshot.back.len(), snapshot.lay.len());
        if back_len == 0 || lay_len == 0 {
            self.observer.on_step(&MatchStep::EmptyBook {
                back: back_len,
                lay: lay_len,
            });
            return MatchOutcome::EmptyBook {
                back: back_len,
                lay: lay_len,
            };
        }

        let back = rank(&snapshot.back, Side::Back);
        let lay = rank(&snapshot.lay, Side::Lay);

        let clearing = if back_len < 2 || lay_len < 2 {
            self.single_pair(back, lay)
        } else {
            self.walk(back, lay)
        };

        self.observer.on_step(&MatchStep::Cleared {
            bettor_odds: clearing.odds.bettor_odds,
            layer_odds: clearing.odds.layer_odds,
            matched_back: clearing.back.matched.len(),
            matched_lay: clearing.lay.matched.len(),
        });

        MatchOutcome::Cleared(clearing)
    }

    fn walk(&mut self, mut back: VecDeque<Candidate>, mut lay: VecDeque<Candidate>) -> Clearing {
        let mut matched_back = Vec::new();
        let mut matched_lay = Vec::new();
        let mut acc_back: u128 = 0;
        let mut acc_lay: u128 = 0;
        let mut rounds = 0;

        let stop = loop {
            if back.len() < 2 {
                break StopReason::Exhausted(Side::Back);
            }
            if lay.len() < 2 {
                break StopReason::Exhausted(Side::Lay);
            }
            let (back_head, lay_head) = (back[0], lay[0]);

            rounds += 1;
            let need = if needs_lay(acc_back, back_head.odds, acc_lay, lay_head.odds) {
                Side::Lay
            } else {
                Side::Back
            };
            self.observer.on_step(&MatchStep::Round {
                round: rounds,
                acc_back_stake: acc_back,
                acc_lay_stake: acc_lay,
                back_odds: back_head.odds,
                lay_odds: lay_head.odds,
                need,
            });

            match need {
                Side::Lay => {
                    let Some(next) = lay.get(1) else {
                        break StopReason::Exhausted(Side::Lay);
                    };
                    if next.odds < back_head.odds {
                        break StopReason::Incompatible {
                            side: Side::Lay,
                            next_odds: next.odds,
                        };
                    }
                    if let Some(head) = lay.pop_front() {
                        acc_lay += u128::from(head.stake);
                        self.report_matched(Side::Lay, &head);
                        matched_lay.push(head.key);
                    }
                }
                Side::Back => {
                    let Some(next) = back.get(1) else {
                        break StopReason::Exhausted(Side::Back);
                    };
                    if next.odds >= lay_head.odds {
                        break StopReason::Incompatible {
                            side: Side::Back,
                            next_odds: next.odds,
                        };
                    }
                    if let Some(head) = back.pop_front() {
                        acc_back += u128::from(head.stake);
                        self.report_matched(Side::Back, &head);
                        matched_back.push(head.key);
                    }
                }
            }
        };

        self.observer.on_step(&MatchStep::Stopped(stop));

        // Each side still holds its head: a side only pops with a second order behind it.
        let odds = ClearingOdds {
            bettor_odds: back[0].odds,
            layer_odds: lay[0].odds,
        };

        Clearing {
            back: Partition {
                matched: matched_back,
                unmatched: back.iter().map(|c| c.key).collect(),
            },
            lay: Partition {
                matched: matched_lay,
                unmatched: lay.iter().map(|c| c.key).collect(),
            },
            odds,
            resolution: Resolution::Walk { rounds, stop },
        }
    }

    fn single_pair(&mut self, mut back: VecDeque<Candidate>, mut lay: VecDeque<Candidate>) -> Clearing {
        let (back_head, lay_head) = (back[0], lay[0]);
        let accepted = lay_head.odds >= back_head.odds;

        self.observer.on_step(&MatchStep::SinglePair {
            back_odds: back_head.odds,
            lay_odds: lay_head.odds,
            accepted,
        });

        let mut matched_back = Vec::new();
        let mut matched_lay = Vec::new();
        if accepted {
            back.pop_front();
            lay.pop_front();
            self.report_matched(Side::Back, &back_head);
            self.report_matched(Side::Lay, &lay_head);
            matched_back.push(back_head.key);
            matched_lay.push(lay_head.key);
        }

        Clearing {
            back: Partition {
                matched: matched_back,
                unmatched: back.iter().map(|c| c.key).collect(),
            },
            lay: Partition {
                matched: matched_lay,
                unmatched: lay.iter().map(|c| c.key).collect(),
            },
            odds: ClearingOdds {
                bettor_odds: back_head.odds,
                layer_odds: lay_head.odds,
            },
            resolution: Resolution::SinglePair { accepted },
        }
    }

    fn report_matched(&mut self, side: Side, candidate: &Candidate) {
        self.observer.on_step(&MatchStep::Matched {
            side,
            order_id: candidate.order_id,
            limit_odds: candidate.odds,
            stake: candidate.stake,
        });
    }
}

/// Sort one side into walk order
fn rank(entries: &[(usize, &OrderSlot)], side: Side) -> VecDeque<Candidate> {
    let mut ranked: Vec<Candidate> = entries
        .iter()
        .map(|&(key, slot)| Candidate::new(key, slot))
        .collect();

    match side {
        Side::Back => ranked.sort_by_key(|c| (c.odds, c.arrival)),
        Side::Lay => ranked.sort_by_key(|c| (Reverse(c.odds), c.arrival)),
    }

    ranked.into()
}

/// `acc_back * back_odds >= acc_lay / lay_odds`, decided exactly
///
/// Stakes and odds are fixed-point integers, so the check is cross-multiplied
/// into `acc_back * back_odds * lay_odds >= acc_lay * SCALE^2` and evaluated
/// in 256-bit integers. Neither side is ever rounded.
fn needs_lay(acc_back: u128, back_odds: u64, acc_lay: u128, lay_odds: u64) -> bool {
    let back_liability = Wide::from(acc_back).mul_u64(back_odds).mul_u64(lay_odds);
    let lay_cover = Wide::from(acc_lay).mul_u64(SCALE).mul_u64(SCALE);
    back_liability >= lay_cover
}

/// Unsigned 256-bit integer, little-endian limbs.
///
/// Only what the balance check needs: a `u128` times two `u64` factors
/// always fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Wide([u64; 4]);

impl From<u128> for Wide {
    fn from(value: u128) -> Self {
        Wide([value as u64, (value >> 64) as u64, 0, 0])
    }
}

impl Wide {
    fn mul_u64(self, factor: u64) -> Self {
        let mut limbs = self.0;
        let mut carry: u128 = 0;
        for limb in limbs.iter_mut() {
            let product = u128::from(*limb) * u128::from(factor) + carry;
            *limb = product as u64;
            carry = product >> 64;
        }
        debug_assert_eq!(carry, 0, "256-bit product overflowed");
        Wide(limbs)
    }
}

impl PartialOrd for Wide {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wide {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
