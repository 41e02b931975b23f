//! Observer hook for matching decisions.
//!
//! The engine reports every decision point of a run as a [`MatchStep`]. The
//! default [`TracingObserver`] turns steps into `tracing` events; tests use
//! [`RecordingObserver`] to assert on the exact walk.

use tracing::{debug, trace};

use crate::types::Side;

/// Why the greedy walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The side had no second order left to look ahead to
    Exhausted(Side),
    /// The look-ahead order on `side` was not price-compatible
    Incompatible { side: Side, next_odds: u64 },
}

/// A single decision point in a matching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStep {
    /// One side had no orders; nothing was ranked
    EmptyBook { back: usize, lay: usize },
    /// Start of a walk round, before the liability check
    Round {
        round: usize,
        /// Accumulated matched stakes, fixed-point
        acc_back_stake: u128,
        acc_lay_stake: u128,
        back_odds: u64,
        lay_odds: u64,
        /// Side the balance asks for next
        need: Side,
    },
    /// Head of `side` consumed into the matched set
    Matched {
        side: Side,
        order_id: u64,
        limit_odds: u64,
        stake: u64,
    },
    Stopped(StopReason),
    /// One-order-per-side verdict taken instead of a walk
    SinglePair {
        back_odds: u64,
        lay_odds: u64,
        accepted: bool,
    },
    Cleared {
        bettor_odds: u64,
        layer_odds: u64,
        matched_back: usize,
        matched_lay: usize,
    },
}

/// Receives matching decisions as they happen.
pub trait MatchObserver {
    fn on_step(&mut self, step: &MatchStep);
}

impl<O: MatchObserver + ?Sized> MatchObserver for &mut O {
    fn on_step(&mut self, step: &MatchStep) {
        (**self).on_step(step);
    }
}

/// Discards every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MatchObserver for NoopObserver {
    #[inline]
    fn on_step(&mut self, _step: &MatchStep) {}
}

/// Emits each step as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MatchObserver for TracingObserver {
    fn on_step(&mut self, step: &MatchStep) {
        match step {
            MatchStep::EmptyBook { back, lay } => {
                debug!(back, lay, "empty book, nothing to match");
            }
            MatchStep::Round {
                round,
                acc_back_stake,
                acc_lay_stake,
                back_odds,
                lay_odds,
                need,
            } => {
                trace!(
                    round,
                    %acc_back_stake,
                    %acc_lay_stake,
                    back_odds,
                    lay_odds,
                    %need,
                    "new round"
                );
            }
            MatchStep::Matched {
                side,
                order_id,
                limit_odds,
                stake,
            } => {
                trace!(%side, order_id, limit_odds, stake, "order matched");
            }
            MatchStep::Stopped(reason) => {
                trace!(?reason, "walk stopped");
            }
            MatchStep::SinglePair {
                back_odds,
                lay_odds,
                accepted,
            } => {
                debug!(back_odds, lay_odds, accepted, "single pair resolved");
            }
            MatchStep::Cleared {
                bettor_odds,
                layer_odds,
                matched_back,
                matched_lay,
            } => {
                debug!(bettor_odds, layer_odds, matched_back, matched_lay, "match complete");
            }
        }
    }
}

/// Collects every step in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    steps: Vec<MatchStep>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[MatchStep] {
        &self.steps
    }

    /// Drain the recorded steps
    pub fn take(&mut self) -> Vec<MatchStep> {
        std::mem::take(&mut self.steps)
    }

    /// Order IDs matched on `side`, in consumption order
    pub fn matched_ids(&self, side: Side) -> Vec<u64> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                MatchStep::Matched {
                    side: s, order_id, ..
                } if *s == side => Some(*order_id),
                _ => None,
            })
            .collect()
    }
}

impl MatchObserver for RecordingObserver {
    fn on_step(&mut self, step: &MatchStep) {
        self.steps.push(step.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer() {
        let mut recorder = RecordingObserver::new();
        recorder.on_step(&MatchStep::Matched {
            side: Side::Lay,
            order_id: 4,
            limit_odds: 250_000_000,
            stake: 1,
        });
        recorder.on_step(&MatchStep::Stopped(StopReason::Exhausted(Side::Lay)));

        assert_eq!(recorder.steps().len(), 2);
        assert_eq!(recorder.matched_ids(Side::Lay), vec![4]);
        assert!(recorder.matched_ids(Side::Back).is_empty());

        let drained = recorder.take();
        assert_eq!(drained.len(), 2);
        assert!(recorder.steps().is_empty());
    }

    #[test]
    fn test_observer_through_mut_ref() {
        fn feed<O: MatchObserver>(mut observer: O) {
            observer.on_step(&MatchStep::EmptyBook { back: 1, lay: 0 });
        }

        let mut recorder = RecordingObserver::new();
        feed(&mut recorder);
        assert_eq!(recorder.steps(), &[MatchStep::EmptyBook { back: 1, lay: 0 }]);
    }
}
