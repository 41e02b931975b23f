//! Thread-safe handle over an [`Exchange`].
//!
//! Issuance and a whole matching run are each one critical section, so an
//! order submitted from another thread queues behind an in-flight run instead
//! of landing between its snapshot and replace.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{MatchObserver, TracingObserver};
use crate::error::Result;
use crate::ledger::{Exchange, MatchResult};
use crate::settlement::{Outcome, Settlement};
use crate::types::{Order, Side};

/// Cloneable, lock-guarded exchange.
///
/// ```
/// use backlay::ledger::SharedExchange;
/// use backlay::types::Side;
///
/// let shared = SharedExchange::default();
/// let agent = shared.create_agent(1_000_000_000);
/// let event = shared.create_event(50_000_000).unwrap();
///
/// let handle = shared.clone();
/// std::thread::spawn(move || {
///     handle.issue_order(agent, event, Side::Back, 200_000_000, 100_000_000).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(shared.with(|ex| ex.event(event).unwrap().book().len()), 1);
/// ```
#[derive(Debug)]
pub struct SharedExchange<O = TracingObserver> {
    inner: Arc<Mutex<Exchange<O>>>,
}

impl<O> Clone for SharedExchange<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SharedExchange<TracingObserver> {
    fn default() -> Self {
        Self::new(Exchange::new())
    }
}

impl<O: MatchObserver> SharedExchange<O> {
    pub fn new(exchange: Exchange<O>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(exchange)),
        }
    }

    pub fn create_agent(&self, starting_capital: i64) -> u64 {
        self.inner.lock().create_agent(starting_capital)
    }

    pub fn create_event(&self, true_probability: u64) -> Result<u64> {
        self.inner.lock().create_event(true_probability)
    }

    pub fn issue_order(
        &self,
        agent_id: u64,
        event_id: u64,
        side: Side,
        limit_odds: u64,
        stake: u64,
    ) -> Result<Order> {
        self.inner
            .lock()
            .issue_order(agent_id, event_id, side, limit_odds, stake)
    }

    pub fn run_match(&self, event_id: u64) -> Result<MatchResult> {
        self.inner.lock().run_match(event_id)
    }

    pub fn settle<S: Settlement>(
        &self,
        event_id: u64,
        outcome: Outcome,
        settlement: &mut S,
    ) -> Result<S::Output> {
        self.inner.lock().settle(event_id, outcome, settlement)
    }

    /// Read the exchange under the lock
    pub fn with<R>(&self, f: impl FnOnce(&Exchange<O>) -> R) -> R {
        f(&*self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_issuance_conserves_capital() {
        let shared = SharedExchange::default();
        let event = shared.create_event(50_000_000).unwrap();
        let agents: Vec<u64> = (0..4).map(|_| shared.create_agent(10_000_000_000)).collect();

        let handles: Vec<_> = agents
            .iter()
            .map(|&agent| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25u64 {
                        let side = if i % 2 == 0 { Side::Back } else { Side::Lay };
                        let odds = 150_000_000 + i * 10_000_000;
                        shared.issue_order(agent, event, side, odds, 100_000_000).unwrap();
                        if i % 5 == 0 {
                            shared.run_match(event).unwrap();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let result = shared.run_match(event).unwrap();
        let total = result.matched_back.len()
            + result.unmatched_back.len()
            + result.matched_lay.len()
            + result.unmatched_lay.len();
        assert_eq!(total, 100);

        shared.with(|ex| {
            for agent in ex.agents() {
                assert_eq!(agent.capital(), 10_000_000_000 - 25 * 100_000_000);
                assert_eq!(agent.open_orders().len(), 25);
            }
        });
    }
}
