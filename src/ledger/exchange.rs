//! The exchange registry: agents, events, issuance, matching and settlement.
//!
//! ## Issuance
//!
//! `issue_order` validates everything before it touches anything. The order
//! id is drawn only once validation has passed, so a rejected order leaves
//! capital, books and the id sequence exactly as they were.
//!
//! ## Matching
//!
//! `run_match` holds `&mut self` for the whole snapshot, walk and replace.
//! Orders issued afterwards land UNMATCHED and are picked up by the next run.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::book::{Event, OrderSlot, Partition};
use crate::engine::{MatchObserver, MatchOutcome, MatchStatus, MatchingEngine, TracingObserver};
use crate::error::{ExchangeError, Result};
use crate::ledger::{Agent, IdSequence};
use crate::settlement::{Outcome, Settlement, SettlementInput};
use crate::types::odds::from_fixed_trimmed;
use crate::types::{MatchReceipt, Order, Side};

/// Default slab pre-allocation per event book.
pub const DEFAULT_BOOK_CAPACITY: usize = 64;

/// Result of one `run_match` call.
///
/// Each side lists the matched orders in the order the walk consumed them,
/// then the unmatched orders in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub event_id: u64,
    pub status: MatchStatus,
    pub matched_back: Vec<Order>,
    pub unmatched_back: Vec<Order>,
    pub matched_lay: Vec<Order>,
    pub unmatched_lay: Vec<Order>,
    pub bettor_odds: Option<u64>,
    pub layer_odds: Option<u64>,
    /// SHA-256 of the event's book after the run
    pub state_root: [u8; 32],
}

impl MatchResult {
    /// Whether the run cleared at least one order
    pub fn has_matches(&self) -> bool {
        !self.matched_back.is_empty() || !self.matched_lay.is_empty()
    }

    /// SSZ-encodable summary of this result
    pub fn receipt(&self) -> MatchReceipt {
        let stake = |orders: &[Order]| orders.iter().map(Order::stake).sum::<u64>();

        MatchReceipt {
            event_id: self.event_id,
            matched_back: self.matched_back.len() as u64,
            unmatched_back: self.unmatched_back.len() as u64,
            matched_lay: self.matched_lay.len() as u64,
            unmatched_lay: self.unmatched_lay.len() as u64,
            matched_back_stake: stake(&self.matched_back),
            matched_lay_stake: stake(&self.matched_lay),
            bettor_odds: self.bettor_odds.unwrap_or(0),
            layer_odds: self.layer_odds.unwrap_or(0),
            state_root: self.state_root,
        }
    }
}

/// Registry owning every agent, event and the matching engine.
///
/// ## Example
///
/// ```
/// use backlay::ledger::Exchange;
/// use backlay::types::odds::to_fixed;
///
/// let mut exchange = Exchange::new();
/// let alice = exchange.create_agent(10_000_000_000);
/// let bob = exchange.create_agent(10_000_000_000);
/// let event = exchange.create_event(to_fixed("0.4").unwrap()).unwrap();
///
/// exchange.back(alice, event, to_fixed("2.0").unwrap(), to_fixed("10").unwrap()).unwrap();
/// exchange.lay(bob, event, to_fixed("2.5").unwrap(), to_fixed("8").unwrap()).unwrap();
///
/// let result = exchange.run_match(event).unwrap();
/// assert_eq!(result.matched_back.len(), 1);
/// assert_eq!(result.layer_odds, to_fixed("2.5"));
/// assert_eq!(exchange.agent(alice).unwrap().capital(), 9_000_000_000);
/// ```
#[derive(Debug)]
pub struct Exchange<O = TracingObserver> {
    agents: BTreeMap<u64, Agent>,
    events: BTreeMap<u64, Event>,
    agent_ids: IdSequence,
    event_ids: IdSequence,
    order_ids: IdSequence,
    engine: MatchingEngine<O>,
    book_capacity: usize,
}

impl Default for Exchange<TracingObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange<TracingObserver> {
    pub fn new() -> Self {
        Self::with_observer(TracingObserver)
    }
}

impl<O: MatchObserver> Exchange<O> {
    pub fn with_observer(observer: O) -> Self {
        Self {
            agents: BTreeMap::new(),
            events: BTreeMap::new(),
            agent_ids: IdSequence::new(),
            event_ids: IdSequence::new(),
            order_ids: IdSequence::new(),
            engine: MatchingEngine::with_observer(observer),
            book_capacity: DEFAULT_BOOK_CAPACITY,
        }
    }

    /// Pre-allocate `capacity` slots in every event book created from now on
    pub fn with_book_capacity(mut self, capacity: usize) -> Self {
        self.book_capacity = capacity;
        self
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register an agent with signed fixed-point starting capital
    pub fn create_agent(&mut self, starting_capital: i64) -> u64 {
        let id = self.agent_ids.next_id();
        self.agents.insert(id, Agent::new(id, starting_capital));
        debug!(agent_id = id, capital = starting_capital, "agent created");
        id
    }

    /// Register a binary event with an empty book
    ///
    /// # Errors
    ///
    /// [`ExchangeError::InvalidProbability`] if `true_probability` is above 1.0.
    pub fn create_event(&mut self, true_probability: u64) -> Result<u64> {
        let id = self.event_ids.peek();
        let event = Event::new(id, true_probability, self.book_capacity)?;
        self.event_ids.next_id();
        self.events.insert(id, event);
        debug!(
            event_id = id,
            probability = %from_fixed_trimmed(true_probability),
            "event created"
        );
        Ok(id)
    }

    pub fn agent(&self, agent_id: u64) -> Option<&Agent> {
        self.agents.get(&agent_id)
    }

    pub fn event(&self, event_id: u64) -> Option<&Event> {
        self.events.get(&event_id)
    }

    /// Agents in id order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    /// Events in id order
    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.values()
    }

    pub fn engine(&self) -> &MatchingEngine<O> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MatchingEngine<O> {
        &mut self.engine
    }

    // ========================================================================
    // Issuance
    // ========================================================================

    /// Debit `stake` from the agent and place the order UNMATCHED on the
    /// event's book
    ///
    /// Capital may go negative; there is no solvency check.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::InvalidStake`] / [`ExchangeError::InvalidOdds`]
    /// - [`ExchangeError::UnknownAgent`] / [`ExchangeError::UnknownEvent`]
    /// - [`ExchangeError::EventSettled`]
    /// - [`ExchangeError::CapitalOverflow`]
    ///
    /// Nothing is mutated on error.
    pub fn issue_order(
        &mut self,
        agent_id: u64,
        event_id: u64,
        side: Side,
        limit_odds: u64,
        stake: u64,
    ) -> Result<Order> {
        Order::validate(limit_odds, stake)?;

        let agent = self
            .agents
            .get_mut(&agent_id)
            .ok_or(ExchangeError::UnknownAgent(agent_id))?;
        let event = self
            .events
            .get_mut(&event_id)
            .ok_or(ExchangeError::UnknownEvent(event_id))?;
        if event.is_settled() {
            return Err(ExchangeError::EventSettled(event_id));
        }
        let capital = agent.capital_after(stake)?;

        let order = Order::new(
            self.order_ids.next_id(),
            agent_id,
            event_id,
            side,
            limit_odds,
            stake,
        )?;
        agent.commit(capital, order.clone());
        event.book_mut().add(order.clone());

        debug!(
            order_id = order.id(),
            agent_id,
            event_id,
            %side,
            limit_odds = %from_fixed_trimmed(limit_odds),
            stake = %from_fixed_trimmed(stake),
            "order issued"
        );

        Ok(order)
    }

    /// Issue a BACK order: the agent bets the event happens
    pub fn back(&mut self, agent_id: u64, event_id: u64, limit_odds: u64, stake: u64) -> Result<Order> {
        self.issue_order(agent_id, event_id, Side::Back, limit_odds, stake)
    }

    /// Issue a LAY order: the agent bets the event does not happen
    pub fn lay(&mut self, agent_id: u64, event_id: u64, limit_odds: u64, stake: u64) -> Result<Order> {
        self.issue_order(agent_id, event_id, Side::Lay, limit_odds, stake)
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Clear the event's book
    ///
    /// An empty side is reported as [`MatchStatus::EmptyBook`] and leaves the
    /// book untouched.
    ///
    /// # Errors
    ///
    /// [`ExchangeError::UnknownEvent`] or [`ExchangeError::EventSettled`].
    pub fn run_match(&mut self, event_id: u64) -> Result<MatchResult> {
        let event = self
            .events
            .get_mut(&event_id)
            .ok_or(ExchangeError::UnknownEvent(event_id))?;
        if event.is_settled() {
            return Err(ExchangeError::EventSettled(event_id));
        }

        let outcome = self.engine.match_book(event.book_mut());
        let book = event.book();

        let orders = |keys: &[usize]| -> Vec<Order> {
            keys.iter()
                .filter_map(|&key| book.get(key))
                .map(|slot| slot.order.clone())
                .collect()
        };
        let split = |side: Side| -> Partition {
            let (matched, unmatched): (Vec<usize>, Vec<usize>) = book
                .keys(side)
                .iter()
                .copied()
                .partition(|&key| book.get(key).is_some_and(OrderSlot::is_matched));
            Partition { matched, unmatched }
        };

        let (back, lay) = match &outcome {
            MatchOutcome::Cleared(clearing) => (clearing.back.clone(), clearing.lay.clone()),
            MatchOutcome::EmptyBook { .. } => (split(Side::Back), split(Side::Lay)),
        };

        let result = MatchResult {
            event_id,
            status: outcome.status(),
            matched_back: orders(&back.matched),
            unmatched_back: orders(&back.unmatched),
            matched_lay: orders(&lay.matched),
            unmatched_lay: orders(&lay.unmatched),
            bettor_odds: event.bettor_odds(),
            layer_odds: event.layer_odds(),
            state_root: book.compute_state_root(),
        };

        info!(
            event_id,
            status = ?result.status,
            matched_back = result.matched_back.len(),
            matched_lay = result.matched_lay.len(),
            unmatched_back = result.unmatched_back.len(),
            unmatched_lay = result.unmatched_lay.len(),
            bettor_odds = ?result.bettor_odds.map(from_fixed_trimmed),
            layer_odds = ?result.layer_odds.map(from_fixed_trimmed),
            state_root = %hex::encode(result.state_root),
            "match run complete"
        );

        Ok(result)
    }

    /// Run matching on every unsettled event, in id order
    pub fn run_all(&mut self) -> Result<Vec<MatchResult>> {
        let open: Vec<u64> = self
            .events
            .values()
            .filter(|event| !event.is_settled())
            .map(Event::id)
            .collect();

        open.into_iter().map(|id| self.run_match(id)).collect()
    }

    // ========================================================================
    // Settlement
    // ========================================================================

    /// Hand the event's partition and clearing odds to `settlement`, then mark
    /// every order and the event settled
    ///
    /// An event that was never matched settles with every order UNMATCHED.
    ///
    /// # Errors
    ///
    /// [`ExchangeError::UnknownEvent`] or [`ExchangeError::EventSettled`].
    pub fn settle<S: Settlement>(
        &mut self,
        event_id: u64,
        outcome: Outcome,
        settlement: &mut S,
    ) -> Result<S::Output> {
        let event = self
            .events
            .get_mut(&event_id)
            .ok_or(ExchangeError::UnknownEvent(event_id))?;
        if event.is_settled() {
            return Err(ExchangeError::EventSettled(event_id));
        }

        let output = {
            let input = SettlementInput {
                event_id,
                bettor_odds: event.bettor_odds(),
                layer_odds: event.layer_odds(),
                orders: event.back_side().chain(event.lay_side()).collect(),
            };
            settlement.settle(&input, outcome)
        };

        event.settle();
        info!(event_id, ?outcome, orders = event.book().len(), "event settled");

        Ok(output)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
