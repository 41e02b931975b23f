//! Seeded market simulation.
//!
//! Creates agents and events, issues random back/lay orders, clears every
//! book, draws outcomes from each event's true probability and prices the
//! payouts with [`PayoutSchedule`]. The same seed always produces the same
//! orders, clearing results and state roots.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::engine::MatchObserver;
use crate::error::{ConfigError, Result};
use crate::ledger::{Exchange, MatchResult};
use crate::settlement::{Outcome, Payout, PayoutSchedule};
use crate::types::odds::{decimal_to_capital, decimal_to_fixed, SCALE};
use crate::types::Side;

/// Simulation parameters converted to fixed-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationParams {
    pub seed: u64,
    pub agents: usize,
    pub events: usize,
    pub orders_per_agent: usize,
    pub starting_capital: i64,
    pub min_odds: u64,
    pub max_odds: u64,
    pub min_stake: u64,
    pub max_stake: u64,
}

impl SimulationParams {
    /// Validate a [`SimulationConfig`] and convert it
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if a count is zero, a range is inverted
    /// or an amount does not fit the fixed-point range.
    pub fn from_config(config: &SimulationConfig) -> std::result::Result<Self, ConfigError> {
        fn fixed(field: &'static str, value: Decimal) -> std::result::Result<u64, ConfigError> {
            decimal_to_fixed(value).ok_or_else(|| ConfigError::InvalidValue {
                field,
                reason: format!("{value} is out of the fixed-point range"),
            })
        }

        config.validate()?;

        let starting_capital = decimal_to_capital(config.starting_capital).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "simulation.starting_capital",
                reason: format!("{} is out of the fixed-point range", config.starting_capital),
            }
        })?;

        Ok(Self {
            seed: config.seed,
            agents: config.agents,
            events: config.events,
            orders_per_agent: config.orders_per_agent,
            starting_capital,
            min_odds: fixed("simulation.min_odds", config.min_odds)?,
            max_odds: fixed("simulation.max_odds", config.max_odds)?,
            min_stake: fixed("simulation.min_stake", config.min_stake)?,
            max_stake: fixed("simulation.max_stake", config.max_stake)?,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Per-event record of one simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    pub result: MatchResult,
    pub outcome: Outcome,
    pub payouts: Vec<Payout>,
}

/// What a simulation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub seed: u64,
    pub orders_issued: usize,
    pub events: Vec<EventReport>,
}

impl SimulationReport {
    pub fn matched_orders(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.result.matched_back.len() + e.result.matched_lay.len())
            .sum()
    }

    /// Fixed-point sum of every payout
    pub fn total_payout(&self) -> u64 {
        self.events
            .iter()
            .flat_map(|e| e.payouts.iter())
            .map(|p| p.amount)
            .fold(0u64, u64::saturating_add)
    }

    pub fn state_roots(&self) -> Vec<[u8; 32]> {
        self.events.iter().map(|e| e.result.state_root).collect()
    }
}

/// Drives one seeded run against an [`Exchange`].
pub struct Simulation {
    params: SimulationParams,
    rng: ChaCha8Rng,
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            params,
        }
    }

    /// Populate `exchange`, clear, settle and report
    ///
    /// # Errors
    ///
    /// Propagates any [`ExchangeError`](crate::error::ExchangeError) raised
    /// by the exchange.
    pub fn run<O: MatchObserver>(&mut self, exchange: &mut Exchange<O>) -> Result<SimulationReport> {
        let p = self.params;
        info!(
            seed = p.seed,
            agents = p.agents,
            events = p.events,
            orders_per_agent = p.orders_per_agent,
            "simulation starting"
        );

        let agents: Vec<u64> = (0..p.agents)
            .map(|_| exchange.create_agent(p.starting_capital))
            .collect();
        let mut events = Vec::with_capacity(p.events);
        for _ in 0..p.events {
            let probability = self.rng.gen_range(0..=SCALE);
            events.push(exchange.create_event(probability)?);
        }

        let mut orders_issued = 0;
        for &agent in &agents {
            for _ in 0..p.orders_per_agent {
                let event = events[self.rng.gen_range(0..events.len())];
                let side = if self.rng.gen_bool(0.5) {
                    Side::Back
                } else {
                    Side::Lay
                };
                let odds = self.rng.gen_range(p.min_odds..=p.max_odds);
                let stake = self.rng.gen_range(p.min_stake..=p.max_stake);

                exchange.issue_order(agent, event, side, odds, stake)?;
                orders_issued += 1;
            }
        }
        debug!(orders_issued, "orders issued");

        let mut reports = Vec::with_capacity(events.len());
        for event_id in events {
            let result = exchange.run_match(event_id)?;
            let probability = exchange
                .event(event_id)
                .map(|e| e.true_probability())
                .unwrap_or_default();
            let outcome = Outcome::draw(probability, &mut self.rng);
            let payouts = exchange.settle(event_id, outcome, &mut PayoutSchedule)??;

            reports.push(EventReport {
                result,
                outcome,
                payouts,
            });
        }

        let report = SimulationReport {
            seed: p.seed,
            orders_issued,
            events: reports,
        };
        info!(
            orders_issued,
            matched = report.matched_orders(),
            "simulation complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn params() -> SimulationParams {
        SimulationParams::from_config(&Config::default().simulation).unwrap()
    }

    #[test]
    fn test_params_from_default_config() {
        let p = params();
        assert_eq!(p.starting_capital, 10_000_000_000);
        assert_eq!(p.min_odds, 120_000_000);
        assert_eq!(p.max_stake, 2_000_000_000);
    }

    #[test]
    fn test_params_reject_out_of_range() {
        let mut config = Config::default().simulation;
        config.max_stake = Decimal::MAX;
        assert!(matches!(
            SimulationParams::from_config(&config),
            Err(ConfigError::InvalidValue {
                field: "simulation.max_stake",
                ..
            })
        ));
    }

    #[test]
    fn test_params_validate_hand_built_config() {
        let mut config = Config::default().simulation;
        config.events = 0;
        assert!(matches!(
            SimulationParams::from_config(&config),
            Err(ConfigError::InvalidValue {
                field: "simulation.events",
                ..
            })
        ));

        let mut config = Config::default().simulation;
        config.min_odds = Decimal::from(6);
        config.max_odds = Decimal::from(2);
        assert!(matches!(
            SimulationParams::from_config(&config),
            Err(ConfigError::InvalidValue {
                field: "simulation.max_odds",
                ..
            })
        ));
    }

    #[test]
    fn test_run_issues_and_settles_everything() {
        let p = params();
        let mut exchange = Exchange::new();
        let report = Simulation::new(p).run(&mut exchange).unwrap();

        assert_eq!(report.orders_issued, p.agents * p.orders_per_agent);
        assert_eq!(report.events.len(), p.events);
        assert!(exchange.events().all(|e| e.is_settled()));

        let booked: usize = report.events.iter().map(|e| e.payouts.len()).sum();
        assert_eq!(booked, report.orders_issued);
    }
}
