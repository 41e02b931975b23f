//! Agents: capital plus the orders they issued.

use std::fmt;

use crate::error::{ExchangeError, Result};
use crate::types::odds::{checked_debit, from_capital};
use crate::types::Order;

/// A market participant.
///
/// Capital is debited in full when an order is issued and may go negative;
/// the ledger performs no solvency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    id: u64,
    capital: i64,
    open_orders: Vec<Order>,
}

impl Agent {
    pub fn new(id: u64, starting_capital: i64) -> Self {
        Self {
            id,
            capital: starting_capital,
            open_orders: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current capital (signed fixed-point)
    #[inline]
    pub fn capital(&self) -> i64 {
        self.capital
    }

    /// Orders issued by this agent, in issuance order
    #[inline]
    pub fn open_orders(&self) -> &[Order] {
        &self.open_orders
    }

    /// Capital after debiting `stake`, without applying it
    pub(crate) fn capital_after(&self, stake: u64) -> Result<i64> {
        checked_debit(self.capital, stake).ok_or(ExchangeError::CapitalOverflow {
            agent_id: self.id,
            stake,
        })
    }

    /// Apply a debit computed by [`Agent::capital_after`] and record the order
    pub(crate) fn commit(&mut self, capital: i64, order: Order) {
        self.capital = capital;
        self.open_orders.push(order);
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**Agent {}**", self.id)?;
        writeln!(f, "  Capital: {}", from_capital(self.capital))?;
        write!(f, "  Open orders:")?;
        for order in &self.open_orders {
            write!(f, "\n    {order}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    #[test]
    fn test_agent_commit_allows_negative_capital() {
        let mut agent = Agent::new(1, 500_000_000);
        let order = Order::new(1, 1, 1, Side::Back, 200_000_000, 1_000_000_000).unwrap();

        let capital = agent.capital_after(order.stake()).unwrap();
        assert_eq!(capital, -500_000_000);

        agent.commit(capital, order.clone());
        assert_eq!(agent.capital(), -500_000_000);
        assert_eq!(agent.open_orders(), &[order]);
    }

    #[test]
    fn test_agent_capital_overflow() {
        let agent = Agent::new(3, i64::MIN);
        assert_eq!(
            agent.capital_after(1),
            Err(ExchangeError::CapitalOverflow {
                agent_id: 3,
                stake: 1
            })
        );
    }

    #[test]
    fn test_agent_display() {
        let mut agent = Agent::new(2, 10_000_000_000);
        let order = Order::new(5, 2, 1, Side::Lay, 210_000_000, 600_000_000).unwrap();
        agent.commit(9_400_000_000, order);

        let text = agent.to_string();
        assert!(text.starts_with("**Agent 2**"));
        assert!(text.contains("Capital: 94.00"));
        assert!(text.contains("Lay(id=5, limit_odds=2.1, stake=6, agent=2, event=1)"));
    }
}
