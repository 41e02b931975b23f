//! A binary-outcome market and its order book.

use std::fmt;

use crate::book::{ClearingOdds, OrderBook};
use crate::error::{ExchangeError, Result};
use crate::types::odds::{from_fixed_trimmed, is_valid_probability};
use crate::types::{Order, Status};

/// One binary event.
///
/// `true_probability` is simulation ground truth. Matching never reads it;
/// only outcome sampling at settlement time does.
#[derive(Debug)]
pub struct Event {
    id: u64,
    true_probability: u64,
    book: OrderBook,
    is_settled: bool,
}

impl Event {
    /// Create an event with an empty book
    ///
    /// # Errors
    ///
    /// [`ExchangeError::InvalidProbability`] if `true_probability` is above 1.0.
    ///
    /// ```
    /// use backlay::book::Event;
    ///
    /// let event = Event::new(1, 40_000_000, 64).unwrap();
    /// assert!(!event.is_matched());
    /// assert_eq!(event.bettor_odds(), None);
    /// ```
    pub fn new(id: u64, true_probability: u64, capacity: usize) -> Result<Self> {
        if !is_valid_probability(true_probability) {
            return Err(ExchangeError::InvalidProbability {
                probability: true_probability,
            });
        }

        Ok(Self {
            id,
            true_probability,
            book: OrderBook::with_capacity(capacity),
            is_settled: false,
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn true_probability(&self) -> u64 {
        self.true_probability
    }

    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[inline]
    pub(crate) fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    pub fn back_side(&self) -> impl Iterator<Item = (&Order, Status)> + '_ {
        self.book.back_side()
    }

    pub fn lay_side(&self) -> impl Iterator<Item = (&Order, Status)> + '_ {
        self.book.lay_side()
    }

    #[inline]
    pub fn clearing(&self) -> Option<ClearingOdds> {
        self.book.clearing()
    }

    pub fn bettor_odds(&self) -> Option<u64> {
        self.clearing().map(|c| c.bettor_odds)
    }

    pub fn layer_odds(&self) -> Option<u64> {
        self.clearing().map(|c| c.layer_odds)
    }

    /// True once a run has produced clearing odds
    #[inline]
    pub fn is_matched(&self) -> bool {
        self.book.clearing().is_some()
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.is_settled
    }

    pub(crate) fn settle(&mut self) {
        self.book.mark_settled();
        self.is_settled = true;
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let odds = |o: Option<u64>| o.map_or_else(|| "unset".to_string(), from_fixed_trimmed);

        writeln!(f, "**Event {}**", self.id)?;
        writeln!(f, "  True Probability: {}", from_fixed_trimmed(self.true_probability))?;
        writeln!(f, "  Bettor Odds: {}", odds(self.bettor_odds()))?;
        writeln!(f, "  Layer Odds: {}", odds(self.layer_odds()))?;
        write!(f, "  All orders:")?;
        for (order, status) in self.back_side().chain(self.lay_side()) {
            write!(f, "\n    {order} ({status})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    #[test]
    fn test_event_rejects_bad_probability() {
        assert!(Event::new(1, 0, 0).is_ok());
        assert!(Event::new(1, 100_000_000, 0).is_ok());
        assert_eq!(
            Event::new(1, 100_000_001, 0).unwrap_err(),
            ExchangeError::InvalidProbability {
                probability: 100_000_001
            }
        );
    }

    #[test]
    fn test_event_display() {
        let mut event = Event::new(2, 50_000_000, 4).unwrap();
        let order = Order::new(1, 1, 2, Side::Back, 200_000_000, 1_000_000_000).unwrap();
        event.book_mut().add(order);

        let text = event.to_string();
        assert!(text.starts_with("**Event 2**"));
        assert!(text.contains("True Probability: 0.5"));
        assert!(text.contains("Bettor Odds: unset"));
        assert!(text.contains("Back(id=1, limit_odds=2, stake=10, agent=1, event=2) (unmatched)"));
    }

    #[test]
    fn test_event_settle() {
        let mut event = Event::new(1, 50_000_000, 4).unwrap();
        let order = Order::new(1, 1, 1, Side::Lay, 200_000_000, 1).unwrap();
        event.book_mut().add(order);

        event.settle();
        assert!(event.is_settled());
        assert!(event.lay_side().all(|(_, s)| s == Status::Settled));
    }
}
