//! Order slot for slab-based book storage.
//!
//! ## Design
//!
//! `OrderSlot` pairs an immutable `Order` with its mutable book `Status`.
//! The matching engine never rebuilds orders: it returns slab keys, and the
//! book re-tags the addressed slots in place.
//!
//! ## Slab Integration
//!
//! Per official slab docs (https://docs.rs/slab/0.4.11):
//! - Keys are `usize` values returned by `slab.insert()`
//! - O(1) insert and lookup
//!
//! Orders are never removed from a book, so keys are stable for the lifetime
//! of the event.

use crate::types::{Order, Side, Status};

/// Book slot stored in the slab.
///
/// `arrival` is the per-book insertion sequence number. The engine uses it to
/// break ties between equal limit odds, so ranking stays stable after the book
/// reorders its sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSlot {
    pub order: Order,
    pub status: Status,
    pub arrival: u64,
}

impl OrderSlot {
    /// Create a new unmatched slot
    ///
    /// ```
    /// use backlay::book::OrderSlot;
    /// use backlay::types::{Order, Side, Status};
    ///
    /// let order = Order::new(1, 1, 1, Side::Back, 200_000_000, 1_000_000_000).unwrap();
    /// let slot = OrderSlot::new(order, 0);
    /// assert_eq!(slot.status, Status::Unmatched);
    /// ```
    #[inline]
    pub fn new(order: Order, arrival: u64) -> Self {
        Self {
            order,
            status: Status::Unmatched,
            arrival,
        }
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id()
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.order.side()
    }

    #[inline]
    pub fn limit_odds(&self) -> u64 {
        self.order.limit_odds()
    }

    #[inline]
    pub fn stake(&self) -> u64 {
        self.order.stake()
    }

    #[inline]
    pub fn is_matched(&self) -> bool {
        self.status == Status::Matched
    }

    /// Canonical bytes for state hashing: the order in SSZ field layout,
    /// then the status byte and arrival (LE)
    pub fn encode(&self) -> Vec<u8> {
        let order = &self.order;
        let mut bytes = Vec::with_capacity(50);
        bytes.extend_from_slice(&order.id().to_le_bytes());
        bytes.extend_from_slice(&order.agent_id().to_le_bytes());
        bytes.extend_from_slice(&order.event_id().to_le_bytes());
        bytes.push(order.side().to_u8());
        bytes.extend_from_slice(&order.limit_odds().to_le_bytes());
        bytes.extend_from_slice(&order.stake().to_le_bytes());
        bytes.push(self.status.to_u8());
        bytes.extend_from_slice(&self.arrival.to_le_bytes());
        bytes
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
