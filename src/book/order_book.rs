//! Per-event order book: a slab arena of slots plus two key sequences.
//!
//! ## Architecture
//!
//! - **Slab**: owns every `OrderSlot` for the event; keys never move
//! - **Back / lay sequences**: `Vec<usize>` of slab keys per side
//! - **HashMap**: order ID to slab key mapping
//!
//! Sequence order is arrival order until the first clearing run, after which
//! each side reads `matched ++ unmatched` in ranked order. Matching re-sorts
//! anyway, so the order of a sequence never affects an outcome.
//!
//! Orders are never removed or cancelled once added.
//!
//! ## Example
//!
//! ```
//! use backlay::book::OrderBook;
//! use backlay::types::{Order, Side, Status};
//!
//! let mut book = OrderBook::with_capacity(16);
//! let back = Order::new(1, 1, 1, Side::Back, 200_000_000, 1_000_000_000).unwrap();
//! let lay = Order::new(2, 2, 1, Side::Lay, 250_000_000, 800_000_000).unwrap();
//!
//! book.add(back);
//! book.add(lay);
//!
//! assert_eq!(book.back_count(), 1);
//! assert_eq!(book.lay_count(), 1);
//! assert!(book.back_side().all(|(_, status)| status == Status::Unmatched));
//! ```

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::book::OrderSlot;
use crate::types::{Order, Side, Status};

/// Clearing odds produced by a matching run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearingOdds {
    /// Odds at which matched back orders settle
    pub bettor_odds: u64,
    /// Odds at which matched lay orders settle
    pub layer_odds: u64,
}

/// One side of an engine result, as slab keys.
///
/// `matched` is in the order the engine consumed the slots; `unmatched` is
/// in ranked order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub matched: Vec<usize>,
    pub unmatched: Vec<usize>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.unmatched.is_empty()
    }

    /// Matched keys followed by unmatched keys
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.matched.iter().chain(self.unmatched.iter()).copied()
    }
}

/// Borrowed view of both sides, in current sequence order.
#[derive(Debug)]
pub struct BookSnapshot<'a> {
    pub back: Vec<(usize, &'a OrderSlot)>,
    pub lay: Vec<(usize, &'a OrderSlot)>,
}

/// Order book for a single binary event.
#[derive(Debug, Default)]
pub struct OrderBook {
    slots: Slab<OrderSlot>,
    back: Vec<usize>,
    lay: Vec<usize>,
    order_index: HashMap<u64, usize>,
    next_arrival: u64,
    clearing: Option<ClearingOdds>,
}

impl OrderBook {
    /// Create a new empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with pre-allocated slot capacity
    ///
    /// ```
    /// use backlay::book::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(1_000);
    /// assert!(book.capacity() >= 1_000);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
            back: Vec::with_capacity(capacity / 2),
            lay: Vec::with_capacity(capacity / 2),
            order_index: HashMap::with_capacity(capacity),
            next_arrival: 0,
            clearing: None,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn back_count(&self) -> usize {
        self.back.len()
    }

    #[inline]
    pub fn lay_count(&self) -> usize {
        self.lay.len()
    }

    /// Number of slots currently tagged `Matched`
    pub fn matched_count(&self) -> usize {
        self.slots.iter().filter(|(_, slot)| slot.is_matched()).count()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Append an order to its side with status `Unmatched`
    ///
    /// Returns the slab key of the new slot.
    pub fn add(&mut self, order: Order) -> usize {
        let order_id = order.id();
        let side = order.side();
        debug_assert!(
            !self.order_index.contains_key(&order_id),
            "order {order_id} added twice"
        );

        let slot = OrderSlot::new(order, self.next_arrival);
        self.next_arrival += 1;

        let key = self.slots.insert(slot);
        self.order_index.insert(order_id, key);

        match side {
            Side::Back => self.back.push(key),
            Side::Lay => self.lay.push(key),
        }

        key
    }

    #[inline]
    pub fn get(&self, key: usize) -> Option<&OrderSlot> {
        self.slots.get(key)
    }

    /// Look up a slot by order ID
    pub fn get_by_id(&self, order_id: u64) -> Option<&OrderSlot> {
        let key = *self.order_index.get(&order_id)?;
        self.slots.get(key)
    }

    // ========================================================================
    // Side access
    // ========================================================================

    /// Slab keys of one side, in sequence order
    pub fn keys(&self, side: Side) -> &[usize] {
        match side {
            Side::Back => &self.back,
            Side::Lay => &self.lay,
        }
    }

    /// (Order, Status) pairs of one side, in sequence order
    pub fn side(&self, side: Side) -> impl Iterator<Item = (&Order, Status)> + '_ {
        self.keys(side)
            .iter()
            .filter_map(|&key| self.slots.get(key))
            .map(|slot| (&slot.order, slot.status))
    }

    pub fn back_side(&self) -> impl Iterator<Item = (&Order, Status)> + '_ {
        self.side(Side::Back)
    }

    pub fn lay_side(&self) -> impl Iterator<Item = (&Order, Status)> + '_ {
        self.side(Side::Lay)
    }

    /// Current clearing odds, `None` until a run produced them
    #[inline]
    pub fn clearing(&self) -> Option<ClearingOdds> {
        self.clearing
    }

    // ========================================================================
    // Matching boundary
    // ========================================================================

    /// Borrow both sides as matching input
    pub fn snapshot(&self) -> BookSnapshot<'_> {
        BookSnapshot {
            back: self.view(&self.back),
            lay: self.view(&self.lay),
        }
    }

    fn view(&self, keys: &[usize]) -> Vec<(usize, &OrderSlot)> {
        keys.iter()
            .filter_map(|&key| self.slots.get(key).map(|slot| (key, slot)))
            .collect()
    }

    /// Swap in an engine result
    ///
    /// Re-tags every slot by key and rewrites each side as
    /// `matched ++ unmatched`.
    ///
    /// # Panics
    ///
    /// In debug builds, if a partition does not cover exactly the keys of its
    /// side.
    pub fn replace(&mut self, back: &Partition, lay: &Partition, clearing: ClearingOdds) {
        debug_assert!(covers(&self.back, back), "back partition does not cover the back side");
        debug_assert!(covers(&self.lay, lay), "lay partition does not cover the lay side");

        for partition in [back, lay] {
            for &key in &partition.matched {
                if let Some(slot) = self.slots.get_mut(key) {
                    slot.status = Status::Matched;
                }
            }
            for &key in &partition.unmatched {
                if let Some(slot) = self.slots.get_mut(key) {
                    slot.status = Status::Unmatched;
                }
            }
        }

        self.back = back.keys().collect();
        self.lay = lay.keys().collect();
        self.clearing = Some(clearing);
    }

    /// Tag every slot `Settled`
    pub fn mark_settled(&mut self) {
        for (_, slot) in self.slots.iter_mut() {
            slot.status = Status::Settled;
        }
    }

    // ========================================================================
    // State hashing
    // ========================================================================

    /// SHA-256 over every slot (back side, then lay side) and the clearing odds
    ///
    /// Two books holding the same orders with the same statuses, sequence
    /// order and clearing odds hash identically.
    pub fn compute_state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        for side in [Side::Back, Side::Lay] {
            hasher.update([side.to_u8()]);
            hasher.update((self.keys(side).len() as u64).to_le_bytes());
            for &key in self.keys(side) {
                if let Some(slot) = self.slots.get(key) {
                    hasher.update(slot.encode());
                }
            }
        }

        let (bettor, layer) = self
            .clearing
            .map_or((0, 0), |c| (c.bettor_odds, c.layer_odds));
        hasher.update(bettor.to_le_bytes());
        hasher.update(layer.to_le_bytes());

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        root
    }
}

fn covers(keys: &[usize], partition: &Partition) -> bool {
    if keys.len() != partition.len() {
        return false;
    }
    let mut expected = keys.to_vec();
    let mut actual: Vec<usize> = partition.keys().collect();
    expected.sort_unstable();
    actual.sort_unstable();
    expected == actual
}

// ============================================================================
// Unit Tests
// ============================================================================
