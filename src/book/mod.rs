//! Order book module: per-event storage of (Order, Status) slots.
//!
//! ## Architecture
//!
//! - **Slab arena**: every slot of an event lives in one `Slab<OrderSlot>`
//! - **Side sequences**: back and lay sides are vectors of slab keys
//! - **In-place status**: the engine hands back keys; the book re-tags slots
//!
//! ## Components
//!
//! - [`OrderSlot`]: an immutable `Order` plus its `Status` and arrival number
//! - [`OrderBook`]: both sides of one event plus its clearing odds
//! - [`Event`]: a binary market owning its order book
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order | O(1) |
//! | Lookup by key / ID | O(1) |
//! | Snapshot | O(n) |
//! | Replace | O(n) |

pub mod slot;
pub mod order_book;
pub mod event;

pub use slot::OrderSlot;
pub use order_book::{BookSnapshot, ClearingOdds, OrderBook, Partition};
pub use event::Event;
