//! Monotonic identifier sequences owned by the exchange registry.

/// Hands out increasing IDs starting at 1.
///
/// ```
/// use backlay::ledger::IdSequence;
///
/// let mut ids = IdSequence::new();
/// assert_eq!(ids.next_id(), 1);
/// assert_eq!(ids.next_id(), 2);
/// assert_eq!(ids.peek(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Get the next ID and increment the counter
    #[inline]
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Get the next ID without incrementing
    #[inline]
    pub fn peek(&self) -> u64 {
        self.next
    }
}
