//! Overall-cap accounting for batch sizing.

/// Tracks how much of the run's overall item cap is still available while
/// per-category batches are sized.
///
/// Each category's batch request is bounded by `remaining()`, which is the
/// cap minus everything already sized for higher-priority categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    cap: usize,
    sized: usize,
}

impl Budget {
    /// Create a budget with the run's overall item cap.
    pub fn new(cap: usize) -> Self {
        Self { cap, sized: 0 }
    }

    /// How many items may still be requested.
    pub fn remaining(&self) -> usize {
        self.cap.saturating_sub(self.sized)
    }

    /// Record that a batch of `count` items was sized.
    pub fn consume(&mut self, count: usize) {
        self.sized = self.sized.saturating_add(count);
    }

    /// Total items sized so far.
    pub fn sized(&self) -> usize {
        self.sized
    }

    /// Whether nothing more may be requested.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_shrinks_as_batches_are_sized() {
        let mut budget = Budget::new(100);
        assert_eq!(budget.remaining(), 100);

        budget.consume(40);
        assert_eq!(budget.remaining(), 60);

        budget.consume(35);
        assert_eq!(budget.remaining(), 25);
        assert_eq!(budget.sized(), 75);
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let mut budget = Budget::new(10);
        budget.consume(10);
        assert!(budget.is_exhausted());
        assert_eq!(budget.remaining(), 0);

        // Sizing past the cap must not wrap
        budget.consume(5);
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.sized(), 15);
    }

    #[test]
    fn zero_cap_is_exhausted_immediately() {
        let budget = Budget::new(0);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn unlimited_cap_never_exhausts_in_practice() {
        let mut budget = Budget::new(usize::MAX);
        budget.consume(1_000_000);
        assert!(!budget.is_exhausted());
        assert_eq!(budget.remaining(), usize::MAX - 1_000_000);
    }
}
