//! Priority-ordered consumption of per-category batches.

use msgvault_types::{Batch, Category, Record};

/// The records taken from one batch for a single conversion tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The category every record in this chunk belongs to
    pub category: Category,
    /// Up to the per-request cap of records, in batch order
    pub records: Vec<Record>,
}

impl Chunk {
    /// Number of records in the chunk.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the chunk holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One queued batch plus its read position.
#[derive(Debug, Clone)]
struct Slot {
    category: Category,
    records: Vec<Record>,
    pos: usize,
}

impl Slot {
    fn unread(&self) -> usize {
        self.records.len() - self.pos
    }
}

/// Ordered list of per-category batches with a single priority-ordered
/// selection function.
///
/// Categories drain strictly in priority order: a chunk is always taken from
/// the highest-priority category that still has unread records, so a
/// category is exhausted before the next one begins. Callers queue at most
/// one batch per category per run.
#[derive(Debug, Clone, Default)]
pub struct BatchQueue {
    slots: Vec<Slot>,
}

impl BatchQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch. Empty batches are dropped; the queue keeps itself
    /// sorted by category priority regardless of push order.
    pub fn push(&mut self, batch: Batch) {
        if batch.is_empty() {
            return;
        }
        self.slots.push(Slot { category: batch.category, records: batch.records, pos: 0 });
        self.slots.sort_by_key(|slot| slot.category.priority());
    }

    /// Take up to `cap` records from the highest-priority category with
    /// unread records. Returns `None` when the queue is drained or `cap`
    /// is zero.
    pub fn next_chunk(&mut self, cap: usize) -> Option<Chunk> {
        if cap == 0 {
            return None;
        }
        let slot = self.slots.iter_mut().find(|slot| slot.unread() > 0)?;
        let take = cap.min(slot.unread());
        let records = slot.records[slot.pos..slot.pos + take].to_vec();
        slot.pos += take;
        Some(Chunk { category: slot.category, records })
    }

    /// Categories with queued batches, in priority order.
    pub fn categories(&self) -> Vec<Category> {
        self.slots.iter().map(|slot| slot.category).collect()
    }

    /// Total records queued, read or not.
    pub fn total(&self) -> usize {
        self.slots.iter().map(|slot| slot.records.len()).sum()
    }

    /// Records not yet taken by a chunk.
    pub fn remaining(&self) -> usize {
        self.slots.iter().map(Slot::unread).sum()
    }

    /// Whether every queued record has been taken.
    pub fn is_drained(&self) -> bool {
        self.remaining() == 0
    }
}
