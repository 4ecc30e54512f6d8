//! Run reports for the bulk loader and the change consumer.

/// Outcome of one bulk reindex.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BulkLoadReport {
    /// Rows returned by the join query
    pub fetched: usize,
    /// Rows written to the index
    pub indexed: usize,
    /// Rows dropped after logging
    pub failed: usize,
}

impl BulkLoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_indexed(&mut self) {
        self.indexed += 1;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Rows not yet accounted for (non-zero only if the run was cancelled).
    pub fn remaining(&self) -> usize {
        self.fetched.saturating_sub(self.indexed + self.failed)
    }
}

/// Outcome of one change-consumer run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerReport {
    /// Tasks indexed before the loop started (the bulk load)
    pub carried: u64,
    /// Create/update events written to the index
    pub upserted: u64,
    /// Delete events applied
    pub deleted: u64,
    /// Messages that decoded to no event, or to an unusable id
    pub skipped: u64,
    /// Events dropped after an enrichment, embedding or index failure
    pub failed: u64,
    /// Poll iterations
    pub polls: u64,
    /// Liveness lines emitted
    pub heartbeats: u64,
}

impl ConsumerReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter reported in the liveness line: successful upserts,
    /// including those carried over from the bulk load.
    pub fn events_processed(&self) -> u64 {
        self.carried + self.upserted
    }

    /// Messages seen in total.
    pub fn messages(&self) -> u64 {
        self.upserted + self.deleted + self.skipped + self.failed
    }
}
