//! Bookkeeping shared by one top-level read or write.

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Budget for store crossings during a single traversal.
///
/// Plain descents are bounded per store by `max_depth` and restart at each
/// store boundary. The number of boundaries one call may cross is bounded
/// by the `max_depth` of the store the call started on, so a cycle through
/// stores or deferred producers ends in `DepthLimitExceeded`.
pub(crate) struct Traversal {
    limit: usize,
    crossings: usize,
}

impl Traversal {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            crossings: 0,
        }
    }

    /// Record entry into a nested store.
    pub(crate) fn cross(&mut self, segment: &str) -> StoreResult<()> {
        if self.crossings >= self.limit {
            debug!(limit = self.limit, segment, "store crossing limit exceeded");
            return Err(StoreError::DepthLimitExceeded { limit: self.limit });
        }
        self.crossings += 1;
        Ok(())
    }
}
