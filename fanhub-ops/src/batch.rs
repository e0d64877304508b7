/// Splits `total` items into batches of at most `batch_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub total: usize,
    pub batch_size: usize,
}

impl BatchPlan {
    /// A zero batch size is treated as one
    pub fn new(total: usize, batch_size: usize) -> Self {
        Self {
            total,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_count(&self) -> usize {
        self.total.div_ceil(self.batch_size)
    }

    /// Size of batch `index` (zero based); the last batch may be short
    pub fn batch_len(&self, index: usize) -> usize {
        let start = index.saturating_mul(self.batch_size);
        self.total.saturating_sub(start).min(self.batch_size)
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.batch_count()
    }
}
