use crate::domain::LogRecord;
use parking_lot::Mutex;
use std::time::Instant;
use uuid::Uuid;

/// One ordered group of records handed to the transport as a single
/// delivery unit. Owned exclusively by one delivery from the moment the
/// buffer is swapped out.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    records: Vec<LogRecord>,
    created_at: Instant,
}

impl Batch {
    pub fn new(records: Vec<LogRecord>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            records,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// Ordered accumulator for enriched records, shared by every producer
/// (logging calls and the error bridge).
///
/// All mutation goes through `append` and `swap_and_clear` under one
/// mutex, so a swap is a single uninterruptible step: from any
/// producer's point of view the buffer is either before or after the
/// swap, never partially drained. Neither operation suspends.
pub struct BatchBuffer {
    records: Mutex<Vec<LogRecord>>,
    batch_size: usize,
}

impl BatchBuffer {
    pub fn new(batch_size: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            batch_size,
        }
    }

    /// Append one record, preserving enqueue order. Returns `true` when
    /// the post-append length reached the configured batch size and a
    /// flush should be requested immediately.
    pub fn append(&self, record: LogRecord) -> bool {
        let mut records = self.records.lock();
        records.push(record);
        records.len() >= self.batch_size
    }

    /// Atomically take the current contents and reset to empty.
    pub fn swap_and_clear(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
