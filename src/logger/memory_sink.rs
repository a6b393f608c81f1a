use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use super::types::{VerdictEntry, VerdictSink};

/// Bounded ring buffer of recent verdicts, shared with the control API.
pub struct MemorySink {
    buffer: Arc<RwLock<VecDeque<VerdictEntry>>>,
    capacity: usize,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn clone_buffer(&self) -> Arc<RwLock<VecDeque<VerdictEntry>>> {
        self.buffer.clone()
    }
}

impl VerdictSink for MemorySink {
    fn log(&self, entry: &VerdictEntry) {
        let mut buffer = self.buffer.write().unwrap();
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry.clone());
    }
}
