//! Last-request-wins bookkeeping.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Monotonic counter of started requests for one view slot.
#[derive(Debug, Clone, Default)]
pub struct RequestGeneration {
    current: Arc<AtomicU64>,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every ticket handed out before.
    pub fn begin(&self) -> RequestTicket {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let generation = RequestGeneration::new();
        let first = generation.begin();
        assert!(first.is_current());

        let second = generation.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(second.generation(), 2);
        assert_eq!(generation.current(), 2);
    }
}
