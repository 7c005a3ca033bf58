use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Single-holder, non-queueing permit guarding the hot engine.
///
/// Acquisition never waits: a request either gets the ticket immediately or
/// is routed elsewhere. Clones share the same underlying permit.
#[derive(Debug, Clone)]
pub struct AdmissionPermit {
    semaphore: Arc<Semaphore>,
}

/// Proof of exclusive access to the hot engine. Released on drop.
#[derive(Debug)]
pub struct FastLaneTicket {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionPermit {
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn try_acquire(&self) -> Option<FastLaneTicket> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| FastLaneTicket { _permit: permit })
    }

    pub fn is_held(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

impl Default for AdmissionPermit {
    fn default() -> Self {
        Self::new()
    }
}
