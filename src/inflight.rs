//! Single-flight-per-target bookkeeping.
//!
//! Every request that targets a key takes a [`Ticket`]. Issuing a new ticket
//! for the same key supersedes all older ones, so a slow response from an
//! earlier request can be recognised and discarded when it finally lands.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket<K> {
    key: K,
    generation: u64,
}

impl<K: Copy> Ticket<K> {
    pub fn key(&self) -> K {
        self.key
    }
}

/// Per-key generation counters.
#[derive(Debug)]
pub struct InFlight<K> {
    generations: Mutex<HashMap<K, u64>>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            generations: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Copy + Eq + Hash> InFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `key`, superseding any request already in flight.
    pub fn begin(&self, key: K) -> ClientResult<Ticket<K>> {
        let mut generations = self
            .generations
            .lock()
            .map_err(|_| ClientError::LockPoisoned("inflight begin"))?;
        let generation = generations.entry(key).or_insert(0);
        *generation += 1;
        Ok(Ticket {
            key,
            generation: *generation,
        })
    }

    /// True while no newer ticket has been issued for the same key.
    pub fn is_current(&self, ticket: &Ticket<K>) -> ClientResult<bool> {
        let generations = self
            .generations
            .lock()
            .map_err(|_| ClientError::LockPoisoned("inflight check"))?;
        Ok(generations.get(&ticket.key) == Some(&ticket.generation))
    }

    /// Invalidate every outstanding ticket for `key` without starting a request.
    pub fn supersede(&self, key: K) -> ClientResult<()> {
        self.begin(key).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_wins() {
        let inflight = InFlight::new();
        let first = inflight.begin(5).unwrap();
        let second = inflight.begin(5).unwrap();

        assert!(!inflight.is_current(&first).unwrap());
        assert!(inflight.is_current(&second).unwrap());
    }

    #[test]
    fn keys_are_independent() {
        let inflight = InFlight::new();
        let five = inflight.begin(5).unwrap();
        let seven = inflight.begin(7).unwrap();
        inflight.begin(7).unwrap();

        assert!(inflight.is_current(&five).unwrap());
        assert!(!inflight.is_current(&seven).unwrap());
    }

    #[test]
    fn supersede_invalidates_outstanding() {
        let inflight = InFlight::new();
        let ticket = inflight.begin("reports").unwrap();
        inflight.supersede("reports").unwrap();
        assert!(!inflight.is_current(&ticket).unwrap());
    }
}
