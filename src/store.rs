//! Persistence interface the review service writes through.

use std::collections::HashMap;

use crate::{card::CardMemoryState, error::StoreError, id::CardId, review_log::ReviewLog};

/// Storage for memory states and their review logs.
///
/// Implementations must apply `save_memory_state_and_log` atomically: either
/// both the state and the log are stored, or neither is.
pub trait CardStore {
    fn load_memory_state(&self, card: CardId) -> Result<Option<CardMemoryState>, StoreError>;

    fn save_memory_state_and_log(
        &mut self,
        card: CardId,
        state: &CardMemoryState,
        log: &ReviewLog,
    ) -> Result<(), StoreError>;
}

/// Keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    states: HashMap<CardId, CardMemoryState>,
    logs: Vec<(CardId, ReviewLog)>,
    writes: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Review logs of one card, oldest first.
    pub fn logs(&self, card: CardId) -> impl Iterator<Item = &ReviewLog> {
        self.logs
            .iter()
            .filter(move |(id, _)| *id == card)
            .map(|(_, log)| log)
    }

    /// Number of successful `save_memory_state_and_log` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CardStore for InMemoryStore {
    fn load_memory_state(&self, card: CardId) -> Result<Option<CardMemoryState>, StoreError> {
        Ok(self.states.get(&card).cloned())
    }

    fn save_memory_state_and_log(
        &mut self,
        card: CardId,
        state: &CardMemoryState,
        log: &ReviewLog,
    ) -> Result<(), StoreError> {
        self.states.insert(card, state.clone());
        self.logs.push((card, log.clone()));
        self.writes += 1;
        Ok(())
    }
}
