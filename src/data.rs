//! The JSON data file: every card's memory state and every review log in one
//! document, replaced as a whole on each write.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    card::CardMemoryState,
    error::StoreError,
    id::CardId,
    review_log::ReviewLog,
    store::CardStore,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    #[serde(default)]
    pub cards: BTreeMap<CardId, CardMemoryState>,
    #[serde(default)]
    pub logs: Vec<LoggedReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedReview {
    pub card: CardId,
    pub log: ReviewLog,
}

pub struct JsonFileStore {
    path: PathBuf,
    data: Data,
}

impl JsonFileStore {
    /// Opens the data file, starting empty when it does not exist yet. A file
    /// that exists but does not parse is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match File::open(&path) {
            Ok(file) if file.metadata()?.len() == 0 => Data::default(),
            Ok(file) => serde_json::from_reader(BufReader::new(file))?,
            Err(err) if err.kind() == ErrorKind::NotFound => Data::default(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), cards = data.cards.len(), "opened data file");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.data.cards.contains_key(&card)
    }

    /// Cards due at `now`, earliest first.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<(CardId, &CardMemoryState)> {
        let mut due: Vec<_> = self
            .data
            .cards
            .iter()
            .filter(|(_, state)| state.is_due(now))
            .map(|(id, state)| (*id, state))
            .collect();
        due.sort_by_key(|(_, state)| state.due);
        due
    }

    pub fn logs(&self, card: CardId) -> impl Iterator<Item = &ReviewLog> {
        self.data
            .logs
            .iter()
            .filter(move |entry| entry.card == card)
            .map(|entry| &entry.log)
    }

    /// Registers a card that has not been reviewed yet.
    pub fn insert_new(&mut self, card: CardId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut next = self.data.clone();
        next.cards.insert(card, CardMemoryState::new(now));
        self.commit(next)
    }

    /// Writes `data` next to the data file and renames it into place, then
    /// adopts it in memory. Nothing changes if any step fails.
    fn commit(&mut self, data: Data) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &data)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        self.data = data;
        Ok(())
    }
}

impl CardStore for JsonFileStore {
    fn load_memory_state(&self, card: CardId) -> Result<Option<CardMemoryState>, StoreError> {
        Ok(self.data.cards.get(&card).cloned())
    }

    fn save_memory_state_and_log(
        &mut self,
        card: CardId,
        state: &CardMemoryState,
        log: &ReviewLog,
    ) -> Result<(), StoreError> {
        let mut next = self.data.clone();
        next.cards.insert(card, state.clone());
        next.logs.push(LoggedReview {
            card,
            log: log.clone(),
        });
        self.commit(next)?;
        info!(%card, state = %state.state, due = %state.due, "saved review");
        Ok(())
    }
}
