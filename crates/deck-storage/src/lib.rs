//! Bounded, coalescing transcript store.
//!
//! The whole transcript lives in memory and is re-serialized into a single
//! SQLite slot on every mutation; `load_all` is the one read path and never
//! writes. The store expects a single owning thread.

use std::collections::VecDeque;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

use deck_core::{EntryKind, TranscriptEntry};

/// Oldest entries are evicted first once the log is full.
pub const TRANSCRIPT_CAPACITY: usize = 50;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Outcome of an `append` after coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appended {
    Pushed,
    Replaced,
    Dropped,
}

pub struct TranscriptStore {
    conn: Connection,
    entries: VecDeque<TranscriptEntry>,
    next_sequence: u64,
}

impl TranscriptStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS transcript (
                slot INTEGER PRIMARY KEY CHECK (slot = 0),
                entries_json TEXT NOT NULL
            )
            ",
        )?;
        Ok(Self {
            conn,
            entries: VecDeque::with_capacity(TRANSCRIPT_CAPACITY),
            next_sequence: 0,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one entry, applying the two coalescing rules: an `Error`
    /// repeating the previous `Error` verbatim overwrites it in place, and
    /// a `Tool` entry repeating the current last text is dropped. Every
    /// stored outcome rewrites the durable slot.
    pub fn append(
        &mut self,
        kind: EntryKind,
        text: impl Into<String>,
    ) -> Result<Appended, StorageError> {
        let text = text.into();

        if kind == EntryKind::Tool {
            if let Some(last) = self.entries.back() {
                if last.text == text {
                    return Ok(Appended::Dropped);
                }
            }
        }

        if kind == EntryKind::Error {
            if let Some(last) = self.entries.back_mut() {
                if last.kind == EntryKind::Error && last.text == text {
                    last.text = text;
                    self.persist()?;
                    return Ok(Appended::Replaced);
                }
            }
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push_back(TranscriptEntry {
            kind,
            text,
            sequence,
        });
        while self.entries.len() > TRANSCRIPT_CAPACITY {
            self.entries.pop_front();
        }
        self.persist()?;
        Ok(Appended::Pushed)
    }

    /// Repopulate the in-memory log from the durable slot and return a copy.
    /// Does not write; intended for startup.
    pub fn load_all(&mut self) -> Result<Vec<TranscriptEntry>, StorageError> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT entries_json FROM transcript WHERE slot = 0",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let mut entries: Vec<TranscriptEntry> = match stored {
            Some(json) => serde_json::from_str(&json)
                .map_err(|err| StorageError::Serialization(err.to_string()))?,
            None => Vec::new(),
        };
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.sequence = index as u64;
        }

        self.entries = entries.iter().cloned().collect();
        self.next_sequence = entries.len() as u64;
        Ok(entries)
    }

    /// Drop both the in-memory log and the durable slot.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM transcript WHERE slot = 0", [])?;
        self.entries.clear();
        self.next_sequence = 0;
        Ok(())
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.conn.execute(
            "
            INSERT INTO transcript (slot, entries_json) VALUES (0, ?1)
            ON CONFLICT(slot) DO UPDATE SET entries_json=excluded.entries_json
            ",
            [&json],
        )?;
        Ok(())
    }
}
