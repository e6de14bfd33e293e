use serde::{Deserialize, Serialize};

/// Display category of a transcript entry.
///
/// The serialized tags match the persisted transcript format; `Agent`
/// entries are stored as `"ai"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    User,
    #[serde(rename = "ai")]
    Agent,
    Tool,
    System,
    Error,
}

/// One line of the operator-visible log.
///
/// `sequence` is assigned by the store and not persisted; reloaded entries
/// are renumbered from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub text: String,
    #[serde(skip)]
    pub sequence: u64,
}
