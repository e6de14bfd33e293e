pub mod classify;
pub mod protocol;
pub mod session;
pub mod transcript;

pub use protocol::{Command, EnvelopeError, RemoteEvent};
pub use session::{ConnectionState, Effect, Input, Session, TaskState};
pub use transcript::{EntryKind, TranscriptEntry};
