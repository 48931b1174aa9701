//! Storage layer for the notes backend. Provides storage for:
//! - Notes, partitioned by owner ([`NotesStore`])
//!
//! Current implementation keeps everything in memory; callers share it
//! between requests behind an async lock.

mod notes;

pub use notes::{Note, NoteInput, NotesStore};
