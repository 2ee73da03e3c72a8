//! Note persistence contract shared by every backend.
//!
//! A caller picks exactly one [`NoteStore`] per running instance, either
//! the embedded [`LocalNoteStore`] or the networked [`RemoteNoteStore`],
//! and gets identical semantics from both. The backends never reconcile;
//! their note sets and id spaces are disjoint.

pub mod local;
pub mod remote;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use local::LocalNoteStore;
pub use remote::RemoteNoteStore;

/// Backend-assigned note identifier. Integers from the embedded store,
/// UUIDs from the notes service; opaque to callers either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Int(i64),
    Uuid(Uuid),
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Int(id) => write!(f, "{id}"),
            NoteId::Uuid(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for NoteId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<Uuid> for NoteId {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Title or content empty after trimming.
    #[error("validation: {0}")]
    Validation(String),
    /// The id is absent from the store.
    #[error("not found: {0}")]
    NotFound(String),
    /// The round trip to the notes service failed. Distinct from an
    /// error status the service itself returned.
    #[error("transport: {0}")]
    Transport(String),
    /// The embedded storage engine failed.
    #[error(transparent)]
    Storage(tokio_rusqlite::Error),
}

impl From<tokio_rusqlite::Error> for StoreError {
    fn from(error: tokio_rusqlite::Error) -> Self {
        match error {
            tokio_rusqlite::Error::Other(err) => {
                if err.is::<StoreError>() {
                    return *err.downcast::<StoreError>().unwrap();
                }
                Self::Storage(tokio_rusqlite::Error::Other(err))
            }
            tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => {
                Self::NotFound("Note not found".into())
            }
            error => Self::Storage(error),
        }
    }
}

impl From<StoreError> for tokio_rusqlite::Error {
    fn from(error: StoreError) -> Self {
        tokio_rusqlite::Error::Other(error.into())
    }
}

/// Create/update input check shared by both backends and the notes
/// service handlers. Stored text is kept verbatim; trimming is only
/// the emptiness predicate.
pub fn validate(title: &str, content: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title must not be empty".into());
    }
    if content.trim().is_empty() {
        return Err("content must not be empty".into());
    }
    Ok(())
}

/// Capability set every note backend implements identically.
///
/// Operations run one at a time for a single cooperative caller and are
/// not cancellable once issued. A failed operation leaves stored state
/// untouched.
#[async_trait]
pub trait NoteStore {
    /// All stored notes, most recently touched first (`updated_at`
    /// descending, ties in insertion order). Side-effect free.
    async fn list(&self) -> Result<Vec<Note>, StoreError>;

    /// Validates both fields, assigns a fresh unique id and persists
    /// with `created_at == updated_at == now`.
    async fn create(&self, title: &str, content: &str) -> Result<Note, StoreError>;

    /// Overwrites title/content and bumps `updated_at`. An absent id
    /// reports [`StoreError::NotFound`] even when the input is invalid;
    /// `id` and `created_at` never change.
    async fn update(&self, id: &NoteId, title: &str, content: &str) -> Result<Note, StoreError>;

    /// Permanently removes a note. Its id is never handed out again.
    async fn delete(&self, id: &NoteId) -> Result<(), StoreError>;
}
