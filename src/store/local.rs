use async_trait::async_trait;
use chrono::Utc;
use lazy_static::lazy_static;
use rusqlite::{params, Row};
use rusqlite_migration::{Migrations, M};
use tokio_rusqlite::Connection;

use super::{validate, Note, NoteId, NoteStore, StoreError};

lazy_static! {
    static ref MIGRATIONS: Migrations<'static> = Migrations::new(vec![M::up(
        r#"
        CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,

            title TEXT NOT NULL,
            content TEXT NOT NULL,

            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        );
        CREATE INDEX notes_updated_at ON notes (updated_at);
        "#
    )]);
}

/// Note backend embedded in the calling process.
///
/// Owns its SQLite handle for the lifetime of the store. Ids are
/// auto-incrementing integers and are never reused after a delete.
/// Every operation runs in a single transaction, so a reader never
/// observes a partially written note.
pub struct LocalNoteStore {
    conn: Connection,
}

impl LocalNoteStore {
    pub async fn open(path: impl AsRef<std::path::Path> + Send + 'static) -> Result<Self, StoreError> {
        let conn = Connection::open(path).await?;

        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().await?;

        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            MIGRATIONS
                .to_latest(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(e.into()))?;

            conn.pragma_update(None, "journal_mode", "WAL")?;

            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Releases the underlying handle.
    pub async fn close(self) -> Result<(), StoreError> {
        self.conn.close().await.map_err(StoreError::from)
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: NoteId::Int(row.get(0)?),
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[async_trait]
impl NoteStore for LocalNoteStore {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let notes = self
            .conn
            .call(|conn| {
                let notes = conn
                    .prepare(
                        "SELECT id, title, content, created_at, updated_at FROM notes
                         ORDER BY updated_at DESC, id ASC",
                    )?
                    .query_map([], |row| note_from_row(row))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(notes)
            })
            .await?;

        Ok(notes)
    }

    async fn create(&self, title: &str, content: &str) -> Result<Note, StoreError> {
        validate(title, content).map_err(StoreError::Validation)?;

        let (title, content) = (title.to_owned(), content.to_owned());
        let note = self
            .conn
            .call(move |conn| {
                let now = Utc::now();
                let tx = conn.transaction()?;
                let note = tx.query_row(
                    r#"INSERT INTO notes (title, content, created_at, updated_at) VALUES (?, ?, ?, ?)
                    RETURNING id, title, content, created_at, updated_at"#,
                    params![title, content, now, now],
                    |row| note_from_row(row),
                )?;
                tx.commit()?;
                Ok(note)
            })
            .await?;

        Ok(note)
    }

    async fn update(&self, id: &NoteId, title: &str, content: &str) -> Result<Note, StoreError> {
        let note_id = match id {
            NoteId::Int(id) => *id,
            NoteId::Uuid(_) => return Err(StoreError::NotFound("Note not found".into())),
        };

        let (title, content) = (title.to_owned(), content.to_owned());
        let note = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM notes WHERE id = ?)",
                    params![note_id],
                    |row| row.get(0),
                )?;
                if !exists {
                    return Err(StoreError::NotFound("Note not found".into()).into());
                }

                validate(&title, &content)
                    .map_err(|message| tokio_rusqlite::Error::from(StoreError::Validation(message)))?;

                let note = tx.query_row(
                    r#"UPDATE notes SET title = ?, content = ?, updated_at = ?
                    WHERE id = ?
                    RETURNING id, title, content, created_at, updated_at"#,
                    params![title, content, Utc::now(), note_id],
                    |row| note_from_row(row),
                )?;
                tx.commit()?;
                Ok(note)
            })
            .await?;

        Ok(note)
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        let note_id = match id {
            NoteId::Int(id) => *id,
            NoteId::Uuid(_) => return Err(StoreError::NotFound("Note not found".into())),
        };

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.query_row("DELETE FROM notes WHERE id = ? RETURNING id", params![note_id], |row| {
                    row.get::<_, i64>(0)
                })?;
                tx.commit()?;
                Ok(())
            })
            .await?;

        Ok(())
    }
}
