use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::{
    db::{self, DB},
    errors::{Error, Result},
    store::{validate, Note, NoteId},
};

use super::{CreateNote, UpdateNote};

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: NoteId::Uuid(row.get(0)?),
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub async fn find_notes(db: DB) -> Result<Vec<Note>> {
    db.call(|conn| {
        let notes = conn
            .prepare(
                "SELECT id, title, content, created_at, updated_at FROM notes
                 ORDER BY updated_at DESC, id ASC",
            )?
            .query_map([], |row| note_from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notes)
    })
    .await
    .map_err(Error::from)
}

pub async fn create_note(db: DB, CreateNote { title, content }: CreateNote) -> Result<Note> {
    validate(&title, &content).map_err(Error::Validation)?;

    db.call(move |conn| {
        let now = Utc::now();
        conn.query_row(
            r#"INSERT INTO notes (title, content, created_at, updated_at) VALUES (?, ?, ?, ?)
            RETURNING id, title, content, created_at, updated_at"#,
            params![title, content, now, now],
            |row| note_from_row(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(Error::from)
}

pub async fn update_note(db: DB, note_id: Uuid, UpdateNote { title, content }: UpdateNote) -> Result<Note> {
    db.call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE id = ?)",
            params![note_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::NotFound("Note not found".into()).into());
        }

        validate(&title, &content).map_err(|message| tokio_rusqlite::Error::from(Error::Validation(message)))?;

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
    .await
    .map_err(Error::from)
}

pub async fn delete_note(db: DB, note_id: Uuid) -> Result<()> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        tx.query_row("DELETE FROM notes WHERE id = ? RETURNING id", params![note_id], |row| {
            row.get::<_, Uuid>(0)
        })?;
        tx.commit()?;
        Ok(())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| db::Error::not_found_message(e, "Note not found"))
    .map_err(Error::from)
}
