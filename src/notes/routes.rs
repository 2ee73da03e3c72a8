use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::{db::DB, errors::Result, state::AppState, store::Note};

use super::{handlers, CreateNote, DeleteNoteResponse, UpdateNote};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/notes", get(find_notes).post(create_note))
        .route("/api/notes/{note_id}", put(update_note).delete(delete_note))
        .with_state(state)
}

async fn find_notes(State(db): State<DB>) -> Result<Json<Vec<Note>>> {
    handlers::find_notes(db).await.map(Json)
}

async fn create_note(State(db): State<DB>, Json(args): Json<CreateNote>) -> Result<(StatusCode, Json<Note>)> {
    handlers::create_note(db, args).await.map(|note| (StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(db): State<DB>,
    Path(note_id): Path<Uuid>,
    Json(args): Json<UpdateNote>,
) -> Result<Json<Note>> {
    handlers::update_note(db, note_id, args).await.map(Json)
}

async fn delete_note(State(db): State<DB>, Path(note_id): Path<Uuid>) -> Result<Json<DeleteNoteResponse>> {
    handlers::delete_note(db, note_id).await.map(|_| {
        Json(DeleteNoteResponse {
            message: "Note deleted".into(),
        })
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum_test::TestServer;
    use serde_json::json;
    use tokio::time::sleep;

    use crate::{
        app,
        db::{init_test_db, DB},
        errors::Result,
        notes::DeleteNoteResponse,
        store::Note,
    };

    fn test_server(db: DB) -> TestServer {
        TestServer::new(app::create(db)).unwrap()
    }

    #[tokio::test]
    async fn create_note() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db);

        let response = server
            .post("/api/notes")
            .json(&json!({
                "title": "world",
                "content": "hello"
            }))
            .await;

        assert_eq!(response.status_code(), 201);
        let note = response.json::<Note>();
        assert_eq!(note.title, "world");
        assert_eq!(note.content, "hello");
        assert_eq!(note.created_at, note.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn create_note_rejects_blank_fields() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db.clone());

        for body in [
            json!({"title": "", "content": "x"}),
            json!({"title": "x", "content": ""}),
            json!({"title": "   ", "content": "   "}),
        ] {
            let response = server.post("/api/notes").json(&body).await;
            assert_eq!(response.status_code(), 400);
            assert!(response.json::<serde_json::Value>()["message"].is_string());
        }

        let count = db
            .call(|conn| {
                conn.query_row::<u32, _, _>("select count(*) from notes", [], |r| r.get(0))
                    .map_err(|e| e.into())
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn find_notes_most_recently_touched_first() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db);

        let mut ids = Vec::new();
        for (title, content) in [("A", "a"), ("B", "b"), ("C", "c")] {
            let response = server.post("/api/notes").json(&json!({"title": title, "content": content})).await;
            ids.push(response.json::<Note>().id);
            sleep(Duration::from_millis(5)).await;
        }

        server
            .put(&format!("/api/notes/{}", ids[1]))
            .json(&json!({"title": "B", "content": "b2"}))
            .await;

        let response = server.get("/api/notes").await;
        assert_eq!(response.status_code(), 200);

        let titles: Vec<String> = response.json::<Vec<Note>>().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, ["B", "C", "A"]);
        Ok(())
    }

    #[tokio::test]
    async fn update_note() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db);

        let created = server
            .post("/api/notes")
            .json(&json!({"title": "first", "content": "1"}))
            .await
            .json::<Note>();

        sleep(Duration::from_millis(5)).await;
        let response = server
            .put(&format!("/api/notes/{}", created.id))
            .json(&json!({"title": "first", "content": "2"}))
            .await;

        assert_eq!(response.status_code(), 200);
        let updated = response.json::<Note>();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.content, "2");
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_note() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db);

        let response = server
            .put("/api/notes/018f6138-5b4f-722d-97c5-29b927cedbd4")
            .json(&json!({"title": "first", "content": "1"}))
            .await;

        assert_eq!(response.status_code(), 404);
        assert_eq!(response.json::<serde_json::Value>()["message"], "Note not found");

        // a missing id wins over invalid input
        let response = server
            .put("/api/notes/018f6138-5b4f-722d-97c5-29b927cedbd4")
            .json(&json!({"title": "", "content": ""}))
            .await;

        assert_eq!(response.status_code(), 404);
        Ok(())
    }

    #[tokio::test]
    async fn delete_note() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db.clone());

        let created = server
            .post("/api/notes")
            .json(&json!({"title": "first", "content": "1"}))
            .await
            .json::<Note>();

        let response = server.delete(&format!("/api/notes/{}", created.id)).await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<DeleteNoteResponse>().message, "Note deleted");

        let count = db
            .call(|conn| {
                conn.query_row::<u32, _, _>("select count(*) from notes", [], |r| r.get(0))
                    .map_err(|e| e.into())
            })
            .await
            .unwrap();
        assert_eq!(count, 0);

        let response = server.delete(&format!("/api/notes/{}", created.id)).await;
        assert_eq!(response.status_code(), 404);
        Ok(())
    }
}
