use std::time::Duration;

use quicknotes::{
    app,
    db::init_test_db,
    store::{LocalNoteStore, Note, NoteStore, RemoteNoteStore, StoreError},
};
use tokio::{net::TcpListener, time::sleep};

async fn serve_notes() -> String {
    let db = init_test_db().await.unwrap();
    let app = app::create(db);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn titles(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|n| n.title.as_str()).collect()
}

/// Both backends must walk through the same create/list/update/delete
/// story with identical observable behavior.
async fn crud_scenario(store: &dyn NoteStore) {
    let groceries = store.create("Groceries", "milk, eggs").await.unwrap();
    assert_eq!(groceries.created_at, groceries.updated_at);
    sleep(Duration::from_millis(5)).await;

    let todo = store.create("Todo", "finish report").await.unwrap();
    assert_ne!(todo.id, groceries.id);

    let notes = store.list().await.unwrap();
    assert_eq!(titles(&notes), ["Todo", "Groceries"]);

    sleep(Duration::from_millis(5)).await;
    let updated = store.update(&groceries.id, "Groceries v2", "milk, eggs, flour").await.unwrap();
    assert_eq!(updated.id, groceries.id);
    assert_eq!(updated.created_at, groceries.created_at);
    assert!(updated.updated_at > groceries.updated_at);
    assert_eq!(updated.title, "Groceries v2");

    let notes = store.list().await.unwrap();
    assert_eq!(titles(&notes), ["Groceries v2", "Todo"]);

    store.delete(&todo.id).await.unwrap();
    let notes = store.list().await.unwrap();
    assert_eq!(titles(&notes), ["Groceries v2"]);

    let err = store.update(&todo.id, "Todo", "again").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    let err = store.delete(&todo.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

async fn rejects_invalid_input(store: &dyn NoteStore) {
    for (title, content) in [("", "x"), ("x", ""), ("   ", "   ")] {
        let err = store.create(title, content).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "{title:?}/{content:?}: {err:?}");
    }

    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn local_store_scenario() {
    let store = LocalNoteStore::open_in_memory().await.unwrap();
    crud_scenario(&store).await;
}

#[tokio::test]
async fn local_store_rejects_invalid_input() {
    let store = LocalNoteStore::open_in_memory().await.unwrap();
    rejects_invalid_input(&store).await;
}

#[tokio::test]
async fn remote_store_scenario() {
    let store = RemoteNoteStore::new(serve_notes().await);
    crud_scenario(&store).await;
}

#[tokio::test]
async fn remote_store_rejects_invalid_input() {
    let store = RemoteNoteStore::new(serve_notes().await);
    rejects_invalid_input(&store).await;
}

#[tokio::test]
async fn remote_store_reports_service_messages() {
    let store = RemoteNoteStore::new(serve_notes().await);

    match store.create("", "x").await.unwrap_err() {
        StoreError::Validation(message) => assert_eq!(message, "title must not be empty"),
        err => panic!("expected validation error, got {err:?}"),
    }
}

#[tokio::test]
async fn remote_store_surfaces_connection_failures() {
    // nothing listens here
    let store = RemoteNoteStore::new("http://127.0.0.1:9");
    let err = store.list().await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}
