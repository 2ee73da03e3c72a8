//! Typed HTTP client for the notes service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Note, NoteId, NoteStore, StoreError};

/// Note backend reached over the network.
///
/// One round trip per operation, no caching, no retry. Validation and
/// existence checks happen in the remote collection and come back
/// through the status channel. Connection failures, timeouts and
/// undecodable bodies surface as [`StoreError::Transport`].
pub struct RemoteNoteStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct NoteBody<'a> {
    title: &'a str,
    content: &'a str,
}

impl RemoteNoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn notes_url(&self) -> String {
        format!("{}/api/notes", self.base_url)
    }

    fn note_url(&self, id: &NoteId) -> String {
        format!("{}/api/notes/{}", self.base_url, id)
    }

    async fn error_for(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());

        match status {
            StatusCode::BAD_REQUEST => StoreError::Validation(message),
            StatusCode::NOT_FOUND => StoreError::NotFound(message),
            _ => StoreError::Transport(format!("unexpected status {status}: {message}")),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

#[async_trait]
impl NoteStore for RemoteNoteStore {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let response = self.client.get(self.notes_url()).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(response.json().await?)
    }

    async fn create(&self, title: &str, content: &str) -> Result<Note, StoreError> {
        let response = self
            .client
            .post(self.notes_url())
            .json(&NoteBody { title, content })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(response.json().await?)
    }

    async fn update(&self, id: &NoteId, title: &str, content: &str) -> Result<Note, StoreError> {
        let response = self
            .client
            .put(self.note_url(id))
            .json(&NoteBody { title, content })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(response.json().await?)
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        let response = self.client.delete(self.note_url(id)).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(())
    }
}
