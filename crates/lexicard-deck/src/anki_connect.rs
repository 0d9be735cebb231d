//! AnkiConnect client
//!
//! Every call is `POST {endpoint}` with `{"action", "version": 6, "params"}`
//! and answers `{"result", "error"}`.

use async_trait::async_trait;
use lexicard_core::{DeckClient, DeckError, DeckResult, NewNote, NoteId, RemoteNote};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::debug;

/// AnkiConnect protocol version this client speaks
pub const API_VERSION: u32 = 6;

/// Default AnkiConnect address
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8765";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Field {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteInfo {
    note_id: NoteId,
    #[serde(default)]
    model_name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    fields: BTreeMap<String, Field>,
    #[serde(rename = "mod", default)]
    modified: i64,
}

impl From<NoteInfo> for RemoteNote {
    fn from(info: NoteInfo) -> Self {
        Self {
            note_id: info.note_id,
            model_name: info.model_name,
            fields: info
                .fields
                .into_iter()
                .map(|(name, field)| (name, field.value))
                .collect(),
            tags: info.tags,
            modified: info.modified,
        }
    }
}

/// [`DeckClient`] speaking the AnkiConnect JSON protocol
#[derive(Debug, Clone)]
pub struct AnkiConnectClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl AnkiConnectClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Protocol version reported by AnkiConnect; doubles as a health check
    pub async fn version(&self) -> DeckResult<u32> {
        self.request("version", None).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<Value>,
    ) -> DeckResult<Option<T>> {
        let mut body = json!({ "action": action, "version": API_VERSION });
        if let Some(params) = params {
            body["params"] = params;
        }

        debug!(action, "AnkiConnect request");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| DeckError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DeckError::Transport(format!("{action}: HTTP {status}: {text}")));
        }

        let api: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| DeckError::InvalidResponse(format!("{action}: {e}")))?;

        if let Some(error) = api.error {
            return Err(DeckError::Api(format!("{action}: {error}")));
        }
        Ok(api.result)
    }

    /// Call an action whose result must be present
    async fn request<T: DeserializeOwned>(&self, action: &str, params: Option<Value>) -> DeckResult<T> {
        self.send(action, params)
            .await?
            .ok_or_else(|| DeckError::InvalidResponse(format!("{action}: missing result")))
    }

    /// Call an action whose result is ignored (usually `null`)
    async fn request_unit(&self, action: &str, params: Option<Value>) -> DeckResult<()> {
        self.send::<Value>(action, params).await.map(|_| ())
    }
}

#[async_trait]
impl DeckClient for AnkiConnectClient {
    async fn ensure_deck(&self, deck_name: &str) -> DeckResult<()> {
        // createDeck returns the existing id when the deck is already there
        let _id: Value = self
            .request("createDeck", Some(json!({ "deck": deck_name })))
            .await?;
        Ok(())
    }

    async fn find_notes(&self, query: &str) -> DeckResult<Vec<NoteId>> {
        let ids: Option<Vec<NoteId>> = self
            .send("findNotes", Some(json!({ "query": query })))
            .await?;
        Ok(ids.unwrap_or_default())
    }

    async fn notes_info(&self, note_ids: &[NoteId]) -> DeckResult<Vec<RemoteNote>> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }
        // Deleted ids come back as empty objects
        let infos: Vec<Value> = self
            .request("notesInfo", Some(json!({ "notes": note_ids })))
            .await?;
        Ok(infos
            .into_iter()
            .filter_map(|info| serde_json::from_value::<NoteInfo>(info).ok())
            .map(RemoteNote::from)
            .collect())
    }

    async fn add_note(&self, note: &NewNote) -> DeckResult<NoteId> {
        let params = json!({
            "note": {
                "deckName": note.deck_name,
                "modelName": note.model_name,
                "fields": note.fields,
                "tags": note.tags,
                "options": {
                    "allowDuplicate": false,
                    "duplicateScope": "deck",
                },
            }
        });
        self.request("addNote", Some(params)).await
    }

    async fn update_note_fields(
        &self,
        note_id: NoteId,
        fields: &BTreeMap<String, String>,
    ) -> DeckResult<()> {
        let params = json!({ "note": { "id": note_id, "fields": fields } });
        self.request_unit("updateNoteFields", Some(params)).await
    }

    async fn update_note_tags(&self, note_id: NoteId, tags: &BTreeSet<String>) -> DeckResult<()> {
        let params = json!({ "note": note_id, "tags": tags });
        self.request_unit("updateNoteTags", Some(params)).await
    }

    async fn sync(&self) -> DeckResult<()> {
        self.request_unit("sync", None).await
    }
}
