//! AnkiConnect client against a mock endpoint

use lexicard_core::{DeckClient, DeckError, NewNote};
use lexicard_deck::AnkiConnectClient;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

async fn respond_to(server: &MockServer, action: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "action": action, "version": 6 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ============================================================================
// TEST: Actions
// ============================================================================

#[tokio::test]
async fn test_version_reports_protocol() {
    let server = MockServer::start().await;
    respond_to(&server, "version", json!({ "result": 6, "error": null })).await;

    let client = AnkiConnectClient::new(server.uri());
    assert_eq!(client.version().await.unwrap(), 6);
}

#[tokio::test]
async fn test_ensure_deck_sends_deck_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "createDeck",
            "params": { "deck": "Vocabulary::Book.epub" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": 1519323742721u64,
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    client.ensure_deck("Vocabulary::Book.epub").await.unwrap();
}

#[tokio::test]
async fn test_find_notes_and_notes_info() {
    let server = MockServer::start().await;
    respond_to(&server, "findNotes", json!({ "result": [11, 12], "error": null })).await;
    respond_to(
        &server,
        "notesInfo",
        json!({
            "result": [
                {
                    "noteId": 11,
                    "modelName": "Lexicard",
                    "tags": ["lexicard"],
                    "fields": { "Word": { "value": "swoon", "order": 0 } },
                    "mod": 100,
                    "cards": [1]
                },
                {}
            ],
            "error": null
        }),
    )
    .await;

    let client = AnkiConnectClient::new(server.uri());
    let ids = client.find_notes(r#""Word:swoon""#).await.unwrap();
    assert_eq!(ids, vec![11, 12]);

    let notes = client.notes_info(&ids).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].note_id, 11);
    assert_eq!(notes[0].field("Word"), "swoon");
    assert_eq!(notes[0].modified, 100);
}

#[tokio::test]
async fn test_add_note_disallows_duplicates_in_deck() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "addNote",
            "params": { "note": {
                "deckName": "Vocabulary::Book.epub",
                "modelName": "Lexicard",
                "fields": { "Word": "swoon" },
                "tags": ["lexicard"],
                "options": { "allowDuplicate": false, "duplicateScope": "deck" }
            }}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": 1496198395707u64,
            "error": null
        })))
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    let note = NewNote {
        deck_name: "Vocabulary::Book.epub".to_string(),
        model_name: "Lexicard".to_string(),
        fields: BTreeMap::from([("Word".to_string(), "swoon".to_string())]),
        tags: BTreeSet::from(["lexicard".to_string()]),
    };
    assert_eq!(client.add_note(&note).await.unwrap(), 1496198395707);
}

#[tokio::test]
async fn test_update_calls_accept_null_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "updateNoteFields",
            "params": { "note": { "id": 11, "fields": { "Answer": "faint" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null, "error": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "updateNoteTags",
            "params": { "note": 11, "tags": ["Book.epub", "lexicard"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null, "error": null })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    let fields = BTreeMap::from([("Answer".to_string(), "faint".to_string())]);
    client.update_note_fields(11, &fields).await.unwrap();

    let tags = BTreeSet::from(["lexicard".to_string(), "Book.epub".to_string()]);
    client.update_note_tags(11, &tags).await.unwrap();
}

// ============================================================================
// TEST: Errors
// ============================================================================

#[tokio::test]
async fn test_error_field_becomes_api_error() {
    let server = MockServer::start().await;
    respond_to(
        &server,
        "addNote",
        json!({ "result": null, "error": "cannot create note because it is a duplicate" }),
    )
    .await;

    let client = AnkiConnectClient::new(server.uri());
    let note = NewNote {
        deck_name: "D".to_string(),
        model_name: "Lexicard".to_string(),
        fields: BTreeMap::new(),
        tags: BTreeSet::new(),
    };
    let err = client.add_note(&note).await.unwrap_err();
    match err {
        DeckError::Api(message) => assert!(message.contains("duplicate")),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    assert!(matches!(client.sync().await, Err(DeckError::Transport(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let client = AnkiConnectClient::new("http://127.0.0.1:9");
    assert!(matches!(
        client.find_notes("deck:x").await,
        Err(DeckError::Transport(_))
    ));
}

#[tokio::test]
async fn test_slow_response_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 6, "error": null }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri()).with_timeout(Duration::from_millis(100));
    assert!(matches!(client.version().await, Err(DeckError::Transport(_))));
}
