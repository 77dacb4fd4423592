//! End-to-end HTTP tests against a server backed by the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use repetask::api::{AppState, Server};
use repetask::engine::Schedule;
use repetask::model::repetition::{NewRepetitionType, RepetitionTypeId};
use repetask::store::MemoryStore;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

const PASSWORD: &str = "correct horse";

struct Harness {
    server: Server,
    store: Arc<MemoryStore>,
    client: Client,
}

impl Harness {
    async fn start() -> Self {
        let schedule = Schedule::from_definitions([
            NewRepetitionType::new("tomorrow", 1, 1),
            NewRepetitionType::new("next week", 2, 7),
        ])
        .unwrap();
        let store = Arc::new(MemoryStore::with_schedule(schedule));
        let state = AppState::new(Arc::clone(&store));
        let server = Server::start(state, "127.0.0.1:0", Duration::from_secs(5))
            .await
            .unwrap();
        Self {
            server,
            store,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.server.addr())
    }

    fn api(&self, path: &str) -> String {
        self.url(&format!("/api/v1{path}"))
    }

    async fn register(&self, email: &str) -> Value {
        let resp = self
            .client
            .post(self.api("/auth/register"))
            .json(&json!({
                "email": email,
                "name": "Grace",
                "surname": "Hopper",
                "password": PASSWORD,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }

    async fn create_task(&self, email: &str, title: &str) -> Value {
        let resp = self
            .client
            .post(self.api("/tasks"))
            .basic_auth(email, Some(PASSWORD))
            .json(&json!({ "title": title, "tags": ["rust"] }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }
}

#[tokio::test]
async fn health_is_public() {
    let h = Harness::start().await;
    let resp = h.client.get(h.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "ok");
}

#[tokio::test]
async fn register_then_login() {
    let h = Harness::start().await;
    let user = h.register("grace@example.com").await;
    assert_eq!(user["email"], "grace@example.com");
    assert!(user.get("password_hash").is_none());

    let resp = h
        .client
        .post(h.api("/auth/login"))
        .json(&json!({ "email": "GRACE@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.json::<bool>().await.unwrap());

    let resp = h
        .client
        .post(h.api("/auth/login"))
        .json(&json!({ "email": "grace@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_and_incomplete_registrations_are_rejected() {
    let h = Harness::start().await;
    h.register("dup@example.com").await;

    let resp = h
        .client
        .post(h.api("/auth/register"))
        .json(&json!({
            "email": "Dup@Example.com",
            "name": "Other",
            "surname": "Person",
            "password": "pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = h
        .client
        .post(h.api("/auth/register"))
        .json(&json!({ "email": "partial@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_routes_require_credentials() {
    let h = Harness::start().await;
    h.register("ada@example.com").await;

    let resp = h.client.get(h.api("/tasks")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = h
        .client
        .get(h.api("/tasks"))
        .basic_auth("ada@example.com", Some("nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = h
        .client
        .get(h.api("/repetitiontypes"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn task_crud() {
    let h = Harness::start().await;
    let email = "crud@example.com";
    h.register(email).await;

    let task = h.create_task(email, "read the book").await;
    let id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["title"], "read the book");
    assert!(task["repetition_type"].is_null());

    let resp = h
        .client
        .post(h.api("/tasks"))
        .basic_auth(email, Some(PASSWORD))
        .json(&json!({ "summary": "no title" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("title"));

    let resp = h
        .client
        .put(h.api(&format!("/tasks/{id}")))
        .basic_auth(email, Some(PASSWORD))
        .json(&json!({ "title": "read the book again", "link": "https://doc.rust-lang.org/book/" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "read the book again");
    assert_eq!(updated["id"], task["id"]);

    let listed: Vec<Value> = h
        .client
        .get(h.api("/tasks"))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let resp = h
        .client
        .delete(h.api(&format!("/tasks/{id}")))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = h
        .client
        .get(h.api(&format!("/tasks/{id}")))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = h
        .client
        .get(h.api("/tasks/not-a-uuid"))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completing_walks_the_catalog() {
    let h = Harness::start().await;
    let email = "walk@example.com";
    h.register(email).await;
    let task = h.create_task(email, "spaced").await;
    let id = task["id"].as_str().unwrap();

    let stages: Vec<Value> = h
        .client
        .get(h.api("/repetitiontypes"))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let orders: Vec<i64> = stages.iter().map(|s| s["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, [1, 2]);

    let complete = || {
        h.client
            .put(h.api(&format!("/tasks/{id}/complete")))
            .basic_auth(email, Some(PASSWORD))
            .send()
    };

    let body: Value = complete().await.unwrap().json().await.unwrap();
    assert_eq!(body["message"], "Successful");
    assert_eq!(body["task"]["repetition_type"], stages[0]["id"]);

    let body: Value = complete().await.unwrap().json().await.unwrap();
    assert_eq!(body["task"]["repetition_type"], stages[1]["id"]);

    let resp = complete().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Task is completed successfully.");
    assert!(!body["task"]["completed_at"].is_null());

    let resp = complete().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tasks_and_notes_are_scoped_to_their_owner() {
    let h = Harness::start().await;
    h.register("owner@example.com").await;
    h.register("other@example.com").await;
    let task = h.create_task("owner@example.com", "private").await;
    let id = task["id"].as_str().unwrap();

    let resp = h
        .client
        .post(h.api(&format!("/tasks/{id}/notes")))
        .basic_auth("owner@example.com", Some(PASSWORD))
        .json(&json!({ "text": "chapter 4 is dense", "important": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let note: Value = resp.json().await.unwrap();
    assert_eq!(note["important"], true);
    let note_id = note["id"].as_str().unwrap();

    for path in [format!("/tasks/{id}"), format!("/tasks/{id}/notes")] {
        let resp = h
            .client
            .get(h.api(&path))
            .basic_auth("other@example.com", Some(PASSWORD))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }

    let resp = h
        .client
        .post(h.api(&format!("/tasks/{id}/notes")))
        .basic_auth("other@example.com", Some(PASSWORD))
        .json(&json!({ "text": "sneaky" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = h
        .client
        .delete(h.api(&format!("/notes/{note_id}")))
        .basic_auth("other@example.com", Some(PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let notes: Vec<Value> = h
        .client
        .get(h.api(&format!("/tasks/{id}/notes")))
        .basic_auth("owner@example.com", Some(PASSWORD))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);

    let resp = h
        .client
        .delete(h.api(&format!("/notes/{note_id}")))
        .basic_auth("owner@example.com", Some(PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let h = Harness::start().await;
    h.register("json@example.com").await;
    let resp = h
        .client
        .post(h.api("/tasks"))
        .basic_auth("json@example.com", Some(PASSWORD))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let h = Harness::start().await;
    let resp = h
        .client
        .request(reqwest::Method::OPTIONS, h.api("/tasks"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(
        resp.headers()["access-control-allow-methods"]
            .to_str()
            .unwrap()
            .contains("DELETE")
    );
}

#[tokio::test]
async fn completing_past_a_removed_stage_is_a_hidden_server_error() {
    let h = Harness::start().await;
    let email = "broken@example.com";
    h.register(email).await;
    let task = h.create_task(email, "dangling").await;
    let id = task["id"].as_str().unwrap();

    let resp = h
        .client
        .put(h.api(&format!("/tasks/{id}/complete")))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let advanced: Value = resp.json().await.unwrap();
    let stage = advanced["task"]["repetition_type"].as_str().unwrap();

    h.store
        .remove_stage(RepetitionTypeId::parse(stage).unwrap())
        .unwrap();

    let resp = h
        .client
        .put(h.api(&format!("/tasks/{id}/complete")))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "message": "server error" }));

    let stored: Value = h
        .client
        .get(h.api(&format!("/tasks/{id}")))
        .basic_auth(email, Some(PASSWORD))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored, advanced["task"]);
}
