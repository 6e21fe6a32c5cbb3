mod harness;

use harness::config::ConfigBuilder;
use harness::mock::{MockIdentity, TOKEN_ALICE};
use harness::server::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn sync_profile_creates_then_refreshes() {
    let identity = MockIdentity::start().await.unwrap();
    let config = ConfigBuilder::new().with_auth(&identity.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/api/user/sync-profile"))
        .bearer_auth(TOKEN_ALICE)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "profile created");
    assert_eq!(body["data"]["uid"], "alice");
    assert_eq!(body["data"]["displayName"], "Alice");
    assert_eq!(body["data"]["settings"], json!({}));

    let resp = server
        .client()
        .post(server.url("/api/user/sync-profile"))
        .bearer_auth(TOKEN_ALICE)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "profile synced");
}

#[tokio::test]
async fn profile_is_404_until_synced() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/api/user/profile")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "profile not found");
}

#[tokio::test]
async fn profile_patch_updates_display_fields() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    server
        .client()
        .post(server.url("/api/user/sync-profile"))
        .send()
        .await
        .unwrap();

    let resp = server
        .client()
        .patch(server.url("/api/user/profile"))
        .json(&json!({
            "displayName": "New Name",
            "photoURL": "https://example.com/avatar.png"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "profile updated");
    assert_eq!(body["data"]["displayName"], "New Name");

    let resp = server.client().get(server.url("/api/user/profile")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["displayName"], "New Name");
    assert_eq!(body["data"]["photoURL"], "https://example.com/avatar.png");
}

#[tokio::test]
async fn malformed_photo_url_is_rejected() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .patch(server.url("/api/user/profile"))
        .json(&json!({ "photoURL": "not a url" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["error"]["details"]
            .as_str()
            .unwrap()
            .contains("photoURL: must be a valid URL")
    );
}

// -- Settings --

#[tokio::test]
async fn settings_default_to_empty_and_replace_on_put() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/api/settings")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], json!({}));

    let resp = server
        .client()
        .put(server.url("/api/settings"))
        .json(&json!({
            "theme": "dark",
            "sensitivityLevel": 3,
            "notifications": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "settings updated");

    let resp = server.client().get(server.url("/api/settings")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["theme"], "dark");
    assert_eq!(body["data"]["sensitivityLevel"], 3);
    assert_eq!(body["data"]["notifications"], true);

    // PUT replaces the whole subdocument, so omitted keys disappear.
    let resp = server
        .client()
        .put(server.url("/api/settings"))
        .json(&json!({ "theme": "light" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = server.client().get(server.url("/api/settings")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], json!({ "theme": "light" }));
}

#[tokio::test]
async fn out_of_range_sensitivity_is_rejected() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .put(server.url("/api/settings"))
        .json(&json!({ "sensitivityLevel": 0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// -- Export and deletion --

fn session_body() -> Value {
    json!({
        "consent": { "personA": true, "personB": true },
        "settings": {
            "storageMode": "transcriptOnly",
            "voiceId": "neutral",
            "analysisDepth": "standard",
            "culturalContextTags": [],
            "sensitivityLevel": 50
        }
    })
}

#[tokio::test]
async fn export_bundles_profile_sessions_and_transcripts() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    server
        .client()
        .post(server.url("/api/user/sync-profile"))
        .send()
        .await
        .unwrap();
    let resp = server
        .client()
        .post(server.url("/api/sessions"))
        .json(&session_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let session_id = created["data"]["id"].as_str().unwrap().to_owned();

    let resp = server.client().post(server.url("/api/user/export")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    assert_eq!(
        resp.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"culturelens-export-local.json\""
    );
    let export: Value = resp.json().await.unwrap();
    assert!(export["exportedAt"].is_string());
    assert_eq!(export["profile"]["uid"], "local");
    assert_eq!(export["sessions"][0]["id"], session_id.as_str());
    assert_eq!(export["transcripts"], json!([]));
}

#[tokio::test]
async fn account_deletion_removes_everything() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    server
        .client()
        .post(server.url("/api/user/sync-profile"))
        .send()
        .await
        .unwrap();
    let resp = server
        .client()
        .post(server.url("/api/sessions"))
        .json(&session_body())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let session_id = created["data"]["id"].as_str().unwrap().to_owned();

    let resp = server.client().post(server.url("/api/user/delete")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "account data deleted");
    assert_eq!(body["data"]["deletedSessions"], 1);

    let resp = server.client().get(server.url("/api/user/profile")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = server
        .client()
        .get(server.url(&format!("/api/sessions/{session_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
