mod harness;

use harness::config::ConfigBuilder;
use harness::mock::{MockIdentity, TOKEN_ALICE, TOKEN_BOB};
use harness::server::TestServer;
use serde_json::{Value, json};

fn create_body() -> Value {
    json!({
        "consent": { "personA": true, "personB": true },
        "settings": {
            "storageMode": "transcriptOnly",
            "voiceId": "neutral",
            "analysisDepth": "standard",
            "culturalContextTags": ["workplace"],
            "sensitivityLevel": 50
        }
    })
}

async fn create_session(server: &TestServer) -> String {
    let resp = server
        .client()
        .post(server.url("/api/sessions"))
        .json(&create_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn withheld_consent_is_a_validation_error() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let mut body = create_body();
    body["consent"]["personA"] = json!(false);

    let resp = server
        .client()
        .post(server.url("/api/sessions"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(
        body["error"]["details"]
            .as_str()
            .unwrap()
            .contains("consent.personA: both parties must consent to recording")
    );
}

#[tokio::test]
async fn session_lifecycle_create_update_delete() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    // Create
    let resp = server
        .client()
        .post(server.url("/api/sessions"))
        .json(&create_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "recording");
    assert_eq!(body["data"]["isFavorite"], false);
    let id = body["data"]["id"].as_str().unwrap().to_owned();

    // List
    let resp = server.client().get(server.url("/api/sessions")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["id"], id.as_str());

    // Patch duration and status
    let resp = server
        .client()
        .patch(server.url(&format!("/api/sessions/{id}")))
        .json(&json!({ "duration": 42.5, "status": "failed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["duration"], 42.5);
    assert_eq!(body["data"]["status"], "failed");

    // Status filter
    let resp = server
        .client()
        .get(server.url("/api/sessions?status=recording"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["meta"]["count"], 0);

    // Favorite toggles on and off
    for expected in [true, false] {
        let resp = server
            .client()
            .patch(server.url(&format!("/api/sessions/{id}/favorite")))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["isFavorite"], expected);
    }

    // Delete, then fetch is a 404 with lookup details
    let resp = server
        .client()
        .delete(server.url(&format!("/api/sessions/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = server
        .client()
        .get(server.url(&format!("/api/sessions/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "session not found");
    assert_eq!(
        body["error"]["details"].as_str().unwrap(),
        format!("session with id {id}")
    );
}

#[tokio::test]
async fn unknown_status_in_patch_is_rejected() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();
    let id = create_session(&server).await;

    let resp = server
        .client()
        .patch(server.url(&format!("/api/sessions/{id}")))
        .json(&json!({ "status": "archived" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn sessions_are_scoped_to_their_owner() {
    let identity = MockIdentity::start().await.unwrap();
    let config = ConfigBuilder::new().with_auth(&identity.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/api/sessions"))
        .bearer_auth(TOKEN_ALICE)
        .json(&create_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_owned();

    // Bob cannot read Alice's session
    let resp = server
        .client()
        .get(server.url(&format!("/api/sessions/{id}")))
        .bearer_auth(TOKEN_BOB)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["message"], "not authorized to access this session");

    // Bob's listing does not include it either
    let resp = server
        .client()
        .get(server.url("/api/sessions"))
        .bearer_auth(TOKEN_BOB)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["meta"]["count"], 0);
}

// -- Audio upload and serving --

#[tokio::test]
async fn uploaded_audio_round_trips_through_the_audio_route() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();
    let id = create_session(&server).await;

    let payload: Vec<u8> = b"RIFF\x00\x01\x02\x03fake-wav".to_vec();
    let resp = server
        .client()
        .post(server.url(&format!("/api/sessions/{id}/upload")))
        .header("content-type", "audio/wav")
        .body(payload.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "processing");
    let audio_id = body["data"]["audioId"].as_str().unwrap().to_owned();

    let resp = server
        .client()
        .get(server.url(&format!("/api/audio/{audio_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("content-type").unwrap(), "audio/wav");
    assert_eq!(resp.headers().get("cache-control").unwrap(), "public, max-age=86400");
    assert_eq!(resp.headers().get("accept-ranges").unwrap(), "bytes");
    let served = resp.bytes().await.unwrap();
    assert_eq!(served.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn second_upload_conflicts_once_processing() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();
    let id = create_session(&server).await;

    for expected in [200, 409] {
        let resp = server
            .client()
            .post(server.url(&format!("/api/sessions/{id}/upload")))
            .header("content-type", "audio/wav")
            .body(vec![1u8, 2, 3])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), expected);
    }
}

#[tokio::test]
async fn oversize_upload_fails_without_storing_anything() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();
    let id = create_session(&server).await;

    // 700,000 raw bytes encode past the 900,000-character ceiling.
    let resp = server
        .client()
        .post(server.url(&format!("/api/sessions/{id}/upload")))
        .header("content-type", "audio/wav")
        .body(vec![0u8; 700_000])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("audio file too large"));

    // The session is untouched.
    let resp = server
        .client()
        .get(server.url(&format!("/api/sessions/{id}")))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "recording");
    assert!(body["data"].get("audioId").is_none());
}

#[tokio::test]
async fn non_audio_upload_is_rejected() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();
    let id = create_session(&server).await;

    let resp = server
        .client()
        .post(server.url(&format!("/api/sessions/{id}/upload")))
        .header("content-type", "text/plain")
        .body("not audio")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"]["details"].as_str().unwrap(),
        "expected an audio/* content type"
    );
}

#[tokio::test]
async fn missing_audio_is_an_enveloped_404() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/api/audio/audio_00000000000000_missing0"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "audio file not found");
}
