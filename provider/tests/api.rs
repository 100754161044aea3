use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use pact_provider::app;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn bare_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- get ---

#[tokio::test]
async fn get_unknown_user_returns_404() {
    let app = app();
    let resp = app.oneshot(bare_request("GET", "/users/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn get_user_invalid_id_returns_400() {
    let app = app();
    let resp = app.oneshot(bare_request("GET", "/users/abc")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Invalid user ID");
}

#[tokio::test]
async fn get_user_empty_id_returns_400() {
    let app = app();
    let resp = app.oneshot(bare_request("GET", "/users/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201_with_generated_id() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/users", r#"{"name":"Alice"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = body_json(resp).await;
    assert_eq!(body["id"], 1000);
    assert_eq!(body["name"], "Alice");
    assert!(!body["created_on"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_user_missing_body_returns_400() {
    let app = app();
    let resp = app.oneshot(bare_request("POST", "/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Missing request body");
}

#[tokio::test]
async fn create_user_invalid_json_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/users", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Invalid JSON");
}

#[tokio::test]
async fn create_user_missing_name_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/users", r#"{"title":"Alice"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Missing or invalid name field");
}

#[tokio::test]
async fn create_user_empty_name_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/users", r#"{"name":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_user_non_string_name_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/users", r#"{"name":42}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_unknown_user_returns_404() {
    let app = app();
    let resp = app
        .oneshot(bare_request("DELETE", "/users/999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn delete_user_invalid_id_returns_400() {
    let app = app();
    let resp = app
        .oneshot(bare_request("DELETE", "/users/abc"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- routing ---

#[tokio::test]
async fn unknown_method_returns_404() {
    let app = app();
    let resp = app
        .oneshot(bare_request("PATCH", "/users/42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Not found");
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let app = app();
    let resp = app.oneshot(bare_request("GET", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Not found");
}

// --- provider state ---

#[tokio::test]
async fn state_change_missing_body_returns_400() {
    let app = app();
    let resp = app
        .oneshot(bare_request("POST", "/__pact/provider-state"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Missing request body");
}

#[tokio::test]
async fn state_change_invalid_json_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/__pact/provider-state", "]["))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Invalid JSON");
}

#[tokio::test]
async fn state_change_missing_action_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/__pact/provider-state",
            r#"{"state":"the user exists"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Missing or invalid action field");
}

#[tokio::test]
async fn state_change_non_string_action_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/__pact/provider-state",
            r#"{"state":"the user exists","action":42}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Missing or invalid action field");
}

#[tokio::test]
async fn state_change_unknown_action_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/__pact/provider-state",
            r#"{"action":"frobnicate"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Unknown action");
}

#[tokio::test]
async fn state_change_empty_state_succeeds_without_setup() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/__pact/provider-state",
            r#"{"state":"","action":"setup"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"], "success");
}

#[tokio::test]
async fn state_change_unknown_state_name_succeeds() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/__pact/provider-state",
            r#"{"state":"the planets are aligned","action":"setup"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"], "success");
}

// --- full interaction flows ---

#[tokio::test]
async fn create_then_get_round_trips() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/users", r#"{"name":"Alice"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["id"], 1000);
    assert_eq!(created["name"], "Alice");
    let created_on = created["created_on"].as_str().unwrap().to_string();
    assert!(!created_on.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(bare_request("GET", "/users/1000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["id"], 1000);
    assert_eq!(fetched["name"], "Alice");
    assert_eq!(fetched["created_on"], created_on.as_str());
}

#[tokio::test]
async fn ids_step_with_store_length() {
    use tower::Service;

    let mut app = app().into_service();

    for expected_id in [1000, 1001, 1002] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/users", r#"{"name":"n"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["id"], expected_id);
    }
}

#[tokio::test]
async fn state_setup_then_delete_then_delete_again() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/__pact/provider-state",
            r#"{"state":"the user exists","params":{"id":124,"name":"Bob"},"action":"setup"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(bare_request("DELETE", "/users/124"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(bare_request("DELETE", "/users/124"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn teardown_clears_the_store_and_is_idempotent() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/__pact/provider-state",
            r#"{"state":"the user exists","params":{"id":7,"name":"Eve"},"action":"setup"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    for _ in 0..2 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                "/__pact/provider-state",
                r#"{"state":"the user exists","action":"teardown"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["result"], "success");
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(bare_request("GET", "/users/7"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_fails_with_500_when_store_is_full() {
    use tower::Service;

    let mut app = app().into_service();

    for _ in 0..100 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/users", r#"{"name":"filler"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/users", r#"{"name":"overflow"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Failed to create user");
}
