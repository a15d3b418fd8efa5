//! HTTP-level tests for the people API.
//!
//! Requests are sent straight to the router with `tower::ServiceExt`, so the
//! full middleware stack runs without binding a socket.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ferry::models::{NewUser, Person};
use ferry::services::{api_token, auth, people};
use ferry::web::{self, AppState, API_PREFIX};
use ferry::{Config, Database};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

struct TestApp {
    app: Router,
    db: Database,
    token: String,
}

fn setup() -> TestApp {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db = Database::open_memory(&format!("api_test_{}_{}", std::process::id(), id)).unwrap();
    db.migrate().unwrap();

    let user_id = auth::create_user(
        &db,
        &NewUser {
            username: "ferryman",
            password: "Password123",
            ..Default::default()
        },
    )
    .unwrap();
    let token = api_token::create_token(&db, user_id).unwrap().token;

    let config = Config::from_toml("[database]\npath = \"unused.db\"\n").unwrap();
    let app = web::build_router(Arc::new(AppState::new(config, db.clone())));

    TestApp { app, db, token }
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("{}{}", API_PREFIX, path))
        .header(header::ACCEPT, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn person_url(id: Uuid) -> String {
    format!("/people/{}", id)
}

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_list_unauthenticated() {
        let t = setup();
        let (status, _) = send(&t.app, Method::GET, "/people/", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let t = setup();
        let (status, body) =
            send(&t.app, Method::GET, "/people/", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Unauthorized"}));
    }

    #[tokio::test]
    async fn test_inactive_token() {
        let t = setup();
        let tokens = api_token::list_tokens(&t.db, None).unwrap();
        api_token::set_token_active(&t.db, tokens[0].id, false).unwrap();

        let (status, _) = send(&t.app, Method::GET, "/people/", Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        let t = setup();
        let request = Request::builder()
            .uri(format!("{}/people/", API_PREFIX))
            .header(header::AUTHORIZATION, format!("Token {}", t.token))
            .body(Body::empty())
            .unwrap();
        let response = t.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_detail_unauthenticated() {
        let t = setup();
        let (status, _) = send(&t.app, Method::GET, &person_url(Uuid::nil()), None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_by_discord_unauthenticated() {
        let t = setup();
        let (status, _) = send(&t.app, Method::GET, "/people/by-discord/12", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_put_unauthenticated_before_validation() {
        let t = setup();
        let (status, _) = send(&t.app, Method::PUT, &person_url(Uuid::nil()), None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&t.app, Method::PUT, "/people/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let t = setup();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = t.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn test_no_results() {
        let t = setup();
        let (status, body) = send(&t.app, Method::GET, "/people/", Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"items": [], "count": 0}));
    }

    #[tokio::test]
    async fn test_lists_all_people() {
        let t = setup();
        let mut expected: Vec<String> = (0..10)
            .map(|i| {
                people::create_person(&t.db, &format!("person {}", i), None)
                    .unwrap()
                    .id
                    .to_string()
            })
            .collect();

        let (status, body) = send(&t.app, Method::GET, "/people/", Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 10);

        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 10);
        let mut actual: Vec<String> = items
            .iter()
            .map(|item| item["id"].as_str().unwrap().to_string())
            .collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_without_trailing_slash() {
        let t = setup();
        let (status, _) = send(&t.app, Method::GET, "/people", Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn test_get_404() {
        let t = setup();
        let (status, body) = send(
            &t.app,
            Method::GET,
            &person_url(Uuid::nil()),
            Some(t.token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Not Found"}));
    }

    #[tokio::test]
    async fn test_get() {
        let t = setup();
        let person = people::create_person(&t.db, "bees", Some(1234567)).unwrap();

        let (status, body) =
            send(&t.app, Method::GET, &person_url(person.id), Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], person.id.to_string());
        assert_eq!(body["display_name"], "bees");
        assert_eq!(body["discord_id"], 1234567);
    }

    #[tokio::test]
    async fn test_get_invalid_uuid() {
        let t = setup();
        let (status, body) =
            send(&t.app, Method::GET, "/people/bees", Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"], json!(["path", "person_id"]));
    }

    #[tokio::test]
    async fn test_by_discord_404() {
        let t = setup();
        let (status, _) =
            send(&t.app, Method::GET, "/people/by-discord/12", Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_by_discord() {
        let t = setup();
        let person = people::create_person(&t.db, "bees", Some(1234567)).unwrap();

        let (status, body) = send(
            &t.app,
            Method::GET,
            "/people/by-discord/1234567",
            Some(t.token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], person.id.to_string());
        assert_eq!(body["display_name"], "bees");
        assert_eq!(body["discord_id"], 1234567);
    }

    #[tokio::test]
    async fn test_by_discord_non_numeric() {
        let t = setup();
        let (status, body) = send(
            &t.app,
            Method::GET,
            "/people/by-discord/bees",
            Some(t.token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"], json!(["path", "discord_id"]));
    }
}

mod update {
    use super::*;

    fn bees(t: &TestApp) -> Person {
        people::create_person(&t.db, "bees", Some(1234567890)).unwrap()
    }

    async fn put_payload(t: &TestApp, person: &Person, payload: Value) -> (StatusCode, Value) {
        send(
            &t.app,
            Method::PUT,
            &person_url(person.id),
            Some(t.token.as_str()),
            Some(json!({ "payload": payload })),
        )
        .await
    }

    async fn assert_update(
        payload: Value,
        expected_display_name: &str,
        expected_discord_id: Option<i64>,
    ) {
        let t = setup();
        let person = bees(&t);

        let (status, body) = put_payload(&t, &person, payload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], person.id.to_string());
        assert_eq!(body["display_name"], expected_display_name);
        assert_eq!(body["discord_id"], json!(expected_discord_id));

        let stored = people::get_person(&t.db, person.id).unwrap().unwrap();
        assert_eq!(stored.display_name, expected_display_name);
        assert_eq!(stored.discord_id, expected_discord_id);
    }

    #[tokio::test]
    async fn test_put_404() {
        let t = setup();
        let (status, _) = send(
            &t.app,
            Method::PUT,
            &person_url(Uuid::nil()),
            Some(t.token.as_str()),
            Some(json!({"payload": {"display_name": null, "discord_id": null}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_no_payload() {
        let t = setup();
        let person = bees(&t);

        let (status, body) =
            send(&t.app, Method::PUT, &person_url(person.id), Some(t.token.as_str()), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({"detail": [{"type": "missing", "loc": ["body", "payload"], "msg": "Field required"}]})
        );
    }

    #[tokio::test]
    async fn test_put_body_without_payload_key() {
        let t = setup();
        let person = bees(&t);

        let (status, body) = send(
            &t.app,
            Method::PUT,
            &person_url(person.id),
            Some(t.token.as_str()),
            Some(json!({"bees": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"], json!(["body", "payload"]));
    }

    #[tokio::test]
    async fn test_put_empty_payload() {
        let t = setup();
        let person = bees(&t);

        for payload in [json!({}), json!({"bees": 4})] {
            let (status, body) = put_payload(&t, &person, payload).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(
                body,
                json!({
                    "detail": [
                        {"type": "missing", "loc": ["body", "payload", "display_name"], "msg": "Field required"},
                        {"type": "missing", "loc": ["body", "payload", "discord_id"], "msg": "Field required"},
                    ]
                })
            );
        }
    }

    #[tokio::test]
    async fn test_put_noop() {
        assert_update(
            json!({"display_name": null, "discord_id": null}),
            "bees",
            Some(1234567890),
        )
        .await;
    }

    #[tokio::test]
    async fn test_put_update_name() {
        assert_update(
            json!({"display_name": "wasps", "discord_id": null}),
            "wasps",
            Some(1234567890),
        )
        .await;
    }

    #[tokio::test]
    async fn test_put_update_discord() {
        assert_update(
            json!({"display_name": null, "discord_id": 9876543210_i64}),
            "bees",
            Some(9876543210),
        )
        .await;
    }

    #[tokio::test]
    async fn test_put_remove_discord() {
        assert_update(
            json!({"display_name": null, "discord_id": 0}),
            "bees",
            None,
        )
        .await;
    }

    #[tokio::test]
    async fn test_put_update_both() {
        assert_update(
            json!({"display_name": "wasps", "discord_id": 9876543210_i64}),
            "wasps",
            Some(9876543210),
        )
        .await;
    }

    #[tokio::test]
    async fn test_put_noop_is_idempotent() {
        let t = setup();
        let person = bees(&t);
        let payload = json!({"display_name": null, "discord_id": null});

        let (_, first) = put_payload(&t, &person, payload.clone()).await;
        let (_, second) = put_payload(&t, &person, payload).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_put_duplicate_discord_id_conflicts() {
        let t = setup();
        bees(&t);
        let other = people::create_person(&t.db, "wasps", None).unwrap();

        let (status, _) = put_payload(
            &t,
            &other,
            json!({"display_name": null, "discord_id": 1234567890_i64}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_put_wrong_types() {
        let t = setup();
        let person = bees(&t);

        let (status, body) = put_payload(
            &t,
            &person,
            json!({"display_name": 12, "discord_id": "twelve"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["type"], "string_type");
        assert_eq!(body["detail"][1]["type"], "int_parsing");
    }
}
