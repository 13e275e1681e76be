use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use caloscope_core::{
    application::{CaloscopeClient, create_client, create_client_with_store},
    domain::{
        authentication::{
            entities::{SessionEvent, SessionStatus, StoredSession},
            ports::TokenStore,
            value_objects::SignInInput,
        },
        common::{
            ApiConfig, CaloscopeConfig, HistoryConfig, SessionConfig,
            entities::app_errors::CoreError,
        },
        food_history::{
            DeleteConfirmation, DeleteOutcome, FetchOutcome, FoodEntry, HistoryScope, SortOrder,
        },
        user_profile::value_objects::UpdateProfileInput,
    },
    infrastructure::token_store::MemoryTokenStore,
};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    body: Option<Value>,
}

#[derive(Default)]
struct BackendInner {
    routes: HashMap<(String, String), (u16, Option<Value>)>,
    requests: Vec<Recorded>,
}

/// Records every request and answers from canned responses keyed by method
/// and path (relative to `/api/`).
#[derive(Clone, Default)]
struct FakeBackend {
    inner: Arc<Mutex<BackendInner>>,
}

impl FakeBackend {
    fn on(&self, method: &str, path: &str, status: u16, body: Option<Value>) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    async fn serve(&self) -> String {
        let router = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }
}

async fn handle(
    State(backend): State<FakeBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().trim_start_matches("/api/").to_string();
    let mut inner = backend.inner.lock().unwrap();
    inner.requests.push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).ok(),
    });

    match inner.routes.get(&(method.to_string(), path)).cloned() {
        Some((status, Some(body))) => {
            (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
        }
        Some((status, None)) => StatusCode::from_u16(status).unwrap().into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
    }
}

struct Approve;

impl DeleteConfirmation for Approve {
    fn confirm_delete(&self, _entry: &FoodEntry) -> bool {
        true
    }
}

fn config(base_url: &str) -> CaloscopeConfig {
    CaloscopeConfig {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
        },
        history: HistoryConfig {
            fetch_grace_period: Duration::ZERO,
        },
        session: SessionConfig::Ephemeral,
    }
}

fn signed_in_store() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_session(StoredSession {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        email: "ana@example.com".to_string(),
    }))
}

fn client(base_url: &str, store: &Arc<MemoryTokenStore>) -> CaloscopeClient {
    let tokens: Arc<dyn TokenStore> = store.clone();
    create_client_with_store(config(base_url), tokens).unwrap()
}

fn wire_entry(id: &str, calo: f64) -> Value {
    json!({
        "id": id,
        "predicted_name": format!("dish {id}"),
        "calo": calo,
        "confidence": 0.9,
        "created_at": "2024-05-01T12:00:00Z",
        "comment": null,
        "image": format!("https://cdn.example.com/{id}.jpg"),
        "segmentation_image": format!("https://cdn.example.com/{id}-seg.jpg")
    })
}

#[tokio::test]
async fn test_history_page_is_fetched_with_bearer_and_filters() {
    let backend = FakeBackend::default();
    backend.on(
        "GET",
        "food-history",
        200,
        Some(json!({
            "results": [wire_entry("A", 320.0), wire_entry("B", 150.0)],
            "next": "http://backend/api/food-history?page=2",
            "totalCalories": 5000
        })),
    );
    let store = signed_in_store();
    let client = client(&backend.serve().await, &store);
    let day = HistoryScope::Day(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    let controller = client.history_controller(Arc::new(Approve), day);

    assert!(controller.load_initial().await.is_applied());

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.total_calories, 5000.0);
    assert!(snapshot.has_more);
    assert_eq!(snapshot.items[0].confidence, "90%");

    let request = &backend.requests()[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer access-1"));
    assert_eq!(request.query.as_deref(), Some("page=1&day=2024-05-01"));
}

#[tokio::test]
async fn test_sort_change_sends_ordering() {
    let backend = FakeBackend::default();
    backend.on(
        "GET",
        "food-history",
        200,
        Some(json!({ "results": [], "next": null, "total_calories": 0 })),
    );
    let store = signed_in_store();
    let client = client(&backend.serve().await, &store);
    let controller = client.history_controller(Arc::new(Approve), HistoryScope::All);

    controller.load_initial().await;
    controller.change_sort(SortOrder::LowestCalories).await;

    let queries: Vec<_> = backend
        .requests()
        .into_iter()
        .map(|request| request.query.unwrap_or_default())
        .collect();
    assert_eq!(queries, vec!["page=1", "page=1&ordering=calo"]);
}

#[tokio::test]
async fn test_edit_and_delete_round_trip() {
    let backend = FakeBackend::default();
    backend.on(
        "GET",
        "food-history",
        200,
        Some(json!({
            "results": [wire_entry("A", 200.0), wire_entry("B", 150.0)],
            "next": null,
            "total_calories": 1000
        })),
    );
    let mut edited = wire_entry("A", 180.0);
    edited["comment"] = json!("no sauce");
    backend.on("PATCH", "food-history/A", 200, Some(edited));
    backend.on("DELETE", "food-history/B", 204, None);

    let store = signed_in_store();
    let client = client(&backend.serve().await, &store);
    let controller = client.history_controller(Arc::new(Approve), HistoryScope::All);
    controller.load_initial().await;
    let a = controller.snapshot().items[0].clone();

    let updated = controller.save_edit(&a, "180", "no sauce").await.unwrap();
    assert_eq!(updated.comment.as_deref(), Some("no sauce"));
    assert_eq!(controller.snapshot().total_calories, 980.0);

    assert_eq!(controller.delete("B").await, Ok(DeleteOutcome::Deleted));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.total_calories, 830.0);
    assert_eq!(snapshot.items.len(), 1);

    let requests = backend.requests();
    assert_eq!(requests[1].method, "PATCH");
    assert_eq!(
        requests[1].body,
        Some(json!({ "calo": 180.0, "comment": "no sauce" }))
    );
    assert_eq!(requests[2].method, "DELETE");
    assert_eq!(requests[2].path, "food-history/B");
}

#[tokio::test]
async fn test_failed_delete_surfaces_server_message() {
    let backend = FakeBackend::default();
    backend.on(
        "GET",
        "food-history",
        200,
        Some(json!({ "results": [wire_entry("A", 150.0)], "next": null, "total_calories": 1000 })),
    );
    backend.on(
        "DELETE",
        "food-history/A",
        500,
        Some(json!({ "error": "Storage unavailable" })),
    );
    let store = signed_in_store();
    let client = client(&backend.serve().await, &store);
    let controller = client.history_controller(Arc::new(Approve), HistoryScope::All);
    controller.load_initial().await;

    let result = controller.delete("A").await;

    assert_eq!(
        result,
        Err(CoreError::Server {
            status: 500,
            message: "Storage unavailable".to_string()
        })
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.total_calories, 1000.0);
    assert!(!snapshot.items[0].is_deleting);
    assert_eq!(snapshot.notice.as_deref(), Some("Storage unavailable"));
}

#[tokio::test]
async fn test_rejected_token_clears_session_and_signals_expiry() {
    let backend = FakeBackend::default();
    backend.on(
        "GET",
        "food-history",
        401,
        Some(json!({ "detail": "Given token not valid for any token type", "code": "token_not_valid" })),
    );
    let store = signed_in_store();
    let client = client(&backend.serve().await, &store);
    let mut sessions = client.sessions();
    let controller = client.history_controller(Arc::new(Approve), HistoryScope::All);

    let outcome = controller.load_initial().await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failed(CoreError::Unauthorized)
    ));
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(sessions.try_recv().unwrap(), SessionEvent::Expired);

    // Without a session nothing is sent at all.
    let requests_before = backend.requests().len();
    assert!(matches!(
        controller.retry().await,
        FetchOutcome::Failed(CoreError::Unauthorized)
    ));
    assert_eq!(backend.requests().len(), requests_before);
}

#[tokio::test]
async fn test_wrong_password_is_a_server_error_not_an_expiry() {
    let backend = FakeBackend::default();
    backend.on(
        "POST",
        "auth/sign-in",
        401,
        Some(json!({ "detail": "No active account found with the given credentials" })),
    );
    let store = Arc::new(MemoryTokenStore::new());
    let client = client(&backend.serve().await, &store);
    let mut sessions = client.sessions();

    let result = client
        .auth
        .sign_in(SignInInput {
            email: "ana@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;

    assert_eq!(
        result,
        Err(CoreError::Server {
            status: 401,
            message: "No active account found with the given credentials".to_string()
        })
    );
    assert!(sessions.try_recv().is_err());
    assert_eq!(
        backend.requests()[0].body,
        Some(json!({ "email": "ana@example.com", "password": "wrong" }))
    );
}

#[tokio::test]
async fn test_sign_in_then_restore_refreshes_opaque_token() {
    let backend = FakeBackend::default();
    backend.on(
        "POST",
        "auth/sign-in",
        200,
        Some(json!({ "access": "opaque-access", "refresh": "refresh-9" })),
    );
    backend.on(
        "POST",
        "auth/token/refresh",
        200,
        Some(json!({ "access": "opaque-access-2" })),
    );
    let store = Arc::new(MemoryTokenStore::new());
    let client = client(&backend.serve().await, &store);

    client
        .auth
        .sign_in(SignInInput {
            email: "ana@example.com".to_string(),
            password: "secret99".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(
        client.auth.restore_session().await,
        Ok(SessionStatus::SignedIn {
            email: "ana@example.com".to_string()
        })
    );
    let session = store.load().unwrap().unwrap();
    assert_eq!(session.access_token, "opaque-access-2");
    assert_eq!(session.refresh_token, "refresh-9");
    assert_eq!(
        backend.requests()[1].body,
        Some(json!({ "refresh": "refresh-9" }))
    );
}

#[tokio::test]
async fn test_profile_update_sends_only_changed_fields() {
    let backend = FakeBackend::default();
    backend.on(
        "PATCH",
        "user-profile",
        200,
        Some(json!({
            "email": "ana@example.com",
            "full_name": "Ana Lima",
            "age": 31,
            "gender": "female",
            "height": "168.00",
            "weight": "60.50",
            "daily_calorie_goal": 1900
        })),
    );
    let store = signed_in_store();
    let client = client(&backend.serve().await, &store);

    let profile = client
        .profile
        .update_profile(UpdateProfileInput {
            weight: Some(60.5),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(profile.weight, Some(60.5));
    assert_eq!(profile.daily_calorie_goal, Some(1900.0));
    assert_eq!(backend.requests()[0].body, Some(json!({ "weight": 60.5 })));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = create_client(config(&format!("http://{addr}/api"))).unwrap();

    let result = client.auth.request_password_reset("ana@example.com").await;
    assert!(matches!(result, Err(CoreError::Network(_))));
}
