mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use tenders_api::filter::TenderQuery;
use tenders_api::models::TenderInput;
use tenders_api::services::{
    ApiClient, MemoryStore, RemoteTenderService, RemoteUserService, ServiceError, Session, TenderService,
    UserService,
};

/// Requests seen by the mock: (authorization header, raw query)
#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<(Option<String>, HashMap<String, String>)>>>);

impl Seen {
    fn record(&self, headers: &HeaderMap, query: HashMap<String, String>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push((auth, query));
    }

    fn last(&self) -> (Option<String>, HashMap<String, String>) {
        self.0.lock().unwrap().last().cloned().unwrap()
    }
}

fn tender_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Mock tender",
        "description": "Served by the mock",
        "budget": 100.0,
        "deadline": "2030-01-01",
        "status": "open",
        "category": "Construction",
        "company": "Mock Co",
        "location": "Astana",
        "requirements": [],
        "contact": "mock@example.com",
        "createdBy": 2,
        "createdAt": "2024-01-01"
    })
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "message": message })))
}

async fn spawn_mock() -> Result<(String, Seen)> {
    let seen = Seen::default();

    let app = Router::new()
        .route(
            "/api/tenders",
            get(|State(seen): State<Seen>, headers: HeaderMap| async move {
                seen.record(&headers, HashMap::new());
                Json(json!([tender_json(1), tender_json(2)]))
            }),
        )
        .route(
            "/api/tenders/search",
            get(
                |State(seen): State<Seen>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    seen.record(&headers, q);
                    Json(json!([tender_json(7)]))
                },
            ),
        )
        .route(
            "/api/tenders/:id",
            get(|Path(_id): Path<i32>| async { error(StatusCode::NOT_FOUND, "Tender not found") })
                .delete(|| async { Json(json!({ "success": true })) }),
        )
        .route(
            "/api/tenders/:id/subscribe",
            post(|| async { error(StatusCode::CONFLICT, "User already subscribed to this tender") })
                .delete(|| async { Json(json!({ "success": true })) }),
        )
        .route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "user123" {
                    Ok(Json(json!({
                        "id": 2,
                        "email": body["email"],
                        "full_name": "Regular User",
                        "role": "user",
                        "token": "mock-token"
                    })))
                } else {
                    Err(error(StatusCode::UNAUTHORIZED, "Invalid email or password"))
                }
            }),
        )
        .route(
            "/api/users/:id",
            get(|| async { error(StatusCode::UNAUTHORIZED, "Not authorized, token failed") }),
        )
        .with_state(seen.clone());

    let port = portpicker::pick_unused_port().ok_or_else(|| anyhow::anyhow!("no free port"))?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://127.0.0.1:{}/api", port), seen))
}

fn services(base_url: &str) -> (RemoteTenderService, RemoteUserService, Session) {
    let session = Session::new(Arc::new(MemoryStore::new()));
    let client = ApiClient::new(base_url, session.clone());
    (
        RemoteTenderService::new(client.clone()),
        RemoteUserService::new(client),
        session,
    )
}

#[tokio::test]
async fn login_stores_session_and_later_calls_send_bearer() -> Result<()> {
    let (base, seen) = spawn_mock().await?;
    let (tenders, users, session) = services(&base);

    tenders.get_all_tenders().await?;
    assert_eq!(seen.last().0, None);

    let user = users.login("user@example.com", "user123").await?;
    assert_eq!(user.token, "mock-token");
    assert_eq!(session.token()?.as_deref(), Some("mock-token"));

    let all = tenders.get_all_tenders().await?;
    assert_eq!(all.len(), 2);
    assert_eq!(seen.last().0.as_deref(), Some("Bearer mock-token"));
    Ok(())
}

#[tokio::test]
async fn error_statuses_keep_server_message() -> Result<()> {
    let (base, _seen) = spawn_mock().await?;
    let (tenders, users, _session) = services(&base);

    match tenders.get_tender_by_id(5).await {
        Err(ServiceError::NotFound(message)) => assert_eq!(message, "Tender not found"),
        other => panic!("unexpected result: {:?}", other.map(|t| t.id)),
    }
    assert!(matches!(
        tenders.subscribe_tender(1, 2).await,
        Err(ServiceError::Conflict(m)) if m == "User already subscribed to this tender"
    ));
    assert!(matches!(
        users.login("user@example.com", "wrong").await,
        Err(ServiceError::Unauthorized(m)) if m == "Invalid email or password"
    ));
    Ok(())
}

#[tokio::test]
async fn unauthorized_response_clears_session() -> Result<()> {
    let (base, _seen) = spawn_mock().await?;
    let (_tenders, users, session) = services(&base);

    users.login("user@example.com", "user123").await?;
    assert!(session.current()?.is_some());

    assert!(matches!(users.get_user_profile(2).await, Err(ServiceError::Unauthorized(_))));
    assert!(session.current()?.is_none());
    Ok(())
}

#[tokio::test]
async fn search_sends_json_query_and_top_level_refinements() -> Result<()> {
    let (base, seen) = spawn_mock().await?;
    let (tenders, _users, _session) = services(&base);

    let query = TenderQuery {
        search_term: Some("road".into()),
        category: Some("All".into()),
        min_budget: Some(1000.0),
        ..Default::default()
    };
    let found = tenders.search_tenders(&query).await?;
    assert_eq!(found[0].id, 7);

    let (_, params) = seen.last();
    let embedded: Value = serde_json::from_str(&params["query"])?;
    assert_eq!(embedded["searchTerm"], "road");
    assert_eq!(embedded["category"], "All");
    assert_eq!(params["minBudget"], "1000");
    Ok(())
}

#[tokio::test]
async fn delete_and_unsubscribe_read_acknowledgement() -> Result<()> {
    let (base, _seen) = spawn_mock().await?;
    let (tenders, _users, _session) = services(&base);

    tenders.delete_tender(3).await?;
    tenders.unsubscribe_tender(3, 2).await?;
    Ok(())
}

#[tokio::test]
async fn remote_services_against_live_server() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let (tenders, users, session) = services(&server.api(""));

    let admin = users.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;
    assert_eq!(session.current()?.map(|u| u.id), Some(admin.id));

    let input = TenderInput {
        title: Some("Remote-created tender".into()),
        description: Some("Created through the service layer".into()),
        budget: Some(500.0),
        deadline: Some("2031-06-30".into()),
        category: Some("IT".into()),
        company: Some("Remote Co".into()),
        location: Some("Shymkent".into()),
        contact: Some("remote@example.com".into()),
        ..Default::default()
    };
    let tender = tenders.create_tender(&input).await?;
    assert_eq!(tender.created_by, Some(admin.id));

    tenders.subscribe_tender(tender.id, admin.id).await?;
    assert!(tenders.is_user_subscribed(tender.id, admin.id).await?);
    assert!(matches!(
        tenders.subscribe_tender(tender.id, admin.id).await,
        Err(ServiceError::Conflict(_))
    ));

    tenders.delete_tender(tender.id).await?;
    assert!(!tenders.is_user_subscribed(tender.id, admin.id).await?);
    assert!(matches!(tenders.get_tender_by_id(tender.id).await, Err(ServiceError::NotFound(_))));
    Ok(())
}
