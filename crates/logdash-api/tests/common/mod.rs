//! In-process stand-in for the log-management server.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::{
    Form, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use serde_json::{Value, json};

use logdash_api::{ApiClient, ClientConfig};

type Reply = (StatusCode, Json<Value>);

/// Requests observed by the stub
#[derive(Default, Debug)]
pub struct Recorded {
    pub logins: Vec<(String, String)>,
    pub searches: Vec<HashMap<String, String>>,
    pub search_auth: Vec<Option<String>>,
    pub uploads: Vec<(String, usize)>,
    pub status_calls: u32,
}

#[derive(Clone)]
pub struct Stub {
    pub recorded: Arc<Mutex<Recorded>>,
    users: Arc<Mutex<HashMap<String, String>>>,
    statuses: Arc<Mutex<VecDeque<&'static str>>>,
}

impl Stub {
    /// `statuses` is replayed by the status endpoint; the last entry repeats.
    /// `"error"` answers with a 500.
    pub fn new(statuses: &[&'static str]) -> Self {
        let users = HashMap::from([
            ("alice".to_string(), "wonderland".to_string()),
            ("bob".to_string(), "builder".to_string()),
            ("carol".to_string(), "p&ss=w rd".to_string()),
        ]);
        Self {
            recorded: Arc::new(Mutex::new(Recorded::default())),
            users: Arc::new(Mutex::new(users)),
            statuses: Arc::new(Mutex::new(statuses.iter().copied().collect())),
        }
    }

    pub fn status_calls(&self) -> u32 {
        self.recorded.lock().unwrap().status_calls
    }
}

/// Start the stub on an ephemeral port and return its base URL
pub async fn spawn(stub: Stub) -> String {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/uploads/", post(upload).get(list_uploads))
        .route("/uploads/{id}/status", get(upload_status))
        .route("/search/", get(search))
        .route("/analytics/distribution", get(distribution))
        .route("/analytics/top-errors", get(top_errors))
        .route("/analytics/time-series", get(time_series))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        ..ClientConfig::default()
    })
    .unwrap()
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "role": "viewer",
        "is_active": true,
        "created_at": "2024-01-15T10:30:00"
    })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid authentication credentials"})),
    )
}

async fn login(State(stub): State<Stub>, Form(form): Form<HashMap<String, String>>) -> Reply {
    let username = form.get("username").cloned().unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();
    stub.recorded
        .lock()
        .unwrap()
        .logins
        .push((username.clone(), password.clone()));

    let known = stub.users.lock().unwrap().get(&username) == Some(&password);
    if !known {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid credentials"})),
        );
    }

    let token = format!("token-{username}");
    if username == "bob" {
        // This account gets its user record inline
        return (
            StatusCode::OK,
            Json(json!({"access_token": token, "token_type": "bearer", "user": user_json(2, "bob")})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"access_token": token, "token_type": "bearer"})),
    )
}

async fn register(State(stub): State<Stub>, Json(body): Json<Value>) -> Reply {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut users = stub.users.lock().unwrap();
    if users.contains_key(&username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Username already registered"})),
        );
    }
    if !body["email"].as_str().unwrap_or_default().contains('@') {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"}]})),
        );
    }
    users.insert(username.clone(), password);
    let mut user = user_json(10, &username);
    user["role"] = body["role"].clone();
    (StatusCode::OK, Json(user))
}

async fn me(headers: HeaderMap) -> Reply {
    match bearer(&headers).as_deref().and_then(|t| t.strip_prefix("token-")) {
        Some(username) => (StatusCode::OK, Json(user_json(1, username))),
        None => unauthorized(),
    }
}

async fn upload(State(stub): State<Stub>, headers: HeaderMap, mut multipart: Multipart) -> Reply {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        stub.recorded
            .lock()
            .unwrap()
            .uploads
            .push((file_name.clone(), bytes.len()));
        return (
            StatusCode::OK,
            Json(json!({"id": 42, "filename": file_name, "size": bytes.len(), "status": "processing"})),
        );
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": [{"loc": ["body", "file"], "msg": "field required", "type": "value_error.missing"}]})),
    )
}

async fn list_uploads(headers: HeaderMap) -> Reply {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            {"id": 42, "filename": "access.log", "size": 120, "status": "completed", "upload_timestamp": "2024-01-15T10:30:00"},
            {"id": 41, "filename": "broken.log", "size": 9, "status": "failed"}
        ])),
    )
}

async fn upload_status(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let next = {
        let mut recorded = stub.recorded.lock().unwrap();
        recorded.status_calls += 1;
        let mut statuses = stub.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().copied()
        }
    };
    if id != 42 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Upload not found"})),
        );
    }
    match next {
        Some("error") | None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "status lookup failed"})),
        ),
        Some(state) => (StatusCode::OK, Json(json!({"status": state}))),
    }
}

async fn search(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    {
        let mut recorded = stub.recorded.lock().unwrap();
        recorded.searches.push(params.clone());
        recorded.search_auth.push(bearer(&headers));
    }
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    match params.get("q").map(String::as_str) {
        Some("boom") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "search backend unavailable"})),
        ),
        Some("nothing") => (
            StatusCode::OK,
            Json(json!({"logs": [], "total": 0, "page": 1, "per_page": 50})),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({
                "logs": [
                    {
                        "id": 1, "upload_id": 42,
                        "timestamp": "2024-01-15T10:30:00",
                        "log_level": "ERROR", "source": "Nginx",
                        "message": "upstream timed out",
                        "additional_fields": {"status": "504"}
                    },
                    {
                        "id": 2, "upload_id": 42,
                        "timestamp": "2024-01-15T10:31:00",
                        "log_level": "INFO", "source": "Nginx",
                        "message": "GET /health 200",
                        "additional_fields": null
                    }
                ],
                "total": 2, "page": 1, "per_page": 50, "total_pages": 1
            })),
        ),
    }
}

async fn distribution(Query(params): Query<HashMap<String, String>>) -> Reply {
    let series = match params.get("field").map(String::as_str) {
        Some("source") => json!([{"name": "Nginx", "value": 12}, {"name": null, "value": 1}]),
        _ => json!([{"name": "ERROR", "value": 3}, {"name": "INFO", "value": 10}]),
    };
    (StatusCode::OK, Json(json!({"series": series})))
}

async fn top_errors(Query(params): Query<HashMap<String, String>>) -> Reply {
    assert_eq!(params.get("n").map(String::as_str), Some("10"));
    (
        StatusCode::OK,
        Json(json!({"series": [{"name": "upstream timed out", "value": 3}]})),
    )
}

async fn time_series(Query(params): Query<HashMap<String, String>>) -> Reply {
    if params.get("interval").map(String::as_str) != Some("hour") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Interval must be one of: minute, hour, day"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"series": [{"name": "Log Entries", "data": [
            {"x": "2024-01-15T10:00:00", "y": 4},
            {"x": "2024-01-15T11:00:00", "y": 9}
        ]}]})),
    )
}
