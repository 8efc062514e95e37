//! In-process stand-in for the TaskForge API, served by actix-web on a random port.
#![allow(dead_code)]

use actix_web::middleware::Logger;
use actix_web::{rt, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskforge_client::storage::{MemoryStorage, SessionStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use taskforge_client::{ApiClient, HttpTransport};

pub const EMAIL: &str = "dev@example.com";
pub const PASSWORD: &str = "Password123!";
pub const ACCESS_TOKEN: &str = "access-1";
pub const REFRESH_TOKEN: &str = "refresh-1";

pub struct FakeApi {
    users: Vec<Value>,
    tasks: Vec<Value>,
    next_task_id: i64,
    next_user_id: i64,
    access_tokens: Vec<String>,
}

impl FakeApi {
    fn seeded() -> Self {
        let users = vec![
            json!({ "id": 1, "name": "Dana Dev", "email": EMAIL, "role": "Desarrollador" }),
            json!({ "id": 2, "name": "Lee Lead", "email": "lead@example.com", "role": "Líder Técnico" }),
            json!({ "id": 3, "name": "Ari Admin", "email": "admin@example.com", "role": "Administrador" }),
        ];
        let tasks = vec![
            json!({
                "id": 1, "title": "Write docs", "description": null, "status": "Pendiente",
                "priority": "Baja", "created_at": "2024-05-01T09:15:42.123456",
                "updated_at": "2024-05-01T09:15:42.123456", "due_date": null,
                "creator_id": 1, "assigned_users": [users[0].clone()]
            }),
            json!({
                "id": 2, "title": "Fix login", "description": "500 on bad email",
                "status": "En Progreso", "priority": "Urgente",
                "created_at": "2024-05-02T14:00:00", "updated_at": "2024-05-03T08:30:00",
                "due_date": "2024-06-30T17:00:00", "creator_id": 2, "assigned_users": []
            }),
        ];
        Self {
            users,
            tasks,
            next_task_id: 3,
            next_user_id: 4,
            access_tokens: vec![ACCESS_TOKEN.to_string()],
        }
    }

    fn task_mut(&mut self, id: i64) -> Option<&mut Value> {
        self.tasks.iter_mut().find(|t| t["id"] == id)
    }

    fn user(&self, id: i64) -> Option<&Value> {
        self.users.iter().find(|u| u["id"] == id)
    }

    fn user_mut(&mut self, id: i64) -> Option<&mut Value> {
        self.users.iter_mut().find(|u| u["id"] == id)
    }
}

type State = web::Data<Mutex<FakeApi>>;

fn error(status: actix_web::http::StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

fn bearer(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn authorized(req: &HttpRequest, api: &FakeApi) -> bool {
    bearer(req).is_some_and(|token| api.access_tokens.contains(&token))
}

macro_rules! require_auth {
    ($req:expr, $api:expr) => {
        if !authorized(&$req, &$api) {
            return error(
                actix_web::http::StatusCode::UNAUTHORIZED,
                "Missing or invalid token",
            );
        }
    };
}

async fn login(state: State, body: web::Json<Value>) -> HttpResponse {
    let api = state.lock().unwrap();
    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return error(actix_web::http::StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    HttpResponse::Ok().json(json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": REFRESH_TOKEN,
        "user": api.users[0],
    }))
}

async fn refresh(req: HttpRequest, state: State) -> HttpResponse {
    let mut api = state.lock().unwrap();
    if bearer(&req).as_deref() != Some(REFRESH_TOKEN) {
        return error(actix_web::http::StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }
    let token = format!("access-{}", api.access_tokens.len() + 1);
    api.access_tokens.push(token.clone());
    HttpResponse::Ok().json(json!({ "access_token": token }))
}

async fn list_tasks(
    req: HttpRequest,
    state: State,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let api = state.lock().unwrap();
    require_auth!(req, api);
    let tasks: Vec<&Value> = api
        .tasks
        .iter()
        .filter(|t| query.get("status").map_or(true, |s| t["status"] == s.as_str()))
        .filter(|t| query.get("priority").map_or(true, |p| t["priority"] == p.as_str()))
        .filter(|t| {
            query.get("user_id").map_or(true, |id| {
                t["assigned_users"]
                    .as_array()
                    .is_some_and(|users| users.iter().any(|u| u["id"].to_string() == *id))
            })
        })
        .collect();
    HttpResponse::Ok().json(tasks)
}

async fn get_task(req: HttpRequest, state: State, path: web::Path<i64>) -> HttpResponse {
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    match api.task_mut(path.into_inner()) {
        Some(task) => HttpResponse::Ok().json(task.clone()),
        None => error(actix_web::http::StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn create_task(req: HttpRequest, state: State, body: web::Json<Value>) -> HttpResponse {
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    let title = body["title"].as_str().unwrap_or_default();
    if title.is_empty() {
        return error(actix_web::http::StatusCode::BAD_REQUEST, "Title is required");
    }
    let id = api.next_task_id;
    api.next_task_id += 1;
    let task = json!({
        "id": id,
        "title": title,
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "status": body.get("status").cloned().unwrap_or(json!("Pendiente")),
        "priority": body.get("priority").cloned().unwrap_or(json!("Media")),
        "created_at": "2024-05-04T10:00:00",
        "updated_at": "2024-05-04T10:00:00",
        "due_date": body.get("due_date").cloned().unwrap_or(Value::Null),
        "creator_id": 1,
        "assigned_users": [],
    });
    api.tasks.push(task.clone());
    HttpResponse::Created().json(task)
}

/// Overwrites the fields present in the body; `title` may not be blanked.
async fn update_task(
    req: HttpRequest,
    state: State,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    if body.get("title").and_then(Value::as_str) == Some("") {
        return error(actix_web::http::StatusCode::BAD_REQUEST, "Title is required");
    }
    match api.task_mut(path.into_inner()) {
        Some(task) => {
            for field in ["title", "description", "status", "priority", "due_date"] {
                if let Some(value) = body.get(field) {
                    task[field] = value.clone();
                }
            }
            task["updated_at"] = json!("2024-05-05T12:00:00");
            HttpResponse::Ok().json(task.clone())
        }
        None => error(actix_web::http::StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn set_task_field(
    req: HttpRequest,
    state: State,
    path: web::Path<(i64, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    let (id, field) = path.into_inner();
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    let Some(value) = body.get(&field).cloned() else {
        return error(actix_web::http::StatusCode::BAD_REQUEST, "Missing field");
    };
    match api.task_mut(id) {
        Some(task) => {
            task[field.as_str()] = value;
            HttpResponse::Ok().json(task.clone())
        }
        None => error(actix_web::http::StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn assign(req: HttpRequest, state: State, path: web::Path<(i64, i64)>) -> HttpResponse {
    let (task_id, user_id) = path.into_inner();
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    let Some(user) = api.user(user_id).cloned() else {
        return error(actix_web::http::StatusCode::NOT_FOUND, "User not found");
    };
    match api.task_mut(task_id) {
        Some(task) => {
            if let Some(users) = task["assigned_users"].as_array_mut() {
                if !users.iter().any(|u| u["id"] == user_id) {
                    users.push(user);
                }
            }
            HttpResponse::Ok().json(task.clone())
        }
        None => error(actix_web::http::StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn unassign(req: HttpRequest, state: State, path: web::Path<(i64, i64)>) -> HttpResponse {
    let (task_id, user_id) = path.into_inner();
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    match api.task_mut(task_id) {
        Some(task) => {
            if let Some(users) = task["assigned_users"].as_array_mut() {
                users.retain(|u| u["id"] != user_id);
            }
            HttpResponse::Ok().json(task.clone())
        }
        None => error(actix_web::http::StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn list_users(
    req: HttpRequest,
    state: State,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let api = state.lock().unwrap();
    require_auth!(req, api);
    let users: Vec<&Value> = api
        .users
        .iter()
        .filter(|u| query.get("role").map_or(true, |r| u["role"] == r.as_str()))
        .filter(|u| {
            query.get("search").map_or(true, |s| {
                u["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(&s.to_lowercase()))
            })
        })
        .collect();
    HttpResponse::Ok().json(users)
}

async fn get_user(req: HttpRequest, state: State, path: web::Path<i64>) -> HttpResponse {
    let api = state.lock().unwrap();
    require_auth!(req, api);
    match api.user(path.into_inner()) {
        Some(user) => HttpResponse::Ok().json(user),
        None => error(actix_web::http::StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn create_user(req: HttpRequest, state: State, body: web::Json<Value>) -> HttpResponse {
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    let Some(email) = body["email"].as_str() else {
        return error(actix_web::http::StatusCode::BAD_REQUEST, "Email is required");
    };
    if api.users.iter().any(|u| u["email"] == email) {
        return error(actix_web::http::StatusCode::BAD_REQUEST, "Email already registered");
    }
    if body["password"].as_str().is_none() {
        return error(actix_web::http::StatusCode::BAD_REQUEST, "Password is required");
    }
    let id = api.next_user_id;
    api.next_user_id += 1;
    let user = json!({
        "id": id,
        "name": body["name"],
        "email": email,
        "role": body.get("role").cloned().unwrap_or(json!("Desarrollador")),
    });
    api.users.push(user.clone());
    HttpResponse::Created().json(user)
}

async fn update_user(
    req: HttpRequest,
    state: State,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut api = state.lock().unwrap();
    require_auth!(req, api);
    match api.user_mut(path.into_inner()) {
        Some(user) => {
            for field in ["name", "email", "role"] {
                if let Some(value) = body.get(field) {
                    user[field] = value.clone();
                }
            }
            HttpResponse::Ok().json(user.clone())
        }
        None => error(actix_web::http::StatusCode::NOT_FOUND, "User not found"),
    }
}

fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/login").route(web::post().to(login)))
        .service(web::resource("/auth/refresh").route(web::post().to(refresh)))
        .service(
            web::resource("/tasks")
                .route(web::get().to(list_tasks))
                .route(web::post().to(create_task)),
        )
        .service(
            web::resource("/tasks/{id}")
                .route(web::get().to(get_task))
                .route(web::put().to(update_task)),
        )
        .service(web::resource("/tasks/{id}/{field}").route(web::put().to(set_task_field)))
        .service(web::resource("/tasks/{id}/assign/{user_id}").route(web::post().to(assign)))
        .service(
            web::resource("/tasks/{id}/unassign/{user_id}").route(web::delete().to(unassign)),
        )
        .service(
            web::resource("/users")
                .route(web::get().to(list_users))
                .route(web::post().to(create_user)),
        )
        .service(
            web::resource("/users/{id}")
                .route(web::get().to(get_user))
                .route(web::put().to(update_user)),
        );
}

/// Starts the fake API and returns its base URL, e.g. `http://127.0.0.1:PORT/api`.
pub fn spawn_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let state = web::Data::new(Mutex::new(FakeApi::seeded()));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(web::scope("/api").configure(config))
    })
    .listen(listener)
    .expect("Failed to listen on random port")
    .workers(1)
    .run();
    rt::spawn(server);

    format!("http://127.0.0.1:{}/api", port)
}

/// An `ApiClient` pointed at `base_url`, plus the in-memory storage it reads tokens from.
pub fn client(base_url: &str) -> (ApiClient, Arc<MemoryStorage>) {
    let transport = HttpTransport::new(base_url, Duration::from_secs(5))
        .expect("Failed to build HTTP transport");
    let storage = Arc::new(MemoryStorage::new());
    let api = ApiClient::new(Arc::new(transport), storage.clone());
    (api, storage)
}

/// Same as `client`, with a session already stored.
pub fn logged_in_client(base_url: &str) -> (ApiClient, Arc<MemoryStorage>) {
    let (api, storage) = client(base_url);
    storage.set(ACCESS_TOKEN_KEY, ACCESS_TOKEN).unwrap();
    storage.set(REFRESH_TOKEN_KEY, REFRESH_TOKEN).unwrap();
    (api, storage)
}
