//! # Client routes
//!
//! The navigation table of the application: which path shows which view, and whether the
//! view needs an authenticated session. `guard` decides, per navigation, whether to let it
//! through or redirect.

pub mod guard;

pub use guard::{guard, Navigation, Router};

use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// A resolved navigation target. Parameterized views carry their raw `:id` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`, which only redirects to the dashboard.
    Root,
    Login,
    Dashboard,
    TaskList,
    CreateTask,
    TaskDetail { id: String },
    EditTask { id: String },
    UserList,
    CreateUser,
    EditUser { id: String },
    /// Anything the table does not match.
    NotFound { path: String },
}

struct RouteRecord {
    pattern: Regex,
    build: fn(&Captures) -> Route,
}

fn record(pattern: &str, build: fn(&Captures) -> Route) -> RouteRecord {
    RouteRecord {
        pattern: Regex::new(pattern).unwrap(),
        build,
    }
}

lazy_static! {
    // Static segments are listed before the `:id` patterns they would otherwise match.
    static ref ROUTES: Vec<RouteRecord> = vec![
        record(r"^/$", |_| Route::Root),
        record(r"^/login$", |_| Route::Login),
        record(r"^/dashboard$", |_| Route::Dashboard),
        record(r"^/tasks$", |_| Route::TaskList),
        record(r"^/tasks/new$", |_| Route::CreateTask),
        record(r"^/tasks/(?P<id>[^/]+)$", |c| Route::TaskDetail { id: c["id"].to_string() }),
        record(r"^/tasks/(?P<id>[^/]+)/edit$", |c| Route::EditTask { id: c["id"].to_string() }),
        record(r"^/users$", |_| Route::UserList),
        record(r"^/users/new$", |_| Route::CreateUser),
        record(r"^/users/(?P<id>[^/]+)/edit$", |c| Route::EditUser { id: c["id"].to_string() }),
    ];
}

/// Drops `?query` and `#fragment`, and a single trailing slash on anything but `/`.
fn normalize(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let path = &path[..end];
    if path.is_empty() {
        return "/";
    }
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

impl Route {
    pub fn resolve(path: &str) -> Route {
        let normalized = normalize(path);
        ROUTES
            .iter()
            .find_map(|r| r.pattern.captures(normalized).map(|c| (r.build)(&c)))
            .unwrap_or_else(|| Route::NotFound {
                path: normalized.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Root => "Root",
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::TaskList => "TaskList",
            Route::CreateTask => "CreateTask",
            Route::TaskDetail { .. } => "TaskDetail",
            Route::EditTask { .. } => "EditTask",
            Route::UserList => "UserList",
            Route::CreateUser => "CreateUser",
            Route::EditUser { .. } => "EditUser",
            Route::NotFound { .. } => "NotFound",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Root | Route::Login | Route::NotFound { .. })
    }

    /// Static redirect configured on the route itself, applied before any guard.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Route::Root => Some(DASHBOARD_PATH),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Dashboard => DASHBOARD_PATH.to_string(),
            Route::TaskList => "/tasks".to_string(),
            Route::CreateTask => "/tasks/new".to_string(),
            Route::TaskDetail { id } => format!("/tasks/{}", id),
            Route::EditTask { id } => format!("/tasks/{}/edit", id),
            Route::UserList => "/users".to_string(),
            Route::CreateUser => "/users/new".to_string(),
            Route::EditUser { id } => format!("/users/{}/edit", id),
            Route::NotFound { path } => path.clone(),
        }
    }
}
