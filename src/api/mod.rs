//! # API client
//!
//! `ApiClient` exposes one typed method per TaskForge endpoint. It builds an `ApiRequest`,
//! attaches the right bearer token from session storage, hands the request to a
//! `Transport`, and turns non-2xx responses into `RequestError`s carrying the server's
//! `{"error": "..."}` message.
//!
//! The `Transport` trait is the seam to the actual HTTP stack: `http::HttpTransport`
//! talks to a real server with reqwest, tests substitute a scripted transport.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use futures::future::BoxFuture;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AuthResponse, LoginRequest, RefreshResponse};
use crate::error::{AuthError, ClientError, RequestError};
use crate::models::{Task, TaskInput, TaskPriority, TaskQuery, TaskStatus, User, UserInput, UserQuery};
use crate::storage::{SessionStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

pub use http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request as handed to the transport. `path` is relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }
}

/// Raw response: status code plus the decoded JSON body, if there was one.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn error_message(&self) -> Option<String> {
        self.body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Sends requests to the remote API.
pub trait Transport: Send + Sync {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;
}

/// Which stored token, if any, authenticates a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credential {
    None,
    Access,
    Refresh,
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { transport, storage }
    }

    /// The storage tokens are read from. Shared with the session manager.
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        mut request: ApiRequest,
        credential: Credential,
    ) -> Result<T, ClientError> {
        request.bearer = match credential {
            Credential::None => None,
            Credential::Access => self.storage.get(ACCESS_TOKEN_KEY)?,
            Credential::Refresh => self.storage.get(REFRESH_TOKEN_KEY)?,
        };
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await?;
        debug!("{:?} {} -> {}", method, path, response.status);

        if !response.is_success() {
            return Err(ClientError::Request(RequestError::new(
                Some(response.status),
                response.error_message(),
            )));
        }
        Ok(serde_json::from_value(response.body.unwrap_or(Value::Null))?)
    }

    fn with_query<Q: Serialize>(mut request: ApiRequest, query: &Q) -> Result<ApiRequest, ClientError> {
        request.query = query_pairs(query)?;
        Ok(request)
    }

    fn with_body<B: Serialize>(mut request: ApiRequest, body: &B) -> Result<ApiRequest, ClientError> {
        request.body = Some(serde_json::to_value(body)?);
        Ok(request)
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let request = Self::with_body(ApiRequest::new(Method::Post, "/auth/login"), credentials)?;
        self.execute(request, Credential::None)
            .await
            .map_err(reject_unauthorized)
    }

    /// Exchanges the stored refresh token for a new access token.
    pub async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        self.execute(ApiRequest::new(Method::Post, "/auth/refresh"), Credential::Refresh)
            .await
            .map_err(reject_unauthorized)
    }

    pub async fn get_tasks(&self, filters: &TaskQuery) -> Result<Vec<Task>, ClientError> {
        let request = Self::with_query(ApiRequest::new(Method::Get, "/tasks"), filters)?;
        self.execute(request, Credential::Access).await
    }

    pub async fn get_task_by_id(&self, id: i64) -> Result<Task, ClientError> {
        self.execute(ApiRequest::new(Method::Get, format!("/tasks/{}", id)), Credential::Access)
            .await
    }

    pub async fn create_task(&self, input: &TaskInput) -> Result<Task, ClientError> {
        let request = Self::with_body(ApiRequest::new(Method::Post, "/tasks"), input)?;
        self.execute(request, Credential::Access).await
    }

    pub async fn update_task(&self, id: i64, input: &TaskInput) -> Result<Task, ClientError> {
        let request = Self::with_body(ApiRequest::new(Method::Put, format!("/tasks/{}", id)), input)?;
        self.execute(request, Credential::Access).await
    }

    pub async fn update_task_status(&self, id: i64, status: TaskStatus) -> Result<Task, ClientError> {
        let request = Self::with_body(
            ApiRequest::new(Method::Put, format!("/tasks/{}/status", id)),
            &json!({ "status": status }),
        )?;
        self.execute(request, Credential::Access).await
    }

    pub async fn update_task_priority(
        &self,
        id: i64,
        priority: TaskPriority,
    ) -> Result<Task, ClientError> {
        let request = Self::with_body(
            ApiRequest::new(Method::Put, format!("/tasks/{}/priority", id)),
            &json!({ "priority": priority }),
        )?;
        self.execute(request, Credential::Access).await
    }

    pub async fn assign_user_to_task(&self, task_id: i64, user_id: i64) -> Result<Task, ClientError> {
        let request = ApiRequest::new(
            Method::Post,
            format!("/tasks/{}/assign/{}", task_id, user_id),
        );
        self.execute(request, Credential::Access).await
    }

    pub async fn unassign_user_from_task(
        &self,
        task_id: i64,
        user_id: i64,
    ) -> Result<Task, ClientError> {
        let request = ApiRequest::new(
            Method::Delete,
            format!("/tasks/{}/unassign/{}", task_id, user_id),
        );
        self.execute(request, Credential::Access).await
    }

    pub async fn get_users(&self, filters: &UserQuery) -> Result<Vec<User>, ClientError> {
        let request = Self::with_query(ApiRequest::new(Method::Get, "/users"), filters)?;
        self.execute(request, Credential::Access).await
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<User, ClientError> {
        self.execute(ApiRequest::new(Method::Get, format!("/users/{}", id)), Credential::Access)
            .await
    }

    pub async fn create_user(&self, input: &UserInput) -> Result<User, ClientError> {
        let request = Self::with_body(ApiRequest::new(Method::Post, "/users"), input)?;
        self.execute(request, Credential::Access).await
    }

    pub async fn update_user(&self, id: i64, input: &UserInput) -> Result<User, ClientError> {
        let request = Self::with_body(ApiRequest::new(Method::Put, format!("/users/{}", id)), input)?;
        self.execute(request, Credential::Access).await
    }
}

/// 401/403 on an auth endpoint means the credentials themselves were refused.
fn reject_unauthorized(error: ClientError) -> ClientError {
    match error {
        ClientError::Request(err) if err.is_unauthorized() => {
            ClientError::Auth(AuthError::Rejected(err))
        }
        other => other,
    }
}

/// Flattens a serializable filter struct into query pairs, dropping unset fields.
fn query_pairs<Q: Serialize>(query: &Q) -> Result<Vec<(String, String)>, ClientError> {
    let value = serde_json::to_value(query)?;
    let Value::Object(fields) = value else {
        return Ok(Vec::new());
    };
    Ok(fields
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}
