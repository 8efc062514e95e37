#![doc = "The `taskforge-client` library crate."]
#![doc = ""]
#![doc = "Client-side state and navigation for the TaskForge API: the authentication token"]
#![doc = "lifecycle, entity stores for tasks and users, an auto-expiring notification queue,"]
#![doc = "and the route table with its authentication guard. All persistence is delegated to"]
#![doc = "the remote API through a typed `ApiClient`."]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notifications;
pub mod routes;
pub mod storage;
pub mod stores;

pub use api::{ApiClient, HttpTransport, Transport};
pub use auth::SessionManager;
pub use config::ClientConfig;
pub use error::{AuthError, ClientError, RequestError};
pub use notifications::NotificationQueue;
pub use routes::{Route, Router};
pub use stores::{AuthStore, TaskStore, UserStore};
