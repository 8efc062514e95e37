//! Command-line front end for the TaskForge client.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{debug, error};
use serde::Serialize;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;

use taskforge_client::auth::SessionManager;
use taskforge_client::models::{Role, TaskInput, TaskPriority, TaskQuery, TaskStatus, UserQuery};
use taskforge_client::notifications::{NotificationQueue, Severity};
use taskforge_client::routes::{Route, Router};
use taskforge_client::storage::FileStorage;
use taskforge_client::{ApiClient, AuthStore, ClientConfig, ClientError, HttpTransport, TaskStore, UserStore};

/// TaskForge CLI
#[derive(Parser)]
#[command(name = "taskforge")]
#[command(about = "Command-line client for the TaskForge task API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: String,
    },
    /// Forget the persisted session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// List tasks
    Tasks {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Only tasks assigned to this user
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Show one task
    Task { id: i64 },
    /// Create a task
    CreateTask {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
    },
    /// Change a task's status
    SetStatus { id: i64, status: TaskStatus },
    /// Change a task's priority
    SetPriority { id: i64, priority: TaskPriority },
    /// Assign a user to a task
    Assign { task_id: i64, user_id: i64 },
    /// Remove a user from a task
    Unassign { task_id: i64, user_id: i64 },
    /// List users
    Users {
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one user
    User { id: i64 },
    /// Show where navigating to a path would land with the current session
    Navigate { path: String },
}

impl Commands {
    /// The view each command corresponds to, checked against the route guard before any request.
    fn view_path(&self) -> Option<String> {
        match self {
            Commands::Tasks { .. } => Some("/tasks".to_string()),
            Commands::Task { id } => Some(format!("/tasks/{}", id)),
            Commands::CreateTask { .. } => Some("/tasks/new".to_string()),
            Commands::SetStatus { id, .. }
            | Commands::SetPriority { id, .. }
            | Commands::Assign { task_id: id, .. }
            | Commands::Unassign { task_id: id, .. } => Some(format!("/tasks/{}/edit", id)),
            Commands::Users { .. } => Some("/users".to_string()),
            Commands::User { id } => Some(format!("/users/{}/edit", id)),
            _ => None,
        }
    }
}

struct App {
    session: SessionManager,
    auth: AuthStore,
    tasks: TaskStore,
    users: UserStore,
    notifications: NotificationQueue,
}

impl App {
    fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::from_config(config)?);
        let storage = Arc::new(FileStorage::new(&config.session_file));
        debug!(
            "API at {}, session in {}",
            transport.base_url(),
            storage.path().display()
        );
        let api = ApiClient::new(transport, storage);
        let session = SessionManager::new(api.clone());
        Ok(Self {
            auth: AuthStore::new(session.clone()),
            tasks: TaskStore::new(api.clone()),
            users: UserStore::new(api),
            session,
            notifications: NotificationQueue::new(),
        })
    }

    async fn run(&mut self, command: Commands) -> Result<(), ClientError> {
        if let Some(view) = command.view_path() {
            if Router::new(&self.session).resolve(&view) == Route::Login {
                self.notifications
                    .error("Not logged in. Run `taskforge login` first.");
                return Ok(());
            }
        }

        match command {
            Commands::Login { email, password } => {
                let response = self.auth.login(&email, &password).await?;
                self.notifications
                    .success(format!("Logged in as {}", response.user.name));
                print_json(&response.user)
            }
            Commands::Logout => {
                self.auth.logout();
                self.notifications.success("Logged out");
                Ok(())
            }
            Commands::Whoami => match self.session.current_user() {
                Some(user) => {
                    let expires_at = self
                        .session
                        .access_claims()
                        .and_then(|claims| claims.expires_at());
                    print_json(&json!({ "user": user, "token_expires_at": expires_at }))
                }
                None => {
                    self.notifications.info("Not logged in");
                    Ok(())
                }
            },
            Commands::Refresh => {
                self.auth.refresh_token().await?;
                self.notifications.success("Access token refreshed");
                Ok(())
            }
            Commands::Tasks {
                status,
                priority,
                user_id,
            } => {
                let filters = TaskQuery {
                    status,
                    priority,
                    user_id,
                    ..Default::default()
                };
                print_json(&self.tasks.fetch_tasks(&filters).await?)
            }
            Commands::Task { id } => print_json(&self.tasks.fetch_task_by_id(id).await?),
            Commands::CreateTask {
                title,
                description,
                priority,
            } => {
                let input = TaskInput {
                    title,
                    description,
                    priority,
                    ..Default::default()
                };
                let task = self.tasks.create_task(&input).await?;
                self.notifications
                    .success(format!("Created task {}", task.id));
                print_json(&task)
            }
            Commands::SetStatus { id, status } => {
                print_json(&self.tasks.update_task_status(id, status).await?)
            }
            Commands::SetPriority { id, priority } => {
                print_json(&self.tasks.update_task_priority(id, priority).await?)
            }
            Commands::Assign { task_id, user_id } => {
                print_json(&self.tasks.assign_user_to_task(task_id, user_id).await?)
            }
            Commands::Unassign { task_id, user_id } => {
                print_json(&self.tasks.unassign_user_from_task(task_id, user_id).await?)
            }
            Commands::Users { role, search } => {
                let filters = UserQuery { role, search };
                print_json(&self.users.fetch_users(&filters).await?)
            }
            Commands::User { id } => print_json(&self.users.fetch_user_by_id(id).await?),
            Commands::Navigate { path } => {
                let mut router = Router::new(&self.session);
                let route = router.navigate(&path);
                println!("{} -> {} ({})", path, route.path(), route.name());
                Ok(())
            }
        }
    }

    /// Prints queued notifications to stderr; returns whether any of them was an error.
    /// Message recorded by whichever store ran the failed action.
    fn failure_message(&self, err: &ClientError) -> String {
        self.auth
            .error()
            .or_else(|| self.tasks.error())
            .or_else(|| self.users.error())
            .map(str::to_string)
            .unwrap_or_else(|| err.user_message("Request failed"))
    }

    fn flush_notifications(&self) -> bool {
        let mut failed = false;
        for notification in self.notifications.list() {
            failed |= notification.severity == Severity::Error;
            eprintln!(
                "[{}] {}",
                format!("{:?}", notification.severity).to_lowercase(),
                notification.message
            );
        }
        self.notifications.clear();
        failed
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut app = match App::from_config(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = app.run(cli.command).await {
        error!("{}", e);
        let message = app.failure_message(&e);
        app.notifications.error(message);
    }

    if app.flush_notifications() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
