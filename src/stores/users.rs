use validator::Validate;

use super::{EntityState, StoreStatus};
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{User, UserInput, UserQuery};

/// Same shape as the task store: listed users, the user being viewed or edited, request status.
#[derive(Debug)]
pub struct UserStore {
    api: ApiClient,
    state: EntityState<User>,
}

impl UserStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: EntityState::default(),
        }
    }

    pub fn users(&self) -> &[User] {
        self.state.items()
    }

    /// The selected user. Unrelated to the logged-in user, which the session manager owns.
    pub fn current_user(&self) -> Option<&User> {
        self.state.current()
    }

    pub fn status(&self) -> &StoreStatus {
        self.state.status()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub async fn fetch_users(&mut self, filters: &UserQuery) -> Result<Vec<User>, ClientError> {
        let api = &self.api;
        let users = self
            .state
            .status_mut()
            .track("Failed to fetch users", api.get_users(filters))
            .await?;
        self.state.replace_all(users.clone());
        Ok(users)
    }

    pub async fn fetch_user_by_id(&mut self, id: i64) -> Result<User, ClientError> {
        let api = &self.api;
        let user = self
            .state
            .status_mut()
            .track("Failed to fetch user", api.get_user_by_id(id))
            .await?;
        self.state.select(user.clone());
        Ok(user)
    }

    pub async fn create_user(&mut self, input: &UserInput) -> Result<User, ClientError> {
        let api = &self.api;
        let user = self
            .state
            .status_mut()
            .track("Failed to create user", async {
                input.validate()?;
                api.create_user(input).await
            })
            .await?;
        self.state.append(user.clone());
        Ok(user)
    }

    pub async fn update_user(&mut self, id: i64, input: &UserInput) -> Result<User, ClientError> {
        let api = &self.api;
        let user = self
            .state
            .status_mut()
            .track("Failed to update user", async {
                input.validate()?;
                api.update_user(id, input).await
            })
            .await?;
        self.state.replace(id, user.clone());
        Ok(user)
    }
}
