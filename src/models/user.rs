use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user's role. Serialized with the API's wire names; `FromStr` also accepts slugs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "Desarrollador")]
    Developer,
    #[serde(rename = "Líder Técnico")]
    TechLead,
    #[serde(rename = "Administrador")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Developer, Role::TechLead, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Developer => "Desarrollador",
            Role::TechLead => "Líder Técnico",
            Role::Admin => "Administrador",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::TechLead => "tech_lead",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.slug() == s || role.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown role {:?} (expected developer, tech_lead or admin)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Payload for creating or updating a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    // Required by the server on create, optional on update.
    #[validate(length(min = 6))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Filters accepted by `GET /users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
