use serde::{Deserialize, Serialize};

use super::session::Role;

/// Identity payload returned by the profile endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    #[serde(deserialize_with = "crate::utils::value::string_or_number")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

impl UserProfile {
    /// The role as a known tier, if the server sent one we understand.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// Input to account registration.
#[derive(Serialize, Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Registration {
    /// New registration with the default `user` role.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Registration {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: Role::User,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
