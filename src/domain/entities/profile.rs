use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Member identity record maintained by the external auth/provisioning flow.
/// The feed consumes it read-only to attach display metadata to posts and
/// comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub member_status: String,
}

impl Profile {
    pub fn new(user_id: String, email: String, display_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            email,
            display_name,
            role: Role::Member,
            member_status: "active".to_string(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Author display metadata joined onto posts and comments at read time.
/// `display_name`/`email` stay `None` when no profile row exists for the
/// author id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Author {
    pub fn from_user_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            email: None,
        }
    }

    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}
