use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;
use crate::entities::people;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Undefined,
    Admin,
    Teacher,
    Student,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "UNDEFINED",
            Self::Admin => "ADMIN",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "UNDEFINED" => Ok(Self::Undefined),
            "ADMIN" => Ok(Self::Admin),
            "TEACHER" => Ok(Self::Teacher),
            "STUDENT" => Ok(Self::Student),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Canonical stored form of an email address: surrounding whitespace removed.
#[must_use]
pub fn normalize_email(email: &str) -> &str {
    email.trim()
}

/// Public view of an account. Credentials never leave the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<people::Model> for Person {
    fn from(model: people::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            role: model.role.parse().unwrap_or_default(),
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPerson {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

/// Profile fields that may be changed after registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl PersonChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none()
    }
}
