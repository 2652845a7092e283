use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Roles that take part in the consultation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Attendant,
    Nurse,
    Doctor,
    Admin,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Attendant => "attendant",
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
            Role::System => "system",
        }
    }

    /// Clinical and administrative staff, i.e. anyone who is not a patient.
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Patient)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "attendant" | "receptionist" => Ok(Role::Attendant),
            "nurse" => Ok(Role::Nurse),
            "doctor" => Ok(Role::Doctor),
            "admin" | "supervisor" => Ok(Role::Admin),
            "system" => Ok(Role::System),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// The caller of a workflow operation. Passed explicitly into every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn system() -> Self {
        Self { id: Uuid::nil(), role: Role::System }
    }

    /// Resolve the actor from an authenticated user. The `role` claim wins;
    /// Supabase issues `authenticated` there, so `user_metadata.role` is
    /// consulted as a fallback.
    pub fn from_user(user: &User) -> Result<Self, AppError> {
        let id = Uuid::parse_str(&user.id)
            .map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))?;

        let claimed = user
            .role
            .as_deref()
            .and_then(|r| r.parse::<Role>().ok());

        let from_metadata = || {
            user.metadata
                .as_ref()
                .and_then(|m| m.get("role"))
                .and_then(|r| r.as_str())
                .and_then(|r| r.parse::<Role>().ok())
        };

        let role = claimed
            .or_else(from_metadata)
            .ok_or_else(|| AppError::Forbidden("User has no workflow role".to_string()))?;

        Ok(Self { id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(role: Option<&str>, metadata: Option<serde_json::Value>) -> User {
        User {
            id: Uuid::new_v4().to_string(),
            email: None,
            role: role.map(str::to_string),
            metadata,
            created_at: None,
        }
    }

    #[test]
    fn role_aliases_map_to_workflow_roles() {
        assert_eq!("receptionist".parse::<Role>().unwrap(), Role::Attendant);
        assert_eq!("Supervisor".parse::<Role>().unwrap(), Role::Admin);
        assert!("hairdresser".parse::<Role>().is_err());
    }

    #[test]
    fn actor_falls_back_to_metadata_role() {
        let u = user(Some("authenticated"), Some(json!({ "role": "nurse" })));
        let actor = Actor::from_user(&u).unwrap();
        assert_eq!(actor.role, Role::Nurse);
    }

    #[test]
    fn actor_without_role_is_forbidden() {
        let u = user(None, None);
        assert!(matches!(Actor::from_user(&u), Err(AppError::Forbidden(_))));
    }
}
