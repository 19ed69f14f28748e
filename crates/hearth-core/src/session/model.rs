//! Session domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Role attached to an identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// Snapshot of who is logged in.
///
/// Replaced wholesale on each login and destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Login identifier for directory logins, generated UUID for signups.
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Creates the minimal record produced by a directory login.
    pub fn minimal(id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            email: None,
            company: None,
            date_of_birth: None,
            address: None,
            created_at: None,
            last_login: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields accepted by signup.
///
/// `email` and `password` are required; everything else is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
}

impl SignupRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }
}

/// The two lifecycle states of the session store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(SessionRecord),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            Self::Authenticated(record) => Some(record),
            Self::Anonymous => None,
        }
    }
}

/// Result of `load_session`, shaped for collaborators that only need a flag
/// and the record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadedSession {
    pub authenticated: bool,
    pub record: Option<SessionRecord>,
}

impl From<SessionState> for LoadedSession {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Authenticated(record) => Self {
                authenticated: true,
                record: Some(record),
            },
            SessionState::Anonymous => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_record_json_omits_absent_fields() {
        let record = SessionRecord::minimal("admin", "Admin User", Role::Admin);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"id":"admin","displayName":"Admin User","role":"admin"}"#
        );
    }

    #[test]
    fn test_loaded_session_from_state() {
        let record = SessionRecord::minimal("u1", "U", Role::User);
        let loaded = LoadedSession::from(SessionState::Authenticated(record.clone()));
        assert!(loaded.authenticated);
        assert_eq!(loaded.record, Some(record));
        assert_eq!(LoadedSession::from(SessionState::Anonymous), LoadedSession::default());
    }
}
