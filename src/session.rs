//! Session context for the logged-in operator.
//!
//! The context is owned by the application state and handed explicitly to
//! whatever needs the token. Transitions:
//!
//! - `install` (login succeeded) -> Active
//! - `merge_profile` (account update succeeded) -> Active, token unchanged
//! - `invalidate` (401 from any endpoint, or logout) -> Anonymous
//!
//! Each transition bumps `epoch`, so results of requests issued under an older
//! session can be recognized.

use serde::{Deserialize, Serialize};

/// User record as returned by the login endpoint and sent on account updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub admin: bool,
}

// The backend sends numeric ids; the console treats all ids as strings.
fn id_as_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Editable account fields submitted from the account form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFields {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
}

impl AccountFields {
    pub fn from_session(data: &SessionData) -> Self {
        Self {
            username: data.username.clone(),
            password: String::new(),
            email: data.email.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            organization: data.organization.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err("Username or password cannot be empty".to_string());
        }
        Ok(())
    }

    /// Request body for the user update endpoint.
    pub fn to_update_body(&self, current: &SessionData) -> serde_json::Value {
        let id = current
            .id
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::from(current.id.clone()));
        serde_json::json!({
            "user": {
                "username": self.username,
                "password": self.password,
                "email": self.email,
                "first_name": self.first_name,
                "last_name": self.last_name,
                "organization": self.organization,
                "id": id,
                "admin": current.admin,
                "salt": "",
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    data: Option<SessionData>,
    epoch: u64,
}

impl SessionContext {
    pub fn data(&self) -> Option<&SessionData> {
        self.data.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.token.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.data.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn install(&mut self, data: SessionData) {
        self.data = Some(data);
        self.epoch += 1;
    }

    /// Drop the session. Returns true if there was one to drop; the epoch
    /// only moves when a token actually goes away.
    pub fn invalidate(&mut self) -> bool {
        let dropped = self.data.take().is_some();
        if dropped {
            self.epoch += 1;
        }
        dropped
    }

    /// Merge submitted account fields; the token and admin flag are kept, so
    /// requests already in flight still belong to this session.
    pub fn merge_profile(&mut self, fields: &AccountFields) -> bool {
        let Some(d) = self.data.as_mut() else {
            return false;
        };
        d.username = fields.username.clone();
        d.email = fields.email.clone();
        d.first_name = fields.first_name.clone();
        d.last_name = fields.last_name.clone();
        d.organization = fields.organization.clone();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionData {
        SessionData {
            token: "tok".into(),
            username: "admin".into(),
            email: "a@b".into(),
            id: "7".into(),
            admin: true,
            ..Default::default()
        }
    }

    #[test]
    fn install_merge_and_invalidate_transitions() {
        let mut s = SessionContext::default();
        assert!(s.token().is_none());
        s.install(sample());
        assert_eq!(s.token(), Some("tok"));
        let e1 = s.epoch();

        let mut fields = AccountFields::from_session(s.data().unwrap());
        fields.email = "new@b".into();
        fields.password = "pw".into();
        assert!(s.merge_profile(&fields));
        assert_eq!(s.data().unwrap().email, "new@b");
        assert_eq!(s.token(), Some("tok"));
        assert!(s.data().unwrap().admin);
        assert_eq!(s.epoch(), e1);

        assert!(s.invalidate());
        assert!(!s.is_active());
        let e2 = s.epoch();
        assert!(e2 > e1);
        assert!(!s.invalidate());
        assert_eq!(s.epoch(), e2);
    }

    #[test]
    fn merge_without_session_is_rejected() {
        let mut s = SessionContext::default();
        assert!(!s.merge_profile(&AccountFields::default()));
    }

    #[test]
    fn numeric_ids_deserialize_as_strings() {
        let d: SessionData =
            serde_json::from_str(r#"{"token":"t","username":"u","id":12,"admin":false}"#).unwrap();
        assert_eq!(d.id, "12");
    }

    #[test]
    fn account_fields_require_username_and_password() {
        let mut f = AccountFields::from_session(&sample());
        assert!(f.validate().is_err());
        f.password = "secret".into();
        assert!(f.validate().is_ok());
        let body = f.to_update_body(&sample());
        assert_eq!(body["user"]["id"], 7);
        assert_eq!(body["user"]["salt"], "");
    }
}
