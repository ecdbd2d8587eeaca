//! Provider REST payloads and their mapping to [`Identity`].

use chrono::{DateTime, Utc};
use rio_security::Identity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

impl UserResponse {
    pub fn into_identity(self, expires_at: Option<DateTime<Utc>>) -> Identity {
        let metadata = merge_metadata(self.user_metadata, self.app_metadata);
        let builder = Identity::builder()
            .id(self.id)
            .email(self.email.unwrap_or_default())
            .metadata(metadata);
        match expires_at {
            Some(exp) => builder.expires_at(exp).build(),
            None => builder.build(),
        }
    }
}

impl TokenResponse {
    pub fn expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| now + chrono::Duration::seconds(secs))
            })
            .or_else(|| crate::jwt::expiry(&self.access_token))
    }
}

/// Merge user and app metadata. App metadata wins on plain keys, role lists
/// are unioned, and an admin flag in either source survives.
fn merge_metadata(user: Map<String, Value>, app: Map<String, Value>) -> Map<String, Value> {
    let mut roles: Vec<String> = Vec::new();
    let mut is_admin = false;
    for source in [&user, &app] {
        for role in role_list(source.get("roles")) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        is_admin |= matches!(source.get("is_admin"), Some(Value::Bool(true)));
    }

    let mut merged = user;
    merged.extend(app);
    if roles.is_empty() {
        merged.remove("roles");
    } else {
        merged.insert(
            "roles".to_owned(),
            Value::Array(roles.into_iter().map(Value::String).collect()),
        );
    }
    if is_admin {
        merged.insert("is_admin".to_owned(), Value::Bool(true));
    }
    merged
}

fn role_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        Some(Value::String(role)) => vec![role.clone()],
        _ => Vec::new(),
    }
}
