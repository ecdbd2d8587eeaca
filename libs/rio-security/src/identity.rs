use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// `Identity` is the principal resolved by the credential adapter for a single
/// validation call.
///
/// It is produced from either a bearer token or a cookie session and is never
/// persisted by the gate; the identity provider owns persistence.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    /// Provider-assigned unique user ID.
    id: Uuid,
    /// Primary email address of the principal.
    email: String,
    /// Metadata attached by the provider (role list, admin flag, anything else).
    /// Kept as raw JSON so that malformed legacy values never fail a validation.
    #[serde(default)]
    metadata: Map<String, Value>,
    /// When the session (or token) backing this identity expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Create a new `Identity` builder
    #[must_use]
    pub fn builder() -> IdentityBuilder {
        IdentityBuilder::default()
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Raw metadata map as attached by the provider.
    #[must_use]
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the backing session is past its expiry at `now`.
    ///
    /// An identity without an expiry timestamp never expires from the gate's
    /// point of view; the provider is then the only judge.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Default)]
pub struct IdentityBuilder {
    id: Option<Uuid>,
    email: Option<String>,
    metadata: Map<String, Value>,
    expires_at: Option<DateTime<Utc>>,
}

impl IdentityBuilder {
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set a single metadata entry, replacing any previous value under `key`.
    #[must_use]
    pub fn metadata_entry(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_owned(), value);
        self
    }

    #[must_use]
    pub fn roles<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = roles
            .into_iter()
            .map(|r| Value::String(r.into()))
            .collect::<Vec<_>>();
        self.metadata_entry("roles", Value::Array(roles))
    }

    #[must_use]
    pub fn admin_flag(self, is_admin: bool) -> Self {
        self.metadata_entry("is_admin", Value::Bool(is_admin))
    }

    #[must_use]
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    #[must_use]
    pub fn build(self) -> Identity {
        Identity {
            id: self.id.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            metadata: self.metadata,
            expires_at: self.expires_at,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_identity_builder_full() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();
        let exp = Utc::now() + Duration::hours(1);

        let identity = Identity::builder()
            .id(id)
            .email("ops@example.com")
            .roles(["admin", "viewer"])
            .admin_flag(false)
            .expires_at(exp)
            .build();

        assert_eq!(identity.id(), id);
        assert_eq!(identity.email(), "ops@example.com");
        assert_eq!(identity.metadata()["roles"], json!(["admin", "viewer"]));
        assert_eq!(identity.metadata()["is_admin"], json!(false));
        assert_eq!(identity.expires_at(), Some(exp));
    }

    #[test]
    fn test_identity_builder_minimal() {
        let identity = Identity::builder().build();

        assert_eq!(identity.id(), Uuid::default());
        assert!(identity.email().is_empty());
        assert!(identity.metadata().is_empty());
        assert!(identity.expires_at().is_none());
    }

    #[test]
    fn test_identity_expiry() {
        let now = Utc::now();
        let live = Identity::builder()
            .expires_at(now + Duration::minutes(5))
            .build();
        let stale = Identity::builder()
            .expires_at(now - Duration::seconds(1))
            .build();
        let unbounded = Identity::builder().build();

        assert!(!live.is_expired_at(now));
        assert!(stale.is_expired_at(now));
        assert!(!unbounded.is_expired_at(now));
    }

    #[test]
    fn test_identity_deserialize_without_metadata() {
        let identity: Identity = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440001",
            "email": "a@example.com"
        }))
        .unwrap();

        assert!(identity.metadata().is_empty());
        assert!(identity.expires_at().is_none());
    }
}
