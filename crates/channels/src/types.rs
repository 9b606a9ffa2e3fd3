use std::fmt;

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// Opaque identifier naming a platform or local channel kind.
///
/// Compared by value; the registry is the only authority on which types
/// exist at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelType(String);

impl ChannelType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ChannelType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A bot's binding to one channel instance, owned by the external store.
///
/// The orchestrator only reads configs; `updated_at` is the version clock
/// used to detect changes that require a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub bot_id: String,
    pub channel_type: ChannelType,
    /// Platform-specific credential payload, normalized by the adapter
    /// before persistence.
    pub credentials: serde_json::Value,
    /// Platform-side identity of the bot (e.g. bot username), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_identity: Option<String>,
    /// Lifecycle status: `pending`, `active`, `verified`, or other. Blank
    /// is treated as active for backward compatibility.
    #[serde(default)]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChannelConfig {
    /// Whether this config is eligible to run an inbound connection.
    #[must_use]
    pub fn is_startable(&self) -> bool {
        let status = self.status.trim().to_lowercase();
        status.is_empty() || status == "active" || status == "verified"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn config_with_status(status: &str) -> ChannelConfig {
        ChannelConfig {
            id: "c1".into(),
            bot_id: "b1".into(),
            channel_type: "telegram".into(),
            credentials: serde_json::json!({}),
            external_identity: None,
            status: status.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("active", true)]
    #[case("verified", true)]
    #[case("  Active ", true)]
    #[case("", true)]
    #[case("   ", true)]
    #[case("pending", false)]
    #[case("disabled", false)]
    fn startable_statuses(#[case] status: &str, #[case] startable: bool) {
        assert_eq!(config_with_status(status).is_startable(), startable);
    }

    #[test]
    fn channel_type_round_trips_as_plain_string() {
        let t = ChannelType::new("telegram");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"telegram\"");
        let back: ChannelType = serde_json::from_str("\"telegram\"").unwrap();
        assert_eq!(back, t);
    }
}
