//! Hub configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Environment variable selecting the [`DeliveryPolicy`].
pub const DELIVERY_ENV: &str = "DRIVER_EVENTS_DELIVERY";

/// Environment variable selecting the [`DuplicatePolicy`].
pub const DUPLICATES_ENV: &str = "DRIVER_EVENTS_DUPLICATES";

/// What happens when a listener fails during a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryPolicy {
    /// Stop at the first failing listener and return its error.
    /// Listeners registered after it do not see the event.
    #[default]
    FailFast,
    /// Invoke every listener, then return all failures together.
    Isolate,
}

impl DeliveryPolicy {
    /// The configuration spelling of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryPolicy::FailFast => "fail-fast",
            DeliveryPolicy::Isolate => "isolate",
        }
    }
}

impl FromStr for DeliveryPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" => Ok(DeliveryPolicy::FailFast),
            "isolate" => Ok(DeliveryPolicy::Isolate),
            _ => Err(ConfigError::UnknownValue {
                setting: "delivery policy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DeliveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when the same subscriber instance is subscribed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Register it again; it is invoked once per registration.
    #[default]
    Allow,
    /// Refuse with [`HubError::DuplicateSubscriber`](crate::HubError::DuplicateSubscriber).
    Reject,
}

impl DuplicatePolicy {
    /// The configuration spelling of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Allow => "allow",
            DuplicatePolicy::Reject => "reject",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(DuplicatePolicy::Allow),
            "reject" => Ok(DuplicatePolicy::Reject),
            _ => Err(ConfigError::UnknownValue {
                setting: "duplicate policy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for an [`EventHub`](crate::EventHub).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Listener failure handling.
    pub delivery: DeliveryPolicy,

    /// Repeated subscription handling.
    pub duplicates: DuplicatePolicy,
}

impl HubConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DRIVER_EVENTS_DELIVERY`: `fail-fast` or `isolate` (default: fail-fast)
    /// - `DRIVER_EVENTS_DUPLICATES`: `allow` or `reject` (default: allow)
    ///
    /// Unrecognized values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            delivery: policy_or_default(DELIVERY_ENV, lookup(DELIVERY_ENV)),
            duplicates: policy_or_default(DUPLICATES_ENV, lookup(DUPLICATES_ENV)),
        }
    }

    /// Set the delivery policy.
    #[must_use]
    pub fn with_delivery(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }

    /// Set the duplicate policy.
    #[must_use]
    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}

fn policy_or_default<P>(key: &str, value: Option<String>) -> P
where
    P: FromStr<Err = ConfigError> + Default,
{
    let Some(value) = value else {
        return P::default();
    };
    value.parse().unwrap_or_else(|err| {
        warn!(key, error = %err, "Ignoring invalid setting, using default");
        P::default()
    })
}
