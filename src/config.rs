//! Client configuration.
//!
//! `ClientConfig` is an immutable value handed to the client at construction.
//! Once a client is built, every call it makes observes the same namespace,
//! connector path and timeout.

use std::time::Duration;

use serde::Deserialize;

use crate::error::OtrsError;

/// Namespace of the OTRS GenericTicketConnector web service.
pub const DEFAULT_NAMESPACE: &str = "http://www.otrs.org/TicketConnector/";

/// Path of the GenericTicketConnector on an OTRS host.
pub const DEFAULT_CONNECTOR_PATH: &str =
    "/otrs/nph-genericinterface.pl/Webservice/GenericTicketConnector";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for talking to an OTRS GenericTicketConnector.
///
/// Fields are private; build one with [`ClientConfig::default`] and the
/// `with_*` setters, or deserialize it from the embedding application's
/// own configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    namespace: String,
    connector_path: String,
    #[serde(rename = "timeout_secs", deserialize_with = "deserialize_secs")]
    timeout: Duration,
    strict_leaves: bool,
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            connector_path: DEFAULT_CONNECTOR_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strict_leaves: false,
        }
    }
}

impl ClientConfig {
    /// Sets the XML namespace shared by requests and responses.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the connector path appended to the host.
    pub fn with_connector_path(mut self, path: impl Into<String>) -> Self {
        self.connector_path = path.into();
        self
    }

    /// Sets the timeout for one full request/response round trip.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// When enabled, a template lacking a required leaf fails the call
    /// instead of being sent with that leaf skipped.
    pub fn with_strict_leaves(mut self, strict: bool) -> Self {
        self.strict_leaves = strict;
        self
    }

    /// The XML namespace URI.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The connector path, always starting with `/`.
    pub fn connector_path(&self) -> &str {
        &self.connector_path
    }

    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether missing template leaves are fatal.
    pub fn strict_leaves(&self) -> bool {
        self.strict_leaves
    }

    /// Checks that the configuration can produce valid requests.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::Config` if the namespace is empty or contains `#`
    /// (it is joined with the action name by `#` in the SOAPAction header),
    /// if the connector path does not start with `/`, or if the timeout is zero.
    pub fn validate(&self) -> Result<(), OtrsError> {
        if self.namespace.trim().is_empty() {
            return Err(OtrsError::invalid_config("namespace must not be empty"));
        }
        if self.namespace.contains('#') {
            return Err(OtrsError::invalid_config("namespace must not contain '#'"));
        }
        if !self.connector_path.starts_with('/') {
            return Err(OtrsError::invalid_config(
                "connector_path must start with '/'",
            ));
        }
        if self.timeout.is_zero() {
            return Err(OtrsError::invalid_config("timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(config.connector_path(), DEFAULT_CONNECTOR_PATH);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.strict_leaves());
    }

    #[test]
    fn test_validate_rejects_empty_namespace() {
        let config = ClientConfig::default().with_namespace("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_hash_in_namespace() {
        let config = ClientConfig::default().with_namespace("urn:x#y");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains('#'));
    }

    #[test]
    fn test_validate_requires_leading_slash() {
        let config = ClientConfig::default().with_connector_path("otrs/connector");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_config_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"timeout_secs": 5, "strict_leaves": true}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.strict_leaves());
        assert_eq!(config.namespace(), DEFAULT_NAMESPACE);
    }
}
