//! HTTP transport for SOAP envelopes.
//!
//! Each call is a single POST with no retries. The client is built without
//! proxy support, and reqwest never sends `Expect: 100-continue`, so headers
//! and body always go out together.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::config::ClientConfig;
use crate::error::OtrsError;
use crate::templates::EnvelopeKind;

/// Content type for SOAP 1.2 requests.
const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

/// Scheme used for every connector endpoint.
const ENDPOINT_SCHEME: &str = "http://";

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Sends SOAP envelopes to a GenericTicketConnector endpoint.
#[derive(Debug, Clone)]
pub struct SoapTransport {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    namespace: String,

    connector_path: String,

    timeout: Duration,
}

impl SoapTransport {
    /// Creates a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &ClientConfig) -> Result<Self, OtrsError> {
        let http = Client::builder()
            .no_proxy()
            .timeout(config.timeout())
            .build()
            .map_err(OtrsError::HttpClient)?;

        Ok(Self {
            http,
            namespace: config.namespace().to_string(),
            connector_path: config.connector_path().to_string(),
            timeout: config.timeout(),
        })
    }

    /// Builds the endpoint URL for `host`.
    ///
    /// `host` may carry a port (`otrs.example.com:8080`). Anything that would
    /// change the path, add credentials, a query or a fragment is rejected.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::InvalidArgument` for an empty or malformed host.
    pub fn endpoint_url(&self, host: &str) -> Result<Url, OtrsError> {
        if host.trim().is_empty() {
            return Err(OtrsError::empty_argument("host_name"));
        }
        if host.contains(['/', '?', '#', '@', '\\']) || host.chars().any(char::is_whitespace) {
            return Err(OtrsError::invalid_argument(
                "host_name",
                format!("{:?} is not a plain host name", host),
            ));
        }

        let raw = format!("{}{}{}", ENDPOINT_SCHEME, host, self.connector_path);
        let url = Url::parse(&raw).map_err(|e| {
            OtrsError::invalid_argument("host_name", format!("{:?} is not a valid host: {}", host, e))
        })?;

        if url.host_str().is_none() || url.path() != self.connector_path {
            return Err(OtrsError::invalid_argument(
                "host_name",
                format!("{:?} is not a plain host name", host),
            ));
        }

        Ok(url)
    }

    /// `SOAPAction` header value for `kind`.
    pub fn soap_action(&self, kind: EnvelopeKind) -> String {
        format!("{}#{}", self.namespace, kind.action())
    }

    /// POSTs `envelope` to `endpoint` and returns the response body.
    ///
    /// `secrets` are redacted from any error body kept in the returned error.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::Timeout`, `OtrsError::Http` or
    /// `OtrsError::HttpStatus` for network and HTTP-level failures.
    pub async fn send(
        &self,
        endpoint: &Url,
        kind: EnvelopeKind,
        envelope: String,
        secrets: &[&str],
    ) -> Result<String, OtrsError> {
        tracing::debug!(
            action = kind.action(),
            host = endpoint.host_str().unwrap_or_default(),
            "Sending SOAP request"
        );

        let response = self
            .http
            .post(endpoint.clone())
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", self.soap_action(kind))
            .body(envelope)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, kind))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = OtrsError::sanitize_message(&body, secrets);
            let body = truncate(body);
            tracing::warn!(action = kind.action(), status = %status, "SOAP request failed");
            return Err(OtrsError::HttpStatus { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e, kind))?;

        tracing::trace!(action = kind.action(), body = %OtrsError::sanitize_message(&body, secrets), "SOAP response");

        Ok(body)
    }

    fn map_send_error(&self, e: reqwest::Error, kind: EnvelopeKind) -> OtrsError {
        if e.is_timeout() {
            return OtrsError::Timeout {
                duration: self.timeout,
                action: kind.action().to_string(),
            };
        }
        OtrsError::Http(e.without_url())
    }
}

fn truncate(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body;
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
