//! Client for the OTRS GenericTicketConnector.
//!
//! This module provides `OtrsClient`, the public entry point. Every
//! operation is a single pass: validate arguments, fill a fresh template,
//! POST it, interpret the response. Nothing is cached between calls and
//! nothing is retried.
//!
//! # Security
//!
//! Passwords and session identifiers are never logged and are redacted from
//! HTTP error bodies.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::envelope::{format_time_unit, LeafScope, PreparedEnvelope};
use crate::error::OtrsError;
use crate::response::{interpret, ArticleId, FromLeafText, SessionId};
use crate::templates::{load_template, BundledTemplates, EnvelopeKind, TemplateSource};
use crate::transport::SoapTransport;

/// Client for the OTRS GenericTicketConnector SOAP service.
///
/// Cloning is cheap and clones share nothing mutable, so one client can
/// serve many concurrent calls.
///
/// # Example
///
/// ```ignore
/// let client = OtrsClient::new(ClientConfig::default())?;
///
/// let session = client
///     .create_session("agent", "secret", "otrs.example.com")
///     .await?;
/// let article = client
///     .update_ticket(session.as_str(), "2024010110000012", "Fixed printer", 0.5, "otrs.example.com")
///     .await?;
/// ```
#[derive(Clone)]
pub struct OtrsClient {
    transport: SoapTransport,

    config: Arc<ClientConfig>,

    templates: Arc<dyn TemplateSource>,
}

impl OtrsClient {
    /// Creates a client using the bundled templates.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::Config` if the configuration is invalid, or
    /// `OtrsError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: ClientConfig) -> Result<Self, OtrsError> {
        Self::with_templates(config, Arc::new(BundledTemplates))
    }

    /// Creates a client that loads templates from `templates`.
    ///
    /// # Errors
    ///
    /// Same as [`OtrsClient::new`].
    pub fn with_templates(
        config: ClientConfig,
        templates: Arc<dyn TemplateSource>,
    ) -> Result<Self, OtrsError> {
        config.validate()?;
        let transport = SoapTransport::new(&config)?;

        Ok(Self {
            transport,
            config: Arc::new(config),
            templates,
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validates that a required argument is not empty.
    fn require(value: &str, field: &'static str) -> Result<(), OtrsError> {
        if value.trim().is_empty() {
            return Err(OtrsError::empty_argument(field));
        }
        Ok(())
    }

    /// Authenticates an agent and returns a new session identifier.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Agent login
    /// * `password` - Agent password
    /// * `host_name` - OTRS host, optionally with a port
    ///
    /// # Errors
    ///
    /// - `OtrsError::InvalidArgument` if any argument is empty (no I/O is done)
    /// - `OtrsError::RemoteOperation` if the server rejects the login
    /// - transport, template and protocol errors as described on [`OtrsError`]
    pub async fn create_session(
        &self,
        user_id: &str,
        password: &str,
        host_name: &str,
    ) -> Result<SessionId, OtrsError> {
        Self::require(user_id, "user_id")?;
        Self::require(password, "password")?;
        Self::require(host_name, "host_name")?;
        let endpoint = self.transport.endpoint_url(host_name)?;

        tracing::debug!(host = %host_name, "Creating OTRS session");

        let envelope = self.prepare(
            EnvelopeKind::SessionCreate,
            &[("UserLogin", user_id), ("Password", password)],
        )?;

        self.dispatch(envelope, &endpoint, &[password]).await
    }

    /// Appends a time-accounted note to an existing ticket.
    ///
    /// `session_id` must come from a previous [`OtrsClient::create_session`];
    /// this is not checked locally.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Session identifier
    /// * `ticket_number` - Ticket number (not the internal ticket ID)
    /// * `message` - Article body
    /// * `time_unit` - Elapsed time to account, may be zero
    /// * `host_name` - OTRS host, optionally with a port
    ///
    /// # Returns
    ///
    /// The identifier of the created article.
    ///
    /// # Errors
    ///
    /// - `OtrsError::InvalidArgument` if any argument is empty or `time_unit`
    ///   is negative or not finite (no I/O is done)
    /// - `OtrsError::RemoteOperation` if the server rejects the update
    /// - `OtrsError::RemoteProtocol` if `ArticleID` is missing or not numeric
    pub async fn update_ticket(
        &self,
        session_id: &str,
        ticket_number: &str,
        message: &str,
        time_unit: f64,
        host_name: &str,
    ) -> Result<ArticleId, OtrsError> {
        Self::require(session_id, "session_id")?;
        Self::require(ticket_number, "ticket_number")?;
        Self::require(message, "message")?;
        let time_unit = format_time_unit(time_unit)?;
        Self::require(host_name, "host_name")?;
        let endpoint = self.transport.endpoint_url(host_name)?;

        tracing::debug!(
            host = %host_name,
            ticket_number = %ticket_number,
            time_unit = %time_unit,
            "Adding article to ticket"
        );

        let envelope = self.prepare(
            EnvelopeKind::TicketUpdate,
            &[
                ("SessionID", session_id),
                ("TicketNumber", ticket_number),
                ("Body", message),
                ("TimeUnit", time_unit.as_str()),
            ],
        )?;

        self.dispatch(envelope, &endpoint, &[session_id]).await
    }

    /// Loads a fresh template for `kind` and fills it.
    fn prepare(
        &self,
        kind: EnvelopeKind,
        fields: &[(&str, &str)],
    ) -> Result<PreparedEnvelope, OtrsError> {
        let document = load_template(self.templates.as_ref(), kind)?;
        let scope = LeafScope::for_kind(kind, self.config.namespace());
        let envelope = PreparedEnvelope::prepare(kind, document, scope, fields);

        let report = envelope.report();
        if !report.is_complete() && self.config.strict_leaves() {
            return Err(OtrsError::template_load(
                kind,
                format!("template lacks leaves: {}", report.missing.join(", ")),
            ));
        }

        Ok(envelope)
    }

    /// Sends a prepared envelope and interprets the response.
    async fn dispatch<T: FromLeafText>(
        &self,
        envelope: PreparedEnvelope,
        endpoint: &url::Url,
        secrets: &[&str],
    ) -> Result<T, OtrsError> {
        let kind = envelope.kind();
        let body = envelope.to_xml()?;
        let response = self.transport.send(endpoint, kind, body, secrets).await?;

        let result = interpret(&response, self.config.namespace(), kind.result_leaf());
        match &result {
            Ok(_) => tracing::debug!(action = kind.action(), "SOAP call succeeded"),
            Err(e) => tracing::debug!(action = kind.action(), error = %e, "SOAP call failed"),
        }
        result
    }
}
