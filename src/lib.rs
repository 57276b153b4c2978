//! # OTRS Connector
//!
//! A client for the OTRS GenericTicketConnector SOAP web service.
//!
//! It authenticates an agent, obtains a session identifier, and uses it to
//! append a time-accounted note (an *article*) to an existing ticket.
//!
//! ## Features
//!
//! - **Session creation**: exchange agent credentials for a session identifier
//! - **Ticket notes**: add an article with accounted time to a ticket
//! - **Typed failures**: invalid input, transport, protocol and remote errors
//!   are distinct variants of [`OtrsError`](error::OtrsError)
//! - **Security**: passwords and session identifiers are never logged
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`] - Immutable client configuration
//! - [`error`] - Error type and failure categories
//! - [`templates`] - SOAP envelope templates and template sources
//! - [`envelope`] - Filling template leaves and serializing envelopes
//! - [`transport`] - HTTP POST of envelopes to the connector endpoint
//! - [`response`] - Error detection and result extraction from responses
//! - [`otrs_client`] - The public operations
//!
//! ## Example
//!
//! ```ignore
//! use otrs_connector::{ClientConfig, OtrsClient};
//!
//! async fn example() -> Result<(), otrs_connector::OtrsError> {
//!     let client = OtrsClient::new(ClientConfig::default())?;
//!
//!     let session = client
//!         .create_session("agent", "secret", "otrs.example.com")
//!         .await?;
//!
//!     let article = client
//!         .update_ticket(session.as_str(), "2024010110000012", "Replaced toner", 0.25, "otrs.example.com")
//!         .await?;
//!     println!("created article {}", article);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and installs no subscriber; the embedding
//! application decides where they go (e.g. `RUST_LOG=otrs_connector=debug`).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod otrs_client;
pub mod response;
pub mod templates;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ErrorKind, OtrsError};
pub use otrs_client::OtrsClient;
pub use response::{ArticleId, SessionId};
pub use templates::{BundledTemplates, DirectoryTemplates, EnvelopeKind, TemplateSource};
