//! Interpretation of GenericTicketConnector responses.
//!
//! A response contains an error iff it has at least one `Error` element in
//! the connector namespace. Otherwise the first element named after the
//! expected result leaf carries the value.

use std::fmt;
use std::io::Cursor;

use xmltree::Element;

use crate::envelope::find_leaf;
use crate::error::OtrsError;

/// Opaque session token issued by the remote system.
///
/// The connector never stores it; the caller owns it after `create_session`
/// returns and passes it back for follow-up operations.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a session token obtained elsewhere.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId([REDACTED])")
    }
}

/// Identifier of an article (note) created on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleId(i64);

impl ArticleId {
    /// Wraps a numeric article identifier.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The numeric value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversion from the text of a result leaf.
pub trait FromLeafText: Sized {
    /// Converts `text`, or explains why it is unusable.
    fn from_leaf_text(text: &str) -> Result<Self, String>;
}

impl FromLeafText for SessionId {
    fn from_leaf_text(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Err("session identifier is empty".to_string());
        }
        Ok(SessionId(text.to_string()))
    }
}

impl FromLeafText for ArticleId {
    fn from_leaf_text(text: &str) -> Result<Self, String> {
        text.trim()
            .parse::<i64>()
            .map(ArticleId)
            .map_err(|e| format!("{:?} is not a 64-bit integer: {}", text, e))
    }
}

/// Parses `body` and extracts `result_leaf` as `T`, or raises the remote error.
///
/// # Errors
///
/// - `OtrsError::RemoteProtocol` if the body is not well-formed XML, if an
///   `Error` element lacks `ErrorCode` or `ErrorMessage`, if the result leaf
///   is absent, or if its text cannot be converted.
/// - `OtrsError::RemoteOperation` if the response contains an `Error` element.
pub fn interpret<T: FromLeafText>(
    body: &str,
    namespace: &str,
    result_leaf: &str,
) -> Result<T, OtrsError> {
    let document = Element::parse(Cursor::new(body.as_bytes()))
        .map_err(|e| OtrsError::remote_protocol(format!("response is not well-formed XML: {}", e)))?;

    let ns = Some(namespace);

    if find_leaf(&document, "Error", ns).is_some() {
        let message = leaf_text(&document, "ErrorMessage", ns).ok_or_else(|| {
            OtrsError::remote_protocol("Error element without ErrorMessage")
        })?;
        let code = leaf_text(&document, "ErrorCode", ns)
            .ok_or_else(|| OtrsError::remote_protocol("Error element without ErrorCode"))?;
        tracing::debug!(code = %code, "Server reported an error");
        return Err(OtrsError::remote_operation(code, message));
    }

    let text = leaf_text(&document, result_leaf, ns).ok_or_else(|| {
        OtrsError::remote_protocol(format!("response has no {} element", result_leaf))
    })?;

    T::from_leaf_text(&text)
        .map_err(|reason| OtrsError::remote_protocol(format!("invalid {}: {}", result_leaf, reason)))
}

fn leaf_text(document: &Element, name: &str, namespace: Option<&str>) -> Option<String> {
    find_leaf(document, name, namespace).map(|leaf| {
        leaf.get_text()
            .map(|text| text.into_owned())
            .unwrap_or_default()
    })
}
