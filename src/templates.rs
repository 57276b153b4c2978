//! SOAP envelope templates.
//!
//! Each operation starts from a fixed XML skeleton. The skeleton is loaded
//! through a [`TemplateSource`] and parsed into a fresh document on every
//! call, so concurrent calls never share a mutable template.

use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;

use xmltree::Element;

use crate::error::OtrsError;

/// The two operations this connector can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    /// Authenticate an agent and obtain a session identifier.
    SessionCreate,
    /// Append an article (note) to an existing ticket.
    TicketUpdate,
}

impl EnvelopeKind {
    /// SOAP action name, as used in the `SOAPAction` header.
    pub fn action(&self) -> &'static str {
        match self {
            EnvelopeKind::SessionCreate => "SessionCreate",
            EnvelopeKind::TicketUpdate => "TicketUpdate",
        }
    }

    /// File name of the template inside a template directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            EnvelopeKind::SessionCreate => "SessionCreate.xml",
            EnvelopeKind::TicketUpdate => "TicketUpdate.xml",
        }
    }

    /// Leaves that must be present in the template and filled before dispatch.
    pub fn required_leaves(&self) -> &'static [&'static str] {
        match self {
            EnvelopeKind::SessionCreate => &["UserLogin", "Password"],
            EnvelopeKind::TicketUpdate => &["SessionID", "TicketNumber", "Body", "TimeUnit"],
        }
    }

    /// Leaf name whose text is the result of a successful call.
    pub fn result_leaf(&self) -> &'static str {
        match self {
            EnvelopeKind::SessionCreate => "SessionID",
            EnvelopeKind::TicketUpdate => "ArticleID",
        }
    }

    /// Whether the outbound leaves live in the connector namespace.
    ///
    /// TicketUpdate leaves are sent unqualified; the remote service accepts
    /// them that way and qualifying them may break compatibility.
    pub fn qualified_leaves(&self) -> bool {
        matches!(self, EnvelopeKind::SessionCreate)
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// Supplies raw template XML for an operation.
pub trait TemplateSource: Send + Sync {
    /// Returns the template text for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::TemplateLoad` if the template cannot be read.
    fn load(&self, kind: EnvelopeKind) -> Result<String, OtrsError>;
}

/// Templates compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledTemplates;

const SESSION_CREATE_TEMPLATE: &str = include_str!("../templates/SessionCreate.xml");
const TICKET_UPDATE_TEMPLATE: &str = include_str!("../templates/TicketUpdate.xml");

impl TemplateSource for BundledTemplates {
    fn load(&self, kind: EnvelopeKind) -> Result<String, OtrsError> {
        let text = match kind {
            EnvelopeKind::SessionCreate => SESSION_CREATE_TEMPLATE,
            EnvelopeKind::TicketUpdate => TICKET_UPDATE_TEMPLATE,
        };
        Ok(text.to_string())
    }
}

/// Templates read from a directory at call time.
///
/// The directory must contain `SessionCreate.xml` and `TicketUpdate.xml`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    /// Creates a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateSource for DirectoryTemplates {
    fn load(&self, kind: EnvelopeKind) -> Result<String, OtrsError> {
        let path = self.dir.join(kind.file_name());
        std::fs::read_to_string(&path)
            .map_err(|e| OtrsError::template_load(kind, format!("{}: {}", path.display(), e)))
    }
}

/// Loads and parses a fresh, independent template document.
///
/// # Errors
///
/// Returns `OtrsError::TemplateLoad` if the source fails or the text is not
/// well-formed XML.
pub fn load_template(source: &dyn TemplateSource, kind: EnvelopeKind) -> Result<Element, OtrsError> {
    let text = source.load(kind)?;
    Element::parse(Cursor::new(text.as_bytes()))
        .map_err(|e| OtrsError::template_load(kind, format!("malformed XML: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::find_leaf;
    use crate::error::ErrorKind;

    const NS: &str = "http://www.otrs.org/TicketConnector/";

    #[test]
    fn test_bundled_session_template_has_qualified_leaves() {
        let doc = load_template(&BundledTemplates, EnvelopeKind::SessionCreate).unwrap();
        assert!(find_leaf(&doc, "UserLogin", Some(NS)).is_some());
        assert!(find_leaf(&doc, "Password", Some(NS)).is_some());
        assert!(find_leaf(&doc, "UserLogin", None).is_none());
    }

    #[test]
    fn test_bundled_ticket_template_has_unqualified_leaves() {
        let doc = load_template(&BundledTemplates, EnvelopeKind::TicketUpdate).unwrap();
        for leaf in EnvelopeKind::TicketUpdate.required_leaves() {
            assert!(find_leaf(&doc, leaf, None).is_some(), "missing {leaf}");
            assert!(find_leaf(&doc, leaf, Some(NS)).is_none(), "{leaf} is qualified");
        }
    }

    #[test]
    fn test_each_load_yields_independent_document() {
        let mut first = load_template(&BundledTemplates, EnvelopeKind::SessionCreate).unwrap();
        first.name = "Changed".to_string();
        let second = load_template(&BundledTemplates, EnvelopeKind::SessionCreate).unwrap();
        assert_eq!(second.name, "Envelope");
    }

    #[test]
    fn test_directory_templates_missing_file() {
        let source = DirectoryTemplates::new("/nonexistent/otrs-templates");
        let err = load_template(&source, EnvelopeKind::TicketUpdate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateLoad);
        assert!(err.to_string().contains("TicketUpdate.xml"));
    }

    struct Broken;

    impl TemplateSource for Broken {
        fn load(&self, _kind: EnvelopeKind) -> Result<String, OtrsError> {
            Ok("<Envelope><Body></Envelope>".to_string())
        }
    }

    #[test]
    fn test_malformed_template_is_template_load_error() {
        let err = load_template(&Broken, EnvelopeKind::SessionCreate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateLoad);
        assert!(err.to_string().contains("malformed XML"));
    }

    #[test]
    fn test_kind_metadata() {
        assert_eq!(EnvelopeKind::SessionCreate.to_string(), "SessionCreate");
        assert_eq!(EnvelopeKind::TicketUpdate.result_leaf(), "ArticleID");
        assert!(EnvelopeKind::SessionCreate.qualified_leaves());
        assert!(!EnvelopeKind::TicketUpdate.qualified_leaves());
    }
}
