//! SOAP envelope construction.
//!
//! A template document is turned into a ready-to-send envelope by locating
//! named leaf elements and replacing their text content. Leaves the template
//! does not declare are skipped, but every skip is recorded in a
//! [`FillReport`] so callers can tell "set" from "absent".

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::OtrsError;
use crate::templates::EnvelopeKind;

/// How leaf names are matched against element namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafScope {
    /// Leaves must be in the given namespace.
    Qualified(String),
    /// Leaves must carry no namespace.
    Unqualified,
}

impl LeafScope {
    /// Scope used for the outbound leaves of `kind`.
    pub fn for_kind(kind: EnvelopeKind, namespace: &str) -> Self {
        if kind.qualified_leaves() {
            LeafScope::Qualified(namespace.to_string())
        } else {
            LeafScope::Unqualified
        }
    }

    /// The namespace leaves must be in, `None` for unqualified.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            LeafScope::Qualified(ns) => Some(ns),
            LeafScope::Unqualified => None,
        }
    }
}

/// Outcome of filling a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Leaves that were found and set.
    pub set: Vec<String>,
    /// Leaves that the template does not contain.
    pub missing: Vec<String>,
}

impl FillReport {
    /// Returns true if every requested leaf was set.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

fn in_scope(element: &Element, namespace: Option<&str>) -> bool {
    match namespace {
        Some(ns) => element.namespace.as_deref() == Some(ns),
        None => element.namespace.as_deref().is_none_or(str::is_empty),
    }
}

/// Finds the first descendant of `root` (document order) named `name`
/// within `namespace` (`None` matches only unqualified elements).
pub fn find_leaf<'a>(root: &'a Element, name: &str, namespace: Option<&str>) -> Option<&'a Element> {
    root.children.iter().find_map(|node| {
        let child = node.as_element()?;
        if child.name == name && in_scope(child, namespace) {
            Some(child)
        } else {
            find_leaf(child, name, namespace)
        }
    })
}

fn find_leaf_mut<'a>(
    root: &'a mut Element,
    name: &str,
    namespace: Option<&str>,
) -> Option<&'a mut Element> {
    for node in root.children.iter_mut() {
        if let XMLNode::Element(child) = node {
            if child.name == name && in_scope(child, namespace) {
                return Some(child);
            }
            if let Some(found) = find_leaf_mut(child, name, namespace) {
                return Some(found);
            }
        }
    }
    None
}

/// Sets the text content of each named leaf in `document`.
///
/// Existing children of a matched leaf are replaced. Absent leaves are left
/// alone and listed in the returned report.
pub fn fill(document: &mut Element, scope: &LeafScope, fields: &[(&str, &str)]) -> FillReport {
    let mut report = FillReport::default();

    for (name, value) in fields {
        match find_leaf_mut(document, name, scope.namespace()) {
            Some(leaf) => {
                leaf.children.clear();
                if !value.is_empty() {
                    leaf.children.push(XMLNode::Text((*value).to_string()));
                }
                report.set.push((*name).to_string());
            }
            None => {
                tracing::warn!(leaf = %name, "Template has no such leaf, skipping");
                report.missing.push((*name).to_string());
            }
        }
    }

    report
}

/// Renders an elapsed-time value as locale-independent decimal text.
///
/// # Errors
///
/// Returns `OtrsError::InvalidArgument` for negative or non-finite values.
pub fn format_time_unit(value: f64) -> Result<String, OtrsError> {
    if !value.is_finite() {
        return Err(OtrsError::invalid_argument("time_unit", "must be a finite number"));
    }
    if value < 0.0 {
        return Err(OtrsError::invalid_argument("time_unit", "must not be negative"));
    }
    // Display would render negative zero as "-0".
    let value = if value == 0.0 { 0.0 } else { value };
    Ok(value.to_string())
}

/// A template with its leaves filled, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedEnvelope {
    kind: EnvelopeKind,
    scope: LeafScope,
    document: Element,
    report: FillReport,
}

impl PreparedEnvelope {
    /// Fills `document` for `kind` and keeps the fill report.
    pub fn prepare(
        kind: EnvelopeKind,
        mut document: Element,
        scope: LeafScope,
        fields: &[(&str, &str)],
    ) -> Self {
        let report = fill(&mut document, &scope, fields);
        Self {
            kind,
            scope,
            document,
            report,
        }
    }

    /// The operation this envelope is for.
    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    /// Which leaves were set and which were missing.
    pub fn report(&self) -> &FillReport {
        &self.report
    }

    /// Text of the first leaf named `name` in this envelope's scope.
    pub fn leaf_text(&self, name: &str) -> Option<String> {
        find_leaf(&self.document, name, self.scope.namespace())
            .and_then(|leaf| leaf.get_text())
            .map(|text| text.into_owned())
    }

    /// Serializes the envelope as UTF-8 XML.
    ///
    /// Indentation is disabled so leaf text is sent exactly as filled.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::TemplateLoad` if the document cannot be written.
    pub fn to_xml(&self) -> Result<String, OtrsError> {
        let mut buf = Vec::new();
        let config = EmitterConfig::new()
            .write_document_declaration(true)
            .perform_indent(false);
        self.document
            .write_with_config(&mut buf, config)
            .map_err(|e| OtrsError::template_load(self.kind, format!("cannot serialize: {}", e)))?;
        String::from_utf8(buf)
            .map_err(|e| OtrsError::template_load(self.kind, format!("invalid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{load_template, BundledTemplates};
    use std::io::Cursor;

    const NS: &str = "http://www.otrs.org/TicketConnector/";

    fn session_envelope(fields: &[(&str, &str)]) -> PreparedEnvelope {
        let doc = load_template(&BundledTemplates, EnvelopeKind::SessionCreate).unwrap();
        PreparedEnvelope::prepare(
            EnvelopeKind::SessionCreate,
            doc,
            LeafScope::for_kind(EnvelopeKind::SessionCreate, NS),
            fields,
        )
    }

    fn reparse(xml: &str) -> Element {
        Element::parse(Cursor::new(xml.as_bytes())).unwrap()
    }

    #[test]
    fn test_fill_sets_qualified_leaves() {
        let envelope = session_envelope(&[("UserLogin", "agent"), ("Password", "pw")]);
        assert!(envelope.report().is_complete());
        assert_eq!(envelope.report().set, vec!["UserLogin", "Password"]);
        assert_eq!(envelope.leaf_text("UserLogin").as_deref(), Some("agent"));
        assert_eq!(envelope.leaf_text("Password").as_deref(), Some("pw"));
    }

    #[test]
    fn test_fill_reports_missing_leaf() {
        let envelope = session_envelope(&[("UserLogin", "agent"), ("CustomerUserLogin", "x")]);
        assert!(!envelope.report().is_complete());
        assert_eq!(envelope.report().missing, vec!["CustomerUserLogin"]);
        assert_eq!(envelope.report().set, vec!["UserLogin"]);
    }

    #[test]
    fn test_fill_respects_unqualified_scope() {
        let mut doc = load_template(&BundledTemplates, EnvelopeKind::TicketUpdate).unwrap();
        let qualified = LeafScope::Qualified(NS.to_string());
        let report = fill(&mut doc, &qualified, &[("SessionID", "s")]);
        assert_eq!(report.missing, vec!["SessionID"]);

        let report = fill(&mut doc, &LeafScope::Unqualified, &[("SessionID", "s")]);
        assert!(report.is_complete());
        assert_eq!(
            find_leaf(&doc, "SessionID", None).and_then(|e| e.get_text()).as_deref(),
            Some("s")
        );
    }

    #[test]
    fn test_fill_replaces_existing_content() {
        let mut doc = reparse(r#"<root><Body>old<b>bold</b></Body></root>"#);
        fill(&mut doc, &LeafScope::Unqualified, &[("Body", "new")]);
        let body = find_leaf(&doc, "Body", None).unwrap();
        assert_eq!(body.children.len(), 1);
        assert_eq!(body.get_text().as_deref(), Some("new"));
    }

    #[test]
    fn test_fill_only_first_match() {
        let mut doc = reparse(r#"<root><a><Body/></a><Body/></root>"#);
        fill(&mut doc, &LeafScope::Unqualified, &[("Body", "v")]);
        let xml = {
            let mut buf = Vec::new();
            doc.write(&mut buf).unwrap();
            String::from_utf8(buf).unwrap()
        };
        assert_eq!(xml.matches(">v<").count(), 1);
    }

    #[test]
    fn test_round_trip_preserves_special_characters() {
        let tricky = "a < b && c > d \"quoted\" 'single' ünïcödé ✓";
        let envelope = session_envelope(&[("UserLogin", tricky), ("Password", "p&w<")]);
        let xml = envelope.to_xml().unwrap();
        assert!(!xml.contains("a < b"));

        let parsed = reparse(&xml);
        let login = find_leaf(&parsed, "UserLogin", Some(NS)).unwrap();
        assert_eq!(login.get_text().as_deref(), Some(tricky));
        let password = find_leaf(&parsed, "Password", Some(NS)).unwrap();
        assert_eq!(password.get_text().as_deref(), Some("p&w<"));
    }

    #[test]
    fn test_serialized_envelope_keeps_namespaces() {
        let envelope = session_envelope(&[("UserLogin", "agent"), ("Password", "pw")]);
        let xml = envelope.to_xml().unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(NS));
        assert!(xml.contains("http://www.w3.org/2003/05/soap-envelope"));
    }

    #[test]
    fn test_format_time_unit() {
        assert_eq!(format_time_unit(0.0).unwrap(), "0");
        assert_eq!(format_time_unit(-0.0).unwrap(), "0");
        assert_eq!(format_time_unit(1.5).unwrap(), "1.5");
        assert_eq!(format_time_unit(30.0).unwrap(), "30");
        assert_eq!(format_time_unit(0.25).unwrap(), "0.25");
    }

    #[test]
    fn test_format_time_unit_rejects_bad_values() {
        assert!(format_time_unit(f64::NAN).is_err());
        assert!(format_time_unit(f64::INFINITY).is_err());
        let err = format_time_unit(-1.0).unwrap_err();
        assert!(err.to_string().contains("time_unit"));
    }
}
