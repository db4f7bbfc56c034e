//! Registry of the metadata fields that can be inspected and edited.
//!
//! The registry is fixed: ten fields live in the core properties part
//! (`docProps/core.xml`) and four in the application properties part
//! (`docProps/app.xml`). Registry order is display order.

use std::fmt;

use serde::Serialize;

use crate::error::{MetaError, Result};

/// Dublin Core elements.
pub const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
/// Dublin Core terms (dates).
pub const NS_DCTERMS: &str = "http://purl.org/dc/terms/";
/// OPC core properties.
pub const NS_CP: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
/// Office extended (application) properties.
pub const NS_EP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
/// XML Schema instance.
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Prefix → namespace URI table used for lookup and element creation.
pub const NAMESPACES: [(&str, &str); 5] = [
    ("dc", NS_DC),
    ("dcterms", NS_DCTERMS),
    ("cp", NS_CP),
    ("ep", NS_EP),
    ("xsi", NS_XSI),
];

/// Resolve a registered prefix to its namespace URI.
pub fn namespace_uri(prefix: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

/// The package part a field is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartName {
    Core,
    App,
}

impl PartName {
    pub const ALL: [PartName; 2] = [PartName::Core, PartName::App];

    /// Entry path of this part inside the package.
    pub fn path(self) -> &'static str {
        match self {
            PartName::Core => "docProps/core.xml",
            PartName::App => "docProps/app.xml",
        }
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartName::Core => write!(f, "core"),
            PartName::App => write!(f, "app"),
        }
    }
}

/// One way of locating a field's element in a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Namespace URI + local name.
    Namespaced {
        uri: &'static str,
        local_name: &'static str,
    },
    /// Qualified tag name as written in the XML.
    TagName(&'static str),
}

/// Static description of one metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub part: PartName,
    pub namespace: Option<&'static str>,
}

impl FieldDescriptor {
    const fn core(id: &'static str, label: &'static str, namespace: &'static str) -> Self {
        Self {
            id,
            label,
            part: PartName::Core,
            namespace: Some(namespace),
        }
    }

    const fn app(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            part: PartName::App,
            namespace: None,
        }
    }

    /// Prefix of a `prefix:local` id, if any.
    pub fn prefix(&self) -> Option<&'static str> {
        self.id.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Local part of the id (the whole id when unprefixed).
    pub fn local_name(&self) -> &'static str {
        self.id
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(self.id)
    }

    /// Lookup strategies in the order they are tried; first match wins.
    ///
    /// Namespaced fields fall back to a plain tag-name search so that parts
    /// written without proper namespace declarations still resolve.
    pub fn lookups(&self) -> Vec<Lookup> {
        match self.namespace {
            Some(uri) => vec![
                Lookup::Namespaced {
                    uri,
                    local_name: self.local_name(),
                },
                Lookup::TagName(self.id),
            ],
            None => vec![Lookup::TagName(self.id)],
        }
    }
}

/// All supported fields in display order.
pub static FIELDS: [FieldDescriptor; 14] = [
    FieldDescriptor::core("dc:title", "Title", NS_DC),
    FieldDescriptor::core("dc:subject", "Subject", NS_DC),
    FieldDescriptor::core("dc:creator", "Creator", NS_DC),
    FieldDescriptor::core("dc:description", "Description", NS_DC),
    FieldDescriptor::core("cp:keywords", "Keywords", NS_CP),
    FieldDescriptor::core("cp:lastModifiedBy", "Last Modified By", NS_CP),
    FieldDescriptor::core("cp:category", "Category", NS_CP),
    FieldDescriptor::core("cp:contentStatus", "Status", NS_CP),
    FieldDescriptor::core("dcterms:created", "Creation Date", NS_DCTERMS),
    FieldDescriptor::core("dcterms:modified", "Last Modified Date", NS_DCTERMS),
    FieldDescriptor::app("Company", "Company"),
    FieldDescriptor::app("Manager", "Manager"),
    FieldDescriptor::app("Application", "Application"),
    FieldDescriptor::app("TotalTime", "Total Editing Time (min)"),
];

/// Look up a descriptor by its exact id.
pub fn field(id: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|f| f.id == id)
}

/// Resolve a user-supplied key to a field.
///
/// Tries the exact id, then the label, then the id or local name, the last
/// two ignoring ASCII case.
pub fn find_field(key: &str) -> Result<&'static FieldDescriptor> {
    let key = key.trim();
    field(key)
        .or_else(|| FIELDS.iter().find(|f| f.label.eq_ignore_ascii_case(key)))
        .or_else(|| {
            FIELDS.iter().find(|f| {
                f.id.eq_ignore_ascii_case(key) || f.local_name().eq_ignore_ascii_case(key)
            })
        })
        .ok_or_else(|| MetaError::UnknownField(key.to_string()))
}
