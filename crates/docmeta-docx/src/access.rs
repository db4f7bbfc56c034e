//! Reading and writing individual metadata fields in a part's XML tree.

use docmeta_core::fields::{namespace_uri, FieldDescriptor, Lookup, PartName};
use docmeta_core::snapshot::MetadataSnapshot;
use docmeta_utils::xml::{Element, XmlDocument};
use log::debug;

use crate::package::PackageParts;

/// What [`write_value`] did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEffect {
    /// An existing element's text was replaced.
    Updated,
    /// A new element was appended to the root.
    Created,
    /// The element is absent and the value empty; nothing was written.
    Skipped,
}

fn find<'d>(doc: &'d XmlDocument, lookup: Lookup) -> Option<&'d Element> {
    match lookup {
        Lookup::Namespaced { uri, local_name } => doc.find_by_namespace(uri, local_name),
        Lookup::TagName(name) => doc.find_by_tag(name),
    }
}

fn find_mut<'d>(doc: &'d mut XmlDocument, lookup: Lookup) -> Option<&'d mut Element> {
    match lookup {
        Lookup::Namespaced { uri, local_name } => doc.find_by_namespace_mut(uri, local_name),
        Lookup::TagName(name) => doc.find_by_tag_mut(name),
    }
}

/// First lookup strategy for `field` that finds an element in `doc`.
fn matching_lookup(doc: &XmlDocument, field: &FieldDescriptor) -> Option<Lookup> {
    let found = field
        .lookups()
        .into_iter()
        .find(|lookup| find(doc, *lookup).is_some());
    debug!("{}: lookup {:?}", field.id, found);
    found
}

/// Locate the element holding `field`'s value.
pub fn resolve<'d>(doc: &'d XmlDocument, field: &FieldDescriptor) -> Option<&'d Element> {
    matching_lookup(doc, field).and_then(|lookup| find(doc, lookup))
}

fn resolve_mut<'d>(doc: &'d mut XmlDocument, field: &FieldDescriptor) -> Option<&'d mut Element> {
    let lookup = matching_lookup(doc, field)?;
    find_mut(doc, lookup)
}

/// Text of `field`'s element, or an empty string when the part or element is absent.
pub fn read_value(doc: Option<&XmlDocument>, field: &FieldDescriptor) -> String {
    doc.and_then(|doc| resolve(doc, field))
        .map(Element::text)
        .unwrap_or_default()
}

/// Set `field`'s text, creating its element under the root when absent.
///
/// Empty values never create elements.
pub fn write_value(doc: &mut XmlDocument, field: &FieldDescriptor, value: &str) -> WriteEffect {
    if let Some(element) = resolve_mut(doc, field) {
        element.set_text(value);
        return WriteEffect::Updated;
    }
    if value.is_empty() {
        return WriteEffect::Skipped;
    }

    let mut element = create_missing_element(field);
    element.set_text(value);
    debug!("{}: creating <{}> under <{}>", field.id, element.name(), doc.root().name());
    doc.root_mut().append_child(element);
    WriteEffect::Created
}

/// Build a new, empty element for `field`.
///
/// Core fields use the namespace registered for their prefix; app fields go in
/// the extended-properties namespace. Unregistered prefixes produce a plain
/// element named after the id.
pub fn create_missing_element(field: &FieldDescriptor) -> Element {
    let uri = match field.part {
        PartName::Core => field.prefix().and_then(namespace_uri),
        PartName::App => namespace_uri("ep"),
    };
    match uri {
        Some(uri) => Element::new_ns(uri, field.id),
        None => Element::new(field.id),
    }
}

/// Read every field from the package parts into a fresh snapshot.
pub fn load_snapshot(parts: &PackageParts) -> MetadataSnapshot {
    MetadataSnapshot::read_with(|field| read_value(parts.get(field.part), field))
}
