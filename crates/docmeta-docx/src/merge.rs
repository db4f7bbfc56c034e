//! Writing snapshot values back into the part trees and serializing them.

use docmeta_core::fields::{PartName, FIELDS};
use docmeta_core::snapshot::MetadataSnapshot;
use docmeta_utils::xml::{ensure_declaration, XmlDocument};
use log::debug;

use crate::access::{write_value, WriteEffect};
use crate::package::PackageParts;

/// Write every field's current value into its part. Parts that are absent are skipped.
pub fn apply_values(parts: &mut PackageParts, snapshot: &MetadataSnapshot) {
    for field in FIELDS.iter() {
        let Some(doc) = parts.get_mut(field.part) else {
            continue;
        };
        let effect = write_value(doc, field, snapshot.current(field.id));
        if effect == WriteEffect::Created {
            debug!("Created {} in {}", field.id, field.part.path());
        }
    }
}

/// Serialize a part tree, making sure it starts with an XML declaration.
pub fn serialize_part(doc: &XmlDocument) -> String {
    ensure_declaration(doc.to_xml_string())
}

/// Apply the snapshot and return the new text of every present part.
pub fn merge_and_serialize(
    parts: &mut PackageParts,
    snapshot: &MetadataSnapshot,
) -> Vec<(PartName, String)> {
    apply_values(parts, snapshot);
    PartName::ALL
        .into_iter()
        .filter_map(|part| parts.get(part).map(|doc| (part, serialize_part(doc))))
        .collect()
}
