//! Word package loading and regeneration.
//!
//! A package is kept as its original bytes plus the parsed trees of the two
//! metadata parts. Saving re-serializes the trees and rewrites the archive with
//! every other entry carried over unchanged.

use docmeta_core::error::{MetaError, Result};
use docmeta_core::fields::PartName;
use docmeta_core::options::COMPRESSION_LEVEL;
use docmeta_core::snapshot::MetadataSnapshot;
use docmeta_core::writer::{PackageWriter, WrittenPackage};
use docmeta_utils::archive;
use docmeta_utils::mime::PackageKind;
use docmeta_utils::xml::XmlDocument;
use log::{info, warn};

use crate::merge;

/// Parsed metadata parts; either may be missing from a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageParts {
    pub core: Option<XmlDocument>,
    pub app: Option<XmlDocument>,
}

impl PackageParts {
    pub fn get(&self, part: PartName) -> Option<&XmlDocument> {
        match part {
            PartName::Core => self.core.as_ref(),
            PartName::App => self.app.as_ref(),
        }
    }

    pub fn get_mut(&mut self, part: PartName) -> Option<&mut XmlDocument> {
        match part {
            PartName::Core => self.core.as_mut(),
            PartName::App => self.app.as_mut(),
        }
    }
}

/// An open Word package.
#[derive(Debug, Clone)]
pub struct Package {
    file_name: String,
    output_name: String,
    kind: PackageKind,
    source: Vec<u8>,
    parts: PackageParts,
}

impl Package {
    /// Unzip `bytes` and parse both metadata parts.
    ///
    /// Archive failures are [`MetaError::Zip`], malformed parts
    /// [`MetaError::Xml`]. A missing part is not an error.
    pub fn open(
        file_name: &str,
        output_name: String,
        kind: PackageKind,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let parts = read_parts(&bytes)?;
        info!(
            "Loaded {} ({} bytes): core.xml {}, app.xml {}",
            file_name,
            bytes.len(),
            presence(parts.core.is_some()),
            presence(parts.app.is_some()),
        );
        Ok(Self {
            file_name: file_name.to_string(),
            output_name,
            kind,
            source: bytes,
            parts,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn parts(&self) -> &PackageParts {
        &self.parts
    }

    /// Rebuild the archive with the given part texts substituted.
    pub fn assemble(&self, updated: &[(PartName, String)]) -> Result<Vec<u8>> {
        let replacements: Vec<(&str, &[u8])> = updated
            .iter()
            .map(|(part, text)| (part.path(), text.as_bytes()))
            .collect();
        archive::rewrite_archive(&self.source, &replacements, COMPRESSION_LEVEL)
            .map_err(|e| MetaError::Zip(format!("cannot regenerate package: {}", e)))
    }
}

impl PackageWriter for Package {
    /// Merge the snapshot into copies of the part trees and regenerate the
    /// archive. The package's own trees are replaced only once the archive
    /// was produced.
    fn write_package(&mut self, snapshot: &MetadataSnapshot) -> Result<WrittenPackage> {
        let mut parts = self.parts.clone();
        let texts = merge::merge_and_serialize(&mut parts, snapshot);
        let bytes = self.assemble(&texts)?;
        info!("Regenerated {} ({} bytes)", self.output_name, bytes.len());

        self.parts = parts;
        Ok(WrittenPackage {
            file_name: self.output_name.clone(),
            media_type: self.kind.media_type(),
            bytes,
        })
    }
}

fn read_parts(bytes: &[u8]) -> Result<PackageParts> {
    let mut zip = archive::open_archive(bytes)
        .map_err(|e| MetaError::Zip(format!("cannot open archive: {}", e)))?;

    let mut parts = PackageParts::default();
    for part in PartName::ALL {
        let path = part.path();
        let text = archive::read_entry_text(&mut zip, path)
            .map_err(|e| MetaError::Zip(format!("cannot read {}: {}", path, e)))?;
        let doc = match text {
            Some(text) => Some(
                XmlDocument::parse(&text)
                    .map_err(|e| MetaError::Xml(format!("{}: {}", path, e)))?,
            ),
            None => {
                warn!("Package has no {}; its fields read as empty", path);
                None
            }
        };
        match part {
            PartName::Core => parts.core = doc,
            PartName::App => parts.app = doc,
        }
    }
    Ok(parts)
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "missing"
    }
}
