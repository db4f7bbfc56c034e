//! Seam between the edit session and whatever produces the output package.

use crate::error::Result;
use crate::snapshot::MetadataSnapshot;

/// A regenerated package ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPackage {
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Writes the current snapshot values back into a package.
///
/// Implementations must not deliver partial output: either the whole package
/// is returned or an error is.
pub trait PackageWriter {
    fn write_package(&mut self, snapshot: &MetadataSnapshot) -> Result<WrittenPackage>;
}
