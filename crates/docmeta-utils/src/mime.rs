//! Word package kinds and their media types.

/// Media type of a regular Word document.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Media type of a macro-enabled Word document.
pub const DOCM_MEDIA_TYPE: &str = "application/vnd.ms-word.document.macroEnabled.12";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// `.docx`
    Document,
    /// `.docm`
    MacroEnabledDocument,
}

impl PackageKind {
    pub fn media_type(self) -> &'static str {
        match self {
            PackageKind::Document => DOCX_MEDIA_TYPE,
            PackageKind::MacroEnabledDocument => DOCM_MEDIA_TYPE,
        }
    }
}

/// Classify a file name by extension.
///
/// Matching is exact (`.docx`/`.docm`) unless `ignore_case` is set.
pub fn package_kind(file_name: &str, ignore_case: bool) -> Option<PackageKind> {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext)?;
    let matches = |expected: &str| {
        if ignore_case {
            ext.eq_ignore_ascii_case(expected)
        } else {
            ext == expected
        }
    };
    if matches("docx") {
        Some(PackageKind::Document)
    } else if matches("docm") {
        Some(PackageKind::MacroEnabledDocument)
    } else {
        None
    }
}
