//! Editor options, loadable from TOML config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// DEFLATE level used when regenerating a package.
pub const COMPRESSION_LEVEL: i64 = 6;

/// Options controlling how packages are accepted and named on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    pub verbose: u8,

    /// Prefix added to the input file name for the edited package.
    pub output_prefix: String,

    /// Name used when the input file name is unknown.
    pub default_file_name: String,

    /// Accept `.DOCX`/`.Docm` etc. as well as the lowercase extensions.
    pub ignore_extension_case: bool,

    /// Directory edited packages are written to; defaults to the input's directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            output_prefix: "edited_".to_string(),
            default_file_name: "document.docx".to_string(),
            ignore_extension_case: false,
            output_dir: None,
        }
    }
}

impl EditorOptions {
    /// File name for the edited copy of `original`.
    pub fn output_file_name(&self, original: Option<&str>) -> String {
        let name = original
            .filter(|n| !n.is_empty())
            .unwrap_or(self.default_file_name.as_str());
        format!("{}{}", self.output_prefix, name)
    }
}
