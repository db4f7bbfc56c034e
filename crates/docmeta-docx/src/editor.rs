//! The document editor: owns the single open package and its edit session.

use std::path::Path;

use docmeta_core::error::{MetaError, Result};
use docmeta_core::fields::{find_field, FieldDescriptor};
use docmeta_core::options::EditorOptions;
use docmeta_core::session::{EditSession, SaveOutcome, SessionState};
use docmeta_core::snapshot::MetadataSnapshot;
use docmeta_utils::mime::{package_kind, PackageKind};
use log::info;

use crate::access::load_snapshot;
use crate::package::Package;

struct OpenDocument {
    package: Package,
    session: EditSession,
}

/// Loads one Word package at a time and drives viewing, editing and saving.
///
/// Opening a new package or resetting discards the previous package's trees
/// and snapshot entirely.
pub struct DocumentEditor {
    options: EditorOptions,
    document: Option<OpenDocument>,
}

impl DocumentEditor {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            document: None,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Check that `file_name` names a supported package.
    pub fn accept(&self, file_name: &str) -> Result<PackageKind> {
        package_kind(file_name, self.options.ignore_extension_case).ok_or_else(|| {
            MetaError::UnsupportedFormat(format!(
                "{}: expected a .docx or .docm file",
                file_name
            ))
        })
    }

    /// Load a package from memory.
    ///
    /// An unsupported file name is rejected without touching the currently
    /// open document. Any other failure leaves the editor empty.
    pub fn open(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        let kind = self.accept(file_name)?;
        self.reset();

        let output_name = self.options.output_file_name(Some(file_name));
        let package = Package::open(file_name, output_name, kind, bytes).map_err(|e| match e {
            MetaError::CorruptPackage(_) => e,
            other => MetaError::CorruptPackage(other.to_string()),
        })?;
        let snapshot = load_snapshot(package.parts());
        self.document = Some(OpenDocument {
            package,
            session: EditSession::new(snapshot),
        });
        Ok(())
    }

    /// Load a package from disk.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.options.default_file_name.as_str())
            .to_string();
        self.accept(&file_name)?;
        self.reset();

        info!("Reading {}", path.display());
        let bytes = std::fs::read(path)?;
        self.open(&file_name, bytes)
    }

    /// Drop the open package, if any.
    pub fn reset(&mut self) {
        if let Some(doc) = self.document.take() {
            info!("Closed {}", doc.package.file_name());
        }
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.package.file_name())
    }

    pub fn state(&self) -> Option<SessionState> {
        self.document.as_ref().map(|d| d.session.state())
    }

    pub fn snapshot(&self) -> Option<&MetadataSnapshot> {
        self.document.as_ref().map(|d| d.session.snapshot())
    }

    /// Current values in display order.
    pub fn fields(&self) -> Vec<(&'static FieldDescriptor, String)> {
        self.snapshot()
            .map(|s| s.iter().map(|(f, v)| (f, v.to_string())).collect())
            .unwrap_or_default()
    }

    pub fn begin_edit(&mut self) -> Result<()> {
        self.document_mut()?.session.begin_edit();
        Ok(())
    }

    pub fn stage(&mut self, key: &str, value: &str) -> Result<()> {
        self.document_mut()?.session.stage(key, value)
    }

    /// Stage several edits at once; nothing is staged if any key is unknown.
    pub fn stage_all<K, V>(&mut self, edits: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, _) in edits {
            find_field(key.as_ref())?;
        }
        let doc = self.document_mut()?;
        for (key, value) in edits {
            doc.session.stage(key.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// Leave edit mode, regenerating the package if anything changed.
    pub fn save(&mut self) -> Result<SaveOutcome> {
        let doc = self.document_mut()?;
        doc.session.save(&mut doc.package)
    }

    pub fn cancel_edit(&mut self) -> Result<()> {
        self.document_mut()?.session.cancel_edit();
        Ok(())
    }

    fn document_mut(&mut self) -> Result<&mut OpenDocument> {
        self.document
            .as_mut()
            .ok_or_else(|| MetaError::InvalidState("no document is open".to_string()))
    }
}

impl Default for DocumentEditor {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::read_value;
    use crate::testutil::{build_package, APP_XML, CORE_XML, DOCUMENT_XML};
    use docmeta_core::fields::{field, FIELDS};
    use docmeta_utils::archive::{list_entries, open_archive, read_entry, read_entry_text};
    use docmeta_utils::mime::DOCX_MEDIA_TYPE;
    use docmeta_utils::xml::XmlDocument;

    fn opened() -> DocumentEditor {
        let mut editor = DocumentEditor::default();
        editor
            .open("report.docx", build_package(Some(CORE_XML), Some(APP_XML)))
            .unwrap();
        editor
    }

    fn saved_bytes(outcome: SaveOutcome) -> Vec<u8> {
        match outcome {
            SaveOutcome::Saved { package, .. } => package.bytes,
            SaveOutcome::Unchanged => panic!("expected a regenerated package"),
        }
    }

    fn part(bytes: &[u8], path: &str) -> String {
        let mut zip = open_archive(bytes).unwrap();
        read_entry_text(&mut zip, path).unwrap().unwrap()
    }

    #[test]
    fn test_fresh_load_current_equals_original() {
        let editor = opened();
        let snap = editor.snapshot().unwrap();
        for f in FIELDS.iter() {
            assert_eq!(snap.current(f.id), snap.original(f.id), "{}", f.id);
        }
        assert_eq!(snap.current("dc:title"), "Old");
        assert_eq!(snap.current("dc:description"), "Draft & notes");
        assert_eq!(snap.current("TotalTime"), "42");
        assert_eq!(snap.current("cp:category"), "");
        assert_eq!(editor.state(), Some(SessionState::Viewing));
    }

    #[test]
    fn test_missing_app_part_yields_empty_app_fields() {
        let mut editor = DocumentEditor::default();
        editor
            .open("report.docx", build_package(Some(CORE_XML), None))
            .unwrap();
        let snap = editor.snapshot().unwrap();
        for id in ["Company", "Manager", "Application", "TotalTime"] {
            assert_eq!(snap.current(id), "");
        }
        assert_eq!(snap.current("dc:title"), "Old");
    }

    #[test]
    fn test_unsupported_extension_keeps_current_document() {
        let mut editor = opened();
        let err = editor.open("notes.txt", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, MetaError::UnsupportedFormat(_)));
        assert_eq!(editor.file_name(), Some("report.docx"));

        let err = editor
            .open("REPORT.DOCX", build_package(Some(CORE_XML), None))
            .unwrap_err();
        assert!(matches!(err, MetaError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_ignore_extension_case_option() {
        let mut editor = DocumentEditor::new(EditorOptions {
            ignore_extension_case: true,
            ..Default::default()
        });
        editor
            .open("REPORT.DOCX", build_package(Some(CORE_XML), None))
            .unwrap();
        assert!(editor.is_open());
    }

    #[test]
    fn test_corrupt_package_resets_editor() {
        let mut editor = opened();
        let err = editor.open("broken.docx", b"not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, MetaError::CorruptPackage(_)));
        assert!(!editor.is_open());
        assert!(editor.snapshot().is_none());
        assert!(matches!(editor.begin_edit(), Err(MetaError::InvalidState(_))));
    }

    #[test]
    fn test_save_without_changes_produces_nothing() {
        let mut editor = opened();
        editor.begin_edit().unwrap();
        editor.stage("Title", "Old").unwrap();
        assert_eq!(editor.save().unwrap(), SaveOutcome::Unchanged);
        assert_eq!(editor.state(), Some(SessionState::Viewing));
    }

    #[test]
    fn test_change_title_only() {
        let source = build_package(Some(CORE_XML), Some(APP_XML));
        let mut editor = DocumentEditor::default();
        editor.open("report.docx", source.clone()).unwrap();
        editor.begin_edit().unwrap();
        editor.stage("dc:title", "New Report").unwrap();
        assert!(editor.snapshot().unwrap().has_changes());

        let outcome = editor.save().unwrap();
        let (package, changed) = match outcome {
            SaveOutcome::Saved { package, changed } => (package, changed),
            SaveOutcome::Unchanged => panic!("expected a regenerated package"),
        };
        assert_eq!(changed, vec!["dc:title"]);
        assert_eq!(package.file_name, "edited_report.docx");
        assert_eq!(package.media_type, DOCX_MEDIA_TYPE);

        let core = part(&package.bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>New Report</dc:title>"));
        assert_eq!(
            core.replace("<dc:title>New Report</dc:title>", "<dc:title>Old</dc:title>"),
            CORE_XML
        );
        assert_eq!(part(&package.bytes, "docProps/app.xml"), APP_XML);

        // Every other entry is carried over unchanged and in order.
        assert_eq!(list_entries(&package.bytes).unwrap(), list_entries(&source).unwrap());
        let mut out = open_archive(&package.bytes).unwrap();
        let mut src = open_archive(&source).unwrap();
        for name in ["[Content_Types].xml", "word/document.xml", "word/media/image1.png"] {
            assert_eq!(
                read_entry(&mut out, name).unwrap().unwrap(),
                read_entry(&mut src, name).unwrap().unwrap(),
                "{}",
                name
            );
        }
        assert_eq!(part(&package.bytes, "word/document.xml"), DOCUMENT_XML);

        let snap = editor.snapshot().unwrap();
        assert_eq!(snap.original("dc:title"), "New Report");
        assert!(!snap.has_changes());
    }

    #[test]
    fn test_add_company_to_app_part() {
        let mut editor = opened();
        editor.begin_edit().unwrap();
        editor.stage("Company", "Acme").unwrap();
        let bytes = saved_bytes(editor.save().unwrap());

        let app = XmlDocument::parse(&part(&bytes, "docProps/app.xml")).unwrap();
        let company: Vec<_> = app
            .root()
            .child_elements()
            .filter(|e| e.name() == "Company")
            .collect();
        assert_eq!(company.len(), 1);
        assert_eq!(company[0].text(), "Acme");
        assert!(part(&bytes, "docProps/app.xml").ends_with("<Company>Acme</Company></Properties>"));
    }

    #[test]
    fn test_roundtrip_reload_matches() {
        let mut editor = opened();
        editor.begin_edit().unwrap();
        editor
            .stage_all(&[("Manager", "Alice"), ("Status", "Final")])
            .unwrap();
        let bytes = saved_bytes(editor.save().unwrap());

        let mut reloaded = DocumentEditor::default();
        reloaded.open("edited_report.docx", bytes).unwrap();
        let before = editor.snapshot().unwrap();
        let after = reloaded.snapshot().unwrap();
        for f in FIELDS.iter() {
            assert_eq!(after.current(f.id), before.current(f.id), "{}", f.id);
        }
        assert_eq!(after.current("cp:contentStatus"), "Final");
    }

    #[test]
    fn test_save_twice_keeps_single_created_element() {
        let mut editor = opened();
        editor.begin_edit().unwrap();
        editor.stage("cp:category", "Reports").unwrap();
        saved_bytes(editor.save().unwrap());

        editor.begin_edit().unwrap();
        editor.stage("cp:category", "Archive").unwrap();
        let bytes = saved_bytes(editor.save().unwrap());
        let core = part(&bytes, "docProps/core.xml");
        assert_eq!(core.matches("<cp:category>").count(), 1);
        let doc = XmlDocument::parse(&core).unwrap();
        assert_eq!(
            read_value(Some(&doc), field("cp:category").unwrap()),
            "Archive"
        );
    }

    #[test]
    fn test_stage_all_is_atomic_on_unknown_key() {
        let mut editor = opened();
        editor.begin_edit().unwrap();
        let err = editor
            .stage_all(&[("Title", "Changed"), ("Language", "en")])
            .unwrap_err();
        assert!(matches!(err, MetaError::UnknownField(_)));
        assert_eq!(editor.snapshot().unwrap().current("dc:title"), "Old");
    }

    #[test]
    fn test_open_path_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docm");
        std::fs::write(&path, build_package(Some(CORE_XML), Some(APP_XML))).unwrap();

        let mut editor = DocumentEditor::default();
        editor.open_path(&path).unwrap();
        assert_eq!(editor.file_name(), Some("memo.docm"));
        assert_eq!(editor.fields().len(), FIELDS.len());

        editor.begin_edit().unwrap();
        editor.stage("Title", "Memo").unwrap();
        match editor.save().unwrap() {
            SaveOutcome::Saved { package, .. } => {
                assert_eq!(package.file_name, "edited_memo.docm");
                assert_eq!(package.media_type, docmeta_utils::mime::DOCM_MEDIA_TYPE);
            }
            SaveOutcome::Unchanged => panic!("expected a regenerated package"),
        }

        editor.reset();
        assert!(!editor.is_open());
        assert!(editor.fields().is_empty());
    }

    #[test]
    fn test_utf16_part_is_written_back_as_declared_utf8() {
        let core = CORE_XML.replace("encoding=\"UTF-8\"", "encoding=\"UTF-16\"");
        let mut utf16 = vec![0xFF, 0xFE];
        utf16.extend(core.encode_utf16().flat_map(u16::to_le_bytes));

        let mut builder = docmeta_utils::archive::ZipBuilder::new(std::io::Cursor::new(Vec::new()));
        builder.add_file("docProps/core.xml", &utf16).unwrap();
        builder.add_file("docProps/app.xml", APP_XML.as_bytes()).unwrap();
        let source = builder.finish().unwrap().into_inner();

        let mut editor = DocumentEditor::default();
        editor.open("wide.docx", source).unwrap();
        assert_eq!(editor.snapshot().unwrap().current("dc:title"), "Old");
        editor.begin_edit().unwrap();
        editor.stage("Company", "Acme").unwrap();
        let bytes = saved_bytes(editor.save().unwrap());

        let mut zip = open_archive(&bytes).unwrap();
        let raw = read_entry(&mut zip, "docProps/core.xml").unwrap().unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.starts_with(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<cp:coreProperties"
        ));
        assert_eq!(text, CORE_XML);
        assert!(part(&bytes, "docProps/app.xml").ends_with("<Company>Acme</Company></Properties>"));
    }
}
