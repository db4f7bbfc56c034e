//! In-memory ZIP helpers for reading and regenerating Office packages.

use std::io::{self, Cursor, Read, Seek, Write};

use zip::read::{ZipArchive, ZipFile};
use zip::result::ZipError;
use zip::write::FullFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::encoding::decode_to_utf8;

/// Open a ZIP archive held in memory.
pub fn open_archive(bytes: &[u8]) -> io::Result<ZipArchive<Cursor<&[u8]>>> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

/// Read a single entry. `Ok(None)` when the archive has no such entry.
pub fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> io::Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(Some(buf))
}

/// Read an entry as text, decoding it to UTF-8.
pub fn read_entry_text<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> io::Result<Option<String>> {
    Ok(read_entry(archive, name)?.map(|bytes| {
        let (text, encoding) = decode_to_utf8(&bytes);
        if encoding != "UTF-8" {
            log::warn!("{} is not UTF-8; decoded as {}", name, encoding);
        }
        text
    }))
}

/// List all entry names in archive order.
pub fn list_entries(bytes: &[u8]) -> io::Result<Vec<String>> {
    let archive = open_archive(bytes)?;
    let entries = (0..archive.len())
        .filter_map(|i| archive.name_for_index(i).map(|s| s.to_string()))
        .collect();
    Ok(entries)
}

/// Per-entry metadata carried over when an archive is regenerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryAttributes {
    pub last_modified: Option<DateTime>,
    pub unix_mode: Option<u32>,
    pub comment: String,
}

impl EntryAttributes {
    pub fn of<R: Read + ?Sized>(entry: &ZipFile<'_, R>) -> Self {
        Self {
            last_modified: entry.last_modified(),
            unix_mode: entry.unix_mode(),
            comment: entry.comment().to_string(),
        }
    }
}

/// Regenerate `source`, replacing the content of the named entries.
///
/// Entries keep their order, (decompressed) content, timestamp, unix mode and
/// comment; every file entry is written with DEFLATE at `level`. Replaced
/// entries get a fresh timestamp. Replacements naming entries that do not
/// exist are appended at the end.
pub fn rewrite_archive(
    source: &[u8],
    replacements: &[(&str, &[u8])],
    level: i64,
) -> io::Result<Vec<u8>> {
    let mut archive = open_archive(source)?;
    let mut builder = ZipBuilder::new(Cursor::new(Vec::new())).with_level(level);
    let mut replaced = vec![false; replacements.len()];

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let attributes = EntryAttributes::of(&entry);

        if entry.is_dir() {
            builder.add_directory_with(&name, &attributes)?;
            continue;
        }

        match replacements.iter().position(|(n, _)| *n == name) {
            Some(idx) => {
                let attributes = EntryAttributes {
                    last_modified: None,
                    ..attributes
                };
                builder.add_file_with(&name, replacements[idx].1, &attributes)?;
                replaced[idx] = true;
            }
            None => {
                // The declared size is untrusted; let the buffer grow as data arrives.
                let mut content = Vec::new();
                entry.read_to_end(&mut content)?;
                builder.add_file_with(&name, &content, &attributes)?;
            }
        }
    }

    for ((name, content), done) in replacements.iter().zip(replaced) {
        if !done {
            builder.add_file(name, content)?;
        }
    }

    Ok(builder.finish()?.into_inner())
}

/// Builder for creating ZIP archives over any seekable sink.
pub struct ZipBuilder<W: Write + Seek> {
    writer: ZipWriter<W>,
    level: Option<i64>,
}

impl<W: Write + Seek> ZipBuilder<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: ZipWriter::new(sink),
            level: None,
        }
    }

    /// Use a fixed DEFLATE level instead of the library default.
    pub fn with_level(mut self, level: i64) -> Self {
        self.level = Some(level);
        self
    }

    /// Add a DEFLATE-compressed file entry.
    pub fn add_file(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
        self.add_file_with(name, content, &EntryAttributes::default())
    }

    /// Add a DEFLATE-compressed file entry with the given metadata.
    pub fn add_file_with(
        &mut self,
        name: &str,
        content: &[u8],
        attributes: &EntryAttributes,
    ) -> io::Result<()> {
        let options = entry_options(attributes)
            .compression_method(CompressionMethod::Deflated)
            .compression_level(self.level);
        self.writer.start_file(name, options)?;
        self.writer.write_all(content)?;
        Ok(())
    }

    /// Add a file entry stored without compression.
    pub fn add_stored(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
        let options = entry_options(&EntryAttributes::default())
            .compression_method(CompressionMethod::Stored);
        self.writer.start_file(name, options)?;
        self.writer.write_all(content)?;
        Ok(())
    }

    pub fn add_directory(&mut self, name: &str) -> io::Result<()> {
        self.add_directory_with(name, &EntryAttributes::default())
    }

    pub fn add_directory_with(&mut self, name: &str, attributes: &EntryAttributes) -> io::Result<()> {
        self.writer.add_directory(name, entry_options(attributes))?;
        Ok(())
    }

    /// Finish writing and hand back the sink.
    pub fn finish(self) -> io::Result<W> {
        Ok(self.writer.finish()?)
    }
}

fn entry_options(attributes: &EntryAttributes) -> FullFileOptions<'static> {
    let mut options = FullFileOptions::default();
    if let Some(time) = attributes.last_modified {
        options = options.last_modified_time(time);
    }
    if let Some(mode) = attributes.unix_mode {
        options = options.unix_permissions(mode);
    }
    if !attributes.comment.is_empty() {
        options = options.with_file_comment(attributes.comment.as_str());
    }
    options
}
