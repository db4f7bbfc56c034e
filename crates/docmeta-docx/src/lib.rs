//! Word package metadata engine.
//!
//! A `.docx`/`.docm` file is a ZIP archive. Its metadata lives in two parts:
//! - `docProps/core.xml`: title, subject, creator, keywords, dates (Dublin Core / OPC namespaces)
//! - `docProps/app.xml`: company, manager, application, total editing time
//!
//! This crate reads those parts into a [`MetadataSnapshot`], lets the caller
//! edit values through a [`DocumentEditor`], and writes a new package in which
//! only the two metadata parts differ from the original.
//!
//! [`MetadataSnapshot`]: docmeta_core::snapshot::MetadataSnapshot

pub mod access;
pub mod editor;
pub mod merge;
pub mod package;

#[cfg(test)]
mod testutil;

pub use editor::DocumentEditor;
pub use package::{Package, PackageParts};
