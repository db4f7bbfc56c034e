//! Package plumbing: ZIP access, text decoding, media types and the XML tree.

pub mod archive;
pub mod encoding;
pub mod mime;
pub mod xml;
