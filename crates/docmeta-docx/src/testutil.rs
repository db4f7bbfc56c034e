//! Fixture packages for unit tests.

use std::io::Cursor;

use docmeta_utils::archive::ZipBuilder;

pub const CORE_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" xmlns:dcmitype=\"http://purl.org/dc/dcmitype/\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"><dc:title>Old</dc:title><dc:subject>Quarterly numbers</dc:subject><dc:creator>Jane Doe</dc:creator><cp:keywords>finance, q3</cp:keywords><dc:description>Draft &amp; notes</dc:description><cp:lastModifiedBy>Bob</cp:lastModifiedBy><cp:revision>3</cp:revision><dcterms:created xsi:type=\"dcterms:W3CDTF\">2024-01-15T10:30:00Z</dcterms:created><dcterms:modified xsi:type=\"dcterms:W3CDTF\">2024-02-01T08:00:00Z</dcterms:modified></cp:coreProperties>";

pub const APP_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\"><Template>Normal.dotm</Template><TotalTime>42</TotalTime><Pages>3</Pages><Application>Microsoft Office Word</Application><DocSecurity>0</DocSecurity><HeadingPairs><vt:vector size=\"2\" baseType=\"variant\"><vt:variant><vt:lpstr>Title</vt:lpstr></vt:variant><vt:variant><vt:i4>1</vt:i4></vt:variant></vt:vector></HeadingPairs><AppVersion>16.0000</AppVersion></Properties>";

pub const DOCUMENT_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>";

const CONTENT_TYPES: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"><Default Extension=\"xml\" ContentType=\"application/xml\"/></Types>";

/// Build a minimal Word package with the given metadata parts.
pub fn build_package(core: Option<&str>, app: Option<&str>) -> Vec<u8> {
    let mut builder = ZipBuilder::new(Cursor::new(Vec::new()));
    builder
        .add_file("[Content_Types].xml", CONTENT_TYPES.as_bytes())
        .unwrap();
    if let Some(app) = app {
        builder.add_file("docProps/app.xml", app.as_bytes()).unwrap();
    }
    if let Some(core) = core {
        builder.add_file("docProps/core.xml", core.as_bytes()).unwrap();
    }
    builder
        .add_file("word/document.xml", DOCUMENT_XML.as_bytes())
        .unwrap();
    builder
        .add_stored("word/media/image1.png", &[0x89, b'P', b'N', b'G', 0, 1, 2, 3])
        .unwrap();
    builder.finish().unwrap().into_inner()
}
