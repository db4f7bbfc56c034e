//! Decoding of package part bytes to UTF-8 text.

use encoding_rs::{Encoding, WINDOWS_1252};

/// Decode part bytes, returning the text and the name of the encoding used.
///
/// A byte order mark wins; otherwise the bytes must be UTF-8, with
/// Windows-1252 as the fallback for legacy producers.
pub fn decode_to_utf8(bytes: &[u8]) -> (String, &'static str) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text.into_owned(), encoding.name());
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), "UTF-8"),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), WINDOWS_1252.name())
        }
    }
}
