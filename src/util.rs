//! Text decoding helpers for metadata byte strings.

use std::borrow::Cow;

use crate::error::{Error, Result};

/// Decode a metadata byte string declared to be UTF-8.
///
/// Tries UTF-8 first; if malformed, retries with Windows-1252 (the
/// legacy single-byte page common in old Kindle metadata). The
/// fallback maps every byte, so the chain itself never fails.
pub(crate) fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Strict decode for identifier fields (ASIN, document type), which
/// the formats define as ASCII.
///
/// Failure is attributed to the named field only; the assembler
/// recovers by dropping the field, never the document.
pub(crate) fn decode_ascii(bytes: &[u8], field: &'static str) -> Result<String> {
    if bytes.is_ascii() {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    } else {
        Err(Error::EncodingFailure(field))
    }
}
