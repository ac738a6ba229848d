//! Filename-heuristic decoding for formats with no embedded metadata.
//!
//! No file content is read: the stem alone supplies the title and, for
//! PDFs, an optional `-asin_` suffix. Sideloading tools also append
//! `-type_<code>` after the ASIN, which is split back off.

use std::path::Path;

/// Title and ASIN derived from a file stem.
#[derive(Debug, Default, PartialEq)]
pub struct FilenameDoc {
    pub title: Option<String>,
    pub asin: Option<String>,
}

/// Derive metadata from the filename stem. With `extract_asin` unset
/// (opaque documents) the whole stem is the title.
pub fn parse(path: &Path, extract_asin: bool) -> FilenameDoc {
    let stem = match path.file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => return FilenameDoc::default(),
    };

    if extract_asin
        && let Some(pos) = stem.rfind("-asin_")
    {
        let title = &stem[..pos];
        let mut asin = &stem[pos + "-asin_".len()..];
        if let Some(type_pos) = asin.rfind("-type_") {
            asin = &asin[..type_pos];
        }
        return FilenameDoc {
            title: Some(title.to_string()).filter(|t| !t.is_empty()),
            asin: Some(asin.to_string()).filter(|a| !a.is_empty()),
        };
    }

    FilenameDoc {
        title: Some(stem).filter(|t| !t.is_empty()),
        asin: None,
    }
}
