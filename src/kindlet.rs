//! Package-manifest (AZW2/Kindlet) metadata decoding.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Title and ASIN pulled from a Kindlet package manifest.
///
/// Developer-signed packages legitimately carry no ASIN; callers fall
/// back to hash identity in that case.
#[derive(Debug, Default, PartialEq)]
pub struct KindletDoc {
    pub title: Option<String>,
    pub asin: Option<String>,
}

impl KindletDoc {
    /// Open the package as a zip archive and read its manifest. Only
    /// the one small archive member is ever read.
    pub fn parse(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut manifest = String::new();
        archive.by_name(MANIFEST_PATH)?.read_to_string(&mut manifest)?;
        Ok(Self::from_manifest(&manifest))
    }

    /// Extract the two line-anchored key/value pairs we care about.
    fn from_manifest(manifest: &str) -> Self {
        let mut doc = KindletDoc::default();
        for line in manifest.lines() {
            if let Some(value) = line.strip_prefix("Implementation-Title:") {
                let value = value.trim();
                if !value.is_empty() {
                    doc.title = Some(value.to_string());
                }
            } else if let Some(value) = line.strip_prefix("Amazon-ASIN:") {
                let value = value.trim();
                if !value.is_empty() {
                    doc.asin = Some(value.to_string());
                }
            }
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_with_title_and_asin() {
        let doc = KindletDoc::from_manifest(
            "Manifest-Version: 1.0\r\nImplementation-Title: Every Word\r\nAmazon-ASIN: B00APP001\r\n",
        );
        assert_eq!(doc.title.as_deref(), Some("Every Word"));
        assert_eq!(doc.asin.as_deref(), Some("B00APP001"));
    }

    #[test]
    fn test_developer_package_without_asin() {
        let doc = KindletDoc::from_manifest("Implementation-Title: My Dev App\n");
        assert_eq!(doc.title.as_deref(), Some("My Dev App"));
        assert_eq!(doc.asin, None);
    }

    #[test]
    fn test_keys_must_be_line_anchored() {
        let doc =
            KindletDoc::from_manifest("X-Implementation-Title: nope\nComment: Amazon-ASIN: nope\n");
        assert_eq!(doc, KindletDoc::default());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let doc = KindletDoc::from_manifest("Implementation-Title:   \nAmazon-ASIN:\n");
        assert_eq!(doc, KindletDoc::default());
    }
}
