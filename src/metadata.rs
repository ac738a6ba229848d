//! Document metadata assembly: format dispatch, canonical-path and
//! hash identity, collection-token derivation.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::{Error, Result};
use crate::filename;
use crate::io::FileSource;
use crate::kindlet::KindletDoc;
use crate::mobi::{MobiDoc, exth};
use crate::topaz::TopazDoc;
use crate::util::{decode_ascii, decode_text};

/// Invariant mount root of the device filesystem. Canonical paths are
/// rewritten onto this prefix so identity is stable across mount
/// points.
pub const KINDLE_ROOT: &str = "/mnt/us";

/// `!` is unsafe in the collection-token grammar.
const ASIN_ESCAPE: &AsciiSet = &CONTROLS.add(b'!');

/// Format family, selected once by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// MOBI/AZW/AZW3: section table plus EXTH records.
    PackedBook,
    /// Topaz/AZW1: block container with variable-width integers.
    BlockContainer,
    /// AZW2/Kindlet: zip package with a manifest.
    Package,
    /// PDF: filename stem with optional `-asin_` suffix.
    Filename,
    /// PRC/TXT/manga: opaque documents, hash-only identity.
    Opaque,
}

impl Family {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mobi" | "azw" | "azw3" => Some(Family::PackedBook),
            "tpz" | "azw1" => Some(Family::BlockContainer),
            "azw2" => Some(Family::Package),
            "pdf" => Some(Family::Filename),
            "prc" | "txt" | "manga" => Some(Family::Opaque),
            _ => None,
        }
    }
}

/// Bibliographic identity of one document file.
///
/// Constructed fresh per scan and never mutated afterwards; batch
/// bookkeeping (processed flags and the like) lives with the caller.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub source_path: PathBuf,
    pub canonical_path: String,
    /// SHA-1 hex digest of `canonical_path`. Hashing the path rather
    /// than the file body keeps identity computable without reading
    /// content.
    pub content_hash: String,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Percent-escaped: `!` becomes `%21`.
    pub asin: Option<String>,
    pub document_type: Option<String>,
    pub is_sample: bool,
    pub extension: String,
}

impl DocumentMetadata {
    /// Collection token: `#<asin>^<type>` when an ASIN is known,
    /// `*<sha1>` otherwise.
    pub fn token(&self) -> String {
        match &self.asin {
            Some(asin) => format!(
                "#{}^{}",
                asin,
                self.document_type.as_deref().unwrap_or("")
            ),
            None => format!("*{}", self.content_hash),
        }
    }
}

/// Builds [`DocumentMetadata`] records for files under a device root.
///
/// The invariant root is injected rather than compiled in, so
/// canonical-path computation is testable against arbitrary roots.
pub struct Extractor {
    device_root: PathBuf,
    invariant_root: String,
}

impl Extractor {
    pub fn new(device_root: impl Into<PathBuf>) -> Self {
        Self {
            device_root: device_root.into(),
            invariant_root: KINDLE_ROOT.to_string(),
        }
    }

    pub fn with_invariant_root(mut self, root: impl Into<String>) -> Self {
        self.invariant_root = root.into();
        self
    }

    /// Decode one file into a metadata record, dispatching on its
    /// extension. Each call opens and closes its own file handle and
    /// touches no shared state.
    pub fn extract(&self, path: &Path) -> Result<DocumentMetadata> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let family = Family::from_extension(&extension)
            .ok_or_else(|| Error::UnsupportedFormat(extension.clone()))?;

        let canonical_path = self.canonical_path(path);
        let content_hash = sha1_hex(&canonical_path);
        let mut meta = DocumentMetadata {
            source_path: path.to_path_buf(),
            canonical_path,
            content_hash,
            title: None,
            author: None,
            asin: None,
            document_type: None,
            is_sample: false,
            extension,
        };

        match family {
            Family::PackedBook => {
                let source = FileSource::open(path)?;
                let doc = MobiDoc::parse(&source)?;
                match doc.title {
                    Some(ref raw_title) => {
                        // Raw header title stays on the UTF-8 path; only
                        // the author and override-title records get the
                        // legacy code-page fallback.
                        meta.title = Some(String::from_utf8_lossy(&raw_title).into_owned());
                        if let Some(author) = doc.exth.get(&exth::AUTHOR) {
                            meta.author = Some(decode_text(author).into_owned());
                        }
                        if let Some(asin) = doc.exth.get(&exth::ASIN) {
                            meta.asin = decode_ascii(asin, "ASIN").ok();
                        }
                        if let Some(doc_type) = doc.exth.get(&exth::DOC_TYPE) {
                            meta.document_type = decode_ascii(doc_type, "document type").ok();
                        }
                        if let Some(title) = doc.exth.get(&exth::TITLE) {
                            meta.title = Some(decode_text(title).into_owned());
                        }
                        meta.is_sample = doc.is_sample();
                    }
                    None => {
                        tracing::warn!(path = %path.display(), "packed-book metadata block absent");
                    }
                }
            }
            Family::BlockContainer => {
                let source = FileSource::open(path)?;
                let doc = TopazDoc::parse(&source)?;
                meta.title = Some(doc.title);
                meta.asin = doc.asin;
                meta.document_type = doc.cde_type;
            }
            Family::Package => {
                let doc = KindletDoc::parse(path)?;
                meta.title = doc.title;
                if doc.asin.is_some() {
                    meta.asin = doc.asin;
                    meta.document_type = Some("AZW2".to_string());
                } else {
                    // Expected for developer apps; the hash token is
                    // what the device itself uses.
                    tracing::debug!(path = %path.display(), "package has no ASIN, using hash identity");
                }
            }
            Family::Filename => {
                let doc = filename::parse(path, true);
                meta.title = doc.title;
                meta.asin = doc.asin;
                meta.document_type = Some("PDOC".to_string());
            }
            Family::Opaque => {
                meta.title = filename::parse(path, false).title;
            }
        }

        if let Some(asin) = meta.asin.take() {
            meta.asin = Some(utf8_percent_encode(&asin, ASIN_ESCAPE).to_string());
        }

        Ok(meta)
    }

    /// Path rewritten onto the invariant root, forward slashes only.
    fn canonical_path(&self, path: &Path) -> String {
        let normalized = path.to_string_lossy().replace('\\', "/");
        let root = self.device_root.to_string_lossy().replace('\\', "/");
        let root = root.trim_end_matches('/');
        match normalized.strip_prefix(root) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                format!("{}{}", self.invariant_root, rest)
            }
            _ => normalized,
        }
    }
}

fn sha1_hex(canonical_path: &str) -> String {
    sha1_smol::Sha1::from(canonical_path.as_bytes()).hexdigest()
}
