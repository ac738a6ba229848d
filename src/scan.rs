//! Directory scanning: decode every supported document under a device
//! root and build a collection index from the folder layout.

use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::{Collection, CollectionIndex, collection_key};
use crate::error::{Error, Result};
use crate::metadata::{DocumentMetadata, Extractor};

/// Extensions the decoder dispatch recognizes.
pub const SUPPORTED_EXTENSIONS: [&str; 10] = [
    "pdf", "mobi", "prc", "txt", "tpz", "azw1", "azw", "manga", "azw2", "azw3",
];

pub const DOCUMENTS_DIR: &str = "documents";

fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Decode every supported file under `<root>/documents`, recursively.
///
/// Per-file decode failures are logged and skipped; one bad file never
/// aborts the batch.
pub fn scan(root: &Path) -> Result<Vec<DocumentMetadata>> {
    let extractor = Extractor::new(root);
    let mut paths = Vec::new();
    collect_files(&root.join(DOCUMENTS_DIR), &mut paths)?;
    paths.sort();

    let mut corpus = Vec::new();
    for path in paths {
        if !is_supported(&path) {
            continue;
        }
        match extractor.extract(&path) {
            Ok(meta) => corpus.push(meta),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping undecodable file");
            }
        }
    }
    Ok(corpus)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Build one collection per top-level directory under `documents/`,
/// with a token for each file it contains. Nesting deeper than one
/// level is rejected.
pub fn build_index(root: &Path, corpus: &[DocumentMetadata]) -> Result<CollectionIndex> {
    let docs = root.join(DOCUMENTS_DIR);
    let mut dirs = Vec::new();
    for entry in fs::read_dir(&docs)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    let mut index = CollectionIndex::new();
    for dir in dirs {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                return Err(Error::UnsupportedFormat(format!(
                    "nested collection directory: {}",
                    entry.path().display()
                )));
            }
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut collection = Collection::default();
        for meta in corpus {
            if meta.source_path.parent() == Some(dir.as_path()) {
                collection.items.push(meta.token());
            }
        }
        index.insert(collection_key(&name), collection);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_scan_skips_unsupported_and_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("documents/a.pdf"));
        touch(&root.join("documents/b.epub"));
        // Empty file with a packed-book extension: decode fails, scan
        // continues.
        touch(&root.join("documents/broken.mobi"));

        let corpus = scan(root).unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(corpus[0].source_path.ends_with("a.pdf"));
    }

    #[test]
    fn test_build_index_groups_by_top_level_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("documents/loose.txt"));
        touch(&root.join("documents/SF/a.pdf"));
        touch(&root.join("documents/SF/b-asin_B001.pdf"));
        touch(&root.join("documents/History/c.txt"));

        let corpus = scan(root).unwrap();
        assert_eq!(corpus.len(), 4);

        let index = build_index(root, &corpus).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index["SF@en-US"].items.len(), 2);
        assert!(index["SF@en-US"].items.contains(&"#B001^PDOC".to_string()));
        assert_eq!(index["History@en-US"].items.len(), 1);
    }

    #[test]
    fn test_build_index_rejects_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("documents/SF/Classics/a.pdf"));

        let corpus = scan(root).unwrap();
        assert!(matches!(
            build_index(root, &corpus),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
