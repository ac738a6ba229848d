//! Filesystem operations over a decoded corpus: collision-safe copy,
//! collection export, readable renaming.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::{CollectionIndex, display_name, resolve};
use crate::error::Result;
use crate::metadata::DocumentMetadata;
use crate::scan::DOCUMENTS_DIR;

/// Characters FAT filesystems (and the token grammar) cannot carry.
const UNSAFE_CHARS: &str = " /\\*?\"':|!";

/// Copy `src` into `dst_dir`, appending `_samename` before the
/// extension until the destination name is free.
pub fn safe_copy(src: &Path, dst_dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut dst = dst_dir.join(name);
    while dst.exists() {
        let stem = dst
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let renamed = match dst.extension() {
            Some(ext) => format!("{stem}_samename.{}", ext.to_string_lossy()),
            None => format!("{stem}_samename"),
        };
        dst = dst_dir.join(renamed);
    }
    fs::copy(src, &dst)?;
    Ok(dst)
}

/// Materialize collections as folders: every resolved item is copied
/// into `<output>/documents/<collection>/`, and files belonging to no
/// collection land in `<output>/documents` itself.
pub fn export_collections(
    output_root: &Path,
    index: &CollectionIndex,
    corpus: &[DocumentMetadata],
) -> Result<()> {
    let out_docs = output_root.join(DOCUMENTS_DIR);
    fs::create_dir_all(&out_docs)?;

    // Processed bookkeeping belongs here, not on the metadata records.
    let mut processed: HashSet<&Path> = HashSet::new();
    for (key, collection) in index {
        let out_dir = out_docs.join(display_name(key));
        fs::create_dir_all(&out_dir)?;
        for item in &collection.items {
            match resolve(item, corpus) {
                Some(meta) => {
                    safe_copy(&meta.source_path, &out_dir)?;
                    processed.insert(meta.source_path.as_path());
                }
                None => {
                    tracing::warn!(
                        collection = display_name(key),
                        item = %item,
                        "skipped unresolved item"
                    );
                }
            }
        }
    }

    for meta in corpus {
        if !processed.contains(meta.source_path.as_path()) {
            safe_copy(&meta.source_path, &out_docs)?;
        }
    }
    Ok(())
}

/// FAT-safe rendition of a metadata string.
fn fat_safe(s: &str) -> String {
    s.chars()
        .map(|c| if UNSAFE_CHARS.contains(c) { '_' } else { c })
        .collect()
}

/// Rename every decoded file to `[<author>]-<title>` (or `<title>`
/// when no author is known), keeping the extension. Files without a
/// decoded title keep their names.
pub fn rename_readable(corpus: &[DocumentMetadata]) -> Result<()> {
    for meta in corpus {
        let Some(title) = meta.title.as_deref() else {
            tracing::warn!(path = %meta.source_path.display(), "no title, leaving filename unchanged");
            continue;
        };
        let base = match meta.author.as_deref() {
            Some(author) => format!("[{author}]-{title}"),
            None => title.to_string(),
        };
        let mut name = fat_safe(&base);
        if !meta.extension.is_empty() {
            name.push('.');
            name.push_str(&meta.extension);
        }
        let Some(dir) = meta.source_path.parent() else {
            continue;
        };
        let dst = dir.join(name);
        if dst != meta.source_path {
            fs::rename(&meta.source_path, &dst)?;
        }
    }
    Ok(())
}
