//! The collection index: the JSON structure the device stores at
//! `system/collections.json`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metadata::DocumentMetadata;
use crate::token::Token;

pub const INDEX_PATH: &str = "system/collections.json";
const LOCALE: &str = "en-US";

/// One named collection: an ordered token list plus the device's
/// last-access stamp.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Collection {
    pub items: Vec<String>,
    #[serde(default)]
    pub lastaccess: u64,
}

/// Keys are `<name>@<locale>`; a BTreeMap keeps them sorted the way
/// the device writes them.
pub type CollectionIndex = BTreeMap<String, Collection>;

/// Index key for a collection directory name.
pub fn collection_key(name: &str) -> String {
    format!("{name}@{LOCALE}")
}

/// Collection display name without the locale suffix.
pub fn display_name(key: &str) -> &str {
    key.split('@').next().unwrap_or(key)
}

/// Read the index from `<root>/system/collections.json`. A missing or
/// unreadable index is an empty one, matching the device on first
/// boot.
pub fn read_index(root: &Path) -> CollectionIndex {
    match fs::read_to_string(root.join(INDEX_PATH)) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => CollectionIndex::new(),
    }
}

/// Write the index to `<root>/system/collections.json`, creating the
/// `system` directory if needed.
pub fn write_index(root: &Path, index: &CollectionIndex) -> Result<()> {
    let dir = root.join("system");
    fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("collections.json"))?;
    serde_json::to_writer_pretty(file, index)?;
    Ok(())
}

/// Resolve one token string against a decoded corpus, matching by
/// ASIN or canonical-path hash.
pub fn resolve<'a>(item: &str, corpus: &'a [DocumentMetadata]) -> Option<&'a DocumentMetadata> {
    let token = Token::parse(item)?;
    corpus.iter().find(|meta| token.matches(meta))
}
