//! # kollect
//!
//! Metadata extraction and collection tooling for Kindle document
//! files.
//!
//! ## Features
//!
//! - Decode title/author/ASIN/type from MOBI/AZW/AZW3 (EXTH records),
//!   Topaz/AZW1 (block container), and AZW2 Kindlet packages
//! - Filename-based identity for PDF and opaque documents
//! - Stable SHA-1 identity over device-canonical paths
//! - Read, build, and resolve the device's `collections.json` index
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use kollect::metadata::Extractor;
//!
//! let extractor = Extractor::new("/media/kindle");
//! let meta = extractor
//!     .extract(Path::new("/media/kindle/documents/book.azw3"))
//!     .unwrap();
//! println!(
//!     "{} -> {}",
//!     meta.title.as_deref().unwrap_or("(untitled)"),
//!     meta.token()
//! );
//! ```

pub mod collection;
pub mod error;
pub mod filename;
pub mod io;
pub mod kindlet;
pub mod metadata;
pub mod mobi;
pub mod organize;
pub mod scan;
pub mod token;
pub mod topaz;
pub(crate) mod util;
pub mod vwi;

pub use error::{Error, Result};
pub use metadata::{DocumentMetadata, Extractor, Family, KINDLE_ROOT};
pub use token::Token;
