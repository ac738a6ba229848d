//! Packed-book (MOBI/AZW/AZW3) metadata decoding.

mod headers;
mod section;

pub use headers::{MobiDoc, exth};
pub use section::SectionTable;
