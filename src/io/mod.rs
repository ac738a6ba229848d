//! Random-access byte sources and relative regions over them.

mod byte_source;
mod region;

pub use byte_source::{ByteSource, FileSource, MemorySource};
pub use region::ByteRegion;
