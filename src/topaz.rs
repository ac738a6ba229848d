//! Block-container (Topaz/AZW1) metadata decoding.
//!
//! The container is a table of tagged header records, each pointing at
//! value blocks by offset, followed by the blocks themselves. All
//! counts and lengths are variable-width integers. The `metadata`
//! block is itself a second, nested record stream.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::io::{ByteRegion, ByteSource};
use crate::util::{decode_ascii, decode_text};
use crate::vwi::{MAX_VWI_BYTES, decode_vwi};

const MAGIC: &[u8; 3] = b"TPZ";

/// Iteration ceiling for self-declared record counts, so malformed
/// input terminates quickly.
const MAX_RECORDS: u32 = 4096;

/// One value block of a header record.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)] // Lengths are part of the container format, useful for debugging
struct Block {
    offset: u32,
    uncompressed_len: u32,
    compressed_len: u32,
}

/// Metadata pulled from the nested record stream of a block container.
#[derive(Debug)]
pub struct TopazDoc {
    pub title: String,
    pub asin: Option<String>,
    pub cde_type: Option<String>,
}

impl TopazDoc {
    pub fn parse(source: &dyn ByteSource) -> Result<Self> {
        let data = ByteRegion::new(source);

        let sig = data.slice(0..4)?;
        if !sig.starts_with(MAGIC) {
            return Err(Error::FormatMismatch("block-container"));
        }

        let mut offset: u64 = 4;
        let (header_records, consumed) = read_vwi(&data, offset)?;
        offset += consumed;
        check_count(header_records, "header records")?;

        // Table of header records: tag name plus the offsets of its
        // value blocks.
        let mut headers: HashMap<Vec<u8>, Vec<Block>> = HashMap::new();
        for _ in 0..header_records {
            offset += 1; // record marker byte
            let (tag_len, consumed) = read_vwi(&data, offset)?;
            offset += consumed;
            let tag = data.slice(offset..offset + tag_len as u64)?;
            offset += tag_len as u64;
            let (num_blocks, consumed) = read_vwi(&data, offset)?;
            offset += consumed;
            check_count(num_blocks, "value blocks")?;
            let mut blocks = Vec::with_capacity(num_blocks as usize);
            for _ in 0..num_blocks {
                let (block_offset, consumed) = read_vwi(&data, offset)?;
                offset += consumed;
                let (uncompressed_len, consumed) = read_vwi(&data, offset)?;
                offset += consumed;
                let (compressed_len, consumed) = read_vwi(&data, offset)?;
                offset += consumed;
                blocks.push(Block {
                    offset: block_offset,
                    uncompressed_len,
                    compressed_len,
                });
            }
            headers.insert(tag, blocks);
        }

        // End-of-table marker byte; block offsets are relative to the
        // position right after it.
        let _eoth = data.byte_at(offset)?;
        offset += 1;
        let base = offset;

        let md_blocks = headers
            .get(b"metadata".as_slice())
            .ok_or(Error::FormatMismatch("block-container"))?;
        let first = md_blocks.first().ok_or_else(|| {
            Error::CorruptRecord("metadata record has no blocks".to_string())
        })?;
        let md_offset = base + first.offset as u64;

        // Integrity check: the block body must open with the literal
        // tag bytes right after its one-byte length prefix.
        if data.slice(md_offset + 1..md_offset + 9)? != b"metadata" {
            return Err(Error::CorruptRecord(
                "damaged metadata record".to_string(),
            ));
        }

        let metadata = parse_metadata_block(&data, md_offset)?;

        let title = metadata
            .get(b"Title".as_slice())
            .ok_or(Error::MissingField("Title"))?;
        let asin = metadata
            .get(b"ASIN".as_slice())
            .and_then(|v| decode_ascii(v, "ASIN").ok());
        let cde_type = metadata
            .get(b"CDEType".as_slice())
            .and_then(|v| decode_ascii(v, "CDEType").ok());

        Ok(TopazDoc {
            title: decode_text(title).into_owned(),
            asin,
            cde_type,
        })
    }
}

/// The nested metadata stream: tag, flags byte, record count byte,
/// then `count` length-prefixed tag/value pairs.
fn parse_metadata_block(
    data: &ByteRegion<'_>,
    block_offset: u64,
) -> Result<HashMap<Vec<u8>, Vec<u8>>> {
    let mut offset = block_offset;
    let (tag_len, consumed) = read_vwi(data, offset)?;
    offset += consumed + tag_len as u64; // literal `metadata`, validated by the caller
    let _flags = data.byte_at(offset)?;
    offset += 1;
    let num_records = data.byte_at(offset)?;
    offset += 1;

    let mut metadata = HashMap::new();
    for _ in 0..num_records {
        let (tag_len, consumed) = read_vwi(data, offset)?;
        offset += consumed;
        let tag = data.slice(offset..offset + tag_len as u64)?;
        offset += tag_len as u64;
        let (value_len, consumed) = read_vwi(data, offset)?;
        offset += consumed;
        let value = data.slice(offset..offset + value_len as u64)?;
        offset += value_len as u64;
        metadata.insert(tag, value);
    }
    Ok(metadata)
}

/// Decode a VWI through a window at `offset`.
fn read_vwi(data: &ByteRegion<'_>, offset: u64) -> Result<(u32, u64)> {
    let window = data.slice(offset..offset + MAX_VWI_BYTES as u64)?;
    if window.is_empty() {
        return Err(Error::CorruptRecord("truncated container".to_string()));
    }
    let (value, consumed) = decode_vwi(&window);
    Ok((value, consumed as u64))
}

fn check_count(count: u32, what: &str) -> Result<()> {
    if count > MAX_RECORDS {
        return Err(Error::CorruptRecord(format!(
            "implausible {what} count: {count}"
        )));
    }
    Ok(())
}
