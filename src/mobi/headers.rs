use std::collections::HashMap;

use crate::error::Result;
use crate::io::ByteSource;
use crate::mobi::SectionTable;

/// EXTH record types consumed by the metadata assembler.
pub mod exth {
    pub const AUTHOR: u32 = 100;
    pub const ASIN: u32 = 113;
    pub const SAMPLE: u32 = 115;
    pub const DOC_TYPE: u32 = 501;
    pub const TITLE: u32 = 503;
}

/// Metadata pulled from record 0 of a packed-book file.
///
/// The title is kept as raw bytes here: encoding is resolved by the
/// assembler per record type, not universally.
#[derive(Debug, Default)]
pub struct MobiDoc {
    pub title: Option<Vec<u8>>,
    pub exth: HashMap<u32, Vec<u8>>,
}

impl MobiDoc {
    /// Decode record 0 of a packed-book source.
    ///
    /// A wrong magic or truncated section table is a typed error; a
    /// structurally valid file whose metadata fields are simply absent
    /// yields an empty `MobiDoc` instead.
    pub fn parse(source: &dyn ByteSource) -> Result<Self> {
        let sections = SectionTable::new(source)?;
        let header = sections.load_section(0)?;
        Ok(Self::from_record0(&header))
    }

    /// Decode the primary metadata header and the EXTH record stream
    /// that follows it.
    fn from_record0(header: &[u8]) -> Self {
        let mut doc = MobiDoc::default();
        if header.len() < 92 {
            return doc;
        }

        // Total header length at offset 20, with a fixed 16-byte
        // adjustment covering the PalmDOC prefix.
        let len_mobi =
            u32::from_be_bytes([header[20], header[21], header[22], header[23]]) as usize + 16;

        let title_offset =
            u32::from_be_bytes([header[84], header[85], header[86], header[87]]) as usize;
        let title_len =
            u32::from_be_bytes([header[88], header[89], header[90], header[91]]) as usize;
        if title_len > 0 && title_offset + title_len <= header.len() {
            doc.title = Some(header[title_offset..title_offset + title_len].to_vec());
        }

        // EXTH block sits right after the primary header: 4-byte
        // signature, total length at +4, record count at +8.
        if len_mobi + 12 > header.len() {
            return doc;
        }
        let len_exth = u32::from_be_bytes([
            header[len_mobi + 4],
            header[len_mobi + 5],
            header[len_mobi + 6],
            header[len_mobi + 7],
        ]) as usize;
        let end = (len_mobi + len_exth).min(header.len());
        let mut records = &header[len_mobi + 12..end.max(len_mobi + 12)];

        while records.len() > 8 {
            let record_type =
                u32::from_be_bytes([records[0], records[1], records[2], records[3]]);
            let record_len =
                u32::from_be_bytes([records[4], records[5], records[6], records[7]]) as usize;
            if record_len < 8 || record_len > records.len() {
                break;
            }
            doc.exth.insert(record_type, records[8..record_len].to_vec());
            records = &records[record_len..];
        }

        doc
    }

    /// True only when the sample-flag record carries the exact
    /// big-endian 1 pattern; the comparison is byte-exact.
    pub fn is_sample(&self) -> bool {
        self.exth
            .get(&exth::SAMPLE)
            .is_some_and(|v| v.as_slice() == [0x00, 0x00, 0x00, 0x01])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Record 0 with the given EXTH records and a trailing title.
    fn record0(title: &[u8], records: &[(u32, &[u8])]) -> Vec<u8> {
        let mobi_len: usize = 232; // value of the length field; header spans 248 bytes
        let mut exth = Vec::new();
        for (record_type, payload) in records {
            exth.extend_from_slice(&record_type.to_be_bytes());
            exth.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
            exth.extend_from_slice(payload);
        }
        let len_exth = 12 + exth.len();

        let mut data = vec![0u8; mobi_len + 16];
        data[20..24].copy_from_slice(&(mobi_len as u32).to_be_bytes());
        let title_offset = data.len() + len_exth;
        data[84..88].copy_from_slice(&(title_offset as u32).to_be_bytes());
        data[88..92].copy_from_slice(&(title.len() as u32).to_be_bytes());
        data.extend_from_slice(b"EXTH");
        data.extend_from_slice(&(len_exth as u32).to_be_bytes());
        data.extend_from_slice(&(records.len() as u32).to_be_bytes());
        data.extend_from_slice(&exth);
        data.extend_from_slice(title);
        data
    }

    #[test]
    fn test_title_and_exth_records() {
        let header = record0(
            b"Raw Title",
            &[
                (exth::AUTHOR, b"Test Author"),
                (exth::ASIN, b"B00TEST1"),
                (exth::DOC_TYPE, b"EBOK"),
            ],
        );
        let doc = MobiDoc::from_record0(&header);
        assert_eq!(doc.title.as_deref(), Some(b"Raw Title".as_slice()));
        assert_eq!(doc.exth[&exth::AUTHOR], b"Test Author");
        assert_eq!(doc.exth[&exth::ASIN], b"B00TEST1");
        assert_eq!(doc.exth[&exth::DOC_TYPE], b"EBOK");
        assert!(!doc.is_sample());
    }

    #[test]
    fn test_sample_flag_is_byte_exact() {
        let doc = MobiDoc::from_record0(&record0(b"T", &[(exth::SAMPLE, &[0, 0, 0, 1])]));
        assert!(doc.is_sample());

        // Numerically 1 but not the expected width: not a sample.
        let doc = MobiDoc::from_record0(&record0(b"T", &[(exth::SAMPLE, &[1])]));
        assert!(!doc.is_sample());

        let doc = MobiDoc::from_record0(&record0(b"T", &[(exth::SAMPLE, &[0, 0, 0, 2])]));
        assert!(!doc.is_sample());
    }

    #[test]
    fn test_short_header_yields_empty_metadata() {
        let doc = MobiDoc::from_record0(&[0u8; 40]);
        assert!(doc.title.is_none());
        assert!(doc.exth.is_empty());
    }

    #[test]
    fn test_title_out_of_range_yields_none() {
        let mut header = vec![0u8; 300];
        header[20..24].copy_from_slice(&232u32.to_be_bytes());
        header[84..88].copy_from_slice(&5000u32.to_be_bytes());
        header[88..92].copy_from_slice(&10u32.to_be_bytes());
        let doc = MobiDoc::from_record0(&header);
        assert!(doc.title.is_none());
    }

    #[test]
    fn test_malformed_exth_record_length_terminates() {
        let mut header = record0(b"T", &[(exth::AUTHOR, b"A")]);
        // Corrupt the first record length to zero.
        let pos = 248 + 12 + 4;
        header[pos..pos + 4].copy_from_slice(&0u32.to_be_bytes());
        let doc = MobiDoc::from_record0(&header);
        assert!(doc.exth.is_empty());
    }
}
