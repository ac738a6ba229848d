use crate::error::{Error, Result};
use crate::io::ByteSource;

const HEADER_LEN: usize = 78;
const MAGIC: &[u8; 8] = b"BOOKMOBI";
const MAGIC_OFFSET: usize = 0x3C;

/// Offset index at the start of a packed-book file, locating its
/// internal sections.
pub struct SectionTable<'a> {
    source: &'a dyn ByteSource,
    /// Section start offsets plus a synthetic end offset (the source
    /// length), so every section has a well-defined length.
    offsets: Vec<u64>,
}

impl<'a> SectionTable<'a> {
    /// Validate the 78-byte database header and build the offset table.
    pub fn new(source: &'a dyn ByteSource) -> Result<Self> {
        if source.len() < HEADER_LEN as u64 {
            return Err(Error::FormatMismatch("packed-book"));
        }
        let header = source.read_at(0, HEADER_LEN)?;
        if &header[MAGIC_OFFSET..MAGIC_OFFSET + 8] != MAGIC {
            return Err(Error::FormatMismatch("packed-book"));
        }

        let count = u16::from_be_bytes([header[76], header[77]]) as usize;
        let table = source.read_at(HEADER_LEN as u64, count * 8).map_err(|_| {
            Error::CorruptRecord(format!("section table truncated ({count} entries)"))
        })?;

        let mut offsets = Vec::with_capacity(count + 1);
        for entry in table.chunks_exact(8) {
            // 4-byte start offset; the trailing 4 attribute bytes are ignored.
            offsets.push(u32::from_be_bytes([entry[0], entry[1], entry[2], entry[3]]) as u64);
        }
        offsets.push(source.len());

        Ok(Self { source, offsets })
    }

    pub fn section_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Byte slice between two consecutive section offsets.
    pub fn load_section(&self, index: usize) -> Result<Vec<u8>> {
        let (Some(&start), Some(&end)) = (self.offsets.get(index), self.offsets.get(index + 1))
        else {
            return Err(Error::CorruptRecord(format!(
                "section {index} out of range"
            )));
        };
        if end < start {
            return Err(Error::CorruptRecord(format!(
                "section {index} has negative length"
            )));
        }
        Ok(self.source.read_at(start, (end - start) as usize)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySource;

    fn pdb_file(sections: &[&[u8]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN + sections.len() * 8];
        data[MAGIC_OFFSET..MAGIC_OFFSET + 8].copy_from_slice(MAGIC);
        data[76..78].copy_from_slice(&(sections.len() as u16).to_be_bytes());
        let mut offset = data.len() as u32;
        for (i, section) in sections.iter().enumerate() {
            let pos = HEADER_LEN + i * 8;
            data[pos..pos + 4].copy_from_slice(&offset.to_be_bytes());
            offset += section.len() as u32;
        }
        for section in sections {
            data.extend_from_slice(section);
        }
        data
    }

    #[test]
    fn test_load_sections() {
        let source = MemorySource::new(pdb_file(&[b"first", b"second"]));
        let table = SectionTable::new(&source).unwrap();
        assert_eq!(table.section_count(), 2);
        assert_eq!(table.load_section(0).unwrap(), b"first");
        // The last section runs to the end of the source.
        assert_eq!(table.load_section(1).unwrap(), b"second");
        assert!(table.load_section(2).is_err());
    }

    #[test]
    fn test_bad_magic() {
        let mut data = pdb_file(&[b"x"]);
        data[MAGIC_OFFSET] = b'X';
        let source = MemorySource::new(data);
        assert!(matches!(
            SectionTable::new(&source),
            Err(Error::FormatMismatch("packed-book"))
        ));
    }

    #[test]
    fn test_truncated_header() {
        let source = MemorySource::new(vec![0u8; 40]);
        assert!(matches!(
            SectionTable::new(&source),
            Err(Error::FormatMismatch("packed-book"))
        ));
    }

    #[test]
    fn test_truncated_section_table() {
        let mut data = vec![0u8; HEADER_LEN];
        data[MAGIC_OFFSET..MAGIC_OFFSET + 8].copy_from_slice(MAGIC);
        data[76..78].copy_from_slice(&100u16.to_be_bytes());
        let source = MemorySource::new(data);
        assert!(matches!(
            SectionTable::new(&source),
            Err(Error::CorruptRecord(_))
        ));
    }
}
