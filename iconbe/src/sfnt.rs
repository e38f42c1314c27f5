//! Splits a compiled sfnt back into its tables for the web wrappers.

use write_fonts::{read::FontRef, types::Tag};

use crate::error::Error;

#[derive(Debug, Clone)]
pub(crate) struct SfntTable {
    pub tag: Tag,
    pub checksum: u32,
    pub data: Vec<u8>,
}

pub(crate) struct Sfnt {
    pub flavor: u32,
    /// In table directory order, which is sorted by tag.
    pub tables: Vec<SfntTable>,
}

impl Sfnt {
    pub fn read(bytes: &[u8]) -> Result<Sfnt, Error> {
        let font = FontRef::new(bytes).map_err(|e| Error::ReadFontError(format!("{e}")))?;
        let mut tables = Vec::new();
        for record in font.table_directory.table_records() {
            let start = record.offset() as usize;
            let end = start + record.length() as usize;
            let data = bytes.get(start..end).ok_or_else(|| {
                Error::ReadFontError(format!("{} extends past the end of the font", record.tag()))
            })?;
            tables.push(SfntTable {
                tag: record.tag(),
                checksum: record.checksum(),
                data: data.to_vec(),
            });
        }
        tables.sort_by_key(|t| t.tag);
        Ok(Sfnt {
            flavor: font.table_directory.sfnt_version(),
            tables,
        })
    }

    /// What the font would occupy as a plain sfnt, tables padded to 4 bytes.
    pub fn total_size(&self) -> u32 {
        let header = 12 + 16 * self.tables.len();
        let tables: usize = self.tables.iter().map(|t| padded_len(t.data.len())).sum();
        (header + tables) as u32
    }
}

pub(crate) fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub(crate) fn pad4(buf: &mut Vec<u8>) {
    buf.resize(padded_len(buf.len()), 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding() {
        assert_eq!(
            vec![0, 4, 4, 4, 4, 8],
            (0..6).map(padded_len).collect::<Vec<_>>()
        );
        let mut buf = vec![1, 2, 3, 4, 5];
        pad4(&mut buf);
        assert_eq!(vec![1, 2, 3, 4, 5, 0, 0, 0], buf);
    }
}
