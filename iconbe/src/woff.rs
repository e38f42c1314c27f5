//! WOFF 1.0, zlib compressed sfnt tables.

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};
use log::trace;

use crate::{
    error::Error,
    sfnt::{pad4, Sfnt},
};

const SIGNATURE: &[u8; 4] = b"wOFF";
const HEADER_SIZE: usize = 44;
const DIRECTORY_ENTRY_SIZE: usize = 20;

fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Wrap TrueType bytes as WOFF.
///
/// A table is stored uncompressed when zlib doesn't make it smaller.
pub fn wrap_woff(ttf: &[u8]) -> Result<Vec<u8>, Error> {
    let sfnt = Sfnt::read(ttf)?;
    let num_tables = sfnt.tables.len();

    let mut directory = Vec::with_capacity(num_tables * DIRECTORY_ENTRY_SIZE);
    let mut data = Vec::new();
    let data_start = HEADER_SIZE + num_tables * DIRECTORY_ENTRY_SIZE;
    for table in sfnt.tables.iter() {
        let compressed = compress(&table.data)?;
        let stored = if compressed.len() < table.data.len() {
            compressed
        } else {
            table.data.clone()
        };
        trace!(
            "{} {} => {} bytes",
            table.tag,
            table.data.len(),
            stored.len()
        );
        directory.extend(table.tag.to_be_bytes());
        directory.extend(((data_start + data.len()) as u32).to_be_bytes());
        directory.extend((stored.len() as u32).to_be_bytes());
        directory.extend((table.data.len() as u32).to_be_bytes());
        directory.extend(table.checksum.to_be_bytes());
        data.extend(stored);
        pad4(&mut data);
    }

    let length = data_start + data.len();
    let mut woff = Vec::with_capacity(length);
    woff.extend(SIGNATURE);
    woff.extend(sfnt.flavor.to_be_bytes());
    woff.extend((length as u32).to_be_bytes());
    woff.extend((num_tables as u16).to_be_bytes());
    woff.extend(0u16.to_be_bytes());
    woff.extend(sfnt.total_size().to_be_bytes());
    // major.minor of the font, not of the format
    woff.extend(1u16.to_be_bytes());
    woff.extend(0u16.to_be_bytes());
    // no metadata or private blocks
    woff.extend([0u8; 20]);
    woff.extend(directory);
    woff.extend(data);
    Ok(woff)
}
