//! WOFF 2.0 with every table in a single brotli stream.
//!
//! Tables are stored untransformed: glyf and loca use the null transform.

use std::io::Write;

use log::trace;
use write_fonts::types::Tag;

use crate::{
    error::Error,
    sfnt::{pad4, Sfnt, SfntTable},
};

const SIGNATURE: &[u8; 4] = b"wOF2";
const HEADER_SIZE: usize = 48;

const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;

/// Arbitrary tag, the four tag bytes follow the flags.
const ARBITRARY_TAG: u8 = 0x3f;
/// For glyf and loca, 3 rather than 0 means untransformed.
const NULL_TRANSFORM_GLYF: u8 = 3 << 6;

const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

fn known_tag_index(tag: Tag) -> Option<u8> {
    let bytes = tag.to_be_bytes();
    KNOWN_TAGS
        .iter()
        .position(|known| **known == bytes)
        .map(|i| i as u8)
}

/// Variable length big-endian, 7 bits per byte, high bit set on all but the last.
pub(crate) fn write_uint_base128(value: u32, out: &mut Vec<u8>) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut remaining = value;
    loop {
        groups[len] = (remaining & 0x7f) as u8;
        len += 1;
        remaining >>= 7;
        if remaining == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}

/// loca has to come straight after glyf.
fn directory_order(tables: &[SfntTable]) -> Vec<&SfntTable> {
    let loca = Tag::new(b"loca");
    let glyf = Tag::new(b"glyf");
    let mut ordered = Vec::with_capacity(tables.len());
    for table in tables.iter().filter(|t| t.tag != loca) {
        ordered.push(table);
        if table.tag == glyf {
            ordered.extend(tables.iter().filter(|t| t.tag == loca));
        }
    }
    if !tables.iter().any(|t| t.tag == glyf) {
        ordered.extend(tables.iter().filter(|t| t.tag == loca));
    }
    ordered
}

fn compress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut writer =
        brotli::CompressorWriter::new(Vec::new(), 4096, BROTLI_QUALITY, BROTLI_WINDOW);
    writer.write_all(data)?;
    writer.flush()?;
    Ok(writer.into_inner())
}

/// Wrap TrueType bytes as WOFF2.
pub fn wrap_woff2(ttf: &[u8]) -> Result<Vec<u8>, Error> {
    let sfnt = Sfnt::read(ttf)?;
    let tables = directory_order(&sfnt.tables);

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in tables.iter() {
        let transform = if table.tag == Tag::new(b"glyf") || table.tag == Tag::new(b"loca") {
            NULL_TRANSFORM_GLYF
        } else {
            0
        };
        match known_tag_index(table.tag) {
            Some(index) => directory.push(index | transform),
            None => {
                directory.push(ARBITRARY_TAG | transform);
                directory.extend(table.tag.to_be_bytes());
            }
        }
        write_uint_base128(table.data.len() as u32, &mut directory);
        stream.extend(&table.data);
    }
    let compressed = compress(&stream)?;
    trace!(
        "{} tables, {} bytes => {} compressed",
        tables.len(),
        stream.len(),
        compressed.len()
    );

    let mut body = directory;
    let compressed_start = HEADER_SIZE + body.len();
    body.extend(&compressed);
    let mut woff2 = Vec::with_capacity(HEADER_SIZE + body.len() + 3);
    woff2.extend(SIGNATURE);
    woff2.extend(sfnt.flavor.to_be_bytes());
    // length, patched once padding is known
    woff2.extend(0u32.to_be_bytes());
    woff2.extend((tables.len() as u16).to_be_bytes());
    woff2.extend(0u16.to_be_bytes());
    woff2.extend(sfnt.total_size().to_be_bytes());
    woff2.extend((compressed.len() as u32).to_be_bytes());
    woff2.extend(1u16.to_be_bytes());
    woff2.extend(0u16.to_be_bytes());
    // no metadata or private blocks
    woff2.extend([0u8; 20]);
    debug_assert_eq!(HEADER_SIZE, woff2.len());
    woff2.extend(body);
    debug_assert_eq!(compressed_start + compressed.len(), woff2.len());
    pad4(&mut woff2);
    let length = (woff2.len() as u32).to_be_bytes();
    woff2[8..12].copy_from_slice(&length);
    Ok(woff2)
}
