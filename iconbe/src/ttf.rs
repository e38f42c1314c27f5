//! Compiles an svg font into TrueType.
//!
//! Glyph 0 is an empty `.notdef`; the remaining glyphs follow document order,
//! which is code point order. Every glyph advances by the same fixed width.

use chrono::{DateTime, TimeZone, Utc};
use kurbo::{BezPath, CubicBez, PathEl, Point};
use log::debug;
use write_fonts::{
    dump_table,
    tables::{
        cmap::Cmap,
        glyf::{Glyph as RawGlyph, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::Hmtx,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
        vmtx::LongMetric,
    },
    types::{FWord, Fixed, GlyphId, LongDateTime, NameId, Tag, UfWord},
    FontBuilder, OffsetMarker,
};

use iconir::types::GlyphName;

use crate::{document::FontMetadata, error::Error, svgfont::SvgFont};

// The TrueType epoch (1st January 1904) as a Unix timestamp.
const MACINTOSH_EPOCH: i64 = -2082844800;

/// Maximum distance between a cubic and its quadratic replacement, in font units.
const QUAD_ACCURACY: f64 = 1.0;

const WINDOWS_PLATFORM: u16 = 3;
const WINDOWS_UNICODE_BMP: u16 = 1;
const WINDOWS_ENGLISH_US: u16 = 0x409;

fn timestamp_since_mac_epoch(datetime: DateTime<Utc>) -> i64 {
    let mac_epoch = Utc
        .timestamp_opt(MACINTOSH_EPOCH, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    datetime.signed_duration_since(mac_epoch).num_seconds()
}

/// TrueType has no cubic curves.
fn to_quadratic(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                out.move_to(p);
                current = p;
                start = p;
            }
            PathEl::LineTo(p) => {
                out.line_to(p);
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                out.quad_to(p1, p2);
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                for (_, _, quad) in CubicBez::new(current, p1, p2, p3).to_quads(QUAD_ACCURACY) {
                    out.quad_to(quad.p1, quad.p2);
                }
                current = p3;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
            }
        }
    }
    out
}

struct CompiledGlyph {
    name: String,
    code_point: Option<char>,
    advance: u16,
    glyph: RawGlyph,
}

impl CompiledGlyph {
    fn simple(&self) -> Option<&SimpleGlyph> {
        match &self.glyph {
            RawGlyph::Simple(simple) => Some(simple),
            _ => None,
        }
    }
}

fn dump<T>(table: &T, context: &'static str) -> Result<Vec<u8>, Error>
where
    T: write_fonts::FontWrite + write_fonts::validate::Validate,
{
    dump_table(table).map_err(|e| Error::DumpTableError {
        context,
        problem: format!("{e:?}"),
    })
}

fn compile_glyphs(font: &SvgFont) -> Result<Vec<CompiledGlyph>, Error> {
    let mut glyphs = vec![CompiledGlyph {
        name: ".notdef".to_string(),
        code_point: None,
        advance: font.default_advance,
        glyph: RawGlyph::Empty,
    }];
    for svg_glyph in font.glyphs.iter() {
        let path = to_quadratic(&svg_glyph.path);
        let glyph = if path.elements().is_empty() {
            RawGlyph::Empty
        } else {
            let simple =
                SimpleGlyph::from_bezpath(&path).map_err(|e| Error::OutlineError {
                    glyph_name: GlyphName::new(&svg_glyph.name),
                    problem: format!("{e:?}"),
                })?;
            RawGlyph::Simple(simple)
        };
        glyphs.push(CompiledGlyph {
            name: svg_glyph.name.clone(),
            code_point: Some(svg_glyph.code_point),
            advance: svg_glyph.advance,
            glyph,
        });
    }
    if glyphs.len() > u16::MAX as usize {
        return Err(Error::TooManyGlyphs(glyphs.len()));
    }
    Ok(glyphs)
}

/// glyf and a long format loca.
fn glyf_loca(glyphs: &[CompiledGlyph]) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let mut glyf = Vec::new();
    let mut loca = Vec::with_capacity((glyphs.len() + 1) * 4);
    loca.extend(0u32.to_be_bytes());
    for glyph in glyphs {
        let bytes = match glyph.simple() {
            Some(simple) => dump(simple, "glyf")?,
            None => Vec::new(),
        };
        glyf.extend(bytes);
        // glyph offsets stay 4-byte aligned
        while glyf.len() % 4 != 0 {
            glyf.push(0);
        }
        loca.extend((glyf.len() as u32).to_be_bytes());
    }
    Ok((glyf, loca))
}

#[derive(Default)]
struct Limits {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
    min_left_side_bearing: i16,
    min_right_side_bearing: i16,
    x_max_extent: i16,
    advance_width_max: u16,
    max_points: u16,
    max_contours: u16,
}

fn limits(glyphs: &[CompiledGlyph]) -> Limits {
    let mut limits = Limits {
        advance_width_max: glyphs.iter().map(|g| g.advance).max().unwrap_or_default(),
        ..Default::default()
    };
    let mut first = true;
    for glyph in glyphs {
        let Some(simple) = glyph.simple() else {
            continue;
        };
        let bbox = simple.bbox;
        let rsb = (glyph.advance as i32 - bbox.x_max as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        let num_points = simple.contours.iter().map(|c| c.len()).sum::<usize>() as u16;
        let num_contours = simple.contours.len() as u16;
        if first {
            limits.x_min = bbox.x_min;
            limits.y_min = bbox.y_min;
            limits.x_max = bbox.x_max;
            limits.y_max = bbox.y_max;
            limits.min_left_side_bearing = bbox.x_min;
            limits.min_right_side_bearing = rsb;
            limits.x_max_extent = bbox.x_max;
            first = false;
        } else {
            limits.x_min = limits.x_min.min(bbox.x_min);
            limits.y_min = limits.y_min.min(bbox.y_min);
            limits.x_max = limits.x_max.max(bbox.x_max);
            limits.y_max = limits.y_max.max(bbox.y_max);
            limits.min_left_side_bearing = limits.min_left_side_bearing.min(bbox.x_min);
            limits.min_right_side_bearing = limits.min_right_side_bearing.min(rsb);
            limits.x_max_extent = limits.x_max_extent.max(bbox.x_max);
        }
        limits.max_points = limits.max_points.max(num_points);
        limits.max_contours = limits.max_contours.max(num_contours);
    }
    limits
}

fn name_table(metadata: &FontMetadata) -> Name {
    let family = metadata.family.clone();
    let postscript: String = family
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let version = format!(
        "Version {}.{}",
        metadata.version.major, metadata.version.minor
    );
    let entries = [
        (NameId::FAMILY_NAME, family.clone()),
        (NameId::SUBFAMILY_NAME, "Regular".to_string()),
        (NameId::UNIQUE_ID, format!("{family}:{}", metadata.version)),
        (NameId::FULL_NAME, family.clone()),
        (NameId::VERSION_STRING, version),
        (NameId::POSTSCRIPT_NAME, postscript),
    ];
    let records = entries
        .into_iter()
        .map(|(name_id, value)| NameRecord {
            name_id,
            platform_id: WINDOWS_PLATFORM,
            encoding_id: WINDOWS_UNICODE_BMP,
            language_id: WINDOWS_ENGLISH_US,
            string: OffsetMarker::new(value),
        })
        .collect::<Vec<_>>();
    Name::new(records.into_iter().collect())
}

/// Compile TrueType bytes.
///
/// `timestamp` becomes the head created and modified dates; passing the same
/// value keeps the output reproducible.
pub fn compile_ttf(
    font: &SvgFont,
    metadata: &FontMetadata,
    timestamp: DateTime<Utc>,
) -> Result<Vec<u8>, Error> {
    let glyphs = compile_glyphs(font)?;
    let limits = limits(&glyphs);
    let num_glyphs = glyphs.len() as u16;
    debug!("Compiling {} glyphs for {}", num_glyphs, metadata.family);

    let (glyf, loca) = glyf_loca(&glyphs)?;

    let mappings = glyphs.iter().enumerate().filter_map(|(gid, glyph)| {
        glyph
            .code_point
            .map(|ch| (ch, GlyphId::new(gid as u32)))
    });
    let cmap = Cmap::from_mappings(mappings).map_err(|e| Error::CmapConflict(format!("{e:?}")))?;

    let now = LongDateTime::new(timestamp_since_mac_epoch(timestamp));
    let head = Head {
        font_revision: Fixed::from_f64(
            metadata.version.major as f64 + metadata.version.minor as f64 / 1000.0,
        ),
        units_per_em: font.units_per_em,
        created: now,
        modified: now,
        x_min: limits.x_min,
        y_min: limits.y_min,
        x_max: limits.x_max,
        y_max: limits.y_max,
        lowest_rec_ppem: 8,
        index_to_loc_format: 1,
        ..Default::default()
    };

    let hhea = Hhea {
        ascender: FWord::new(font.ascender),
        descender: FWord::new(font.descender),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(limits.advance_width_max),
        min_left_side_bearing: FWord::new(limits.min_left_side_bearing),
        min_right_side_bearing: FWord::new(limits.min_right_side_bearing),
        x_max_extent: FWord::new(limits.x_max_extent),
        caret_slope_rise: 1,
        number_of_h_metrics: num_glyphs,
        ..Default::default()
    };

    let long_metrics = glyphs
        .iter()
        .map(|g| LongMetric {
            advance: g.advance,
            side_bearing: g.simple().map(|s| s.bbox.x_min).unwrap_or_default(),
        })
        .collect::<Vec<_>>();
    let hmtx = Hmtx::new(long_metrics, Vec::new());

    let maxp = Maxp {
        num_glyphs,
        // maxp computes it's version based on whether fields are set
        max_points: Some(limits.max_points),
        max_contours: Some(limits.max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let code_points = || {
        glyphs
            .iter()
            .filter_map(|g| g.code_point)
            .map(|c| (c as u32).min(0xFFFF) as u16)
    };
    let advances: Vec<u32> = glyphs
        .iter()
        .filter(|g| g.advance > 0)
        .map(|g| g.advance as u32)
        .collect();
    let x_avg_char_width = if advances.is_empty() {
        0
    } else {
        (advances.iter().sum::<u32>() as f64 / advances.len() as f64).round() as i16
    };
    let os2 = Os2 {
        x_avg_char_width,
        us_weight_class: 400,
        us_width_class: 5,
        // bit 60, Private Use Area
        ul_unicode_range_2: 1 << 28,
        ach_vend_id: Tag::new(b"NONE"),
        us_first_char_index: code_points().min().unwrap_or_default(),
        us_last_char_index: code_points().max().unwrap_or_default(),
        s_typo_ascender: font.ascender,
        s_typo_descender: font.descender,
        s_typo_line_gap: 0,
        us_win_ascent: font.ascender.max(limits.y_max).max(0) as u16,
        us_win_descent: (-(font.descender.min(limits.y_min) as i32)).max(0) as u16,

        // Avoid "field must be present for version 2" caused by default to None
        ul_code_page_range_1: Some(0),
        ul_code_page_range_2: Some(0),
        sx_height: Some(0),
        s_cap_height: Some(0),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),

        ..Default::default()
    };

    let post = Post::new_v2(glyphs.iter().map(|g| g.name.as_str()));

    let mut builder = FontBuilder::default();
    builder.add_raw(Tag::new(b"cmap"), dump(&cmap, "cmap")?);
    builder.add_raw(Tag::new(b"glyf"), glyf);
    builder.add_raw(Tag::new(b"head"), dump(&head, "head")?);
    builder.add_raw(Tag::new(b"hhea"), dump(&hhea, "hhea")?);
    builder.add_raw(Tag::new(b"hmtx"), dump(&hmtx, "hmtx")?);
    builder.add_raw(Tag::new(b"loca"), loca);
    builder.add_raw(Tag::new(b"maxp"), dump(&maxp, "maxp")?);
    builder.add_raw(Tag::new(b"name"), dump(&name_table(metadata), "name")?);
    builder.add_raw(Tag::new(b"OS/2"), dump(&os2, "OS/2")?);
    builder.add_raw(Tag::new(b"post"), dump(&post, "post")?);
    Ok(builder.build())
}
