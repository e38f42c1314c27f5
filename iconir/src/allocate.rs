//! Hands out code points.
//!
//! Code points only ever grow. A number, once handed out, belongs to that
//! glyph for good; if the glyph goes away the number is retired, not recycled.

use log::debug;

use crate::{
    error::Error,
    font::Font,
    types::{CodePoint, GlyphName, DEFAULT_PUA_FLOOR},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePointAllocator {
    floor: CodePoint,
}

impl Default for CodePointAllocator {
    fn default() -> Self {
        CodePointAllocator {
            floor: DEFAULT_PUA_FLOOR,
        }
    }
}

impl CodePointAllocator {
    /// `floor` is the first code point a brand new font receives.
    pub fn new(floor: CodePoint) -> Result<CodePointAllocator, Error> {
        if floor.to_u32() == 0 || !floor.is_valid() {
            return Err(Error::InvalidCodePointFloor(floor));
        }
        Ok(CodePointAllocator { floor })
    }

    pub fn floor(&self) -> CodePoint {
        self.floor
    }

    /// Assign a code point to every glyph that lacks one.
    ///
    /// Pending glyphs are numbered in name order starting just above the
    /// highest code point the font has ever used, or at the floor if that is
    /// higher. Returns the assignments made, in order.
    pub fn allocate(&self, font: &mut Font) -> Result<Vec<(GlyphName, CodePoint)>, Error> {
        let floor_mark = CodePoint::new(self.floor.to_u32() - 1);
        let mut high_water_mark = font
            .max_code_point()
            .map_or(floor_mark, |observed| observed.max(floor_mark));

        // glyphs is keyed by name so this is already name order
        let pending: Vec<GlyphName> = font
            .glyphs
            .values()
            .filter(|g| g.code_point.is_none())
            .map(|g| g.name.clone())
            .collect();

        let mut assigned = Vec::with_capacity(pending.len());
        for name in pending {
            let next = high_water_mark
                .next()
                .ok_or(Error::CodePointsExhausted(high_water_mark))?;
            assigned.push((name, next));
            high_water_mark = next;
        }

        // Nothing is written until every pending glyph has a number
        for (name, code_point) in assigned.iter() {
            if let Some(glyph) = font.glyphs.get_mut(name) {
                debug!("{name} => {code_point}");
                glyph.code_point = Some(*code_point);
            }
        }
        if !assigned.is_empty() {
            font.high_water_mark = Some(high_water_mark);
        }
        Ok(assigned)
    }
}
