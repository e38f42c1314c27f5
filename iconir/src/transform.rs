//! The svg `transform` attribute.

use std::sync::OnceLock;

use kurbo::{Affine, Vec2};
use regex::Regex;

use crate::{error::SvgError, pathdata::parse_number_list};

fn transform_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z]+)\s*\(([^)]*)\)").expect("transform regex is valid")
    })
}

/// Parse a transform list into a single affine.
///
/// Transforms in a list apply right to left, as in svg.
pub fn parse_transform(raw: &str) -> Result<Affine, SvgError> {
    let bad = || SvgError::Transform(raw.to_string());
    let mut affine = Affine::IDENTITY;
    let mut consumed = 0;
    for caps in transform_re().captures_iter(raw) {
        let whole = caps.get(0).ok_or_else(bad)?;
        // only separators may sit between transforms
        if !raw[consumed..whole.start()]
            .chars()
            .all(|c| c.is_whitespace() || c == ',')
        {
            return Err(bad());
        }
        consumed = whole.end();

        let args = parse_number_list("transform", &caps[2])?;
        let next = match (&caps[1], args.as_slice()) {
            ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
            ("translate", [x]) => Affine::translate((*x, 0.0)),
            ("translate", [x, y]) => Affine::translate((*x, *y)),
            ("scale", [s]) => Affine::scale(*s),
            ("scale", [x, y]) => Affine::scale_non_uniform(*x, *y),
            ("rotate", [deg]) => Affine::rotate(deg.to_radians()),
            ("rotate", [deg, cx, cy]) => {
                let center = Vec2::new(*cx, *cy);
                Affine::translate(center)
                    * Affine::rotate(deg.to_radians())
                    * Affine::translate(-center)
            }
            ("skewX", [deg]) => Affine::new([1.0, 0.0, deg.to_radians().tan(), 1.0, 0.0, 0.0]),
            ("skewY", [deg]) => Affine::new([1.0, deg.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]),
            _ => return Err(bad()),
        };
        affine = affine * next;
    }
    if !raw[consumed..]
        .chars()
        .all(|c| c.is_whitespace() || c == ',')
    {
        return Err(bad());
    }
    Ok(affine)
}
