//! Reading and writing svg path data.

use kurbo::{BezPath, PathEl, Point};

use crate::error::SvgError;

pub fn parse_path_data(d: &str) -> Result<BezPath, SvgError> {
    if d.trim().is_empty() {
        return Ok(BezPath::new());
    }
    BezPath::from_svg(d).map_err(|e| SvgError::PathData(format!("{d}: {e}")))
}

/// Format a number with at most `precision` fractional digits.
///
/// Trailing zeros and a trailing dot are dropped, and negative zero
/// prints as zero.
pub fn format_number(value: f64, precision: usize) -> String {
    let mut s = format!("{value:.precision$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn push_point(out: &mut String, p: Point, precision: usize) {
    out.push_str(&format_number(p.x, precision));
    out.push(' ');
    out.push_str(&format_number(p.y, precision));
}

/// Absolute commands only, so the output does not depend on rounding of
/// earlier segments.
pub fn format_path_data(path: &BezPath, precision: usize) -> String {
    let mut out = String::new();
    for el in path.elements() {
        if !out.is_empty() {
            out.push(' ');
        }
        match *el {
            PathEl::MoveTo(p) => {
                out.push('M');
                push_point(&mut out, p, precision);
            }
            PathEl::LineTo(p) => {
                out.push('L');
                push_point(&mut out, p, precision);
            }
            PathEl::QuadTo(p1, p2) => {
                out.push('Q');
                push_point(&mut out, p1, precision);
                out.push(' ');
                push_point(&mut out, p2, precision);
            }
            PathEl::CurveTo(p1, p2, p3) => {
                out.push('C');
                push_point(&mut out, p1, precision);
                out.push(' ');
                push_point(&mut out, p2, precision);
                out.push(' ');
                push_point(&mut out, p3, precision);
            }
            PathEl::ClosePath => out.push('Z'),
        }
    }
    out
}

/// Parse an svg list of numbers, e.g. a viewBox or polygon points.
pub fn parse_number_list(attr: &str, raw: &str) -> Result<Vec<f64>, SvgError> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|_| SvgError::Number {
                attr: attr.to_string(),
                value: raw.to_string(),
            })
        })
        .collect()
}

/// Parse a length, ignoring a `px` suffix. Other units and percentages
/// are not resolvable without a viewport and yield None.
pub fn parse_length(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let raw = raw.strip_suffix("px").unwrap_or(raw);
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
