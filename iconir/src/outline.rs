//! Turns an arbitrary icon svg into a single filled outline on a fixed em.
//!
//! Every shape is flattened into path geometry in the root coordinate space,
//! strokes are expanded into filled outlines, the result is scaled onto a
//! square em and centered horizontally, and contours are oriented so nested
//! contours cut holes under the non-zero fill rule.

use std::collections::HashMap;

use kurbo::{
    stroke, Affine, BezPath, Cap, Circle, Ellipse, Join, ParamCurve, PathEl, PathSeg, Point,
    Rect, RoundedRect, Shape, Stroke, StrokeOpts,
};
use log::trace;

use crate::{
    error::SvgError,
    pathdata::{format_path_data, parse_length, parse_number_list, parse_path_data},
    svg::{Document, Element},
    transform::parse_transform,
};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const DEFAULT_UNITS_PER_EM: u16 = 1000;

/// Elements whose content is never painted directly.
const NOT_RENDERED: &[&str] = &[
    "clipPath",
    "defs",
    "desc",
    "filter",
    "linearGradient",
    "marker",
    "mask",
    "metadata",
    "pattern",
    "radialGradient",
    "script",
    "style",
    "symbol",
    "title",
];

/// Rewrites a raw icon into the uniform shape the font needs.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> Result<String, SvgError>;
}

/// Outlines strokes and fits the icon onto a `units_per_em` square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineNormalizer {
    pub units_per_em: u16,
    /// Fractional digits kept in the output path data.
    pub precision: usize,
}

impl Default for OutlineNormalizer {
    fn default() -> Self {
        OutlineNormalizer {
            units_per_em: DEFAULT_UNITS_PER_EM,
            precision: 2,
        }
    }
}

#[derive(Debug, Clone)]
struct Paint {
    transform: Affine,
    fill: bool,
    stroke: bool,
    stroke_width: f64,
    cap: Cap,
    join: Join,
    miter_limit: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Paint {
            transform: Affine::IDENTITY,
            fill: true,
            stroke: false,
            stroke_width: 1.0,
            cap: Cap::Butt,
            join: Join::Miter,
            miter_limit: 4.0,
        }
    }
}

fn is_painted(value: &str) -> bool {
    !matches!(value.trim(), "none" | "transparent")
}

fn is_zero(value: &str) -> bool {
    value.trim().parse::<f64>().map(|v| v <= 0.0).unwrap_or(false)
}

/// Presentation attributes merged with the `style` attribute, which wins.
fn properties(el: &Element) -> HashMap<String, String> {
    let mut props: HashMap<String, String> = el
        .attrs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if let Some(style) = el.attr("style") {
        for decl in style.split(';') {
            if let Some((key, value)) = decl.split_once(':') {
                let value = value.trim().trim_end_matches("!important").trim();
                props.insert(key.trim().to_string(), value.to_string());
            }
        }
    }
    props
}

impl Paint {
    /// The paint for `el` given its parent's. None if `el` is hidden.
    fn inherit(&self, el: &Element) -> Result<Option<Paint>, SvgError> {
        let props = properties(el);
        let get = |key: &'static str| props.get(key).map(String::as_str);

        if get("display") == Some("none")
            || matches!(get("visibility"), Some("hidden" | "collapse"))
            || get("opacity").is_some_and(is_zero)
        {
            return Ok(None);
        }

        let mut paint = self.clone();
        if let Some(raw) = el.attr("transform") {
            paint.transform = paint.transform * parse_transform(raw)?;
        }
        if let Some(fill) = get("fill") {
            paint.fill = is_painted(fill);
        }
        if get("fill-opacity").is_some_and(is_zero) {
            paint.fill = false;
        }
        if let Some(stroke) = get("stroke") {
            paint.stroke = is_painted(stroke);
        }
        if get("stroke-opacity").is_some_and(is_zero) {
            paint.stroke = false;
        }
        if let Some(width) = get("stroke-width") {
            paint.stroke_width = parse_length(width).ok_or_else(|| SvgError::Number {
                attr: "stroke-width".to_string(),
                value: width.to_string(),
            })?;
        }
        match get("stroke-linecap") {
            Some("round") => paint.cap = Cap::Round,
            Some("square") => paint.cap = Cap::Square,
            Some("butt") => paint.cap = Cap::Butt,
            _ => (),
        }
        match get("stroke-linejoin") {
            Some("round") => paint.join = Join::Round,
            Some("bevel") => paint.join = Join::Bevel,
            Some("miter") | Some("miter-clip") | Some("arcs") => paint.join = Join::Miter,
            _ => (),
        }
        if let Some(limit) = get("stroke-miterlimit").and_then(parse_length) {
            paint.miter_limit = limit.max(1.0);
        }
        Ok(Some(paint))
    }

    fn stroke_style(&self) -> Stroke {
        Stroke::new(self.stroke_width)
            .with_caps(self.cap)
            .with_join(self.join)
            .with_miter_limit(self.miter_limit)
    }
}

/// A shape in its own coordinate space with the paint that applies to it.
struct Drawn {
    path: BezPath,
    paint: Paint,
}

fn length_attr(el: &Element, key: &str) -> Result<f64, SvgError> {
    match el.attr(key) {
        None => Ok(0.0),
        Some(raw) => parse_length(raw).ok_or_else(|| SvgError::Number {
            attr: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn points_path(el: &Element, close: bool) -> Result<Option<BezPath>, SvgError> {
    let coords = parse_number_list("points", el.attr("points").unwrap_or_default())?;
    let mut points = coords.chunks_exact(2).map(|c| Point::new(c[0], c[1]));
    let Some(first) = points.next() else {
        return Ok(None);
    };
    let mut path = BezPath::new();
    path.move_to(first);
    for p in points {
        path.line_to(p);
    }
    if close {
        path.close_path();
    }
    Ok(Some(path))
}

/// Geometry for a basic shape element, None for anything that draws nothing.
fn shape_path(el: &Element, tolerance: f64) -> Result<Option<BezPath>, SvgError> {
    let path = match el.local_name() {
        "path" => parse_path_data(el.attr("d").unwrap_or_default())?,
        "rect" => {
            let (x, y) = (length_attr(el, "x")?, length_attr(el, "y")?);
            let (w, h) = (length_attr(el, "width")?, length_attr(el, "height")?);
            if w <= 0.0 || h <= 0.0 {
                return Ok(None);
            }
            let rx = el.attr("rx").and_then(parse_length);
            let ry = el.attr("ry").and_then(parse_length);
            let radius = match (rx, ry) {
                (Some(rx), Some(ry)) => rx.min(ry),
                (Some(r), None) | (None, Some(r)) => r,
                (None, None) => 0.0,
            }
            .clamp(0.0, w.min(h) / 2.0);
            let rect = Rect::new(x, y, x + w, y + h);
            if radius > 0.0 {
                RoundedRect::from_rect(rect, radius).to_path(tolerance)
            } else {
                rect.to_path(tolerance)
            }
        }
        "circle" => {
            let r = length_attr(el, "r")?;
            if r <= 0.0 {
                return Ok(None);
            }
            let center = (length_attr(el, "cx")?, length_attr(el, "cy")?);
            Circle::new(center, r).to_path(tolerance)
        }
        "ellipse" => {
            let (rx, ry) = (length_attr(el, "rx")?, length_attr(el, "ry")?);
            if rx <= 0.0 || ry <= 0.0 {
                return Ok(None);
            }
            let center = (length_attr(el, "cx")?, length_attr(el, "cy")?);
            Ellipse::new(center, (rx, ry), 0.0).to_path(tolerance)
        }
        "line" => {
            let mut path = BezPath::new();
            path.move_to((length_attr(el, "x1")?, length_attr(el, "y1")?));
            path.line_to((length_attr(el, "x2")?, length_attr(el, "y2")?));
            path
        }
        "polyline" => return points_path(el, false),
        "polygon" => return points_path(el, true),
        _ => return Ok(None),
    };
    Ok((!path.elements().is_empty()).then_some(path))
}

fn collect(
    el: &Element,
    parent: &Paint,
    tolerance: f64,
    out: &mut Vec<Drawn>,
) -> Result<(), SvgError> {
    if el.prefix().is_some() || NOT_RENDERED.contains(&el.local_name()) {
        trace!("Skipping <{}>", el.name);
        return Ok(());
    }
    let Some(mut paint) = parent.inherit(el)? else {
        trace!("Skipping hidden <{}>", el.name);
        return Ok(());
    };
    match el.local_name() {
        "svg" | "g" | "a" | "switch" => {
            if el.local_name() == "svg" {
                let offset = (length_attr(el, "x")?, length_attr(el, "y")?);
                paint.transform = paint.transform * Affine::translate(offset);
            }
            for child in el.elements() {
                collect(child, &paint, tolerance, out)?;
            }
        }
        _ => match shape_path(el, tolerance)? {
            Some(path) => out.push(Drawn { path, paint }),
            None => trace!("<{}> draws nothing", el.name),
        },
    }
    Ok(())
}

/// The region of user space that maps onto the em square.
fn frame(root: &Element, drawn: &[Drawn]) -> Result<Rect, SvgError> {
    if let Some(raw) = root.attr("viewBox") {
        if let [x, y, w, h] = parse_number_list("viewBox", raw)?.as_slice() {
            return Ok(Rect::new(*x, *y, x + w, y + h));
        }
        return Err(SvgError::Number {
            attr: "viewBox".to_string(),
            value: raw.to_string(),
        });
    }
    let width = root.attr("width").and_then(parse_length);
    let height = root.attr("height").and_then(parse_length);
    if let (Some(w), Some(h)) = (width, height) {
        return Ok(Rect::new(0.0, 0.0, w, h));
    }
    // No declared size; use what's drawn
    drawn
        .iter()
        .map(|d| {
            let bbox = (d.paint.transform * d.path.clone()).bounding_box();
            if d.paint.stroke {
                bbox.inflate(d.paint.stroke_width / 2.0, d.paint.stroke_width / 2.0)
            } else {
                bbox
            }
        })
        .reduce(|a, b| a.union(b))
        .ok_or(SvgError::NoOutline)
}

/// Split into subpaths, closing each one.
fn contours(path: &BezPath) -> Vec<BezPath> {
    let mut result = Vec::new();
    let mut current = BezPath::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => {
                if current.elements().len() > 1 {
                    current.close_path();
                    result.push(std::mem::take(&mut current));
                }
                current = BezPath::new();
                current.push(*el);
            }
            PathEl::ClosePath => {
                if current.elements().len() > 1 {
                    current.close_path();
                    result.push(std::mem::take(&mut current));
                }
                current = BezPath::new();
            }
            _ => current.push(*el),
        }
    }
    if current.elements().len() > 1 {
        current.close_path();
        result.push(current);
    }
    result
}

fn reverse_contour(contour: &BezPath) -> BezPath {
    let segments: Vec<PathSeg> = contour.segments().collect();
    let Some(last) = segments.last() else {
        return contour.clone();
    };
    let mut reversed = BezPath::new();
    reversed.move_to(last.end());
    for seg in segments.iter().rev() {
        match seg.reverse() {
            PathSeg::Line(l) => reversed.line_to(l.p1),
            PathSeg::Quad(q) => reversed.quad_to(q.p1, q.p2),
            PathSeg::Cubic(c) => reversed.curve_to(c.p1, c.p2, c.p3),
        }
    }
    reversed.close_path();
    reversed
}

/// A point that lies on the contour, used for containment tests.
fn probe(contour: &BezPath) -> Option<Point> {
    contour.segments().next().map(|seg| seg.eval(0.5))
}

/// Orient contours by nesting depth.
///
/// The result is meant for y-down space and for a y-flipped font: outer
/// contours get negative area here, which becomes clockwise once flipped.
fn orient(contours: Vec<BezPath>) -> Vec<BezPath> {
    let bboxes: Vec<Rect> = contours.iter().map(|c| c.bounding_box()).collect();
    contours
        .iter()
        .enumerate()
        .map(|(i, contour)| {
            let depth = probe(contour).map_or(0, |pt| {
                contours
                    .iter()
                    .enumerate()
                    .filter(|(j, other)| {
                        *j != i && bboxes[*j].contains(pt) && other.winding(pt) != 0
                    })
                    .count()
            });
            let is_hole = depth % 2 == 1;
            let area = contour.area();
            if (is_hole && area < 0.0) || (!is_hole && area > 0.0) {
                reverse_contour(contour)
            } else {
                contour.clone()
            }
        })
        .collect()
}

impl OutlineNormalizer {
    fn outline(&self, doc: &Document) -> Result<BezPath, SvgError> {
        if doc.root.local_name() != "svg" {
            return Err(SvgError::UnexpectedRoot(doc.root.name.clone()));
        }

        // Basic shapes become curves at a fixed tolerance in user units,
        // the stroker works relative to the frame.
        let mut drawn = Vec::new();
        collect(&doc.root, &Paint::default(), 0.01, &mut drawn)?;
        let frame = frame(&doc.root, &drawn)?;
        if frame.width() <= 0.0 || frame.height() <= 0.0 {
            return Err(SvgError::DegenerateFrame {
                width: frame.width(),
                height: frame.height(),
            });
        }
        let tolerance = frame.width().max(frame.height()) * 1e-4;

        let mut geometry = BezPath::new();
        for Drawn { path, paint } in drawn.iter() {
            if paint.fill {
                geometry.extend(paint.transform * path.clone());
            }
            if paint.stroke && paint.stroke_width > 0.0 {
                let outline = stroke(
                    path.iter(),
                    &paint.stroke_style(),
                    &StrokeOpts::default(),
                    tolerance,
                );
                geometry.extend(paint.transform * outline);
            }
        }

        // Fit the frame onto the em, preserving aspect ratio
        let upm = self.units_per_em as f64;
        let scale = upm / frame.width().max(frame.height());
        let fit = Affine::translate((
            (upm - frame.width() * scale) / 2.0,
            (upm - frame.height() * scale) / 2.0,
        )) * Affine::scale(scale)
            * Affine::translate((-frame.x0, -frame.y0));
        let fitted = fit * geometry;

        let min_area = upm * upm * 1e-8;
        let contours: Vec<_> = contours(&fitted)
            .into_iter()
            .filter(|c| c.area().abs() > min_area)
            .collect();
        if contours.is_empty() {
            return Err(SvgError::NoOutline);
        }

        let mut glyph = BezPath::new();
        for contour in orient(contours) {
            glyph.extend(contour);
        }

        // Center horizontally on the fixed advance
        let bbox = glyph.bounding_box();
        let dx = (upm - (bbox.x0 + bbox.x1)) / 2.0;
        Ok(Affine::translate((dx, 0.0)) * glyph)
    }
}

impl Normalizer for OutlineNormalizer {
    fn normalize(&self, raw: &str) -> Result<String, SvgError> {
        let doc = Document::parse(raw)?;
        let glyph = self.outline(&doc)?;
        let upm = self.units_per_em.to_string();
        let root = Element::new("svg")
            .with_attr("xmlns", SVG_NS)
            .with_attr("viewBox", format!("0 0 {upm} {upm}"))
            .with_attr("width", upm.clone())
            .with_attr("height", upm)
            .with_child(
                Element::new("path").with_attr("d", format_path_data(&glyph, self.precision)),
            );
        Ok(Document::new(root).to_xml())
    }
}
