//! Strips everything from an svg that doesn't change what it looks like.

use std::{cmp::Ordering, sync::OnceLock};

use regex::Regex;

use crate::{
    error::SvgError,
    pathdata::{format_number, format_path_data, parse_path_data},
    svg::{Document, Element, Node},
};

/// Shrinks a normalized icon without changing its rendering.
pub trait Optimizer: Send + Sync {
    fn optimize(&self, svg: &str) -> Result<String, SvgError>;
}

/// Namespace prefixes used by editors for their own bookkeeping.
const EDITOR_PREFIXES: &[&str] = &[
    "sodipodi", "inkscape", "sketch", "serif", "figma", "illustrator", "i", "x", "graph",
];

const DROPPED_ELEMENTS: &[&str] = &["metadata", "title", "desc"];

const CONTAINERS: &[&str] = &[
    "a", "clipPath", "defs", "g", "marker", "mask", "pattern", "switch", "symbol",
];

/// Attributes that mean nothing on a group.
const NON_INHERITABLE_GROUP_ATTRS: &[&str] = &["x", "y", "width", "height", "d", "points"];

/// Attributes holding plain numbers or lists of numbers.
const NUMERIC_ATTRS: &[&str] = &[
    "cx",
    "cy",
    "height",
    "opacity",
    "points",
    "r",
    "rx",
    "ry",
    "stroke-width",
    "viewBox",
    "width",
    "x",
    "x1",
    "x2",
    "y",
    "y1",
    "y2",
];

/// Preferred attribute order; anything else follows alphabetically.
const ATTR_ORDER: &[&str] = &[
    "xmlns", "id", "width", "height", "x", "x1", "x2", "y", "y1", "y2", "cx", "cy", "r", "fill",
    "stroke", "marker", "d", "points",
];

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("number regex is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgOptimizer {
    /// Fractional digits kept in geometry.
    pub precision: usize,
}

impl Default for SvgOptimizer {
    fn default() -> Self {
        SvgOptimizer { precision: 2 }
    }
}

fn is_editor_name(name: &str) -> bool {
    match name.split_once(':') {
        Some(("xmlns", prefix)) => EDITOR_PREFIXES.contains(&prefix),
        Some((prefix, _)) => EDITOR_PREFIXES.contains(&prefix),
        None => false,
    }
}

fn attr_rank(name: &str) -> usize {
    ATTR_ORDER
        .iter()
        .position(|n| *n == name)
        .unwrap_or(ATTR_ORDER.len())
}

fn compare_attrs(a: &str, b: &str) -> Ordering {
    attr_rank(a).cmp(&attr_rank(b)).then_with(|| a.cmp(b))
}

impl SvgOptimizer {
    fn round_numbers(&self, raw: &str) -> String {
        number_re()
            .replace_all(raw, |caps: &regex::Captures| {
                caps[0]
                    .parse::<f64>()
                    .map(|v| format_number(v, self.precision))
                    .unwrap_or_else(|_| caps[0].to_string())
            })
            .into_owned()
    }

    fn clean_attrs(&self, el: &mut Element) -> Result<(), SvgError> {
        let is_group = el.local_name() == "g";
        el.attrs.retain(|key, value| {
            !is_editor_name(key)
                && !value.trim().is_empty()
                && !(is_group && NON_INHERITABLE_GROUP_ATTRS.contains(&key.as_str()))
        });
        for (key, value) in el.attrs.iter_mut() {
            if key == "d" {
                *value = format_path_data(&parse_path_data(value)?, self.precision);
            } else if NUMERIC_ATTRS.contains(&key.as_str()) {
                *value = self.round_numbers(value);
            }
        }
        el.attrs.sort_by(|k1, _, k2, _| compare_attrs(k1, k2));
        Ok(())
    }

    /// Clean `el` in place. Returns false if `el` itself should go.
    fn clean(&self, el: &mut Element) -> Result<bool, SvgError> {
        if el.prefix().is_some_and(|p| EDITOR_PREFIXES.contains(&p))
            || DROPPED_ELEMENTS.contains(&el.local_name())
        {
            return Ok(false);
        }
        self.clean_attrs(el)?;

        let mut children = Vec::with_capacity(el.children.len());
        for child in std::mem::take(&mut el.children) {
            match child {
                Node::Comment(_) => (),
                Node::Text(text) if text.trim().is_empty() => (),
                Node::Text(text) => children.push(Node::Text(text)),
                Node::Element(mut child) => {
                    if self.clean(&mut child)? {
                        children.push(Node::Element(child));
                    }
                }
            }
        }
        el.children = children;

        let empty_container = CONTAINERS.contains(&el.local_name()) && el.children.is_empty();
        Ok(!empty_container)
    }
}

impl Optimizer for SvgOptimizer {
    fn optimize(&self, svg: &str) -> Result<String, SvgError> {
        let mut doc = Document::parse(svg)?;
        doc.prolog.clear();
        self.clean(&mut doc.root)?;
        Ok(doc.to_xml())
    }
}
