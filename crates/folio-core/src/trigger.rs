//! Scroll trigger descriptors.
//!
//! A trigger region is described by which element it watches and two
//! offsets, each pairing an edge of the element with a position in the
//! viewport: `"top 80%"` means "when the element's top reaches 80% of the
//! viewport height".

use std::str::FromStr;
use std::time::Duration;

use crate::element::ElementId;
use crate::env::Rect;
use crate::error::OffsetParseError;

/// The element whose bounds define a trigger region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTarget {
    Element(ElementId),
    /// The whole document, used by page-level progress indicators.
    Document,
}

/// Element-edge / viewport-position pair, both stored as fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOffset {
    /// Position within the element, 0.0 = top, 1.0 = bottom.
    pub element: f32,
    /// Position within the viewport, 0.0 = top, 1.0 = bottom.
    pub viewport: f32,
}

impl EdgeOffset {
    pub const fn new(element: f32, viewport: f32) -> Self {
        Self { element, viewport }
    }

    /// Scroll position (pixels) at which this offset is reached.
    pub fn resolve(&self, bounds: Rect, viewport_height: f32) -> f32 {
        bounds.top + self.element * bounds.height - self.viewport * viewport_height
    }
}

impl FromStr for EdgeOffset {
    type Err = OffsetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(OffsetParseError::Shape(s.to_string()));
        };
        Ok(Self {
            element: parse_position(element)?,
            viewport: parse_position(viewport)?,
        })
    }
}

fn parse_position(token: &str) -> Result<f32, OffsetParseError> {
    match token {
        "top" => Ok(0.0),
        "center" => Ok(0.5),
        "bottom" => Ok(1.0),
        _ => token
            .strip_suffix('%')
            .and_then(|n| n.parse::<f32>().ok())
            .map(|pct| pct / 100.0)
            .ok_or_else(|| OffsetParseError::Position(token.to_string())),
    }
}

/// End of a trigger region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerEnd {
    Edge(EdgeOffset),
    /// Fixed number of pixels after the start (`"+=500"`).
    Relative(f32),
}

impl FromStr for TriggerEnd {
    type Err = OffsetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(px) = s.trim().strip_prefix("+=") {
            return px
                .parse::<f32>()
                .map(TriggerEnd::Relative)
                .map_err(|_| OffsetParseError::Relative(s.to_string()));
        }
        s.parse().map(TriggerEnd::Edge)
    }
}

/// How animation progress follows scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scrub {
    /// Time-based: scroll only starts the animation.
    Off,
    /// Progress equals scroll progress through the region.
    Locked,
    /// Progress catches up with scroll progress over the given time.
    Smoothed(Duration),
}

impl Scrub {
    pub fn smoothed(secs: f32) -> Self {
        Scrub::Smoothed(crate::tween::span(secs))
    }

    pub fn is_scrubbed(self) -> bool {
        !matches!(self, Scrub::Off)
    }
}

/// A complete trigger region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSpec {
    pub target: TriggerTarget,
    pub start: EdgeOffset,
    pub end: TriggerEnd,
    pub scrub: Scrub,
}

impl TriggerSpec {
    /// Trigger on an element with the given offsets.
    pub fn element(element: ElementId, start: EdgeOffset, end: EdgeOffset, scrub: Scrub) -> Self {
        Self {
            target: TriggerTarget::Element(element),
            start,
            end: TriggerEnd::Edge(end),
            scrub,
        }
    }

    /// Trigger spanning the whole document, top-top to bottom-bottom.
    pub fn document(scrub: Scrub) -> Self {
        Self {
            target: TriggerTarget::Document,
            start: EdgeOffset::new(0.0, 0.0),
            end: TriggerEnd::Edge(EdgeOffset::new(1.0, 1.0)),
            scrub,
        }
    }

    /// Compute start/end scroll positions for the given bounds.
    ///
    /// The end is never before the start.
    pub fn resolve(&self, bounds: Rect, viewport_height: f32) -> (f32, f32) {
        let start = self.start.resolve(bounds, viewport_height);
        let end = match self.end {
            TriggerEnd::Edge(edge) => edge.resolve(bounds, viewport_height),
            TriggerEnd::Relative(px) => start + px,
        };
        (start, end.max(start))
    }
}
