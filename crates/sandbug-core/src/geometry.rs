#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixels.

use serde::{Deserialize, Serialize};

/// Split orientation.
///
/// `Horizontal` means panels sit side by side and the separator is dragged
/// along the x axis; `Vertical` means panels are stacked and the separator is
/// dragged along the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// CSS property sized along this axis.
    #[must_use]
    pub const fn css_property(self) -> &'static str {
        match self {
            Self::Horizontal => "width",
            Self::Vertical => "height",
        }
    }
}

/// A pointer position in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along `axis`.
    #[inline]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// A rectangle in page pixels (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Extent along `axis`.
    #[inline]
    pub const fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Leading edge along `axis`.
    #[inline]
    pub const fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Split into consecutive slices along `axis` with the given extents.
    ///
    /// The slices keep the cross-axis extent of `self`. Extents are used
    /// verbatim; the caller is responsible for making them sum to the parent.
    pub fn split(&self, axis: Axis, extents: &[f64]) -> Vec<Rect> {
        let mut cursor = self.start(axis);
        extents
            .iter()
            .map(|&extent| {
                let rect = match axis {
                    Axis::Horizontal => Rect::new(cursor, self.y, extent, self.height),
                    Axis::Vertical => Rect::new(self.x, cursor, self.width, extent),
                };
                cursor += extent;
                rect
            })
            .collect()
    }
}
