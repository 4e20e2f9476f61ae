#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Unlike terminal cell geometry, scroll geometry lives in fractional CSS-style
//! pixels, so everything here is `f64`.

/// Scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Top-to-bottom scrolling.
    #[default]
    Vertical,
    /// Left-to-right scrolling.
    Horizontal,
}

impl Axis {
    /// The other axis.
    #[inline]
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }
}

/// Viewport rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportRect {
    /// Top edge.
    pub top: f64,
    /// Left edge.
    pub left: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ViewportRect {
    /// Create a new viewport rectangle.
    #[inline]
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Viewport anchored at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Extent along `axis` (width for horizontal, height for vertical).
    #[inline]
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Whether the viewport has a usable (positive, finite) size.
    #[inline]
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A 2D translation applied to a pinned track's inner content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translate {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

impl Translate {
    /// No translation.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Translation of `amount` along `axis`.
    #[inline]
    #[must_use]
    pub fn along(axis: Axis, amount: f64) -> Self {
        match axis {
            Axis::Horizontal => Self { x: amount, y: 0.0 },
            Axis::Vertical => Self { x: 0.0, y: amount },
        }
    }

    /// Component along `axis`.
    #[inline]
    #[must_use]
    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}
