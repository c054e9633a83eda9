//! Fixed print aspect ratios.

use std::fmt;

/// A width:height proportion used as a crop target.
///
/// Both components are strictly positive and finite. Ratios are fixed
/// constants of the print format, so a bad ratio is a programming error
/// and construction panics rather than returning an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    width: f64,
    height: f64,
}

/// Outer framing of the printed card (54:86), used for layout.
pub const CARD_OUTER_RATIO: AspectRatio = AspectRatio {
    width: 54.0,
    height: 86.0,
};

/// Inner print area (46:62). Captured photos are cropped to this ratio.
pub const PRINT_AREA_RATIO: AspectRatio = AspectRatio {
    width: 46.0,
    height: 62.0,
};

impl AspectRatio {
    /// Creates a ratio.
    ///
    /// # Panics
    ///
    /// Panics if either component is zero, negative, or not finite.
    pub fn new(width: f64, height: f64) -> Self {
        let ratio = Self { width, height };
        ratio.assert_valid();
        ratio
    }

    /// Width component.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height component.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Width divided by height.
    #[inline]
    pub fn value(&self) -> f64 {
        self.width / self.height
    }

    /// Builds a ratio without validation, so precondition checks can be exercised.
    #[cfg(test)]
    pub(crate) fn unchecked(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub(crate) fn assert_valid(&self) {
        assert!(
            self.width.is_finite() && self.width > 0.0,
            "aspect ratio width must be positive, got {}",
            self.width
        );
        assert!(
            self.height.is_finite() && self.height > 0.0,
            "aspect ratio height must be positive, got {}",
            self.height
        );
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}
