use crate::core::particle::DIM;
use crate::error::{Error, Result};

/// Static axis-aligned rectangular domain `[0, width] x [0, height]`.
///
/// Walls are the four edges; a particle reflects off an edge once its
/// center comes within `radius` of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    width: f64,
    height: f64,
}

impl Bounds {
    /// Create a new domain after validating that both extents are finite and > 0.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::InvalidParam("width must be finite and > 0".into()));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(Error::InvalidParam("height must be finite and > 0".into()));
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Extents per axis, `[width, height]`.
    #[inline]
    pub fn extent(&self) -> [f64; DIM] {
        [self.width, self.height]
    }
}
