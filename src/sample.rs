//! Sample precision used by the stage processors.
//!
//! Stages are generic over the numeric type of the audio samples. The tube
//! tables are always `f64`; values are converted once when a stage is built.

use std::fmt::Debug;

use num_traits::{AsPrimitive, Float, FloatConst};

/// A floating point audio sample type (`f32` or `f64`).
///
/// Conversions are primitive `as` casts through [`AsPrimitive`], so they
/// never fail; narrowing to `f32` rounds.
pub trait Sample:
    Float + FloatConst + AsPrimitive<f64> + AsPrimitive<f32> + Default + Debug + Send + Sync + 'static
{
    /// Convert a double precision constant into this sample type.
    fn from_f64(v: f64) -> Self;

    /// Convert a single precision host sample into this sample type.
    fn from_f32(v: f32) -> Self;

    /// Widen this sample to double precision.
    #[inline]
    fn into_f64(self) -> f64 {
        AsPrimitive::<f64>::as_(self)
    }

    /// Narrow this sample to single precision.
    #[inline]
    fn into_f32(self) -> f32 {
        AsPrimitive::<f32>::as_(self)
    }
}

impl Sample for f32 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v.as_()
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
}

impl Sample for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.as_()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(<f32 as Sample>::from_f64(0.1), 0.1f32);
        assert_eq!(<f64 as Sample>::from_f32(0.5), 0.5f64);
        assert_eq!(0.25f32.into_f64(), 0.25);
        assert_eq!((1.0f64 / 3.0).into_f32(), (1.0f64 / 3.0) as f32);
    }
}
