//! Raster element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

use crate::pixel::{DataType, PixelBuffer};

/// Trait for the pixel storage types a band can hold.
///
/// The set is closed: every implementor has a matching [`DataType`] tag and
/// a [`PixelBuffer`] variant, so a tag can always be resolved to a concrete
/// type at compile time.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Storage tag for this type
    const DATA_TYPE: DataType;

    /// Size of one value in bytes
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Default no-data value for this type
    fn default_nodata() -> Self;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Decode one value from native-endian bytes (`bytes.len() == SIZE`)
    fn from_ne_slice(bytes: &[u8]) -> Self;

    /// Borrow the values of a buffer holding this type
    fn slice_of(buffer: &PixelBuffer) -> Option<&[Self]>;

    /// Wrap owned values into a buffer
    fn into_buffer(values: Vec<Self>) -> PixelBuffer;

    /// Widen to f64 for the numeric kernels
    fn to_f64(self) -> f64;
}

macro_rules! impl_common {
    ($t:ty, $tag:ident) => {
        const DATA_TYPE: DataType = DataType::$tag;

        fn from_ne_slice(bytes: &[u8]) -> Self {
            let mut raw = [0u8; std::mem::size_of::<$t>()];
            raw.copy_from_slice(bytes);
            <$t>::from_ne_bytes(raw)
        }

        fn slice_of(buffer: &PixelBuffer) -> Option<&[Self]> {
            match buffer {
                PixelBuffer::$tag(values) => Some(values.as_slice()),
                _ => None,
            }
        }

        fn into_buffer(values: Vec<Self>) -> PixelBuffer {
            PixelBuffer::$tag(values)
        }

        #[inline]
        fn to_f64(self) -> f64 {
            self as f64
        }
    };
}

macro_rules! impl_raster_element_int {
    ($t:ty, $tag:ident) => {
        impl RasterElement for $t {
            impl_common!($t, $tag);

            fn default_nodata() -> Self {
                <$t>::MIN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty, $tag:ident) => {
        impl RasterElement for $t {
            impl_common!($t, $tag);

            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }
        }
    };
}

impl_raster_element_int!(u8, Byte);
impl_raster_element_int!(u16, UInt16);
impl_raster_element_int!(i16, Int16);
impl_raster_element_int!(i32, Int32);
impl_raster_element_float!(f32, Float32);
impl_raster_element_float!(f64, Float64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_types() {
        assert_eq!(u8::DATA_TYPE, DataType::Byte);
        assert_eq!(i16::DATA_TYPE, DataType::Int16);
        assert_eq!(f64::DATA_TYPE, DataType::Float64);
        assert_eq!(<f32 as RasterElement>::SIZE, 4);
    }

    #[test]
    fn test_nodata() {
        assert!(f32::NAN.is_nodata(None));
        assert!(!1.0f32.is_nodata(None));
        assert!((-9999i32).is_nodata(Some(-9999)));
        assert!(!5u8.is_nodata(None));
        assert!(f64::default_nodata().is_nan());
        assert_eq!(u16::default_nodata(), 0);
        assert_eq!(i16::default_nodata(), i16::MIN);
    }

    #[test]
    fn test_from_ne_slice() {
        let bytes = 1234.5f64.to_ne_bytes();
        assert_eq!(f64::from_ne_slice(&bytes), 1234.5);
        let bytes = (-7i16).to_ne_bytes();
        assert_eq!(i16::from_ne_slice(&bytes), -7);
    }
}
