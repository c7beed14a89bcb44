//! Multichannel image container generic over five pixel sample representations.
//!
//! Channel buffers are row-major `Array2<T>` of shape `(height, width)`. The
//! warp engine takes ownership of the buffers with [`Image::release_data`] for
//! the duration of a transform and hands new ones back with
//! [`Image::import_data`].

use std::fmt::Debug;

use ndarray::Array2;
use num_traits::NumCast;
use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::status::StatusMonitor;

/// Sample representation discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    Float32,
    Float64,
    UInt8,
    UInt16,
    UInt32,
}

impl SampleFormat {
    pub fn bits_per_sample(&self) -> u32 {
        match self {
            Self::UInt8 => 8,
            Self::UInt16 => 16,
            Self::Float32 | Self::UInt32 => 32,
            Self::Float64 => 64,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// A pixel sample type.
///
/// All processing happens on normalized `f64` values. Floating point samples
/// are already normalized and pass through unchanged; unsigned integers map
/// `[0, MAX]` to `[0, 1]`.
pub trait Sample: Copy + Send + Sync + PartialEq + Debug + NumCast + 'static {
    const FORMAT: SampleFormat;

    fn to_normalized(self) -> f64;

    /// Converts a normalized value back to a sample. Integer representations
    /// clamp to `[0, 1]` and round to the nearest integer.
    fn from_normalized(value: f64) -> Self;

    /// Smallest representable sample value.
    fn min_sample() -> Self;
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::Float32;

    fn to_normalized(self) -> f64 {
        self as f64
    }

    fn from_normalized(value: f64) -> Self {
        value as f32
    }

    fn min_sample() -> Self {
        0.0
    }
}

impl Sample for f64 {
    const FORMAT: SampleFormat = SampleFormat::Float64;

    fn to_normalized(self) -> f64 {
        self
    }

    fn from_normalized(value: f64) -> Self {
        value
    }

    fn min_sample() -> Self {
        0.0
    }
}

macro_rules! impl_integer_sample {
    ($t:ty, $format:expr) => {
        impl Sample for $t {
            const FORMAT: SampleFormat = $format;

            fn to_normalized(self) -> f64 {
                self as f64 / <$t>::MAX as f64
            }

            fn from_normalized(value: f64) -> Self {
                if value.is_nan() {
                    return 0;
                }
                let scaled = (value.clamp(0.0, 1.0) * <$t>::MAX as f64).round();
                <$t as NumCast>::from(scaled).unwrap_or(<$t>::MAX)
            }

            fn min_sample() -> Self {
                0
            }
        }
    };
}

impl_integer_sample!(u8, SampleFormat::UInt8);
impl_integer_sample!(u16, SampleFormat::UInt16);
impl_integer_sample!(u32, SampleFormat::UInt32);

/// Color space tag. Geometric transformations never alter it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Gray,
    Rgb,
}

/// A multichannel image with samples of type `T`.
#[derive(Clone, Debug)]
pub struct Image<T: Sample> {
    width: usize,
    height: usize,
    channels: Vec<Array2<T>>,
    color_space: ColorSpace,
    status: StatusMonitor,
}

impl<T: Sample> Image<T> {
    /// Allocate an image filled with the minimum sample value.
    pub fn new(width: usize, height: usize, num_channels: usize, color_space: ColorSpace) -> Self {
        let channels = (0..num_channels)
            .map(|_| Array2::from_elem((height, width), T::min_sample()))
            .collect();
        Self {
            width,
            height,
            channels,
            color_space,
            status: StatusMonitor::default(),
        }
    }

    /// Build an image from existing channel buffers; all must share one shape.
    pub fn from_channels(
        channels: Vec<Array2<T>>,
        color_space: ColorSpace,
    ) -> Result<Self, WarpError> {
        let (height, width) = channels.first().map(|c| c.dim()).unwrap_or((0, 0));
        if let Some(bad) = channels.iter().find(|c| c.dim() != (height, width)) {
            return Err(WarpError::Shape(format!(
                "channel shape {:?} differs from {:?}",
                bad.dim(),
                (height, width)
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            color_space,
            status: StatusMonitor::default(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() || self.num_pixels() == 0
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn sample_format(&self) -> SampleFormat {
        T::FORMAT
    }

    pub fn channel(&self, c: usize) -> &Array2<T> {
        &self.channels[c]
    }

    pub fn channel_mut(&mut self, c: usize) -> &mut Array2<T> {
        &mut self.channels[c]
    }

    pub fn channels(&self) -> &[Array2<T>] {
        &self.channels
    }

    pub fn status(&self) -> &StatusMonitor {
        &self.status
    }

    pub fn set_status_monitor(&mut self, status: StatusMonitor) {
        self.status = status;
    }

    /// Move the channel buffers out of the image, leaving it empty (0x0).
    pub fn release_data(&mut self) -> Vec<Array2<T>> {
        self.width = 0;
        self.height = 0;
        std::mem::take(&mut self.channels)
    }

    /// Install new channel buffers. The color space is preserved.
    pub fn import_data(
        &mut self,
        channels: Vec<Array2<T>>,
        width: usize,
        height: usize,
    ) -> Result<(), WarpError> {
        if let Some(bad) = channels.iter().find(|c| c.dim() != (height, width)) {
            return Err(WarpError::Shape(format!(
                "imported channel shape {:?} does not match {width}x{height}",
                bad.dim()
            )));
        }
        self.channels = channels;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

/// An image of any of the five supported sample types.
#[derive(Clone, Debug)]
pub enum ImageVariant {
    Float32(Image<f32>),
    Float64(Image<f64>),
    UInt8(Image<u8>),
    UInt16(Image<u16>),
    UInt32(Image<u32>),
}

macro_rules! with_variant {
    ($variant:expr, $img:ident => $body:expr) => {
        match $variant {
            ImageVariant::Float32($img) => $body,
            ImageVariant::Float64($img) => $body,
            ImageVariant::UInt8($img) => $body,
            ImageVariant::UInt16($img) => $body,
            ImageVariant::UInt32($img) => $body,
        }
    };
}
pub(crate) use with_variant;

impl ImageVariant {
    pub fn sample_format(&self) -> SampleFormat {
        with_variant!(self, img => img.sample_format())
    }

    pub fn width(&self) -> usize {
        with_variant!(self, img => img.width())
    }

    pub fn height(&self) -> usize {
        with_variant!(self, img => img.height())
    }

    pub fn num_channels(&self) -> usize {
        with_variant!(self, img => img.num_channels())
    }

    pub fn color_space(&self) -> ColorSpace {
        with_variant!(self, img => img.color_space())
    }
}

macro_rules! impl_variant_from {
    ($t:ty, $variant:ident) => {
        impl From<Image<$t>> for ImageVariant {
            fn from(image: Image<$t>) -> Self {
                ImageVariant::$variant(image)
            }
        }
    };
}

impl_variant_from!(f32, Float32);
impl_variant_from!(f64, Float64);
impl_variant_from!(u8, UInt8);
impl_variant_from!(u16, UInt16);
impl_variant_from!(u32, UInt32);
