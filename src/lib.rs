//! Parallel geometric transformations and astrometric reprojection of
//! multichannel images.

pub mod affine;
pub mod astrometry;
pub mod chunk;
pub mod error;
pub mod gamma;
pub mod geometry;
pub mod image;
pub mod proj;
pub mod resample;
pub mod status;
pub mod warp;
