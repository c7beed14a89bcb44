//! Parallel inverse-mapping engine.
//!
//! Every transformation runs through the same pattern: the channel buffers are
//! released from the image, each channel is converted to normalized `f64`,
//! the destination rows are split into bands and one rayon task per band
//! fills its rows from the read-only source. New buffers are imported into
//! the image only after every channel succeeded.

use std::mem::size_of;

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info, warn};

use super::{fill_for, EngineConfig};
use crate::affine::Affine;
use crate::chunk::planner::{plan_row_bands, RowBand};
use crate::error::WarpError;
use crate::geometry::DPoint;
use crate::image::{Image, Sample};
use crate::status::{ProgressBatch, StatusMonitor};

/// Outcome of a successful transformation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub width: usize,
    pub height: usize,
    /// Destination pixels, summed over channels, that received the fill value
    /// because their source location was invalid or outside the source.
    pub background_pixels: u64,
}

/// Destination -> source coordinate mapping of a transformation.
pub trait CoordinateLaw: Sync {
    /// Source coordinates for the destination point `(x, y)`, or `None` if
    /// the mapping is undefined there.
    fn source_point(&self, x: f64, y: f64) -> Option<DPoint>;
}

impl CoordinateLaw for Affine {
    fn source_point(&self, x: f64, y: f64) -> Option<DPoint> {
        Some(self.forward_point(DPoint::new(x, y))).filter(DPoint::is_finite)
    }
}

/// Read-only per-channel inputs handed to band workers.
#[derive(Clone, Copy)]
pub struct ChannelContext<'a> {
    pub channel: usize,
    /// Normalized (and linearized, if gamma correction is on) source samples.
    pub source: ArrayView2<'a, f64>,
    /// Fill value in the same space as `source`.
    pub fill: f64,
    /// Destination width.
    pub width: usize,
}

pub fn build_pool(config: &EngineConfig) -> Result<ThreadPool, WarpError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.thread_count())
        .build()
        .map_err(|e| WarpError::ThreadPool(e.to_string()))
}

/// Reserve a buffer of `len` elements, reporting failure instead of aborting.
pub(crate) fn try_buffer<S>(len: usize, channel: usize) -> Result<Vec<S>, WarpError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| WarpError::Allocation {
            channel,
            bytes: len.saturating_mul(size_of::<S>()),
        })?;
    Ok(buf)
}

/// Run `work` over disjoint row bands of `dst` on `pool`.
///
/// `dst` is row-major with `width` columns. Returns the sum of the
/// per-band counts returned by `work`.
pub fn process_bands<F>(
    pool: &ThreadPool,
    bands: &[RowBand],
    width: usize,
    dst: &mut [f64],
    status: &StatusMonitor,
    work: F,
) -> Result<u64, WarpError>
where
    F: Fn(&RowBand, &mut [f64], &mut ProgressBatch<'_>) -> Result<u64, WarpError> + Sync,
{
    let mut slices = Vec::with_capacity(bands.len());
    let mut rest = dst;
    for band in bands {
        let (head, tail) = rest.split_at_mut(band.rows() * width);
        slices.push((*band, head));
        rest = tail;
    }

    pool.install(|| {
        slices
            .into_par_iter()
            .map(|(band, out)| -> Result<u64, WarpError> {
                let mut batch = ProgressBatch::new(status);
                let count = work(&band, out, &mut batch)?;
                batch.flush()?;
                Ok(count)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    })
}

/// Shared driver: release, convert, run `work` per channel and band, swap in.
pub fn run_channels<T, F>(
    image: &mut Image<T>,
    new_width: usize,
    new_height: usize,
    config: &EngineConfig,
    fill: &[f64],
    work: F,
) -> Result<TransformSummary, WarpError>
where
    T: Sample,
    F: Fn(&ChannelContext<'_>, &RowBand, &mut [f64], &mut ProgressBatch<'_>) -> Result<u64, WarpError>
        + Sync,
{
    if image.is_empty() {
        return Ok(TransformSummary {
            width: image.width(),
            height: image.height(),
            background_pixels: 0,
        });
    }
    if new_width == 0 || new_height == 0 {
        return Err(WarpError::InvalidParameter(format!(
            "invalid output dimensions {new_width}x{new_height}"
        )));
    }

    let pixels = new_width.checked_mul(new_height).ok_or_else(|| {
        WarpError::InvalidParameter(format!(
            "output dimensions {new_width}x{new_height} overflow the addressable pixel count"
        ))
    })?;
    let total_samples = pixels.checked_mul(image.num_channels()).ok_or_else(|| {
        WarpError::InvalidParameter(format!(
            "{} channels of {new_width}x{new_height} pixels overflow the addressable sample count",
            image.num_channels()
        ))
    })?;

    if image.status().is_cancelled() {
        return Err(WarpError::Cancelled);
    }

    let pool = build_pool(config)?;
    let bands = plan_row_bands(new_height, new_width, config.overhead_limit, pool.current_num_threads())?;
    let (src_width, src_height) = (image.width(), image.height());

    // From here on the image is empty until the new data is imported.
    let source = image.release_data();
    let status = image.status();
    status.initialize(total_samples);

    debug!(
        src_width,
        src_height,
        new_width,
        new_height,
        channels = source.len(),
        bands = bands.len(),
        threads = pool.current_num_threads(),
        "starting geometric transformation"
    );

    let result = (|| -> Result<(Vec<Array2<T>>, u64), WarpError> {
        let mut channels = Vec::with_capacity(source.len());
        let mut background = 0u64;
        for (c, src) in source.iter().enumerate() {
            let mut normalized = try_buffer::<f64>(src.len(), c)?;
            normalized.extend(src.iter().map(|v| v.to_normalized()));
            let mut fill_value = fill_for(fill, c);
            if config.gamma_correction {
                pool.install(|| config.gamma.linearize_buffer(&mut normalized));
                fill_value = config.gamma.linearize(fill_value);
            }
            let normalized = Array2::from_shape_vec((src_height, src_width), normalized)
                .map_err(|e| WarpError::Shape(e.to_string()))?;

            let mut dst = try_buffer::<f64>(pixels, c)?;
            dst.resize(pixels, 0.0);

            let ctx = ChannelContext {
                channel: c,
                source: normalized.view(),
                fill: fill_value,
                width: new_width,
            };
            background += process_bands(&pool, &bands, new_width, &mut dst, status, |band, out, batch| {
                work(&ctx, band, out, batch)
            })?;

            if config.gamma_correction {
                pool.install(|| config.gamma.delinearize_buffer(&mut dst));
            }

            let mut samples = try_buffer::<T>(dst.len(), c)?;
            samples.extend(dst.iter().map(|&v| T::from_normalized(v)));
            let channel = Array2::from_shape_vec((new_height, new_width), samples)
                .map_err(|e| WarpError::Shape(e.to_string()))?;
            channels.push(channel);
        }
        Ok((channels, background))
    })();

    match result {
        Ok((channels, background)) => {
            drop(source);
            image.import_data(channels, new_width, new_height)?;
            info!(
                width = new_width,
                height = new_height,
                background_pixels = background,
                "geometric transformation done"
            );
            Ok(TransformSummary {
                width: new_width,
                height: new_height,
                background_pixels: background,
            })
        }
        Err(e) => {
            if e.is_cancelled() {
                warn!("geometric transformation cancelled, image data released");
            } else {
                warn!(error = %e, "geometric transformation failed, image data released");
            }
            Err(e)
        }
    }
}

/// Interpolate the source at the location given by `law` for every
/// destination pixel center. Locations outside the source receive the fill.
pub fn interpolate<T, L>(
    image: &mut Image<T>,
    new_width: usize,
    new_height: usize,
    law: &L,
    fill: &[f64],
    config: &EngineConfig,
) -> Result<TransformSummary, WarpError>
where
    T: Sample,
    L: CoordinateLaw,
{
    run_channels(image, new_width, new_height, config, fill, |ctx, band, out, batch| {
        let mut interpolator = config
            .interpolation
            .new_interpolator(ctx.source, config.unclipped);
        let (rows, cols) = ctx.source.dim();
        let (src_w, src_h) = (cols as f64, rows as f64);
        let mut background = 0u64;

        for (i, line) in out.chunks_exact_mut(ctx.width).enumerate() {
            let y = (band.row_start + i) as f64 + 0.5;
            for (col, v) in line.iter_mut().enumerate() {
                let x = col as f64 + 0.5;
                match law.source_point(x, y) {
                    Some(p) if p.x >= 0.0 && p.x < src_w && p.y >= 0.0 && p.y < src_h => {
                        *v = interpolator.interpolate(p.x, p.y);
                    }
                    _ => {
                        *v = ctx.fill;
                        background += 1;
                    }
                }
            }
            batch.advance(ctx.width)?;
        }
        Ok(background)
    })
}
