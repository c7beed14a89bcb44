//! Astrometric reprojection: resample a source image onto the pixel grid of
//! a target astrometric solution.

use tracing::{debug, info};

use super::engine::{interpolate, CoordinateLaw, TransformSummary};
use super::{EngineConfig, GeometricTransformation};
use crate::astrometry::AstrometricSolution;
use crate::chunk::planner::rect_boundary_points;
use crate::error::WarpError;
use crate::geometry::{DPoint, DRect};
use crate::image::{Image, Sample};

/// Boundary samples per edge when bounding a reprojected rectangle.
pub const RECT_POINTS_PER_EDGE: usize = 32;

/// Target pixel -> celestial -> source pixel.
struct ReprojectionLaw<'a> {
    target: &'a dyn AstrometricSolution,
    source: &'a dyn AstrometricSolution,
}

impl CoordinateLaw for ReprojectionLaw<'_> {
    fn source_point(&self, x: f64, y: f64) -> Option<DPoint> {
        let sky = self.target.image_to_celestial(DPoint::new(x, y))?;
        self.source.celestial_to_image(sky)
    }
}

/// Reprojects images described by `source` onto the grid of `target`.
///
/// Both solutions are borrowed and must outlive the reprojection; they are
/// never copied. The output always has the dimensions of `target`.
pub struct AstrometricReprojection<'a> {
    target: &'a dyn AstrometricSolution,
    source: &'a dyn AstrometricSolution,
    fill: Vec<f64>,
    config: EngineConfig,
    zero_count: u64,
}

impl<'a> AstrometricReprojection<'a> {
    pub fn new(target: &'a dyn AstrometricSolution, source: &'a dyn AstrometricSolution) -> Self {
        Self {
            target,
            source,
            fill: Vec::new(),
            config: EngineConfig::default(),
            zero_count: 0,
        }
    }

    pub fn with_fill(mut self, fill: Vec<f64>) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn target(&self) -> &'a dyn AstrometricSolution {
        self.target
    }

    pub fn source(&self) -> &'a dyn AstrometricSolution {
        self.source
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Number of target pixels with no source data in the last
    /// [`reproject`](Self::reproject) call. Zero before the first call.
    pub fn zero_count(&self) -> u64 {
        self.zero_count
    }

    /// Reproject `image` and record the number of uncovered target pixels.
    pub fn reproject<T: Sample>(&mut self, image: &mut Image<T>) -> Result<u64, WarpError> {
        let channels = image.num_channels().max(1) as u64;
        let summary = self.apply(image)?;
        self.zero_count = summary.background_pixels / channels;
        info!(
            zero_count = self.zero_count,
            total = summary.width * summary.height,
            "reprojection coverage"
        );
        Ok(self.zero_count)
    }

    /// Bounding rectangle, in target pixel coordinates, of `source_rect`
    /// reprojected from source pixel coordinates.
    ///
    /// The whole boundary is sampled since projected edges are curved. Any
    /// boundary point that cannot be transformed is an error.
    pub fn target_rect(
        target: &dyn AstrometricSolution,
        source: &dyn AstrometricSolution,
        source_rect: &DRect,
    ) -> Result<DRect, WarpError> {
        let mut rect = DRect::empty();
        for p in rect_boundary_points(source_rect, RECT_POINTS_PER_EDGE) {
            let q = source
                .image_to_celestial(p)
                .and_then(|sky| target.celestial_to_image(sky))
                .ok_or_else(|| {
                    WarpError::Degenerate(format!(
                        "source point ({}, {}) has no target pixel coordinates",
                        p.x, p.y
                    ))
                })?;
            rect.union_point(q);
        }
        debug!(?source_rect, target_rect = ?rect, "reprojected rectangle");
        Ok(rect)
    }

    /// True if the target pixel `p` lands inside `source_rect` once mapped
    /// to source pixel coordinates.
    pub fn target_point_inside_source_rect(
        target: &dyn AstrometricSolution,
        source: &dyn AstrometricSolution,
        p: DPoint,
        source_rect: &DRect,
    ) -> bool {
        ReprojectionLaw { target, source }
            .source_point(p.x, p.y)
            .is_some_and(|q| source_rect.contains(q))
    }

    /// True if the whole boundary of `target_rect` lands inside `source_rect`.
    pub fn target_rect_inside_source_rect(
        target: &dyn AstrometricSolution,
        source: &dyn AstrometricSolution,
        target_rect: &DRect,
        source_rect: &DRect,
    ) -> bool {
        let law = ReprojectionLaw { target, source };
        rect_boundary_points(target_rect, RECT_POINTS_PER_EDGE)
            .into_iter()
            .all(|p| {
                law.source_point(p.x, p.y).is_some_and(|q| {
                    q.x >= source_rect.x0
                        && q.x <= source_rect.x1
                        && q.y >= source_rect.y0
                        && q.y <= source_rect.y1
                })
            })
    }
}

impl GeometricTransformation for AstrometricReprojection<'_> {
    fn new_sizes(&self, _width: usize, _height: usize) -> (usize, usize) {
        (self.target.width(), self.target.height())
    }

    fn apply<T: Sample>(&self, image: &mut Image<T>) -> Result<TransformSummary, WarpError> {
        let (width, height) = (image.width(), image.height());
        if !image.is_empty() && (width, height) != (self.source.width(), self.source.height()) {
            return Err(WarpError::Shape(format!(
                "image is {width}x{height} but the source solution describes {}x{}",
                self.source.width(),
                self.source.height()
            )));
        }
        let (new_w, new_h) = self.new_sizes(width, height);
        debug!(width, height, new_w, new_h, "reprojecting image");
        let law = ReprojectionLaw {
            target: self.target,
            source: self.source,
        };
        interpolate(image, new_w, new_h, &law, &self.fill, &self.config)
    }
}
