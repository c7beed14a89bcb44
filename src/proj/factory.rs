//! Construction of projections from WCS codes, identifiers and keyword sets.

use std::sync::Arc;

use tracing::debug;

use super::cylindrical::{Mercator, PlateCarree};
use super::hammer_aitoff::HammerAitoff;
use super::zenithal::{Gnomonic, Orthographic, Stereographic, ZenithalEqualArea};
use super::{Projection, ProjectionId, SphericalProjection, WcsKeywords};
use crate::error::ProjError;

pub struct ProjectionFactory;

impl ProjectionFactory {
    /// The unbound projection family for `id`.
    pub fn family(id: ProjectionId) -> Arc<dyn SphericalProjection> {
        match id {
            ProjectionId::Gnomonic => Arc::new(Gnomonic),
            ProjectionId::Stereographic => Arc::new(Stereographic),
            ProjectionId::PlateCarree => Arc::new(PlateCarree),
            ProjectionId::Mercator => Arc::new(Mercator),
            ProjectionId::HammerAitoff => Arc::new(HammerAitoff),
            ProjectionId::ZenithalEqualArea => Arc::new(ZenithalEqualArea),
            ProjectionId::Orthographic => Arc::new(Orthographic),
        }
    }

    /// Projection for a WCS code (`"TAN"`, `"SIN"`, ...) at reference `(ra, dec)`.
    pub fn create_by_wcs_code(code: &str, ra: f64, dec: f64) -> Result<Projection, ProjError> {
        let id = ProjectionId::from_wcs_code(code)?;
        Projection::from_ref_point(Self::family(id), ra, dec)
    }

    /// Projection for an identifier (`"Gnomonic"`, ...) at reference `(ra, dec)`.
    pub fn create_by_identifier(identifier: &str, ra: f64, dec: f64) -> Result<Projection, ProjError> {
        let id = ProjectionId::from_identifier(identifier)?;
        Projection::from_ref_point(Self::family(id), ra, dec)
    }

    /// Projection described by a WCS keyword set. Both axes must declare the
    /// same projection code.
    pub fn create(wcs: &WcsKeywords) -> Result<Projection, ProjError> {
        let code = wcs.projection_code()?;
        let id = ProjectionId::from_wcs_code(&code)?;
        let projection = Projection::from_wcs(Self::family(id), wcs)?;
        debug!(
            code = %code,
            ra0 = projection.ra0(),
            dec0 = projection.dec0(),
            "created projection from WCS keywords"
        );
        Ok(projection)
    }
}
