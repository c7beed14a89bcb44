//! FITS WCS keyword set describing a celestial image solution.

use serde::{Deserialize, Serialize};

use crate::error::ProjError;

/// The subset of FITS WCS keywords understood by the projection layer.
///
/// CRPIX follows the FITS convention: 1-based, pixel centers at integers,
/// y axis pointing up.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WcsKeywords {
    pub ctype1: Option<String>,
    pub ctype2: Option<String>,
    pub crval1: Option<f64>,
    pub crval2: Option<f64>,
    pub crpix1: Option<f64>,
    pub crpix2: Option<f64>,
    pub cd1_1: Option<f64>,
    pub cd1_2: Option<f64>,
    pub cd2_1: Option<f64>,
    pub cd2_2: Option<f64>,
    pub cdelt1: Option<f64>,
    pub cdelt2: Option<f64>,
    pub crota2: Option<f64>,
    pub lonpole: Option<f64>,
    pub latpole: Option<f64>,
    pub pv1_1: Option<f64>,
    pub pv1_2: Option<f64>,
}

impl WcsKeywords {
    /// Keyword set with RA/DEC axes of projection `code` and a CD matrix.
    pub fn new(code: &str, crval: (f64, f64), crpix: (f64, f64), cd: [[f64; 2]; 2]) -> Self {
        Self {
            ctype1: Some(format!("RA---{code}")),
            ctype2: Some(format!("DEC--{code}")),
            crval1: Some(crval.0),
            crval2: Some(crval.1),
            crpix1: Some(crpix.0),
            crpix2: Some(crpix.1),
            cd1_1: Some(cd[0][0]),
            cd1_2: Some(cd[0][1]),
            cd2_1: Some(cd[1][0]),
            cd2_2: Some(cd[1][1]),
            ..Default::default()
        }
    }

    /// Projection code shared by both axes, e.g. `"TAN"` for `RA---TAN`.
    pub fn projection_code(&self) -> Result<String, ProjError> {
        let c1 = axis_code(self.ctype1.as_deref(), "CTYPE1")?;
        let c2 = axis_code(self.ctype2.as_deref(), "CTYPE2")?;
        if !c1.eq_ignore_ascii_case(&c2) {
            return Err(ProjError::MixedProjections {
                ctype1: c1,
                ctype2: c2,
            });
        }
        Ok(c1.to_ascii_uppercase())
    }

    /// `(CRVAL1, CRVAL2)` in degrees.
    pub fn reference_point(&self) -> Result<(f64, f64), ProjError> {
        Ok((
            required(self.crval1, "CRVAL1")?,
            required(self.crval2, "CRVAL2")?,
        ))
    }

    /// `(CRPIX1, CRPIX2)`.
    pub fn reference_pixel(&self) -> Result<(f64, f64), ProjError> {
        Ok((
            required(self.crpix1, "CRPIX1")?,
            required(self.crpix2, "CRPIX2")?,
        ))
    }

    /// Pixel -> intermediate world linear matrix, degrees per pixel.
    ///
    /// Uses the CD matrix when any CD element is present (missing elements
    /// are zero), otherwise CDELT1/CDELT2 rotated by CROTA2.
    pub fn linear_matrix(&self) -> Result<[[f64; 2]; 2], ProjError> {
        let cd = [self.cd1_1, self.cd1_2, self.cd2_1, self.cd2_2];
        let m = if cd.iter().any(Option::is_some) {
            [
                [self.cd1_1.unwrap_or(0.0), self.cd1_2.unwrap_or(0.0)],
                [self.cd2_1.unwrap_or(0.0), self.cd2_2.unwrap_or(0.0)],
            ]
        } else {
            let cdelt1 = required(self.cdelt1, "CDELT1")?;
            let cdelt2 = required(self.cdelt2, "CDELT2")?;
            let (s, c) = self.crota2.unwrap_or(0.0).to_radians().sin_cos();
            [[cdelt1 * c, -cdelt2 * s], [cdelt1 * s, cdelt2 * c]]
        };

        let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
        if !det.is_finite() || det == 0.0 {
            return Err(ProjError::InvalidKeyword {
                keyword: "CD",
                message: format!("singular linear matrix {m:?}"),
            });
        }
        Ok(m)
    }
}

fn required(value: Option<f64>, keyword: &'static str) -> Result<f64, ProjError> {
    let v = value.ok_or(ProjError::MissingKeyword(keyword))?;
    if !v.is_finite() {
        return Err(ProjError::InvalidKeyword {
            keyword,
            message: format!("non-finite value {v}"),
        });
    }
    Ok(v)
}

/// `RA---TAN` -> `TAN`, `DEC--TAN` -> `TAN`.
fn axis_code(ctype: Option<&str>, keyword: &'static str) -> Result<String, ProjError> {
    let ctype = ctype.ok_or(ProjError::MissingKeyword(keyword))?.trim();
    match ctype.split_once('-') {
        Some((_, rest)) => {
            let code = rest.trim_start_matches('-').trim();
            if code.is_empty() {
                Err(ProjError::InvalidKeyword {
                    keyword,
                    message: format!("no projection code in '{ctype}'"),
                })
            } else {
                Ok(code.to_string())
            }
        }
        None => Err(ProjError::InvalidKeyword {
            keyword,
            message: format!("no projection code in '{ctype}'"),
        }),
    }
}
