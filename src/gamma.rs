//! Working-space gamma used to interpolate in linear light.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Gamma function of the RGB working space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum WorkingGamma {
    /// IEC 61966-2-1 sRGB transfer function.
    Srgb,
    /// Pure power law with the given exponent.
    Power(f64),
}

impl Default for WorkingGamma {
    fn default() -> Self {
        Self::Srgb
    }
}

impl WorkingGamma {
    /// Encoded (display) value -> linear value.
    pub fn linearize(&self, v: f64) -> f64 {
        let v = v.max(0.0);
        match *self {
            Self::Srgb => {
                if v <= 0.04045 {
                    v / 12.92
                } else {
                    ((v + 0.055) / 1.055).powf(2.4)
                }
            }
            Self::Power(g) => v.powf(g),
        }
    }

    /// Linear value -> encoded (display) value.
    pub fn delinearize(&self, v: f64) -> f64 {
        let v = v.max(0.0);
        match *self {
            Self::Srgb => {
                if v <= 0.0031308 {
                    v * 12.92
                } else {
                    1.055 * v.powf(1.0 / 2.4) - 0.055
                }
            }
            Self::Power(g) => v.powf(1.0 / g),
        }
    }

    /// Linearize a buffer in place, in parallel chunks.
    pub fn linearize_buffer(&self, data: &mut [f64]) {
        data.par_chunks_mut(GAMMA_CHUNK)
            .for_each(|chunk| chunk.iter_mut().for_each(|v| *v = self.linearize(*v)));
    }

    /// Delinearize a buffer in place, in parallel chunks.
    pub fn delinearize_buffer(&self, data: &mut [f64]) {
        data.par_chunks_mut(GAMMA_CHUNK)
            .for_each(|chunk| chunk.iter_mut().for_each(|v| *v = self.delinearize(*v)));
    }
}

const GAMMA_CHUNK: usize = 16384;
