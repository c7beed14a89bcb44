use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarpError {
    #[error("Projection error: {0}")]
    Projection(#[from] ProjError),

    #[error("Planning error: {0}")]
    Planning(#[from] PlanError),

    #[error("Invalid affine transform: {0}")]
    Affine(String),

    #[error("Invalid shape: {0}")]
    Shape(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Degenerate coordinate transform: {0}")]
    Degenerate(String),

    #[error("Unable to allocate {bytes} bytes for channel {channel}")]
    Allocation { channel: usize, bytes: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Process aborted by the user")]
    Cancelled,
}

impl WarpError {
    /// True if this error is the result of a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WarpError::Cancelled)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ProjError {
    #[error("Unknown WCS projection code: '{0}'")]
    UnknownCode(String),

    #[error("Unknown projection identifier: '{0}'")]
    UnknownIdentifier(String),

    #[error("Mixed projections are not supported: CTYPE1 uses {ctype1}, CTYPE2 uses {ctype2}")]
    MixedProjections { ctype1: String, ctype2: String },

    #[error("Missing required WCS keyword: {0}")]
    MissingKeyword(&'static str),

    #[error("Invalid WCS keyword {keyword}: {message}")]
    InvalidKeyword {
        keyword: &'static str,
        message: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Planning error: {0}")]
    General(String),
}
