/// Result alias that carries the custom [`SpectrumError`] type.
pub type Result<T> = std::result::Result<T, SpectrumError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    /// A spectrum specification failed validation before synthesis started.
    #[error("invalid spectrum specification: {0}")]
    InvalidSpec(String),
    /// The requested noise distribution could not be constructed.
    #[error("invalid noise distribution: {0}")]
    Noise(#[from] rand_distr::NormalError),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A specification file could not be parsed.
    #[error("malformed specification: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SpectrumError {
    /// Creates a validation error from the provided message.
    pub fn invalid_spec<T: Into<String>>(msg: T) -> Self {
        Self::InvalidSpec(msg.into())
    }
}
