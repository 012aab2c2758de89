use thiserror::Error;

/// Errors from filter design and band addressing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DspError {
    /// A math input left its valid domain (frequency, sample rate or Q must
    /// be positive and finite). Gain is never rejected, only clamped.
    #[error("invalid filter parameter: {0}")]
    InvalidParameter(String),

    /// A band gain was addressed at a frequency outside the fixed six-band
    /// set.
    #[error("unknown equalizer band: {0} Hz")]
    UnknownBand(u32),
}

/// Engine lifecycle misuse, surfaced to the control path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("engine is already running")]
    AlreadyRunning,

    #[error("engine is not running")]
    NotRunning,

    #[error(transparent)]
    Dsp(#[from] DspError),
}

/// Profile naming errors on save.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("profile name must not be blank")]
    InvalidName,
}

/// Failure of the injected persistence collaborator. The profile store
/// absorbs these with a safe default; they only reach callers that use a
/// `ProfileStorage` implementation directly.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend failed: {0}")]
    Backend(String),
}
