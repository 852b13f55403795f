use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] pricescout_core::ValidationError),

    #[error(transparent)]
    Fetch(#[from] pricescout_core::FetchError),

    #[error(transparent)]
    Price(#[from] pricescout_core::PriceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Fetch(_) | Self::Price(_) => 3,
            Self::Serialization(_) => 4,
        }
    }
}
