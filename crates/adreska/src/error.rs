use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdreskaError {
    #[error("Geocoding provider error: {0}")]
    Provider(#[from] crate::provider::ProviderError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Init Logging error: {0}")]
    InitLogging(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AdreskaError>;
