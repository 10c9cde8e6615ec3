use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("{provider} API key not found. Set the {env_var} environment variable")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("{provider} authentication failed. Check your API key")]
    AuthFailed { provider: &'static str },

    #[error("{provider} rate limit exceeded")]
    RateLimited { provider: &'static str },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Unknown embedding provider: {0}. Valid: openai, google, ollama, voyage")]
    UnknownProvider(String),

    #[error("Embedding API error: {0}")]
    Api(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("Embedding count mismatch: sent {expected} texts, got {got} vectors")]
    CountMismatch { expected: usize, got: usize },
}
