//! Error type for provider calls.

/// Errors surfaced by a provider implementation.
///
/// The pipeline components map these into the deployment error taxonomy
/// at their own boundaries; providers never retry internally.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The addressed resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The provider rejected or failed the call.
    #[error("provider call failed: {message}")]
    Api {
        /// Provider-reported failure message.
        message: String,
    },
}

impl ProviderError {
    /// Build an [`ProviderError::Api`] from any displayable message.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }
}

/// Convenience result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;
