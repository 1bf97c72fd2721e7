//! Provider backend implementations

mod gemini;
mod groq;
mod ollama;

pub use gemini::{GeminiBackend, GeminiProviderConfig};
pub use groq::{GroqBackend, GroqProviderConfig};
pub use ollama::{OllamaBackend, OllamaProviderConfig};

use agrivoice_core::ProviderError;
use reqwest::StatusCode;

/// Map a transport-level reqwest failure onto the provider taxonomy
pub(crate) fn classify_transport(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(error.to_string())
    }
}

/// Map a non-success HTTP status onto the provider taxonomy
pub(crate) fn classify_status(status: StatusCode, body: String) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimited(body)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ProviderError::Auth(format!("{status}: {body}"))
    } else if status.is_server_error() {
        ProviderError::Network(format!("{status}: {body}"))
    } else {
        ProviderError::Api(format!("{status}: {body}"))
    }
}

/// Build a reqwest client with the given request timeout
pub(crate) fn http_client(timeout: std::time::Duration) -> agrivoice_core::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| agrivoice_core::Error::Config(format!("http client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "quota".into()),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "bad key".into()),
            ProviderError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "oops".into()),
            ProviderError::Network(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "nope".into()),
            ProviderError::Api(_)
        ));
    }
}
