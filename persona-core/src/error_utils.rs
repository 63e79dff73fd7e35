use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Visualization(e) => {
                error!("Visualization error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Visualization(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            CoreError::Io(e) => format!("File error: {}", e),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Llm(_) => "LLM".to_string(),
            CoreError::Visualization(_) => "VISUALIZATION".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The search API refused the request.",
                resource
            ),
            RedditApiError::RequestTimeout => {
                "Request to the Reddit search API timed out. Please try again.".to_string()
            }
            RedditApiError::InvalidResponse { .. } => {
                "The Reddit search API returned data that could not be read.".to_string()
            }
            _ => "Reddit search API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::EndpointUnavailable { .. } => "REDDIT_ENDPOINT_UNAVAILABLE".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
            RedditApiError::RequestFailed { .. } => "REDDIT_REQUEST_FAILED".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::AuthenticationFailed { provider } => format!(
                "Authentication failed for {}. Please check your API key.",
                provider
            ),
            LlmError::InvalidApiKey { provider } => format!(
                "Invalid API key for {}. Please update your credentials.",
                provider
            ),
            LlmError::RateLimitExceeded {
                provider,
                retry_after,
            } => format!(
                "Rate limit exceeded for {}. Please wait {} seconds.",
                provider, retry_after
            ),
            LlmError::ModelNotAvailable { model } => format!(
                "Model '{}' is not available. Please try a different model.",
                model
            ),
            LlmError::ContentFiltered { .. } => {
                "Content was filtered by the AI provider's safety systems.".to_string()
            }
            LlmError::ServiceUnavailable { provider } => format!(
                "{} service is temporarily unavailable. Please try again later.",
                provider
            ),
            LlmError::InsufficientCredits { provider } => {
                format!("The {} key has no remaining balance.", provider)
            }
            LlmError::EmptyCompletion { provider } => {
                format!("{} returned an empty response.", provider)
            }
            _ => "AI service error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::AuthenticationFailed { .. } => "LLM_AUTH_FAILED".to_string(),
            LlmError::InvalidApiKey { .. } => "LLM_INVALID_API_KEY".to_string(),
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT".to_string(),
            LlmError::ModelNotAvailable { .. } => "LLM_MODEL_NOT_AVAILABLE".to_string(),
            LlmError::ContentFiltered { .. } => "LLM_CONTENT_FILTERED".to_string(),
            LlmError::ServiceUnavailable { .. } => "LLM_SERVICE_UNAVAILABLE".to_string(),
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::InsufficientCredits { .. } => "LLM_INSUFFICIENT_CREDITS".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE".to_string(),
            LlmError::EmptyCompletion { .. } => "LLM_EMPTY_COMPLETION".to_string(),
        }
    }
}

impl ErrorExt for VisualizationError {
    fn log_error(&self) -> &Self {
        error!("VisualizationError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("VisualizationError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            VisualizationError::NoWords { .. } => {
                "There are no usable words to draw a word cloud from.".to_string()
            }
            VisualizationError::CanvasTooSmall { width, height } => format!(
                "A {}x{} canvas is too small for a word cloud.",
                width, height
            ),
            VisualizationError::NoSpace { .. } => {
                "The word cloud canvas has no room for any of the words.".to_string()
            }
            VisualizationError::InvalidColor { value } => {
                format!("'{}' is not a recognised color.", value)
            }
            VisualizationError::Encoding(_) => "The word cloud image could not be encoded.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            VisualizationError::NoWords { .. } => "VIS_NO_WORDS".to_string(),
            VisualizationError::CanvasTooSmall { .. } => "VIS_CANVAS_TOO_SMALL".to_string(),
            VisualizationError::NoSpace { .. } => "VIS_NO_SPACE".to_string(),
            VisualizationError::InvalidColor { .. } => "VIS_INVALID_COLOR".to_string(),
            VisualizationError::Encoding(_) => "VIS_ENCODING".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::ValidationFailed { reason } => {
                format!("Configuration is invalid: {}", reason)
            }
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs a failure and hands back the line a shell shows for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorReporter {
    show_codes: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suffix shown lines with the error code, e.g. `(REDDIT_API)`.
    pub fn with_codes(mut self, enabled: bool) -> Self {
        self.show_codes = enabled;
        self
    }

    /// A failure that ends the run.
    pub fn report_error(&self, error: &CoreError) -> String {
        error.log_error();
        info!("Error code: {}", error.error_code());
        self.message(error)
    }

    /// A failure the run continues past.
    pub fn report_warning(&self, error: &CoreError) -> String {
        error.log_warn();
        self.message(error)
    }

    fn message(&self, error: &CoreError) -> String {
        let message = error.user_friendly_message();
        if self.show_codes {
            format!("{} ({})", message, error.error_code())
        } else {
            message
        }
    }
}
