use crate::error::{CoreError, LlmError};
use url::Url;

/// Substring a profile URL must contain before the form shell does any work.
pub const PROFILE_URL_MARKER: &str = "reddit.com/user/";

pub const EMPTY_COMPLETION_WARNING: &str = "⚠️ GPT returned an empty response.";

pub const PERSONA_UNAVAILABLE_WARNING: &str =
    "⚠️ GPT quota exceeded or unavailable. Integration is ready but key has no remaining balance.";

/// A user's flattened activity as returned by one fetch.
///
/// Every entry is already a display line (`[Post] ...` / `[Comment] ...`);
/// the structured fields are dropped at fetch time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserActivity {
    pub posts: Vec<String>,
    pub comments: Vec<String>,
}

impl UserActivity {
    pub fn new(posts: Vec<String>, comments: Vec<String>) -> Self {
        Self { posts, comments }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.comments.is_empty()
    }

    /// Posts first, then comments, in the order the API returned them.
    pub fn records(&self) -> impl Iterator<Item = &str> {
        self.posts
            .iter()
            .chain(self.comments.iter())
            .map(String::as_str)
    }
}

pub fn is_profile_url(input: &str) -> bool {
    input.contains(PROFILE_URL_MARKER)
}

/// Pull the username out of a profile URL.
///
/// Uses the path segment after `user/` or `u/` when the input parses as a URL,
/// otherwise the second-to-last `/`-separated piece
/// (`https://www.reddit.com/user/spez/` -> `spez`).
pub fn username_from_url(input: &str) -> Result<String, CoreError> {
    let trimmed = input.trim();

    let from_path = Url::parse(trimmed).ok().and_then(|url| {
        let segments: Vec<String> = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        segments
            .iter()
            .position(|segment| segment == "user" || segment == "u")
            .and_then(|index| segments.get(index + 1).cloned())
    });

    let username = match from_path {
        Some(name) => name,
        None => {
            let parts: Vec<&str> = trimmed.split('/').collect();
            if parts.len() >= 2 {
                parts[parts.len() - 2].to_string()
            } else {
                String::new()
            }
        }
    };

    if username.is_empty() {
        return Err(CoreError::InvalidInput {
            message: format!("could not find a username in '{}'", trimmed),
        });
    }

    Ok(username)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaFailureKind {
    QuotaExceeded,
    Authentication,
    Unavailable,
    MalformedResponse,
    EmptyCompletion,
}

impl PersonaFailureKind {
    pub fn from_error(error: &CoreError) -> Self {
        match error {
            CoreError::Llm(llm) => match llm {
                LlmError::RateLimitExceeded { .. } | LlmError::InsufficientCredits { .. } => {
                    PersonaFailureKind::QuotaExceeded
                }
                LlmError::AuthenticationFailed { .. } | LlmError::InvalidApiKey { .. } => {
                    PersonaFailureKind::Authentication
                }
                LlmError::InvalidResponseFormat { .. } => PersonaFailureKind::MalformedResponse,
                LlmError::EmptyCompletion { .. } => PersonaFailureKind::EmptyCompletion,
                _ => PersonaFailureKind::Unavailable,
            },
            CoreError::Serialization(_) => PersonaFailureKind::MalformedResponse,
            _ => PersonaFailureKind::Unavailable,
        }
    }
}

/// Result of one persona generation attempt.
///
/// Generation never fails its caller; a failed attempt carries the kind of
/// failure plus the underlying message so shells can choose how to show it.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonaOutcome {
    Generated(String),
    Failed {
        kind: PersonaFailureKind,
        detail: String,
    },
}

impl PersonaOutcome {
    pub fn failed(error: &CoreError) -> Self {
        PersonaOutcome::Failed {
            kind: PersonaFailureKind::from_error(error),
            detail: error.to_string(),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, PersonaOutcome::Generated(_))
    }

    pub fn persona(&self) -> Option<&str> {
        match self {
            PersonaOutcome::Generated(text) => Some(text),
            PersonaOutcome::Failed { .. } => None,
        }
    }

    /// Text to show a user: the persona itself, or the fixed warning line.
    pub fn display_text(&self) -> &str {
        match self {
            PersonaOutcome::Generated(text) => text,
            PersonaOutcome::Failed {
                kind: PersonaFailureKind::EmptyCompletion,
                ..
            } => EMPTY_COMPLETION_WARNING,
            PersonaOutcome::Failed { .. } => PERSONA_UNAVAILABLE_WARNING,
        }
    }
}
