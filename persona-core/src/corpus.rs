//! Corpus assembly.
//!
//! The persona prompt and the word cloud each build their own text blob from
//! the same activity, with different separators and different "too short"
//! thresholds. Both fall back to the same demo paragraph.

use crate::types::UserActivity;
use tracing::warn;

pub const DEMO_PARAGRAPH: &str = "I love programming in Python. I post a lot about technology, AI, and machine learning.\nSometimes I share memes on r/funny. I'm also into philosophy and ask deep questions on r/AskReddit.";

pub const PERSONA_MIN_WORDS: usize = 50;
pub const WORD_CLOUD_MIN_WORDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPolicy {
    pub separator: String,
    pub min_words: usize,
    pub trim: bool,
}

impl CorpusPolicy {
    /// Blank-line joined, at least 50 words.
    pub fn persona() -> Self {
        Self {
            separator: "\n\n".to_string(),
            min_words: PERSONA_MIN_WORDS,
            trim: false,
        }
    }

    /// Space joined and trimmed, at least 5 words.
    pub fn word_cloud() -> Self {
        Self {
            separator: " ".to_string(),
            min_words: WORD_CLOUD_MIN_WORDS,
            trim: true,
        }
    }

    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    fallback: bool,
}

impl Corpus {
    pub fn build(activity: &UserActivity, policy: &CorpusPolicy) -> Self {
        let joined = activity
            .records()
            .collect::<Vec<_>>()
            .join(&policy.separator);
        let joined = if policy.trim {
            joined.trim().to_string()
        } else {
            joined
        };

        let words = word_count(&joined);
        if joined.is_empty() || words < policy.min_words {
            warn!(
                "Corpus has {} words (minimum {}), using demo text",
                words, policy.min_words
            );
            return Self {
                text: DEMO_PARAGRAPH.to_string(),
                fallback: true,
            };
        }

        Self {
            text: joined,
            fallback: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// True when the demo paragraph replaced the real activity.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
