use crate::cloud::{WordCloud, WordCloudOptions};
use persona_core::CoreError;

/// Turns a text blob into an encoded PNG.
pub trait CloudRenderer: Send + Sync {
    fn render_png(&self, text: &str) -> Result<Vec<u8>, CoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct WordCloudRenderer {
    options: WordCloudOptions,
}

impl WordCloudRenderer {
    pub fn new(options: WordCloudOptions) -> Self {
        Self { options }
    }

    pub fn generate(&self, text: &str) -> Result<WordCloud, CoreError> {
        WordCloud::generate(text, &self.options)
    }
}

impl CloudRenderer for WordCloudRenderer {
    fn render_png(&self, text: &str) -> Result<Vec<u8>, CoreError> {
        self.generate(text)?.to_png()
    }
}
