use crate::cloud::WordCloudOptions;
use crate::renderer::{CloudRenderer, WordCloudRenderer};
use persona_core::{AppConfig, Corpus, CorpusPolicy, CoreError, UserActivity};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Visualizer {
    renderer: Arc<dyn CloudRenderer>,
    policy: CorpusPolicy,
}

impl Visualizer {
    pub fn new(renderer: Arc<dyn CloudRenderer>) -> Self {
        Self {
            renderer,
            policy: CorpusPolicy::word_cloud(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let options = WordCloudOptions::from(&config.word_cloud);
        Self::with_renderer(Arc::new(WordCloudRenderer::new(options)), config)
    }

    pub fn with_renderer(renderer: Arc<dyn CloudRenderer>, config: &AppConfig) -> Self {
        Self {
            renderer,
            policy: CorpusPolicy::word_cloud().with_min_words(config.corpus.word_cloud_min_words),
        }
    }

    pub fn policy(&self) -> &CorpusPolicy {
        &self.policy
    }

    pub fn file_name(username: &str) -> String {
        format!("{}_wordcloud.png", username)
    }

    /// The text the cloud is drawn from.
    pub fn corpus(&self, activity: &UserActivity) -> Corpus {
        let corpus = Corpus::build(activity, &self.policy);
        if corpus.is_fallback() {
            warn!("Not enough text for word cloud, using demo text");
        }
        corpus
    }

    /// PNG bytes for the form preview.
    pub fn render(&self, activity: &UserActivity) -> Result<Vec<u8>, CoreError> {
        let corpus = self.corpus(activity);
        let png = self.renderer.render_png(corpus.text())?;
        info!("Rendered word cloud ({} bytes)", png.len());
        Ok(png)
    }

    /// Writes `<username>_wordcloud.png` into `dir`.
    pub fn render_to_file(
        &self,
        dir: impl AsRef<Path>,
        username: &str,
        activity: &UserActivity,
    ) -> Result<PathBuf, CoreError> {
        let path = dir.as_ref().join(Self::file_name(username));
        self.render_to_path(&path, activity)?;
        Ok(path)
    }

    pub fn render_to_path(&self, path: impl AsRef<Path>, activity: &UserActivity) -> Result<(), CoreError> {
        let png = self.render(activity)?;
        std::fs::write(path.as_ref(), png)?;
        info!("Word cloud saved to {}", path.as_ref().display());
        Ok(())
    }
}
